use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::auth::dto::PublicUser;
use crate::client::ClientError;
use crate::listings::{
    dto::{ListingInput, ListingPatch},
    repo_types::Listing,
};

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Serialize)]
struct SignupBody<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SigninBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct GoogleBody<'a> {
    name: &'a str,
    email: &'a str,
    photo: Option<&'a str>,
}

/// HTTP client for the estate API. Keeps the session cookie between calls.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res.json::<T>().await?);
        }
        let text = res.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|b| b.message)
            .unwrap_or_else(|_| {
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    text
                }
            });
        debug!(%status, %message, "api error");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<String, ClientError> {
        let res = self
            .http
            .post(self.url("/auth/signup"))
            .json(&SignupBody { username, email, password })
            .send()
            .await?;
        Self::decode(res).await
    }

    pub async fn signin(&self, email: &str, password: &str) -> Result<PublicUser, ClientError> {
        let res = self
            .http
            .post(self.url("/auth/signin"))
            .json(&SigninBody { email, password })
            .send()
            .await?;
        Self::decode(res).await
    }

    pub async fn google(&self, name: &str, email: &str, photo: Option<&str>) -> Result<PublicUser, ClientError> {
        let res = self
            .http
            .post(self.url("/auth/google"))
            .json(&GoogleBody { name, email, photo })
            .send()
            .await?;
        Self::decode(res).await
    }

    pub async fn signout(&self) -> Result<String, ClientError> {
        let res = self.http.get(self.url("/auth/signout")).send().await?;
        Self::decode(res).await
    }

    pub async fn create_listing(&self, input: &ListingInput) -> Result<Listing, ClientError> {
        let res = self
            .http
            .post(self.url("/listing/create"))
            .json(input)
            .send()
            .await?;
        Self::decode(res).await
    }

    pub async fn get_listing(&self, id: Uuid) -> Result<Listing, ClientError> {
        let res = self
            .http
            .get(self.url(&format!("/listing/get/{id}")))
            .send()
            .await?;
        Self::decode(res).await
    }

    pub async fn update_listing(&self, id: Uuid, patch: &ListingPatch) -> Result<Listing, ClientError> {
        let res = self
            .http
            .post(self.url(&format!("/listing/update/{id}")))
            .json(patch)
            .send()
            .await?;
        Self::decode(res).await
    }

    pub async fn delete_listing(&self, id: Uuid) -> Result<String, ClientError> {
        let res = self
            .http
            .delete(self.url(&format!("/listing/delete/{id}")))
            .send()
            .await?;
        Self::decode(res).await
    }

    pub async fn user_listings(&self, user_id: Uuid) -> Result<Vec<Listing>, ClientError> {
        let res = self
            .http
            .get(self.url(&format!("/user/listings/{user_id}")))
            .send()
            .await?;
        Self::decode(res).await
    }
}

impl ClientError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => StatusCode::from_u16(*status).ok(),
            _ => None,
        }
    }
}
