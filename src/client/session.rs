use crate::auth::dto::PublicUser;
use crate::client::{api::ApiClient, ClientError};

/// Who is signed in, as far as the client knows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub current_user: Option<PublicUser>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    pub fn sign_in_start(&mut self) {
        self.loading = true;
    }

    pub fn sign_in_success(&mut self, user: PublicUser) {
        self.current_user = Some(user);
        self.loading = false;
        self.error = None;
    }

    pub fn sign_in_failure(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.loading = false;
    }

    pub fn sign_out(&mut self) {
        *self = Self::default();
    }

    pub async fn sign_in(&mut self, api: &ApiClient, email: &str, password: &str) -> Result<(), ClientError> {
        self.sign_in_start();
        let res = api.signin(email, password).await;
        self.settle(res)
    }

    pub async fn sign_in_with_google(
        &mut self,
        api: &ApiClient,
        name: &str,
        email: &str,
        photo: Option<&str>,
    ) -> Result<(), ClientError> {
        self.sign_in_start();
        let res = api.google(name, email, photo).await;
        self.settle(res)
    }

    pub async fn sign_out_remote(&mut self, api: &ApiClient) -> Result<(), ClientError> {
        api.signout().await?;
        self.sign_out();
        Ok(())
    }

    fn settle(&mut self, res: Result<PublicUser, ClientError>) -> Result<(), ClientError> {
        match res {
            Ok(user) => {
                self.sign_in_success(user);
                Ok(())
            }
            Err(e) => {
                self.sign_in_failure(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn user() -> PublicUser {
        PublicUser {
            id: Uuid::new_v4(),
            username: "zoe".into(),
            email: "zoe@example.com".into(),
            avatar: "https://img/zoe.png".into(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn transitions() {
        let mut s = SessionState::default();
        s.sign_in_start();
        assert!(s.loading);

        s.sign_in_failure("Wrong credentials!");
        assert!(!s.loading);
        assert_eq!(s.error.as_deref(), Some("Wrong credentials!"));
        assert!(s.current_user.is_none());

        s.sign_in_start();
        let u = user();
        s.sign_in_success(u.clone());
        assert_eq!(s.current_user, Some(u));
        assert!(s.error.is_none());

        s.sign_out();
        assert_eq!(s, SessionState::default());
    }
}
