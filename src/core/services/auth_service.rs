use super::types::AuthStatus;
use crate::AppError;
use crate::api::client::OpsClient;
use crate::storage::credentials::SessionStore;
use std::sync::Arc;

/// Authentication service owning the save / verify / clear round trip
pub struct AuthService {
    session: Arc<SessionStore>,
    client: OpsClient,
}

impl AuthService {
    /// Create new AuthService instance
    pub fn new(session: Arc<SessionStore>, client: OpsClient) -> Self {
        Self { session, client }
    }

    /// Store the token, then verify it against the backend.
    ///
    /// A token the server rejects is cleared again before reporting
    /// failure, so a rejected token is never left persisted.
    pub async fn login(&self, token: &str) -> Result<bool, AppError> {
        self.session.save(token)?;

        if self.client.check().await {
            Ok(true)
        } else {
            self.session.clear()?;
            Ok(false)
        }
    }

    /// Drop the stored session token
    pub fn logout(&self) -> Result<(), AppError> {
        self.session.clear()?;
        Ok(())
    }

    /// Current authentication state; the backend is probed only when a
    /// token is actually present.
    pub async fn status(&self) -> AuthStatus {
        let session_present = self.session.get().is_some();
        let is_authenticated = session_present && self.client.check().await;

        AuthStatus {
            is_authenticated,
            profile_name: self.session.profile().unwrap_or("default").to_string(),
            session_present,
        }
    }
}
