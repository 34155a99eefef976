//! The signed-in user and the bearer credential that proves it.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    dto::auth::{LoginRequest, RegisterRequest},
    gateway::{GatewayError, UserGateway},
    models::UserProfile,
    storage::{DurableStore, StorageError, TOKEN_KEY},
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct Session {
    storage: Arc<dyn DurableStore>,
    users: Arc<dyn UserGateway>,
    token: Option<String>,
    user: Option<UserProfile>,
}

impl Session {
    /// Resolves a stored credential, if any, to the current user. A credential
    /// the identity store refuses is discarded; one that cannot be checked
    /// because the store is unreachable is kept for the next start.
    pub async fn restore(storage: Arc<dyn DurableStore>, users: Arc<dyn UserGateway>) -> Self {
        let token = match storage.load(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(err) => {
                tracing::warn!(error = %err, "could not read stored credential");
                None
            }
        };

        let mut session = Self {
            storage,
            users,
            token: None,
            user: None,
        };
        let Some(token) = token else {
            return session;
        };

        match session.users.profile(&token).await {
            Ok(profile) => {
                tracing::debug!(user_id = %profile.id, "session restored");
                session.user = Some(profile);
                session.token = Some(token);
            }
            Err(GatewayError::Unauthenticated) => {
                tracing::info!("stored credential rejected, signing out");
                if let Err(err) = session.storage.remove(TOKEN_KEY) {
                    tracing::warn!(error = %err, "could not discard stored credential");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "auth check failed");
                session.token = Some(token);
            }
        }
        session
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// The credential is only handed out while a user is signed in.
    pub fn token(&self) -> Option<&str> {
        self.user.as_ref().and(self.token.as_deref())
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }

    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<&UserProfile, SessionError> {
        let token = self
            .users
            .login(&LoginRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .await?;
        self.adopt(token).await
    }

    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<&UserProfile, SessionError> {
        let token = self
            .users
            .register(&RegisterRequest {
                name: name.trim().to_string(),
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .await?;
        self.adopt(token).await
    }

    /// Forgets the credential and the user. The cart is not affected.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.storage.remove(TOKEN_KEY)?;
        self.token = None;
        self.user = None;
        Ok(())
    }

    async fn adopt(&mut self, token: String) -> Result<&UserProfile, SessionError> {
        let profile = self.users.profile(&token).await?;
        self.storage.save(TOKEN_KEY, &token)?;
        tracing::debug!(user_id = %profile.id, "signed in");
        self.token = Some(token);
        Ok(self.user.insert(profile))
    }
}
