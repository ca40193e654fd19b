use async_trait::async_trait;
use tracing::debug;

use crate::error::AuthError;
use crate::types::AuthUser;
use crate::util::http;

/// Verifies a bearer token and resolves the user it belongs to.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// `Ok(None)` means the auth provider rejected the token; transport
    /// failures surface as `Err` and hit the handler's catch-all.
    async fn verify(&self, token: &str) -> Result<Option<AuthUser>, AuthError>;
}

/// Supabase GoTrue verifier (`GET /auth/v1/user`).
pub struct SupabaseAuth {
    base_url: String,
    service_role_key: String,
}

impl SupabaseAuth {
    pub fn new(base_url: impl Into<String>, service_role_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_role_key: service_role_key.into(),
        }
    }
}

#[async_trait]
impl TokenVerifier for SupabaseAuth {
    async fn verify(&self, token: &str) -> Result<Option<AuthUser>, AuthError> {
        let url = format!("{}/auth/v1/user", self.base_url);

        let response = http::client()
            .get(&url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            debug!("Token rejected by auth provider ({})", status);
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let user: AuthUser = response.json().await?;
        Ok(Some(user))
    }
}
