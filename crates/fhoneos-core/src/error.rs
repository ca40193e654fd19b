use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Configuration errors raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),
}

/// Errors from the Supabase auth (GoTrue) client.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Auth endpoint error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Errors from the PostgREST data store client.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Data store error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Errors from the Stripe client.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stripe error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Errors from the LLM completion provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Request-level error taxonomy. Each variant carries the exact plain-text
/// body the caller sees; anything unanticipated collapses to a 500 with the
/// detail logged, never echoed back.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthenticated,

    /// Message is the full response body, e.g. "Plan not found".
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(&'static str),

    /// An upstream API returned a non-success status. The raw body has
    /// already been logged; only this fixed message reaches the caller.
    #[error("{0}")]
    Upstream(&'static str),

    #[error("Server error")]
    Internal(#[source] anyhow::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Internal(err.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.into())
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let ApiError::Internal(ref err) = self {
            tracing::error!("Request failed: {:#}", err);
        }

        (status, self.to_string()).into_response()
    }
}
