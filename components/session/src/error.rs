use client::ClientError;

/// User-facing failures of the session lifecycle. Background maintenance never
/// surfaces through this type; it fails closed and silent.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Login failed. Please check your credentials.")]
    LoginFailed(#[source] ClientError),

    #[error("Failed to refresh user profile.")]
    RefreshFailed(#[source] ClientError),

    #[error("Not Authenticated")]
    NotAuthenticated,
}
