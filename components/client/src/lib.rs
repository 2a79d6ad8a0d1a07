//! Typed request/response boundary to the external StoryGrid identity backend.

#[macro_use]
extern crate serde;
extern crate tracing as log;

mod error;
pub mod http;

pub use error::ClientError;
pub use http::HttpApi;

use models::User;

/// Parsed result of a successful login: the bearer credential plus whatever
/// identity object the backend chose to include.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub token: String,
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,

    #[serde(rename = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegisterResponse {
    pub user: Option<User>,
    pub message: Option<String>,
}

/// Contract the session core requires of the backend. Implemented by [`HttpApi`]
/// in production and by scriptable stubs in tests.
#[async_trait::async_trait]
pub trait Api: Send + Sync + 'static {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError>;

    async fn register(&self, form: &RegisterForm) -> Result<RegisterResponse, ClientError>;

    async fn current_user(&self, token: &str) -> Result<User, ClientError>;

    /// Best-effort; callers tearing down a session must not let a failure here
    /// block local cleanup.
    async fn logout(&self, token: &str) -> Result<(), ClientError>;
}
