use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};

use models::{extract_message, extract_token, extract_user, User};

use crate::{Api, ClientError, LoginResponse, RegisterForm, RegisterResponse};

pub fn create_api_client(api: &config::sections::api::Api) -> Result<Client, reqwest::Error> {
    reqwest::ClientBuilder::new()
        .user_agent(api.user_agent.clone())
        .gzip(true)
        .deflate(true)
        .redirect(reqwest::redirect::Policy::limited(1))
        .connect_timeout(api.connect_timeout)
        .danger_accept_invalid_certs(false)
        .build()
}

/// [`Api`] implementation speaking HTTP to the configured backend.
pub struct HttpApi {
    client: Client,
    base: String,
}

impl HttpApi {
    pub fn new(config: &config::Config) -> Result<HttpApi, ClientError> {
        Ok(HttpApi {
            client: create_api_client(&config.api)?,
            base: config.api.base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        let mut url = String::with_capacity(self.base.len() + path.len());
        url.push_str(&self.base);
        url.push_str(path);
        url
    }

    async fn read_body(res: Response) -> Result<Value, ClientError> {
        let full = res.bytes().await?;

        if cfg!(debug_assertions) {
            match std::str::from_utf8(&full) {
                Ok(full) => log::trace!("Backend response: {}", full),
                Err(_) => log::warn!("Invalid UTF8 in backend response"),
            }
        }

        Ok(serde_json::from_slice(&full)?)
    }
}

#[async_trait::async_trait]
impl Api for HttpApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        log::debug!("Logging in as {email}");

        let res = self
            .client
            .post(self.url("/user/login"))
            .json(&json!({ "data": { "email": email, "password": password } }))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(ClientError::InvalidCredentials);
        }

        let body = Self::read_body(res).await?;

        let Some(token) = extract_token(&body) else {
            return Err(ClientError::UnexpectedShape);
        };

        Ok(LoginResponse {
            token,
            user: extract_user(&body),
        })
    }

    async fn register(&self, form: &RegisterForm) -> Result<RegisterResponse, ClientError> {
        log::debug!("Registering {}", form.username);

        let res = self
            .client
            .post(self.url("/user/signUp"))
            .json(&json!({ "data": form }))
            .send()
            .await?;

        let status = res.status();

        if !status.is_success() {
            // surface the backend's own rejection message when it sent one
            if let Ok(body) = Self::read_body(res).await {
                if let Some(message) = extract_message(&body) {
                    return Err(ClientError::Rejected(message));
                }
            }

            return Err(ClientError::UnexpectedStatus(status));
        }

        let body = Self::read_body(res).await?;

        Ok(RegisterResponse {
            user: extract_user(&body),
            message: extract_message(&body),
        })
    }

    async fn current_user(&self, token: &str) -> Result<User, ClientError> {
        let res = self.client.get(self.url("/user/me")).bearer_auth(token).send().await?;

        match res.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthenticated),
            status if !status.is_success() => Err(ClientError::UnexpectedStatus(status)),
            _ => {
                let body = Self::read_body(res).await?;

                extract_user(&body).ok_or(ClientError::UnexpectedShape)
            }
        }
    }

    async fn logout(&self, token: &str) -> Result<(), ClientError> {
        let res = self.client.post(self.url("/user/logout")).bearer_auth(token).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus(status));
        }

        Ok(())
    }
}
