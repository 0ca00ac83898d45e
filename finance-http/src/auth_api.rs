use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use finance_core::auth::TokenSession;
use finance_core::models::AuthResponse;

use crate::backend::HttpBackend;
use crate::envelope::{MessageResponse, RefreshResponse};
use crate::error::HttpError;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    phone: Option<&'a str>,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct VerifyOtpRequest<'a> {
    email: &'a str,
    otp: u32,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Login, registration and token refresh against the auth endpoints.
/// Successful logins land in the shared [`TokenSession`].
pub struct AuthApi {
    backend: HttpBackend,
    session: Arc<TokenSession>,
}

impl AuthApi {
    pub fn new(
        backend: HttpBackend,
        session: Arc<TokenSession>,
    ) -> Self {
        Self {
            backend: backend.with_session(Arc::clone(&session)),
            session,
        }
    }

    pub fn session(&self) -> &Arc<TokenSession> {
        &self.session
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, HttpError> {
        let body = LoginRequest {
            email,
            phone: None,
            password,
        };
        let response: AuthResponse = self.backend.post_json("/auth/login", &body).await?;
        self.session.store_auth_data(&response).await;
        info!(email, "logged in");
        Ok(response)
    }

    /// Starts registration; the backend mails an OTP to `email`.
    pub async fn register(
        &self,
        email: &str,
    ) -> Result<MessageResponse, HttpError> {
        self.backend
            .post_json("/auth/register", &RegisterRequest { email })
            .await
    }

    pub async fn verify_otp(
        &self,
        email: &str,
        otp: u32,
    ) -> Result<AuthResponse, HttpError> {
        let body = VerifyOtpRequest { email, otp };
        let response: AuthResponse = self.backend.post_json("/auth/verifyOtp", &body).await?;
        self.session.store_auth_data(&response).await;
        info!(email, "OTP verified");
        Ok(response)
    }

    /// Trade the stored refresh token for a new access token.
    pub async fn refresh_token(&self) -> Result<String, HttpError> {
        let refresh_token = self
            .session
            .refresh_token()
            .ok_or(HttpError::MissingRefreshToken)?;

        let response: RefreshResponse = self
            .backend
            .post_json(
                "/auth/refresh",
                &RefreshRequest {
                    refresh_token: &refresh_token,
                },
            )
            .await?;
        self.session.update_token(&response.token).await;
        Ok(response.token)
    }

    pub async fn logout(&self) {
        self.session.logout().await;
    }
}
