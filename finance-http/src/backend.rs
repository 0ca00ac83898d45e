use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use finance_core::auth::TokenSession;
use finance_core::lookup::{LookupError, LookupSource};
use finance_core::models::{
    CarModel, ErrorBody, Faculty, FinanceRequestsResponse, FinancingRequestResponse, Governorate,
    University, UploadFile,
};
use finance_core::submit::{FinancingTransport, FormPart, MultipartForm, TransportError};

use crate::config::ApiConfig;
use crate::envelope::ListEnvelope;
use crate::error::HttpError;

pub const FINANCING_REQUESTS_PATH: &str = "/auth/financing-requests";

/// The applicant's earlier requests and whether a new one is allowed.
pub const REQUEST_STATUS_PATH: &str = "/auth/requests";

/// Endpoints that must never carry a bearer token.
pub const AUTH_ENDPOINTS: [&str; 5] = [
    "/auth/login",
    "/auth/register",
    "/auth/verifyOtp",
    "/auth/send-otp",
    "/auth/refresh",
];

pub fn is_auth_endpoint(path: &str) -> bool {
    AUTH_ENDPOINTS.iter().any(|endpoint| path.contains(endpoint))
}

/// Shared reqwest client plus the session whose token it attaches.
///
/// A 401 answer to a request that carried a token ends the session.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    config: ApiConfig,
    session: Option<Arc<TokenSession>>,
}

impl HttpBackend {
    pub fn new(config: ApiConfig) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;

        Ok(Self {
            client,
            config,
            session: None,
        })
    }

    pub fn with_session(
        mut self,
        session: Arc<TokenSession>,
    ) -> Self {
        self.session = Some(session);
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Arc<TokenSession>> {
        self.session.as_ref()
    }

    /// Builder for `path`, plus whether a token was attached.
    fn request(
        &self,
        method: Method,
        path: &str,
    ) -> (RequestBuilder, bool) {
        let builder = self.client.request(method, self.config.endpoint(path));
        if is_auth_endpoint(path) {
            return (builder, false);
        }

        match self.session.as_ref().and_then(|s| s.token()) {
            Some(token) => (builder.bearer_auth(token), true),
            None => (builder, false),
        }
    }

    async fn execute(
        &self,
        builder: RequestBuilder,
        authorized: bool,
    ) -> Result<Response, reqwest::Error> {
        let response = builder.send().await?;
        debug!(url = %response.url(), status = response.status().as_u16(), "response received");

        if response.status() == StatusCode::UNAUTHORIZED && authorized {
            if let Some(session) = &self.session {
                warn!("token rejected by the server; logging out");
                session.logout().await;
            }
        }
        Ok(response)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, HttpError> {
        let (builder, authorized) = self.request(Method::GET, path);
        let response = self
            .execute(builder, authorized)
            .await
            .map_err(|e| HttpError::Request(e.to_string()))?;
        decode(response).await
    }

    pub(crate) async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (builder, authorized) = self.request(Method::POST, path);
        let response = self
            .execute(builder.json(body), authorized)
            .await
            .map_err(|e| HttpError::Request(e.to_string()))?;
        decode(response).await
    }

    /// Requests the logged-in applicant has already sent.
    pub async fn fetch_financing_requests(&self) -> Result<FinanceRequestsResponse, HttpError> {
        let response: FinanceRequestsResponse = self.get_json(REQUEST_STATUS_PATH).await?;
        debug!(
            count = response.data.len(),
            can_apply = response.can_apply,
            "financing requests loaded"
        );
        Ok(response)
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, LookupError> {
        self.get_json::<ListEnvelope<T>>(path)
            .await
            .map(ListEnvelope::into_items)
            .map_err(lookup_error)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, HttpError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| HttpError::Request(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| reason(status));
        return Err(HttpError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&text).map_err(|e| HttpError::Decode(e.to_string()))
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown status")
        .to_string()
}

fn lookup_error(err: HttpError) -> LookupError {
    match err {
        HttpError::Status { status, .. } => LookupError::Status(status),
        HttpError::Decode(msg) => LookupError::Decode(msg),
        other => LookupError::Network(other.to_string()),
    }
}

fn file_part(file: UploadFile) -> Part {
    let UploadFile {
        file_name,
        mime_type,
        bytes,
    } = file;

    Part::bytes(bytes.clone())
        .file_name(file_name.clone())
        .mime_str(&mime_type)
        .unwrap_or_else(|e| {
            warn!(%mime_type, error = %e, "unusable MIME type; sending attachment untyped");
            Part::bytes(bytes).file_name(file_name)
        })
}

fn to_reqwest_form(form: MultipartForm) -> Form {
    form.into_parts()
        .into_iter()
        .fold(Form::new(), |acc, (name, part)| match part {
            FormPart::Text(value) => acc.text(name, value),
            FormPart::File(file) => acc.part(name, file_part(file)),
        })
}

#[async_trait]
impl LookupSource for HttpBackend {
    async fn fetch_governorates(&self) -> Result<Vec<Governorate>, LookupError> {
        self.get_list("/governorates").await
    }

    async fn fetch_car_models(&self) -> Result<Vec<CarModel>, LookupError> {
        self.get_list("/models").await
    }

    async fn fetch_universities(&self) -> Result<Vec<University>, LookupError> {
        self.get_list("/universities").await
    }

    async fn fetch_faculties(&self) -> Result<Vec<Faculty>, LookupError> {
        self.get_list("/faculties").await
    }
}

#[async_trait]
impl FinancingTransport for HttpBackend {
    async fn send_financing_request(
        &self,
        form: MultipartForm,
    ) -> Result<FinancingRequestResponse, TransportError> {
        let (builder, authorized) = self.request(Method::POST, FINANCING_REQUESTS_PATH);
        let response = self
            .execute(builder.multipart(to_reqwest_form(form)), authorized)
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;

        if !status.is_success() {
            let body = serde_json::from_str::<ErrorBody>(&text).ok();
            let message = body
                .as_ref()
                .and_then(|b| b.message.clone())
                .unwrap_or_else(|| reason(status));
            return Err(TransportError::http(status.as_u16(), message, body));
        }

        serde_json::from_str(&text).map_err(|e| {
            TransportError::http(
                status.as_u16(),
                format!("Could not decode response: {e}"),
                None,
            )
        })
    }
}
