//! Thin `reqwest` wrapper for the admin REST API.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use shopno_core::EntityId;

use crate::form::{Encoding, FormPayload};
use crate::{ApiError, ApiResult, ClientConfig, Session};

pub const CSRF_HEADER: &str = "X-CSRF-TOKEN";

/// API responses come either bare or wrapped as `{ "data": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } | Envelope::Bare(data) => data,
        }
    }
}

/// HTTP client bound to one [`Session`].
///
/// Every request carries the session's bearer token and CSRF token. A 401
/// response invalidates the session before the error is returned.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    session: Session,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: Session) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config: Arc::new(config),
            session,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.api_url(path);
        tracing::debug!(method = method.as_str(), url = url.as_str(), "api request");

        let mut req = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header("X-Requested-With", "XMLHttpRequest");

        if let Some(token) = self.session.token() {
            req = req.bearer_auth(token);
        }
        if let Some(csrf) = self.session.csrf_token() {
            req = req.header(CSRF_HEADER, csrf);
        }
        req
    }

    async fn send(&self, req: RequestBuilder, path: &str) -> ApiResult<Response> {
        let resp = req.send().await.map_err(|e| {
            tracing::warn!(path, error = %e, "api request failed");
            ApiError::from(e)
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let err = ApiError::from_status(status.as_u16(), &body, self.config.login_route());

        if err.is_unauthorized() {
            tracing::info!(path, login_route = self.config.login_route(), "session rejected; token dropped");
            self.session.invalidate();
        } else {
            tracing::warn!(path, status = status.as_u16(), error = %err, "api error");
        }
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
        let bytes = resp.bytes().await?;
        let envelope: Envelope<T> =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(envelope.into_inner())
    }

    /// `GET /api/<path>` decoding the (possibly wrapped) body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let resp = self.send(self.request(Method::GET, path), path).await?;
        Self::decode(resp).await
    }

    /// `<method> /api/<path>` with a JSON body.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &Value,
    ) -> ApiResult<T> {
        let resp = self.send(self.request(method, path).json(body), path).await?;
        Self::decode(resp).await
    }

    /// `<method> /api/<path>` expecting no meaningful response body.
    pub async fn send_empty(&self, method: Method, path: &str, body: Option<&Value>) -> ApiResult<()> {
        let mut req = self.request(method, path);
        if let Some(body) = body {
            req = req.json(body);
        }
        self.send(req, path).await?;
        Ok(())
    }

    /// `GET /api/<resource>`.
    pub async fn list<T: DeserializeOwned>(&self, resource: &str) -> ApiResult<Vec<T>> {
        self.get_json(resource).await
    }

    /// `GET /api/<resource>/{id}`.
    pub async fn fetch<T: DeserializeOwned>(&self, resource: &str, id: EntityId) -> ApiResult<T> {
        self.get_json(&format!("{resource}/{id}")).await
    }

    /// `POST /api/<resource>`.
    pub async fn create<T: DeserializeOwned>(
        &self,
        resource: &str,
        payload: &FormPayload,
        encoding: Encoding,
    ) -> ApiResult<T> {
        let req = self.request(Method::POST, resource);
        let req = match encoding {
            Encoding::Multipart => req.multipart(payload.to_multipart(None)?),
            Encoding::Json => req.json(&payload.to_json()?),
        };
        let resp = self.send(req, resource).await?;
        Self::decode(resp).await
    }

    /// Update an entity: `POST` + `_method=PUT` for multipart, native `PUT` for JSON.
    pub async fn update<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: EntityId,
        payload: &FormPayload,
        encoding: Encoding,
    ) -> ApiResult<T> {
        let path = format!("{resource}/{id}");
        let req = match encoding {
            Encoding::Multipart => self
                .request(Method::POST, &path)
                .multipart(payload.to_multipart(Some("PUT"))?),
            Encoding::Json => self.request(Method::PUT, &path).json(&payload.to_json()?),
        };
        let resp = self.send(req, &path).await?;
        Self::decode(resp).await
    }

    /// `DELETE /api/<resource>/{id}`.
    pub async fn delete(&self, resource: &str, id: EntityId) -> ApiResult<()> {
        self.send_empty(Method::DELETE, &format!("{resource}/{id}"), None).await
    }
}
