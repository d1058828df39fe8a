//! HTTP implementation of [`PortalBackend`] over reqwest.
//!
//! Holds the access token behind an async `RwLock`, so one `HttpBackend`
//! can be shared across the gate, the views, and the subscriber wiring.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use atrium_core::conversation::MessageRecord;
use atrium_core::types::DbId;

use crate::backend::{
    InvoiceRecord, PortalBackend, ProjectPatch, ProjectRecord, SessionUser, SignupInput,
};
use crate::error::ClientError;

/// Wire shape of a successful auth response. Only the fields the client
/// keeps are deserialized; the rest of the envelope is ignored.
#[derive(Deserialize)]
struct AuthResponseWire {
    access_token: String,
    user: SessionUser,
}

/// Wire shape of `GET /auth/session`.
#[derive(Deserialize)]
struct SessionWire {
    user: SessionUser,
}

/// A [`PortalBackend`] talking JSON over HTTP to an Atrium API server.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpBackend {
    /// Create a backend for the given base URL (e.g. `http://localhost:3000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    /// The WebSocket endpoint for the sync channel, carrying the current
    /// access token as a query parameter (the server authenticates the
    /// upgrade there, since WS handshakes carry no Authorization header).
    pub async fn ws_url(&self) -> Result<String, ClientError> {
        let token = self.bearer().await?;
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            format!("ws://{}", self.base_url)
        };
        Ok(format!("{ws_base}/api/v1/ws?token={token}"))
    }

    async fn bearer(&self) -> Result<String, ClientError> {
        self.token
            .read()
            .await
            .clone()
            .ok_or(ClientError::NotSignedIn)
    }

    async fn store_session(&self, wire: AuthResponseWire) -> SessionUser {
        *self.token.write().await = Some(wire.access_token);
        wire.user
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let token = self.bearer().await?;
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Decode a response: success parses as `T`, anything else becomes a
    /// [`ClientError::Api`] carrying the envelope message.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        if response.status().is_success() {
            return Ok(response.json::<T>().await?);
        }
        Err(Self::decode_error(response).await)
    }

    async fn decode_error(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or(body);
        ClientError::Api { status, message }
    }
}

#[async_trait]
impl PortalBackend for HttpBackend {
    async fn current_session(&self) -> Result<Option<SessionUser>, ClientError> {
        let token = match self.token.read().await.clone() {
            Some(token) => token,
            None => return Ok(None),
        };
        let response = self
            .client
            .get(self.url("/auth/session"))
            .bearer_auth(&token)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            // The token expired; drop it so the gate lands on the sign-in
            // state instead of erroring.
            *self.token.write().await = None;
            return Ok(None);
        }
        let wire: SessionWire = Self::decode(response).await?;
        Ok(Some(wire.user))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, ClientError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let wire: AuthResponseWire = Self::decode(response).await?;
        Ok(self.store_session(wire).await)
    }

    async fn sign_up(&self, input: SignupInput) -> Result<SessionUser, ClientError> {
        let response = self
            .client
            .post(self.url("/auth/signup"))
            .json(&input)
            .send()
            .await?;
        let wire: AuthResponseWire = Self::decode(response).await?;
        Ok(self.store_session(wire).await)
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        // The local session ends regardless of what the server says.
        let token = match self.token.write().await.take() {
            Some(token) => token,
            None => return Ok(()),
        };
        let response = self
            .client
            .post(self.url("/auth/logout"))
            .bearer_auth(token)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::decode_error(response).await)
        }
    }

    async fn my_projects(&self) -> Result<Vec<ProjectRecord>, ClientError> {
        self.get_json("/projects/mine").await
    }

    async fn all_projects(&self) -> Result<Vec<ProjectRecord>, ClientError> {
        self.get_json("/projects").await
    }

    async fn project_messages(
        &self,
        project_id: DbId,
    ) -> Result<Vec<MessageRecord>, ClientError> {
        self.get_json(&format!("/projects/{project_id}/messages")).await
    }

    async fn send_message(
        &self,
        project_id: DbId,
        body: &str,
        client_ref: Uuid,
    ) -> Result<MessageRecord, ClientError> {
        let token = self.bearer().await?;
        let response = self
            .client
            .post(self.url(&format!("/projects/{project_id}/messages")))
            .bearer_auth(token)
            .json(&serde_json::json!({ "body": body, "client_ref": client_ref }))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn update_project(
        &self,
        project_id: DbId,
        patch: ProjectPatch,
    ) -> Result<ProjectRecord, ClientError> {
        let token = self.bearer().await?;
        let response = self
            .client
            .put(self.url(&format!("/projects/{project_id}")))
            .bearer_auth(token)
            .json(&patch)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn invoices(&self, project_id: DbId) -> Result<Vec<InvoiceRecord>, ClientError> {
        self.get_json(&format!("/projects/{project_id}/invoices")).await
    }
}
