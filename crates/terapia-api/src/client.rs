use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::transport::{ApiRequest, Method, RawResponse, Transport};

/// Supplies the bearer token attached to outgoing requests.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Typed JSON calls over a [`Transport`], with error classification.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    tokens: Option<Arc<dyn TokenProvider>>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            tokens: None,
        }
    }

    /// Attach `Authorization: Bearer` from `tokens` to every request.
    pub fn with_token_provider(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Send a request and classify the outcome. Only 2xx responses are `Ok`.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<RawResponse, ApiError> {
        if request.bearer.is_none() {
            request.bearer = self.tokens.as_ref().and_then(|t| t.bearer_token());
        }

        let method = request.method;
        let path = request.path.clone();
        tracing::debug!(method = method.as_str(), path = %path, "sending request");

        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(method = method.as_str(), path = %path, error = %e, "request failed");
            ApiError::from(e)
        })?;

        if response.is_success() {
            Ok(response)
        } else {
            tracing::warn!(
                method = method.as_str(),
                path = %path,
                status = response.status,
                "backend returned an error status"
            );
            Err(ApiError::from_status(response.status, &response.body))
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// POST/PUT a JSON body. An empty response body yields `Ok(None)`.
    pub async fn send_json<B, T>(
        &self,
        method: Method,
        path: impl Into<String>,
        body: &B,
    ) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::new(method, path).with_body(serde_json::to_value(body)?);
        let response = self.execute(request).await?;
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&response.body)?))
    }

    pub async fn delete(&self, path: impl Into<String>) -> Result<(), ApiError> {
        self.execute(ApiRequest::delete(path)).await?;
        Ok(())
    }
}
