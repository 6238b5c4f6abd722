#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use terapia_api::transport::BoxFuture;
use terapia_api::{ApiClient, ApiRequest, EntityApi, Method, RawResponse, Transport, TransportError};
use terapia_core::entity::Entity;

enum Reply {
    Now(Result<RawResponse, TransportError>),
    Held(oneshot::Receiver<RawResponse>),
}

/// Scripted backend: answers requests in order and records them.
#[derive(Default)]
pub struct FakeBackend {
    requests: Mutex<Vec<ApiRequest>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ok(&self, body: &str) {
        self.status(200, body);
    }

    pub fn status(&self, status: u16, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Now(Ok(response(status, body))));
    }

    pub fn offline(&self) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Now(Err(TransportError("connection refused".to_string()))));
    }

    /// Queue a reply that only arrives once the returned sender is used.
    pub fn hold(&self) -> oneshot::Sender<RawResponse> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Reply::Held(rx));
        tx
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    /// Yield until at least `n` requests have been sent.
    pub async fn wait_for_requests(&self, n: usize) {
        for _ in 0..1000 {
            if self.requests.lock().unwrap().len() >= n {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("expected {n} requests, saw {:?}", self.requests());
    }
}

impl Transport for FakeBackend {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<RawResponse, TransportError>> {
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        Box::pin(async move {
            match reply {
                Some(Reply::Now(result)) => result,
                Some(Reply::Held(rx)) => rx
                    .await
                    .map_err(|_| TransportError("held reply dropped".to_string())),
                None => Err(TransportError("no scripted reply".to_string())),
            }
        })
    }
}

pub fn response(status: u16, body: &str) -> RawResponse {
    RawResponse {
        status,
        body: body.as_bytes().to_vec(),
    }
}

pub fn entity_api<E: Entity>(backend: &Arc<FakeBackend>) -> EntityApi<E> {
    EntityApi::new(ApiClient::new(backend.clone()))
}
