use anyhow::{anyhow, Context, Result};
use lgit_core::domain::Outcome;
use lgit_core::error::CoreError;
use lgit_core::protocol::{Request, Response};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use super::session::RepositorySession;

/// A queued request and the slot its reply goes to
struct Envelope {
    request: Request,
    reply: oneshot::Sender<Response>,
}

/// Cloneable sender side of the session service
#[derive(Clone)]
pub struct SessionHandle {
    request_tx: mpsc::UnboundedSender<Envelope>,
}

impl SessionHandle {
    /// Queue a request and wait for its reply
    pub async fn send(&self, request: Request) -> Result<Response> {
        let pending = self.submit(request)?;
        pending.await.context("Session service dropped the request")
    }

    /// Queue a request without waiting. Replies arrive in submission order,
    /// so several requests can be kept in flight.
    pub fn submit(&self, request: Request) -> Result<oneshot::Receiver<Response>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request_tx
            .send(Envelope {
                request,
                reply: reply_tx,
            })
            .map_err(|_| anyhow!("Session service has stopped"))?;
        Ok(reply_rx)
    }
}

/// Runs a [`RepositorySession`] on one worker. Requests are taken from the
/// queue strictly in order and each finishes before the next one starts.
pub struct SessionService {
    session: Arc<Mutex<RepositorySession>>,
    request_rx: mpsc::UnboundedReceiver<Envelope>,
}

impl SessionService {
    pub fn new(session: RepositorySession) -> (Self, SessionHandle) {
        let (request_tx, request_rx) = mpsc::unbounded_channel();

        let service = Self {
            session: Arc::new(Mutex::new(session)),
            request_rx,
        };

        (service, SessionHandle { request_tx })
    }

    /// Serve until every handle is dropped
    pub async fn run(mut self) -> Result<()> {
        info!("Session service started");

        while let Some(Envelope { request, reply }) = self.request_rx.recv().await {
            let id = request.id;
            let response = self.process(request).await;
            if reply.send(response).is_err() {
                debug!("Reply for request {} dropped, requester went away", id);
            }
        }

        info!("Request channel closed, session service stopping");
        Ok(())
    }

    async fn process(&self, request: Request) -> Response {
        let session = Arc::clone(&self.session);
        let pending = request.clone();

        // git2 calls block, keep them off the async workers
        let result = tokio::task::spawn_blocking(move || {
            let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
            session.dispatch(&pending)
        })
        .await;

        match result {
            Ok(response) => response,
            Err(e) => {
                error!("Command task for request {} failed: {}", request.id, e);
                let repository = self
                    .session
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .repository_path();
                let failure = CoreError::Internal {
                    reason: e.to_string(),
                };
                Response::new(&request, repository, Outcome::from(failure))
            }
        }
    }
}
