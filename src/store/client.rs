//! # Store Client
//!
//! The cloneable handle onto the [`StoreActor`](crate::store::StoreActor). It does not
//! expose reads or writes directly: callers open a [`Session`] first, which takes a
//! permit from the bounded session pool for as long as the session lives.

use crate::config::StoreConfig;
use crate::store::error::StoreError;
use crate::store::message::{Response, StoreRequest};
use crate::store::session::Session;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Semaphore};

#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
    sessions: Arc<Semaphore>,
    next_session: Arc<AtomicU64>,
    acquire_timeout: Duration,
    request_timeout: Duration,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>, config: &StoreConfig) -> Self {
        Self {
            sender,
            sessions: Arc::new(Semaphore::new(config.max_sessions.max(1))),
            next_session: Arc::new(AtomicU64::new(1)),
            acquire_timeout: config.acquire_timeout(),
            request_timeout: config.request_timeout(),
        }
    }

    /// Opens a session scoped to one operation.
    ///
    /// Waits for a free slot in the session pool for at most the configured acquire
    /// timeout. The slot is returned when the session is dropped.
    #[tracing::instrument(skip(self))]
    pub async fn session(&self) -> Result<Session, StoreError> {
        let permit = tokio::time::timeout(
            self.acquire_timeout,
            self.sessions.clone().acquire_owned(),
        )
        .await
        .map_err(|_| StoreError::Timeout(self.acquire_timeout))?
        .map_err(|_| StoreError::Closed)?;

        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(session = id, "Session opened");
        Ok(Session::new(self.clone(), id, permit))
    }

    /// Number of sessions that could be opened right now without waiting.
    pub fn available_sessions(&self) -> usize {
        self.sessions.available_permits()
    }

    /// Sends one request and waits for its reply, bounded by the request timeout.
    pub(crate) async fn call<T>(
        &self,
        make: impl FnOnce(Response<T>) -> StoreRequest,
    ) -> Result<T, StoreError> {
        let round_trip = async {
            let (respond_to, response) = oneshot::channel();
            self.sender
                .send(make(respond_to))
                .await
                .map_err(|_| StoreError::Closed)?;
            response.await.map_err(|_| StoreError::Dropped)?
        };
        tokio::time::timeout(self.request_timeout, round_trip)
            .await
            .map_err(|_| StoreError::Timeout(self.request_timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreActor;

    fn config(max_sessions: usize) -> StoreConfig {
        StoreConfig {
            max_sessions,
            acquire_timeout_ms: 50,
            ..StoreConfig::in_memory()
        }
    }

    #[tokio::test]
    async fn test_session_pool_is_bounded() {
        let (actor, client) = StoreActor::connect(&config(1)).await.unwrap();
        tokio::spawn(actor.run());

        let held = client.session().await.unwrap();
        assert_eq!(client.available_sessions(), 0);

        let err = client.session().await.unwrap_err();
        assert_eq!(err, StoreError::Timeout(Duration::from_millis(50)));

        drop(held);
        assert_eq!(client.available_sessions(), 1);
        assert!(client.session().await.is_ok());
    }

    #[tokio::test]
    async fn test_request_to_stopped_store_fails_closed() {
        let (actor, client) = StoreActor::connect(&config(4)).await.unwrap();
        drop(actor);

        let session = client.session().await.unwrap();
        let err = session.list::<crate::model::Incident>().await.unwrap_err();
        assert_eq!(err, StoreError::Closed);
    }
}
