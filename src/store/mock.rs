//! # Mock Store
//!
//! Utilities for testing services without a running [`StoreActor`](crate::store::StoreActor).
//!
//! A [`MockStore`] hands out a real [`StoreClient`] whose requests are answered from a
//! queue of scripted expectations, in order. Requests that arrive with no matching
//! expectation are answered with a backend error and counted; [`MockStore::verify`] fails
//! the test if any were seen or if expectations are left over.

use crate::config::StoreConfig;
use crate::store::client::StoreClient;
use crate::store::error::StoreError;
use crate::store::message::{StoreRequest, Write};
use crate::store::record::{Row, Table};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

enum Expectation {
    Get {
        table: Table,
        response: Result<Option<Row>, StoreError>,
    },
    List {
        table: Table,
        response: Result<Vec<Row>, StoreError>,
    },
    Commit {
        response: Result<Vec<Row>, StoreError>,
    },
}

type Queue = Arc<Mutex<VecDeque<Expectation>>>;

fn lock(queue: &Queue) -> MutexGuard<'_, VecDeque<Expectation>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A scripted store with expectation tracking.
///
/// # Example
/// ```ignore
/// let mock = MockStore::new();
/// mock.expect_get(Table::Incidents).return_ok(None);
/// mock.expect_commit().return_err(StoreError::Backend("disk full".into()));
///
/// let service = IncidentService::new(mock.client());
/// // Use service in tests...
/// mock.verify();
/// ```
pub struct MockStore {
    client: StoreClient,
    expectations: Queue,
    unexpected: Arc<AtomicUsize>,
    commits: Arc<Mutex<Vec<Vec<Write>>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockStore {
    /// Creates a mock store with no expectations.
    pub fn new() -> Self {
        let config = StoreConfig::default();
        let (sender, mut receiver) = mpsc::channel::<StoreRequest>(config.channel_capacity);
        let expectations: Queue = Arc::new(Mutex::new(VecDeque::new()));
        let unexpected = Arc::new(AtomicUsize::new(0));
        let commits = Arc::new(Mutex::new(Vec::new()));

        let queue = expectations.clone();
        let misses = unexpected.clone();
        let seen = commits.clone();
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = lock(&queue).pop_front();

                match (request, expectation) {
                    (
                        StoreRequest::Get {
                            table, respond_to, ..
                        },
                        Some(Expectation::Get {
                            table: expected,
                            response,
                        }),
                    ) if table == expected => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::List { table, respond_to },
                        Some(Expectation::List {
                            table: expected,
                            response,
                        }),
                    ) if table == expected => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Commit {
                            writes, respond_to, ..
                        },
                        Some(Expectation::Commit { response }),
                    ) => {
                        seen.lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(writes);
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        misses.fetch_add(1, Ordering::SeqCst);
                        reject(request);
                    }
                }
            }
        });

        Self {
            client: StoreClient::new(sender, &config),
            expectations,
            unexpected,
            commits,
            _handle: handle,
        }
    }

    /// Returns a client wired to this mock.
    pub fn client(&self) -> StoreClient {
        self.client.clone()
    }

    /// Expects a `get` on `table`.
    pub fn expect_get(&self, table: Table) -> GetExpectationBuilder {
        GetExpectationBuilder {
            table,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `list` on `table`.
    pub fn expect_list(&self, table: Table) -> ListExpectationBuilder {
        ListExpectationBuilder {
            table,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a commit.
    pub fn expect_commit(&self) -> CommitExpectationBuilder {
        CommitExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Every batch of writes the mock received, in arrival order.
    pub fn committed(&self) -> Vec<Vec<Write>> {
        self.commits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Verifies that all expectations were met and nothing unexpected arrived.
    pub fn verify(&self) {
        let unexpected = self.unexpected.load(Ordering::SeqCst);
        if unexpected > 0 {
            panic!("{} unexpected store request(s)", unexpected);
        }
        let remaining = lock(&self.expectations).len();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

fn reject(request: StoreRequest) {
    let error = || StoreError::Backend("unexpected request".to_string());
    match request {
        StoreRequest::Get { respond_to, .. } => {
            let _ = respond_to.send(Err(error()));
        }
        StoreRequest::List { respond_to, .. } => {
            let _ = respond_to.send(Err(error()));
        }
        StoreRequest::Commit { respond_to, .. } => {
            let _ = respond_to.send(Err(error()));
        }
    }
}

/// Builder for `get` expectations.
pub struct GetExpectationBuilder {
    table: Table,
    expectations: Queue,
}

impl GetExpectationBuilder {
    pub fn return_ok(self, row: Option<Row>) {
        lock(&self.expectations).push_back(Expectation::Get {
            table: self.table,
            response: Ok(row),
        });
    }

    pub fn return_err(self, error: StoreError) {
        lock(&self.expectations).push_back(Expectation::Get {
            table: self.table,
            response: Err(error),
        });
    }
}

/// Builder for `list` expectations.
pub struct ListExpectationBuilder {
    table: Table,
    expectations: Queue,
}

impl ListExpectationBuilder {
    pub fn return_ok(self, rows: Vec<Row>) {
        lock(&self.expectations).push_back(Expectation::List {
            table: self.table,
            response: Ok(rows),
        });
    }

    pub fn return_err(self, error: StoreError) {
        lock(&self.expectations).push_back(Expectation::List {
            table: self.table,
            response: Err(error),
        });
    }
}

/// Builder for commit expectations.
pub struct CommitExpectationBuilder {
    expectations: Queue,
}

impl CommitExpectationBuilder {
    pub fn return_ok(self, rows: Vec<Row>) {
        lock(&self.expectations).push_back(Expectation::Commit { response: Ok(rows) });
    }

    pub fn return_err(self, error: StoreError) {
        lock(&self.expectations).push_back(Expectation::Commit {
            response: Err(error),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Resource;

    #[tokio::test]
    async fn test_mock_store_with_expectations() {
        let mock = MockStore::new();
        mock.expect_list(Table::Resources).return_ok(Vec::new());
        mock.expect_get(Table::Resources)
            .return_err(StoreError::Backend("disk full".into()));

        let session = mock.client().session().await.unwrap();
        assert!(session.list::<Resource>().await.unwrap().is_empty());
        assert_eq!(
            session.get::<Resource>(1).await.unwrap_err(),
            StoreError::Backend("disk full".into())
        );

        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "unexpected store request")]
    async fn test_unscripted_request_fails_verify() {
        let mock = MockStore::new();
        let session = mock.client().session().await.unwrap();
        assert!(session.list::<Resource>().await.is_err());
        mock.verify();
    }
}
