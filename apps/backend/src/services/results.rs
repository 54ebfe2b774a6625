//! Result store collaborator: one row per table, one history entry per round.
//!
//! Writes happen outside the table lock. Failures are reported to the caller,
//! which logs and drops them; a round never waits on its record.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use time::OffsetDateTime;

use crate::domain::GameHistory;
use crate::errors::domain::{DomainError, InfraErrorKind};

/// Append-only record of a table's games.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub id: u64,
    pub players: Vec<String>,
    pub started_utc: OffsetDateTime,
    pub ended_utc: Option<OffsetDateTime>,
    pub history: Vec<GameHistory>,
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Create the row for a new table and return its id.
    async fn create_result(
        &self,
        players: Vec<String>,
        started_utc: OffsetDateTime,
    ) -> Result<u64, DomainError>;

    /// Append one completed round and move `ended_utc` forward.
    async fn append_history(
        &self,
        id: u64,
        entry: GameHistory,
        ended_utc: OffsetDateTime,
    ) -> Result<(), DomainError>;
}

#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    next_id: AtomicU64,
    rows: Mutex<HashMap<u64, ResultRow>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u64) -> Option<ResultRow> {
        self.rows.lock().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn create_result(
        &self,
        players: Vec<String>,
        started_utc: OffsetDateTime,
    ) -> Result<u64, DomainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.rows.lock().insert(
            id,
            ResultRow {
                id,
                players,
                started_utc,
                ended_utc: None,
                history: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn append_history(
        &self,
        id: u64,
        entry: GameHistory,
        ended_utc: OffsetDateTime,
    ) -> Result<(), DomainError> {
        let mut rows = self.rows.lock();
        let row = rows.get_mut(&id).ok_or_else(|| {
            DomainError::infra(InfraErrorKind::Persistence, format!("no result row {id}"))
        })?;
        row.history.push(entry);
        row.ended_utc = Some(ended_utc);
        Ok(())
    }
}
