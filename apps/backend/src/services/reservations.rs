//! Table reservations: scheduled windows during which only the listed
//! players may sit down.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime, Time};
use tracing::{debug, info};
use uuid::Uuid;

use super::identity::User;
use crate::domain::state::{MAX_PLAYERS, MIN_PLAYERS};
use crate::errors::domain::{
    AuthKind, ConflictKind, DomainError, NotFoundKind, ValidationKind,
};

pub const MIN_DURATION_MINUTES: u32 = 60;
pub const MAX_DURATION_MINUTES: u32 = 240;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub reserved_at_utc: OffsetDateTime,
    pub duration_minutes: u32,
    pub players: Vec<String>,
    pub reserved_by: String,
}

impl Reservation {
    pub fn ends_at(&self) -> OffsetDateTime {
        self.reserved_at_utc + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Half-open window `[start, end)`.
    pub fn is_active_at(&self, now: OffsetDateTime) -> bool {
        self.reserved_at_utc <= now && now < self.ends_at()
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.ends_at() <= now
    }

    pub fn overlaps(&self, start: OffsetDateTime, end: OffsetDateTime) -> bool {
        self.reserved_at_utc < end && start < self.ends_at()
    }

    pub fn includes(&self, name: &str) -> bool {
        self.players.iter().any(|p| p == name)
    }
}

/// Request body for a new reservation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReservation {
    #[serde(with = "time::serde::rfc3339")]
    pub reserved_at_utc: OffsetDateTime,
    pub duration_minutes: u32,
    pub players: Vec<String>,
}

/// Persistence collaborator for reservations.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Reservation>, DomainError>;
    async fn insert(&self, reservation: Reservation) -> Result<(), DomainError>;
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

#[derive(Debug, Default)]
pub struct InMemoryReservationStore {
    rows: Mutex<Vec<Reservation>>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn list(&self) -> Result<Vec<Reservation>, DomainError> {
        Ok(self.rows.lock().clone())
    }

    async fn insert(&self, reservation: Reservation) -> Result<(), DomainError> {
        self.rows.lock().push(reservation);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() != before)
    }
}

/// Validation and scheduling rules on top of a [`ReservationStore`].
///
/// Every method takes `now` explicitly; callers pass the wall clock.
pub struct ReservationService {
    store: Arc<dyn ReservationStore>,
    horizon: Duration,
    /// Serializes check-then-insert so two overlapping requests cannot both pass.
    write_lock: tokio::sync::Mutex<()>,
}

impl ReservationService {
    pub fn new(store: Arc<dyn ReservationStore>, horizon_days: i64) -> Self {
        Self {
            store,
            horizon: Duration::days(horizon_days),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Reservations that have not ended yet, earliest first. Expired ones are
    /// deleted from the store.
    pub async fn list(&self, now: OffsetDateTime) -> Result<Vec<Reservation>, DomainError> {
        let all = self.store.list().await?;
        let (expired, mut live): (Vec<_>, Vec<_>) =
            all.into_iter().partition(|r| r.is_expired_at(now));
        for r in &expired {
            self.store.delete(r.id).await?;
        }
        if !expired.is_empty() {
            debug!(purged = expired.len(), "expired reservations purged");
        }
        live.sort_by_key(|r| r.reserved_at_utc);
        Ok(live)
    }

    pub async fn create(
        &self,
        user: &User,
        request: NewReservation,
        now: OffsetDateTime,
    ) -> Result<Reservation, DomainError> {
        let start = request.reserved_at_utc;
        let end = start
            .checked_add(Duration::minutes(i64::from(request.duration_minutes)))
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::InvalidReservation,
                    "duration must be between 60 and 240 minutes",
                )
            })?;

        // a clash with a booked window wins over any shape problem
        let _write = self.write_lock.lock().await;
        if self.list(now).await?.iter().any(|r| r.overlaps(start, end)) {
            return Err(DomainError::conflict(
                ConflictKind::ReservationOverlap,
                "the table is already reserved in this time window",
            ));
        }
        let players = validate(&request, now, self.horizon)?;
        let reservation = Reservation {
            id: Uuid::new_v4(),
            reserved_at_utc: start,
            duration_minutes: request.duration_minutes,
            players,
            reserved_by: user.name.clone(),
        };
        self.store.insert(reservation.clone()).await?;
        info!(
            id = %reservation.id,
            start = %reservation.reserved_at_utc,
            minutes = reservation.duration_minutes,
            reserved_by = %reservation.reserved_by,
            "reservation created"
        );
        Ok(reservation)
    }

    /// Delete a reservation; only its creator or an admin may.
    pub async fn delete(&self, user: &User, id: Uuid) -> Result<(), DomainError> {
        let _write = self.write_lock.lock().await;
        let existing = self
            .store
            .list()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Reservation, format!("reservation {id}"))
            })?;
        if existing.reserved_by != user.name && !user.is_admin() {
            return Err(DomainError::auth(
                AuthKind::Forbidden,
                "only the creator or an admin may delete a reservation",
            ));
        }
        self.store.delete(id).await?;
        info!(%id, by = %user.name, "reservation deleted");
        Ok(())
    }

    /// The reservation whose window contains `now`, if any.
    pub async fn active_at(&self, now: OffsetDateTime) -> Result<Option<Reservation>, DomainError> {
        Ok(self
            .list(now)
            .await?
            .into_iter()
            .find(|r| r.is_active_at(now)))
    }
}

/// Seated players not on `reservation`'s list; they are evicted when a round
/// is started inside the window.
pub fn verify_reservation(reservation: Option<&Reservation>, seated: &[String]) -> Vec<String> {
    match reservation {
        Some(r) => seated.iter().filter(|n| !r.includes(n)).cloned().collect(),
        None => Vec::new(),
    }
}

fn validate(
    request: &NewReservation,
    now: OffsetDateTime,
    horizon: Duration,
) -> Result<Vec<String>, DomainError> {
    let invalid = |detail: &str| {
        DomainError::validation(ValidationKind::InvalidReservation, detail.to_string())
    };

    let earliest = now.replace_time(Time::from_hms(now.hour(), 0, 0).unwrap_or(Time::MIDNIGHT));
    if request.reserved_at_utc < earliest || request.reserved_at_utc > now + horizon {
        return Err(invalid("start time is outside the bookable range"));
    }
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&request.duration_minutes) {
        return Err(invalid("duration must be between 60 and 240 minutes"));
    }

    let players: Vec<String> = request
        .players
        .iter()
        .map(|p| p.trim().to_string())
        .collect();
    if players.iter().any(String::is_empty) {
        return Err(invalid("player names must not be empty"));
    }
    let distinct: HashSet<&str> = players.iter().map(String::as_str).collect();
    if distinct.len() != players.len() {
        return Err(invalid("player names must be distinct"));
    }
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players.len()) {
        return Err(invalid("a reservation lists 3 or 4 players"));
    }
    Ok(players)
}
