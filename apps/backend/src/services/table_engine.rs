//! The live table: one [`Table`], its sessions and everything that gates them.
//!
//! All table and session state sits behind a single lock. Lookups against
//! collaborators (identity, reservations, result store) happen before the
//! lock is taken or after it is released, never while holding it. Reveal
//! pacing sleeps outside the lock too.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::identity::{IdentityService, User};
use super::long_poll::LongPollNotifier;
use super::reservations::{verify_reservation, Reservation, ReservationService};
use super::results::ResultStore;
use super::sessions::{short_ticket, SessionRegistry};
use crate::ai::{run_computer_players, AiPlayer};
use crate::config::EngineConfig;
use crate::domain::state::{Seat, Table, MAX_PLAYERS};
use crate::domain::{GameHistory, PlayerView, TableAction};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};

pub const MAX_NAME_CHARS: usize = 20;
const COMPUTER_NAME_PREFIX: &str = "Computer";

/// Successful outcomes of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Ticket(Uuid),
    /// The table is reserved right now; retry with a bearer token.
    AuthRequired,
}

pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

/// Result-store bookkeeping for the current table.
#[derive(Debug, Default)]
struct ResultLog {
    id: Option<u64>,
    started_utc: Option<OffsetDateTime>,
    players: Vec<String>,
    pending: Vec<GameHistory>,
}

struct Inner {
    table: Table,
    sessions: SessionRegistry,
    /// Bumped whenever the table is wiped; stale result ids are dropped.
    generation: u64,
    results: ResultLog,
    /// History entries already handed to `results.pending`.
    recorded: usize,
    last_card_at: Option<Instant>,
    deal_rng: StdRng,
}

impl Inner {
    fn seat_of_ticket(&self, ticket: &Uuid) -> Result<Seat, DomainError> {
        let session = self.sessions.get(ticket).ok_or_else(unknown_ticket)?;
        self.table.seat_of(&session.player_name).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Player, "session has no seat at the table")
        })
    }

    fn wipe(&mut self) {
        self.table = Table::new();
        self.sessions.clear();
        self.generation += 1;
        self.results = ResultLog::default();
        self.recorded = 0;
        self.last_card_at = None;
    }

    /// Move finished rounds into the result queue.
    fn queue_history(&mut self) {
        if self.table.history.len() > self.recorded {
            let fresh = self.table.history[self.recorded..].to_vec();
            self.recorded = self.table.history.len();
            self.results.pending.extend(fresh);
        }
    }

    /// Session flags mirror the table's speed-up state.
    fn sync_speed_up_flags(&mut self) {
        let Inner {
            table, sessions, ..
        } = self;
        for session in sessions.iter_mut() {
            session.speed_up_confirmed = match (&table.speed_up, table.seat_of(&session.player_name))
            {
                (Some(s), Some(seat)) => s.requested_by == seat || s.confirmed.contains(&seat),
                _ => false,
            };
        }
    }

    fn humans_all_confirmed_start(&self) -> bool {
        self.table.players.iter().all(|p| {
            p.is_computer
                || self
                    .sessions
                    .by_name(&p.name)
                    .is_some_and(|s| s.start_game_confirmed)
        })
    }

    fn remove_seat_by_name(&mut self, name: &str) {
        self.sessions.remove_by_name(name);
        if let Some(seat) = self.table.seat_of(name) {
            self.table.remove_player(seat);
        }
        for session in self.sessions.iter_mut() {
            session.start_game_confirmed = false;
        }
    }

    fn next_computer_name(&self) -> String {
        (1..)
            .map(|n| format!("{COMPUTER_NAME_PREFIX} {n}"))
            .find(|name| self.table.seat_of(name).is_none())
            .unwrap_or_else(|| COMPUTER_NAME_PREFIX.to_string())
    }
}

pub struct TableEngine {
    inner: Mutex<Inner>,
    notifier: LongPollNotifier,
    config: EngineConfig,
    ai: Arc<dyn AiPlayer>,
    identity: Arc<dyn IdentityService>,
    reservations: Arc<ReservationService>,
    results: Arc<dyn ResultStore>,
    /// Serializes result writes; never held together with `inner`.
    result_writer: tokio::sync::Mutex<()>,
    clock: Clock,
}

impl TableEngine {
    pub fn new(
        config: EngineConfig,
        ai: Arc<dyn AiPlayer>,
        identity: Arc<dyn IdentityService>,
        reservations: Arc<ReservationService>,
        results: Arc<dyn ResultStore>,
    ) -> Self {
        let deal_rng = match config.ai_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            inner: Mutex::new(Inner {
                table: Table::new(),
                sessions: SessionRegistry::new(),
                generation: 0,
                results: ResultLog::default(),
                recorded: 0,
                last_card_at: None,
                deal_rng,
            }),
            notifier: LongPollNotifier::new(config.long_poll_max_waiters, config.long_poll_timeout),
            config,
            ai,
            identity,
            reservations,
            results,
            result_writer: tokio::sync::Mutex::new(()),
            clock: Arc::new(OffsetDateTime::now_utc),
        }
    }

    /// Replace the wall clock; used to exercise inactivity and reservations.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> OffsetDateTime {
        (self.clock)()
    }

    /// Wipe the table if any seated player has been idle too long.
    fn sweep(&self, inner: &mut Inner, now: OffsetDateTime) {
        if inner
            .sessions
            .any_expired(now, self.config.inactivity_timeout)
        {
            info!(
                players = inner.table.players.len(),
                "inactivity timeout, table wiped"
            );
            inner.wipe();
            self.notifier.bump();
        }
    }

    /// Let computers act, queue finished rounds and publish a new version.
    fn after_mutation(&self, inner: &mut Inner) -> u64 {
        let before = cards_played(&inner.table);
        run_computer_players(&mut inner.table, self.ai.as_ref());
        if cards_played(&inner.table) != before {
            inner.last_card_at = Some(Instant::now());
        }
        inner.sync_speed_up_flags();
        inner.queue_history();
        debug_assert!(inner.table.cards_partitioned());
        self.notifier.bump()
    }

    async fn active_reservation(&self, now: OffsetDateTime) -> Result<Option<Reservation>, DomainError> {
        self.reservations.active_at(now).await
    }

    /// Seat a player and hand out a ticket.
    pub async fn login(
        &self,
        name: &str,
        bearer: Option<&str>,
    ) -> Result<LoginOutcome, DomainError> {
        let name = validate_name(name)?;
        let user = match bearer {
            Some(token) => self.identity.resolve_token(token).await,
            None => None,
        };
        let now = self.now();
        let reservation = self.active_reservation(now).await?;

        let ticket = {
            let mut inner = self.inner.lock();
            self.sweep(&mut inner, now);

            if inner.table.seat_of(&name).is_some() {
                return Err(DomainError::conflict(
                    ConflictKind::NameTaken,
                    format!("{name} is already seated"),
                ));
            }
            if inner.table.players.len() >= MAX_PLAYERS {
                return Err(DomainError::conflict(
                    ConflictKind::TableFull,
                    "the table is full",
                ));
            }
            if inner.table.is_round_in_progress() {
                return Err(DomainError::conflict(
                    ConflictKind::RoundInProgress,
                    "a round is in progress",
                ));
            }
            if let Some(reservation) = &reservation {
                let Some(user) = &user else {
                    debug!(player = %name, "reserved table, authentication required");
                    return Ok(LoginOutcome::AuthRequired);
                };
                if !reserved_for(reservation, user, &name) {
                    return Err(table_reserved());
                }
            }

            if inner.table.players.is_empty() {
                inner.results.started_utc = Some(now);
            }
            inner.table.add_player(name.clone(), false);
            for session in inner.sessions.iter_mut() {
                session.start_game_confirmed = false;
            }
            let ticket = inner.sessions.create(name.clone(), user, now);
            let version = self.after_mutation(&mut inner);
            info!(player = %name, ticket = %short_ticket(&ticket), version, "player logged in");
            ticket
        };
        Ok(LoginOutcome::Ticket(ticket))
    }

    /// Leave the table. A running round is aborted.
    pub async fn logout(&self, ticket: &Uuid) -> Result<(), DomainError> {
        let now = self.now();
        {
            let mut inner = self.inner.lock();
            self.sweep(&mut inner, now);
            let session = inner.sessions.get(ticket).ok_or_else(unknown_ticket)?;
            let name = session.player_name.clone();
            inner.remove_seat_by_name(&name);
            if inner.table.players.iter().all(|p| p.is_computer) {
                inner.wipe();
            }
            let version = self.after_mutation(&mut inner);
            info!(player = %name, version, "player logged out");
        }
        self.flush_results().await;
        Ok(())
    }

    /// Wipe the table and every session.
    pub async fn reset(&self, ticket: &Uuid) -> Result<(), DomainError> {
        let now = self.now();
        {
            let mut inner = self.inner.lock();
            self.sweep(&mut inner, now);
            let name = inner
                .sessions
                .get(ticket)
                .map(|s| s.player_name.clone())
                .ok_or_else(unknown_ticket)?;
            inner.wipe();
            let version = self.notifier.bump();
            info!(by = %name, version, "table reset");
        }
        Ok(())
    }

    /// Current version; also runs the lazy inactivity sweep.
    pub fn state(&self) -> u64 {
        let now = self.now();
        let mut inner = self.inner.lock();
        self.sweep(&mut inner, now);
        self.notifier.version()
    }

    /// Block until the version moves past `client_version` or the long-poll
    /// timeout elapses.
    pub async fn long_poll(&self, client_version: u64) -> Result<u64, DomainError> {
        self.state();
        self.notifier.wait_for_change(client_version).await
    }

    /// Projection of the table for the ticket holder, or for a spectator.
    pub fn model(&self, ticket: Option<&Uuid>) -> Result<PlayerView, DomainError> {
        let now = self.now();
        let mut inner = self.inner.lock();
        self.sweep(&mut inner, now);
        let viewer = match ticket {
            Some(ticket) => {
                inner.sessions.touch(ticket, now).ok_or_else(unknown_ticket)?;
                Some(inner.seat_of_ticket(ticket)?)
            }
            None => None,
        };
        Ok(PlayerView::build(
            &inner.table,
            viewer,
            self.notifier.version(),
        ))
    }

    /// Apply a table action for the ticket holder. `Ok(false)` means the
    /// action is not legal right now; nothing changed.
    pub async fn act(&self, ticket: &Uuid, action: TableAction) -> Result<bool, DomainError> {
        let now = self.now();
        let delay = {
            let mut inner = self.inner.lock();
            self.sweep(&mut inner, now);
            inner.sessions.touch(ticket, now).ok_or_else(unknown_ticket)?;
            inner.seat_of_ticket(ticket)?;
            match (&action, inner.last_card_at) {
                (TableAction::PlayCard { .. } | TableAction::CollectStitch, Some(at)) => {
                    self.config.reveal_pacing.saturating_sub(at.elapsed())
                }
                _ => Duration::ZERO,
            }
        };
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "pacing card reveal");
            tokio::time::sleep(delay).await;
        }

        let accepted = {
            let mut inner = self.inner.lock();
            // the player may have left or the table been wiped while sleeping
            let seat = inner.seat_of_ticket(ticket)?;
            let played_card = matches!(action, TableAction::PlayCard { .. });
            let kind = action_name(&action);
            if !inner.table.apply(seat, action) {
                debug!(seat, action = kind, phase = ?inner.table.phase, "action rejected");
                return Ok(false);
            }
            if played_card {
                inner.last_card_at = Some(Instant::now());
            }
            let version = self.after_mutation(&mut inner);
            debug!(seat, action = kind, phase = ?inner.table.phase, version, "action applied");
            true
        };
        self.flush_results().await;
        Ok(accepted)
    }

    /// Confirm the start of the next round. The round is dealt once every
    /// seated human has confirmed; computers always count as confirmed.
    pub async fn start_new_round(&self, ticket: &Uuid) -> Result<bool, DomainError> {
        let now = self.now();
        let reservation = self.active_reservation(now).await?;
        let started = {
            let mut inner = self.inner.lock();
            self.sweep(&mut inner, now);
            let session = inner.sessions.get_mut(ticket).ok_or_else(unknown_ticket)?;
            session.last_access = now;
            let name = session.player_name.clone();
            if !inner.table.can_start_round() {
                debug!(player = %name, "start refused, table not ready");
                return Ok(false);
            }
            if let Some(session) = inner.sessions.get_mut(ticket) {
                session.start_game_confirmed = true;
            }
            if !inner.humans_all_confirmed_start() {
                let version = self.notifier.bump();
                debug!(player = %name, version, "start confirmed, waiting for others");
                return Ok(true);
            }

            let seated: Vec<String> = inner.table.players.iter().map(|p| p.name.clone()).collect();
            let evicted = verify_reservation(reservation.as_ref(), &seated);
            if !evicted.is_empty() {
                for name in &evicted {
                    inner.remove_seat_by_name(name);
                }
                let version = self.after_mutation(&mut inner);
                warn!(?evicted, version, "players not on the reservation were removed");
                return Err(table_reserved());
            }

            let seed = inner.deal_rng.random::<u64>();
            let dealt = inner.table.start_round(seed);
            for session in inner.sessions.iter_mut() {
                session.start_game_confirmed = false;
            }
            if inner.results.id.is_none() {
                inner.results.players = seated;
            }
            let version = self.after_mutation(&mut inner);
            info!(
                game = inner.table.game_counter + 1,
                dealer = inner.table.dealer,
                version,
                "round started"
            );
            dealt
        };
        self.flush_results().await;
        Ok(started)
    }

    /// Seat a computer player ("Computer N").
    pub fn add_computer_player(&self, ticket: &Uuid) -> Result<String, DomainError> {
        let now = self.now();
        let mut inner = self.inner.lock();
        self.sweep(&mut inner, now);
        inner.sessions.touch(ticket, now).ok_or_else(unknown_ticket)?;
        if inner.table.players.len() >= MAX_PLAYERS {
            return Err(DomainError::conflict(
                ConflictKind::TableFull,
                "the table is full",
            ));
        }
        if inner.table.is_round_in_progress() {
            return Err(DomainError::conflict(
                ConflictKind::RoundInProgress,
                "a round is in progress",
            ));
        }
        let name = inner.next_computer_name();
        inner.table.add_player(name.clone(), true);
        let version = self.after_mutation(&mut inner);
        info!(player = %name, version, "computer player seated");
        Ok(name)
    }

    /// Write queued round results. Failures are logged and dropped.
    async fn flush_results(&self) {
        let _writer = self.result_writer.lock().await;
        let (generation, id, players, started, pending) = {
            let mut inner = self.inner.lock();
            if inner.results.pending.is_empty() {
                return;
            }
            let started = inner.results.started_utc.unwrap_or_else(|| self.now());
            (
                inner.generation,
                inner.results.id,
                inner.results.players.clone(),
                started,
                std::mem::take(&mut inner.results.pending),
            )
        };

        let id = match id {
            Some(id) => id,
            None => match self.results.create_result(players, started).await {
                Ok(id) => {
                    let mut inner = self.inner.lock();
                    if inner.generation == generation {
                        inner.results.id = Some(id);
                    }
                    id
                }
                Err(e) => {
                    warn!(error = %e, dropped = pending.len(), "could not create result row");
                    return;
                }
            },
        };
        let ended = self.now();
        for entry in pending {
            let game_number = entry.game_number;
            if let Err(e) = self.results.append_history(id, entry, ended).await {
                warn!(error = %e, result_id = id, game_number, "could not store round history");
            }
        }
    }

    /// Seated player names, in seat order.
    pub fn players(&self) -> Vec<String> {
        self.inner
            .lock()
            .table
            .players
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    /// Copy of the table for inspection.
    pub fn snapshot(&self) -> Table {
        self.inner.lock().table.clone()
    }

    pub fn session_user(&self, ticket: &Uuid) -> Option<User> {
        self.inner.lock().sessions.get(ticket)?.user.clone()
    }
}

fn unknown_ticket() -> DomainError {
    DomainError::not_found(NotFoundKind::Session, "unknown session ticket")
}

fn table_reserved() -> DomainError {
    DomainError::conflict(
        ConflictKind::TableReserved,
        "the table is reserved for other players",
    )
}

/// Under a reservation a user sits down under their own account name.
fn reserved_for(reservation: &Reservation, user: &User, name: &str) -> bool {
    user.name == name && reservation.includes(name)
}

fn validate_name(raw: &str) -> Result<String, DomainError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_CHARS {
        return Err(DomainError::validation(
            ValidationKind::InvalidName,
            format!("player names have 1 to {MAX_NAME_CHARS} characters"),
        ));
    }
    Ok(name.to_string())
}

fn cards_played(table: &Table) -> usize {
    table.played_tricks.len() * 3 + table.trick.as_ref().map_or(0, |t| t.plays.len())
}

fn action_name(action: &TableAction) -> &'static str {
    match action {
        TableAction::Bid { .. } => "bid",
        TableAction::Accept => "accept",
        TableAction::Pass => "pass",
        TableAction::PickUpSkat => "pick_up_skat",
        TableAction::PlayHand => "play_hand",
        TableAction::DiscardSkat { .. } => "discard_skat",
        TableAction::SetGame { .. } => "set_game",
        TableAction::SetOption { .. } => "set_option",
        TableAction::PlayCard { .. } => "play_card",
        TableAction::CollectStitch => "collect_stitch",
        TableAction::GiveUp => "give_up",
        TableAction::RequestSpeedUp => "request_speed_up",
        TableAction::ConfirmSpeedUp => "confirm_speed_up",
        TableAction::ContinuePlaying => "continue_playing",
        TableAction::CancelSpeedUp => "cancel_speed_up",
    }
}
