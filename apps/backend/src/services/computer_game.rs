//! Stateless computer games: one human against two computer players.
//!
//! The server keeps nothing. Every call takes the opaque state blob the
//! client got from the previous call and returns the next one:
//! `base64url(deflate(json))` of a [`WireState`]. Seat references travel as
//! player names and are re-linked to seats on decode.

use std::io::{Read, Write};
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai::{run_computer_players, AiPlayer};
use crate::domain::state::{Seat, Table, ACTIVE_PLAYERS};
use crate::domain::{PlayerView, TableAction};
use crate::errors::domain::{DomainError, ValidationKind};

pub const SCHEMA_VERSION: u32 = 1;
/// Decoded JSON larger than this is rejected.
const MAX_STATE_BYTES: u64 = 256 * 1024;
const OPPONENTS: [&str; 2] = ["Computer 1", "Computer 2"];

/// Serialized form of a computer game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireState {
    pub schema_version: u32,
    /// Accepted actions so far; doubles as the view version.
    pub revision: u64,
    pub table: TableWire,
}

/// [`Table`] with its seat references spelled out as names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableWire {
    pub table: Table,
    pub current_player: Option<String>,
    pub game_player: Option<String>,
    pub inactive_player: Option<String>,
}

impl TableWire {
    fn from_table(table: &Table) -> Self {
        let name = |seat: Option<Seat>| seat.and_then(|s| table.name_of(s)).map(str::to_string);
        Self {
            table: table.clone(),
            current_player: name(table.current_player),
            game_player: name(table.game_player),
            inactive_player: name(table.inactive_player),
        }
    }

    fn into_table(self) -> Result<Table, DomainError> {
        let mut table = self.table;
        let link = |name: Option<String>, role: &str| -> Result<Option<Seat>, DomainError> {
            name.map(|n| {
                table.seat_of(&n).ok_or_else(|| {
                    invalid_state(format!("{role} '{n}' is not seated at this table"))
                })
            })
            .transpose()
        };
        let current = link(self.current_player, "current player")?;
        let game = link(self.game_player, "declarer")?;
        let inactive = link(self.inactive_player, "inactive player")?;
        table.current_player = current;
        table.game_player = game;
        table.inactive_player = inactive;
        Ok(table)
    }
}

pub fn encode(table: &Table, revision: u64) -> Result<String, DomainError> {
    let wire = WireState {
        schema_version: SCHEMA_VERSION,
        revision,
        table: TableWire::from_table(table),
    };
    let json = serde_json::to_vec(&wire)
        .map_err(|e| invalid_state(format!("cannot serialize table: {e}")))?;
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| invalid_state(format!("cannot compress table: {e}")))?;
    let compressed = encoder
        .finish()
        .map_err(|e| invalid_state(format!("cannot compress table: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// Decode and check a state blob; returns the table and its revision.
pub fn decode(blob: &str) -> Result<(Table, u64), DomainError> {
    let compressed = URL_SAFE_NO_PAD
        .decode(blob.trim())
        .map_err(|_| invalid_state("state is not valid base64url"))?;
    let mut json = Vec::new();
    DeflateDecoder::new(compressed.as_slice())
        .take(MAX_STATE_BYTES + 1)
        .read_to_end(&mut json)
        .map_err(|_| invalid_state("state is not valid deflate data"))?;
    if json.len() as u64 > MAX_STATE_BYTES {
        return Err(invalid_state("state is too large"));
    }

    let wire: WireState = serde_json::from_slice(&json)
        .map_err(|e| invalid_state(format!("state does not parse: {e}")))?;
    if wire.schema_version != SCHEMA_VERSION {
        return Err(invalid_state(format!(
            "unsupported state schema version {}",
            wire.schema_version
        )));
    }
    let table = wire.table.into_table()?;
    table.validate()?;
    Ok((table, wire.revision))
}

/// Result of every computer-game call.
#[derive(Debug, Clone, Serialize)]
pub struct ComputerGameResponse {
    pub accepted: bool,
    pub state: String,
    pub view: PlayerView,
}

pub struct ComputerGameService {
    ai: Arc<dyn AiPlayer>,
    rng: Mutex<StdRng>,
}

impl ComputerGameService {
    pub fn new(ai: Arc<dyn AiPlayer>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            ai,
            rng: Mutex::new(rng),
        }
    }

    /// Seat `player_name` with two computer opponents and deal the first round.
    pub fn new_game(&self, player_name: &str) -> Result<ComputerGameResponse, DomainError> {
        let name = player_name.trim();
        if name.is_empty() || OPPONENTS.contains(&name) {
            return Err(DomainError::validation(
                ValidationKind::InvalidName,
                "choose a different player name",
            ));
        }
        let mut table = Table::new();
        table.add_player(name, false);
        for opponent in OPPONENTS {
            table.add_player(opponent, true);
        }
        let dealt = self.deal(&mut table);
        info!(player = %name, "computer game started");
        self.respond(table, 0, dealt, name)
    }

    pub fn act(
        &self,
        player_name: &str,
        state: &str,
        action: TableAction,
    ) -> Result<ComputerGameResponse, DomainError> {
        let (mut table, revision) = decode(state)?;
        let seat = human_seat(&table, player_name)?;
        let accepted = table.apply(seat, action);
        if accepted {
            run_computer_players(&mut table, self.ai.as_ref());
        } else {
            debug!(player = %player_name, phase = ?table.phase, "computer game action rejected");
        }
        self.respond(table, revision, accepted, player_name)
    }

    /// View of the game without changing it.
    pub fn model(&self, player_name: &str, state: &str) -> Result<ComputerGameResponse, DomainError> {
        let (table, revision) = decode(state)?;
        let seat = human_seat(&table, player_name)?;
        Ok(ComputerGameResponse {
            accepted: true,
            state: state.to_string(),
            view: PlayerView::build(&table, Some(seat), revision),
        })
    }

    pub fn start_next_round(
        &self,
        player_name: &str,
        state: &str,
    ) -> Result<ComputerGameResponse, DomainError> {
        let (mut table, revision) = decode(state)?;
        human_seat(&table, player_name)?;
        let dealt = self.deal(&mut table);
        self.respond(table, revision, dealt, player_name)
    }

    fn deal(&self, table: &mut Table) -> bool {
        let seed = self.rng.lock().random::<u64>();
        let dealt = table.start_round(seed);
        if dealt {
            run_computer_players(table, self.ai.as_ref());
        }
        dealt
    }

    fn respond(
        &self,
        table: Table,
        revision: u64,
        accepted: bool,
        player_name: &str,
    ) -> Result<ComputerGameResponse, DomainError> {
        let revision = if accepted { revision + 1 } else { revision };
        let seat = human_seat(&table, player_name)?;
        Ok(ComputerGameResponse {
            accepted,
            state: encode(&table, revision)?,
            view: PlayerView::build(&table, Some(seat), revision),
        })
    }
}

/// The human's seat; a computer game has exactly three players, one human.
fn human_seat(table: &Table, player_name: &str) -> Result<Seat, DomainError> {
    let humans = table.players.iter().filter(|p| !p.is_computer).count();
    if table.players.len() != ACTIVE_PLAYERS || humans != 1 {
        return Err(invalid_state("not a computer game"));
    }
    table
        .seat_of(player_name.trim())
        .filter(|&s| !table.players[s].is_computer)
        .ok_or_else(|| invalid_state("player is not part of this game"))
}

fn invalid_state(detail: impl Into<String>) -> DomainError {
    DomainError::validation(ValidationKind::InvalidState, detail)
}
