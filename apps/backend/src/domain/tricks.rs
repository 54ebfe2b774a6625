use crate::domain::cards_logic::{playable_cards, trick_strength, winning_index};
use crate::domain::cards_types::Card;
use crate::domain::state::{require_game_type, Phase, Seat, Table, Trick};
use crate::errors::domain::{DomainError, ValidationKind};

/// Result of playing a card, describing what state changes occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayCardResult {
    /// Whether the trick is now complete and waits for collection.
    pub trick_completed: bool,
    /// Winner of the completed trick, if one was completed.
    pub trick_winner: Option<Seat>,
}

/// Result of collecting a completed trick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectResult {
    pub winner: Seat,
    /// No further trick will be played: hands are empty, or a Null
    /// declarer took a trick.
    pub round_over: bool,
}

/// Winner seat of a complete trick.
pub fn trick_winner(trick: &Trick, table: &Table) -> Option<Seat> {
    let game_type = table.game_type?;
    let idx = winning_index(&trick.cards(), game_type)?;
    trick.plays.get(idx).map(|(seat, _)| *seat)
}

/// Legal cards for `who`, empty unless it is their turn to play a card.
pub fn legal_moves(table: &Table, who: Seat) -> Vec<Card> {
    if table.phase != Phase::Play || table.current_player != Some(who) {
        return Vec::new();
    }
    let Some(game_type) = table.game_type else {
        return Vec::new();
    };
    let Some(trick) = &table.trick else {
        return Vec::new();
    };
    if trick.is_complete() {
        return Vec::new();
    }
    let Some(player) = table.players.get(who) else {
        return Vec::new();
    };
    let mut legal = playable_cards(&player.hand, trick.lead_card(), game_type);
    legal.sort();
    legal
}

/// Check that `who` may play `card` now, without changing anything.
pub fn check_play(table: &Table, who: Seat, card: Card) -> Result<(), DomainError> {
    if table.phase != Phase::Play || table.game_type.is_none() {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            "Phase mismatch",
        ));
    }
    if table.speed_up.is_some() {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            "Speed-up request pending",
        ));
    }
    if table.current_player != Some(who) || table.trick.as_ref().is_some_and(Trick::is_complete) {
        return Err(DomainError::validation(
            ValidationKind::OutOfTurn,
            "Out of turn",
        ));
    }
    let in_hand = table
        .players
        .get(who)
        .is_some_and(|p| p.hand.contains(&card));
    if !in_hand {
        return Err(DomainError::validation(
            ValidationKind::CardNotInHand,
            "Card not in hand",
        ));
    }
    if !legal_moves(table, who).contains(&card) {
        return Err(DomainError::validation(
            ValidationKind::MustFollowSuit,
            "Must follow suit",
        ));
    }
    Ok(())
}

/// Play a card into the current trick, enforcing turn, suit-following, and phase.
///
/// A completed trick stays on the table; the turn passes to its winner, who
/// collects it.
pub fn play_card(table: &mut Table, who: Seat, card: Card) -> Result<PlayCardResult, DomainError> {
    check_play(table, who, card)?;

    if let Some(player) = table.players.get_mut(who) {
        player.hand.retain(|c| *c != card);
    }
    let next = table.next_active(who);
    let trick = table.trick.get_or_insert_with(|| Trick::new(who));
    trick.plays.push((who, card));

    if !trick.is_complete() {
        table.current_player = Some(next);
        return Ok(PlayCardResult {
            trick_completed: false,
            trick_winner: None,
        });
    }

    let winner = table
        .trick
        .as_ref()
        .and_then(|t| trick_winner(t, table))
        .ok_or_else(|| {
            DomainError::validation(ValidationKind::InvalidState, "complete trick without winner")
        })?;
    table.current_player = Some(winner);
    Ok(PlayCardResult {
        trick_completed: true,
        trick_winner: Some(winner),
    })
}

/// Check that `who` may collect the open trick; returns its winner.
///
/// The winner collects, or anyone when the winner is a computer player.
pub fn check_collect(table: &Table, who: Seat) -> Result<Seat, DomainError> {
    if table.phase != Phase::Play {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            "Phase mismatch",
        ));
    }
    let Some(trick) = table.trick.as_ref().filter(|t| t.is_complete()) else {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            "No complete trick to collect",
        ));
    };
    let winner = trick_winner(trick, table).ok_or_else(|| {
        DomainError::validation(ValidationKind::InvalidState, "complete trick without winner")
    })?;
    let winner_is_computer = table.players.get(winner).is_some_and(|p| p.is_computer);
    if who != winner && !(winner_is_computer && table.is_active(who)) {
        return Err(DomainError::validation(
            ValidationKind::OutOfTurn,
            "Only the trick winner collects",
        ));
    }
    Ok(winner)
}

/// Move the open trick into the winner's stitches and open the next trick.
pub fn collect_trick(table: &mut Table, who: Seat) -> Result<CollectResult, DomainError> {
    let winner = check_collect(table, who)?;
    let game_type = require_game_type(table, "collect_trick")?;
    let Some(trick) = table.trick.take() else {
        return Err(DomainError::validation(
            ValidationKind::InvalidState,
            "trick vanished",
        ));
    };

    if let Some(player) = table.players.get_mut(winner) {
        player.stitches.extend(trick.cards());
        player.tricks_won += 1;
    }
    table.played_tricks.push(trick);

    let hands_empty = table.players.iter().all(|p| p.hand.is_empty());
    let null_lost = game_type.is_null() && table.game_player == Some(winner);
    let round_over = hands_empty || null_lost;

    if round_over {
        table.current_player = None;
    } else {
        table.trick = Some(Trick::new(winner));
        table.current_player = Some(winner);
    }
    Ok(CollectResult { winner, round_over })
}

/// Card the auto-resolver plays for `who`: the highest-ranked legal card,
/// ties between plain suits broken in Clubs, Spades, Hearts, Diamonds order.
pub fn auto_play_card(table: &Table, who: Seat) -> Option<Card> {
    let game_type = table.game_type?;
    legal_moves(table, who)
        .into_iter()
        .max_by_key(|c| (trick_strength(*c, game_type), std::cmp::Reverse(c.order())))
}
