//! Game value and tournament scoring.

use serde::{Deserialize, Serialize};

use super::cards_types::{Card, Rank, Suit};
use super::game::{Game, GameType};

/// Card points the declarer needs to win a Suit or Grand game.
pub const WIN_THRESHOLD: u32 = 61;
pub const SCHNEIDER_THRESHOLD: u32 = 90;
/// Card points at or below which the losing side is Schneider.
pub const SCHNEIDER_LOSER_MAX: u32 = 30;

/// Fixed bonus added to (or subtracted from) the declarer's tournament score.
pub const TOURNAMENT_WIN_BONUS: i32 = 50;
/// Credit per opponent when the declarer loses at a 3-player table.
pub const OPPONENT_CREDIT_THREE: i32 = 40;
/// Credit per opponent when the declarer loses at a 4-player table.
pub const OPPONENT_CREDIT_FOUR: i32 = 30;

/// Matador count: consecutive top trumps held ("with") or missing ("without").
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Matadors {
    pub with: bool,
    pub count: u32,
}

fn trump_sequence(game_type: GameType) -> Vec<Card> {
    let mut seq: Vec<Card> = Suit::ALL
        .iter()
        .map(|&s| Card::new(s, Rank::Jack))
        .collect();
    if let GameType::Suit { suit } = game_type {
        for rank in [
            Rank::Ace,
            Rank::Ten,
            Rank::King,
            Rank::Queen,
            Rank::Nine,
            Rank::Eight,
            Rank::Seven,
        ] {
            seq.push(Card::new(suit, rank));
        }
    }
    seq
}

/// Count matadors over the declarer's cards (hand plus skat).
/// Null games have no matadors.
pub fn matadors(cards: &[Card], game_type: GameType) -> Matadors {
    if game_type.is_null() {
        return Matadors {
            with: false,
            count: 0,
        };
    }
    let seq = trump_sequence(game_type);
    let with = cards.contains(&seq[0]);
    let count = seq
        .iter()
        .take_while(|c| cards.contains(c) == with)
        .count() as u32;
    Matadors { with, count }
}

/// Fixed Null values: plain, Hand, Ouvert, Ouvert Hand.
pub fn null_value(game: &Game) -> u32 {
    match (game.options.hand, game.options.ouvert) {
        (false, false) => 23,
        (true, false) => 35,
        (false, true) => 46,
        (true, true) => 59,
    }
}

/// How a round with a declared game came to an end.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RoundEnding {
    /// All tricks played (or a Null declarer took a trick).
    Played {
        declarer_points: u32,
        declarer_tricks: u32,
        opponent_tricks: u32,
    },
    /// The declarer conceded.
    GivenUp,
}

/// Result of evaluating a declared game.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub won: bool,
    /// Unsigned game value (after any overbid correction).
    pub value: u32,
    /// Signed score for the declarer: `value` if won, `-2 * value` if lost.
    pub score: i32,
    pub declarer_points: u32,
    pub matadors: Matadors,
    pub schneider: bool,
    pub schwarz: bool,
    pub overbid: bool,
    pub given_up: bool,
}

/// Evaluate a finished game.
///
/// Suit/Grand multiplier = matadors + 1 (game) + Hand + Schneider + Schwarz
/// + Ouvert, where Schneider/Schwarz count once when reached or announced.
pub fn evaluate(game: &Game, declarer_cards: &[Card], bid: u32, ending: RoundEnding) -> GameResult {
    let opts = game.options;
    let matadors = matadors(declarer_cards, game.game_type);

    let (declarer_points, declarer_tricks, opponent_tricks, given_up) = match ending {
        RoundEnding::Played {
            declarer_points,
            declarer_tricks,
            opponent_tricks,
        } => (declarer_points, declarer_tricks, opponent_tricks, false),
        RoundEnding::GivenUp => (0, 0, 0, true),
    };

    if game.game_type.is_null() {
        let value = null_value(game);
        let overbid = value < bid;
        let won = !given_up && !overbid && declarer_tricks == 0;
        return GameResult {
            won,
            value,
            score: signed(won, value),
            declarer_points,
            matadors,
            schneider: false,
            schwarz: false,
            overbid,
            given_up,
        };
    }

    let (schneider_reached, schwarz_reached) = if given_up {
        (false, false)
    } else {
        (
            declarer_points >= SCHNEIDER_THRESHOLD || declarer_points <= SCHNEIDER_LOSER_MAX,
            opponent_tricks == 0 || declarer_tricks == 0,
        )
    };
    let schneider = schneider_reached || opts.schneider;
    let schwarz = schwarz_reached || opts.schwarz;

    let multiplier = matadors.count
        + 1
        + u32::from(opts.hand)
        + u32::from(schneider)
        + u32::from(schwarz)
        + u32::from(opts.ouvert);
    let base = game.game_type.base_value();
    let mut value = base * multiplier;

    let mut won = !given_up
        && declarer_points >= WIN_THRESHOLD
        && (!opts.schneider || declarer_points >= SCHNEIDER_THRESHOLD)
        && (!opts.schwarz || opponent_tricks == 0);

    let overbid = value < bid;
    if overbid {
        won = false;
        value = bid.div_ceil(base) * base;
    }

    GameResult {
        won,
        value,
        score: signed(won, value),
        declarer_points,
        matadors,
        schneider,
        schwarz,
        overbid,
        given_up,
    }
}

fn signed(won: bool, value: u32) -> i32 {
    let value = value as i32;
    if won {
        value
    } else {
        -2 * value
    }
}

/// Tournament points for the declarer and for each other seated player.
///
/// Returns `(declarer_delta, opponent_delta)`.
pub fn tournament_points(result: &GameResult, seated_players: usize) -> (i32, i32) {
    if result.won {
        (result.score + TOURNAMENT_WIN_BONUS, 0)
    } else {
        let credit = if seated_players >= 4 {
            OPPONENT_CREDIT_FOUR
        } else {
            OPPONENT_CREDIT_THREE
        };
        (result.score - TOURNAMENT_WIN_BONUS, credit)
    }
}

/// Card points of a set of cards.
pub fn card_points(cards: &[Card]) -> u32 {
    cards.iter().map(|c| c.points()).sum()
}
