//! Heuristic computer player.
//!
//! Bidding:
//! - Estimate the most valuable game the ten dealt cards could carry and bid
//!   (or hold) up to that value; pass above it.
//!
//! Declaring:
//! - Always pick up the skat, plan the game on all twelve cards and lay away
//!   the two least useful plain cards (short suits and unguarded Tens first).
//! - Declare the strongest viable game whose value covers the bid.
//!
//! Play (scored per legal card, best score wins, ties broken at random):
//! - Leading: cash cards that are the highest left in their suit, otherwise
//!   give away something cheap. Known voids steer which suit to lead.
//! - Following: take the trick from the other side when possible, as cheaply
//!   as possible when acting last; give points to a partner whose trick is
//!   safe; otherwise concede with the least valuable card.

use std::sync::Mutex;

use rand::prelude::*;

use super::context::AiContext;
use super::trait_def::{AiError, AiPlayer, SkatDecision};
use crate::domain::cards_logic::{
    card_beats, effective_suit, is_trump, trick_strength, EffectiveSuit,
};
use crate::domain::cards_types::{full_deck, Card, Rank, Suit};
use crate::domain::game::{Game, GameOptions, GameType};
use crate::domain::game_transition::TableAction;
use crate::domain::scoring::{matadors, null_value, WIN_THRESHOLD};

static CANDIDATES: [GameType; 6] = [
    GameType::suit(Suit::Clubs),
    GameType::suit(Suit::Spades),
    GameType::suit(Suit::Hearts),
    GameType::suit(Suit::Diamonds),
    GameType::Grand,
    GameType::Null,
];

pub struct Heuristic {
    rng: Mutex<StdRng>,
}

impl Heuristic {
    pub const NAME: &'static str = "Heuristic";
    pub const VERSION: &'static str = "1.0.0";

    /// `Some(seed)` makes tie-breaks reproducible; `None` seeds from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn pick(&self, cards: &[Card]) -> Result<Card, AiError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| AiError::Internal(format!("RNG lock poisoned: {e}")))?;
        cards
            .choose(&mut *rng)
            .copied()
            .ok_or_else(|| AiError::Internal("no card to choose from".into()))
    }

    // ---------- Hand evaluation ----------

    fn value_of(cards: &[Card], game_type: GameType, hand: bool) -> u32 {
        if game_type.is_null() {
            let options = GameOptions {
                hand,
                ..Default::default()
            };
            return null_value(&Game::new(game_type, options));
        }
        let run = matadors(cards, game_type).count + 1;
        game_type.base_value() * (run + u32::from(hand))
    }

    fn is_viable(cards: &[Card], game_type: GameType) -> bool {
        let jacks = cards.iter().filter(|c| c.is_jack()).count();
        let aces = cards.iter().filter(|c| c.rank == Rank::Ace).count();
        match game_type {
            GameType::Null => {
                let no_high = cards
                    .iter()
                    .all(|c| !matches!(c.rank, Rank::Ace | Rank::King | Rank::Queen));
                let low_in_every_suit = Suit::ALL.iter().all(|s| {
                    let mut in_suit = cards.iter().filter(|c| c.suit == *s).peekable();
                    in_suit.peek().is_none()
                        || in_suit.any(|c| matches!(c.rank, Rank::Seven | Rank::Eight))
                });
                no_high && low_in_every_suit
            }
            GameType::Grand => jacks >= 2 && jacks + aces >= 5,
            GameType::Suit { .. } => {
                let trumps = cards.iter().filter(|c| is_trump(**c, game_type)).count();
                trumps * 2 >= cards.len() && jacks + aces >= 2
            }
        }
    }

    /// Rough playing strength of a Suit/Grand game with these cards.
    fn strength(cards: &[Card], game_type: GameType) -> i32 {
        cards
            .iter()
            .map(|c| {
                if c.is_jack() {
                    5
                } else if is_trump(*c, game_type) {
                    3
                } else if c.rank == Rank::Ace {
                    2
                } else if c.rank == Rank::Ten && cards.contains(&Card::new(c.suit, Rank::Ace)) {
                    1
                } else {
                    0
                }
            })
            .sum()
    }

    /// Highest value among the games these cards could carry; 0 when none.
    fn bid_limit(cards: &[Card]) -> u32 {
        CANDIDATES
            .iter()
            .filter(|gt| Self::is_viable(cards, **gt))
            .map(|gt| Self::value_of(cards, *gt, false))
            .max()
            .unwrap_or(0)
    }

    /// Game to play with `cards`: the strongest viable Suit/Grand game worth
    /// at least `bid`, then Null, then whatever comes closest to the bid.
    fn plan_game(cards: &[Card], hand: bool, bid: u32) -> GameType {
        let covers = |gt: GameType| Self::value_of(cards, gt, hand) >= bid;
        let strength = |gt: &GameType| Self::strength(cards, *gt);
        let trump_games: Vec<GameType> = CANDIDATES
            .iter()
            .copied()
            .filter(|gt| !gt.is_null())
            .collect();
        let null_ok = Self::is_viable(cards, GameType::Null) && covers(GameType::Null);

        trump_games
            .iter()
            .copied()
            .filter(|gt| Self::is_viable(cards, *gt) && covers(*gt))
            .max_by_key(strength)
            .or_else(|| null_ok.then_some(GameType::Null))
            .or_else(|| {
                trump_games
                    .iter()
                    .copied()
                    .filter(|gt| covers(*gt))
                    .max_by_key(strength)
            })
            .or_else(|| {
                trump_games
                    .iter()
                    .copied()
                    .max_by_key(|gt| (Self::value_of(cards, *gt, hand), strength(gt)))
            })
            .unwrap_or(GameType::Grand)
    }

    /// How much a card is worth keeping; the two lowest go to the skat.
    fn keep_score(card: Card, cards: &[Card], game_type: GameType) -> i32 {
        if game_type.is_null() {
            return -i32::from(trick_strength(card, game_type));
        }
        if is_trump(card, game_type) {
            return 100 + i32::from(trick_strength(card, game_type));
        }
        let suit_len = cards
            .iter()
            .filter(|c| effective_suit(**c, game_type) == EffectiveSuit::Plain(card.suit))
            .count() as i32;
        let guarded_ten =
            card.rank == Rank::Ten && cards.contains(&Card::new(card.suit, Rank::Ace));
        let bonus = match card.rank {
            Rank::Ace => 30,
            Rank::Ten if guarded_ten => 20,
            _ => 0,
        };
        bonus + 4 * suit_len - card.points() as i32 / 2
    }

    // ---------- Card play ----------

    /// No unplayed card outside this hand can beat `card` within its suit.
    fn is_top(ctx: &AiContext<'_>, card: Card, game_type: GameType) -> bool {
        let suit = effective_suit(card, game_type);
        let strength = trick_strength(card, game_type);
        full_deck()
            .into_iter()
            .filter(|c| {
                effective_suit(*c, game_type) == suit && trick_strength(*c, game_type) > strength
            })
            .all(|c| ctx.memory().is_played(c) || ctx.hand().contains(&c))
    }

    fn score_lead(ctx: &AiContext<'_>, card: Card, game_type: GameType) -> i32 {
        let suit = effective_suit(card, game_type);
        let strength = i32::from(trick_strength(card, game_type));
        let points = card.points() as i32;
        let memory = ctx.memory();
        let declarer_void = |s: EffectiveSuit| ctx.declarer().is_some_and(|d| memory.is_void(d, s));

        if game_type.is_null() {
            let penalty = if !ctx.is_declarer() && declarer_void(suit) {
                20
            } else {
                0
            };
            return -strength - penalty;
        }

        let mut score = if Self::is_top(ctx, card, game_type) {
            20 + points
        } else {
            -2 * points - strength
        };
        if ctx.is_declarer() {
            let opponents = ctx.opponents();
            let all_void = |s: EffectiveSuit| opponents.iter().all(|o| memory.is_void(*o, s));
            let any_void = |s: EffectiveSuit| opponents.iter().any(|o| memory.is_void(*o, s));
            if suit == EffectiveSuit::Trump {
                if !all_void(EffectiveSuit::Trump) {
                    score += 10;
                }
            } else if all_void(EffectiveSuit::Trump) && all_void(suit) {
                score += 15;
            } else if any_void(suit) && !all_void(EffectiveSuit::Trump) {
                score -= 15;
            }
        } else if suit == EffectiveSuit::Trump {
            score -= 5;
        } else {
            let partner_void = ctx.partner().is_some_and(|p| memory.is_void(p, suit));
            if partner_void && !declarer_void(suit) {
                score += 15;
            }
            if declarer_void(suit) && !declarer_void(EffectiveSuit::Trump) {
                score -= 15;
            }
        }
        score
    }

    fn score_follow(ctx: &AiContext<'_>, card: Card, game_type: GameType) -> i32 {
        let (Some((winner_seat, winner_card)), Some(led)) = (ctx.trick_winner(), ctx.led_suit())
        else {
            return 0;
        };
        let takes = card_beats(card, winner_card, led, game_type);
        let strength = i32::from(trick_strength(card, game_type));
        let points = card.points() as i32;
        let last = ctx.trick_position() == 2;

        if game_type.is_null() {
            let declarer_winning = ctx.declarer() == Some(winner_seat);
            return match (ctx.is_declarer(), takes) {
                (true, true) => -100 - strength,
                (true, false) => strength,
                (false, true) if declarer_winning => -50 - strength,
                (false, false) if declarer_winning => strength,
                (false, _) => -strength,
            };
        }

        if ctx.is_ally(winner_seat) {
            let next = ctx.next_seat();
            let next_can_ruff = led != EffectiveSuit::Trump && ctx.memory().is_void(next, led);
            let safe =
                last || (Self::is_top(ctx, winner_card, game_type) && !next_can_ruff);
            return if safe {
                let trump_cost = if is_trump(card, game_type) { 10 } else { 0 };
                3 * points - trump_cost - strength
            } else {
                -2 * points - strength
            };
        }

        match (takes, last) {
            (true, true) => 40 + 2 * points - strength,
            (true, false) => {
                let top = if Self::is_top(ctx, card, game_type) { 10 } else { 0 };
                30 + strength + top
            }
            (false, _) => -3 * points - strength,
        }
    }
}

impl AiPlayer for Heuristic {
    fn choose_bid_action(&self, ctx: &AiContext<'_>) -> Result<TableAction, AiError> {
        let limit = Self::bid_limit(ctx.hand());
        if let Some(value) = ctx.next_bid().filter(|v| *v <= limit) {
            return Ok(TableAction::Bid { value });
        }
        if ctx.can(&TableAction::Accept) && ctx.bid_value() <= limit {
            return Ok(TableAction::Accept);
        }
        Ok(TableAction::Pass)
    }

    fn choose_skat_decision(&self, _ctx: &AiContext<'_>) -> Result<SkatDecision, AiError> {
        Ok(SkatDecision::PickUp)
    }

    fn choose_discard(&self, ctx: &AiContext<'_>) -> Result<[Card; 2], AiError> {
        let cards = ctx.hand();
        let game_type = Self::plan_game(cards, false, ctx.bid_value());
        let mut ranked = cards.to_vec();
        ranked.sort_by_key(|c| (Self::keep_score(*c, cards, game_type), c.order()));
        match ranked.as_slice() {
            [first, second, ..] => Ok([*first, *second]),
            _ => Err(AiError::InvalidMove(format!(
                "cannot discard from {} cards",
                cards.len()
            ))),
        }
    }

    fn choose_game(&self, ctx: &AiContext<'_>) -> Result<Game, AiError> {
        let cards = ctx.own_cards();
        let hand = !ctx.skat_picked_up();
        let game_type = Self::plan_game(&cards, hand, ctx.bid_value());
        Ok(Game::new(game_type, GameOptions::default()))
    }

    fn choose_card(&self, ctx: &AiContext<'_>) -> Result<Card, AiError> {
        let legal = ctx.legal_plays();
        if legal.is_empty() {
            return Err(AiError::InvalidMove("No legal plays available".into()));
        }
        let game_type = ctx
            .game_type()
            .ok_or_else(|| AiError::Internal("no game declared".into()))?;

        let leading = ctx.trick_plays().is_empty();
        let scored: Vec<(i32, Card)> = legal
            .iter()
            .map(|c| {
                let score = if leading {
                    Self::score_lead(ctx, *c, game_type)
                } else {
                    Self::score_follow(ctx, *c, game_type)
                };
                (score, *c)
            })
            .collect();
        let best = scored.iter().map(|(s, _)| *s).max().unwrap_or_default();
        let ties: Vec<Card> = scored
            .into_iter()
            .filter(|(s, _)| *s == best)
            .map(|(_, c)| c)
            .collect();
        self.pick(&ties)
    }

    fn choose_speed_up_reply(&self, ctx: &AiContext<'_>) -> Result<TableAction, AiError> {
        let behind = ctx.is_declarer() && ctx.own_points() < WIN_THRESHOLD;
        if behind && ctx.hand().iter().any(|c| c.is_jack()) {
            return Ok(TableAction::ContinuePlaying);
        }
        Ok(TableAction::ConfirmSpeedUp)
    }
}
