//! Table state machine: every player action flows through [`Table::apply`].
//!
//! Actions that are illegal for the current phase or player are rejected
//! with `false` and leave the table untouched, so stale or duplicated client
//! requests are harmless.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::bidding::{BidAction, Bidding, BiddingOutcome};
use crate::domain::cards_types::Card;
use crate::domain::dealing::deal;
use crate::domain::game::{Game, GameOption, GameOptions, GameType};
use crate::domain::history::{GameHistory, PlayRecord, RoundSummary};
use crate::domain::scoring::{card_points, evaluate, tournament_points, RoundEnding};
use crate::domain::state::{Phase, Seat, SpeedUp, Table, Trick, MAX_PLAYERS, MIN_PLAYERS};
use crate::domain::tricks::{
    auto_play_card, check_collect, check_play, collect_trick, play_card, trick_winner,
};

/// A player action at the table.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableAction {
    Bid { value: u32 },
    Accept,
    Pass,
    PickUpSkat,
    PlayHand,
    DiscardSkat { cards: Vec<Card> },
    SetGame { game: Game },
    SetOption { option: GameOption, value: bool },
    PlayCard { card: Card },
    CollectStitch,
    GiveUp,
    RequestSpeedUp,
    ConfirmSpeedUp,
    ContinuePlaying,
    CancelSpeedUp,
}

impl TableAction {
    fn as_bid(&self) -> Option<BidAction> {
        match self {
            TableAction::Bid { value } => Some(BidAction::Bid(*value)),
            TableAction::Accept => Some(BidAction::Accept),
            TableAction::Pass => Some(BidAction::Pass),
            _ => None,
        }
    }
}

impl Table {
    /// Whether enough players are seated and no round is running.
    pub fn can_start_round(&self) -> bool {
        !self.is_round_in_progress() && (MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players.len())
    }

    /// Deal a new round with the given shuffle seed. The dealer is derived
    /// from `game_counter`; at a 4-player table the dealer sits out.
    pub fn start_round(&mut self, seed: u64) -> bool {
        if !self.can_start_round() {
            return false;
        }
        for p in &mut self.players {
            p.hand.clear();
            p.stitches.clear();
            p.tricks_won = 0;
            p.bid_status = Default::default();
        }
        self.clear_round_state();
        self.last_result = None;

        let n = self.players.len();
        self.dealer = self.game_counter as usize % n;
        self.inactive_player = (n == MAX_PLAYERS).then_some(self.dealer);

        let [vorhand, mittelhand, hinterhand] = self.positions();
        let dealt = deal(seed);
        let [h0, h1, h2] = dealt.hands;
        self.players[vorhand].hand = h0;
        self.players[mittelhand].hand = h1;
        self.players[hinterhand].hand = h2;
        self.skat = dealt.skat.clone();
        self.original_skat = dealt.skat;

        let bidding = Bidding::new(vorhand, mittelhand, hinterhand);
        self.current_player = Some(bidding.turn);
        self.bidding = Some(bidding);
        self.phase = Phase::Bidding;
        debug!(dealer = self.dealer, game_counter = self.game_counter, "round dealt");
        true
    }

    /// Whether `action` by `seat` would be accepted right now.
    pub fn can_apply(&self, seat: Seat, action: &TableAction) -> bool {
        if !self.is_active(seat) {
            return false;
        }
        let is_declarer = self.game_player == Some(seat);
        match action {
            TableAction::Bid { .. } | TableAction::Accept | TableAction::Pass => {
                self.phase == Phase::Bidding
                    && match (&self.bidding, action.as_bid()) {
                        (Some(b), Some(a)) => b.can_apply(seat, a),
                        _ => false,
                    }
            }
            TableAction::PickUpSkat | TableAction::PlayHand => {
                self.phase == Phase::SkatDecision && is_declarer
            }
            TableAction::DiscardSkat { cards } => self.can_discard(seat, cards),
            TableAction::SetGame { game } => self.declared_options(seat, game).is_some(),
            TableAction::SetOption { option, value } => {
                self.option_change(seat, *option, *value).is_some()
            }
            TableAction::PlayCard { card } => check_play(self, seat, *card).is_ok(),
            TableAction::CollectStitch => check_collect(self, seat).is_ok(),
            TableAction::GiveUp => {
                self.phase == Phase::Play && is_declarer && !self.is_speed_up
            }
            TableAction::RequestSpeedUp => {
                self.phase == Phase::Play
                    && self.game_type.is_some()
                    && self.speed_up.is_none()
                    && !self.is_speed_up
            }
            TableAction::ConfirmSpeedUp => self
                .speed_up
                .as_ref()
                .is_some_and(|s| s.requested_by != seat && !s.confirmed.contains(&seat)),
            TableAction::ContinuePlaying => {
                self.speed_up.as_ref().is_some_and(|s| s.requested_by != seat)
            }
            TableAction::CancelSpeedUp => {
                self.speed_up.as_ref().is_some_and(|s| s.requested_by == seat)
            }
        }
    }

    /// Apply `action` for `seat`. Returns `false` and changes nothing when the
    /// action is not legal right now.
    pub fn apply(&mut self, seat: Seat, action: TableAction) -> bool {
        if !self.can_apply(seat, &action) {
            debug!(seat, ?action, phase = ?self.phase, "action rejected");
            return false;
        }
        match action {
            TableAction::Bid { .. } | TableAction::Accept | TableAction::Pass => {
                if let Some(bid) = action.as_bid() {
                    self.apply_bid(seat, bid);
                }
            }
            TableAction::PickUpSkat => {
                let skat: Vec<Card> = self.skat.drain(..).collect();
                self.players[seat].hand.extend(skat);
                self.skat_picked_up = true;
                self.options.hand = false;
                self.phase = Phase::GameDeclaration;
            }
            TableAction::PlayHand => {
                self.options.hand = true;
                self.phase = Phase::GameDeclaration;
            }
            TableAction::DiscardSkat { cards } => {
                let hand = &mut self.players[seat].hand;
                hand.retain(|c| !cards.contains(c));
                self.skat = cards;
            }
            TableAction::SetGame { game } => {
                if let Some(options) = self.declared_options(seat, &game) {
                    self.game_type = Some(game.game_type);
                    self.options = options;
                    if self.phase == Phase::GameDeclaration {
                        let vorhand = self.vorhand();
                        self.phase = Phase::Play;
                        self.trick = Some(Trick::new(vorhand));
                        self.current_player = Some(vorhand);
                    }
                }
            }
            TableAction::SetOption { option, value } => {
                if let Some(options) = self.option_change(seat, option, value) {
                    self.options = options;
                }
            }
            TableAction::PlayCard { card } => {
                if play_card(self, seat, card).is_err() {
                    return false;
                }
            }
            TableAction::CollectStitch => match collect_trick(self, seat) {
                Ok(collected) if collected.round_over => self.finish_played_round(),
                Ok(_) => {}
                Err(_) => return false,
            },
            TableAction::GiveUp => self.finish_round(RoundEnding::GivenUp),
            TableAction::RequestSpeedUp => {
                self.speed_up = Some(SpeedUp {
                    requested_by: seat,
                    confirmed: Vec::new(),
                });
                self.resolve_speed_up_if_confirmed();
            }
            TableAction::ConfirmSpeedUp => {
                if let Some(s) = self.speed_up.as_mut() {
                    s.confirmed.push(seat);
                }
                self.resolve_speed_up_if_confirmed();
            }
            TableAction::ContinuePlaying | TableAction::CancelSpeedUp => {
                self.speed_up = None;
            }
        }
        true
    }

    fn apply_bid(&mut self, seat: Seat, action: BidAction) {
        let Some(bidding) = self.bidding.as_mut() else {
            return;
        };
        let mut statuses: Vec<_> = self.players.iter().map(|p| p.bid_status).collect();
        let Some(outcome) = bidding.apply(seat, action, &mut statuses) else {
            return;
        };
        let turn = bidding.turn;
        for (p, status) in self.players.iter_mut().zip(statuses) {
            p.bid_status = status;
        }
        match outcome {
            BiddingOutcome::Continue => self.current_player = Some(turn),
            BiddingOutcome::Declarer { seat, value } => {
                self.bid_value = value;
                self.game_player = Some(seat);
                self.current_player = Some(seat);
                let mut cards = self.players[seat].hand.clone();
                cards.extend(self.skat.iter().copied());
                self.declarer_cards = cards;
                self.phase = Phase::SkatDecision;
            }
            BiddingOutcome::AllPassed => self.finish_passed_round(),
        }
    }

    fn can_discard(&self, seat: Seat, cards: &[Card]) -> bool {
        if self.phase != Phase::GameDeclaration
            || self.game_player != Some(seat)
            || !self.skat_picked_up
            || !self.skat.is_empty()
            || cards.len() != 2
            || cards[0] == cards[1]
        {
            return false;
        }
        let hand = &self.players[seat].hand;
        cards.iter().all(|c| hand.contains(c))
    }

    /// Options a `SetGame` would settle on, or `None` when it is not allowed.
    ///
    /// Hand follows the skat decision. Options announced earlier stay set;
    /// Ouvert on Suit/Grand implies Schneider and Schwarz.
    fn declared_options(&self, seat: Seat, game: &Game) -> Option<GameOptions> {
        let declaring = match self.phase {
            Phase::GameDeclaration => !self.skat_picked_up || self.skat.len() == 2,
            Phase::Play => !self.first_card_played(),
            _ => false,
        };
        if !declaring || self.game_player != Some(seat) {
            return None;
        }
        let mut options = GameOptions {
            hand: !self.skat_picked_up,
            ouvert: game.options.ouvert || self.options.ouvert,
            schneider: game.options.schneider || self.options.schneider,
            schwarz: game.options.schwarz || self.options.schwarz,
        };
        normalize(&mut options, game.game_type);
        options
            .is_consistent_with(game.game_type)
            .then_some(options)
    }

    /// Options after toggling `option`, or `None` when the change is not allowed.
    fn option_change(&self, seat: Seat, option: GameOption, value: bool) -> Option<GameOptions> {
        let open = match self.phase {
            Phase::GameDeclaration => true,
            Phase::Play => !self.first_card_played(),
            _ => false,
        };
        if !open || self.game_player != Some(seat) || option == GameOption::Hand {
            return None;
        }
        if self.options.get(option) == value {
            return None;
        }
        let mut options = self.options;
        match (option, value) {
            (GameOption::Ouvert, v) => options.ouvert = v,
            (GameOption::Schneider, true) => options.schneider = true,
            (GameOption::Schneider, false) => {
                options.schneider = false;
                options.schwarz = false;
            }
            (GameOption::Schwarz, true) => {
                options.schwarz = true;
                options.schneider = true;
            }
            (GameOption::Schwarz, false) => options.schwarz = false,
            (GameOption::Hand, _) => return None,
        }
        match self.game_type {
            Some(game_type) => {
                if !game_type.is_null() && options.ouvert && !value {
                    // dropping Schneider/Schwarz on Suit/Grand drops Ouvert too
                    options.ouvert = false;
                }
                normalize(&mut options, game_type);
                options.is_consistent_with(game_type).then_some(options)
            }
            // type unknown yet: only the Hand chain can be checked
            None => (!(options.schneider && !options.hand)).then_some(options),
        }
    }

    fn resolve_speed_up_if_confirmed(&mut self) {
        let Some(speed_up) = &self.speed_up else {
            return;
        };
        let all_confirmed = (0..self.players.len())
            .filter(|&s| self.is_active(s) && s != speed_up.requested_by)
            .all(|s| speed_up.confirmed.contains(&s));
        if all_confirmed {
            self.run_speed_up();
        }
    }

    /// Reveal all hands and play out the round: each player in turn plays
    /// their highest-ranked legal card and every trick is collected.
    fn run_speed_up(&mut self) {
        self.speed_up = None;
        self.is_speed_up = true;
        while self.phase == Phase::Play {
            let Some(current) = self.current_player else {
                break;
            };
            let trick_complete = self.trick.as_ref().is_some_and(Trick::is_complete);
            let progressed = if trick_complete {
                match collect_trick(self, current) {
                    Ok(collected) => {
                        if collected.round_over {
                            self.finish_played_round();
                        }
                        true
                    }
                    Err(_) => false,
                }
            } else {
                auto_play_card(self, current)
                    .is_some_and(|card| play_card(self, current, card).is_ok())
            };
            if !progressed {
                break;
            }
        }
    }

    fn finish_played_round(&mut self) {
        let Some(declarer) = self.game_player else {
            return;
        };
        let declarer_tricks = self.players[declarer].tricks_won;
        let total_tricks = self.played_tricks.len() as u32;
        let declarer_points =
            card_points(&self.players[declarer].stitches) + card_points(&self.skat);
        self.finish_round(RoundEnding::Played {
            declarer_points,
            declarer_tricks,
            opponent_tricks: total_tricks - declarer_tricks,
        });
    }

    /// Score a round with a declared game and record its history.
    fn finish_round(&mut self, ending: RoundEnding) {
        let (Some(declarer), Some(game)) = (self.game_player, self.game()) else {
            return;
        };
        let result = evaluate(&game, &self.declarer_cards, self.bid_value, ending);
        let (declarer_delta, opponent_delta) = tournament_points(&result, self.players.len());

        let mut deltas = Vec::with_capacity(self.players.len());
        for (seat, p) in self.players.iter_mut().enumerate() {
            let delta = if seat == declarer {
                declarer_delta
            } else {
                opponent_delta
            };
            p.tournament_score += delta;
            deltas.push((p.name.clone(), delta));
        }

        let declarer_name = self.players[declarer].name.clone();
        let cards_from_opponents = self
            .played_tricks
            .iter()
            .filter(|t| trick_winner(t, self) == Some(declarer))
            .flat_map(|t| t.plays.iter())
            .filter(|(seat, _)| *seat != declarer)
            .map(|(_, card)| *card)
            .collect();

        self.last_result = Some(RoundSummary {
            declarer: Some(declarer_name.clone()),
            game: Some(game),
            value: result.score,
            won: result.won,
            declarer_points: result.declarer_points,
            tournament_deltas: deltas,
        });
        let entry = GameHistory {
            game_number: self.game_counter + 1,
            players: self.players.iter().map(|p| p.name.clone()).collect(),
            declarer: Some(declarer_name),
            game: Some(game),
            bid: self.bid_value,
            skat: self.original_skat.clone(),
            cards_from_opponents,
            play_sequence: self.play_sequence(),
            value: result.score,
            result: Some(result),
        };
        self.close_round(entry);
    }

    fn finish_passed_round(&mut self) {
        self.last_result = Some(RoundSummary {
            declarer: None,
            game: None,
            value: 0,
            won: false,
            declarer_points: 0,
            tournament_deltas: Vec::new(),
        });
        let entry = GameHistory {
            game_number: self.game_counter + 1,
            players: self.players.iter().map(|p| p.name.clone()).collect(),
            declarer: None,
            game: None,
            bid: 0,
            skat: self.original_skat.clone(),
            cards_from_opponents: Vec::new(),
            play_sequence: Vec::new(),
            value: 0,
            result: None,
        };
        self.close_round(entry);
    }

    fn close_round(&mut self, entry: GameHistory) {
        debug!(
            game_number = entry.game_number,
            value = entry.value,
            "round finished"
        );
        self.history.push(entry);
        self.game_counter += 1;
        self.phase = Phase::RoundEnd;
        self.current_player = None;
        self.speed_up = None;
        self.bidding = None;
    }

    /// Every card played this round with its player, in play order.
    pub fn play_sequence(&self) -> Vec<PlayRecord> {
        self.played_tricks
            .iter()
            .chain(self.trick.iter())
            .flat_map(|t| t.plays.iter())
            .map(|(seat, card)| PlayRecord {
                player: self.players[*seat].name.clone(),
                card: *card,
            })
            .collect()
    }
}

fn normalize(options: &mut GameOptions, game_type: GameType) {
    if !game_type.is_null() && options.ouvert {
        options.schneider = true;
        options.schwarz = true;
    }
}
