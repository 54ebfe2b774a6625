//! What a seated player may do right now.
//!
//! Pure function of the table: phase, seat and options already chosen. The
//! flags mirror [`Table::can_apply`] so clients never offer an action the
//! engine would reject.

use serde::Serialize;

use crate::domain::bidding::{next_bid_above, BidAction};
use crate::domain::game::GameOption;
use crate::domain::game_transition::TableAction;
use crate::domain::state::{Phase, Seat, Table};
use crate::domain::tricks::legal_moves;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct Capabilities {
    pub can_bid: bool,
    pub can_accept: bool,
    pub can_pass: bool,
    pub can_pick_up_skat: bool,
    pub can_play_hand: bool,
    pub can_discard: bool,
    pub can_declare: bool,
    pub can_set_hand: bool,
    pub can_set_ouvert: bool,
    pub can_set_schneider: bool,
    pub can_set_schwarz: bool,
    pub can_play_card: bool,
    pub can_collect_stitch: bool,
    pub can_give_up: bool,
    pub can_request_speed_up: bool,
    pub can_confirm_speed_up: bool,
    pub can_cancel_speed_up: bool,
    pub can_start_new_game: bool,
    pub can_view_last_stitch: bool,
}

impl Capabilities {
    /// Capabilities of `seat`; spectators (`None`) get none.
    pub fn for_seat(table: &Table, seat: Option<Seat>) -> Self {
        let Some(seat) = seat else {
            return Self::default();
        };
        let can = |action: TableAction| table.can_apply(seat, &action);
        let is_declarer = table.game_player == Some(seat);
        let declaring = is_declarer
            && (table.phase == Phase::GameDeclaration
                || (table.phase == Phase::Play && !table.first_card_played()));
        let can_toggle = |option: GameOption| {
            can(TableAction::SetOption {
                option,
                value: !table.options.get(option),
            })
        };

        let can_bid = table.phase == Phase::Bidding
            && table.current_player == Some(seat)
            && table.bidding.as_ref().is_some_and(|b| {
                next_bid_above(b.value).is_some_and(|v| b.can_apply(seat, BidAction::Bid(v)))
            });

        Self {
            can_bid,
            can_accept: can(TableAction::Accept),
            can_pass: can(TableAction::Pass),
            can_pick_up_skat: can(TableAction::PickUpSkat),
            can_play_hand: can(TableAction::PlayHand),
            can_discard: declaring
                && table.phase == Phase::GameDeclaration
                && table.skat_picked_up
                && table.skat.is_empty(),
            can_declare: declaring && (!table.skat_picked_up || table.skat.len() == 2),
            can_set_hand: can(TableAction::PlayHand),
            can_set_ouvert: can_toggle(GameOption::Ouvert),
            can_set_schneider: can_toggle(GameOption::Schneider),
            can_set_schwarz: can_toggle(GameOption::Schwarz),
            can_play_card: !legal_moves(table, seat).is_empty() && table.speed_up.is_none(),
            can_collect_stitch: can(TableAction::CollectStitch),
            can_give_up: can(TableAction::GiveUp),
            can_request_speed_up: can(TableAction::RequestSpeedUp),
            can_confirm_speed_up: can(TableAction::ConfirmSpeedUp),
            can_cancel_speed_up: can(TableAction::CancelSpeedUp),
            can_start_new_game: table.can_start_round(),
            can_view_last_stitch: table.phase == Phase::Play && !table.played_tricks.is_empty(),
        }
    }
}
