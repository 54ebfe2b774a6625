//! Bidding state machine: Mittelhand says to Vorhand, the survivor then
//! hears Hinterhand. Values climb the fixed ladder and never decrease.

use serde::{Deserialize, Serialize};

use super::state::Seat;

/// Every legal bid value, ascending.
pub const BID_LADDER: [u32; 70] = [
    18, 20, 22, 23, 24, 27, 30, 33, 35, 36, 40, 44, 45, 46, 48, 50, 54, 55, 59, 60, 63, 66, 70,
    72, 77, 80, 81, 84, 88, 90, 96, 99, 100, 108, 110, 117, 120, 121, 126, 130, 132, 135, 140,
    143, 144, 150, 153, 154, 156, 160, 162, 165, 168, 170, 176, 180, 187, 192, 198, 204, 216,
    240, 264, 288, 312, 336, 360, 384, 408, 432,
];

pub fn is_ladder_value(value: u32) -> bool {
    BID_LADDER.binary_search(&value).is_ok()
}

/// Smallest ladder value strictly above `value`.
pub fn next_bid_above(value: u32) -> Option<u32> {
    BID_LADDER.iter().copied().find(|&v| v > value)
}

/// Per-player bid status shown at the table.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BidStatus {
    #[default]
    Idle,
    Bid(u32),
    Accept,
    Pass,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BidAction {
    Bid(u32),
    Accept,
    Pass,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BiddingOutcome {
    /// Bidding goes on; `Bidding::turn` names the next actor.
    Continue,
    /// Exactly one declarer at the given value.
    Declarer { seat: Seat, value: u32 },
    /// Everybody passed; the round is scoreless.
    AllPassed,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bidding {
    /// Highest bid so far; 0 before the first bid.
    pub value: u32,
    /// Seat making offers; `None` once only Vorhand is left without bids.
    pub sayer: Option<Seat>,
    /// Seat answering offers.
    pub listener: Seat,
    /// Hinterhand, until it takes over as sayer.
    pub pending: Option<Seat>,
    pub turn: Seat,
}

impl Bidding {
    pub fn new(vorhand: Seat, mittelhand: Seat, hinterhand: Seat) -> Self {
        Self {
            value: 0,
            sayer: Some(mittelhand),
            listener: vorhand,
            pending: Some(hinterhand),
            turn: mittelhand,
        }
    }

    /// Whether `action` by `seat` is legal right now.
    pub fn can_apply(&self, seat: Seat, action: BidAction) -> bool {
        if seat != self.turn {
            return false;
        }
        match (self.sayer, action) {
            (Some(sayer), BidAction::Bid(v)) => {
                seat == sayer && is_ladder_value(v) && v > self.value
            }
            (Some(sayer), BidAction::Accept) => seat == self.listener && seat != sayer,
            (Some(_), BidAction::Pass) => true,
            // Vorhand alone: open with any ladder value or pass
            (None, BidAction::Bid(v)) => seat == self.listener && is_ladder_value(v),
            (None, BidAction::Accept) => false,
            (None, BidAction::Pass) => seat == self.listener,
        }
    }

    /// Apply a bid action, updating `statuses` (indexed by seat).
    /// Returns `None` when the action is rejected; nothing changes then.
    pub fn apply(
        &mut self,
        seat: Seat,
        action: BidAction,
        statuses: &mut [BidStatus],
    ) -> Option<BiddingOutcome> {
        if !self.can_apply(seat, action) {
            return None;
        }
        let outcome = match (self.sayer, action) {
            (Some(_), BidAction::Bid(v)) => {
                self.value = v;
                statuses[seat] = BidStatus::Bid(v);
                self.turn = self.listener;
                BiddingOutcome::Continue
            }
            (Some(sayer), BidAction::Accept) => {
                statuses[seat] = BidStatus::Accept;
                self.turn = sayer;
                BiddingOutcome::Continue
            }
            (Some(sayer), BidAction::Pass) => {
                statuses[seat] = BidStatus::Pass;
                let survivor = if seat == sayer { self.listener } else { sayer };
                self.listener = survivor;
                self.sayer = None;
                self.advance()
            }
            (None, BidAction::Bid(v)) => {
                self.value = v;
                statuses[seat] = BidStatus::Bid(v);
                BiddingOutcome::Declarer { seat, value: v }
            }
            (None, _) => {
                statuses[seat] = BidStatus::Pass;
                BiddingOutcome::AllPassed
            }
        };
        Some(outcome)
    }

    fn advance(&mut self) -> BiddingOutcome {
        if let Some(hinterhand) = self.pending.take() {
            self.sayer = Some(hinterhand);
            self.turn = hinterhand;
            return BiddingOutcome::Continue;
        }
        if self.value > 0 {
            return BiddingOutcome::Declarer {
                seat: self.listener,
                value: self.value,
            };
        }
        self.turn = self.listener;
        BiddingOutcome::Continue
    }
}
