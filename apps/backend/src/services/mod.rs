//! Service layer: the live table engine and its collaborators.

pub mod computer_game;
pub mod identity;
pub mod long_poll;
pub mod reservations;
pub mod results;
pub mod sessions;
pub mod table_engine;

pub use computer_game::ComputerGameService;
pub use identity::{IdentityService, StaticIdentityService, User};
pub use long_poll::LongPollNotifier;
pub use reservations::{
    InMemoryReservationStore, NewReservation, Reservation, ReservationService, ReservationStore,
};
pub use results::{InMemoryResultStore, ResultStore};
pub use sessions::{Session, SessionRegistry};
pub use table_engine::{LoginOutcome, TableEngine};
