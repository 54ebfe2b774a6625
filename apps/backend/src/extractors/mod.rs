pub mod auth_token;
pub mod session_ticket;
pub mod validated_json;

pub use auth_token::AuthToken;
pub use session_ticket::{SessionTicket, TICKET_HEADER};
pub use validated_json::ValidatedJson;
