use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;

pub const TICKET_HEADER: &str = "x-skat-ticket";

/// Session ticket from the `x-skat-ticket` header or the `ticket` query
/// parameter; the header wins when both are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTicket(pub Uuid);

#[derive(Deserialize)]
struct TicketQuery {
    ticket: Option<String>,
}

impl SessionTicket {
    fn parse(req: &HttpRequest) -> Option<Self> {
        let from_header = req
            .headers()
            .get(TICKET_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let raw = from_header.or_else(|| {
            web::Query::<TicketQuery>::from_query(req.query_string())
                .ok()
                .and_then(|q| q.into_inner().ticket)
        })?;
        Uuid::parse_str(raw.trim()).ok().map(SessionTicket)
    }
}

impl FromRequest for SessionTicket {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::parse(req).ok_or_else(AppError::invalid_ticket))
    }
}
