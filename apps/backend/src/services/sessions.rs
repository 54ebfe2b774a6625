//! Ticket-keyed sessions bound to seated players by name.

use std::collections::HashMap;
use std::time::Duration;

use time::OffsetDateTime;
use uuid::Uuid;

use super::identity::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub ticket: Uuid,
    pub player_name: String,
    pub created: OffsetDateTime,
    pub last_access: OffsetDateTime,
    pub start_game_confirmed: bool,
    pub speed_up_confirmed: bool,
    /// User resolved from the bearer token at login, if one was sent.
    pub user: Option<User>,
}

/// First eight characters of a ticket, safe for logs.
pub fn short_ticket(ticket: &Uuid) -> String {
    ticket.simple().to_string().chars().take(8).collect()
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<Uuid, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        player_name: impl Into<String>,
        user: Option<User>,
        now: OffsetDateTime,
    ) -> Uuid {
        let ticket = Uuid::new_v4();
        self.sessions.insert(
            ticket,
            Session {
                ticket,
                player_name: player_name.into(),
                created: now,
                last_access: now,
                start_game_confirmed: false,
                speed_up_confirmed: false,
                user,
            },
        );
        ticket
    }

    pub fn get(&self, ticket: &Uuid) -> Option<&Session> {
        self.sessions.get(ticket)
    }

    pub fn get_mut(&mut self, ticket: &Uuid) -> Option<&mut Session> {
        self.sessions.get_mut(ticket)
    }

    /// Refresh `last_access` and return the session.
    pub fn touch(&mut self, ticket: &Uuid, now: OffsetDateTime) -> Option<&Session> {
        let session = self.sessions.get_mut(ticket)?;
        session.last_access = now;
        Some(session)
    }

    pub fn remove(&mut self, ticket: &Uuid) -> Option<Session> {
        self.sessions.remove(ticket)
    }

    pub fn remove_by_name(&mut self, name: &str) -> Option<Session> {
        let ticket = self.by_name(name)?.ticket;
        self.sessions.remove(&ticket)
    }

    pub fn by_name(&self, name: &str) -> Option<&Session> {
        self.sessions.values().find(|s| s.player_name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.sessions.values_mut()
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Whether any session has been idle longer than `timeout`.
    pub fn any_expired(&self, now: OffsetDateTime, timeout: Duration) -> bool {
        self.sessions
            .values()
            .any(|s| now - s.last_access > timeout)
    }
}
