//! Identity collaborator: resolves bearer tokens to users.
//!
//! The engine never inspects credentials itself. [`StaticIdentityService`]
//! is the built-in stand-in fed from `SKAT_USERS`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub name: String,
    pub roles: Vec<String>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn resolve_token(&self, token: &str) -> Option<User>;

    fn has_role(&self, user: &User, role: &str) -> bool {
        user.has_role(role)
    }
}

/// Fixed token table.
#[derive(Debug, Default, Clone)]
pub struct StaticIdentityService {
    users: HashMap<String, User>,
}

impl StaticIdentityService {
    pub fn new(users: impl IntoIterator<Item = (String, User)>) -> Self {
        Self {
            users: users.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl IdentityService for StaticIdentityService {
    async fn resolve_token(&self, token: &str) -> Option<User> {
        self.users.get(token).cloned()
    }
}
