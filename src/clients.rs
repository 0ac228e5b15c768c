//! # Client population: identities, classes, roster.
//!
//! Provides [`ClientId`], [`ClientClass`], [`Client`], and [`Roster`].
//!
//! The population is fixed at startup and never changes: clients cycle
//! between connected, disconnected, and queued, but are never created or
//! destroyed while the simulation runs.
//!
//! ## Naming
//! [`Roster::generate`] produces ids `user1..=userN` followed by
//! `admin1..=adminM`. Ids are cheap-clone (`Arc<str>` backed) and are used as
//! keys everywhere (registry, queue, slot occupancy).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Client identity. Cheap to clone; compares and hashes by name.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ClientId(Arc<str>);

impl ClientId {
    /// Creates an id from any string-like value.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Client class. Admins may preempt users; users queue when the pool is full.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClientClass {
    User,
    Admin,
}

impl ClientClass {
    /// Returns a short stable label (snake_case) for use in logs/events.
    pub fn as_label(&self) -> &'static str {
        match self {
            ClientClass::User => "user",
            ClientClass::Admin => "admin",
        }
    }
}

/// A member of the population. Immutable once created.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Client {
    pub id: ClientId,
    pub class: ClientClass,
}

/// Fixed client population, users first then admins.
///
/// ## Example
/// ```rust
/// use portvisor::{ClientClass, Roster};
///
/// let roster = Roster::generate(23, 4);
/// assert_eq!(roster.len(), 27);
/// assert_eq!(roster.admins().len(), 4);
/// assert_eq!(roster.class_of(&"admin2".into()), Some(ClientClass::Admin));
/// ```
#[derive(Clone, Debug)]
pub struct Roster {
    clients: Vec<Client>,
    classes: HashMap<ClientId, ClientClass>,
    user_count: usize,
}

impl Roster {
    /// Generates `users` user clients and `admins` admin clients.
    pub fn generate(users: usize, admins: usize) -> Self {
        let mut clients = Vec::with_capacity(users + admins);
        for i in 1..=users {
            clients.push(Client {
                id: ClientId::new(format!("user{i}")),
                class: ClientClass::User,
            });
        }
        for i in 1..=admins {
            clients.push(Client {
                id: ClientId::new(format!("admin{i}")),
                class: ClientClass::Admin,
            });
        }
        let classes = clients.iter().map(|c| (c.id.clone(), c.class)).collect();
        Self {
            clients,
            classes,
            user_count: users,
        }
    }

    /// All clients, users first then admins.
    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    /// The admin portion of the roster (connected or not).
    pub fn admins(&self) -> &[Client] {
        &self.clients[self.user_count..]
    }

    /// The user portion of the roster.
    pub fn users(&self) -> &[Client] {
        &self.clients[..self.user_count]
    }

    /// Looks up the class of a known client; `None` for ids outside the roster.
    pub fn class_of(&self, id: &ClientId) -> Option<ClientClass> {
        self.classes.get(id).copied()
    }

    /// Population size.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// True for an empty population (no users and no admins).
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_orders_users_before_admins() {
        let roster = Roster::generate(3, 2);
        let names: Vec<&str> = roster.clients().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(names, ["user1", "user2", "user3", "admin1", "admin2"]);
    }

    #[test]
    fn test_class_lookup() {
        let roster = Roster::generate(2, 1);
        assert_eq!(roster.class_of(&"user2".into()), Some(ClientClass::User));
        assert_eq!(roster.class_of(&"admin1".into()), Some(ClientClass::Admin));
        assert_eq!(roster.class_of(&"ghost".into()), None);
    }
}
