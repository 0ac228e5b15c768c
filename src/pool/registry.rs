//! # Connected-client registry, partitioned by class.
//!
//! [`Registry`] tracks which clients are currently connected, split into two
//! disjoint sets (users, admins). It mirrors the slot pool: a client is in
//! the registry if and only if it occupies a slot.
//!
//! ## Rules
//! - Marking a connected client connected again (or disconnecting an absent
//!   one) panics: both indicate a controller bug.
//! - `any_admin_connected` drives the admin-presence recovery policy.

use std::collections::HashSet;

use crate::clients::{ClientClass, ClientId};

/// Class-partitioned sets of connected client ids.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    users: HashSet<ClientId>,
    admins: HashSet<ClientId>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `client` to its class set.
    ///
    /// # Panics
    /// Panics if the client is already marked connected.
    pub fn mark_connected(&mut self, client: ClientId, class: ClientClass) {
        let inserted = match class {
            ClientClass::User => self.users.insert(client.clone()),
            ClientClass::Admin => self.admins.insert(client.clone()),
        };
        assert!(inserted, "client {client} marked connected twice");
    }

    /// Removes `client` from its class set.
    ///
    /// # Panics
    /// Panics if the client was not marked connected.
    pub fn mark_disconnected(&mut self, client: &ClientId, class: ClientClass) {
        let removed = match class {
            ClientClass::User => self.users.remove(client),
            ClientClass::Admin => self.admins.remove(client),
        };
        assert!(removed, "client {client} disconnected while not connected");
    }

    /// True when `client` is in either set.
    pub fn is_connected(&self, client: &ClientId) -> bool {
        self.users.contains(client) || self.admins.contains(client)
    }

    /// True when at least one admin is connected.
    pub fn any_admin_connected(&self) -> bool {
        !self.admins.is_empty()
    }

    /// Connected users.
    pub fn connected_users(&self) -> &HashSet<ClientId> {
        &self.users
    }

    /// Connected admins.
    pub fn connected_admins(&self) -> &HashSet<ClientId> {
        &self.admins
    }

    /// Total connected clients.
    pub fn len(&self) -> usize {
        self.users.len() + self.admins.len()
    }

    /// True when nothing is connected.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.admins.is_empty()
    }
}
