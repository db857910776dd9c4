/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Admissibility and precedence rules for routing-table writes.

use crate::address::{Address, AddressKind};
use crate::routing::routing_entry::RoutingEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Position of this process in the routing hierarchy.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeRole {
    /// Owns the connections to the global backends and serves leaf runtimes.
    #[default]
    ClusterController,
    /// Reaches everything it cannot resolve locally through a parent router.
    Leaf,
}

/// Decides which addresses may enter the routing table and which updates may
/// replace an existing entry.
#[derive(Clone, Debug)]
pub struct AddressValidator {
    role: RuntimeRole,
    own_addresses: HashSet<Address>,
}

impl AddressValidator {
    /// `own_addresses` are the global and reply-to addresses this process is
    /// reachable under; routing to them would loop back into this process.
    pub fn new(role: RuntimeRole, own_addresses: impl IntoIterator<Item = Address>) -> Self {
        Self {
            role,
            own_addresses: own_addresses.into_iter().collect(),
        }
    }

    pub fn role(&self) -> RuntimeRole {
        self.role
    }

    pub fn is_valid_for_routing_table(&self, address: &Address) -> bool {
        match address.kind() {
            AddressKind::InProcess => true,
            AddressKind::WebSocket if self.role == RuntimeRole::ClusterController => false,
            _ => !self.own_addresses.contains(address),
        }
    }

    /// Stickiness is not considered here; the table enforces it separately.
    pub fn allow_update(&self, old: &RoutingEntry, new: &RoutingEntry) -> bool {
        let old_kind = old.address().kind();
        let new_kind = new.address().kind();
        old_kind == new_kind || new_kind.precedence() >= old_kind.precedence()
    }
}
