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

//! Concurrent participant id to address mapping.
//!
//! Writes for one participant id are linearized through the map's entry API;
//! writes for different ids never contend on a shared lock.

use crate::address::Address;
use crate::clock::now_ms;
use crate::error::RoutingError;
use crate::observability::events;
use crate::routing::address_validator::AddressValidator;
use crate::routing::routing_entry::RoutingEntry;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

const COMPONENT: &str = "routing_table";

/// Participant id to [`RoutingEntry`] map guarded by an [`AddressValidator`].
///
/// Non-sticky entries past their expiry date are treated as absent and removed
/// when they are next read. Sticky entries never expire.
pub struct RoutingTable {
    entries: DashMap<String, RoutingEntry>,
    validator: Arc<AddressValidator>,
    gbids: Vec<String>,
}

impl RoutingTable {
    /// `gbids` lists the known backends; the first one is the default backend.
    pub fn new(validator: Arc<AddressValidator>, gbids: Vec<String>) -> Self {
        Self {
            entries: DashMap::new(),
            validator,
            gbids,
        }
    }

    pub fn validator(&self) -> &AddressValidator {
        &self.validator
    }

    pub fn gbids(&self) -> &[String] {
        &self.gbids
    }

    /// Adds or updates the entry for `participant_id`.
    ///
    /// Returns `false` when the address is inadmissible or the update conflicts
    /// with the existing entry; the table is unchanged in that case.
    pub fn put(
        &self,
        participant_id: &str,
        address: Address,
        is_globally_visible: bool,
        expiry_date_ms: i64,
        is_sticky: bool,
    ) -> bool {
        if !self.validator.is_valid_for_routing_table(&address) {
            trace!(
                event = events::ADDRESS_INVALID_FOR_ROUTING_TABLE,
                component = COMPONENT,
                participant_id,
                address = %address,
                "address is not valid for the routing table"
            );
            return false;
        }

        let now = now_ms();
        let candidate = RoutingEntry::new(address, is_globally_visible, expiry_date_ms, is_sticky);

        match self.entries.entry(participant_id.to_string()) {
            Entry::Vacant(vacant) => {
                debug!(
                    event = events::ROUTING_ENTRY_ADDED,
                    component = COMPONENT,
                    participant_id,
                    address = %candidate.address(),
                    is_globally_visible,
                    is_sticky,
                    "added routing entry"
                );
                vacant.insert(candidate);
                true
            }
            Entry::Occupied(mut occupied) => {
                let existing = occupied.get_mut();

                if !existing.is_sticky() && existing.is_expired(now) {
                    debug!(
                        event = events::ROUTING_ENTRY_ADDED,
                        component = COMPONENT,
                        participant_id,
                        address = %candidate.address(),
                        replaced = %existing.address(),
                        "replaced expired routing entry"
                    );
                    *existing = candidate;
                    return true;
                }

                if existing.address() == candidate.address() {
                    existing.merge_lifetime(expiry_date_ms, is_sticky);
                    trace!(
                        event = events::ROUTING_ENTRY_REFRESHED,
                        component = COMPONENT,
                        participant_id,
                        address = %existing.address(),
                        expiry_date_ms = existing.expiry_date_ms(),
                        is_sticky = existing.is_sticky(),
                        "refreshed routing entry"
                    );
                    return true;
                }

                if existing.is_sticky() {
                    error!(
                        event = events::ROUTING_ENTRY_REJECTED,
                        component = COMPONENT,
                        participant_id,
                        address = %candidate.address(),
                        existing = %existing.address(),
                        "refusing to overwrite sticky routing entry with a different address"
                    );
                    return false;
                }

                if !self.validator.allow_update(existing, &candidate) {
                    warn!(
                        event = events::ROUTING_ENTRY_REJECTED,
                        component = COMPONENT,
                        participant_id,
                        address = %candidate.address(),
                        existing = %existing.address(),
                        "routing entry update rejected by precedence"
                    );
                    return false;
                }

                debug!(
                    event = events::ROUTING_ENTRY_ADDED,
                    component = COMPONENT,
                    participant_id,
                    address = %candidate.address(),
                    replaced = %existing.address(),
                    "updated routing entry"
                );
                existing.replace_address(candidate.address().clone(), is_globally_visible);
                existing.merge_lifetime(expiry_date_ms, is_sticky);
                true
            }
        }
    }

    /// Live entry for `participant_id`, purging it first if it expired.
    pub fn get_entry(&self, participant_id: &str) -> Option<RoutingEntry> {
        let now = now_ms();
        {
            let entry = self.entries.get(participant_id)?;
            if entry.is_sticky() || !entry.is_expired(now) {
                return Some(entry.clone());
            }
        }

        let removed = self
            .entries
            .remove_if(participant_id, |_, entry| {
                !entry.is_sticky() && entry.is_expired(now)
            })
            .is_some();
        if removed {
            debug!(
                event = events::ROUTING_ENTRY_EXPIRED,
                component = COMPONENT,
                participant_id,
                "purged expired routing entry"
            );
        }
        None
    }

    pub fn get(&self, participant_id: &str) -> Option<Address> {
        self.get_entry(participant_id)
            .map(|entry| entry.address().clone())
    }

    /// Address for `participant_id` as seen on backend `gbid`.
    ///
    /// MQTT addresses are rebound to the backend; an unknown backend yields
    /// `None`.
    pub fn get_for_backend(&self, participant_id: &str, gbid: &str) -> Option<Address> {
        if !self.gbids.iter().any(|known| known == gbid) {
            warn!(
                event = events::RECIPIENT_ADDRESS_MISSING,
                component = COMPONENT,
                participant_id,
                gbid,
                "unknown backend id"
            );
            return None;
        }
        self.get(participant_id)
            .map(|address| address.with_broker_uri(gbid))
    }

    pub fn contains_key(&self, participant_id: &str) -> bool {
        self.get_entry(participant_id).is_some()
    }

    pub fn get_is_globally_visible(&self, participant_id: &str) -> Result<bool, RoutingError> {
        self.get_entry(participant_id)
            .map(|entry| entry.is_globally_visible())
            .ok_or_else(|| RoutingError::NotFound {
                participant_id: participant_id.to_string(),
            })
    }

    /// Removes a non-sticky entry. Sticky entries are kept.
    pub fn remove(&self, participant_id: &str) {
        let removed = self
            .entries
            .remove_if(participant_id, |_, entry| !entry.is_sticky());

        match removed {
            Some((_, entry)) => debug!(
                event = events::ROUTING_ENTRY_REMOVED,
                component = COMPONENT,
                participant_id,
                address = %entry.address(),
                "removed routing entry"
            ),
            None if self.entries.contains_key(participant_id) => debug!(
                event = events::ROUTING_ENTRY_STICKY_KEPT,
                component = COMPONENT,
                participant_id,
                "sticky routing entry not removed"
            ),
            None => {}
        }
    }

    /// Removes an entry regardless of stickiness.
    pub fn remove_sticky(&self, participant_id: &str) {
        if let Some((_, entry)) = self.entries.remove(participant_id) {
            debug!(
                event = events::ROUTING_ENTRY_REMOVED,
                component = COMPONENT,
                participant_id,
                address = %entry.address(),
                is_sticky = entry.is_sticky(),
                "removed routing entry"
            );
        }
    }

    /// Drops every expired non-sticky entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = now_ms();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.is_sticky() || !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
