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

//! Local receivers per multicast id.

use crate::observability::events;
use dashmap::DashMap;
use std::collections::HashSet;
use tracing::debug;

const COMPONENT: &str = "multicast_receiver_registry";

/// Multicast id to local receiver participant ids. Registration is idempotent.
#[derive(Default)]
pub struct MulticastReceiverRegistry {
    receivers: DashMap<String, HashSet<String>>,
}

impl MulticastReceiverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the receiver was not registered before.
    pub fn register(&self, multicast_id: &str, receiver_id: &str) -> bool {
        let added = self
            .receivers
            .entry(multicast_id.to_string())
            .or_default()
            .insert(receiver_id.to_string());

        if added {
            debug!(
                event = events::MULTICAST_RECEIVER_ADDED,
                component = COMPONENT,
                multicast_id,
                receiver_id,
                "registered multicast receiver"
            );
        }
        added
    }

    /// Returns `true` when the receiver was registered.
    pub fn unregister(&self, multicast_id: &str, receiver_id: &str) -> bool {
        let removed = match self.receivers.get_mut(multicast_id) {
            Some(mut receivers) => receivers.remove(receiver_id),
            None => false,
        };
        self.receivers
            .remove_if(multicast_id, |_, receivers| receivers.is_empty());

        if removed {
            debug!(
                event = events::MULTICAST_RECEIVER_REMOVED,
                component = COMPONENT,
                multicast_id,
                receiver_id,
                "unregistered multicast receiver"
            );
        }
        removed
    }

    /// Drops `receiver_id` from every multicast it was registered for.
    pub fn unregister_all(&self, receiver_id: &str) -> usize {
        let mut removed = 0;
        for mut receivers in self.receivers.iter_mut() {
            if receivers.remove(receiver_id) {
                removed += 1;
            }
        }
        self.receivers.retain(|_, receivers| !receivers.is_empty());

        if removed > 0 {
            debug!(
                event = events::MULTICAST_RECEIVER_REMOVED,
                component = COMPONENT,
                receiver_id,
                multicast_count = removed,
                "unregistered multicast receiver from all multicasts"
            );
        }
        removed
    }

    pub fn get_receivers(&self, multicast_id: &str) -> HashSet<String> {
        self.receivers
            .get(multicast_id)
            .map(|receivers| receivers.clone())
            .unwrap_or_default()
    }
}
