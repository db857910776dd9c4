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

//! Outward destinations for multicast messages.

use crate::address::Address;
use crate::message::ImmutableMessage;

/// Computes the transport addresses a multicast must additionally be published
/// to beyond the local receivers.
pub trait MulticastAddressCalculator: Send + Sync {
    /// Destinations for `message`; several addresses are only produced in
    /// multi-backend MQTT deployments, one per backend.
    fn calculate(&self, message: &ImmutableMessage) -> Vec<Address>;

    /// Whether calculated addresses leave this process's trust boundary.
    fn creates_global_transport_addresses(&self) -> bool;
}

/// Publishes multicasts on every configured MQTT backend under
/// `<topic_prefix><multicast id>`.
pub struct MqttMulticastAddressCalculator {
    gbids: Vec<String>,
    topic_prefix: String,
}

impl MqttMulticastAddressCalculator {
    pub fn new(gbids: Vec<String>, topic_prefix: impl Into<String>) -> Self {
        Self {
            gbids,
            topic_prefix: topic_prefix.into(),
        }
    }
}

impl MulticastAddressCalculator for MqttMulticastAddressCalculator {
    fn calculate(&self, message: &ImmutableMessage) -> Vec<Address> {
        let Some(multicast_id) = message.recipient() else {
            return Vec::new();
        };
        let topic = format!("{}{}", self.topic_prefix, multicast_id);
        self.gbids
            .iter()
            .map(|gbid| Address::mqtt(gbid.clone(), topic.clone()))
            .collect()
    }

    fn creates_global_transport_addresses(&self) -> bool {
        true
    }
}

/// Hands every multicast to the parent router, which decides about global
/// publication itself.
pub struct ParentMulticastAddressCalculator {
    parent_address: Address,
}

impl ParentMulticastAddressCalculator {
    pub fn new(parent_address: Address) -> Self {
        Self { parent_address }
    }
}

impl MulticastAddressCalculator for ParentMulticastAddressCalculator {
    fn calculate(&self, _message: &ImmutableMessage) -> Vec<Address> {
        vec![self.parent_address.clone()]
    }

    fn creates_global_transport_addresses(&self) -> bool {
        false
    }
}
