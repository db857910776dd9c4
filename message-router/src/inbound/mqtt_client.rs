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

//! Contracts of the MQTT transport the skeleton drives.
//!
//! Connection handling, QoS and reconnects belong to the transport
//! implementation; the skeleton only starts clients and toggles subscriptions.

use crate::error::RoutingError;
use crate::message::ImmutableMessage;
use std::sync::Arc;

/// A connected (or connecting) MQTT client.
///
/// Calls are fire-and-forget: the client applies them asynchronously and
/// replays active subscriptions after a reconnect.
pub trait MqttClient: Send + Sync {
    fn start(&self);

    fn subscribe(&self, topic: &str);

    fn unsubscribe(&self, topic: &str);
}

/// Creates the clients a skeleton listens on for one backend.
pub trait MqttClientFactory: Send + Sync {
    fn create_receiver(&self, gbid: &str) -> Arc<dyn MqttClient>;

    /// Only used when replies are received on a dedicated connection.
    fn create_reply_receiver(&self, gbid: &str) -> Arc<dyn MqttClient>;
}

/// Wire codec of inbound messages.
pub trait MessageDeserializer: Send + Sync {
    fn deserialize(&self, raw: &[u8]) -> Result<ImmutableMessage, RoutingError>;
}
