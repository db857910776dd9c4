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

//! Inbound side: MQTT skeletons receiving messages from global backends.
//!
//! A [`SharedSubscriptionSkeleton`] decodes what its client receives, applies
//! backpressure on incoming requests and hands messages to
//! [`crate::router::MessageRouter::route_in`].

pub mod backpressure;
pub mod mqtt_client;
pub mod shared_subscription_skeleton;
pub mod skeleton_set;

pub use backpressure::BackpressureController;
pub use mqtt_client::{MessageDeserializer, MqttClient, MqttClientFactory};
pub use shared_subscription_skeleton::{
    sanitize_channel_id, SharedSubscriptionSkeleton, SkeletonSettings,
};
pub use skeleton_set::SkeletonSet;
