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

//! One shared-subscription skeleton per configured backend.

use crate::error::ConfigError;
use crate::inbound::mqtt_client::{MessageDeserializer, MqttClientFactory};
use crate::inbound::shared_subscription_skeleton::{SharedSubscriptionSkeleton, SkeletonSettings};
use crate::router::MessageRouter;
use std::sync::Arc;

pub struct SkeletonSet {
    skeletons: Vec<SharedSubscriptionSkeleton>,
}

impl SkeletonSet {
    pub fn new(
        gbids: &[String],
        settings: &SkeletonSettings,
        router: Arc<MessageRouter>,
        client_factory: &dyn MqttClientFactory,
        deserializer: Arc<dyn MessageDeserializer>,
    ) -> Result<Self, ConfigError> {
        if gbids.is_empty() {
            return Err(ConfigError::MissingGbids);
        }
        let skeletons = gbids
            .iter()
            .map(|gbid| {
                SharedSubscriptionSkeleton::new(
                    gbid,
                    settings,
                    router.clone(),
                    client_factory,
                    deserializer.clone(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { skeletons })
    }

    /// Starts and subscribes every skeleton, one backend after the other.
    pub fn init_all(&self) {
        self.skeletons.iter().for_each(SharedSubscriptionSkeleton::init);
    }

    pub fn subscribe_all(&self) {
        self.skeletons
            .iter()
            .for_each(SharedSubscriptionSkeleton::subscribe);
    }

    pub fn get(&self, gbid: &str) -> Option<&SharedSubscriptionSkeleton> {
        self.skeletons.iter().find(|skeleton| skeleton.gbid() == gbid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedSubscriptionSkeleton> {
        self.skeletons.iter()
    }

    /// A request is only pending on the skeleton that accepted it; the others
    /// ignore the id.
    pub fn message_processed(&self, message_id: &str) {
        for skeleton in &self.skeletons {
            skeleton.message_processed(message_id);
        }
    }
}
