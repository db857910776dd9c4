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

//! Inbound MQTT skeleton on a shared subscription.
//!
//! Several instances of a clustered runtime share one `$share/<group>/...`
//! subscription, so the broker load-balances requests across them. When too
//! many requests are pending, an instance drops the shared subscription and
//! leaves new requests to its peers; replies keep arriving on the reply topic,
//! which stays subscribed.

use crate::address::Address;
use crate::config::{BackpressureConfig, RouterConfig};
use crate::error::{ConfigError, RoutingError};
use crate::inbound::backpressure::BackpressureController;
use crate::inbound::mqtt_client::{MessageDeserializer, MqttClient, MqttClientFactory};
use crate::observability::events;
use crate::observability::fields::MessageFields;
use crate::router::MessageRouter;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn, Level};

const COMPONENT: &str = "shared_subscription_skeleton";

/// Strips a channel id down to the ASCII letters usable as a share group name.
///
/// ```
/// use message_router::inbound::sanitize_channel_id;
///
/// assert_eq!(sanitize_channel_id("cc-channel_01").unwrap(), "ccchannel");
/// assert!(sanitize_channel_id("0815").is_err());
/// ```
pub fn sanitize_channel_id(channel_id: &str) -> Result<String, ConfigError> {
    let sanitized: String = channel_id
        .chars()
        .filter(char::is_ascii_alphabetic)
        .collect();
    if sanitized.is_empty() {
        return Err(ConfigError::InvalidChannelId(channel_id.to_string()));
    }
    Ok(sanitized)
}

/// Per-process settings shared by the skeletons of all backends.
#[derive(Clone, Debug)]
pub struct SkeletonSettings {
    pub own_topic: String,
    pub reply_to_topic: String,
    pub channel_id: String,
    pub backpressure: BackpressureConfig,
    pub separate_reply_receiver: bool,
}

impl SkeletonSettings {
    pub fn from_config(config: &RouterConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            own_topic: mqtt_topic("own_address", &config.own_address)?,
            reply_to_topic: mqtt_topic("reply_to_address", &config.reply_to_address)?,
            channel_id: config.channel_id.clone(),
            backpressure: config.backpressure.clone(),
            separate_reply_receiver: config.separate_reply_receiver,
        })
    }
}

fn mqtt_topic(field: &'static str, address: &Address) -> Result<String, ConfigError> {
    match address {
        Address::Mqtt { topic, .. } => Ok(topic.clone()),
        other => Err(ConfigError::NotAnMqttAddress {
            field,
            kind: other.kind(),
        }),
    }
}

pub struct SharedSubscriptionSkeleton {
    gbid: String,
    shared_topic: String,
    reply_topic: String,
    client: Arc<dyn MqttClient>,
    reply_client: Arc<dyn MqttClient>,
    separate_reply_receiver: bool,
    backpressure: BackpressureController,
    router: Arc<MessageRouter>,
    deserializer: Arc<dyn MessageDeserializer>,
}

impl SharedSubscriptionSkeleton {
    /// Builds the skeleton of one backend. Nothing is subscribed until
    /// [`Self::init`] runs.
    pub fn new(
        gbid: &str,
        settings: &SkeletonSettings,
        router: Arc<MessageRouter>,
        client_factory: &dyn MqttClientFactory,
        deserializer: Arc<dyn MessageDeserializer>,
    ) -> Result<Self, ConfigError> {
        let backpressure = BackpressureController::new(&settings.backpressure)?;
        let share_group = sanitize_channel_id(&settings.channel_id)?;

        let client = client_factory.create_receiver(gbid);
        let reply_client = if settings.separate_reply_receiver {
            client_factory.create_reply_receiver(gbid)
        } else {
            client.clone()
        };

        Ok(Self {
            gbid: gbid.to_string(),
            shared_topic: format!("$share/{share_group}/{}/#", settings.own_topic),
            reply_topic: format!("{}/#", settings.reply_to_topic),
            client,
            reply_client,
            separate_reply_receiver: settings.separate_reply_receiver,
            backpressure,
            router,
            deserializer,
        })
    }

    pub fn gbid(&self) -> &str {
        &self.gbid
    }

    pub fn shared_topic(&self) -> &str {
        &self.shared_topic
    }

    pub fn reply_topic(&self) -> &str {
        &self.reply_topic
    }

    pub fn backpressure(&self) -> &BackpressureController {
        &self.backpressure
    }

    /// Starts the clients and subscribes to the reply and shared topics.
    pub fn init(&self) {
        if self.separate_reply_receiver {
            info!(
                event = events::SKELETON_REPLY_CLIENT_START,
                component = COMPONENT,
                gbid = self.gbid.as_str(),
                "starting dedicated reply receiver"
            );
            self.reply_client.start();
        }
        self.client.start();
        self.subscribe();
    }

    /// Subscribes to both topics again, e.g. after the client reconnected
    /// with a clean session.
    pub fn subscribe(&self) {
        self.subscribe_to_reply_topic();
        self.subscribe_to_shared_topic();
    }

    pub fn subscribe_to_shared_topic(&self) {
        self.backpressure.mark_subscribed();
        self.subscribe_on(&self.client, &self.shared_topic);
    }

    pub fn subscribe_to_reply_topic(&self) {
        self.subscribe_on(&self.reply_client, &self.reply_topic);
    }

    fn subscribe_on(&self, client: &Arc<dyn MqttClient>, topic: &str) {
        info!(
            event = events::SKELETON_SUBSCRIBE,
            component = COMPONENT,
            gbid = self.gbid.as_str(),
            topic,
            "subscribing"
        );
        client.subscribe(topic);
    }

    /// Counts an accepted request and drops the shared subscription when the
    /// upper threshold is reached.
    pub fn request_accepted(&self, message_id: &str) {
        if self.backpressure.request_accepted(message_id) {
            info!(
                event = events::SKELETON_UNSUBSCRIBE,
                component = COMPONENT,
                gbid = self.gbid.as_str(),
                topic = self.shared_topic.as_str(),
                pending = self.backpressure.pending(),
                "upper threshold reached, unsubscribing from shared topic"
            );
            self.client.unsubscribe(&self.shared_topic);
        }
    }

    /// Releases a request and takes up the shared subscription again once the
    /// lower threshold is undercut.
    pub fn message_processed(&self, message_id: &str) {
        if self.backpressure.message_processed(message_id) {
            info!(
                event = events::SKELETON_SUBSCRIBE,
                component = COMPONENT,
                gbid = self.gbid.as_str(),
                topic = self.shared_topic.as_str(),
                pending = self.backpressure.pending(),
                "below lower threshold, resubscribing to shared topic"
            );
            self.client.subscribe(&self.shared_topic);
        }
    }

    /// Hands a raw message received on one of the subscribed topics to the
    /// router.
    ///
    /// `prefixed_headers` are the transport properties carrying custom
    /// headers. `failure_action` runs when the message cannot be decoded or
    /// routed.
    pub async fn transmit(
        &self,
        raw: &[u8],
        prefixed_headers: &HashMap<String, String>,
        failure_action: impl FnOnce(RoutingError) + Send,
    ) {
        let mut message = match self.deserializer.deserialize(raw) {
            Ok(message) => message,
            Err(err) => {
                error!(
                    event = events::SKELETON_DESERIALIZE_FAILED,
                    component = COMPONENT,
                    gbid = self.gbid.as_str(),
                    err = %err,
                    "unable to deserialize incoming message"
                );
                failure_action(err);
                return;
            }
        };
        message.merge_prefixed_custom_headers(prefixed_headers);

        let accepted_id = message
            .message_type()
            .is_request()
            .then(|| message.id().map(str::to_string))
            .flatten();
        if let Some(id) = accepted_id.as_deref() {
            self.request_accepted(id);
        }

        let fields = tracing::enabled!(Level::WARN).then(|| MessageFields::from_message(&message));
        if let Err(err) = self.router.route_in(message, Some(&self.gbid)).await {
            if let Some(fields) = fields {
                warn!(
                    event = events::SKELETON_ROUTE_FAILED,
                    component = COMPONENT,
                    gbid = self.gbid.as_str(),
                    msg_id = fields.msg_id.as_str(),
                    msg_type = fields.msg_type.as_str(),
                    sender = fields.sender.as_str(),
                    recipient = fields.recipient.as_str(),
                    err = %err,
                    "unable to route incoming message"
                );
            }
            failure_action(err);
            if let Some(id) = accepted_id.as_deref() {
                self.message_processed(id);
            }
        }
    }
}
