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

//! Routed message model.
//!
//! The routing core never looks into payloads. It only needs the header view of a
//! message that was deserialized by an external codec.

use crate::address::Address;
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};

/// Custom header naming the backend (gbid) a message was received from or must be
/// sent to.
pub const CUSTOM_HEADER_GBID_KEY: &str = "gbid";
/// Custom header correlating a request with the reply caller waiting for it.
pub const CUSTOM_HEADER_REQUEST_REPLY_ID: &str = "request_reply_id";
/// Prefix of custom headers carried as transport properties (e.g. MQTT user
/// properties) next to the serialized message.
pub const CUSTOM_HEADER_PREFIX: &str = "c-";

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MessageType {
    Request,
    Reply,
    OneWay,
    Multicast,
    Publication,
    SubscriptionRequest,
    BroadcastSubscriptionRequest,
    MulticastSubscriptionRequest,
    SubscriptionReply,
    SubscriptionStop,
}

impl MessageType {
    /// Inbound message types counted against the pending-request limit of a
    /// skeleton.
    pub const fn is_request(self) -> bool {
        matches!(
            self,
            MessageType::Request
                | MessageType::OneWay
                | MessageType::SubscriptionRequest
                | MessageType::BroadcastSubscriptionRequest
                | MessageType::MulticastSubscriptionRequest
        )
    }

    pub const fn is_multicast(self) -> bool {
        matches!(self, MessageType::Multicast)
    }

    /// Types whose sender expects a reply and therefore carry a reply-to address.
    pub const fn expects_reply(self) -> bool {
        matches!(
            self,
            MessageType::Request
                | MessageType::SubscriptionRequest
                | MessageType::BroadcastSubscriptionRequest
                | MessageType::MulticastSubscriptionRequest
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            MessageType::Request => "request",
            MessageType::Reply => "reply",
            MessageType::OneWay => "oneWay",
            MessageType::Multicast => "multicast",
            MessageType::Publication => "subscriptionPublication",
            MessageType::SubscriptionRequest => "subscriptionRequest",
            MessageType::BroadcastSubscriptionRequest => "broadcastSubscriptionRequest",
            MessageType::MulticastSubscriptionRequest => "multicastSubscriptionRequest",
            MessageType::SubscriptionReply => "subscriptionReply",
            MessageType::SubscriptionStop => "subscriptionStop",
        }
    }
}

impl Display for MessageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header view of a deserialized message.
///
/// `id` and `recipient` are optional because a malformed message can lack them;
/// consumers decide whether that is an error.
#[derive(Clone, Debug, PartialEq)]
pub struct ImmutableMessage {
    id: Option<String>,
    message_type: MessageType,
    sender: String,
    recipient: Option<String>,
    expiry_date_ms: i64,
    reply_to: Option<Address>,
    custom_headers: HashMap<String, String>,
    received_from_global: bool,
    payload: Vec<u8>,
}

impl ImmutableMessage {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Participant id for unicast messages, multicast id for multicast messages.
    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }

    pub fn expiry_date_ms(&self) -> i64 {
        self.expiry_date_ms
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expiry_date_ms < now_ms
    }

    pub fn reply_to(&self) -> Option<&Address> {
        self.reply_to.as_ref()
    }

    pub fn custom_headers(&self) -> &HashMap<String, String> {
        &self.custom_headers
    }

    pub fn custom_header(&self, key: &str) -> Option<&str> {
        self.custom_headers.get(key).map(String::as_str)
    }

    pub fn gbid(&self) -> Option<&str> {
        self.custom_header(CUSTOM_HEADER_GBID_KEY)
    }

    pub fn is_received_from_global(&self) -> bool {
        self.received_from_global
    }

    pub(crate) fn set_received_from_global(&mut self, received_from_global: bool) {
        self.received_from_global = received_from_global;
    }

    /// Merges transport-carried custom headers into the message. Keys without the
    /// [`CUSTOM_HEADER_PREFIX`] are ignored.
    pub(crate) fn merge_prefixed_custom_headers(&mut self, prefixed: &HashMap<String, String>) {
        for (key, value) in prefixed {
            if let Some(stripped) = key.strip_prefix(CUSTOM_HEADER_PREFIX) {
                self.custom_headers
                    .insert(stripped.to_string(), value.clone());
            }
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Builder for [`ImmutableMessage`]. Ids default to a random UUID.
#[derive(Debug)]
pub struct MessageBuilder {
    message: ImmutableMessage,
}

impl MessageBuilder {
    pub fn new(message_type: MessageType) -> Self {
        Self {
            message: ImmutableMessage {
                id: Some(uuid::Uuid::new_v4().to_string()),
                message_type,
                sender: String::new(),
                recipient: None,
                expiry_date_ms: i64::MAX,
                reply_to: None,
                custom_headers: HashMap::new(),
                received_from_global: false,
                payload: Vec::new(),
            },
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.message.id = Some(id.into());
        self
    }

    pub fn without_id(mut self) -> Self {
        self.message.id = None;
        self
    }

    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.message.sender = sender.into();
        self
    }

    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.message.recipient = Some(recipient.into());
        self
    }

    pub fn expiry_date_ms(mut self, expiry_date_ms: i64) -> Self {
        self.message.expiry_date_ms = expiry_date_ms;
        self
    }

    pub fn reply_to(mut self, reply_to: Address) -> Self {
        self.message.reply_to = Some(reply_to);
        self
    }

    pub fn custom_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.message
            .custom_headers
            .insert(key.into(), value.into());
        self
    }

    pub fn received_from_global(mut self, received_from_global: bool) -> Self {
        self.message.received_from_global = received_from_global;
        self
    }

    pub fn payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.message.payload = payload.into();
        self
    }

    pub fn build(self) -> ImmutableMessage {
        self.message
    }
}

/// A message bound to the subset of recipients that share one destination
/// address, as queued for (delayed) delivery.
#[derive(Clone, Debug)]
pub struct DelayableMessage {
    message: ImmutableMessage,
    recipients: HashSet<String>,
    delay_ms: u64,
    retries: u32,
}

impl DelayableMessage {
    pub fn new(message: ImmutableMessage, recipients: HashSet<String>) -> Self {
        Self {
            message,
            recipients,
            delay_ms: 0,
            retries: 0,
        }
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn message(&self) -> &ImmutableMessage {
        &self.message
    }

    pub fn into_message(self) -> ImmutableMessage {
        self.message
    }

    pub fn recipients(&self) -> &HashSet<String> {
        &self.recipients
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn increment_retries(&mut self) {
        self.retries = self.retries.saturating_add(1);
    }
}
