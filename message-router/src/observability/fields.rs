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

//! Canonical structured field keys and value-format helpers.

use crate::message::ImmutableMessage;

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";

pub const MSG_ID: &str = "msg_id";
pub const MSG_TYPE: &str = "msg_type";
pub const SENDER: &str = "sender";
pub const RECIPIENT: &str = "recipient";
pub const PARTICIPANT_ID: &str = "participant_id";
pub const ADDRESS: &str = "address";
pub const GBID: &str = "gbid";
pub const TOPIC: &str = "topic";
pub const ERR: &str = "err";

pub const NONE: &str = "none";

/// Message fields formatted once per log site, only when the level is enabled.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MessageFields {
    pub msg_id: String,
    pub msg_type: String,
    pub sender: String,
    pub recipient: String,
}

impl MessageFields {
    pub fn from_message(message: &ImmutableMessage) -> Self {
        Self {
            msg_id: format_message_id(message),
            msg_type: message.message_type().to_string(),
            sender: message.sender().to_string(),
            recipient: format_recipient(message),
        }
    }
}

pub fn format_message_id(message: &ImmutableMessage) -> String {
    message.id().unwrap_or(NONE).to_string()
}

pub fn format_recipient(message: &ImmutableMessage) -> String {
    message.recipient().unwrap_or(NONE).to_string()
}
