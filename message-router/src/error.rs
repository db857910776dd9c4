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

//! Error taxonomy of the routing core.

use crate::address::AddressKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fatal misconfiguration detected while constructing a component.
#[derive(Debug)]
pub enum ConfigError {
    InvalidMaxIncomingRequests(i64),
    InvalidUpperThreshold(i64),
    InvalidLowerThreshold(i64),
    LowerThresholdNotBelowUpper { lower: i64, upper: i64 },
    InvalidChannelId(String),
    UnsupportedIncomingAddress(AddressKind),
    NotAnMqttAddress { field: &'static str, kind: AddressKind },
    MissingGbids,
    ZeroCleanupInterval,
    Read(std::io::Error),
    Parse(json5::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidMaxIncomingRequests(value) => write!(
                f,
                "invalid max incoming requests {value}, expecting a limit greater than 0 when backpressure is enabled"
            ),
            ConfigError::InvalidUpperThreshold(value) => write!(
                f,
                "invalid backpressure upper threshold {value}, expecting percentage value in range (0,100]"
            ),
            ConfigError::InvalidLowerThreshold(value) => write!(
                f,
                "invalid backpressure lower threshold {value}, expecting percentage value in range [0,100)"
            ),
            ConfigError::LowerThresholdNotBelowUpper { lower, upper } => write!(
                f,
                "backpressure lower threshold {lower} must be strictly below upper threshold {upper}"
            ),
            ConfigError::InvalidChannelId(channel_id) => write!(
                f,
                "channel id {channel_id} cannot be converted to a valid topic fragment because it does not contain any alphabetic characters"
            ),
            ConfigError::UnsupportedIncomingAddress(kind) => {
                write!(f, "{kind} cannot be announced to a parent router")
            }
            ConfigError::NotAnMqttAddress { field, kind } => {
                write!(f, "{field} must be an MqttAddress, found {kind}")
            }
            ConfigError::MissingGbids => write!(f, "at least one backend id (gbid) is required"),
            ConfigError::ZeroCleanupInterval => {
                write!(f, "routing table cleanup interval must be greater than 0 ms")
            }
            ConfigError::Read(err) => write!(f, "unable to read configuration: {err}"),
            ConfigError::Parse(err) => write!(f, "unable to parse configuration: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Read(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

/// Failures of a transport stub while sending.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransportError {
    /// Transient: the transport's outgoing buffer is full, the message may be requeued.
    SendBufferFull,
    /// Potentially terminal I/O failure.
    Io(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::SendBufferFull => write!(f, "send buffer full"),
            TransportError::Io(reason) => write!(f, "transport I/O failure: {reason}"),
        }
    }
}

impl Error for TransportError {}

/// Recoverable routing failures surfaced to callers.
///
/// `Clone` so that a completion handle can hand the same failure to every observer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoutingError {
    /// The routing table refused the write (validator rejection or sticky conflict).
    AddressRejected { participant_id: String },
    NotFound { participant_id: String },
    NoRouteFound { participant_id: String },
    SendBufferFull,
    IoFailure(String),
    MessageExpired { message_id: String },
    ParentRegistrationFailed(String),
    ParentUnreachable(String),
    NoStubFactory(AddressKind),
    Deserialization(String),
    /// The resolver side of a completion handle was dropped before resolving.
    CompletionDropped,
}

impl Display for RoutingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingError::AddressRejected { participant_id } => {
                write!(f, "routing entry for {participant_id} was rejected")
            }
            RoutingError::NotFound { participant_id } => {
                write!(f, "no routing entry found for {participant_id}")
            }
            RoutingError::NoRouteFound { participant_id } => {
                write!(f, "no route for participant id {participant_id}")
            }
            RoutingError::SendBufferFull => write!(f, "send buffer full"),
            RoutingError::IoFailure(reason) => write!(f, "I/O failure: {reason}"),
            RoutingError::MessageExpired { message_id } => {
                write!(f, "message {message_id} expired")
            }
            RoutingError::ParentRegistrationFailed(reason) => {
                write!(f, "failed to add next hop to parent: {reason}")
            }
            RoutingError::ParentUnreachable(reason) => {
                write!(f, "parent router unreachable: {reason}")
            }
            RoutingError::NoStubFactory(kind) => {
                write!(f, "no messaging stub factory registered for {kind}")
            }
            RoutingError::Deserialization(reason) => {
                write!(f, "unable to deserialize message: {reason}")
            }
            RoutingError::CompletionDropped => {
                write!(f, "completion was dropped before being resolved")
            }
        }
    }
}

impl Error for RoutingError {}

impl From<TransportError> for RoutingError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::SendBufferFull => RoutingError::SendBufferFull,
            TransportError::Io(reason) => RoutingError::IoFailure(reason),
        }
    }
}

/// Programming errors when using the message tracker.
#[derive(Debug, Eq, PartialEq)]
pub enum TrackerError {
    IllegalState(&'static str),
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerError::IllegalState(reason) => write!(f, "illegal state: {reason}"),
        }
    }
}

impl Error for TrackerError {}

/// Programming errors when registering shutdown listeners.
#[derive(Debug, Eq, PartialEq)]
pub enum ShutdownError {
    MessageTrackerNotAllowed,
}

impl Display for ShutdownError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownError::MessageTrackerNotAllowed => write!(
                f,
                "the message tracker must be registered through its dedicated registration methods"
            ),
        }
    }
}

impl Error for ShutdownError {}

/// Failures while registering a provider.
#[derive(Debug)]
pub enum RegistrationError {
    RoutingEntry(RoutingError),
    Discovery(String),
}

impl Display for RegistrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationError::RoutingEntry(err) => {
                write!(f, "error while adding routing entry: {err}")
            }
            RegistrationError::Discovery(reason) => {
                write!(f, "error while adding discovery entry: {reason}")
            }
        }
    }
}

impl Error for RegistrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RegistrationError::RoutingEntry(err) => Some(err),
            RegistrationError::Discovery(_) => None,
        }
    }
}
