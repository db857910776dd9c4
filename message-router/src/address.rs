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

//! Transport address model.
//!
//! An [`Address`] names where a participant can be reached. Addresses are plain
//! values: they compare and hash structurally per variant and never change after
//! construction.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WebSocketProtocol {
    Ws,
    Wss,
}

impl Display for WebSocketProtocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WebSocketProtocol::Ws => write!(f, "ws"),
            WebSocketProtocol::Wss => write!(f, "wss"),
        }
    }
}

/// Destination of a message on one concrete transport.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Address {
    InProcess,
    Mqtt {
        broker_uri: String,
        topic: String,
    },
    WebSocket {
        protocol: WebSocketProtocol,
        host: String,
        port: u16,
        path: String,
    },
    WebSocketClient {
        id: String,
    },
    Binder {
        package_name: String,
        uid: u32,
    },
    Channel {
        messaging_endpoint_url: String,
        channel_id: String,
    },
    CommonApiDbus {
        domain: String,
        service_name: String,
        participant_id: String,
    },
    Browser {
        browser_id: String,
    },
}

/// Variant tag of an [`Address`], independent of its payload.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AddressKind {
    InProcess,
    Mqtt,
    WebSocket,
    WebSocketClient,
    Binder,
    Channel,
    CommonApiDbus,
    Browser,
}

impl AddressKind {
    pub const ALL: [AddressKind; 8] = [
        AddressKind::InProcess,
        AddressKind::Mqtt,
        AddressKind::WebSocket,
        AddressKind::WebSocketClient,
        AddressKind::Binder,
        AddressKind::Channel,
        AddressKind::CommonApiDbus,
        AddressKind::Browser,
    ];

    /// Precedence tier used when deciding whether a new address may replace an
    /// existing one for the same participant. Higher wins.
    ///
    /// `InProcess > {WebSocketClient, Binder} > Mqtt > {WebSocket, Channel, CommonApiDbus, Browser}`
    pub const fn precedence(self) -> u8 {
        match self {
            AddressKind::InProcess => 3,
            AddressKind::WebSocketClient | AddressKind::Binder => 2,
            AddressKind::Mqtt => 1,
            AddressKind::WebSocket
            | AddressKind::Channel
            | AddressKind::CommonApiDbus
            | AddressKind::Browser => 0,
        }
    }

    /// Kinds a leaf runtime may advertise to its parent router as its own
    /// incoming address.
    pub const fn is_parent_announceable(self) -> bool {
        matches!(
            self,
            AddressKind::Channel
                | AddressKind::CommonApiDbus
                | AddressKind::Browser
                | AddressKind::WebSocket
                | AddressKind::WebSocketClient
        )
    }
}

impl Display for AddressKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AddressKind::InProcess => "InProcessAddress",
            AddressKind::Mqtt => "MqttAddress",
            AddressKind::WebSocket => "WebSocketAddress",
            AddressKind::WebSocketClient => "WebSocketClientAddress",
            AddressKind::Binder => "BinderAddress",
            AddressKind::Channel => "ChannelAddress",
            AddressKind::CommonApiDbus => "CommonApiDbusAddress",
            AddressKind::Browser => "BrowserAddress",
        };
        f.write_str(name)
    }
}

impl Address {
    pub fn mqtt(broker_uri: impl Into<String>, topic: impl Into<String>) -> Self {
        Address::Mqtt {
            broker_uri: broker_uri.into(),
            topic: topic.into(),
        }
    }

    pub fn web_socket(
        protocol: WebSocketProtocol,
        host: impl Into<String>,
        port: u16,
        path: impl Into<String>,
    ) -> Self {
        Address::WebSocket {
            protocol,
            host: host.into(),
            port,
            path: path.into(),
        }
    }

    pub fn web_socket_client(id: impl Into<String>) -> Self {
        Address::WebSocketClient { id: id.into() }
    }

    pub fn binder(package_name: impl Into<String>, uid: u32) -> Self {
        Address::Binder {
            package_name: package_name.into(),
            uid,
        }
    }

    pub fn kind(&self) -> AddressKind {
        match self {
            Address::InProcess => AddressKind::InProcess,
            Address::Mqtt { .. } => AddressKind::Mqtt,
            Address::WebSocket { .. } => AddressKind::WebSocket,
            Address::WebSocketClient { .. } => AddressKind::WebSocketClient,
            Address::Binder { .. } => AddressKind::Binder,
            Address::Channel { .. } => AddressKind::Channel,
            Address::CommonApiDbus { .. } => AddressKind::CommonApiDbus,
            Address::Browser { .. } => AddressKind::Browser,
        }
    }

    /// Broker uri of an MQTT address. In multi-backend deployments this doubles
    /// as the backend id (gbid).
    pub fn broker_uri(&self) -> Option<&str> {
        match self {
            Address::Mqtt { broker_uri, .. } => Some(broker_uri),
            _ => None,
        }
    }

    /// Returns a copy of an MQTT address bound to another backend. Other kinds
    /// are returned unchanged.
    pub fn with_broker_uri(&self, gbid: &str) -> Self {
        match self {
            Address::Mqtt { topic, .. } => Address::mqtt(gbid, topic.clone()),
            other => other.clone(),
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Address::InProcess => write!(f, "inprocess"),
            Address::Mqtt { broker_uri, topic } => write!(f, "mqtt:{broker_uri}/{topic}"),
            Address::WebSocket {
                protocol,
                host,
                port,
                path,
            } => write!(f, "{protocol}://{host}:{port}{path}"),
            Address::WebSocketClient { id } => write!(f, "websocket-client:{id}"),
            Address::Binder { package_name, uid } => write!(f, "binder:{package_name}:{uid}"),
            Address::Channel {
                messaging_endpoint_url,
                channel_id,
            } => write!(f, "channel:{messaging_endpoint_url}/{channel_id}"),
            Address::CommonApiDbus {
                domain,
                service_name,
                participant_id,
            } => write!(f, "dbus:{domain}/{service_name}/{participant_id}"),
            Address::Browser { browser_id } => write!(f, "browser:{browser_id}"),
        }
    }
}
