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

//! # message-router
//!
//! Routing core of an RPC and publish/subscribe middleware. Messages are
//! resolved against a routing table of participant ids, handed to transport
//! stubs, and, for unknown recipients, forwarded to a parent router. Inbound
//! MQTT traffic arrives through shared-subscription skeletons that apply
//! backpressure on incoming requests.
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use message_router::address::{Address, AddressKind};
//! use message_router::config::RouterConfig;
//! use message_router::error::{RoutingError, TransportError};
//! use message_router::message::{ImmutableMessage, MessageBuilder, MessageType};
//! use message_router::messaging::{MessagingStub, MessagingStubFactory, MessagingStubRegistry};
//! use message_router::router::MessageRouter;
//! use message_router::routing::{AddressManager, AddressValidator, MulticastReceiverRegistry, RoutingTable};
//! use message_router::tracking::MessageTracker;
//!
//! struct Dispatcher;
//!
//! #[async_trait]
//! impl MessagingStub for Dispatcher {
//!     async fn transmit(&self, _message: &ImmutableMessage) -> Result<(), TransportError> {
//!         Ok(())
//!     }
//! }
//!
//! struct DispatcherFactory;
//!
//! impl MessagingStubFactory for DispatcherFactory {
//!     fn create(&self, _address: &Address) -> Result<Arc<dyn MessagingStub>, RoutingError> {
//!         Ok(Arc::new(Dispatcher))
//!     }
//! }
//!
//! let config = RouterConfig::from_json5_str(r#"{
//!     own_address: { type: "mqtt", broker_uri: "joynrdefaultgbid", topic: "cc/global" },
//!     reply_to_address: { type: "mqtt", broker_uri: "joynrdefaultgbid", topic: "cc/replyto" },
//!     gbids: ["joynrdefaultgbid"],
//!     channel_id: "cc",
//! }"#).unwrap();
//!
//! let validator = AddressValidator::new(config.role, config.own_addresses());
//! let table = Arc::new(RoutingTable::new(Arc::new(validator), config.gbids.clone()));
//! let manager = AddressManager::new(table.clone(), Arc::new(MulticastReceiverRegistry::new()), None);
//! let stubs = MessagingStubRegistry::new()
//!     .with_factory(AddressKind::InProcess, Arc::new(DispatcherFactory));
//! let tracker = Arc::new(MessageTracker::new(config.shutdown_max_timeout()));
//! let router = MessageRouter::new(table, manager, stubs, tracker);
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! router.add_next_hop("provider", Address::InProcess, false).unwrap().wait().await.unwrap();
//!
//! let request = MessageBuilder::new(MessageType::Request)
//!     .sender("consumer")
//!     .recipient("provider")
//!     .build();
//! router.route(request).await.unwrap();
//! # });
//! ```

pub mod address;
mod clock;
pub mod config;
pub mod error;
pub mod inbound;
pub mod message;
pub mod messaging;
pub mod observability;
pub mod registrar;
pub mod router;
pub mod routing;
pub mod runtime;
pub mod tracking;

pub use address::{Address, AddressKind};
pub use config::{BackpressureConfig, RouterConfig};
pub use error::{
    ConfigError, RegistrationError, RoutingError, ShutdownError, TrackerError, TransportError,
};
pub use message::{ImmutableMessage, MessageBuilder, MessageType};
pub use router::MessageRouter;
