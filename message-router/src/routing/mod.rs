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

//! Routing state and recipient resolution.
//!
//! Owns the participant id to address table, the admissibility rules guarding
//! it, local multicast receivers, and the lookup that turns a message into the
//! set of addresses it must be sent to.
//!
//! ```
//! use std::sync::Arc;
//! use message_router::address::Address;
//! use message_router::routing::{AddressValidator, RoutingTable, RuntimeRole};
//!
//! let validator = AddressValidator::new(
//!     RuntimeRole::ClusterController,
//!     [Address::mqtt("joynrdefaultgbid", "own/topic")],
//! );
//! let table = RoutingTable::new(Arc::new(validator), vec!["joynrdefaultgbid".to_string()]);
//!
//! assert!(table.put("provider", Address::web_socket_client("client-1"), false, i64::MAX, false));
//! // Lower-precedence transports cannot displace a registered client.
//! assert!(!table.put("provider", Address::mqtt("joynrdefaultgbid", "provider"), false, i64::MAX, false));
//! // The process's own address never becomes a route.
//! assert!(!table.put("loop", Address::mqtt("joynrdefaultgbid", "own/topic"), true, i64::MAX, false));
//! ```

pub mod address_manager;
pub mod address_validator;
pub mod multicast_address_calculator;
pub mod multicast_receiver_registry;
pub mod routing_entry;
pub mod routing_table;

pub use address_manager::{
    AddressManager, ParticipantIdMap, RecipientAddress, MULTICAST_ADDRESS_CALCULATOR_PARTICIPANT_ID,
};
pub use address_validator::{AddressValidator, RuntimeRole};
pub use multicast_address_calculator::{
    MqttMulticastAddressCalculator, MulticastAddressCalculator, ParentMulticastAddressCalculator,
};
pub use multicast_receiver_registry::MulticastReceiverRegistry;
pub use routing_entry::RoutingEntry;
pub use routing_table::RoutingTable;
