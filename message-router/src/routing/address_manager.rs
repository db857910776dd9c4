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

//! Recipient resolution: which participants a message goes to, grouped by the
//! address they share.

use crate::address::Address;
use crate::message::{DelayableMessage, ImmutableMessage};
use crate::observability::{events, fields};
use crate::routing::multicast_address_calculator::MulticastAddressCalculator;
use crate::routing::multicast_receiver_registry::MulticastReceiverRegistry;
use crate::routing::routing_table::RoutingTable;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, trace, warn, Level};

const COMPONENT: &str = "address_manager";

/// Recipient id standing for the outward destinations computed by the
/// [`MulticastAddressCalculator`]. With several backends the broker uri is
/// appended as `<id>_<broker uri>`.
pub const MULTICAST_ADDRESS_CALCULATOR_PARTICIPANT_ID: &str =
    "joynr.internal.multicastAddressCalculatorParticipantId";

/// Grouping key of a participant id map.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum RecipientAddress {
    /// Unicast placeholder; the address is resolved per delayable message.
    Unresolved,
    Resolved(Address),
}

pub type ParticipantIdMap = HashMap<RecipientAddress, HashSet<String>>;

pub struct AddressManager {
    routing_table: Arc<RoutingTable>,
    multicast_receivers: Arc<MulticastReceiverRegistry>,
    multicast_address_calculator: Option<Arc<dyn MulticastAddressCalculator>>,
}

impl AddressManager {
    pub fn new(
        routing_table: Arc<RoutingTable>,
        multicast_receivers: Arc<MulticastReceiverRegistry>,
        multicast_address_calculator: Option<Arc<dyn MulticastAddressCalculator>>,
    ) -> Self {
        Self {
            routing_table,
            multicast_receivers,
            multicast_address_calculator,
        }
    }

    /// Participants `message` must be delivered to, grouped by address.
    ///
    /// Unicast messages map their recipient to [`RecipientAddress::Unresolved`];
    /// an empty map means no recipient could be determined.
    pub fn participant_id_map(&self, message: &ImmutableMessage) -> ParticipantIdMap {
        let mut result = ParticipantIdMap::new();

        if !message.message_type().is_multicast() {
            if let Some(recipient) = message.recipient() {
                result.insert(
                    RecipientAddress::Unresolved,
                    HashSet::from([recipient.to_string()]),
                );
            }
            return result;
        }

        let multicast_id = message.recipient().unwrap_or_default();
        for receiver in self.multicast_receivers.get_receivers(multicast_id) {
            let Some(address) = self.routing_table.get(&receiver) else {
                error!(
                    event = events::RECIPIENT_ADDRESS_MISSING,
                    component = COMPONENT,
                    participant_id = receiver.as_str(),
                    multicast_id,
                    msg_id = fields::format_message_id(message).as_str(),
                    "no address found for multicast receiver"
                );
                continue;
            };
            result
                .entry(RecipientAddress::Resolved(address))
                .or_default()
                .insert(receiver);
        }

        if !message.is_received_from_global() {
            if let Some(calculator) = self.multicast_address_calculator.as_ref() {
                if !calculator.creates_global_transport_addresses()
                    || self.is_sender_globally_visible(message.sender())
                {
                    Self::add_calculated_receivers(calculator.as_ref(), message, &mut result);
                }
            }
        }

        if tracing::enabled!(Level::TRACE) {
            trace!(
                component = COMPONENT,
                msg_id = fields::format_message_id(message).as_str(),
                groups = result.len(),
                "resolved multicast recipients"
            );
        }
        result
    }

    /// Address `message` must be sent to. All recipients of a delayable
    /// message share one address, so the first recipient that resolves wins.
    pub fn address_for_delayable_message(&self, message: &DelayableMessage) -> Option<Address> {
        let gbid = message.message().gbid();

        message.recipients().iter().find_map(|recipient| {
            if recipient.starts_with(MULTICAST_ADDRESS_CALCULATOR_PARTICIPANT_ID) {
                self.calculated_address(message.message(), recipient)
            } else if let Some(gbid) = gbid {
                self.routing_table.get_for_backend(recipient, gbid)
            } else {
                self.routing_table.get(recipient)
            }
        })
    }

    fn calculated_address(&self, message: &ImmutableMessage, recipient: &str) -> Option<Address> {
        let calculator = self.multicast_address_calculator.as_ref()?;
        let mut addresses = calculator.calculate(message);
        if addresses.len() <= 1 {
            return addresses.pop();
        }
        addresses.into_iter().find(|address| {
            address
                .broker_uri()
                .is_some_and(|broker_uri| recipient == calculator_recipient(Some(broker_uri)))
        })
    }

    fn is_sender_globally_visible(&self, sender: &str) -> bool {
        match self.routing_table.get_is_globally_visible(sender) {
            Ok(visible) => {
                if !visible {
                    trace!(
                        event = events::MULTICAST_SENDER_NOT_GLOBALLY_VISIBLE,
                        component = COMPONENT,
                        participant_id = sender,
                        "multicast provider is not globally visible, not publishing globally"
                    );
                }
                visible
            }
            Err(err) => {
                warn!(
                    event = events::MULTICAST_SENDER_NOT_GLOBALLY_VISIBLE,
                    component = COMPONENT,
                    participant_id = sender,
                    err = %err,
                    "no routing entry for multicast provider, not publishing globally"
                );
                false
            }
        }
    }

    fn add_calculated_receivers(
        calculator: &dyn MulticastAddressCalculator,
        message: &ImmutableMessage,
        result: &mut ParticipantIdMap,
    ) {
        let addresses = calculator.calculate(message);
        if addresses.len() == 1 {
            for address in addresses {
                result.insert(
                    RecipientAddress::Resolved(address),
                    HashSet::from([calculator_recipient(None)]),
                );
            }
            return;
        }

        for address in addresses {
            let recipient = calculator_recipient(address.broker_uri());
            result.insert(
                RecipientAddress::Resolved(address),
                HashSet::from([recipient]),
            );
        }
    }
}

fn calculator_recipient(broker_uri: Option<&str>) -> String {
    match broker_uri {
        Some(broker_uri) => format!("{MULTICAST_ADDRESS_CALCULATOR_PARTICIPANT_ID}_{broker_uri}"),
        None => MULTICAST_ADDRESS_CALCULATOR_PARTICIPANT_ID.to_string(),
    }
}
