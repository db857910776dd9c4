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

#![allow(dead_code)]

use async_trait::async_trait;
use message_router::address::{Address, AddressKind};
use message_router::error::{RoutingError, TransportError};
use message_router::inbound::{MessageDeserializer, MqttClient, MqttClientFactory};
use message_router::message::{ImmutableMessage, MessageBuilder, MessageType};
use message_router::messaging::{MessagingStub, MessagingStubFactory, MessagingStubRegistry};
use message_router::router::{MessageRouter, ParentRouter};
use message_router::routing::{
    AddressManager, AddressValidator, MulticastAddressCalculator, MulticastReceiverRegistry,
    RoutingTable, RuntimeRole,
};
use message_router::tracking::MessageTracker;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub(crate) const GBID: &str = "joynrdefaultgbid";

pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Router without own addresses or multicast calculator on the default backend.
pub(crate) fn plain_router_fixture(role: RuntimeRole) -> RouterFixture {
    router_fixture(role, Vec::new(), &[GBID], None)
}

/// Everything a test needs to drive and inspect one router.
pub(crate) struct RouterFixture {
    pub(crate) table: Arc<RoutingTable>,
    pub(crate) receivers: Arc<MulticastReceiverRegistry>,
    pub(crate) tracker: Arc<MessageTracker>,
    pub(crate) outbox: Arc<Outbox>,
    pub(crate) router: MessageRouter,
}

pub(crate) fn router_fixture(
    role: RuntimeRole,
    own_addresses: Vec<Address>,
    gbids: &[&str],
    calculator: Option<Arc<dyn MulticastAddressCalculator>>,
) -> RouterFixture {
    let table = Arc::new(RoutingTable::new(
        Arc::new(AddressValidator::new(role, own_addresses)),
        gbids.iter().map(|gbid| gbid.to_string()).collect(),
    ));
    let receivers = Arc::new(MulticastReceiverRegistry::new());
    let manager = AddressManager::new(table.clone(), receivers.clone(), calculator);
    let tracker = Arc::new(MessageTracker::new(Duration::from_secs(1)));
    let outbox = Arc::new(Outbox::default());

    let mut stubs = MessagingStubRegistry::new();
    for kind in AddressKind::ALL {
        stubs = stubs.with_factory(kind, Arc::new(SharedOutbox(outbox.clone())));
    }

    RouterFixture {
        router: MessageRouter::new(table.clone(), manager, stubs, tracker.clone()),
        table,
        receivers,
        tracker,
        outbox,
    }
}

/// Records every transmitted message per destination address.
///
/// When held, transmissions block until [`Outbox::release`] is called.
#[derive(Default)]
pub(crate) struct Outbox {
    sent: Mutex<Vec<(Address, ImmutableMessage)>>,
    hold: Mutex<Option<Arc<Notify>>>,
    in_flight: AtomicUsize,
}

impl Outbox {
    pub(crate) fn sent(&self) -> Vec<(Address, ImmutableMessage)> {
        self.sent.lock().expect("lock").clone()
    }

    pub(crate) fn sent_to(&self) -> HashSet<Address> {
        self.sent().into_iter().map(|(address, _)| address).collect()
    }

    pub(crate) fn hold(&self) {
        *self.hold.lock().expect("lock") = Some(Arc::new(Notify::new()));
    }

    pub(crate) fn release(&self) {
        if let Some(gate) = self.hold.lock().expect("lock").take() {
            gate.notify_waiters();
        }
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

struct OutboxStub {
    address: Address,
    outbox: Arc<Outbox>,
}

#[async_trait]
impl MessagingStub for OutboxStub {
    async fn transmit(&self, message: &ImmutableMessage) -> Result<(), TransportError> {
        let gate = self.outbox.hold.lock().expect("lock").clone();
        if let Some(gate) = gate {
            let released = gate.notified();
            tokio::pin!(released);
            released.as_mut().enable();
            self.outbox.in_flight.fetch_add(1, Ordering::SeqCst);
            released.await;
            self.outbox.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        self.outbox
            .sent
            .lock()
            .expect("lock")
            .push((self.address.clone(), message.clone()));
        Ok(())
    }
}

/// Stub factory handing out stubs that all record into one outbox.
pub(crate) struct SharedOutbox(pub(crate) Arc<Outbox>);

impl MessagingStubFactory for SharedOutbox {
    fn create(&self, address: &Address) -> Result<Arc<dyn MessagingStub>, RoutingError> {
        Ok(Arc::new(OutboxStub {
            address: address.clone(),
            outbox: self.0.clone(),
        }))
    }
}

/// Records the calls all MQTT clients of a factory receive, in order.
#[derive(Default)]
pub(crate) struct MqttJournal {
    calls: Mutex<Vec<String>>,
}

impl MqttJournal {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|recorded| *recorded == call).count()
    }
}

struct JournalClient {
    name: String,
    journal: Arc<MqttJournal>,
}

impl JournalClient {
    fn record(&self, call: String) {
        self.journal.calls.lock().expect("lock").push(call);
    }
}

impl MqttClient for JournalClient {
    fn start(&self) {
        self.record(format!("{}:start", self.name));
    }

    fn subscribe(&self, topic: &str) {
        self.record(format!("{}:subscribe:{topic}", self.name));
    }

    fn unsubscribe(&self, topic: &str) {
        self.record(format!("{}:unsubscribe:{topic}", self.name));
    }
}

pub(crate) struct JournalClientFactory(pub(crate) Arc<MqttJournal>);

impl MqttClientFactory for JournalClientFactory {
    fn create_receiver(&self, gbid: &str) -> Arc<dyn MqttClient> {
        Arc::new(JournalClient {
            name: gbid.to_string(),
            journal: self.0.clone(),
        })
    }

    fn create_reply_receiver(&self, gbid: &str) -> Arc<dyn MqttClient> {
        Arc::new(JournalClient {
            name: format!("{gbid}-reply"),
            journal: self.0.clone(),
        })
    }
}

/// Wire format for tests: `<type>|<id>|<sender>|<recipient>`, optionally
/// followed by `|<broker uri>:<topic>` naming an MQTT reply-to address.
pub(crate) struct PipeCodec;

impl PipeCodec {
    pub(crate) fn encode(message_type: &str, id: &str, sender: &str, recipient: &str) -> Vec<u8> {
        format!("{message_type}|{id}|{sender}|{recipient}").into_bytes()
    }

    pub(crate) fn encode_with_reply_to(
        message_type: &str,
        id: &str,
        sender: &str,
        recipient: &str,
        (broker_uri, topic): (&str, &str),
    ) -> Vec<u8> {
        format!("{message_type}|{id}|{sender}|{recipient}|{broker_uri}:{topic}").into_bytes()
    }
}

impl MessageDeserializer for PipeCodec {
    fn deserialize(&self, raw: &[u8]) -> Result<ImmutableMessage, RoutingError> {
        let text =
            std::str::from_utf8(raw).map_err(|err| RoutingError::Deserialization(err.to_string()))?;
        let parts: Vec<&str> = text.split('|').collect();
        let (message_type, id, sender, recipient, reply_to) = match parts.as_slice() {
            [message_type, id, sender, recipient] => (message_type, id, sender, recipient, None),
            [message_type, id, sender, recipient, reply_to] => {
                let (broker_uri, topic) = reply_to
                    .rsplit_once(':')
                    .ok_or_else(|| RoutingError::Deserialization(text.to_string()))?;
                (
                    message_type,
                    id,
                    sender,
                    recipient,
                    Some(Address::mqtt(broker_uri, topic)),
                )
            }
            _ => return Err(RoutingError::Deserialization(text.to_string())),
        };
        let message_type = match *message_type {
            "request" => MessageType::Request,
            "reply" => MessageType::Reply,
            "oneway" => MessageType::OneWay,
            "multicast" => MessageType::Multicast,
            other => return Err(RoutingError::Deserialization(other.to_string())),
        };
        let builder = MessageBuilder::new(message_type)
            .id(*id)
            .sender(*sender)
            .recipient(*recipient);
        Ok(match reply_to {
            Some(reply_to) => builder.reply_to(reply_to),
            None => builder,
        }
        .build())
    }
}

/// Parent router answering lookups from a fixed set of known participants.
#[derive(Default)]
pub(crate) struct ScriptedParent {
    known: Mutex<HashSet<String>>,
    unreachable: Mutex<bool>,
    registrations: Mutex<Vec<(String, Address, bool)>>,
    lookups: Mutex<HashMap<String, usize>>,
}

impl ScriptedParent {
    pub(crate) fn knows(&self, participant_id: &str) {
        self.known
            .lock()
            .expect("lock")
            .insert(participant_id.to_string());
    }

    pub(crate) fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.lock().expect("lock") = unreachable;
    }

    pub(crate) fn registrations(&self) -> Vec<(String, Address, bool)> {
        self.registrations.lock().expect("lock").clone()
    }

    pub(crate) fn lookups(&self, participant_id: &str) -> usize {
        self.lookups
            .lock()
            .expect("lock")
            .get(participant_id)
            .copied()
            .unwrap_or_default()
    }

    fn check_reachable(&self) -> Result<(), RoutingError> {
        if *self.unreachable.lock().expect("lock") {
            return Err(RoutingError::IoFailure("parent connection lost".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ParentRouter for ScriptedParent {
    async fn add_next_hop(
        &self,
        participant_id: &str,
        address: &Address,
        is_globally_visible: bool,
    ) -> Result<(), RoutingError> {
        self.check_reachable()?;
        self.registrations.lock().expect("lock").push((
            participant_id.to_string(),
            address.clone(),
            is_globally_visible,
        ));
        Ok(())
    }

    async fn resolve_next_hop(&self, participant_id: &str) -> Result<bool, RoutingError> {
        *self
            .lookups
            .lock()
            .expect("lock")
            .entry(participant_id.to_string())
            .or_default() += 1;
        self.check_reachable()?;
        Ok(self.known.lock().expect("lock").contains(participant_id))
    }
}
