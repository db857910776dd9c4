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

//! Message dispatch and next-hop management.

use crate::address::Address;
use crate::clock::now_ms;
use crate::error::RoutingError;
use crate::message::{DelayableMessage, ImmutableMessage};
use crate::messaging::MessagingStubRegistry;
use crate::observability::events;
use crate::observability::fields::{self, MessageFields};
use crate::router::completion::{self, NextHopCompletion};
use crate::router::parent::ParentRouterLink;
use crate::routing::address_manager::AddressManager;
use crate::routing::routing_table::RoutingTable;
use crate::tracking::message_tracker::MessageTracker;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, info, warn, Level};

const COMPONENT: &str = "message_router";

/// Routes messages to the transport stubs of their recipients and keeps the
/// routing table in sync with the parent router, if any.
pub struct MessageRouter {
    routing_table: Arc<RoutingTable>,
    address_manager: AddressManager,
    stubs: MessagingStubRegistry,
    message_tracker: Arc<MessageTracker>,
    parent: Option<Arc<ParentRouterLink>>,
    parent_announcement: Option<NextHopCompletion>,
}

impl MessageRouter {
    pub fn new(
        routing_table: Arc<RoutingTable>,
        address_manager: AddressManager,
        stubs: MessagingStubRegistry,
        message_tracker: Arc<MessageTracker>,
    ) -> Self {
        Self {
            routing_table,
            address_manager,
            stubs,
            message_tracker,
            parent: None,
            parent_announcement: None,
        }
    }

    /// Attaches a parent router.
    ///
    /// The parent's address is pinned in the routing table under the parent
    /// routing provider's participant id, and this router's incoming address is
    /// announced to the parent for the proxy participant id. The announcement
    /// runs on a spawned task, so this must be called from within a tokio
    /// runtime; its outcome is exposed through [`Self::parent_announcement`].
    ///
    /// The incoming address kind was validated when `link` was built.
    pub fn with_parent(mut self, link: ParentRouterLink) -> Self {
        if !self.routing_table.put(
            link.parent_participant_id(),
            link.parent_address().clone(),
            false,
            i64::MAX,
            true,
        ) {
            error!(
                event = events::NEXT_HOP_ADD_REJECTED,
                component = COMPONENT,
                participant_id = link.parent_participant_id(),
                address = %link.parent_address(),
                "unable to add routing entry for the parent router"
            );
        }

        let link = Arc::new(link);
        let announcement = Self::add_next_hop_to_parent(
            link.clone(),
            link.proxy_participant_id().to_string(),
            false,
        );
        self.parent = Some(link);
        self.parent_announcement = Some(announcement);
        self
    }

    /// Outcome of announcing this router to its parent.
    pub fn parent_announcement(&self) -> Option<NextHopCompletion> {
        self.parent_announcement.clone()
    }

    pub fn routing_table(&self) -> &Arc<RoutingTable> {
        &self.routing_table
    }

    /// Sends `message` to every address its recipients resolve to.
    ///
    /// Dispatch failures on one address do not stop the others; the first
    /// failure is reported once all were attempted.
    pub async fn route(&self, message: ImmutableMessage) -> Result<(), RoutingError> {
        if tracing::enabled!(Level::DEBUG) {
            let fields = MessageFields::from_message(&message);
            debug!(
                event = events::ROUTE_START,
                component = COMPONENT,
                msg_id = fields.msg_id.as_str(),
                msg_type = fields.msg_type.as_str(),
                sender = fields.sender.as_str(),
                recipient = fields.recipient.as_str(),
                "routing message"
            );
        }

        if message.is_expired(now_ms()) {
            let message_id = fields::format_message_id(&message);
            warn!(
                event = events::ROUTE_MESSAGE_EXPIRED,
                component = COMPONENT,
                msg_id = message_id.as_str(),
                expiry_date_ms = message.expiry_date_ms(),
                "dropping expired message"
            );
            return Err(RoutingError::MessageExpired { message_id });
        }

        let participant_id_map = self.address_manager.participant_id_map(&message);
        if participant_id_map.is_empty() {
            if message.message_type().is_multicast() {
                debug!(
                    event = events::ROUTE_NO_ROUTE,
                    component = COMPONENT,
                    msg_id = fields::format_message_id(&message).as_str(),
                    "no receivers for multicast"
                );
                return Ok(());
            }
            return Err(Self::no_route(&fields::format_recipient(&message)));
        }

        let dispatches = participant_id_map
            .into_values()
            .map(|recipients| self.dispatch(DelayableMessage::new(message.clone(), recipients)));

        join_all(dispatches)
            .await
            .into_iter()
            .find_map(Result::err)
            .map_or(Ok(()), Err)
    }

    /// Routes a message that arrived from a global backend.
    ///
    /// For messages expecting a reply, the sender's reply-to address is
    /// registered first so that the reply can find its way back. When
    /// `received_on` names the backend the message came in on, an MQTT reply-to
    /// address is rebound to that backend, so the reply leaves through the
    /// broker the request arrived from.
    pub async fn route_in(
        &self,
        mut message: ImmutableMessage,
        received_on: Option<&str>,
    ) -> Result<(), RoutingError> {
        message.set_received_from_global(true);

        if message.message_type().expects_reply() {
            if let Some(reply_to) = message.reply_to() {
                let reply_to = match received_on {
                    Some(gbid) => reply_to.with_broker_uri(gbid),
                    None => reply_to.clone(),
                };
                let registered = self.routing_table.put(
                    message.sender(),
                    reply_to.clone(),
                    true,
                    message.expiry_date_ms(),
                    false,
                );
                debug!(
                    event = events::REPLY_TO_REGISTERED,
                    component = COMPONENT,
                    participant_id = message.sender(),
                    address = %reply_to,
                    gbid = received_on.unwrap_or(fields::NONE),
                    registered,
                    "registered reply-to address of sender"
                );
            }
        }

        self.route(message).await
    }

    /// Adds a routing entry and mirrors it to the parent router.
    ///
    /// Fails synchronously when the routing table refuses the entry. The
    /// returned completion settles once the parent confirmed the registration,
    /// or immediately when there is no parent. A failed parent registration
    /// does not undo the local entry.
    pub fn add_next_hop(
        &self,
        participant_id: &str,
        address: Address,
        is_globally_visible: bool,
    ) -> Result<NextHopCompletion, RoutingError> {
        let address_field = tracing::enabled!(Level::DEBUG).then(|| address.to_string());

        if !self
            .routing_table
            .put(participant_id, address, is_globally_visible, i64::MAX, false)
        {
            warn!(
                event = events::NEXT_HOP_ADD_REJECTED,
                component = COMPONENT,
                participant_id,
                "routing table rejected next hop"
            );
            return Err(RoutingError::AddressRejected {
                participant_id: participant_id.to_string(),
            });
        }

        debug!(
            event = events::NEXT_HOP_ADD,
            component = COMPONENT,
            participant_id,
            address = address_field.as_deref().unwrap_or(fields::NONE),
            is_globally_visible,
            "added next hop"
        );

        Ok(match self.parent.as_ref() {
            Some(parent) => Self::add_next_hop_to_parent(
                parent.clone(),
                participant_id.to_string(),
                is_globally_visible,
            ),
            None => NextHopCompletion::ready(Ok(())),
        })
    }

    /// Removes the local routing entry. Never propagated to the parent.
    pub fn remove_next_hop(&self, participant_id: &str) -> NextHopCompletion {
        self.routing_table.remove(participant_id);
        debug!(
            event = events::NEXT_HOP_REMOVE,
            component = COMPONENT,
            participant_id,
            "removed next hop"
        );
        NextHopCompletion::ready(Ok(()))
    }

    pub fn resolve_next_hop(&self, participant_id: &str) -> bool {
        self.routing_table.contains_key(participant_id)
    }

    pub fn shutdown(&self) {
        info!(
            event = events::SHUTDOWN_START,
            component = COMPONENT,
            "shutting down message router"
        );
        self.stubs.clear();
    }

    async fn dispatch(&self, delayable: DelayableMessage) -> Result<(), RoutingError> {
        let address = match self.address_manager.address_for_delayable_message(&delayable) {
            Some(address) => address,
            None => self.resolve_through_parent(&delayable).await?,
        };
        self.transmit(delayable.message(), &address).await
    }

    async fn resolve_through_parent(
        &self,
        delayable: &DelayableMessage,
    ) -> Result<Address, RoutingError> {
        let message = delayable.message();
        let Some(participant_id) = delayable.recipients().iter().next() else {
            return Err(Self::no_route(fields::NONE));
        };
        let parent = match self.parent.as_ref() {
            Some(parent) if !message.message_type().is_multicast() => parent,
            _ => return Err(Self::no_route(participant_id)),
        };

        debug!(
            event = events::ROUTE_PARENT_LOOKUP,
            component = COMPONENT,
            participant_id = participant_id.as_str(),
            "asking parent router for a route"
        );
        match parent.router().resolve_next_hop(participant_id).await {
            Ok(true) => {
                let address = parent.parent_address().clone();
                self.routing_table
                    .put(participant_id, address.clone(), false, i64::MAX, false);
                Ok(address)
            }
            Ok(false) => Err(Self::no_route(participant_id)),
            Err(err) => {
                warn!(
                    event = events::ROUTE_PARENT_LOOKUP_FAILED,
                    component = COMPONENT,
                    participant_id = participant_id.as_str(),
                    err = %err,
                    "parent router lookup failed"
                );
                Err(RoutingError::ParentUnreachable(err.to_string()))
            }
        }
    }

    async fn transmit(
        &self,
        message: &ImmutableMessage,
        address: &Address,
    ) -> Result<(), RoutingError> {
        let stub = self.stubs.get_or_create(address)?;

        if let Err(err) = self.message_tracker.register(Some(message)) {
            warn!(
                event = events::TRACKER_REGISTER_REFUSED,
                component = COMPONENT,
                err = %err,
                "message not tracked"
            );
        }
        let result = stub.transmit(message).await;
        if let Err(err) = self.message_tracker.unregister(Some(message)) {
            warn!(
                event = events::TRACKER_UNREGISTER,
                component = COMPONENT,
                err = %err,
                "message not untracked"
            );
        }

        match result {
            Ok(()) => {
                if tracing::enabled!(Level::DEBUG) {
                    debug!(
                        event = events::ROUTE_DISPATCH_OK,
                        component = COMPONENT,
                        msg_id = fields::format_message_id(message).as_str(),
                        address = %address,
                        "message transmitted"
                    );
                }
                Ok(())
            }
            Err(err) => {
                warn!(
                    event = events::ROUTE_DISPATCH_FAILED,
                    component = COMPONENT,
                    msg_id = fields::format_message_id(message).as_str(),
                    address = %address,
                    err = %err,
                    "message transmission failed"
                );
                Err(err.into())
            }
        }
    }

    fn add_next_hop_to_parent(
        parent: Arc<ParentRouterLink>,
        participant_id: String,
        is_globally_visible: bool,
    ) -> NextHopCompletion {
        let (deferred, completion) = completion::deferred();

        tokio::spawn(async move {
            let result = parent
                .router()
                .add_next_hop(&participant_id, parent.incoming_address(), is_globally_visible)
                .await;
            match result {
                Ok(()) => {
                    debug!(
                        event = events::PARENT_REGISTRATION_OK,
                        component = COMPONENT,
                        participant_id = participant_id.as_str(),
                        "parent router added next hop"
                    );
                    deferred.resolve();
                }
                Err(err) => {
                    error!(
                        event = events::PARENT_REGISTRATION_FAILED,
                        component = COMPONENT,
                        participant_id = participant_id.as_str(),
                        err = %err,
                        "failed to add next hop to parent router"
                    );
                    deferred.reject(RoutingError::ParentRegistrationFailed(err.to_string()));
                }
            }
        });

        completion
    }

    fn no_route(participant_id: &str) -> RoutingError {
        warn!(
            event = events::ROUTE_NO_ROUTE,
            component = COMPONENT,
            participant_id,
            "no route found"
        );
        RoutingError::NoRouteFound {
            participant_id: participant_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MessageRouter;
    use crate::address::{Address, AddressKind};
    use crate::error::{RoutingError, TransportError};
    use crate::message::{ImmutableMessage, MessageBuilder, MessageType};
    use crate::messaging::{MessagingStub, MessagingStubFactory, MessagingStubRegistry};
    use crate::routing::{
        AddressManager, AddressValidator, MulticastReceiverRegistry, RoutingTable, RuntimeRole,
    };
    use crate::tracking::MessageTracker;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<(Address, String)>>,
        fail_with: Mutex<Option<TransportError>>,
        tracked_during_send: Mutex<Vec<usize>>,
        tracker: Mutex<Option<Arc<MessageTracker>>>,
    }

    struct OutboxStub {
        address: Address,
        outbox: Arc<Outbox>,
    }

    #[async_trait]
    impl MessagingStub for OutboxStub {
        async fn transmit(&self, message: &ImmutableMessage) -> Result<(), TransportError> {
            if let Some(tracker) = self.outbox.tracker.lock().expect("lock").as_ref() {
                self.outbox
                    .tracked_during_send
                    .lock()
                    .expect("lock")
                    .push(tracker.number_of_registered_messages());
            }
            if let Some(err) = self.outbox.fail_with.lock().expect("lock").clone() {
                return Err(err);
            }
            self.outbox.sent.lock().expect("lock").push((
                self.address.clone(),
                message.id().unwrap_or_default().to_string(),
            ));
            Ok(())
        }
    }

    impl MessagingStubFactory for Arc<Outbox> {
        fn create(&self, address: &Address) -> Result<Arc<dyn MessagingStub>, RoutingError> {
            Ok(Arc::new(OutboxStub {
                address: address.clone(),
                outbox: self.clone(),
            }))
        }
    }

    fn router(outbox: &Arc<Outbox>) -> (MessageRouter, Arc<MessageTracker>) {
        let table = Arc::new(RoutingTable::new(
            Arc::new(AddressValidator::new(RuntimeRole::ClusterController, Vec::<Address>::new())),
            vec!["gbid".to_string()],
        ));
        let manager =
            AddressManager::new(table.clone(), Arc::new(MulticastReceiverRegistry::new()), None);
        let mut stubs = MessagingStubRegistry::new();
        for kind in AddressKind::ALL {
            stubs = stubs.with_factory(kind, Arc::new(outbox.clone()));
        }
        let tracker = Arc::new(MessageTracker::new(Duration::from_millis(50)));
        *outbox.tracker.lock().expect("lock") = Some(tracker.clone());
        (MessageRouter::new(table, manager, stubs, tracker.clone()), tracker)
    }

    #[tokio::test]
    async fn expired_messages_are_not_routed() {
        let outbox = Arc::new(Outbox::default());
        let (router, _) = router(&outbox);
        let message = MessageBuilder::new(MessageType::Request)
            .id("expired")
            .recipient("provider")
            .expiry_date_ms(1)
            .build();

        assert_eq!(
            router.route(message).await,
            Err(RoutingError::MessageExpired {
                message_id: "expired".to_string()
            })
        );
        assert!(outbox.sent.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn unicast_is_tracked_while_transmitting() {
        let outbox = Arc::new(Outbox::default());
        let (router, tracker) = router(&outbox);
        router
            .add_next_hop("provider", Address::web_socket_client("provider-client"), false)
            .expect("next hop accepted");

        let message = MessageBuilder::new(MessageType::Request)
            .id("request-1")
            .recipient("provider")
            .build();
        router.route(message).await.expect("routed");

        assert_eq!(
            *outbox.sent.lock().expect("lock"),
            vec![(
                Address::web_socket_client("provider-client"),
                "request-1".to_string()
            )]
        );
        assert_eq!(*outbox.tracked_during_send.lock().expect("lock"), vec![1]);
        assert_eq!(tracker.number_of_registered_messages(), 0);
    }

    #[tokio::test]
    async fn transport_failures_map_to_routing_errors() {
        let outbox = Arc::new(Outbox::default());
        let (router, tracker) = router(&outbox);
        router
            .add_next_hop("provider", Address::InProcess, false)
            .expect("next hop accepted");

        *outbox.fail_with.lock().expect("lock") = Some(TransportError::SendBufferFull);
        let message = MessageBuilder::new(MessageType::OneWay)
            .recipient("provider")
            .build();
        assert_eq!(router.route(message).await, Err(RoutingError::SendBufferFull));
        assert_eq!(tracker.number_of_registered_messages(), 0);

        *outbox.fail_with.lock().expect("lock") = Some(TransportError::Io("reset".to_string()));
        let message = MessageBuilder::new(MessageType::OneWay)
            .recipient("provider")
            .build();
        assert_eq!(
            router.route(message).await,
            Err(RoutingError::IoFailure("reset".to_string()))
        );
    }

    #[tokio::test]
    async fn unknown_unicast_without_parent_has_no_route() {
        let outbox = Arc::new(Outbox::default());
        let (router, _) = router(&outbox);
        let message = MessageBuilder::new(MessageType::Request)
            .recipient("nobody")
            .build();

        assert_eq!(
            router.route(message).await,
            Err(RoutingError::NoRouteFound {
                participant_id: "nobody".to_string()
            })
        );
    }

    #[tokio::test]
    async fn route_in_registers_reply_to_of_requests() {
        let outbox = Arc::new(Outbox::default());
        let (router, _) = router(&outbox);
        router
            .add_next_hop("provider", Address::InProcess, false)
            .expect("next hop accepted");

        let reply_to = Address::mqtt("gbid", "consumer/replyto");
        let request = MessageBuilder::new(MessageType::Request)
            .sender("consumer")
            .recipient("provider")
            .reply_to(reply_to.clone())
            .build();
        router.route_in(request, None).await.expect("routed");

        assert_eq!(router.routing_table().get("consumer"), Some(reply_to));
        assert_eq!(router.routing_table().get_is_globally_visible("consumer"), Ok(true));

        let one_way = MessageBuilder::new(MessageType::OneWay)
            .sender("other-consumer")
            .recipient("provider")
            .reply_to(Address::mqtt("gbid", "other/replyto"))
            .build();
        router.route_in(one_way, None).await.expect("routed");
        assert!(!router.resolve_next_hop("other-consumer"));
    }

    #[tokio::test]
    async fn next_hops_without_parent_complete_immediately() {
        let outbox = Arc::new(Outbox::default());
        let (router, _) = router(&outbox);

        let completion = router
            .add_next_hop("provider", Address::InProcess, true)
            .expect("next hop accepted");
        assert_eq!(completion.wait().await, Ok(()));
        assert!(router.resolve_next_hop("provider"));
        assert!(router.parent_announcement().is_none());

        assert_eq!(router.remove_next_hop("provider").wait().await, Ok(()));
        assert!(!router.resolve_next_hop("provider"));
    }

    #[tokio::test]
    async fn shutdown_clears_cached_stubs() {
        let outbox = Arc::new(Outbox::default());
        let (router, _) = router(&outbox);
        router
            .add_next_hop("provider", Address::InProcess, false)
            .expect("next hop accepted");
        router
            .route(
                MessageBuilder::new(MessageType::OneWay)
                    .recipient("provider")
                    .build(),
            )
            .await
            .expect("routed");
        assert_eq!(router.stubs.len(), 1);

        router.shutdown();
        assert!(router.stubs.is_empty());
    }
}
