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

mod support;

use message_router::address::{Address, WebSocketProtocol};
use message_router::error::{ConfigError, RoutingError};
use message_router::message::{MessageBuilder, MessageType};
use message_router::router::{MessageRouter, ParentRouterLink};
use message_router::routing::{RoutingTable, RuntimeRole};
use std::collections::HashSet;
use std::sync::Arc;
use support::{Outbox, ScriptedParent};

const PARENT_PARTICIPANT_ID: &str = "cluster-controller-routing-provider";
const PROXY_PARTICIPANT_ID: &str = "leaf-routing-proxy";

fn parent_address() -> Address {
    Address::web_socket(WebSocketProtocol::Ws, "localhost", 4242, "/")
}

fn leaf(parent: &Arc<ScriptedParent>) -> (MessageRouter, Arc<RoutingTable>, Arc<Outbox>) {
    let fixture = support::plain_router_fixture(RuntimeRole::Leaf);
    let link = ParentRouterLink::new(
        parent.clone(),
        parent_address(),
        PARENT_PARTICIPANT_ID,
        Address::web_socket_client("leaf-1"),
        PROXY_PARTICIPANT_ID,
    )
    .expect("announceable incoming address");
    let router = fixture.router.with_parent(link);
    (router, fixture.table, fixture.outbox)
}

fn request_to(recipient: &str) -> message_router::message::ImmutableMessage {
    MessageBuilder::new(MessageType::Request)
        .sender("consumer")
        .recipient(recipient)
        .build()
}

#[tokio::test]
async fn leaf_announces_itself_and_pins_the_parent() {
    support::init_logging();
    let parent = Arc::new(ScriptedParent::default());
    let (router, table, _) = leaf(&parent);

    router
        .parent_announcement()
        .expect("parent attached")
        .wait()
        .await
        .expect("announced");

    assert_eq!(
        parent.registrations(),
        vec![(
            PROXY_PARTICIPANT_ID.to_string(),
            Address::web_socket_client("leaf-1"),
            false
        )]
    );
    let entry = table.get_entry(PARENT_PARTICIPANT_ID).expect("parent entry");
    assert!(entry.is_sticky());
    assert_eq!(entry.address(), &parent_address());

    table.remove(PARENT_PARTICIPANT_ID);
    assert!(table.contains_key(PARENT_PARTICIPANT_ID));
}

#[tokio::test]
async fn unknown_recipient_is_resolved_once_through_the_parent() {
    support::init_logging();
    let parent = Arc::new(ScriptedParent::default());
    parent.knows("remote-provider");
    let (router, table, outbox) = leaf(&parent);

    router.route(request_to("remote-provider")).await.expect("routed");
    router.route(request_to("remote-provider")).await.expect("routed");

    assert_eq!(parent.lookups("remote-provider"), 1);
    assert_eq!(outbox.sent().len(), 2);
    assert_eq!(outbox.sent_to(), HashSet::from([parent_address()]));
    assert_eq!(table.get("remote-provider"), Some(parent_address()));
}

#[tokio::test]
async fn parent_without_route_yields_no_route_found() {
    support::init_logging();
    let parent = Arc::new(ScriptedParent::default());
    let (router, table, outbox) = leaf(&parent);

    let result = router.route(request_to("nobody")).await;

    assert_eq!(
        result,
        Err(RoutingError::NoRouteFound {
            participant_id: "nobody".to_string()
        })
    );
    assert!(!table.contains_key("nobody"));
    assert!(outbox.sent().is_empty());
}

#[tokio::test]
async fn unreachable_parent_is_reported_as_such() {
    support::init_logging();
    let parent = Arc::new(ScriptedParent::default());
    let (router, _, _) = leaf(&parent);
    parent.set_unreachable(true);

    let result = router.route(request_to("remote-provider")).await;

    assert!(matches!(result, Err(RoutingError::ParentUnreachable(_))));
}

#[tokio::test]
async fn next_hops_are_mirrored_to_the_parent() {
    support::init_logging();
    let parent = Arc::new(ScriptedParent::default());
    let (router, table, _) = leaf(&parent);

    router
        .add_next_hop("local-provider", Address::InProcess, true)
        .expect("accepted")
        .wait()
        .await
        .expect("parent registration");

    assert!(parent.registrations().contains(&(
        "local-provider".to_string(),
        Address::web_socket_client("leaf-1"),
        true
    )));
    assert!(router.resolve_next_hop("local-provider"));

    parent.set_unreachable(true);
    let outcome = router
        .add_next_hop("other-provider", Address::InProcess, false)
        .expect("accepted locally")
        .wait()
        .await;
    assert!(matches!(outcome, Err(RoutingError::ParentRegistrationFailed(_))));
    assert!(table.contains_key("other-provider"));
}

#[test]
fn mqtt_cannot_be_announced_to_a_parent() {
    let parent = Arc::new(ScriptedParent::default());
    let result = ParentRouterLink::new(
        parent,
        parent_address(),
        PARENT_PARTICIPANT_ID,
        Address::mqtt("joynrdefaultgbid", "leaf"),
        PROXY_PARTICIPANT_ID,
    );

    assert!(matches!(result, Err(ConfigError::UnsupportedIncomingAddress(_))));
}
