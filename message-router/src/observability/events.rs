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

//! Canonical structured event names used across `message-router`.

// Routing table events.
pub const ROUTING_ENTRY_ADDED: &str = "routing_entry_added";
pub const ROUTING_ENTRY_REFRESHED: &str = "routing_entry_refreshed";
pub const ROUTING_ENTRY_REJECTED: &str = "routing_entry_rejected";
pub const ROUTING_ENTRY_REMOVED: &str = "routing_entry_removed";
pub const ROUTING_ENTRY_STICKY_KEPT: &str = "routing_entry_sticky_kept";
pub const ROUTING_ENTRY_EXPIRED: &str = "routing_entry_expired";
pub const ADDRESS_INVALID_FOR_ROUTING_TABLE: &str = "address_invalid_for_routing_table";

// Recipient resolution events.
pub const MULTICAST_RECEIVER_ADDED: &str = "multicast_receiver_added";
pub const MULTICAST_RECEIVER_REMOVED: &str = "multicast_receiver_removed";
pub const RECIPIENT_ADDRESS_MISSING: &str = "recipient_address_missing";
pub const MULTICAST_SENDER_NOT_GLOBALLY_VISIBLE: &str = "multicast_sender_not_globally_visible";

// Router events.
pub const ROUTE_START: &str = "route_start";
pub const ROUTE_MESSAGE_EXPIRED: &str = "route_message_expired";
pub const ROUTE_NO_ROUTE: &str = "route_no_route";
pub const ROUTE_PARENT_LOOKUP: &str = "route_parent_lookup";
pub const ROUTE_PARENT_LOOKUP_FAILED: &str = "route_parent_lookup_failed";
pub const ROUTE_DISPATCH_OK: &str = "route_dispatch_ok";
pub const ROUTE_DISPATCH_FAILED: &str = "route_dispatch_failed";
pub const REPLY_TO_REGISTERED: &str = "reply_to_registered";
pub const NEXT_HOP_ADD: &str = "next_hop_add";
pub const NEXT_HOP_ADD_REJECTED: &str = "next_hop_add_rejected";
pub const NEXT_HOP_REMOVE: &str = "next_hop_remove";
pub const PARENT_REGISTRATION_OK: &str = "parent_registration_ok";
pub const PARENT_REGISTRATION_FAILED: &str = "parent_registration_failed";
pub const STUB_CREATE: &str = "stub_create";
pub const STUB_REUSE: &str = "stub_reuse";
pub const STUB_CACHE_CLEARED: &str = "stub_cache_cleared";

// Inbound skeleton events.
pub const SKELETON_REPLY_CLIENT_START: &str = "skeleton_reply_client_start";
pub const SKELETON_SUBSCRIBE: &str = "skeleton_subscribe";
pub const SKELETON_UNSUBSCRIBE: &str = "skeleton_unsubscribe";
pub const SKELETON_DESERIALIZE_FAILED: &str = "skeleton_deserialize_failed";
pub const SKELETON_ROUTE_FAILED: &str = "skeleton_route_failed";

// Tracker and shutdown events.
pub const TRACKER_REGISTER: &str = "tracker_register";
pub const TRACKER_REGISTER_REFUSED: &str = "tracker_register_refused";
pub const TRACKER_UNREGISTER: &str = "tracker_unregister";
pub const TRACKER_SHUTDOWN_DRAINED: &str = "tracker_shutdown_drained";
pub const TRACKER_SHUTDOWN_TIMEOUT: &str = "tracker_shutdown_timeout";
pub const SHUTDOWN_PREPARE: &str = "shutdown_prepare";
pub const SHUTDOWN_START: &str = "shutdown_start";

// Registrar events.
pub const PROVIDER_REGISTER_START: &str = "provider_register_start";
pub const PROVIDER_REGISTER_OK: &str = "provider_register_ok";
pub const PROVIDER_REGISTER_ROLLBACK: &str = "provider_register_rollback";
pub const PROVIDER_UNREGISTER: &str = "provider_unregister";

// Runtime events.
pub const CLEANUP_SPAWN: &str = "cleanup_spawn";
pub const CLEANUP_SWEEP: &str = "cleanup_sweep";
