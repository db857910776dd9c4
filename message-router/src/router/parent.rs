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

//! Link from a leaf router to the router one level up the hierarchy.

use crate::address::Address;
use crate::error::{ConfigError, RoutingError};
use async_trait::async_trait;
use std::sync::Arc;

/// Routing operations a parent router offers to its leaves.
#[async_trait]
pub trait ParentRouter: Send + Sync {
    /// Registers `address` as the way to reach `participant_id` through the leaf.
    async fn add_next_hop(
        &self,
        participant_id: &str,
        address: &Address,
        is_globally_visible: bool,
    ) -> Result<(), RoutingError>;

    /// Whether the parent knows a route to `participant_id`.
    async fn resolve_next_hop(&self, participant_id: &str) -> Result<bool, RoutingError>;
}

/// Everything a leaf needs to talk to its parent.
#[derive(Clone)]
pub struct ParentRouterLink {
    router: Arc<dyn ParentRouter>,
    parent_address: Address,
    parent_participant_id: String,
    incoming_address: Address,
    proxy_participant_id: String,
}

impl ParentRouterLink {
    /// Fails when `incoming_address` is of a kind the parent cannot reach the
    /// leaf through.
    pub fn new(
        router: Arc<dyn ParentRouter>,
        parent_address: Address,
        parent_participant_id: impl Into<String>,
        incoming_address: Address,
        proxy_participant_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let kind = incoming_address.kind();
        if !kind.is_parent_announceable() {
            return Err(ConfigError::UnsupportedIncomingAddress(kind));
        }

        Ok(Self {
            router,
            parent_address,
            parent_participant_id: parent_participant_id.into(),
            incoming_address,
            proxy_participant_id: proxy_participant_id.into(),
        })
    }

    pub fn router(&self) -> &Arc<dyn ParentRouter> {
        &self.router
    }

    /// Where messages for the parent are sent.
    pub fn parent_address(&self) -> &Address {
        &self.parent_address
    }

    pub fn parent_participant_id(&self) -> &str {
        &self.parent_participant_id
    }

    /// This leaf's address as the parent sees it.
    pub fn incoming_address(&self) -> &Address {
        &self.incoming_address
    }

    pub fn proxy_participant_id(&self) -> &str {
        &self.proxy_participant_id
    }
}
