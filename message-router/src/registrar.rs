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

//! Registration of locally hosted providers.
//!
//! A provider becomes reachable in three steps: it is handed to the local
//! dispatcher, a routing entry to the in-process dispatcher is added, and the
//! provider is announced to discovery. A failing step undoes the steps before
//! it.

use crate::address::Address;
use crate::error::{RegistrationError, RoutingError};
use crate::observability::events;
use crate::router::MessageRouter;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const COMPONENT: &str = "provider_registrar";

/// Local request dispatcher that holds provider implementations.
pub trait ProviderDirectory: Send + Sync {
    type Provider: Send;

    fn add(&self, participant_id: &str, provider: Self::Provider);

    fn remove(&self, participant_id: &str);
}

/// Discovery service the provider is announced to.
#[async_trait]
pub trait LocalDiscovery: Send + Sync {
    async fn add(
        &self,
        participant_id: &str,
        is_globally_visible: bool,
        gbids: &[String],
    ) -> Result<(), String>;

    async fn remove(&self, participant_id: &str) -> Result<(), String>;
}

pub struct ProviderRegistrar<D: ProviderDirectory> {
    directory: Arc<D>,
    router: Arc<MessageRouter>,
    discovery: Arc<dyn LocalDiscovery>,
}

impl<D: ProviderDirectory> ProviderRegistrar<D> {
    pub fn new(
        directory: Arc<D>,
        router: Arc<MessageRouter>,
        discovery: Arc<dyn LocalDiscovery>,
    ) -> Self {
        Self {
            directory,
            router,
            discovery,
        }
    }

    /// Adds the provider to the directory, the routing table and discovery, in
    /// that order, and undoes the earlier steps when a later one fails.
    ///
    /// The registrar waits for the parent router to confirm the routing entry.
    /// A rejected parent registration removes the local entry and the provider
    /// as well, even though [`MessageRouter::add_next_hop`] alone keeps the
    /// local entry in that case.
    pub async fn register_provider(
        &self,
        participant_id: &str,
        provider: D::Provider,
        is_globally_visible: bool,
        gbids: &[String],
    ) -> Result<(), RegistrationError> {
        info!(
            event = events::PROVIDER_REGISTER_START,
            component = COMPONENT,
            participant_id,
            is_globally_visible,
            "registering provider"
        );
        self.directory.add(participant_id, provider);

        if let Err(err) = self.add_routing_entry(participant_id, is_globally_visible).await {
            error!(
                event = events::PROVIDER_REGISTER_ROLLBACK,
                component = COMPONENT,
                participant_id,
                err = %err,
                "error while adding routing entry, removing provider"
            );
            self.directory.remove(participant_id);
            return Err(RegistrationError::RoutingEntry(err));
        }

        if let Err(reason) = self
            .discovery
            .add(participant_id, is_globally_visible, gbids)
            .await
        {
            error!(
                event = events::PROVIDER_REGISTER_ROLLBACK,
                component = COMPONENT,
                participant_id,
                err = reason.as_str(),
                "error while adding discovery entry, removing routing entry"
            );
            self.router.remove_next_hop(participant_id);
            self.directory.remove(participant_id);
            return Err(RegistrationError::Discovery(reason));
        }

        info!(
            event = events::PROVIDER_REGISTER_OK,
            component = COMPONENT,
            participant_id,
            "provider registered"
        );
        Ok(())
    }

    /// Removes the provider from discovery, routing and the dispatcher. Local
    /// cleanup happens even when discovery fails.
    pub async fn unregister_provider(&self, participant_id: &str) -> Result<(), RegistrationError> {
        let discovery_result = self.discovery.remove(participant_id).await;
        if let Err(reason) = discovery_result.as_ref() {
            warn!(
                event = events::PROVIDER_UNREGISTER,
                component = COMPONENT,
                participant_id,
                err = reason.as_str(),
                "unable to remove discovery entry"
            );
        }

        self.router.remove_next_hop(participant_id);
        self.directory.remove(participant_id);
        debug!(
            event = events::PROVIDER_UNREGISTER,
            component = COMPONENT,
            participant_id,
            "provider unregistered"
        );
        discovery_result.map_err(RegistrationError::Discovery)
    }

    async fn add_routing_entry(
        &self,
        participant_id: &str,
        is_globally_visible: bool,
    ) -> Result<(), RoutingError> {
        let completion =
            self.router
                .add_next_hop(participant_id, Address::InProcess, is_globally_visible)?;
        if let Err(err) = completion.wait().await {
            self.router.remove_next_hop(participant_id);
            return Err(err);
        }
        Ok(())
    }
}
