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

//! Outgoing transport contracts and the per-address stub cache.

use crate::address::{Address, AddressKind};
use crate::error::{RoutingError, TransportError};
use crate::message::ImmutableMessage;
use crate::observability::events;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

const COMPONENT: &str = "messaging_stub_registry";

/// Sends serialized messages to one destination address.
#[async_trait]
pub trait MessagingStub: Send + Sync {
    async fn transmit(&self, message: &ImmutableMessage) -> Result<(), TransportError>;
}

/// Creates stubs for the addresses of one transport.
pub trait MessagingStubFactory: Send + Sync {
    fn create(&self, address: &Address) -> Result<Arc<dyn MessagingStub>, RoutingError>;
}

/// Dispatches stub creation by [`AddressKind`] and reuses stubs per address.
#[derive(Default)]
pub struct MessagingStubRegistry {
    factories: HashMap<AddressKind, Arc<dyn MessagingStubFactory>>,
    stubs: DashMap<Address, Arc<dyn MessagingStub>>,
}

impl MessagingStubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_factory(
        mut self,
        kind: AddressKind,
        factory: Arc<dyn MessagingStubFactory>,
    ) -> Self {
        self.factories.insert(kind, factory);
        self
    }

    /// Cached stub for `address`, created through the factory of its kind on
    /// first use.
    pub fn get_or_create(&self, address: &Address) -> Result<Arc<dyn MessagingStub>, RoutingError> {
        if let Some(stub) = self.stubs.get(address) {
            trace!(
                event = events::STUB_REUSE,
                component = COMPONENT,
                address = %address,
                "reusing messaging stub"
            );
            return Ok(stub.clone());
        }

        let kind = address.kind();
        let factory = self
            .factories
            .get(&kind)
            .ok_or(RoutingError::NoStubFactory(kind))?;
        let stub = factory.create(address)?;

        // A concurrent creator may have won; keep the first stub.
        let stub = self
            .stubs
            .entry(address.clone())
            .or_insert_with(|| stub)
            .clone();
        debug!(
            event = events::STUB_CREATE,
            component = COMPONENT,
            address = %address,
            "created messaging stub"
        );
        Ok(stub)
    }

    pub fn remove(&self, address: &Address) {
        self.stubs.remove(address);
    }

    pub fn clear(&self) {
        let cleared = self.stubs.len();
        self.stubs.clear();
        debug!(
            event = events::STUB_CACHE_CLEARED,
            component = COMPONENT,
            cleared,
            "cleared messaging stub cache"
        );
    }

    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }
}
