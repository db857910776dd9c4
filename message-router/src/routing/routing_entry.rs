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

//! Routing-table value type.

use crate::address::Address;

/// Address of one participant plus the attributes the table tracks for it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoutingEntry {
    address: Address,
    is_globally_visible: bool,
    expiry_date_ms: i64,
    is_sticky: bool,
}

impl RoutingEntry {
    pub fn new(
        address: Address,
        is_globally_visible: bool,
        expiry_date_ms: i64,
        is_sticky: bool,
    ) -> Self {
        Self {
            address,
            is_globally_visible,
            expiry_date_ms,
            is_sticky,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn is_globally_visible(&self) -> bool {
        self.is_globally_visible
    }

    pub fn expiry_date_ms(&self) -> i64 {
        self.expiry_date_ms
    }

    pub fn is_sticky(&self) -> bool {
        self.is_sticky
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expiry_date_ms < now_ms
    }

    /// Extends lifetime attributes with those of an accepted update: the later
    /// expiry wins and stickiness is never lost.
    pub(crate) fn merge_lifetime(&mut self, expiry_date_ms: i64, is_sticky: bool) {
        self.expiry_date_ms = self.expiry_date_ms.max(expiry_date_ms);
        self.is_sticky = self.is_sticky || is_sticky;
    }

    pub(crate) fn replace_address(&mut self, address: Address, is_globally_visible: bool) {
        self.address = address;
        self.is_globally_visible = is_globally_visible;
    }
}
