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

//! Pending-request accounting behind the shared-subscription toggle.
//!
//! With `max_incoming_requests = 20`, `upper = 80` and `lower = 20` the shared
//! topic is dropped once 16 requests are pending and taken up again when fewer
//! than 4 remain.

use crate::config::BackpressureConfig;
use crate::error::ConfigError;
use dashmap::DashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Tracks the ids of accepted requests and decides when the shared
/// subscription must be toggled.
///
/// The `subscribed` flag only flips through compare-and-swap, so concurrent
/// callers crossing a threshold together produce exactly one toggle.
#[derive(Debug)]
pub struct BackpressureController {
    enabled: bool,
    unsubscribe_at: usize,
    resubscribe_below: usize,
    pending_ids: DashSet<String>,
    pending: AtomicUsize,
    subscribed: AtomicBool,
}

impl BackpressureController {
    pub fn new(config: &BackpressureConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let (unsubscribe_at, resubscribe_below) = if config.enabled {
            // validated: max > 0 and both percentages within [0, 100]
            let max = config.max_incoming_requests as u128;
            let upper = config.upper_threshold_percent as u128;
            let lower = config.lower_threshold_percent as u128;
            (
                saturating_usize((max * upper).div_ceil(100)),
                saturating_usize(max * lower / 100),
            )
        } else {
            (usize::MAX, 0)
        };

        Ok(Self {
            enabled: config.enabled,
            unsubscribe_at,
            resubscribe_below,
            pending_ids: DashSet::new(),
            pending: AtomicUsize::new(0),
            subscribed: AtomicBool::new(false),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn unsubscribe_threshold(&self) -> usize {
        self.unsubscribe_at
    }

    pub fn resubscribe_threshold(&self) -> usize {
        self.resubscribe_below
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::Acquire)
    }

    /// Records that the shared subscription was (re)established explicitly.
    pub fn mark_subscribed(&self) {
        self.subscribed.store(true, Ordering::Release);
    }

    /// Counts a newly accepted request.
    ///
    /// Returns `true` when the caller must unsubscribe from the shared topic.
    pub fn request_accepted(&self, message_id: &str) -> bool {
        // counted before the id becomes removable, so a concurrent release
        // never decrements below zero
        let pending = self.pending.fetch_add(1, Ordering::AcqRel) + 1;
        if !self.pending_ids.insert(message_id.to_string()) {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return false;
        }

        self.enabled
            && pending >= self.unsubscribe_at
            && self
                .subscribed
                .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
    }

    /// Releases a request once it was handled. Unknown ids are ignored.
    ///
    /// Returns `true` when the caller must subscribe to the shared topic again.
    pub fn message_processed(&self, message_id: &str) -> bool {
        if self.pending_ids.remove(message_id).is_none() {
            return false;
        }
        let pending = self.pending.fetch_sub(1, Ordering::AcqRel).saturating_sub(1);

        self.enabled
            && pending < self.resubscribe_below
            && self
                .subscribed
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
    }
}

fn saturating_usize(value: u128) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
