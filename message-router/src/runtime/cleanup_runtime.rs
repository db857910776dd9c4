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

//! Background sweep of expired routing entries.

use crate::observability::events;
use crate::routing::RoutingTable;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

const COMPONENT: &str = "routing_table_cleanup";
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Purges expired non-sticky entries every `interval` until the handle is
/// aborted. Lookups purge lazily as well, so the sweep only bounds memory.
///
/// Intervals below one millisecond are raised to one millisecond.
///
/// Must be called from within a tokio runtime.
pub fn spawn_routing_table_cleanup(table: Arc<RoutingTable>, interval: Duration) -> JoinHandle<()> {
    if interval < MIN_INTERVAL {
        warn!(
            event = events::CLEANUP_SPAWN,
            component = COMPONENT,
            interval_ms = interval.as_millis() as u64,
            "cleanup interval too short, using 1 ms"
        );
    }
    let interval = interval.max(MIN_INTERVAL);

    info!(
        event = events::CLEANUP_SPAWN,
        component = COMPONENT,
        interval_ms = interval.as_millis() as u64,
        "starting routing table cleanup"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let purged = table.purge_expired();
            debug!(
                event = events::CLEANUP_SWEEP,
                component = COMPONENT,
                purged,
                remaining = table.len(),
                "routing table sweep finished"
            );
        }
    })
}
