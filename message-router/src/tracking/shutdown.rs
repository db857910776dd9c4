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

//! Two-phase shutdown coordination.

use crate::error::ShutdownError;
use crate::observability::events;
use crate::tracking::message_tracker::MessageTracker;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

const COMPONENT: &str = "shutdown_notifier";

#[async_trait]
pub trait PrepareForShutdownListener: Send + Sync {
    async fn prepare_for_shutdown(&self);

    fn is_message_tracker(&self) -> bool {
        false
    }
}

#[async_trait]
pub trait ShutdownListener: Send + Sync {
    async fn shutdown(&self);

    fn is_message_tracker(&self) -> bool {
        false
    }
}

/// Notifies registered components in two phases.
///
/// `prepare_for_shutdown` runs the generic prepare listeners, then the message
/// tracker. `shutdown` lets the message tracker drain first, then runs the
/// generic listeners in reverse registration order and finally the listeners
/// registered to be shut down last.
#[derive(Default)]
pub struct ShutdownNotifier {
    prepare_listeners: Mutex<Vec<Arc<dyn PrepareForShutdownListener>>>,
    shutdown_listeners: Mutex<Vec<Arc<dyn ShutdownListener>>>,
    last_listeners: Mutex<Vec<Arc<dyn ShutdownListener>>>,
    tracker_prepare_listener: Mutex<Option<Arc<MessageTracker>>>,
    tracker_shutdown_listener: Mutex<Option<Arc<MessageTracker>>>,
}

fn snapshot<T: Clone>(slot: &Mutex<T>) -> T {
    slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

impl ShutdownNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_for_shutdown(
        &self,
        listener: Arc<dyn ShutdownListener>,
    ) -> Result<(), ShutdownError> {
        if listener.is_message_tracker() {
            return Err(ShutdownError::MessageTrackerNotAllowed);
        }
        self.shutdown_listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
        Ok(())
    }

    pub fn register_to_be_shutdown_as_last(
        &self,
        listener: Arc<dyn ShutdownListener>,
    ) -> Result<(), ShutdownError> {
        if listener.is_message_tracker() {
            return Err(ShutdownError::MessageTrackerNotAllowed);
        }
        self.last_listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
        Ok(())
    }

    pub fn register_prepare_for_shutdown_listener(
        &self,
        listener: Arc<dyn PrepareForShutdownListener>,
    ) -> Result<(), ShutdownError> {
        if listener.is_message_tracker() {
            return Err(ShutdownError::MessageTrackerNotAllowed);
        }
        self.prepare_listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
        Ok(())
    }

    pub fn register_message_tracker_prepare_for_shutdown_listener(
        &self,
        tracker: Arc<MessageTracker>,
    ) {
        *self
            .tracker_prepare_listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(tracker);
    }

    pub fn register_message_tracker_shutdown_listener(&self, tracker: Arc<MessageTracker>) {
        *self
            .tracker_shutdown_listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(tracker);
    }

    pub async fn prepare_for_shutdown(&self) {
        info!(
            event = events::SHUTDOWN_PREPARE,
            component = COMPONENT,
            "preparing for shutdown"
        );
        for listener in snapshot(&self.prepare_listeners) {
            listener.prepare_for_shutdown().await;
        }
        if let Some(tracker) = snapshot(&self.tracker_prepare_listener) {
            PrepareForShutdownListener::prepare_for_shutdown(tracker.as_ref()).await;
        }
    }

    pub async fn shutdown(&self) {
        info!(
            event = events::SHUTDOWN_START,
            component = COMPONENT,
            "shutting down"
        );
        if let Some(tracker) = snapshot(&self.tracker_shutdown_listener) {
            ShutdownListener::shutdown(tracker.as_ref()).await;
        }
        for listener in snapshot(&self.shutdown_listeners).into_iter().rev() {
            listener.shutdown().await;
        }
        for listener in snapshot(&self.last_listeners) {
            listener.shutdown().await;
        }
    }
}
