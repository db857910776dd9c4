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

//! In-flight message bookkeeping for graceful shutdown.

use crate::error::TrackerError;
use crate::message::{ImmutableMessage, CUSTOM_HEADER_REQUEST_REPLY_ID};
use crate::observability::events;
use crate::tracking::shutdown::{PrepareForShutdownListener, ShutdownListener};
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info, trace, warn};

const COMPONENT: &str = "message_tracker";

/// Tracks the ids of outgoing messages whose delivery is still pending so that
/// shutdown can wait for them.
///
/// Only request-like types are tracked (see [`MessageType::is_request`]).
///
/// [`MessageType::is_request`]: crate::message::MessageType::is_request
pub struct MessageTracker {
    registered: DashSet<String>,
    // request reply id -> message id
    reply_callers: DashMap<String, String>,
    accepting: AtomicBool,
    drained: Notify,
    shutdown_max_timeout: Duration,
}

impl MessageTracker {
    pub fn new(shutdown_max_timeout: Duration) -> Self {
        Self {
            registered: DashSet::new(),
            reply_callers: DashMap::new(),
            accepting: AtomicBool::new(true),
            drained: Notify::new(),
            shutdown_max_timeout,
        }
    }

    pub fn register(&self, message: Option<&ImmutableMessage>) -> Result<(), TrackerError> {
        let message = message.ok_or(TrackerError::IllegalState(
            "message to register must not be missing",
        ))?;
        let message_id = message.id().ok_or(TrackerError::IllegalState(
            "id of message to register must not be missing",
        ))?;

        if !message.message_type().is_request() {
            return Ok(());
        }

        if !self.accepting.load(Ordering::Acquire) {
            debug!(
                event = events::TRACKER_REGISTER_REFUSED,
                component = COMPONENT,
                msg_id = message_id,
                "shutdown in progress, message not tracked"
            );
            return Ok(());
        }

        if self.registered.insert(message_id.to_string()) {
            if let Some(request_reply_id) = message.custom_header(CUSTOM_HEADER_REQUEST_REPLY_ID) {
                self.reply_callers
                    .insert(request_reply_id.to_string(), message_id.to_string());
            }
            trace!(
                event = events::TRACKER_REGISTER,
                component = COMPONENT,
                msg_id = message_id,
                msg_type = %message.message_type(),
                "tracking message"
            );
        }
        Ok(())
    }

    pub fn unregister(&self, message: Option<&ImmutableMessage>) -> Result<(), TrackerError> {
        let message = message.ok_or(TrackerError::IllegalState(
            "message to unregister must not be missing",
        ))?;
        let message_id = message.id().ok_or(TrackerError::IllegalState(
            "id of message to unregister must not be missing",
        ))?;

        if !message.message_type().is_request() {
            return Ok(());
        }

        if let Some(request_reply_id) = message.custom_header(CUSTOM_HEADER_REQUEST_REPLY_ID) {
            self.reply_callers.remove(request_reply_id);
        }
        self.remove(message_id);
        Ok(())
    }

    /// Stops tracking the request a now expired reply caller was waiting for.
    pub fn unregister_after_reply_caller_expired(
        &self,
        request_reply_id: Option<&str>,
    ) -> Result<(), TrackerError> {
        let request_reply_id = request_reply_id.ok_or(TrackerError::IllegalState(
            "request reply id must not be missing",
        ))?;

        if let Some((_, message_id)) = self.reply_callers.remove(request_reply_id) {
            self.remove(&message_id);
        }
        Ok(())
    }

    pub fn number_of_registered_messages(&self) -> usize {
        self.registered.len()
    }

    fn remove(&self, message_id: &str) {
        if self.registered.remove(message_id).is_some() {
            trace!(
                event = events::TRACKER_UNREGISTER,
                component = COMPONENT,
                msg_id = message_id,
                "message no longer tracked"
            );
            if self.registered.is_empty() {
                self.drained.notify_waiters();
            }
        }
    }

    fn clear(&self) {
        self.registered.clear();
        self.reply_callers.clear();
    }

    async fn wait_until_drained(&self) -> bool {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.registered.is_empty() {
                return true;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl PrepareForShutdownListener for MessageTracker {
    async fn prepare_for_shutdown(&self) {
        self.accepting.store(false, Ordering::Release);
        info!(
            event = events::SHUTDOWN_PREPARE,
            component = COMPONENT,
            pending = self.number_of_registered_messages(),
            "no longer accepting messages for tracking"
        );
    }

    fn is_message_tracker(&self) -> bool {
        true
    }
}

#[async_trait]
impl ShutdownListener for MessageTracker {
    async fn shutdown(&self) {
        self.accepting.store(false, Ordering::Release);

        match tokio::time::timeout(self.shutdown_max_timeout, self.wait_until_drained()).await {
            Ok(_) => info!(
                event = events::TRACKER_SHUTDOWN_DRAINED,
                component = COMPONENT,
                "all tracked messages completed"
            ),
            Err(_) => {
                let pending: Vec<String> = self
                    .registered
                    .iter()
                    .map(|message_id| message_id.key().clone())
                    .collect();
                warn!(
                    event = events::TRACKER_SHUTDOWN_TIMEOUT,
                    component = COMPONENT,
                    pending = pending.len(),
                    msg_ids = ?pending,
                    timeout_ms = self.shutdown_max_timeout.as_millis() as u64,
                    "tracked messages still pending at shutdown"
                );
            }
        }
        self.clear();
    }

    fn is_message_tracker(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::MessageTracker;
    use crate::error::TrackerError;
    use crate::message::{MessageBuilder, MessageType, CUSTOM_HEADER_REQUEST_REPLY_ID};
    use crate::tracking::shutdown::{PrepareForShutdownListener, ShutdownListener};
    use std::sync::Arc;
    use std::time::Duration;

    const MESSAGE_ID: &str = "messageId123";

    fn tracker() -> MessageTracker {
        MessageTracker::new(Duration::from_millis(50))
    }

    fn one_way() -> crate::message::ImmutableMessage {
        MessageBuilder::new(MessageType::OneWay).id(MESSAGE_ID).build()
    }

    #[test]
    fn missing_arguments_are_illegal_state() {
        let tracker = tracker();
        let without_id = MessageBuilder::new(MessageType::OneWay).without_id().build();

        assert!(matches!(tracker.register(None), Err(TrackerError::IllegalState(_))));
        assert!(matches!(tracker.unregister(None), Err(TrackerError::IllegalState(_))));
        assert!(matches!(
            tracker.unregister_after_reply_caller_expired(None),
            Err(TrackerError::IllegalState(_))
        ));
        assert!(matches!(
            tracker.register(Some(&without_id)),
            Err(TrackerError::IllegalState(_))
        ));
        assert!(matches!(
            tracker.unregister(Some(&without_id)),
            Err(TrackerError::IllegalState(_))
        ));
    }

    #[test]
    fn untracked_types_are_ignored() {
        let tracker = tracker();
        let reply = MessageBuilder::new(MessageType::SubscriptionReply)
            .id(MESSAGE_ID)
            .build();

        tracker.register(Some(&reply)).expect("register");
        assert_eq!(tracker.number_of_registered_messages(), 0);

        tracker.register(Some(&one_way())).expect("register");
        tracker.unregister(Some(&reply)).expect("unregister");
        assert_eq!(tracker.number_of_registered_messages(), 1);
    }

    #[test]
    fn registration_is_idempotent() {
        let tracker = tracker();
        tracker.register(Some(&one_way())).expect("register");
        tracker.register(Some(&one_way())).expect("register again");
        assert_eq!(tracker.number_of_registered_messages(), 1);

        tracker.unregister(Some(&one_way())).expect("unregister");
        tracker.unregister(Some(&one_way())).expect("unregister again");
        assert_eq!(tracker.number_of_registered_messages(), 0);
    }

    #[test]
    fn distinct_ids_are_counted() {
        let tracker = tracker();
        for i in 1..=3 {
            let message = MessageBuilder::new(MessageType::OneWay)
                .id(format!("{MESSAGE_ID}-{i}"))
                .build();
            tracker.register(Some(&message)).expect("register");
        }
        assert_eq!(tracker.number_of_registered_messages(), 3);
    }

    #[test]
    fn expired_reply_caller_releases_its_request() {
        let tracker = tracker();
        let request = MessageBuilder::new(MessageType::Request)
            .id(MESSAGE_ID)
            .custom_header(CUSTOM_HEADER_REQUEST_REPLY_ID, "requestReplyId")
            .build();

        tracker.register(Some(&request)).expect("register");
        assert_eq!(tracker.number_of_registered_messages(), 1);

        tracker
            .unregister_after_reply_caller_expired(Some("requestReplyId"))
            .expect("unregister");
        assert_eq!(tracker.number_of_registered_messages(), 0);
    }

    #[tokio::test]
    async fn prepare_for_shutdown_refuses_new_registrations() {
        let tracker = tracker();
        tracker.prepare_for_shutdown().await;

        tracker.register(Some(&one_way())).expect("refusal is not an error");
        assert_eq!(tracker.number_of_registered_messages(), 0);
    }

    #[tokio::test]
    async fn shutdown_waits_for_pending_messages() {
        let tracker = Arc::new(MessageTracker::new(Duration::from_secs(5)));
        tracker.register(Some(&one_way())).expect("register");

        let releaser = tracker.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            releaser.unregister(Some(&one_way())).expect("unregister");
        });

        tokio::time::timeout(Duration::from_secs(2), tracker.shutdown())
            .await
            .expect("shutdown completes once drained");
        assert_eq!(tracker.number_of_registered_messages(), 0);
    }

    #[tokio::test]
    async fn shutdown_gives_up_after_timeout() {
        let tracker = tracker();
        tracker.register(Some(&one_way())).expect("register");

        tracker.shutdown().await;
        assert_eq!(tracker.number_of_registered_messages(), 0);
    }
}
