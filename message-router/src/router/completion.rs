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

//! Single-resolution completion handles for next-hop registration.

use crate::error::RoutingError;
use tokio::sync::watch;

type Outcome = Option<Result<(), RoutingError>>;

/// Resolver side. Consumed on resolution, so it settles at most once.
#[derive(Debug)]
pub struct Deferred {
    sender: watch::Sender<Outcome>,
}

/// Observer side. Clones observe the same outcome.
#[derive(Clone, Debug)]
pub struct NextHopCompletion {
    receiver: watch::Receiver<Outcome>,
}

/// Creates an unresolved completion and the resolver that settles it.
pub fn deferred() -> (Deferred, NextHopCompletion) {
    let (sender, receiver) = watch::channel(None);
    (Deferred { sender }, NextHopCompletion { receiver })
}

impl Deferred {
    pub fn resolve(self) {
        self.settle(Ok(()));
    }

    pub fn reject(self, error: RoutingError) {
        self.settle(Err(error));
    }

    fn settle(self, outcome: Result<(), RoutingError>) {
        self.sender.send_replace(Some(outcome));
    }
}

impl NextHopCompletion {
    /// Completion that is already settled with `outcome`.
    pub fn ready(outcome: Result<(), RoutingError>) -> Self {
        let (deferred, completion) = deferred();
        deferred.settle(outcome);
        completion
    }

    /// Outcome if already settled.
    pub fn try_outcome(&self) -> Option<Result<(), RoutingError>> {
        self.receiver.borrow().clone()
    }

    /// Waits for the outcome. Yields [`RoutingError::CompletionDropped`] when
    /// the resolver went away without settling.
    pub async fn wait(mut self) -> Result<(), RoutingError> {
        loop {
            if let Some(outcome) = self.receiver.borrow_and_update().clone() {
                return outcome;
            }
            if self.receiver.changed().await.is_err() {
                return self
                    .receiver
                    .borrow()
                    .clone()
                    .unwrap_or(Err(RoutingError::CompletionDropped));
            }
        }
    }
}
