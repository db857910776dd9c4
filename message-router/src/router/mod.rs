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

//! Message router layer.
//!
//! Turns resolved recipients into transport sends, falls back to the parent
//! router for unknown unicast recipients, and mirrors next-hop registrations to
//! the parent.

pub mod completion;
pub mod message_router;
pub mod parent;

pub use completion::{deferred, Deferred, NextHopCompletion};
pub use message_router::MessageRouter;
pub use parent::{ParentRouter, ParentRouterLink};
