// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Receive-path registries.
//!
//! A [`DriverSubscription`] groups the connections discovered on one
//! (destination, stream) pair. The conductor thread inserts connections as
//! peers are discovered; receive threads look them up by session id, one
//! lookup per inbound datagram.

mod connection;
mod subscription;

pub use connection::Connection;
pub use subscription::{DriverConductorProxy, DriverSubscription};
