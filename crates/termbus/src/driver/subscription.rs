// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-stream subscription state for receiver processing.
//!
//! Shared between the conductor thread (connection insertion, close) and
//! receive threads (session lookup). Uses `DashMap` so registering a
//! connection is safely published to receive-path lookups without a
//! registry-wide lock.

use super::connection::Connection;
use crate::destination::UdpDestination;
use dashmap::DashMap;
use std::sync::Arc;

/// Conductor-side notification seam.
///
/// A subscription does not own its registration in the conductor's tables;
/// closing it only tells the conductor to drop the entry.
pub trait DriverConductorProxy: Send + Sync {
    /// Called when a subscription closes and should leave the conductor's
    /// registry.
    fn remove_subscription(&self, channel: &UdpDestination, stream_id: u64);
}

/// Connections maintained per (destination, stream) pair.
///
/// Owns no socket resources; it only aggregates connections so the receive
/// path can route an inbound session to its reassembly state.
pub struct DriverSubscription {
    channel: UdpDestination,
    stream_id: u64,
    conductor_proxy: Arc<dyn DriverConductorProxy>,
    connection_by_session_id: DashMap<u64, Arc<dyn Connection>>,
}

impl DriverSubscription {
    #[must_use]
    pub fn new(
        channel: UdpDestination,
        stream_id: u64,
        conductor_proxy: Arc<dyn DriverConductorProxy>,
    ) -> Self {
        Self {
            channel,
            stream_id,
            conductor_proxy,
            connection_by_session_id: DashMap::new(),
        }
    }

    /// Look up the connection for an inbound session.
    ///
    /// Returns `None` for an unknown session; the caller decides whether
    /// that datagram starts discovery or is dropped.
    ///
    /// # Performance
    /// HOT PATH: called once per inbound datagram.
    #[inline]
    #[must_use]
    pub fn get_connection(&self, session_id: u64) -> Option<Arc<dyn Connection>> {
        self.connection_by_session_id
            .get(&session_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Register a connection under its own session id.
    ///
    /// Returns the previously registered connection for that session, if
    /// any; callers use this to detect a duplicate-session race.
    pub fn put_connection(&self, connection: Arc<dyn Connection>) -> Option<Arc<dyn Connection>> {
        let session_id = connection.session_id();
        let previous = self
            .connection_by_session_id
            .insert(session_id, connection);
        log::debug!(
            "[DRIVER] put_connection channel={} streamId={} sessionId={} replaced={}",
            self.channel,
            self.stream_id,
            session_id,
            previous.is_some()
        );
        previous
    }

    /// Snapshot of all live connections, order unspecified.
    ///
    /// Used by the receiver for read-polling; the snapshot is decoupled
    /// from concurrent inserts.
    #[must_use]
    pub fn connections(&self) -> Vec<Arc<dyn Connection>> {
        self.connection_by_session_id
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Number of live connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connection_by_session_id.len()
    }

    #[inline]
    #[must_use]
    pub fn stream_id(&self) -> u64 {
        self.stream_id
    }

    #[inline]
    #[must_use]
    pub fn channel(&self) -> &UdpDestination {
        &self.channel
    }

    /// Ask the conductor to drop this subscription from its registry.
    ///
    /// Connection lifetime stays with the control plane and the manager's
    /// subscription-side registry; nothing is closed here.
    pub fn close(&self) {
        log::debug!(
            "[DRIVER] subscription close channel={} streamId={}",
            self.channel,
            self.stream_id
        );
        self.conductor_proxy
            .remove_subscription(&self.channel, self.stream_id);
    }
}
