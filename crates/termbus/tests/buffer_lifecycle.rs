// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end term buffer lifecycle tests
//!
//! Drives the public manager/subscription API the way the conductor and
//! receiver threads do: allocate buffers for a channel, route a session to
//! its connection, then tear everything down.

use std::sync::Arc;
use termbus::config::{STATE_BUFFER_LENGTH, TERM_BUFFER_ROTATION_COUNT};
use termbus::{
    BufferError, ChannelKey, Connection, DriverConductorProxy, DriverSubscription,
    TermBufferManager, UdpDestination,
};
use tempfile::TempDir;

const DESTINATION_URI: &str = "udp://localhost:4321";
const SESSION_ID: u64 = 100;
const CHANNEL_ID: u64 = 100;
const TERM_BUFFER_SIZE: usize = 65536;

fn channel_key() -> ChannelKey {
    let destination = UdpDestination::parse(DESTINATION_URI).expect("bad destination");
    ChannelKey::new(destination, SESSION_ID, CHANNEL_ID)
}

#[test]
fn publication_buffers_are_sized_zeroed_and_removable_once() {
    let data_dir = TempDir::new().expect("no temp dir");
    let mut manager =
        TermBufferManager::new(data_dir.path(), TERM_BUFFER_SIZE).expect("manager construction");

    let set = manager.add_publication(channel_key()).expect("add failed");
    assert_eq!(set.pairs().len(), TERM_BUFFER_ROTATION_COUNT);

    for pair in set.pairs() {
        let log = pair.log().as_slice();
        assert_eq!(log.len(), TERM_BUFFER_SIZE);
        assert_eq!(log[0], 0);
        assert_eq!(log[TERM_BUFFER_SIZE - 1], 0);

        let state = pair.state().as_slice();
        assert_eq!(state.len(), STATE_BUFFER_LENGTH);
        assert_eq!(state[0], 0);
        assert_eq!(state[STATE_BUFFER_LENGTH - 1], 0);
    }

    manager.remove_publication(&channel_key()).expect("remove failed");

    // The key is gone now: a second remove is a control-plane bug, not a no-op.
    assert!(matches!(
        manager.remove_publication(&channel_key()),
        Err(BufferError::UnknownChannel { .. })
    ));

    manager.close().expect("close failed");
}

#[test]
fn repeated_add_reuses_the_registered_set() {
    let data_dir = TempDir::new().expect("no temp dir");
    let mut manager =
        TermBufferManager::new(data_dir.path(), TERM_BUFFER_SIZE).expect("manager construction");

    let first = manager.add_publication(channel_key()).expect("first add").pairs()[0]
        .log()
        .as_ptr();
    let second = manager.add_publication(channel_key()).expect("second add").pairs()[0]
        .log()
        .as_ptr();
    assert_eq!(first, second);

    manager.close().expect("close failed");
}

struct PollingConnection {
    session_id: u64,
}

impl Connection for PollingConnection {
    fn session_id(&self) -> u64 {
        self.session_id
    }
}

struct NoopConductor;

impl DriverConductorProxy for NoopConductor {
    fn remove_subscription(&self, _channel: &UdpDestination, _stream_id: u64) {}
}

#[test]
fn receive_path_routes_sessions_over_subscription_buffers() {
    let data_dir = TempDir::new().expect("no temp dir");
    let mut manager =
        TermBufferManager::new(data_dir.path(), TERM_BUFFER_SIZE).expect("manager construction");

    // Conductor side: buffers first, then the connection becomes visible.
    manager
        .add_connected_subscription(channel_key())
        .expect("add subscription failed");

    let destination = UdpDestination::parse(DESTINATION_URI).expect("bad destination");
    let subscription = DriverSubscription::new(destination, CHANNEL_ID, Arc::new(NoopConductor));
    assert!(subscription
        .put_connection(Arc::new(PollingConnection {
            session_id: SESSION_ID,
        }))
        .is_none());

    // Receive side: one lookup per datagram, then poll the full set.
    let connection = subscription
        .get_connection(SESSION_ID)
        .expect("session not routed");
    assert_eq!(connection.session_id(), SESSION_ID);
    assert_eq!(subscription.connections().len(), 1);
    assert!(subscription.get_connection(SESSION_ID + 1).is_none());

    // Teardown in quiesce order: connection registry first, then buffers.
    subscription.close();
    manager
        .remove_connected_subscription(&channel_key())
        .expect("remove subscription failed");
    manager.close().expect("close failed");
}
