// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # termbus - UDP media-transport driver core
//!
//! The buffer and registry engine of a media-transport driver: a background
//! process that terminates a UDP streaming protocol on behalf of client
//! processes, multiplexing many logical publication/subscription streams over
//! shared sockets and shared memory-mapped term buffers.
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                        Conductor (control plane)                    |
//! |   add/remove publication | add/remove connected subscription       |
//! +---------------------------------------------------------------------+
//! |                       TermBufferManager                             |
//! |   ChannelKey -> TermBufferSet registries | template-file init      |
//! +---------------------------------------------------------------------+
//! |                         TermBufferSet                               |
//! |   3x (log, state) rotation | mmap lifecycle | zeroed on creation   |
//! +---------------------------------------------------------------------+
//! |                 DriverSubscription / Connection map                 |
//! |   session_id -> Connection lookup on the datagram receive path     |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Threading model
//!
//! A single conductor thread owns the [`TermBufferManager`] and performs all
//! buffer allocation and registry mutation (`&mut self` API). Receive threads
//! only look up connections through [`DriverSubscription`] and write into
//! already-mapped buffer memory. Registration of a connection is the single
//! publication point: a [`TermBufferSet`] is fully allocated before its
//! connection becomes visible to any receive-path lookup.
//!
//! ## Out of scope
//!
//! Socket I/O, datagram framing, the wire header layout, flow control and
//! retransmission live outside this crate. Collaborators hand the core a
//! (destination, session, channel) triple and ask for a buffer to use.

/// Protocol and filesystem-layout constants (single source of truth).
pub mod config;
/// Channel addressing: UDP destinations and composite channel keys.
pub mod destination;
/// Term buffer lifecycle: mapped files, rotation sets, the buffer manager.
pub mod buffer;
/// Receive-path registries: subscriptions and per-session connections.
pub mod driver;

pub use buffer::{BufferError, BufferPair, TermBufferManager, TermBufferSet};
pub use destination::{ChannelKey, DestinationError, UdpDestination};
pub use driver::{Connection, DriverConductorProxy, DriverSubscription};
