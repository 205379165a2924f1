// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Connection seam for receiver-side reassembly state.

/// One discovered peer on a stream, identified by its session id.
///
/// The reassembly state behind a connection (term offsets, gap tracking)
/// belongs to the receiver; the registries here only need to retrieve a
/// connection by session id and enumerate the live set for polling.
pub trait Connection: Send + Sync {
    /// Session id of the sender this connection tracks.
    fn session_id(&self) -> u64;
}
