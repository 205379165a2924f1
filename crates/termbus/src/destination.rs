// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Channel addressing for the media driver.
//!
//! A channel is identified by a UDP destination URI (`udp://host:port`).
//! Within a destination, traffic is multiplexed by a 64-bit session id (one
//! logical sender) and a 64-bit channel/stream id (one logical data flow).
//! [`ChannelKey`] bundles all three into the composite key every registry in
//! the driver is indexed by.

use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};

/// Errors raised while parsing or resolving a destination URI.
#[derive(Debug)]
pub enum DestinationError {
    /// URI is not of the form `udp://host:port`
    InvalidUri(String),

    /// Host:port did not resolve to any socket address
    Unresolvable(String),
}

impl fmt::Display for DestinationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUri(uri) => write!(f, "Invalid destination URI: {uri}"),
            Self::Unresolvable(uri) => write!(f, "Destination did not resolve: {uri}"),
        }
    }
}

impl std::error::Error for DestinationError {}

/// Resolved UDP endpoint for a channel.
///
/// Parsed once on the control plane; equality and hashing cover both the
/// resolved address and the canonical URI so two keys match only when the
/// client addressed the channel the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UdpDestination {
    remote: SocketAddr,
    canonical_uri: String,
}

impl UdpDestination {
    /// Parse and resolve a `udp://host:port` URI.
    ///
    /// Resolution happens here, on the control plane, so the receive path
    /// never performs a DNS lookup.
    ///
    /// # Errors
    ///
    /// [`DestinationError::InvalidUri`] when the scheme or host:port part is
    /// malformed, [`DestinationError::Unresolvable`] when the name does not
    /// resolve.
    pub fn parse(uri: &str) -> Result<Self, DestinationError> {
        let host_port = uri
            .strip_prefix("udp://")
            .ok_or_else(|| DestinationError::InvalidUri(uri.to_string()))?;

        if host_port.is_empty() || !host_port.contains(':') {
            return Err(DestinationError::InvalidUri(uri.to_string()));
        }

        let remote = host_port
            .to_socket_addrs()
            .map_err(|_| DestinationError::InvalidUri(uri.to_string()))?
            .next()
            .ok_or_else(|| DestinationError::Unresolvable(uri.to_string()))?;

        Ok(Self {
            remote,
            canonical_uri: format!("udp://{host_port}"),
        })
    }

    /// Resolved remote endpoint for this destination.
    #[inline]
    #[must_use]
    pub fn remote(&self) -> SocketAddr {
        self.remote
    }

    /// Canonical URI as the client addressed it.
    ///
    /// This string (not the resolved address) feeds the filesystem mapping
    /// convention, so buffer locations stay stable across re-resolution.
    #[inline]
    #[must_use]
    pub fn client_aware_uri(&self) -> &str {
        &self.canonical_uri
    }
}

impl fmt::Display for UdpDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_uri)
    }
}

/// Composite key for all per-channel driver state.
///
/// (destination, session, channel) - immutable, hashed across all three
/// fields. Session and channel ids stay primitive `u64`s so hot-path lookups
/// allocate nothing.
///
/// # Performance
/// HOT PATH: one registry lookup per inbound datagram is keyed by this.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelKey {
    destination: UdpDestination,
    session_id: u64,
    channel_id: u64,
}

impl ChannelKey {
    #[must_use]
    pub fn new(destination: UdpDestination, session_id: u64, channel_id: u64) -> Self {
        Self {
            destination,
            session_id,
            channel_id,
        }
    }

    #[inline]
    #[must_use]
    pub fn destination(&self) -> &UdpDestination {
        &self.destination
    }

    #[inline]
    #[must_use]
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    #[inline]
    #[must_use]
    pub fn channel_id(&self) -> u64 {
        self.channel_id
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sessionId={} channelId={}",
            self.destination, self.session_id, self.channel_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_valid_uri() {
        let dest = UdpDestination::parse("udp://127.0.0.1:4321").expect("parse failed");
        assert_eq!(dest.remote().port(), 4321);
        assert_eq!(dest.client_aware_uri(), "udp://127.0.0.1:4321");
    }

    #[test]
    fn test_parse_resolves_localhost() {
        let dest = UdpDestination::parse("udp://localhost:4321").expect("parse failed");
        assert!(dest.remote().ip().is_loopback());
        assert_eq!(dest.client_aware_uri(), "udp://localhost:4321");
    }

    #[test]
    fn test_parse_rejects_wrong_scheme() {
        assert!(matches!(
            UdpDestination::parse("tcp://localhost:4321"),
            Err(DestinationError::InvalidUri(_))
        ));
    }

    #[test]
    fn test_parse_rejects_missing_port() {
        assert!(UdpDestination::parse("udp://localhost").is_err());
        assert!(UdpDestination::parse("udp://").is_err());
    }

    #[test]
    fn test_channel_key_equality_covers_all_fields() {
        let dest = UdpDestination::parse("udp://127.0.0.1:4321").unwrap();
        let key = ChannelKey::new(dest.clone(), 100, 100);

        assert_eq!(key, ChannelKey::new(dest.clone(), 100, 100));
        assert_ne!(key, ChannelKey::new(dest.clone(), 101, 100));
        assert_ne!(key, ChannelKey::new(dest.clone(), 100, 101));

        let other = UdpDestination::parse("udp://127.0.0.1:4322").unwrap();
        assert_ne!(key, ChannelKey::new(other, 100, 100));
    }

    #[test]
    fn test_channel_key_as_map_key() {
        let dest = UdpDestination::parse("udp://127.0.0.1:4321").unwrap();
        let mut map = HashMap::new();
        map.insert(ChannelKey::new(dest.clone(), 1, 2), "buffers");

        assert_eq!(map.get(&ChannelKey::new(dest.clone(), 1, 2)), Some(&"buffers"));
        assert_eq!(map.get(&ChannelKey::new(dest, 2, 1)), None);
    }
}
