// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Term buffer lifecycle management.
//!
//! Every (destination, session, channel) tuple the driver carries gets a
//! rotating set of fixed-size memory-mapped log segments plus matching
//! state segments. This module owns that lifecycle end to end:
//!
//! 1. [`TermBufferManager`] validates the data directory and creates two
//!    zero-filled template files at construction
//! 2. `add_publication` / `add_connected_subscription` allocate a
//!    [`TermBufferSet`] on first request for a key (bulk-copied from the
//!    templates, then mapped) and register it
//! 3. The receive path writes into the mapped segments
//! 4. `remove_*` unmaps and closes the set; removing an unknown key is a
//!    bookkeeping bug upstream and reported as an error, never ignored
//!
//! # Threading
//!
//! Allocation involves blocking filesystem calls and therefore happens only
//! on the conductor thread. The manager API is `&mut self`; nothing here is
//! touched from the receive path.

mod manager;
mod mapped;
mod paths;
mod term;

pub use manager::TermBufferManager;
pub use mapped::{MappedFile, TemplateFile};
pub use paths::FileMappingConvention;
pub use term::{BufferPair, TermBufferSet};

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::destination::ChannelKey;

/// Errors that can occur in buffer lifecycle operations
#[derive(Debug)]
pub enum BufferError {
    /// Data directory is missing or not a directory
    DataDirectory(PathBuf),

    /// Configured term buffer size is not a power of two
    InvalidTermSize(usize),

    /// Backing file or directory creation failed
    Create(io::Error),

    /// Memory mapping failed
    Map(io::Error),

    /// Unmapping a region failed
    Unmap(io::Error),

    /// Remove requested for a key that was never added
    UnknownChannel {
        destination: String,
        session_id: u64,
        channel_id: u64,
    },

    /// One or more failures while releasing buffers during shutdown
    Shutdown(Vec<BufferError>),
}

impl BufferError {
    pub(crate) fn unknown_channel(key: &ChannelKey) -> Self {
        Self::UnknownChannel {
            destination: key.destination().client_aware_uri().to_string(),
            session_id: key.session_id(),
            channel_id: key.channel_id(),
        }
    }
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataDirectory(path) => {
                write!(f, "Data directory missing or not a directory: {}", path.display())
            }
            Self::InvalidTermSize(size) => {
                write!(f, "Invalid term buffer size: {size} (must be a power of 2)")
            }
            Self::Create(e) => write!(f, "Buffer file creation failed: {e}"),
            Self::Map(e) => write!(f, "Memory mapping failed: {e}"),
            Self::Unmap(e) => write!(f, "Unmapping failed: {e}"),
            Self::UnknownChannel {
                destination,
                session_id,
                channel_id,
            } => {
                write!(
                    f,
                    "No buffers for {destination}, sessionId = {session_id}, channelId = {channel_id}"
                )
            }
            Self::Shutdown(errors) => {
                write!(f, "{} failure(s) while releasing buffers:", errors.len())?;
                for e in errors {
                    write!(f, " [{e}]")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for BufferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Create(e) | Self::Map(e) | Self::Unmap(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for buffer operations
pub type Result<T> = std::result::Result<T, BufferError>;
