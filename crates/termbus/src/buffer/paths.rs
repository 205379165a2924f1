// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Filesystem mapping convention for term buffer files.
//!
//! Layout under the driver data directory:
//!
//! ```text
//! <data_dir>/
//!   log.template
//!   state.template
//!   publications/<uri>/<session_id>/<channel_id>/{log,state}-{0,1,2}
//!   subscriptions/<uri>/<session_id>/<channel_id>/{log,state}-{0,1,2}
//! ```
//!
//! The `<uri>` component is the client-aware destination URI with every
//! character outside `[A-Za-z0-9._-]` mapped to `_`, keeping the path
//! deterministic and portable.

use super::{BufferError, Result};
use crate::config::{PUBLICATIONS_DIR, SUBSCRIPTIONS_DIR};
use crate::destination::ChannelKey;
use std::fs;
use std::path::{Path, PathBuf};

/// Validated root directories for publication and subscription buffers.
pub struct FileMappingConvention {
    publications_dir: PathBuf,
    subscriptions_dir: PathBuf,
}

impl FileMappingConvention {
    /// Validate the data directory and create the two buffer roots.
    ///
    /// # Errors
    ///
    /// [`BufferError::DataDirectory`] when `data_dir` is missing or not a
    /// directory (fail fast: the driver cannot run without its data dir),
    /// [`BufferError::Create`] when a root cannot be created.
    pub fn new(data_dir: &Path) -> Result<Self> {
        if !data_dir.is_dir() {
            return Err(BufferError::DataDirectory(data_dir.to_path_buf()));
        }

        let publications_dir = data_dir.join(PUBLICATIONS_DIR);
        let subscriptions_dir = data_dir.join(SUBSCRIPTIONS_DIR);
        fs::create_dir_all(&publications_dir).map_err(BufferError::Create)?;
        fs::create_dir_all(&subscriptions_dir).map_err(BufferError::Create)?;

        Ok(Self {
            publications_dir,
            subscriptions_dir,
        })
    }

    #[must_use]
    pub fn publications_dir(&self) -> &Path {
        &self.publications_dir
    }

    #[must_use]
    pub fn subscriptions_dir(&self) -> &Path {
        &self.subscriptions_dir
    }

    /// Directory holding the buffer files for one channel key under `root`.
    ///
    /// Pure path computation; creation happens at allocation time.
    #[must_use]
    pub fn channel_location(root: &Path, key: &ChannelKey) -> PathBuf {
        root.join(sanitize_uri(key.destination().client_aware_uri()))
            .join(key.session_id().to_string())
            .join(key.channel_id().to_string())
    }
}

/// Map a destination URI to a filesystem-safe directory name.
fn sanitize_uri(uri: &str) -> String {
    uri.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
