// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Term buffer registry and factory.
//!
//! [`TermBufferManager`] owns the publication-side and subscription-side
//! registries mapping [`ChannelKey`] to [`TermBufferSet`], plus the two
//! template files every new segment is initialized from.
//!
//! All methods take `&mut self`: the conductor thread is the single writer
//! of these registries and the only caller that may block on the
//! filesystem. The receive path never touches the manager; it reaches
//! already-registered buffers through its connection.

use super::mapped::TemplateFile;
use super::paths::FileMappingConvention;
use super::term::TermBufferSet;
use super::{BufferError, Result};
use crate::config::{
    is_valid_term_buffer_size, LOG_TEMPLATE_NAME, STATE_BUFFER_LENGTH, STATE_TEMPLATE_NAME,
};
use crate::destination::ChannelKey;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

/// Creates, looks up, and destroys term buffer sets for both traffic sides.
pub struct TermBufferManager {
    convention: FileMappingConvention,
    log_template: TemplateFile,
    state_template: TemplateFile,
    term_buffer_size: usize,
    publications: HashMap<ChannelKey, TermBufferSet>,
    subscriptions: HashMap<ChannelKey, TermBufferSet>,
}

impl TermBufferManager {
    /// Validate the data directory, create the buffer roots and the two
    /// zero-filled template files.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidTermSize`] for a non-power-of-two size,
    /// [`BufferError::DataDirectory`] when the data directory is missing,
    /// [`BufferError::Create`] when roots or templates cannot be created.
    pub fn new(data_dir: &Path, term_buffer_size: usize) -> Result<Self> {
        if !is_valid_term_buffer_size(term_buffer_size) {
            return Err(BufferError::InvalidTermSize(term_buffer_size));
        }

        let convention = FileMappingConvention::new(data_dir)?;
        let log_template = TemplateFile::create(data_dir, LOG_TEMPLATE_NAME, term_buffer_size)?;
        let state_template =
            TemplateFile::create(data_dir, STATE_TEMPLATE_NAME, STATE_BUFFER_LENGTH)?;

        log::info!(
            "[BUFFER] manager ready data_dir={} term_size={}",
            data_dir.display(),
            term_buffer_size
        );

        Ok(Self {
            convention,
            log_template,
            state_template,
            term_buffer_size,
            publications: HashMap::new(),
            subscriptions: HashMap::new(),
        })
    }

    /// Configured log segment size in bytes.
    #[inline]
    #[must_use]
    pub fn term_buffer_size(&self) -> usize {
        self.term_buffer_size
    }

    /// Return the publication-side buffer set for `key`, allocating and
    /// registering it on first request.
    ///
    /// Idempotent: a second call with the same key returns the existing set
    /// without re-allocation.
    pub fn add_publication(&mut self, key: ChannelKey) -> Result<&TermBufferSet> {
        Self::add(
            &mut self.publications,
            self.convention.publications_dir(),
            self.term_buffer_size,
            &mut self.log_template,
            &mut self.state_template,
            key,
        )
    }

    /// Remove and close the publication-side buffer set for `key`.
    ///
    /// # Errors
    ///
    /// [`BufferError::UnknownChannel`] when the key was never added; a
    /// silent no-op here would hide a control-plane bookkeeping bug.
    pub fn remove_publication(&mut self, key: &ChannelKey) -> Result<()> {
        Self::remove(&mut self.publications, key)
    }

    /// Subscription-side counterpart of [`Self::add_publication`].
    pub fn add_connected_subscription(&mut self, key: ChannelKey) -> Result<&TermBufferSet> {
        Self::add(
            &mut self.subscriptions,
            self.convention.subscriptions_dir(),
            self.term_buffer_size,
            &mut self.log_template,
            &mut self.state_template,
            key,
        )
    }

    /// Subscription-side counterpart of [`Self::remove_publication`].
    ///
    /// Callers must quiesce the connection registry entry for this key
    /// before removal; no receive thread may still hold the buffers.
    pub fn remove_connected_subscription(&mut self, key: &ChannelKey) -> Result<()> {
        Self::remove(&mut self.subscriptions, key)
    }

    fn add<'a>(
        registry: &'a mut HashMap<ChannelKey, TermBufferSet>,
        root: &Path,
        term_buffer_size: usize,
        log_template: &mut TemplateFile,
        state_template: &mut TemplateFile,
        key: ChannelKey,
    ) -> Result<&'a TermBufferSet> {
        match registry.entry(key) {
            Entry::Occupied(entry) => {
                log::debug!("[BUFFER] add skip (exists) key={}", entry.key());
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let dir = FileMappingConvention::channel_location(root, entry.key());
                let set =
                    TermBufferSet::allocate(dir, term_buffer_size, log_template, state_template)?;
                log::debug!("[BUFFER] add registered key={}", entry.key());
                Ok(entry.insert(set))
            }
        }
    }

    fn remove(registry: &mut HashMap<ChannelKey, TermBufferSet>, key: &ChannelKey) -> Result<()> {
        // close() runs only on an entry actually found, guarding double-close.
        let set = registry
            .remove(key)
            .ok_or_else(|| BufferError::unknown_channel(key))?;
        log::debug!("[BUFFER] remove key={}", key);
        set.close()
    }

    /// Release the templates and every remaining buffer set.
    ///
    /// Every set is attempted even after a failure; failures are collected
    /// into one [`BufferError::Shutdown`]. The template files are removed
    /// from the filesystem when the manager is dropped at the end of this
    /// call.
    pub fn close(mut self) -> Result<()> {
        let mut failures = Vec::new();

        for (key, set) in self.publications.drain() {
            if let Err(e) = set.close() {
                log::debug!("[BUFFER] close failure (publication) key={} err={}", key, e);
                failures.push(e);
            }
        }
        for (key, set) in self.subscriptions.drain() {
            if let Err(e) = set.close() {
                log::debug!("[BUFFER] close failure (subscription) key={} err={}", key, e);
                failures.push(e);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(BufferError::Shutdown(failures))
        }
    }
}
