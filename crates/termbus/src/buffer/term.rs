// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Rotating term buffer sets.
//!
//! One [`TermBufferSet`] per channel key: a fixed count of (log, state)
//! mapped pairs so a writer can fill one term while a reader drains another
//! and the third is cleaned for reuse. The set owns the mapping lifecycle
//! for all of its segments; rotation order semantics live with the log
//! writer, not here.

use super::mapped::{MappedFile, TemplateFile};
use super::{BufferError, Result};
use crate::config::{STATE_BUFFER_LENGTH, TERM_BUFFER_ROTATION_COUNT};
use std::fs;
use std::path::{Path, PathBuf};

/// One rotation slot: a log segment and its state/metadata companion.
pub struct BufferPair {
    log: MappedFile,
    state: MappedFile,
}

impl BufferPair {
    #[inline]
    #[must_use]
    pub fn log(&self) -> &MappedFile {
        &self.log
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &MappedFile {
        &self.state
    }
}

/// The full buffer rotation for one channel key.
///
/// Created exactly once per key by the manager and held by exactly one
/// registry entry; never constructed on the receive path.
pub struct TermBufferSet {
    dir: PathBuf,
    pairs: Vec<BufferPair>,
}

impl TermBufferSet {
    /// Allocate all rotation slots for a channel.
    ///
    /// Creates the channel directory, then for each slot creates a log file
    /// of `term_buffer_size` bytes and a state file of
    /// [`STATE_BUFFER_LENGTH`] bytes, each initialized by bulk copy from its
    /// template and mapped read/write. On success every segment is zeroed
    /// and sized exactly.
    ///
    /// # Errors
    ///
    /// Any create or map failure aborts the allocation; already-mapped
    /// segments are released by drop.
    pub fn allocate(
        dir: PathBuf,
        term_buffer_size: usize,
        log_template: &mut TemplateFile,
        state_template: &mut TemplateFile,
    ) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(BufferError::Create)?;

        let mut pairs = Vec::with_capacity(TERM_BUFFER_ROTATION_COUNT);
        for slot in 0..TERM_BUFFER_ROTATION_COUNT {
            let log = MappedFile::create(
                &dir.join(format!("log-{slot}")),
                term_buffer_size,
                log_template,
            )?;
            let state = MappedFile::create(
                &dir.join(format!("state-{slot}")),
                STATE_BUFFER_LENGTH,
                state_template,
            )?;
            pairs.push(BufferPair { log, state });
        }

        log::debug!(
            "[BUFFER] allocated term buffer set dir={} slots={} term_size={}",
            dir.display(),
            TERM_BUFFER_ROTATION_COUNT,
            term_buffer_size
        );

        Ok(Self { dir, pairs })
    }

    /// All (log, state) pairs, rotation order unspecified.
    #[must_use]
    pub fn pairs(&self) -> &[BufferPair] {
        &self.pairs
    }

    /// Directory holding this set's backing files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Unmap every segment, attempting all of them before reporting.
    ///
    /// # Errors
    ///
    /// [`BufferError::Shutdown`] wrapping every unmap failure; releasing
    /// must try each region even after one fails.
    pub fn close(mut self) -> Result<()> {
        let mut failures = Vec::new();

        for pair in &mut self.pairs {
            if let Err(e) = pair.log.unmap() {
                failures.push(e);
            }
            if let Err(e) = pair.state.unmap() {
                failures.push(e);
            }
        }

        log::debug!(
            "[BUFFER] closed term buffer set dir={} failures={}",
            self.dir.display(),
            failures.len()
        );

        if failures.is_empty() {
            Ok(())
        } else {
            Err(BufferError::Shutdown(failures))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TERM_SIZE: usize = 65536;

    fn templates(dir: &Path) -> (TemplateFile, TemplateFile) {
        let log = TemplateFile::create(dir, "log.template", TERM_SIZE).unwrap();
        let state = TemplateFile::create(dir, "state.template", STATE_BUFFER_LENGTH).unwrap();
        (log, state)
    }

    #[test]
    fn test_allocates_full_rotation() {
        let dir = TempDir::new().unwrap();
        let (mut log_tpl, mut state_tpl) = templates(dir.path());

        let set = TermBufferSet::allocate(
            dir.path().join("chan"),
            TERM_SIZE,
            &mut log_tpl,
            &mut state_tpl,
        )
        .unwrap();

        assert_eq!(set.pairs().len(), TERM_BUFFER_ROTATION_COUNT);
        set.close().unwrap();
    }

    #[test]
    fn test_segments_are_sized_and_zeroed() {
        let dir = TempDir::new().unwrap();
        let (mut log_tpl, mut state_tpl) = templates(dir.path());

        let set = TermBufferSet::allocate(
            dir.path().join("chan"),
            TERM_SIZE,
            &mut log_tpl,
            &mut state_tpl,
        )
        .unwrap();

        for pair in set.pairs() {
            let log = pair.log().as_slice();
            assert_eq!(log.len(), TERM_SIZE);
            assert_eq!(log[0], 0);
            assert_eq!(log[TERM_SIZE - 1], 0);

            let state = pair.state().as_slice();
            assert_eq!(state.len(), STATE_BUFFER_LENGTH);
            assert_eq!(state[0], 0);
            assert_eq!(state[STATE_BUFFER_LENGTH - 1], 0);
        }

        set.close().unwrap();
    }

    #[test]
    fn test_backing_files_land_in_channel_dir() {
        let dir = TempDir::new().unwrap();
        let (mut log_tpl, mut state_tpl) = templates(dir.path());
        let chan_dir = dir.path().join("chan");

        let set =
            TermBufferSet::allocate(chan_dir.clone(), TERM_SIZE, &mut log_tpl, &mut state_tpl)
                .unwrap();

        for slot in 0..TERM_BUFFER_ROTATION_COUNT {
            assert!(chan_dir.join(format!("log-{slot}")).is_file());
            assert!(chan_dir.join(format!("state-{slot}")).is_file());
        }

        set.close().unwrap();
    }
}
