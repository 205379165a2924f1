// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! termbus global configuration - single source of truth.
//!
//! This module centralizes all buffer-layout and filesystem-convention
//! constants. **Never hardcode elsewhere!**

// =======================================================================
// Term buffer rotation
// =======================================================================

/// Number of (log, state) buffer pairs held per channel.
///
/// Three slots let a writer fill one term while a reader drains another and
/// the third is cleaned for reuse. The rotation count is a protocol constant;
/// every [`crate::TermBufferSet`] holds exactly this many pairs.
pub const TERM_BUFFER_ROTATION_COUNT: usize = 3;

/// CPU cache line size assumed for metadata layout (bytes).
pub const CACHE_LINE_LENGTH: usize = 64;

/// Size of the state/metadata segment paired with each log segment (bytes).
///
/// Fixed protocol constant: two cache lines, enough for the tail counter and
/// the high-water mark without false sharing between them.
pub const STATE_BUFFER_LENGTH: usize = 2 * CACHE_LINE_LENGTH;

/// Default log segment size when the driver is not configured (bytes).
///
/// Must satisfy [`is_valid_term_buffer_size`]. Tests typically use 64 KiB.
pub const DEFAULT_TERM_BUFFER_SIZE: usize = 16 * 1024 * 1024;

// =======================================================================
// Filesystem layout convention
// =======================================================================

/// Subdirectory of the data directory holding publication-side term buffers.
pub const PUBLICATIONS_DIR: &str = "publications";

/// Subdirectory of the data directory holding subscription-side term buffers.
pub const SUBSCRIPTIONS_DIR: &str = "subscriptions";

/// Name of the zero-filled template file used to initialize log segments.
pub const LOG_TEMPLATE_NAME: &str = "log.template";

/// Name of the zero-filled template file used to initialize state segments.
pub const STATE_TEMPLATE_NAME: &str = "state.template";

/// Check that a term buffer size is usable: non-zero and a power of two.
///
/// Power-of-two sizes keep offset arithmetic in the log segments mask-based.
#[must_use]
pub fn is_valid_term_buffer_size(size: usize) -> bool {
    size > 0 && size.is_power_of_two()
}
