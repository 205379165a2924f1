// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! File-backed memory mappings and template files.
//!
//! Provides safe wrappers around `mmap`/`munmap` for the term buffer files.
//!
//! # Mapping Lifecycle
//!
//! 1. Manager creates a [`TemplateFile`] per segment kind at startup
//! 2. [`MappedFile::create`] makes a new backing file, bulk-copies the
//!    template into it (no per-byte zeroing on the allocation path), maps it
//! 3. Explicit `unmap()` on close surfaces OS failures to the caller
//! 4. Drop unmaps as a best-effort fallback

use super::{BufferError, Result};
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::ptr;

/// Zero-filled file used as the copy source for new buffer files.
///
/// Created once per segment kind and kept open for the owning manager's
/// lifetime. The file is removed from the filesystem on drop (best effort),
/// mirroring a delete-on-exit temp file.
pub struct TemplateFile {
    file: File,
    path: PathBuf,
    len: usize,
}

impl TemplateFile {
    /// Create a blank, zeroed file of exactly `len` bytes.
    ///
    /// `set_len` extends with zeros, so no explicit fill pass is needed.
    pub fn create(dir: &Path, name: &str, len: usize) -> Result<Self> {
        let path = dir.join(name);
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(BufferError::Create)?;
        file.set_len(len as u64).map_err(BufferError::Create)?;

        log::debug!("[BUFFER] template created path={} len={}", path.display(), len);

        Ok(Self { file, path, len })
    }

    /// Copy the full template into `dst`, leaving `dst` at exactly
    /// [`Self::len`] bytes of zeros.
    pub fn copy_to(&mut self, dst: &mut File) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        dst.seek(SeekFrom::Start(0))?;
        let copied = io::copy(&mut self.file.by_ref().take(self.len as u64), dst)?;
        if copied != self.len as u64 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("template truncated: copied {copied} of {} bytes", self.len),
            ));
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TemplateFile {
    fn drop(&mut self) {
        // Best-effort delete; the handle stays valid until drop completes.
        let _ = fs::remove_file(&self.path);
    }
}

/// File-backed read/write memory mapping of a fixed size.
///
/// Automatically unmapped on drop; `unmap()` is the checked path used by
/// close so OS failures reach the caller.
pub struct MappedFile {
    ptr: *mut u8,
    len: usize,
    path: PathBuf,
}

// SAFETY: MappedFile points to a file-backed shared mapping that may be
// written from a receive thread while the conductor owns the struct. All
// cross-thread coordination happens through the driver's registries; the
// raw region itself has no interior invariants beyond its length.
unsafe impl Send for MappedFile {}
unsafe impl Sync for MappedFile {}

impl MappedFile {
    /// Create a new backing file of `len` bytes, initialize it from
    /// `template`, and map it read/write.
    ///
    /// The template length must equal `len`; the result is a zeroed mapping
    /// whose capacity is exactly `len`.
    ///
    /// # Errors
    ///
    /// [`BufferError::Create`] when the file cannot be created or filled,
    /// [`BufferError::Map`] when the mapping fails.
    pub fn create(path: &Path, len: usize, template: &mut TemplateFile) -> Result<Self> {
        debug_assert_eq!(len, template.len());

        let mut file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(BufferError::Create)?;

        template.copy_to(&mut file).map_err(BufferError::Create)?;

        // SAFETY:
        // - First argument is null, letting the kernel choose the address
        // - len matches the file length established by the template copy
        // - PROT_READ | PROT_WRITE are valid flags for a read-write mapping
        // - MAP_SHARED makes writes visible through the file to other mappers
        // - file.as_raw_fd() is valid for the duration of the call
        // - mmap returns MAP_FAILED on error (checked below)
        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };

        // The mapping keeps its own reference; the fd can go away now.
        drop(file);

        if ptr == libc::MAP_FAILED {
            return Err(BufferError::Map(io::Error::last_os_error()));
        }

        Ok(Self {
            ptr: ptr.cast::<u8>(),
            len,
            path: path.to_path_buf(),
        })
    }

    /// Capacity of the mapping in bytes.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.len
    }

    /// Raw pointer to the mapped region.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr
    }

    /// View the mapping as a byte slice.
    ///
    /// # Panics
    ///
    /// Panics if the region has already been unmapped.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        assert!(!self.ptr.is_null(), "mapping already unmapped");
        // SAFETY:
        // - ptr came from a successful mmap of exactly len bytes
        // - the region stays mapped for the lifetime of &self (checked above)
        // - u8 has no alignment or validity requirements
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unmap the region, surfacing any OS failure.
    ///
    /// Idempotent: unmapping an already-unmapped buffer is a no-op.
    pub fn unmap(&mut self) -> Result<()> {
        if self.ptr.is_null() {
            return Ok(());
        }

        // SAFETY:
        // - self.ptr was obtained from a successful mmap in create()
        // - self.len is the exact size that was passed to mmap
        // - the null check above guarantees this region is still mapped
        let ret = unsafe { libc::munmap(self.ptr.cast::<libc::c_void>(), self.len) };
        self.ptr = ptr::null_mut();

        if ret < 0 {
            return Err(BufferError::Unmap(io::Error::last_os_error()));
        }
        Ok(())
    }
}

impl Drop for MappedFile {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            // SAFETY: same invariants as unmap(); errors cannot be surfaced
            // from Drop so the result is ignored.
            unsafe {
                libc::munmap(self.ptr.cast::<libc::c_void>(), self.len);
            }
        }
    }
}
