//! Support for Firmware File System as described in the UEFI Platform
//! Initialization Specification.
//!
//! This crate walks firmware volume, file and section byte ranges in place. It never allocates and every size or
//! offset read from the image is range checked before it is used, so it is safe to point it at a truncated or
//! corrupt volume. With the `alloc` feature it also provides a small composer for building volume images.
//!
//! Addresses reported by the views are `base_address + offset`, where the base address is supplied by the caller.
//! Images can therefore be inspected at the address they will be executed from without being mapped there.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(not(test), no_std)]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

pub mod apriori;
pub mod err;
pub mod file;
pub mod section;
pub mod volume;

#[cfg(any(test, feature = "alloc"))]
pub mod compose;

pub use err::FirmwareFileSystemError;
pub use file::{FileInfo, FileRef};
pub use section::SectionRef;
pub use volume::VolumeRef;

/// A specialized [`Result`](core::result::Result) type for volume traversal.
pub type Result<T> = core::result::Result<T, FirmwareFileSystemError>;
