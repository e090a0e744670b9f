//! Firmware File System (FFS) file and section definitions.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

pub mod file;
pub mod section;

/// Files start on 8-byte boundaries within a volume.
pub const FILE_ALIGNMENT: usize = 8;

/// Sections start on 4-byte boundaries within a file.
pub const SECTION_ALIGNMENT: usize = 4;
