//! PEIM-to-PEIM Interface (PPI) descriptor encodings.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use r_efi::efi;

/// Descriptor flag bits.
pub mod descriptor_flags {
    /// The descriptor describes an interface, as opposed to a notification.
    pub const PPI: u32 = 1 << 0;
    /// The descriptor registers a notification.
    pub const NOTIFY: u32 = 1 << 1;
    /// Address fields are link-relative and must be displaced before use.
    pub const PIC: u32 = 1 << 2;
    /// Last descriptor of an install list.
    pub const TERMINATE_LIST: u32 = 1 << 3;

    pub const PPI_PIC: u32 = PPI | PIC;
}

/// A descriptor as a module lays it out in memory.
///
/// `ppi` is the opaque, pointer-sized interface value.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub flags: u32,
    pub guid: efi::Guid,
    pub ppi: usize,
}
