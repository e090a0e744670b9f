//! EFI_COMMON_SECTION_HEADER and the section type encodings.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use scroll::{Pread, Pwrite, SizeWith};

/// Size of the common section header.
pub const HEADER_SIZE: usize = 4;

/// EFI_COMMON_SECTION_HEADER
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pread, Pwrite, SizeWith)]
pub struct Header {
    pub size: [u8; 3],
    pub section_type: u8,
}

pub mod raw_type {
    pub const ALL: u8 = 0x00;
    pub const COMPRESSION: u8 = 0x01;
    pub const GUID_DEFINED: u8 = 0x02;
    pub const DISPOSABLE: u8 = 0x03;
    pub const PE32: u8 = 0x10;
    pub const PIC: u8 = 0x11;
    pub const TE: u8 = 0x12;
    pub const DXE_DEPEX: u8 = 0x13;
    pub const VERSION: u8 = 0x14;
    pub const USER_INTERFACE: u8 = 0x15;
    pub const FIRMWARE_VOLUME_IMAGE: u8 = 0x17;
    /// Carries the link-to-run displacement of position independent modules.
    pub const FREEFORM_SUBTYPE_GUID: u8 = 0x18;
    pub const RAW: u8 = 0x19;
    pub const PEI_DEPEX: u8 = 0x1B;
}
