//! Firmware Volume header definitions.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use scroll::{Pread, Pwrite, SizeWith};

/// "_FVH"
pub const SIGNATURE: u32 = u32::from_le_bytes(*b"_FVH");

/// Size of [Header] without the trailing block map.
pub const HEADER_SIZE: usize = 56;

/// Size of one [BlockMapEntry].
pub const BLOCK_MAP_ENTRY_SIZE: usize = 8;

/// EFI_FVB_ATTRIBUTES_2 bits the boot cores interpret.
pub mod attributes {
    pub const READ_STATUS: u32 = 0x0000_0004;
    pub const MEMORY_MAPPED: u32 = 0x0000_0200;
    /// Erased flash reads as 1s when set.
    pub const ERASE_POLARITY: u32 = 0x0000_0800;
}

/// EFI_FIRMWARE_VOLUME_HEADER, without the variable length block map.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pread, Pwrite, SizeWith)]
pub struct Header {
    pub zero_vector: [u8; 16],
    pub file_system_guid: [u8; 16],
    pub fv_length: u64,
    pub signature: u32,
    pub attributes: u32,
    pub header_length: u16,
    pub checksum: u16,
    pub ext_header_offset: u16,
    pub reserved: u8,
    pub revision: u8,
}

/// EFI_FV_BLOCK_MAP_ENTRY. A map is terminated by an all-zero entry.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pread, Pwrite, SizeWith)]
pub struct BlockMapEntry {
    pub num_blocks: u32,
    pub length: u32,
}
