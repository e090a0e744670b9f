//! PE/COFF and Terse Executable (TE) header layouts.
//!
//! Only the fields needed to locate an entry point and the image span are modeled.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use scroll::{Pread, Pwrite, SizeWith};

/// "MZ"
pub const DOS_SIGNATURE: u16 = 0x5A4D;
/// "VZ"
pub const TE_SIGNATURE: u16 = 0x5A56;
/// "PE\0\0"
pub const NT_SIGNATURE: u32 = 0x0000_4550;
/// Optional header magic of a 32-bit image.
pub const NT_OPTIONAL_HDR32_MAGIC: u16 = 0x10B;
/// Optional header magic of a 64-bit image.
pub const NT_OPTIONAL_HDR64_MAGIC: u16 = 0x20B;

/// Offset of `e_lfanew` within the DOS header.
pub const DOS_LFANEW_OFFSET: usize = 0x3C;
/// Size of [TeHeader].
pub const TE_HEADER_SIZE: usize = 40;
/// Size of [FileHeader].
pub const FILE_HEADER_SIZE: usize = 20;

/// EFI_IMAGE_DATA_DIRECTORY
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pread, Pwrite, SizeWith)]
pub struct DataDirectory {
    pub virtual_address: u32,
    pub size: u32,
}

/// EFI_TE_IMAGE_HEADER
///
/// A TE image is a PE32 image whose DOS, NT and optional headers were replaced by this header.
/// `stripped_size` counts the removed bytes, so addresses in the image are relative to a base that lies
/// `stripped_size - TE_HEADER_SIZE` bytes before the TE header.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pread, Pwrite, SizeWith)]
pub struct TeHeader {
    pub signature: u16,
    pub machine: u16,
    pub number_of_sections: u8,
    pub subsystem: u8,
    pub stripped_size: u16,
    pub address_of_entry_point: u32,
    pub base_of_code: u32,
    pub image_base: u64,
    pub relocation_directory: DataDirectory,
    pub debug_directory: DataDirectory,
}

/// EFI_IMAGE_FILE_HEADER
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pread, Pwrite, SizeWith)]
pub struct FileHeader {
    pub machine: u16,
    pub number_of_sections: u16,
    pub time_date_stamp: u32,
    pub pointer_to_symbol_table: u32,
    pub number_of_symbols: u32,
    pub size_of_optional_header: u16,
    pub characteristics: u16,
}

/// Leading part of EFI_IMAGE_OPTIONAL_HEADER32, through `dll_characteristics`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pread, Pwrite, SizeWith)]
pub struct OptionalHeader32 {
    pub magic: u16,
    pub major_linker_version: u8,
    pub minor_linker_version: u8,
    pub size_of_code: u32,
    pub size_of_initialized_data: u32,
    pub size_of_uninitialized_data: u32,
    pub address_of_entry_point: u32,
    pub base_of_code: u32,
    pub base_of_data: u32,
    pub image_base: u32,
    pub section_alignment: u32,
    pub file_alignment: u32,
    pub major_operating_system_version: u16,
    pub minor_operating_system_version: u16,
    pub major_image_version: u16,
    pub minor_image_version: u16,
    pub major_subsystem_version: u16,
    pub minor_subsystem_version: u16,
    pub win32_version_value: u32,
    pub size_of_image: u32,
    pub size_of_headers: u32,
    pub check_sum: u32,
    pub subsystem: u16,
    pub dll_characteristics: u16,
}
