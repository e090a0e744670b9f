//! EFI_FFS_FILE_HEADER and the file type and attribute encodings.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use scroll::{Pread, Pwrite, SizeWith};

/// Size of a standard (24-bit size) file header.
pub const HEADER_SIZE: usize = 24;

/// Value of `integrity_check_file` when the file data checksum is not in use.
pub const FFS_FIXED_CHECKSUM: u8 = 0xAA;

/// EFI_FFS_FILE_HEADER
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pread, Pwrite, SizeWith)]
pub struct Header {
    pub name: [u8; 16],
    pub integrity_check_header: u8,
    pub integrity_check_file: u8,
    pub file_type: u8,
    pub attributes: u8,
    pub size: [u8; 3],
    pub state: u8,
}

pub mod raw {
    /// EFI_FV_FILETYPE values.
    pub mod r#type {
        pub const ALL: u8 = 0x00;
        pub const RAW: u8 = 0x01;
        pub const FREEFORM: u8 = 0x02;
        pub const SECURITY_CORE: u8 = 0x03;
        pub const PEI_CORE: u8 = 0x04;
        pub const DXE_CORE: u8 = 0x05;
        pub const PEIM: u8 = 0x06;
        pub const DRIVER: u8 = 0x07;
        pub const FIRMWARE_VOLUME_IMAGE: u8 = 0x0B;
        pub const FFS_PAD: u8 = 0xF0;
    }

    /// EFI_FFS_FILE_ATTRIBUTES bits.
    pub mod attributes {
        /// The file uses the extended (64-bit size) header.
        pub const LARGE_FILE: u8 = 0x01;
        pub const FIXED: u8 = 0x04;
        pub const DATA_ALIGNMENT: u8 = 0x38;
        pub const CHECKSUM: u8 = 0x40;
    }

    /// EFI_FFS_FILE_STATE bits.
    pub mod state {
        pub const HEADER_CONSTRUCTION: u8 = 0x01;
        pub const HEADER_VALID: u8 = 0x02;
        pub const DATA_VALID: u8 = 0x04;
        pub const MARKED_FOR_UPDATE: u8 = 0x08;
        pub const DELETED: u8 = 0x10;
        pub const HEADER_INVALID: u8 = 0x20;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scroll::{ctx::SizeWith, LE};

    #[test]
    fn header_should_be_24_bytes() {
        assert_eq!(Header::size_with(&LE), HEADER_SIZE);
    }

    #[test]
    fn header_should_place_type_after_integrity_check() {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[18] = raw::r#type::PEI_CORE;
        bytes[19] = raw::attributes::CHECKSUM;
        bytes[20..23].copy_from_slice(&[0x40, 0x01, 0x00]);
        bytes[23] = raw::state::DATA_VALID;

        let header: Header = bytes.pread_with(0, LE).unwrap();
        assert_eq!(header.file_type, raw::r#type::PEI_CORE);
        assert_eq!(header.attributes, raw::attributes::CHECKSUM);
        assert_eq!(crate::size24(header.size), 0x140);
        assert_eq!(header.state, raw::state::DATA_VALID);
    }
}
