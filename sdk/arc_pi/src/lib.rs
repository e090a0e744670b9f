//! Platform Initialization (PI) definitions used by the Arc boot cores.
//!
//! Every structure here is bit-exact with the layouts produced by a PI conforming firmware build toolchain.
//! Multi-byte fields are little-endian and are decoded with [scroll] rather than by casting raw pointers.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(not(test), no_std)]

pub mod fw_fs;
pub mod guids;
pub mod handoff;
pub mod pe;
pub mod ppi;

/// Decodes a 24-bit little-endian size field as used by file and section headers.
pub const fn size24(size: [u8; 3]) -> u32 {
    u32::from_le_bytes([size[0], size[1], size[2], 0])
}

/// Encodes a 24-bit little-endian size field, returning `None` if the value does not fit.
pub const fn to_size24(size: u32) -> Option<[u8; 3]> {
    if size > 0x00FF_FFFF {
        return None;
    }
    let bytes = size.to_le_bytes();
    Some([bytes[0], bytes[1], bytes[2]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size24_should_decode_little_endian() {
        assert_eq!(size24([0x18, 0x00, 0x00]), 0x18);
        assert_eq!(size24([0x00, 0x10, 0x02]), 0x021000);
        assert_eq!(to_size24(0x021000), Some([0x00, 0x10, 0x02]));
        assert_eq!(to_size24(0x0100_0000), None);
    }
}
