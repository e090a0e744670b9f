//! SEC to PEI handoff record.
//!
//! UEFI PI 1.8: I-9.2 PEI Foundation Entry Point.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// EFI_SEC_PEI_HAND_OFF
///
/// Built once by the first stage and passed by reference to the second stage entry point. The temporary RAM
/// region is split in two equal halves: the low half holds PEI core state, the high half becomes the stack
/// the second stage switches to.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SecPeiHandOff {
    pub data_size: u16,
    pub boot_firmware_volume_base: usize,
    pub boot_firmware_volume_size: usize,
    pub temporary_ram_base: usize,
    pub temporary_ram_size: usize,
    pub pei_temporary_ram_base: usize,
    pub pei_temporary_ram_size: usize,
    pub stack_base: usize,
    pub stack_size: usize,
}

impl SecPeiHandOff {
    /// Builds the record, deriving the PEI data and stack halves from the temporary RAM region.
    pub const fn new(
        boot_firmware_volume_base: usize,
        boot_firmware_volume_size: usize,
        temporary_ram_base: usize,
        temporary_ram_size: usize,
    ) -> Self {
        let half = temporary_ram_size >> 1;
        Self {
            data_size: core::mem::size_of::<Self>() as u16,
            boot_firmware_volume_base,
            boot_firmware_volume_size,
            temporary_ram_base,
            temporary_ram_size,
            pei_temporary_ram_base: temporary_ram_base,
            pei_temporary_ram_size: half,
            stack_base: temporary_ram_base + half,
            stack_size: half,
        }
    }
}
