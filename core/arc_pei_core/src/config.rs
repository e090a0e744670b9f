//! Board configuration consumed by the SEC and PEI cores.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// Fixed board parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Address the boot firmware volume is mapped at.
    pub boot_fv_base: u64,
    /// Address the volume holding the DXE core is mapped at.
    pub dxe_fv_base: u64,
    /// Temporary RAM available before memory is initialized.
    pub temporary_ram_base: u64,
    pub temporary_ram_size: u64,
}

impl PlatformConfig {
    /// Reference board layout.
    pub const DEFAULT: Self = Self {
        boot_fv_base: 0x1000_0000,
        dxe_fv_base: 0x1010_0000,
        temporary_ram_base: 0x8000_0000,
        temporary_ram_size: 0x0001_0000,
    };

    pub const fn with_boot_fv_base(mut self, base: u64) -> Self {
        self.boot_fv_base = base;
        self
    }

    pub const fn with_dxe_fv_base(mut self, base: u64) -> Self {
        self.dxe_fv_base = base;
        self
    }

    pub const fn with_temporary_ram(mut self, base: u64, size: u64) -> Self {
        self.temporary_ram_base = base;
        self.temporary_ram_size = size;
        self
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
