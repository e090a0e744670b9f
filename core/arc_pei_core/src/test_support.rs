//! In-memory boot volumes for unit tests.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use arc_ffs::{
    compose::{File, Section, Volume},
    VolumeRef,
};
use arc_pi::{
    fw_fs::ffs::{file::raw::r#type as file_type, section::raw_type},
    guids,
    handoff::SecPeiHandOff,
    pe::{self, FileHeader, OptionalHeader32, TeHeader},
};
use r_efi::efi;
use scroll::{Pwrite, LE};

use crate::{config::PlatformConfig, services::PeiServices};

pub const PEI_CORE_NAME: efi::Guid =
    efi::Guid::from_fields(0x52c05b14, 0x0b98, 0x496c, 0xbc, 0x3b, &[0x04, 0xb5, 0x02, 0x11, 0xd6, 0x80]);
pub const DXE_IPL_NAME: efi::Guid =
    efi::Guid::from_fields(0x86d70125, 0xbaa3, 0x4296, 0xa6, 0x2f, &[0x60, 0x2b, 0xeb, 0xbb, 0x90, 0x81]);
pub const DXE_CORE_NAME: efi::Guid =
    efi::Guid::from_fields(0xd6a2cb7f, 0x6a18, 0x4e2f, 0xb4, 0x3b, &[0x99, 0x20, 0xa7, 0x33, 0x70, 0x0a]);

pub const PEI_CORE_STRIPPED_SIZE: u16 = 0x1e8;
pub const PEI_CORE_ENTRY_OFFSET: u32 = 0x240;
pub const PEIM_ENTRY_OFFSET: u32 = 0x80;
pub const DXE_CORE_ENTRY_OFFSET: u32 = 0x1400;
pub const DXE_CORE_IMAGE_SIZE: u32 = 0x6000;

/// Execution address of the boot volume, as the board maps it.
pub const BOOT_FV_BASE: u64 = PlatformConfig::DEFAULT.boot_fv_base;
/// Execution address of the DXE volume.
pub const DXE_FV_BASE: u64 = PlatformConfig::DEFAULT.dxe_fv_base;

pub const TEMP_RAM_BASE: u64 = 0x8000_0000;
pub const TEMP_RAM_SIZE: u64 = 0x1_0000;

/// Offset of the NT headers in images built by [pe32_image].
pub const PE_HEADER_OFFSET: usize = 0x80;

/// A TE image with the given stripped size and entry point offset, followed by a small body.
pub fn te_image(stripped_size: u16, address_of_entry_point: u32) -> Vec<u8> {
    let header = TeHeader {
        signature: pe::TE_SIGNATURE,
        machine: 0x14c,
        number_of_sections: 1,
        subsystem: 11,
        stripped_size,
        address_of_entry_point,
        base_of_code: address_of_entry_point,
        ..Default::default()
    };
    let mut bytes = vec![0xc3u8; pe::TE_HEADER_SIZE + 0x20];
    bytes.pwrite_with(header, 0, LE).unwrap();
    bytes
}

/// A PE32 image with the given entry point offset and image size.
pub fn pe32_image(address_of_entry_point: u32, size_of_image: u32) -> Vec<u8> {
    let mut bytes = vec![0u8; 0x200];
    bytes.pwrite_with(pe::DOS_SIGNATURE, 0, LE).unwrap();
    bytes.pwrite_with(PE_HEADER_OFFSET as u32, pe::DOS_LFANEW_OFFSET, LE).unwrap();

    let mut offset = PE_HEADER_OFFSET;
    bytes.gwrite_with(pe::NT_SIGNATURE, &mut offset, LE).unwrap();
    let file_header = FileHeader { machine: 0x14c, size_of_optional_header: 0xe0, ..Default::default() };
    bytes.gwrite_with(file_header, &mut offset, LE).unwrap();
    let optional_header = OptionalHeader32 {
        magic: pe::NT_OPTIONAL_HDR32_MAGIC,
        size_of_code: 0x1000,
        address_of_entry_point,
        section_alignment: 0x1000,
        file_alignment: 0x200,
        size_of_image,
        size_of_headers: 0x200,
        ..Default::default()
    };
    bytes.gwrite_with(optional_header, &mut offset, LE).unwrap();
    bytes
}

/// Boot volume with a PEI core, an apriori file naming the DXE IPL PEIM, and that PEIM.
pub fn boot_volume_builder() -> Volume {
    Volume::new()
        .with_file(
            File::new(PEI_CORE_NAME, file_type::PEI_CORE)
                .with_section(Section::new(raw_type::TE, te_image(PEI_CORE_STRIPPED_SIZE, PEI_CORE_ENTRY_OFFSET))),
        )
        .with_file(
            File::new(guids::PEI_APRIORI_FILE_NAME, file_type::FREEFORM)
                .with_section(Section::new(raw_type::RAW, DXE_IPL_NAME.as_bytes().to_vec())),
        )
        .with_file(
            File::new(DXE_IPL_NAME, file_type::PEIM)
                .with_section(Section::new(raw_type::FREEFORM_SUBTYPE_GUID, DXE_IPL_NAME.as_bytes().to_vec()))
                .with_section(Section::new(raw_type::TE, te_image(pe::TE_HEADER_SIZE as u16, PEIM_ENTRY_OFFSET))),
        )
}

/// Volume holding the DXE core.
pub fn dxe_volume_builder() -> Volume {
    Volume::new().with_file(
        File::new(DXE_CORE_NAME, file_type::DXE_CORE)
            .with_section(Section::new(raw_type::PE32, pe32_image(DXE_CORE_ENTRY_OFFSET, DXE_CORE_IMAGE_SIZE))),
    )
}

/// Serialized boot and DXE volumes, viewed at [BOOT_FV_BASE] and [DXE_FV_BASE].
pub struct BootImages {
    boot: Vec<u8>,
    dxe: Vec<u8>,
}

impl BootImages {
    pub fn new() -> Self {
        Self::from_volumes(boot_volume_builder(), dxe_volume_builder())
    }

    pub fn from_volumes(boot: Volume, dxe: Volume) -> Self {
        Self { boot: boot.serialize().unwrap(), dxe: dxe.serialize().unwrap() }
    }

    pub fn boot_bytes(&self) -> &[u8] {
        &self.boot
    }

    pub fn boot_volume(&self) -> VolumeRef<'_> {
        VolumeRef::new_at(&self.boot, BOOT_FV_BASE).unwrap()
    }

    pub fn dxe_volume(&self) -> VolumeRef<'_> {
        VolumeRef::new_at(&self.dxe, DXE_FV_BASE).unwrap()
    }

    pub fn handoff(&self) -> SecPeiHandOff {
        SecPeiHandOff::new(
            BOOT_FV_BASE as usize,
            self.boot.len(),
            TEMP_RAM_BASE as usize,
            TEMP_RAM_SIZE as usize,
        )
    }

    pub fn services(&self) -> PeiServices<'_> {
        PeiServices::new(self.handoff(), self.boot_volume(), Some(self.dxe_volume()))
    }

    /// Address of the freeform-subtype section header in the DXE IPL PEIM.
    pub fn fixup_section_address(&self) -> u64 {
        self.boot_volume()
            .find_file(file_type::PEIM, Some(&DXE_IPL_NAME))
            .unwrap()
            .find_section(raw_type::FREEFORM_SUBTYPE_GUID)
            .unwrap()
            .address()
    }

    /// Run-time entry point of the PEI core.
    pub fn pei_core_entry(&self) -> u64 {
        let section = self.boot_volume().find_file_section(file_type::PEI_CORE, raw_type::TE, None).unwrap();
        section.content_address() - PEI_CORE_STRIPPED_SIZE as u64 + pe::TE_HEADER_SIZE as u64
            + PEI_CORE_ENTRY_OFFSET as u64
    }

    /// Run-time entry point of the DXE IPL PEIM.
    pub fn peim_entry(&self) -> u64 {
        let section =
            self.boot_volume().find_file_section(file_type::PEIM, raw_type::TE, Some(&DXE_IPL_NAME)).unwrap();
        section.content_address() + PEIM_ENTRY_OFFSET as u64
    }

    /// Run-time entry point of the DXE core.
    pub fn dxe_core_entry(&self) -> u64 {
        let section = self.dxe_volume().find_file_section(file_type::DXE_CORE, raw_type::PE32, None).unwrap();
        section.content_address() + DXE_CORE_ENTRY_OFFSET as u64
    }
}
