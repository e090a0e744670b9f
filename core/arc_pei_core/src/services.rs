//! PEI services.
//!
//! The service table handed to every module and PPI the PEI core calls. It owns the PPI database and gives access
//! to the core firmware volumes.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use arc_ffs::{FileInfo, FileRef, SectionRef, VolumeRef};
use arc_pi::{
    fw_fs::ffs::{file::raw::r#type as file_type, section::raw_type},
    handoff::SecPeiHandOff,
};
use arc_sdk::error::{EfiError, Result};
use r_efi::efi;

use crate::{
    ppi_db::{PpiDb, PpiDescriptor},
    DXE_FV_INSTANCE,
};

/// Returns the displacement applied to position-independent PPI descriptors.
///
/// Modules are linked at zero and execute in place, so the run-time address of the freeform-subtype section in
/// the first PEIM of the boot volume is the distance between link and run addresses.
///
/// Errors
/// - [EfiError::NotFound]: no PEIM carries a freeform-subtype section.
/// - [EfiError::Unsupported]: the section lies above 4 GiB, so the 32-bit displacement cannot express it.
pub fn pic_fixup(boot_volume: &VolumeRef<'_>) -> Result<u32> {
    let section = boot_volume.find_file_section(file_type::PEIM, raw_type::FREEFORM_SUBTYPE_GUID, None)?;
    let fixup = u32::try_from(section.address()).map_err(|_| {
        log::error!("PIC fixup section at {:#x} is out of 32-bit range", section.address());
        EfiError::Unsupported
    })?;
    log::debug!("PIC fixup {:#x}", fixup);
    Ok(fixup)
}

/// EFI_PEI_SERVICES
pub struct PeiServices<'a> {
    boot_volume: VolumeRef<'a>,
    dxe_volume: Option<VolumeRef<'a>>,
    ppi_db: PpiDb<'a>,
    handoff: SecPeiHandOff,
}

impl<'a> PeiServices<'a> {
    /// Creates the service table with an empty PPI database.
    pub fn new(handoff: SecPeiHandOff, boot_volume: VolumeRef<'a>, dxe_volume: Option<VolumeRef<'a>>) -> Self {
        Self { boot_volume, dxe_volume, ppi_db: PpiDb::new(), handoff }
    }

    /// The record the SEC core handed over.
    pub fn handoff(&self) -> &SecPeiHandOff {
        &self.handoff
    }

    pub fn boot_volume(&self) -> VolumeRef<'a> {
        self.boot_volume
    }

    pub fn ppi_db(&self) -> &PpiDb<'a> {
        &self.ppi_db
    }

    pub(crate) fn ppi_db_mut(&mut self) -> &mut PpiDb<'a> {
        &mut self.ppi_db
    }

    /// Installs a terminated list of PPI descriptors. See [PpiDb::install].
    pub fn install_ppi(&mut self, list: &[PpiDescriptor<'a>]) -> Result<()> {
        let boot_volume = self.boot_volume;
        self.ppi_db.install(list, || pic_fixup(&boot_volume))
    }

    /// Returns the `instance`-th installed PPI named `guid`.
    pub fn locate_ppi(&self, guid: &efi::Guid, instance: usize) -> Result<PpiDescriptor<'a>> {
        self.ppi_db.locate(guid, instance)
    }

    /// Notifications are not supported.
    pub fn notify_ppi(&mut self, list: &[PpiDescriptor<'a>]) -> Result<()> {
        self.ppi_db.notify(list)
    }

    /// Returns a core firmware volume: instance 0 is the boot volume, instance [DXE_FV_INSTANCE] holds the DXE
    /// core.
    pub fn find_next_volume(&self, instance: usize) -> Result<VolumeRef<'a>> {
        match instance {
            0 => Ok(self.boot_volume),
            DXE_FV_INSTANCE => self.dxe_volume.ok_or(EfiError::NotFound),
            _ => Err(EfiError::NotFound),
        }
    }

    /// Returns the next file of `file_type` in `volume` after `previous`, or the first one if `previous` is
    /// `None`.
    pub fn find_next_file(
        &self,
        file_type: u8,
        volume: &VolumeRef<'a>,
        previous: Option<&FileRef<'a>>,
    ) -> Result<FileRef<'a>> {
        Ok(volume.find_next_file(file_type, previous)?)
    }

    /// Returns the first section of `section_type` in `file`.
    pub fn find_section_data(&self, section_type: u8, file: &FileRef<'a>) -> Result<SectionRef<'a>> {
        Ok(file.find_section(section_type)?)
    }

    /// Describes `file`. Files with an extended header are not supported.
    pub fn get_file_info(&self, file: &FileRef<'a>) -> Result<FileInfo<'a>> {
        Ok(file.file_info()?)
    }
}
