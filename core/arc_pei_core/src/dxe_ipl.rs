//! DXE Initial Program Load (IPL) PPI.
//!
//! When dispatched, finds the DXE core in the DXE volume and jumps to it in place.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::ffi::c_void;

use arc_pi::{
    fw_fs::ffs::{file::raw::r#type as file_type, section::raw_type},
    guids,
    ppi::descriptor_flags,
};
use arc_sdk::error::{EfiError, Result};
use r_efi::efi;

use crate::{
    pecoff::{self, ImageInfo},
    ppi_db::{DispatchPpi, PpiDescriptor, PpiInterface},
    services::PeiServices,
    transfer::{StageTransfer, XipTransfer},
    DXE_FV_INSTANCE,
};

/// Instance installed by [dxe_ipl_entry].
static DXE_IPL: DxeIpl<XipTransfer> = DxeIpl::new(XipTransfer);

/// The DXE IPL PPI.
pub struct DxeIpl<T: StageTransfer> {
    transfer: T,
}

impl<T: StageTransfer> DxeIpl<T> {
    pub const fn new(transfer: T) -> Self {
        Self { transfer }
    }

    /// The descriptor that publishes this PPI under [guids::DXE_IPL_PPI].
    pub fn descriptor(&self) -> PpiDescriptor<'_> {
        PpiDescriptor::new(
            descriptor_flags::PPI | descriptor_flags::TERMINATE_LIST,
            guids::DXE_IPL_PPI,
            PpiInterface::Service(self),
        )
    }

    /// Installs this PPI.
    pub fn install<'a>(&'a self, services: &mut PeiServices<'a>) -> Result<()> {
        services.install_ppi(&[self.descriptor()])
    }

    /// Locates the DXE core and resolves its entry point.
    pub fn load_dxe_core(&self, services: &PeiServices<'_>) -> Result<ImageInfo> {
        let volume = services.find_next_volume(DXE_FV_INSTANCE)?;
        let file = services.find_next_file(file_type::DXE_CORE, &volume, None)?;
        let info = services.get_file_info(&file).map_err(|err| {
            log::error!("DXE core file info: {:?}", err);
            EfiError::LoadError
        })?;
        log::info!(
            "DXE core {} at {:#x}, {:#x} bytes",
            uuid::Uuid::from_bytes_le(*info.name.as_bytes()),
            info.buffer_address,
            info.buffer_size()
        );

        let section = services.find_section_data(raw_type::PE32, &file)?;
        Ok(pecoff::resolve_loadable_pe(section.content(), section.content_address())?)
    }
}

impl<T: StageTransfer> DispatchPpi for DxeIpl<T> {
    fn dispatch(&self, services: &mut PeiServices<'_>) -> Result<()> {
        let image = self.load_dxe_core(services)?;
        log::info!(
            "Loaded DXE core at {:#x}, size {:#x}, entry {:#x}",
            image.image_address,
            image.image_size,
            image.entry_point
        );

        self.transfer.transfer(image.entry_point, 0);
        log::error!("DXE core returned");
        Err(EfiError::LoadError)
    }
}

/// Module entry point of the DXE IPL PEIM.
///
/// ## Safety
///
/// `services` must point at the `PeiServices<'static>` of the running PEI core.
pub unsafe extern "efiapi" fn dxe_ipl_entry(_file_handle: usize, services: *mut c_void) -> efi::Status {
    // SAFETY: the PEI core passes its own service table.
    let Some(services) = (unsafe { services.cast::<PeiServices<'static>>().as_mut() }) else {
        return efi::Status::INVALID_PARAMETER;
    };
    match DXE_IPL.install(services) {
        Ok(()) => efi::Status::SUCCESS,
        Err(err) => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, BootImages, DXE_CORE_ENTRY_OFFSET, DXE_CORE_IMAGE_SIZE, DXE_CORE_NAME};
    use crate::transfer::MockStageTransfer;
    use arc_ffs::compose::{File, Section, Volume};
    use arc_pi::fw_fs::ffs::file::raw::attributes;
    use mockall::predicate::eq;

    fn unused_transfer() -> MockStageTransfer {
        let mut transfer = MockStageTransfer::new();
        transfer.expect_transfer().never();
        transfer
    }

    #[test]
    fn install_should_publish_terminated_ppi() {
        let images = BootImages::new();
        let mut services = images.services();
        let dxe_ipl = DxeIpl::new(unused_transfer());

        dxe_ipl.install(&mut services).unwrap();

        let descriptor = services.locate_ppi(&guids::DXE_IPL_PPI, 0).unwrap();
        assert!(descriptor.is_ppi());
        assert!(descriptor.is_last());
        assert!(!descriptor.is_pic());
        assert!(matches!(descriptor.interface, PpiInterface::Service(_)));
    }

    #[test]
    fn load_dxe_core_should_resolve_pe32_in_place() {
        let images = BootImages::new();
        let services = images.services();

        let image = DxeIpl::new(unused_transfer()).load_dxe_core(&services).unwrap();

        let section = images.dxe_volume().find_file_section(file_type::DXE_CORE, raw_type::PE32, None).unwrap();
        assert_eq!(image.image_address, section.content_address());
        assert_eq!(image.image_size, DXE_CORE_IMAGE_SIZE as u64);
        assert_eq!(image.entry_point, section.content_address() + DXE_CORE_ENTRY_OFFSET as u64);
    }

    #[test]
    fn dispatch_should_fail_when_dxe_core_returns() {
        let images = BootImages::new();
        let mut services = images.services();
        let mut transfer = MockStageTransfer::new();
        transfer.expect_transfer().with(eq(images.dxe_core_entry()), eq(0)).times(1).return_const(());

        assert_eq!(DxeIpl::new(transfer).dispatch(&mut services), Err(EfiError::LoadError));
    }

    #[test]
    fn dispatch_should_fail_without_dxe_core() {
        let images = BootImages::from_volumes(test_support::boot_volume_builder(), Volume::new());
        let mut services = images.services();

        assert_eq!(DxeIpl::new(unused_transfer()).dispatch(&mut services), Err(EfiError::NotFound));
    }

    #[test]
    fn dispatch_should_reject_large_dxe_core_file() {
        let dxe = Volume::new().with_file(
            File::new(DXE_CORE_NAME, file_type::DXE_CORE)
                .with_attributes(attributes::LARGE_FILE)
                .with_section(Section::new(raw_type::PE32, test_support::pe32_image(0x1400, 0x6000))),
        );
        let images = BootImages::from_volumes(test_support::boot_volume_builder(), dxe);
        let mut services = images.services();

        assert_eq!(DxeIpl::new(unused_transfer()).dispatch(&mut services), Err(EfiError::LoadError));
    }

    #[test]
    fn dispatch_should_fail_for_non_pe32_dxe_core() {
        let dxe = Volume::new().with_file(
            File::new(DXE_CORE_NAME, file_type::DXE_CORE)
                .with_section(Section::new(raw_type::PE32, test_support::te_image(40, 0x100))),
        );
        let images = BootImages::from_volumes(test_support::boot_volume_builder(), dxe);
        let mut services = images.services();

        assert_eq!(DxeIpl::new(unused_transfer()).dispatch(&mut services), Err(EfiError::LoadError));
    }

    #[test]
    fn module_entry_should_install_dxe_ipl() {
        let images: &'static BootImages = Box::leak(Box::new(BootImages::new()));
        let mut services = images.services();

        // SAFETY: services is a live service table.
        let status = unsafe { dxe_ipl_entry(0, &mut services as *mut PeiServices<'static> as *mut c_void) };

        assert_eq!(status, efi::Status::SUCCESS);
        assert_eq!(services.ppi_db().count(), 1);
        assert!(services.locate_ppi(&guids::DXE_IPL_PPI, 0).is_ok());
        // SAFETY: a null table is rejected before use.
        assert_eq!(unsafe { dxe_ipl_entry(0, core::ptr::null_mut()) }, efi::Status::INVALID_PARAMETER);
    }
}
