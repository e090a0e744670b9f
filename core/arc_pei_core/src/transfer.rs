//! Control transfers to code addresses.
//!
//! Every jump into another stage or module goes through one of the traits here. The raw implementations are the
//! only places that turn an address into a function pointer; tests substitute recording fakes.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use arc_sdk::error::{EfiError, Result};
use r_efi::efi;

use crate::services::PeiServices;

/// Hands control to the next boot stage.
#[cfg_attr(test, mockall::automock)]
pub trait StageTransfer {
    /// Jumps to `entry` with `argument` as the sole parameter.
    ///
    /// A stage entry point does not return; if this function returns, the boot cannot proceed.
    fn transfer(&self, entry: u64, argument: u64);
}

/// Calls module and PPI entry points that run within the PEI phase and return a status.
///
/// The callee may install PPIs that live as long as the service table, hence the lifetime parameter.
pub trait ModuleInvoker<'a> {
    /// Calls a module entry point with the module's file handle (always null) and the PEI services.
    fn call_module(&self, entry: u64, services: &mut PeiServices<'a>) -> Result<()>;

    /// Calls a PPI entry point with the PPI interface and the PEI services.
    fn call_ppi_entry(&self, entry: u64, interface: u64, services: &mut PeiServices<'a>) -> Result<()>;
}

type EntryPoint = extern "efiapi" fn(usize, usize) -> efi::Status;

/// Calls the code at `entry` as an `efiapi` function of two pointer-sized arguments.
///
/// ## Safety
///
/// `entry` must be the address of executable code with that signature.
unsafe fn call_entry(entry: u64, first: usize, second: usize) -> efi::Status {
    let entry = usize::try_from(entry).unwrap_or(0);
    if entry == 0 {
        return efi::Status::INVALID_PARAMETER;
    }
    let function = core::mem::transmute::<usize, EntryPoint>(entry);
    function(first, second)
}

/// [StageTransfer] that jumps to the image in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct XipTransfer;

impl StageTransfer for XipTransfer {
    fn transfer(&self, entry: u64, argument: u64) {
        log::info!("Transferring control to {:#x}", entry);
        // SAFETY: stage entry points come from validated image headers in the boot volumes.
        let status = unsafe { call_entry(entry, argument as usize, 0) };
        log::error!("Stage at {:#x} returned {:#x?}", entry, status);
    }
}

/// [ModuleInvoker] that calls entry points in place.
///
/// The services argument is the address of the Rust [PeiServices] value, not a C function table, so modules must be
/// linked into the PEI core image and cast it back to `PeiServices<'static>`, as
/// [dxe_ipl_entry](crate::dxe_ipl::dxe_ipl_entry) does.
#[derive(Debug, Default, Clone, Copy)]
pub struct XipInvoker;

impl<'a> ModuleInvoker<'a> for XipInvoker {
    fn call_module(&self, entry: u64, services: &mut PeiServices<'a>) -> Result<()> {
        let services = services as *mut PeiServices<'a> as usize;
        // SAFETY: module entry points come from validated image headers in the boot volume.
        EfiError::status_to_result(unsafe { call_entry(entry, 0, services) })
    }

    fn call_ppi_entry(&self, entry: u64, interface: u64, services: &mut PeiServices<'a>) -> Result<()> {
        let services = services as *mut PeiServices<'a> as usize;
        // SAFETY: the entry was installed by a module together with its interface.
        EfiError::status_to_result(unsafe { call_entry(entry, interface as usize, services) })
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{dxe_ipl::dxe_ipl_entry, test_support::BootImages};
    use arc_pi::guids;

    static PPI_INTERFACE: AtomicUsize = AtomicUsize::new(0);
    static PPI_COUNT: AtomicUsize = AtomicUsize::new(0);

    extern "efiapi" fn record_ppi(interface: usize, services: usize) -> efi::Status {
        // SAFETY: the invoker passes its live service table.
        let Some(services) = (unsafe { (services as *mut PeiServices<'static>).as_mut() }) else {
            return efi::Status::INVALID_PARAMETER;
        };
        PPI_INTERFACE.store(interface, Ordering::SeqCst);
        PPI_COUNT.store(services.ppi_db().count(), Ordering::SeqCst);
        efi::Status::NOT_READY
    }

    #[test]
    fn call_module_should_hand_service_table_to_linked_module() {
        let images: &'static BootImages = Box::leak(Box::new(BootImages::new()));
        let mut services = images.services();

        XipInvoker.call_module(dxe_ipl_entry as usize as u64, &mut services).unwrap();

        assert_eq!(services.ppi_db().count(), 1);
        assert!(services.locate_ppi(&guids::DXE_IPL_PPI, 0).is_ok());
    }

    #[test]
    fn call_ppi_entry_should_pass_interface_and_services() {
        let images: &'static BootImages = Box::leak(Box::new(BootImages::new()));
        let mut services = images.services();
        XipInvoker.call_module(dxe_ipl_entry as usize as u64, &mut services).unwrap();

        let result = XipInvoker.call_ppi_entry(record_ppi as usize as u64, 0x5a5a, &mut services);

        assert_eq!(result, Err(EfiError::NotReady));
        assert_eq!(PPI_INTERFACE.load(Ordering::SeqCst), 0x5a5a);
        assert_eq!(PPI_COUNT.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn null_entry_should_be_rejected() {
        let images = BootImages::new();
        let mut services = images.services();
        assert_eq!(XipInvoker.call_module(0, &mut services), Err(EfiError::InvalidParameter));
    }
}
