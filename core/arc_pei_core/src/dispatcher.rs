//! PEI core dispatcher.
//!
//! Runs the second boot stage: calls the first module named in the apriori file so it can install its PPIs, then
//! dispatches every installed PPI once, in registration order. One of them is expected to hand control to the DXE
//! core; if none does, the boot halts.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::panic::Location;

use arc_ffs::{apriori::AprioriFile, VolumeRef};
use arc_pi::{
    fw_fs::ffs::{file::raw::r#type as file_type, section::raw_type},
    handoff::SecPeiHandOff,
};
use arc_sdk::error::EfiError;

use crate::{
    config::PlatformConfig,
    cpu, pecoff,
    ppi_db::PpiInterface,
    services::PeiServices,
    transfer::{ModuleInvoker, XipInvoker},
};

/// Steps of the boot flow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BootPhase {
    Reset,
    ValidateVolume,
    ResolveStage2,
    TransferToStage2,
    InitModules,
    InstallServices,
    RunDispatch,
    ResolveStage3,
    TransferToStage3,
}

/// Why the boot stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// A step failed.
    Error(EfiError),
    /// A stage entry point returned to its caller.
    TransferReturned,
    /// Every installed PPI was dispatched without leaving the PEI phase.
    DispatchExhausted,
}

/// Terminal state of a boot flow.
///
/// `location` is the source line that gave up. Two halts compare equal when phase and reason match.
#[derive(Debug, Clone, Copy)]
pub struct Halt {
    pub phase: BootPhase,
    pub reason: HaltReason,
    pub location: &'static Location<'static>,
}

impl Halt {
    /// Records a halt at the caller's location.
    #[track_caller]
    pub fn new(phase: BootPhase, reason: HaltReason) -> Self {
        Self { phase, reason, location: Location::caller() }
    }
}

impl PartialEq for Halt {
    fn eq(&self, other: &Self) -> bool {
        self.phase == other.phase && self.reason == other.reason
    }
}

impl Eq for Halt {}

/// Turns a failed step into a [Halt] at `phase`, located at the caller.
pub(crate) trait OrHalt<T> {
    fn or_halt(self, phase: BootPhase) -> Result<T, Halt>;
}

impl<T, E: Into<EfiError>> OrHalt<T> for Result<T, E> {
    #[track_caller]
    fn or_halt(self, phase: BootPhase) -> Result<T, Halt> {
        let location = Location::caller();
        self.map_err(|err| {
            let err = err.into();
            log::error!("{:?} failed: {:?} at {}:{}", phase, err, location.file(), location.line());
            Halt { phase, reason: HaltReason::Error(err), location }
        })
    }
}

fn guid_display(guid: &r_efi::efi::Guid) -> uuid::Uuid {
    uuid::Uuid::from_bytes_le(*guid.as_bytes())
}

/// Calls the first module listed in the apriori file of the boot volume.
///
/// The module installs its PPIs through `services`. Its return status is only reported; failing to find or
/// resolve the module halts the boot.
pub fn init_modules<'a>(services: &mut PeiServices<'a>, invoker: &dyn ModuleInvoker<'a>) -> Result<(), Halt> {
    let boot_volume = services.boot_volume();
    let apriori = AprioriFile::find(&boot_volume).or_halt(BootPhase::InitModules)?;
    let name = apriori.first().or_halt(BootPhase::InitModules)?;
    log::info!("Apriori lists {} module(s), starting {}", apriori.len(), guid_display(&name));

    let section =
        boot_volume.find_file_section(file_type::PEIM, raw_type::TE, Some(&name)).or_halt(BootPhase::InitModules)?;
    let entry =
        pecoff::resolve_entry_point(section.content(), section.content_address()).or_halt(BootPhase::InitModules)?;

    log::info!("Calling module {} at {:#x}", guid_display(&name), entry);
    match invoker.call_module(entry, services) {
        Ok(()) => log::info!("Module {} installed {} PPI(s)", guid_display(&name), services.ppi_db().count()),
        Err(err) => log::warn!("Module {} returned {:?}", guid_display(&name), err),
    }
    Ok(())
}

/// Dispatches the PPIs installed so far, in registration order.
///
/// PPIs installed while dispatching are not visited. Descriptors without an entry point are skipped. Returns only
/// if no dispatched PPI left the PEI phase.
pub fn run_dispatch<'a>(services: &mut PeiServices<'a>, invoker: &dyn ModuleInvoker<'a>) -> Halt {
    let count = services.ppi_db().count();
    log::info!("Dispatching {} PPI(s)", count);

    for index in services.ppi_db().last_dispatched()..count {
        let Some(descriptor) = services.ppi_db().get(index) else {
            continue;
        };
        let status = match descriptor.interface {
            PpiInterface::Service(service) => {
                log::info!("Dispatching PPI {}", guid_display(&descriptor.guid));
                service.dispatch(services)
            }
            PpiInterface::Entry { interface, entry } => {
                log::info!("Dispatching PPI {} at {:#x}", guid_display(&descriptor.guid), entry);
                invoker.call_ppi_entry(entry, interface, services)
            }
            PpiInterface::Address(_) => {
                log::debug!("PPI {} has no entry point", guid_display(&descriptor.guid));
                Ok(())
            }
        };
        if let Err(err) = status {
            log::error!("PPI {} returned {:?}", guid_display(&descriptor.guid), err);
        }
        services.ppi_db_mut().mark_dispatched(index + 1);
    }

    log::error!("No PPI transferred control to the DXE core");
    Halt::new(BootPhase::ResolveStage3, HaltReason::DispatchExhausted)
}

/// Runs the PEI phase over already validated volumes. Returns only when the boot cannot proceed.
pub fn pei_core<'a>(
    handoff: &SecPeiHandOff,
    boot_volume: VolumeRef<'a>,
    dxe_volume: Option<VolumeRef<'a>>,
    invoker: &dyn ModuleInvoker<'a>,
) -> Halt {
    log::info!(
        "PEI core: boot volume {:#x} size {:#x}, PEI RAM {:#x} size {:#x}, stack {:#x} size {:#x}",
        handoff.boot_firmware_volume_base,
        handoff.boot_firmware_volume_size,
        handoff.pei_temporary_ram_base,
        handoff.pei_temporary_ram_size,
        handoff.stack_base,
        handoff.stack_size
    );

    let mut services = PeiServices::new(*handoff, boot_volume, dxe_volume);
    if let Err(halt) = init_modules(&mut services, invoker) {
        return halt;
    }
    run_dispatch(&mut services, invoker)
}

/// Entry point of the PEI core image.
///
/// The SEC core jumps here with the address of its [SecPeiHandOff] as the first argument. The second argument is
/// the PPI list SEC publishes; SEC publishes none, so it is ignored.
///
/// ## Safety
///
/// See [pei_core_start]. The DXE volume is looked up at [PlatformConfig::DEFAULT].
pub unsafe extern "efiapi" fn pei_core_entry(handoff: *const SecPeiHandOff, _ppi_list: usize) -> ! {
    // SAFETY: forwarded to the caller.
    cpu::halt(unsafe { pei_core_start(handoff, &PlatformConfig::DEFAULT, &XipInvoker) })
}

/// Maps the core volumes and runs the PEI phase. Returns only when the boot cannot proceed.
///
/// ## Safety
///
/// `handoff` must be null or point to a valid record whose boot volume is mapped at its base address, and
/// `config.dxe_fv_base` must be readable. Both volumes must stay mapped for the rest of the boot.
pub unsafe fn pei_core_start(
    handoff: *const SecPeiHandOff,
    config: &PlatformConfig,
    invoker: &dyn ModuleInvoker<'static>,
) -> Halt {
    // SAFETY: the caller guarantees a non-null handoff is valid.
    let Some(handoff) = (unsafe { handoff.as_ref() }) else {
        log::error!("PEI core entered without a handoff");
        return Halt::new(BootPhase::TransferToStage2, HaltReason::Error(EfiError::InvalidParameter));
    };

    // SAFETY: the SEC core validated the boot volume at this address before building the handoff.
    let boot_volume = match unsafe { VolumeRef::new_from_address(handoff.boot_firmware_volume_base as u64) } {
        Ok(volume) => volume,
        Err(err) => return Halt::new(BootPhase::InitModules, HaltReason::Error(err.into())),
    };
    // SAFETY: the caller guarantees the DXE volume address is readable.
    let dxe_volume = match unsafe { VolumeRef::new_from_address(config.dxe_fv_base) } {
        Ok(volume) => Some(volume),
        Err(err) => {
            log::warn!("No DXE volume at {:#x}: {:?}", config.dxe_fv_base, err);
            None
        }
    };

    pei_core(handoff, boot_volume, dxe_volume, invoker)
}
