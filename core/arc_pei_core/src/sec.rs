//! SEC core.
//!
//! First code to run after reset. Validates the boot firmware volume, finds the PEI core in it, describes
//! temporary RAM in a [SecPeiHandOff] and jumps to the PEI core.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use arc_ffs::VolumeRef;
use arc_pi::{
    fw_fs::ffs::{file::raw::r#type as file_type, section::raw_type},
    handoff::SecPeiHandOff,
};

use crate::{
    config::PlatformConfig,
    cpu,
    dispatcher::{BootPhase, Halt, HaltReason, OrHalt},
    pecoff,
    transfer::{StageTransfer, XipTransfer},
};

/// Runs the SEC phase over the boot volume image `image`, which executes from `image_base`.
///
/// Returns only when the boot cannot proceed.
pub fn sec_startup(image: &[u8], image_base: u64, config: &PlatformConfig, transfer: &dyn StageTransfer) -> Halt {
    log::info!("SEC core started");
    if let Err(err) = cpu::install_exception_handlers() {
        log::debug!("Exception handlers: {:?}", err);
    }

    let volume = match VolumeRef::new_at(image, image_base).or_halt(BootPhase::ValidateVolume) {
        Ok(volume) => volume,
        Err(halt) => return halt,
    };
    log::info!("Boot volume at {:#x}, {:#x} bytes", volume.base_address(), volume.size());

    let entry = match resolve_pei_core(&volume) {
        Ok(entry) => entry,
        Err(halt) => return halt,
    };

    let handoff = SecPeiHandOff::new(
        volume.base_address() as usize,
        volume.size() as usize,
        config.temporary_ram_base as usize,
        config.temporary_ram_size as usize,
    );
    log::info!(
        "Handing off to PEI core at {:#x}, stack {:#x} size {:#x}",
        entry,
        handoff.stack_base,
        handoff.stack_size
    );

    transfer.transfer(entry, &handoff as *const SecPeiHandOff as u64);
    log::error!("PEI core returned");
    Halt::new(BootPhase::TransferToStage2, HaltReason::TransferReturned)
}

fn resolve_pei_core(volume: &VolumeRef<'_>) -> Result<u64, Halt> {
    let section =
        volume.find_file_section(file_type::PEI_CORE, raw_type::TE, None).or_halt(BootPhase::ResolveStage2)?;
    pecoff::resolve_entry_point(section.content(), section.content_address()).or_halt(BootPhase::ResolveStage2)
}

/// Entry of the SEC core on the target.
///
/// ## Safety
///
/// `config.boot_fv_base` must be readable for the length of the volume header, and for the declared volume length
/// if the header is valid.
pub unsafe fn sec_main(config: &PlatformConfig) -> ! {
    // SAFETY: the caller guarantees the boot volume is mapped.
    let volume = match unsafe { VolumeRef::new_from_address(config.boot_fv_base) } {
        Ok(volume) => volume,
        Err(err) => cpu::halt(Halt::new(BootPhase::ValidateVolume, HaltReason::Error(err.into()))),
    };
    cpu::halt(sec_startup(volume.data(), volume.base_address(), config, &XipTransfer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_support::{self, BootImages, BOOT_FV_BASE, TEMP_RAM_BASE, TEMP_RAM_SIZE},
        transfer::MockStageTransfer,
    };
    use mockall::predicate::{always, eq};
    use arc_ffs::compose::{File, Section, Volume};
    use arc_sdk::error::EfiError;
    use r_efi::efi;

    fn config() -> PlatformConfig {
        PlatformConfig::DEFAULT.with_temporary_ram(TEMP_RAM_BASE, TEMP_RAM_SIZE)
    }

    #[test]
    fn sec_startup_should_hand_off_to_pei_core_entry() {
        let images = BootImages::new();
        let bytes = images.boot_bytes();
        let base = BOOT_FV_BASE;
        let size = bytes.len();
        let entry = images.pei_core_entry();

        let mut transfer = MockStageTransfer::new();
        transfer.expect_transfer().times(1).returning(move |target, argument| {
            assert_eq!(target, entry);
            // SAFETY: the SEC core passes a handoff that lives for the duration of the call.
            let handoff = unsafe { &*(argument as *const SecPeiHandOff) };
            assert_eq!(handoff.boot_firmware_volume_base as u64, base);
            assert_eq!(handoff.boot_firmware_volume_size, size);
            assert_eq!(handoff.pei_temporary_ram_base as u64, TEMP_RAM_BASE);
            assert_eq!(handoff.pei_temporary_ram_size as u64, TEMP_RAM_SIZE / 2);
            assert_eq!(handoff.stack_base as u64, TEMP_RAM_BASE + TEMP_RAM_SIZE / 2);
            assert_eq!(handoff.stack_size as u64, TEMP_RAM_SIZE / 2);
        });

        let halt = sec_startup(bytes, base, &config(), &transfer);

        assert_eq!(halt, Halt::new(BootPhase::TransferToStage2, HaltReason::TransferReturned));
    }

    #[test]
    fn sec_startup_should_use_execution_address() {
        let images = BootImages::new();
        let base = 0x2000_0000;
        let expected = images.pei_core_entry() - BOOT_FV_BASE + base;

        let mut transfer = MockStageTransfer::new();
        transfer.expect_transfer().withf(move |target, _| *target == expected).times(1).return_const(());

        sec_startup(images.boot_bytes(), base, &config(), &transfer);
    }

    #[test]
    fn sec_startup_should_enter_te_image_at_exact_address() {
        let bytes = Volume::new()
            .with_length(4096)
            .with_file(
                File::new(test_support::PEI_CORE_NAME, file_type::PEI_CORE)
                    .with_section(Section::new(raw_type::TE, test_support::te_image(40, 0x100))),
            )
            .serialize()
            .unwrap();
        let volume = VolumeRef::new_at(&bytes, BOOT_FV_BASE).unwrap();
        assert_eq!(volume.size(), 4096);
        assert_eq!(volume.header_length(), 64);
        let section = volume.find_file_section(file_type::PEI_CORE, raw_type::TE, None).unwrap();
        // 64 byte volume header, 24 byte file header, 4 byte section header.
        assert_eq!(section.content_address(), BOOT_FV_BASE + 64 + 24 + 4);

        let mut transfer = MockStageTransfer::new();
        transfer.expect_transfer().with(eq(BOOT_FV_BASE + 92 - 40 + 40 + 0x100), always()).times(1).return_const(());

        let halt = sec_startup(&bytes, BOOT_FV_BASE, &config(), &transfer);

        assert_eq!(halt, Halt::new(BootPhase::TransferToStage2, HaltReason::TransferReturned));
    }

    #[test]
    fn sec_startup_should_halt_on_invalid_volume() {
        let images = BootImages::new();
        let mut bytes = images.boot_bytes().to_vec();
        bytes[40] = b'X';
        let mut transfer = MockStageTransfer::new();
        transfer.expect_transfer().never();

        let halt = sec_startup(&bytes, 0x1000, &config(), &transfer);

        assert_eq!(halt, Halt::new(BootPhase::ValidateVolume, HaltReason::Error(EfiError::VolumeCorrupted)));
    }

    #[test]
    fn sec_startup_should_halt_on_foreign_file_system() {
        let guid = efi::Guid::from_fields(0x7a9354d9, 0x0468, 0x444a, 0x81, 0xce, &[0x0b, 0xf6, 0x17, 0xd8, 0x90, 0xdf]);
        let bytes = test_support::boot_volume_builder().with_file_system_guid(guid).serialize().unwrap();
        let mut transfer = MockStageTransfer::new();
        transfer.expect_transfer().never();

        let halt = sec_startup(&bytes, 0x1000, &config(), &transfer);

        assert_eq!(halt, Halt::new(BootPhase::ValidateVolume, HaltReason::Error(EfiError::Unsupported)));
    }

    #[test]
    fn sec_startup_should_halt_without_pei_core() {
        let bytes = Volume::new()
            .with_file(
                File::new(test_support::DXE_IPL_NAME, file_type::PEIM)
                    .with_section(Section::new(raw_type::TE, test_support::te_image(40, 0x80))),
            )
            .serialize()
            .unwrap();
        let mut transfer = MockStageTransfer::new();
        transfer.expect_transfer().never();

        let halt = sec_startup(&bytes, 0x1000, &config(), &transfer);

        assert_eq!(halt, Halt::new(BootPhase::ResolveStage2, HaltReason::Error(EfiError::NotFound)));
    }

    #[test]
    fn sec_startup_should_halt_on_unaddressable_entry() {
        let bytes = Volume::new()
            .with_file(
                File::new(test_support::PEI_CORE_NAME, file_type::PEI_CORE)
                    .with_section(Section::new(raw_type::TE, test_support::te_image(0x1000, 0))),
            )
            .serialize()
            .unwrap();
        let mut transfer = MockStageTransfer::new();
        transfer.expect_transfer().never();

        let halt = sec_startup(&bytes, 0, &config(), &transfer);

        assert_eq!(halt, Halt::new(BootPhase::ResolveStage2, HaltReason::Error(EfiError::LoadError)));
    }
}
