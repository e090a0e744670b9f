//! CPU services the cores rely on.
//!
//! Interrupts and exceptions are not supported on this target, so the exception entry points only report
//! [EfiError::Unsupported].
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use arc_sdk::error::{EfiError, Result};

use crate::dispatcher::Halt;

/// Installs the CPU exception handlers.
pub fn install_exception_handlers() -> Result<()> {
    Err(EfiError::Unsupported)
}

/// Switches exception handling to dedicated stacks.
pub fn initialize_separate_exception_stacks() -> Result<()> {
    Err(EfiError::Unsupported)
}

/// Parks the CPU forever.
pub fn cpu_dead_loop() -> ! {
    loop {
        cfg_if::cfg_if! {
            if #[cfg(all(target_os = "none", any(target_arch = "x86_64", target_arch = "x86")))] {
                // SAFETY: interrupts are never enabled, so nothing but NMI or reset wakes the CPU.
                unsafe { core::arch::asm!("hlt", options(nomem, nostack)) };
            } else if #[cfg(all(target_os = "none", target_arch = "aarch64"))] {
                // SAFETY: waiting for an event has no memory effects.
                unsafe { core::arch::asm!("wfe", options(nomem, nostack)) };
            } else {
                core::hint::spin_loop();
            }
        }
    }
}

/// Reports why the boot stopped and where, then halts the CPU.
pub fn halt(halt: Halt) -> ! {
    log::error!(
        "-= Boot failed =- phase {:?}, reason {:?}, at {}:{}",
        halt.phase,
        halt.reason,
        halt.location.file(),
        halt.location.line()
    );
    cpu_dead_loop()
}
