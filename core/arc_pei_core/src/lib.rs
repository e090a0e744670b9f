//! SEC and PEI phase cores.
//!
//! Control moves strictly forward: [sec] validates the boot volume and jumps to the PEI core, the PEI core
//! ([dispatcher]) initializes modules and dispatches installed PPIs, and one of them ([dxe_ipl]) jumps to the DXE
//! core. Nothing returns to its caller; a failure anywhere ends in [cpu::halt].
//!
//! All state lives in a [services::PeiServices] value created at PEI entry and passed by reference, and the only
//! raw jumps to code addresses happen in [transfer].
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod cpu;
pub mod dispatcher;
pub mod dxe_ipl;
pub mod pecoff;
pub mod ppi_db;
pub mod sec;
pub mod services;
pub mod transfer;

#[cfg(test)]
mod test_support;

pub use config::PlatformConfig;
pub use dispatcher::{BootPhase, Halt, HaltReason};
pub use services::PeiServices;

/// Number of core firmware volumes the PEI services expose: the boot volume and the DXE volume.
pub const MAX_CORE_FV: usize = 2;
/// Volume instance that holds the DXE core.
pub const DXE_FV_INSTANCE: usize = 1;
