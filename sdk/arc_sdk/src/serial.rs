//! Diagnostic serial output.
//!
//! The boot cores only ever write diagnostic text. The port itself belongs to the board, which supplies a
//! [SerialIO] implementation to [SerialLogger](crate::log::SerialLogger).
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// A write-only byte channel for diagnostic text.
#[cfg_attr(test, mockall::automock)]
pub trait SerialIO: Sync {
    /// Prepares the port. Called once, before the first write.
    fn init(&self);
    /// Writes `buffer`, blocking until the port has accepted every byte.
    fn write(&self, buffer: &[u8]);
}

mod uart_null;
pub use uart_null::Uart as UartNull;
