//! [SerialIO](crate::serial::SerialIO) for boards without a diagnostic port.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// Discards everything written to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Uart;

impl super::SerialIO for Uart {
    fn init(&self) {}

    fn write(&self, _buffer: &[u8]) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        log::{Format, SerialLogger},
        serial::SerialIO,
    };
    use ::log::Log;

    #[test]
    fn logger_over_null_port_should_accept_records() {
        let logger = SerialLogger::new(Format::Standard, &[], ::log::LevelFilter::Trace, Uart);
        logger.init();
        Uart.write(b"ignored");
        logger.log(&::log::Record::builder().level(::log::Level::Error).args(format_args!("dropped")).build());
        logger.flush();
    }
}
