//! Software development kit shared by the Arc boot cores.
//!
//! Provides the status taxonomy used by every core ([error]), small base helpers ([base]), the serial
//! transport interface ([serial]) and a [log] facade backend that writes to it.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(not(test), no_std)]

pub mod base;
pub mod error;
pub mod log;
pub mod serial;
