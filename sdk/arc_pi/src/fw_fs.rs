//! Firmware Volume and Firmware File System (FFS) layouts.
//!
//! Based on the UEFI PI Specification Volume 3.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

pub mod ffs;
pub mod fv;
