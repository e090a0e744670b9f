//! Well-known GUIDs used by the boot cores.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use r_efi::efi;

/// EFI_FIRMWARE_FILE_SYSTEM2_GUID
///
/// (`8C8CE578-8A3D-4F1C-9935-896185C32DD3`)
pub const FIRMWARE_FILE_SYSTEM2: efi::Guid =
    efi::Guid::from_fields(0x8c8ce578, 0x8a3d, 0x4f1c, 0x99, 0x35, &[0x89, 0x61, 0x85, 0xc3, 0x2d, 0xd3]);

/// PEI_APRIORI_FILE_NAME_GUID. Names the freeform file whose raw section lists modules in dispatch order.
///
/// (`1B45CC0A-156A-428A-AF62-49864DA0E6E6`)
pub const PEI_APRIORI_FILE_NAME: efi::Guid =
    efi::Guid::from_fields(0x1b45cc0a, 0x156a, 0x428a, 0xaf, 0x62, &[0x49, 0x86, 0x4d, 0xa0, 0xe6, 0xe6]);

/// EFI_DXE_IPL_PPI_GUID
///
/// (`AE8CE5D-E448-4437-A8D7-EBF5F194F731`)
pub const DXE_IPL_PPI: efi::Guid =
    efi::Guid::from_fields(0x0ae8ce5d, 0xe448, 0x4437, 0xa8, 0xd7, &[0xeb, 0xf5, 0xf1, 0x94, 0xf7, 0x31]);
