//! Error types and conversions for the Firmware File System (FFS) crate.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use arc_sdk::error::EfiError;
use r_efi::efi;

/// Error definitions for Firmware File System
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmwareFileSystemError {
    /// The volume header is invalid or malformed.
    InvalidHeader,
    /// A parameter provided to a function is invalid.
    InvalidParameter,
    /// The requested operation or feature is unsupported.
    Unsupported,
    /// A file or section size or offset runs outside its enclosing range.
    DataCorrupt,
    /// The container is well formed but holds no matching entity.
    NotFound,
    /// Composing the FFS structure failed.
    ComposeFailed,
}

impl From<FirmwareFileSystemError> for EfiError {
    fn from(value: FirmwareFileSystemError) -> Self {
        match value {
            FirmwareFileSystemError::InvalidParameter => EfiError::InvalidParameter,
            FirmwareFileSystemError::Unsupported => EfiError::Unsupported,
            FirmwareFileSystemError::InvalidHeader | FirmwareFileSystemError::DataCorrupt => EfiError::VolumeCorrupted,
            FirmwareFileSystemError::NotFound => EfiError::NotFound,
            FirmwareFileSystemError::ComposeFailed => EfiError::DeviceError,
        }
    }
}

impl From<FirmwareFileSystemError> for efi::Status {
    fn from(value: FirmwareFileSystemError) -> Self {
        let err: EfiError = value.into();
        err.into()
    }
}

impl From<scroll::Error> for FirmwareFileSystemError {
    fn from(_: scroll::Error) -> Self {
        FirmwareFileSystemError::DataCorrupt
    }
}
