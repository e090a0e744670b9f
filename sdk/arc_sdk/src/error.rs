//! Module for converting UEFI errors to rusty errors.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// A specialized [`Result`](core::result::Result) type for boot core operations.
pub type Result<T> = core::result::Result<T, EfiError>;

use r_efi::efi;

/// EDK II Error Code equivalent as a Rust Error enum
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EfiError {
    /// An executable header failed a magic or signature check.
    LoadError,
    /// A required argument was malformed.
    InvalidParameter,
    /// The feature is intentionally not provided.
    Unsupported,
    BadBufferSize,
    BufferTooSmall,
    NotReady,
    DeviceError,
    WriteProtected,
    /// A fixed capacity table would overflow.
    OutOfResources,
    /// A container's internal size or offset invariants were violated.
    VolumeCorrupted,
    VolumeFull,
    NoMedia,
    MediaChanged,
    /// The container is valid but the requested entity is absent.
    NotFound,
    AccessDenied,
    NoResponse,
    NoMapping,
    Timeout,
    NotStarted,
    AlreadyStarted,
    Aborted,
    IncompatibleVersion,
    SecurityViolation,
    CrcError,
    EndOfMedia,
    EndOfFile,
    CompromisedData,
}

impl EfiError {
    /// Converts an [efi::Status] into a [Result], where any non-success code becomes the matching [EfiError].
    ///
    /// Status codes without a dedicated variant map to [EfiError::DeviceError].
    pub fn status_to_result(status: efi::Status) -> Result<()> {
        match status {
            efi::Status::SUCCESS => Ok(()),
            efi::Status::LOAD_ERROR => Err(EfiError::LoadError),
            efi::Status::INVALID_PARAMETER => Err(EfiError::InvalidParameter),
            efi::Status::UNSUPPORTED => Err(EfiError::Unsupported),
            efi::Status::BAD_BUFFER_SIZE => Err(EfiError::BadBufferSize),
            efi::Status::BUFFER_TOO_SMALL => Err(EfiError::BufferTooSmall),
            efi::Status::NOT_READY => Err(EfiError::NotReady),
            efi::Status::WRITE_PROTECTED => Err(EfiError::WriteProtected),
            efi::Status::OUT_OF_RESOURCES => Err(EfiError::OutOfResources),
            efi::Status::VOLUME_CORRUPTED => Err(EfiError::VolumeCorrupted),
            efi::Status::VOLUME_FULL => Err(EfiError::VolumeFull),
            efi::Status::NO_MEDIA => Err(EfiError::NoMedia),
            efi::Status::MEDIA_CHANGED => Err(EfiError::MediaChanged),
            efi::Status::NOT_FOUND => Err(EfiError::NotFound),
            efi::Status::ACCESS_DENIED => Err(EfiError::AccessDenied),
            efi::Status::NO_RESPONSE => Err(EfiError::NoResponse),
            efi::Status::NO_MAPPING => Err(EfiError::NoMapping),
            efi::Status::TIMEOUT => Err(EfiError::Timeout),
            efi::Status::NOT_STARTED => Err(EfiError::NotStarted),
            efi::Status::ALREADY_STARTED => Err(EfiError::AlreadyStarted),
            efi::Status::ABORTED => Err(EfiError::Aborted),
            efi::Status::INCOMPATIBLE_VERSION => Err(EfiError::IncompatibleVersion),
            efi::Status::SECURITY_VIOLATION => Err(EfiError::SecurityViolation),
            efi::Status::CRC_ERROR => Err(EfiError::CrcError),
            efi::Status::END_OF_MEDIA => Err(EfiError::EndOfMedia),
            efi::Status::END_OF_FILE => Err(EfiError::EndOfFile),
            efi::Status::COMPROMISED_DATA => Err(EfiError::CompromisedData),
            _ => Err(EfiError::DeviceError),
        }
    }
}

impl From<EfiError> for efi::Status {
    fn from(e: EfiError) -> efi::Status {
        match e {
            EfiError::LoadError => efi::Status::LOAD_ERROR,
            EfiError::InvalidParameter => efi::Status::INVALID_PARAMETER,
            EfiError::Unsupported => efi::Status::UNSUPPORTED,
            EfiError::BadBufferSize => efi::Status::BAD_BUFFER_SIZE,
            EfiError::BufferTooSmall => efi::Status::BUFFER_TOO_SMALL,
            EfiError::NotReady => efi::Status::NOT_READY,
            EfiError::DeviceError => efi::Status::DEVICE_ERROR,
            EfiError::WriteProtected => efi::Status::WRITE_PROTECTED,
            EfiError::OutOfResources => efi::Status::OUT_OF_RESOURCES,
            EfiError::VolumeCorrupted => efi::Status::VOLUME_CORRUPTED,
            EfiError::VolumeFull => efi::Status::VOLUME_FULL,
            EfiError::NoMedia => efi::Status::NO_MEDIA,
            EfiError::MediaChanged => efi::Status::MEDIA_CHANGED,
            EfiError::NotFound => efi::Status::NOT_FOUND,
            EfiError::AccessDenied => efi::Status::ACCESS_DENIED,
            EfiError::NoResponse => efi::Status::NO_RESPONSE,
            EfiError::NoMapping => efi::Status::NO_MAPPING,
            EfiError::Timeout => efi::Status::TIMEOUT,
            EfiError::NotStarted => efi::Status::NOT_STARTED,
            EfiError::AlreadyStarted => efi::Status::ALREADY_STARTED,
            EfiError::Aborted => efi::Status::ABORTED,
            EfiError::IncompatibleVersion => efi::Status::INCOMPATIBLE_VERSION,
            EfiError::SecurityViolation => efi::Status::SECURITY_VIOLATION,
            EfiError::CrcError => efi::Status::CRC_ERROR,
            EfiError::EndOfMedia => efi::Status::END_OF_MEDIA,
            EfiError::EndOfFile => efi::Status::END_OF_FILE,
            EfiError::CompromisedData => efi::Status::COMPROMISED_DATA,
        }
    }
}
