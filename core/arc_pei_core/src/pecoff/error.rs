//! Image header errors
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use arc_sdk::error::EfiError;

pub type Result<T> = core::result::Result<T, Error>;

/// Type for describing errors that result from resolving execute-in-place images.
#[derive(Debug)]
pub enum Error {
    /// A header signature or magic did not match; holds the value found.
    BadSignature(u32),
    /// A TE header claims fewer stripped bytes than the TE header itself occupies.
    BadStrippedSize(u16),
    /// The image is too short to hold the header being read.
    Parse(scroll::Error),
    /// An address computed from the header is not representable.
    AddressOverflow,
}

impl From<scroll::Error> for Error {
    fn from(e: scroll::Error) -> Self {
        Error::Parse(e)
    }
}

impl From<Error> for EfiError {
    fn from(_: Error) -> Self {
        EfiError::LoadError
    }
}
