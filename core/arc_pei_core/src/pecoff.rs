//! Execute-in-place image resolution.
//!
//! Images in the boot volumes run from the address their section is mapped at; nothing is copied or relocated.
//! Resolving an image therefore only validates its headers and computes run-time addresses from them.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use arc_pi::pe::{
    FileHeader, OptionalHeader32, TeHeader, DOS_LFANEW_OFFSET, DOS_SIGNATURE, NT_OPTIONAL_HDR32_MAGIC, NT_SIGNATURE,
    TE_HEADER_SIZE, TE_SIGNATURE,
};
use scroll::{Pread, LE};

pub mod error;

use error::Error;

/// Location and entry point of a loadable image.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Run-time address of the image, which is where its section payload is mapped.
    pub image_address: u64,
    /// SizeOfImage from the optional header.
    pub image_size: u64,
    /// Run-time address of the entry point.
    pub entry_point: u64,
}

/// Resolves the run-time entry point of a TE image mapped at `image_address`.
///
/// The image was linked as a PE32 whose leading `stripped_size` header bytes were replaced by the TE header, so
/// `entry = image_address - stripped_size + size_of(TE header) + address_of_entry_point`.
///
/// ## Errors
///
/// Returns [`Error::BadSignature`] for a non-TE image, [`Error::BadStrippedSize`] for an inconsistent header and
/// [`Error::AddressOverflow`] if the entry point is not addressable.
pub fn resolve_entry_point(image: &[u8], image_address: u64) -> error::Result<u64> {
    let header: TeHeader = image.pread_with(0, LE)?;
    if header.signature != TE_SIGNATURE {
        return Err(Error::BadSignature(header.signature as u32));
    }
    if (header.stripped_size as usize) < TE_HEADER_SIZE {
        return Err(Error::BadStrippedSize(header.stripped_size));
    }

    let entry_point = image_address
        .checked_sub(header.stripped_size as u64)
        .and_then(|base| base.checked_add(TE_HEADER_SIZE as u64))
        .and_then(|base| base.checked_add(header.address_of_entry_point as u64))
        .ok_or(Error::AddressOverflow)?;

    log::debug!(
        "TE image at {:#x}: stripped {:#x}, entry offset {:#x}, entry {:#x}",
        image_address,
        header.stripped_size,
        header.address_of_entry_point,
        entry_point
    );
    Ok(entry_point)
}

/// Validates the DOS, NT and PE32 optional headers of an image mapped at `image_address` and describes it.
///
/// The image executes in place, so its load address is `image_address`.
pub fn resolve_loadable_pe(image: &[u8], image_address: u64) -> error::Result<ImageInfo> {
    let dos_magic: u16 = image.pread_with(0, LE)?;
    if dos_magic != DOS_SIGNATURE {
        log::error!("Bad image signature {:#x}", dos_magic);
        return Err(Error::BadSignature(dos_magic as u32));
    }

    let mut offset = image.pread_with::<u32>(DOS_LFANEW_OFFSET, LE)? as usize;
    let signature: u32 = image.gread_with(&mut offset, LE)?;
    if signature != NT_SIGNATURE {
        log::error!("Bad image signature {:#x}", signature);
        return Err(Error::BadSignature(signature));
    }

    let file_header: FileHeader = image.gread_with(&mut offset, LE)?;
    let optional_header: OptionalHeader32 = image.gread_with(&mut offset, LE)?;
    if optional_header.magic != NT_OPTIONAL_HDR32_MAGIC {
        log::error!("Bad image signature {:#x}", optional_header.magic);
        return Err(Error::BadSignature(optional_header.magic as u32));
    }

    let entry_point =
        image_address.checked_add(optional_header.address_of_entry_point as u64).ok_or(Error::AddressOverflow)?;

    log::debug!("Machine:       {:#x}", file_header.machine);
    log::debug!("Code size:     {:#x}", optional_header.size_of_code);
    log::debug!("Entry:         {:#x}", optional_header.address_of_entry_point);
    log::debug!("Image base:    {:#x}", optional_header.image_base);
    log::debug!("Image size:    {:#x}", optional_header.size_of_image);
    log::debug!("Alignment:     {:#x}", optional_header.section_alignment);

    Ok(ImageInfo { image_address, image_size: optional_header.size_of_image as u64, entry_point })
}
