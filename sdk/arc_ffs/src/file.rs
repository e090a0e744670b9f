//! Firmware File System (FFS) file parsing.
//!
//! A [`FileRef`] is a zero-copy view over one file inside a volume. It knows its offset from the start of the
//! volume and the address it is executed from, so sections found inside it can report run-time addresses.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use arc_pi::fw_fs::ffs::file::{self, raw::attributes};
use r_efi::efi;
use scroll::Pread;

use crate::{
    section::{SectionRef, SectionRefIter},
    FirmwareFileSystemError, Result,
};

/// Size of EFI_FFS_FILE_HEADER2, which appends a 64-bit size to the standard header.
pub const HEADER2_SIZE: usize = file::HEADER_SIZE + 8;

/// Zero-copy view over a Firmware File System (FFS) file backed by a byte slice.
#[derive(Debug, Clone, Copy)]
pub struct FileRef<'a> {
    data: &'a [u8],
    header: file::Header,
    header_size: usize,
    offset: usize,
    address: u64,
}

impl<'a> FileRef<'a> {
    /// Parses the file that starts at the beginning of `buffer`.
    ///
    /// `buffer` runs to the end of the enclosing volume, `offset` is the position of the file inside the volume
    /// and `address` its run-time address.
    ///
    /// Errors
    /// - [`FirmwareFileSystemError::DataCorrupt`]: the declared size is smaller than the header, or the file
    ///   ends past the end of `buffer`.
    pub(crate) fn new(buffer: &'a [u8], offset: usize, address: u64) -> Result<Self> {
        let header: file::Header = buffer.pread_with(0, scroll::LE)?;

        let (size, header_size) = if header.attributes & attributes::LARGE_FILE == 0 {
            (arc_pi::size24(header.size) as u64, file::HEADER_SIZE)
        } else {
            let extended_size: u64 = buffer.pread_with(file::HEADER_SIZE, scroll::LE)?;
            (extended_size, HEADER2_SIZE)
        };

        if size < header_size as u64 {
            log::error!("file at {:#x} declares size {:#x}, smaller than its header", address, size);
            Err(FirmwareFileSystemError::DataCorrupt)?;
        }
        if size > buffer.len() as u64 {
            log::error!("file at {:#x} size {:#x} runs past the end of the volume", address, size);
            Err(FirmwareFileSystemError::DataCorrupt)?;
        }

        Ok(Self { data: &buffer[..size as usize], header, header_size, offset, address })
    }

    /// The file name GUID from the FFS header.
    pub fn name(&self) -> efi::Guid {
        efi::Guid::from_bytes(&self.header.name)
    }

    /// The raw FFS file type byte.
    pub fn file_type(&self) -> u8 {
        self.header.file_type
    }

    /// The raw EFI_FFS_FILE_ATTRIBUTES byte.
    pub fn attributes(&self) -> u8 {
        self.header.attributes
    }

    /// The raw EFI_FFS_FILE_STATE byte.
    pub fn state(&self) -> u8 {
        self.header.state
    }

    /// True if the file uses the extended header.
    pub fn is_large_file(&self) -> bool {
        self.header.attributes & attributes::LARGE_FILE != 0
    }

    /// Total size of the file in bytes (header + content).
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Size of the file header in bytes.
    pub fn header_size(&self) -> usize {
        self.header_size
    }

    /// Offset of the file from the start of the volume.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Run-time address of the file header.
    pub fn address(&self) -> u64 {
        self.address
    }

    /// The complete file bytes, including header and content.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The file payload bytes (sections area), excluding the header.
    pub fn content(&self) -> &'a [u8] {
        &self.data[self.header_size..]
    }

    /// Run-time address of the file payload.
    pub fn content_address(&self) -> u64 {
        self.address + self.header_size as u64
    }

    /// Iterates the sections of the file in storage order.
    pub fn sections(&self) -> SectionRefIter<'a> {
        SectionRefIter::new(self.data, self.offset, self.address, self.header_size)
    }

    /// Returns the first section of `section_type`.
    ///
    /// Errors
    /// - [`FirmwareFileSystemError::DataCorrupt`]: a section scanned before the match is malformed.
    /// - [`FirmwareFileSystemError::NotFound`]: the file has no section of that type.
    pub fn find_section(&self, section_type: u8) -> Result<SectionRef<'a>> {
        for section in self.sections() {
            let section = section?;
            if section.section_type() == section_type {
                return Ok(section);
            }
        }
        Err(FirmwareFileSystemError::NotFound)
    }

    /// Describes the file the way EFI_FV_FILE_INFO does.
    ///
    /// Errors
    /// - [`FirmwareFileSystemError::Unsupported`]: the file uses the extended header.
    pub fn file_info(&self) -> Result<FileInfo<'a>> {
        if self.is_large_file() {
            Err(FirmwareFileSystemError::Unsupported)?;
        }
        Ok(FileInfo {
            name: self.name(),
            file_type: self.file_type(),
            attributes: self.attributes(),
            buffer: self.content(),
            buffer_address: self.content_address(),
        })
    }
}

/// File metadata and payload location, as reported by `get_file_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo<'a> {
    pub name: efi::Guid,
    pub file_type: u8,
    pub attributes: u8,
    /// The payload that follows the file header.
    pub buffer: &'a [u8],
    /// Run-time address of `buffer`.
    pub buffer_address: u64,
}

impl FileInfo<'_> {
    /// Size of the payload in bytes.
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }
}
