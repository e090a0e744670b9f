//! Firmware File System (FFS) section parsing.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use arc_pi::fw_fs::ffs::{self, section};
use arc_sdk::base::align_offset_up;
use scroll::Pread;

use crate::{FirmwareFileSystemError, Result};

/// Size of EFI_COMMON_SECTION_HEADER2, used when the 24-bit size field is saturated.
pub const HEADER2_SIZE: usize = section::HEADER_SIZE + 4;

/// 24-bit size value that marks an extended section header.
const EXTENDED_SIZE_MARKER: u32 = 0x00FF_FFFF;

/// Zero-copy view over one section of a file.
#[derive(Debug, Clone, Copy)]
pub struct SectionRef<'a> {
    data: &'a [u8],
    section_type: u8,
    header_size: usize,
    offset: usize,
    address: u64,
}

impl<'a> SectionRef<'a> {
    /// The raw section type byte.
    pub fn section_type(&self) -> u8 {
        self.section_type
    }

    /// Total size of the section in bytes (header + content).
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Size of the section header in bytes.
    pub fn header_size(&self) -> usize {
        self.header_size
    }

    /// Offset of the section from the start of the volume.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Run-time address of the section header.
    pub fn address(&self) -> u64 {
        self.address
    }

    /// The complete section bytes, including the header.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The section payload.
    pub fn content(&self) -> &'a [u8] {
        &self.data[self.header_size..]
    }

    /// Run-time address of the section payload.
    pub fn content_address(&self) -> u64 {
        self.address + self.header_size as u64
    }
}

/// Iterator over the sections of a file.
///
/// Each section starts at the next 4-byte aligned volume offset after the previous one. A malformed section
/// yields one error and ends the iteration.
pub struct SectionRefIter<'a> {
    file: &'a [u8],
    file_offset: usize,
    file_address: u64,
    next_offset: usize,
    error: bool,
}

impl<'a> SectionRefIter<'a> {
    pub(crate) fn new(file: &'a [u8], file_offset: usize, file_address: u64, header_size: usize) -> Self {
        Self { file, file_offset, file_address, next_offset: header_size, error: false }
    }

    fn parse_at(&self, position: usize) -> Result<SectionRef<'a>> {
        let remaining = &self.file[position..];
        let header: section::Header = remaining.pread_with(0, scroll::LE)?;

        let (size, header_size) = match arc_pi::size24(header.size) {
            EXTENDED_SIZE_MARKER => (remaining.pread_with::<u32>(section::HEADER_SIZE, scroll::LE)?, HEADER2_SIZE),
            size => (size, section::HEADER_SIZE),
        };
        let size = size as usize;

        if size < header_size {
            Err(FirmwareFileSystemError::DataCorrupt)?;
        }
        if size > remaining.len() {
            Err(FirmwareFileSystemError::DataCorrupt)?;
        }

        Ok(SectionRef {
            data: &remaining[..size],
            section_type: header.section_type,
            header_size,
            offset: self.file_offset + position,
            address: self.file_address + position as u64,
        })
    }
}

impl<'a> Iterator for SectionRefIter<'a> {
    type Item = Result<SectionRef<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error {
            return None;
        }

        // Alignment is relative to the volume, the file itself starts on an 8-byte boundary.
        let position = align_offset_up(self.file_offset + self.next_offset, ffs::SECTION_ALIGNMENT)
            .map(|aligned| aligned - self.file_offset);
        let Some(position) = position else {
            self.error = true;
            return Some(Err(FirmwareFileSystemError::DataCorrupt));
        };
        if position >= self.file.len() {
            return None;
        }

        let result = self.parse_at(position);
        match result {
            Ok(ref section) => self.next_offset = position + section.size(),
            Err(_) => {
                log::error!("section at {:#x} is malformed", self.file_address + position as u64);
                self.error = true;
            }
        }
        Some(result)
    }
}
