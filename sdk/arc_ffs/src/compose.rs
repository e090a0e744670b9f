//! Firmware volume composition.
//!
//! Owned builders that serialize [`Volume`], [`File`] and [`Section`] descriptions into PI conforming byte
//! images. Host tools use these to produce boot volumes, and the boot cores use them to synthesize images in
//! tests. Builders only lay data out: files are placed on 8-byte and sections on 4-byte boundaries, headers
//! carry valid checksums, and unused space is filled with the erase byte.
//!
//! ## Examples
//!
//! ```rust ignore
//! use arc_ffs::{compose::{File, Section, Volume}, VolumeRef};
//! use arc_pi::fw_fs::ffs::{file::raw::r#type as file_type, section::raw_type};
//! use r_efi::efi;
//!
//! let name = efi::Guid::from_fields(0, 0, 0, 0, 0, &[0, 0, 0, 0, 0, 1]);
//! let bytes = Volume::new()
//!     .with_file(File::new(name, file_type::PEIM).with_section(Section::new(raw_type::RAW, vec![1, 2, 3])))
//!     .serialize()
//!     .unwrap();
//! let volume = VolumeRef::new(&bytes).unwrap();
//! assert_eq!(volume.find_file(file_type::PEIM, Some(&name)).unwrap().name(), name);
//! ```
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::{vec, vec::Vec};
use arc_pi::{
    fw_fs::{
        ffs::{
            self,
            file::{self, raw::attributes, raw::state},
            section,
        },
        fv,
    },
    guids,
};
use arc_sdk::base::align_offset_up;
use r_efi::efi;
use scroll::Pwrite;

use crate::{FirmwareFileSystemError, Result};

fn aligned(offset: usize, align: usize) -> Result<usize> {
    align_offset_up(offset, align).ok_or(FirmwareFileSystemError::ComposeFailed)
}

/// A leaf section with a common (24-bit size) header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    section_type: u8,
    data: Vec<u8>,
    declared_size: Option<u32>,
}

impl Section {
    /// Creates a section of `section_type` holding `data`.
    pub fn new(section_type: u8, data: Vec<u8>) -> Self {
        Self { section_type, data, declared_size: None }
    }

    /// Writes `size` into the header instead of the real size. Used to produce malformed images.
    pub fn with_declared_size(mut self, size: u32) -> Self {
        self.declared_size = Some(size);
        self
    }

    /// Serializes header and payload.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let size = section::HEADER_SIZE + self.data.len();
        let declared = match self.declared_size {
            Some(declared) => declared,
            None => u32::try_from(size).map_err(|_| FirmwareFileSystemError::ComposeFailed)?,
        };
        let header = section::Header {
            size: arc_pi::to_size24(declared).ok_or(FirmwareFileSystemError::ComposeFailed)?,
            section_type: self.section_type,
        };

        let mut bytes = vec![0u8; section::HEADER_SIZE];
        bytes.pwrite_with(header, 0, scroll::LE).map_err(|_| FirmwareFileSystemError::ComposeFailed)?;
        bytes.extend_from_slice(&self.data);
        Ok(bytes)
    }
}

/// A file made of sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    name: efi::Guid,
    file_type: u8,
    attributes: u8,
    sections: Vec<Section>,
    declared_size: Option<u32>,
}

impl File {
    /// Creates an empty file.
    pub fn new(name: efi::Guid, file_type: u8) -> Self {
        Self { name, file_type, attributes: 0, sections: Vec::new(), declared_size: None }
    }

    /// Sets the EFI_FFS_FILE_ATTRIBUTES byte. [`attributes::LARGE_FILE`] selects the extended header.
    pub fn with_attributes(mut self, attributes: u8) -> Self {
        self.attributes = attributes;
        self
    }

    /// Appends a section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Writes `size` into the header instead of the real size. Used to produce malformed images.
    pub fn with_declared_size(mut self, size: u32) -> Self {
        self.declared_size = Some(size);
        self
    }

    /// Serializes the file as it would be stored in a volume whose erase polarity is set.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        self.serialize_with(true)
    }

    fn serialize_with(&self, erase_polarity: bool) -> Result<Vec<u8>> {
        let large = self.attributes & attributes::LARGE_FILE != 0;
        let header_size = if large { crate::file::HEADER2_SIZE } else { file::HEADER_SIZE };

        let mut bytes = vec![0u8; header_size];
        for section in &self.sections {
            bytes.resize(aligned(bytes.len(), ffs::SECTION_ALIGNMENT)?, 0);
            bytes.extend_from_slice(&section.serialize()?);
        }

        let size = match self.declared_size {
            Some(declared) => declared as u64,
            None => bytes.len() as u64,
        };
        let size24 = if large {
            [0u8; 3]
        } else {
            u32::try_from(size).ok().and_then(arc_pi::to_size24).ok_or(FirmwareFileSystemError::ComposeFailed)?
        };

        let mut header = file::Header {
            name: *self.name.as_bytes(),
            integrity_check_header: 0,
            integrity_check_file: 0,
            file_type: self.file_type,
            attributes: self.attributes,
            size: size24,
            state: 0,
        };
        bytes.pwrite_with(header, 0, scroll::LE).map_err(|_| FirmwareFileSystemError::ComposeFailed)?;
        if large {
            bytes.pwrite_with(size, file::HEADER_SIZE, scroll::LE).map_err(|_| FirmwareFileSystemError::ComposeFailed)?;
        }

        // The header checksum covers the header with both integrity bytes and the state byte zeroed.
        let sum = bytes[..header_size].iter().fold(0u8, |sum, b| sum.wrapping_add(*b));
        header.integrity_check_header = 0u8.wrapping_sub(sum);
        header.integrity_check_file = file::FFS_FIXED_CHECKSUM;
        let valid = state::HEADER_CONSTRUCTION | state::HEADER_VALID | state::DATA_VALID;
        header.state = if erase_polarity { !valid } else { valid };
        bytes.pwrite_with(header, 0, scroll::LE).map_err(|_| FirmwareFileSystemError::ComposeFailed)?;

        Ok(bytes)
    }
}

/// An FFS2 firmware volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    file_system_guid: efi::Guid,
    erase_polarity: bool,
    length: Option<u64>,
    files: Vec<File>,
}

impl Default for Volume {
    fn default() -> Self {
        Self::new()
    }
}

impl Volume {
    /// Creates an empty FFS2 volume with erase polarity set.
    pub fn new() -> Self {
        Self { file_system_guid: guids::FIRMWARE_FILE_SYSTEM2, erase_polarity: true, length: None, files: Vec::new() }
    }

    /// Overrides the file system GUID.
    pub fn with_file_system_guid(mut self, guid: efi::Guid) -> Self {
        self.file_system_guid = guid;
        self
    }

    /// Selects whether erased bytes read as 0xFF (`true`) or 0x00.
    pub fn with_erase_polarity(mut self, erase_polarity: bool) -> Self {
        self.erase_polarity = erase_polarity;
        self
    }

    /// Sets the total volume length. Space after the last file is filled with the erase byte.
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    /// Appends a file.
    pub fn with_file(mut self, file: File) -> Self {
        self.files.push(file);
        self
    }

    /// Serializes the volume.
    ///
    /// The header is followed by an empty block map, so the header length is 64 bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let erase_byte = if self.erase_polarity { 0xff } else { 0 };
        let header_length = fv::HEADER_SIZE + fv::BLOCK_MAP_ENTRY_SIZE;

        let mut bytes = vec![0u8; header_length];
        for file in &self.files {
            bytes.resize(aligned(bytes.len(), ffs::FILE_ALIGNMENT)?, erase_byte);
            bytes.extend_from_slice(&file.serialize_with(self.erase_polarity)?);
        }

        let used = aligned(bytes.len(), ffs::FILE_ALIGNMENT)?;
        let length = match self.length {
            Some(length) => usize::try_from(length).map_err(|_| FirmwareFileSystemError::ComposeFailed)?,
            None => used,
        };
        if length < used {
            Err(FirmwareFileSystemError::ComposeFailed)?;
        }
        bytes.resize(length, erase_byte);

        let mut attributes = fv::attributes::READ_STATUS | fv::attributes::MEMORY_MAPPED;
        if self.erase_polarity {
            attributes |= fv::attributes::ERASE_POLARITY;
        }
        let mut header = fv::Header {
            zero_vector: [0; 16],
            file_system_guid: *self.file_system_guid.as_bytes(),
            fv_length: length as u64,
            signature: fv::SIGNATURE,
            attributes,
            header_length: header_length as u16,
            checksum: 0,
            ext_header_offset: 0,
            reserved: 0,
            revision: 2,
        };
        bytes.pwrite_with(header, 0, scroll::LE).map_err(|_| FirmwareFileSystemError::ComposeFailed)?;

        // Header words, block map included, sum to zero.
        let sum = bytes[..header_length]
            .chunks_exact(2)
            .fold(0u16, |sum, word| sum.wrapping_add(u16::from_le_bytes([word[0], word[1]])));
        header.checksum = 0u16.wrapping_sub(sum);
        bytes.pwrite_with(header, 0, scroll::LE).map_err(|_| FirmwareFileSystemError::ComposeFailed)?;

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arc_pi::fw_fs::ffs::{file::raw::r#type as file_type, section::raw_type};

    const NAME: efi::Guid =
        efi::Guid::from_fields(0x6b0a1c2d, 0x3e4f, 0x4a5b, 0x8c, 0x9d, &[0xa1, 0xb2, 0xc3, 0xd4, 0xe5, 0xf6]);

    #[test]
    fn volume_header_checksum_should_sum_to_zero() {
        let bytes = Volume::new().with_file(File::new(NAME, file_type::PEIM)).serialize().unwrap();
        let sum = bytes[..64].chunks_exact(2).fold(0u16, |sum, w| sum.wrapping_add(u16::from_le_bytes([w[0], w[1]])));
        assert_eq!(sum, 0);
    }

    #[test]
    fn file_header_checksum_should_sum_to_zero() {
        let bytes = File::new(NAME, file_type::PEIM).with_section(Section::new(raw_type::RAW, vec![3; 9])).serialize();
        let bytes = bytes.unwrap();
        let sum = bytes[..file::HEADER_SIZE].iter().fold(0u8, |sum, b| sum.wrapping_add(*b));
        // state and integrity_check_file are excluded from the header checksum.
        let sum = sum.wrapping_sub(bytes[23]).wrapping_sub(bytes[17]);
        assert_eq!(sum, 0);
        assert_eq!(bytes[17], file::FFS_FIXED_CHECKSUM);
    }

    #[test]
    fn sections_should_be_padded_to_four_bytes() {
        let bytes = File::new(NAME, file_type::PEIM)
            .with_section(Section::new(raw_type::RAW, vec![1; 1]))
            .with_section(Section::new(raw_type::RAW, vec![2; 1]))
            .serialize()
            .unwrap();
        // 24 byte header, 5 byte section, 3 bytes of padding, 5 byte section.
        assert_eq!(bytes.len(), 37);
        assert_eq!(arc_pi::size24([bytes[20], bytes[21], bytes[22]]), 37);
        assert_eq!(bytes[32..36], [5, 0, 0, raw_type::RAW]);
    }

    #[test]
    fn serialize_should_reject_length_shorter_than_content() {
        let volume = Volume::new().with_file(File::new(NAME, file_type::PEIM)).with_length(64);
        assert_eq!(volume.serialize().unwrap_err(), FirmwareFileSystemError::ComposeFailed);
    }
}
