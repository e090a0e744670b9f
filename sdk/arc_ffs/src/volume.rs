//! Firmware Volume (FV) parsing.
//!
//! [`VolumeRef`] is a zero-copy, read-only view over a serialized firmware volume. Files are discovered by a
//! linear scan that starts at the first 8-byte aligned offset past the volume header and advances to the next
//! 8-byte aligned offset after each file.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use arc_pi::{
    fw_fs::{
        ffs::{self, file},
        fv,
    },
    guids,
};
use arc_sdk::base::align_offset_up;
use core::slice;
use r_efi::efi;
use scroll::Pread;

use crate::{
    file::FileRef,
    section::SectionRef,
    FirmwareFileSystemError, Result,
};

/// Zero-copy view over a Firmware Volume backed by a byte slice.
///
/// The slice covers exactly `fv_length` bytes. `base_address` is the address the first byte of the volume is
/// executed from; all addresses handed out by files and sections are derived from it.
#[derive(Debug, Clone, Copy)]
pub struct VolumeRef<'a> {
    data: &'a [u8],
    header: fv::Header,
    base_address: u64,
}

impl<'a> VolumeRef<'a> {
    /// Validates the volume header in `buffer` and returns a view whose base address is the buffer's own address.
    ///
    /// Errors
    /// - [`FirmwareFileSystemError::InvalidHeader`]: bad signature, inconsistent lengths, or truncated buffer.
    /// - [`FirmwareFileSystemError::Unsupported`]: the volume is not an FFS2 file system.
    pub fn new(buffer: &'a [u8]) -> Result<Self> {
        Self::new_at(buffer, buffer.as_ptr() as u64)
    }

    /// Validates the volume header in `buffer` and returns a view that reports addresses relative to
    /// `base_address`.
    pub fn new_at(buffer: &'a [u8], base_address: u64) -> Result<Self> {
        let header: fv::Header = buffer.pread_with(0, scroll::LE).map_err(|_| FirmwareFileSystemError::InvalidHeader)?;

        if header.signature != fv::SIGNATURE {
            Err(FirmwareFileSystemError::InvalidHeader)?;
        }

        if efi::Guid::from_bytes(&header.file_system_guid) != guids::FIRMWARE_FILE_SYSTEM2 {
            Err(FirmwareFileSystemError::Unsupported)?;
        }

        // The header, block map included, must fit inside the declared volume, and the volume inside the buffer.
        if (header.header_length as usize) < fv::HEADER_SIZE || header.header_length as u64 > header.fv_length {
            Err(FirmwareFileSystemError::InvalidHeader)?;
        }
        let length = usize::try_from(header.fv_length).map_err(|_| FirmwareFileSystemError::InvalidHeader)?;
        if length > buffer.len() {
            Err(FirmwareFileSystemError::InvalidHeader)?;
        }

        base_address.checked_add(header.fv_length).ok_or(FirmwareFileSystemError::InvalidHeader)?;

        Ok(Self { data: &buffer[..length], header, base_address })
    }

    /// Creates a view over a volume that is mapped at `base_address`.
    ///
    /// ## Safety
    ///
    /// `base_address` must be readable for at least the size of a volume header, and for `fv_length` bytes if the
    /// header carries a valid signature. The memory must remain mapped and unmodified for `'a`.
    pub unsafe fn new_from_address(base_address: u64) -> Result<Self> {
        // SAFETY: the caller guarantees a readable header at base_address.
        let header_bytes = unsafe { slice::from_raw_parts(base_address as usize as *const u8, fv::HEADER_SIZE) };
        let header: fv::Header = header_bytes.pread_with(0, scroll::LE)?;
        if header.signature != fv::SIGNATURE {
            // base_address is not the start of a firmware volume.
            return Err(FirmwareFileSystemError::InvalidHeader);
        }

        let length = usize::try_from(header.fv_length).map_err(|_| FirmwareFileSystemError::InvalidHeader)?;
        // SAFETY: the caller guarantees the declared volume length is readable.
        let fv_buffer = unsafe { slice::from_raw_parts(base_address as usize as *const u8, length) };
        Self::new_at(fv_buffer, base_address)
    }

    /// The decoded volume header.
    pub fn header(&self) -> &fv::Header {
        &self.header
    }

    /// Total size of the volume in bytes.
    pub fn size(&self) -> u64 {
        self.header.fv_length
    }

    /// Length of the header including the block map.
    pub fn header_length(&self) -> usize {
        self.header.header_length as usize
    }

    /// Address the volume is executed from.
    pub fn base_address(&self) -> u64 {
        self.base_address
    }

    /// The EFI_FVB_ATTRIBUTES_2 of the volume.
    pub fn attributes(&self) -> u32 {
        self.header.attributes
    }

    /// The value of an erased byte in this volume.
    pub fn erase_byte(&self) -> u8 {
        if self.header.attributes & fv::attributes::ERASE_POLARITY != 0 {
            0xff
        } else {
            0
        }
    }

    /// The complete volume bytes.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Iterates the files of the volume in storage order.
    ///
    /// The iterator ends at the volume end or at free space, and yields a single error then stops if a file
    /// header is corrupt.
    pub fn files(&self) -> FileRefIter<'a> {
        FileRefIter::new(*self, self.header_length())
    }

    /// Iterates the files that follow `previous`, or all files if `previous` is `None`.
    pub fn files_after(&self, previous: Option<&FileRef<'a>>) -> FileRefIter<'a> {
        match previous {
            Some(file) => FileRefIter::new(*self, file.offset() + file.size()),
            None => self.files(),
        }
    }

    /// Returns the first file of `file_type`, restricted to the given name when `name` is supplied.
    ///
    /// Errors
    /// - [`FirmwareFileSystemError::DataCorrupt`]: a file scanned before the match runs past the volume end.
    /// - [`FirmwareFileSystemError::NotFound`]: the volume holds no matching file.
    pub fn find_file(&self, file_type: u8, name: Option<&efi::Guid>) -> Result<FileRef<'a>> {
        find_in(self.files(), file_type, name)
    }

    /// Returns the first file of `file_type` that follows `previous` in storage order.
    pub fn find_next_file(&self, file_type: u8, previous: Option<&FileRef<'a>>) -> Result<FileRef<'a>> {
        find_in(self.files_after(previous), file_type, None)
    }

    /// Returns the first section of `section_type` in the first file matching `file_type` and `name`.
    ///
    /// Only the first matching file is searched.
    pub fn find_file_section(
        &self,
        file_type: u8,
        section_type: u8,
        name: Option<&efi::Guid>,
    ) -> Result<SectionRef<'a>> {
        self.find_file(file_type, name)?.find_section(section_type)
    }

    /// Returns true if `address` lies inside the volume.
    pub fn contains(&self, address: u64) -> bool {
        address >= self.base_address && address - self.base_address < self.header.fv_length
    }
}

fn find_in<'a>(files: FileRefIter<'a>, file_type: u8, name: Option<&efi::Guid>) -> Result<FileRef<'a>> {
    for file in files {
        let file = file?;
        log::trace!(
            "file at {:#x} type {:#x} name {:?}",
            file.address(),
            file.file_type(),
            uuid::Uuid::from_bytes_le(*file.name().as_bytes())
        );
        if file.file_type() == file_type && name.map_or(true, |name| *name == file.name()) {
            return Ok(file);
        }
    }
    Err(FirmwareFileSystemError::NotFound)
}

/// Iterator over the files of a [`VolumeRef`].
pub struct FileRefIter<'a> {
    volume: VolumeRef<'a>,
    next_offset: usize,
    error: bool,
}

impl<'a> FileRefIter<'a> {
    fn new(volume: VolumeRef<'a>, next_offset: usize) -> Self {
        Self { volume, next_offset, error: false }
    }

    fn parse_at(&self, offset: usize) -> Option<Result<FileRef<'a>>> {
        let data = self.volume.data;
        let remaining = &data[offset..];

        // Less than a header left, or a header that was never written, is the end of the file list.
        if remaining.len() < file::HEADER_SIZE {
            return None;
        }
        if remaining[..file::HEADER_SIZE].iter().all(|&b| b == self.volume.erase_byte()) {
            return None;
        }

        Some(FileRef::new(remaining, offset, self.volume.base_address + offset as u64))
    }
}

impl<'a> Iterator for FileRefIter<'a> {
    type Item = Result<FileRef<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error {
            return None;
        }

        // Per the PI spec, the next file is located at the next 8-byte aligned offset following the last byte of
        // the previous file.
        let Some(offset) = align_offset_up(self.next_offset, ffs::FILE_ALIGNMENT) else {
            self.error = true;
            return Some(Err(FirmwareFileSystemError::DataCorrupt));
        };
        if offset >= self.volume.data.len() {
            return None;
        }

        let result = self.parse_at(offset)?;
        match result {
            Ok(ref file) => self.next_offset = offset + file.size(),
            Err(_) => self.error = true,
        }
        Some(result)
    }
}
