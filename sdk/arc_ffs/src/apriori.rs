//! PEI Apriori file support.
//!
//! The apriori file is a freeform file named [PEI_APRIORI_FILE_NAME](arc_pi::guids::PEI_APRIORI_FILE_NAME)
//! whose raw section is a packed list of file name GUIDs, in the order those modules must be dispatched.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use arc_pi::{
    fw_fs::ffs::{file::raw::r#type as file_type, section::raw_type},
    guids,
};
use r_efi::efi;

use crate::{FirmwareFileSystemError, Result, VolumeRef};

const GUID_SIZE: usize = 16;

/// View over the list of module names stored in an apriori file.
#[derive(Debug, Clone, Copy)]
pub struct AprioriFile<'a> {
    names: &'a [u8],
}

impl<'a> AprioriFile<'a> {
    /// Locates the apriori file in `volume` and returns its name list.
    pub fn find(volume: &VolumeRef<'a>) -> Result<Self> {
        let section =
            volume.find_file_section(file_type::FREEFORM, raw_type::RAW, Some(&guids::PEI_APRIORI_FILE_NAME))?;
        Self::new(section.content())
    }

    /// Wraps a raw section payload. Fails with [`FirmwareFileSystemError::DataCorrupt`] if the payload is not a
    /// whole number of GUIDs.
    pub fn new(names: &'a [u8]) -> Result<Self> {
        if names.len() % GUID_SIZE != 0 {
            Err(FirmwareFileSystemError::DataCorrupt)?;
        }
        Ok(Self { names })
    }

    /// Number of names in the list.
    pub fn len(&self) -> usize {
        self.names.len() / GUID_SIZE
    }

    /// True if the list holds no names.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The first name in the list.
    pub fn first(&self) -> Result<efi::Guid> {
        self.iter().next().ok_or(FirmwareFileSystemError::NotFound)
    }

    /// Iterates the names in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = efi::Guid> + 'a {
        self.names.chunks_exact(GUID_SIZE).map(|chunk| {
            let mut bytes = [0u8; GUID_SIZE];
            bytes.copy_from_slice(chunk);
            efi::Guid::from_bytes(&bytes)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{File, Section, Volume};
    use alloc::vec::Vec;

    const FIRST: efi::Guid =
        efi::Guid::from_fields(0x3c1f3a9b, 0x2e4d, 0x4a6b, 0x91, 0x0c, &[0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
    const SECOND: efi::Guid =
        efi::Guid::from_fields(0x3c1f3a9b, 0x2e4d, 0x4a6b, 0x91, 0x0c, &[0x11, 0x22, 0x33, 0x44, 0x55, 0x67]);

    #[test]
    fn find_should_list_names_in_order() {
        let names: Vec<u8> = [FIRST, SECOND].iter().flat_map(|g| *g.as_bytes()).collect();
        let bytes = Volume::new()
            .with_file(
                File::new(guids::PEI_APRIORI_FILE_NAME, file_type::FREEFORM)
                    .with_section(Section::new(raw_type::RAW, names)),
            )
            .serialize()
            .unwrap();
        let volume = VolumeRef::new(&bytes).unwrap();

        let apriori = AprioriFile::find(&volume).unwrap();
        assert_eq!(apriori.len(), 2);
        assert_eq!(apriori.first().unwrap(), FIRST);
        assert_eq!(apriori.iter().collect::<Vec<_>>(), [FIRST, SECOND]);
    }

    #[test]
    fn new_should_reject_partial_guid() {
        assert_eq!(AprioriFile::new(&[0; 20]).unwrap_err(), FirmwareFileSystemError::DataCorrupt);
    }

    #[test]
    fn first_should_report_empty_list() {
        let apriori = AprioriFile::new(&[]).unwrap();
        assert!(apriori.is_empty());
        assert_eq!(apriori.first().unwrap_err(), FirmwareFileSystemError::NotFound);
    }

    #[test]
    fn find_should_report_missing_apriori_file() {
        let bytes = Volume::new().serialize().unwrap();
        let volume = VolumeRef::new(&bytes).unwrap();
        assert_eq!(AprioriFile::find(&volume).unwrap_err(), FirmwareFileSystemError::NotFound);
    }
}
