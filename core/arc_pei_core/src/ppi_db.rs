//! PEIM-to-PEIM Interface (PPI) database.
//!
//! A fixed-capacity, append-only table of PPI descriptors. Descriptors are installed in batches that either commit
//! completely or leave the table as it was, and are looked up by GUID in registration order.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::fmt;

use arc_pi::ppi::{self, descriptor_flags};
use arc_sdk::error::{EfiError, Result};
use r_efi::efi;

use crate::services::PeiServices;

/// Default number of descriptors the database can hold.
pub const MAX_PEI_PPIS: usize = 256;

/// A PPI that can be dispatched by the PEI core.
pub trait DispatchPpi {
    /// Runs the PPI with access to the PEI services.
    fn dispatch(&self, services: &mut PeiServices<'_>) -> Result<()>;
}

/// What a descriptor points at.
#[derive(Clone, Copy)]
pub enum PpiInterface<'a> {
    /// An opaque interface address with no dispatch capability.
    Address(u64),
    /// A dispatch-capable service implemented in this image.
    Service(&'a dyn DispatchPpi),
    /// A dispatch-capable interface supplied by a module: an interface address and its entry point.
    Entry { interface: u64, entry: u64 },
}

impl fmt::Debug for PpiInterface<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PpiInterface::Address(address) => write!(f, "Address({:#x})", address),
            PpiInterface::Service(service) => write!(f, "Service({:p})", *service),
            PpiInterface::Entry { interface, entry } => {
                write!(f, "Entry {{ interface: {:#x}, entry: {:#x} }}", interface, entry)
            }
        }
    }
}

/// EFI_PEI_PPI_DESCRIPTOR
///
/// `flags` and `guid` sit where [ppi::Descriptor] has them.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PpiDescriptor<'a> {
    pub flags: u32,
    pub guid: efi::Guid,
    pub interface: PpiInterface<'a>,
}

impl<'a> PpiDescriptor<'a> {
    pub const fn new(flags: u32, guid: efi::Guid, interface: PpiInterface<'a>) -> Self {
        Self { flags, guid, interface }
    }

    /// Whether the descriptor registers a PPI, as opposed to a notification.
    pub const fn is_ppi(&self) -> bool {
        self.flags & descriptor_flags::PPI != 0
    }

    /// Whether the addresses in the descriptor are link-time addresses that need a fixup.
    pub const fn is_pic(&self) -> bool {
        self.flags & descriptor_flags::PIC != 0
    }

    /// Whether the descriptor ends its install batch.
    pub const fn is_last(&self) -> bool {
        self.flags & descriptor_flags::TERMINATE_LIST != 0
    }

    /// Returns a copy whose address fields are displaced by `fixup`.
    pub fn displaced(&self, fixup: u32) -> Self {
        let fixup = fixup as u64;
        let interface = match self.interface {
            PpiInterface::Address(address) => PpiInterface::Address(address.wrapping_add(fixup)),
            PpiInterface::Entry { interface, entry } => {
                PpiInterface::Entry { interface: interface.wrapping_add(fixup), entry: entry.wrapping_add(fixup) }
            }
            service @ PpiInterface::Service(_) => service,
        };
        Self { interface, ..*self }
    }
}

impl From<&ppi::Descriptor> for PpiDescriptor<'_> {
    /// A module descriptor carries no entry point the core can trust, so its value stays an opaque address.
    fn from(raw: &ppi::Descriptor) -> Self {
        Self::new(raw.flags, raw.guid, PpiInterface::Address(raw.ppi as u64))
    }
}

/// Installed PPIs, in registration order.
pub struct PpiDb<'a, const N: usize = MAX_PEI_PPIS> {
    slots: [Option<PpiDescriptor<'a>>; N],
    count: usize,
    last_dispatched: usize,
}

impl<'a, const N: usize> Default for PpiDb<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> PpiDb<'a, N> {
    /// Creates an empty database.
    pub const fn new() -> Self {
        Self { slots: [None; N], count: 0, last_dispatched: 0 }
    }

    /// Number of installed descriptors.
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Maximum number of descriptors.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of descriptors the dispatcher has visited.
    pub const fn last_dispatched(&self) -> usize {
        self.last_dispatched
    }

    /// Returns the descriptor installed at `index`.
    pub fn get(&self, index: usize) -> Option<PpiDescriptor<'a>> {
        if index < self.count {
            self.slots[index]
        } else {
            None
        }
    }

    /// Records that the descriptors below `index` have been dispatched.
    pub fn mark_dispatched(&mut self, index: usize) {
        self.last_dispatched = index.min(self.count);
    }

    /// Installs a batch of descriptors.
    ///
    /// The batch ends at the first descriptor that carries [descriptor_flags::TERMINATE_LIST]. The first descriptor
    /// flagged [descriptor_flags::PIC] triggers one call to `fixup`, and its value displaces the addresses of that
    /// and every later PIC descriptor in the batch.
    ///
    /// ## Errors
    ///
    /// - [EfiError::InvalidParameter]: the batch is empty, a descriptor is not a PPI, or `list` ends before a
    ///   terminating descriptor.
    /// - [EfiError::OutOfResources]: the batch does not fit.
    /// - Any error returned by `fixup`.
    ///
    /// On error no descriptor of the batch remains installed.
    pub fn install(&mut self, list: &[PpiDescriptor<'a>], mut fixup: impl FnMut() -> Result<u32>) -> Result<()> {
        let start = self.count;
        let result = self.append(list, &mut fixup);
        if result.is_err() {
            for slot in &mut self.slots[start..self.count] {
                *slot = None;
            }
            self.count = start;
        }
        result
    }

    fn append(&mut self, list: &[PpiDescriptor<'a>], fixup: &mut dyn FnMut() -> Result<u32>) -> Result<()> {
        if list.is_empty() {
            return Err(EfiError::InvalidParameter);
        }

        let mut displacement = None;
        for descriptor in list {
            if !descriptor.is_ppi() {
                log::error!("Descriptor {:#x} is not a PPI", descriptor.flags);
                return Err(EfiError::InvalidParameter);
            }
            if self.count >= N {
                log::error!("PPI database is full ({} entries)", N);
                return Err(EfiError::OutOfResources);
            }

            let descriptor = if descriptor.is_pic() {
                let value = match displacement {
                    Some(value) => value,
                    None => *displacement.insert(fixup()?),
                };
                descriptor.displaced(value)
            } else {
                *descriptor
            };

            self.slots[self.count] = Some(descriptor);
            self.count += 1;

            if descriptor.is_last() {
                return Ok(());
            }
        }

        Err(EfiError::InvalidParameter)
    }

    /// Returns the `instance`-th (0-based) installed descriptor whose GUID is `guid`.
    pub fn locate(&self, guid: &efi::Guid, instance: usize) -> Result<PpiDescriptor<'a>> {
        self.slots[..self.count]
            .iter()
            .flatten()
            .filter(|descriptor| descriptor.guid.as_bytes() == guid.as_bytes())
            .nth(instance)
            .copied()
            .ok_or(EfiError::NotFound)
    }

    /// Registers notification descriptors.
    ///
    /// Notifications are not supported.
    pub fn notify(&mut self, _list: &[PpiDescriptor<'a>]) -> Result<()> {
        Err(EfiError::Unsupported)
    }
}
