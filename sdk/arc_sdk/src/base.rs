//! Base helpers for address and size arithmetic.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// Aligns the given address up to the nearest boundary.
///
/// `align` must be a power of two. Returns an error if it is not, or if rounding up would overflow.
///
/// ## Example
///
/// ```
/// use arc_sdk::base::align_up;
///
/// assert_eq!(align_up(0x38, 8), Ok(0x38));
/// assert_eq!(align_up(0x39, 8), Ok(0x40));
/// assert_eq!(align_up(0x1d, 4), Ok(0x20));
/// ```
pub const fn align_up(addr: u64, align: u64) -> Result<u64, &'static str> {
    if !align.is_power_of_two() {
        return Err("`align` must be a power of two");
    }
    let align_mask = align - 1;
    if addr & align_mask == 0 {
        Ok(addr)
    } else {
        match (addr | align_mask).checked_add(1) {
            Some(aligned) => Ok(aligned),
            None => Err("attempt to add with overflow"),
        }
    }
}

/// Aligns the given offset up to the nearest boundary, returning `None` on overflow or a bad alignment.
///
/// Convenience form of [align_up] for offsets into byte slices.
pub const fn align_offset_up(offset: usize, align: usize) -> Option<usize> {
    match align_up(offset as u64, align as u64) {
        Ok(aligned) if aligned <= usize::MAX as u64 => Some(aligned as usize),
        _ => None,
    }
}
