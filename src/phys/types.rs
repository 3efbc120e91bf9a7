// NØNOS Operating System
// Copyright (C) 2026 NØNOS Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use crate::layout::{ORDER_COUNT, PAGE_SHIFT, PAGE_SIZE_U64};
use x86_64::PhysAddr;

// ============================================================================
// ALLOCATION FLAGS
// ============================================================================
bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AllocFlags: u32 {
        /// Zero the block before returning it.
        const CLEAR = 1 << 0;
        /// Skip zeroing; the caller initializes the block itself.
        const DO_NOT_CLEAR = 1 << 1;
        /// Kernel-internal allocation: must not leak a previous tenant's
        /// data, so this is an alias of `CLEAR`.
        const KERNEL = 1 << 0;
    }
}

impl AllocFlags {
    /// Zeroing applies unless `DO_NOT_CLEAR` is set on its own; when the
    /// caller sets neither or both, clearing wins.
    pub fn should_clear(&self) -> bool {
        self.contains(Self::CLEAR) || !self.contains(Self::DO_NOT_CLEAR)
    }
}

impl Default for AllocFlags {
    fn default() -> Self {
        Self::CLEAR
    }
}

// ============================================================================
// RESERVATION MODE
// ============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MarkMode {
    Free,
    Reserved,
}

// ============================================================================
// FRAME TYPE
// ============================================================================
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct Frame(pub u64);

impl Frame {
    #[inline]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    #[inline]
    pub const fn addr(&self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_phys_addr(&self) -> PhysAddr {
        PhysAddr::new(self.0)
    }

    #[inline]
    pub fn from_phys_addr(addr: PhysAddr) -> Self {
        Self(addr.as_u64())
    }

    /// Page number of this frame within the managed range.
    #[inline]
    pub const fn number(&self) -> u64 {
        self.0 >> PAGE_SHIFT
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Frame {
    fn from(addr: u64) -> Self {
        Self(addr)
    }
}

impl From<Frame> for u64 {
    fn from(frame: Frame) -> u64 {
        frame.0
    }
}

impl From<PhysAddr> for Frame {
    fn from(addr: PhysAddr) -> Self {
        Self(addr.as_u64())
    }
}

impl From<Frame> for PhysAddr {
    fn from(frame: Frame) -> PhysAddr {
        PhysAddr::new(frame.0)
    }
}

// ============================================================================
// ALLOCATOR STATISTICS
// ============================================================================
#[derive(Clone, Copy, Debug, Default)]
pub struct BuddyStats {
    /// Free blocks per order. The same memory may be free at several
    /// orders at once, so these counts do not add up across orders.
    pub free_blocks: [u32; ORDER_COUNT],

    /// Free pages, each counted exactly once.
    pub free_pages: u64,
}

impl BuddyStats {
    pub const fn new() -> Self {
        Self {
            free_blocks: [0; ORDER_COUNT],
            free_pages: 0,
        }
    }

    pub fn free_pages(&self) -> u64 {
        self.free_pages
    }

    pub fn free_bytes(&self) -> u64 {
        self.free_pages * PAGE_SIZE_U64
    }

    /// Largest order with at least one free block.
    pub fn largest_free_order(&self) -> Option<usize> {
        (0..ORDER_COUNT).rev().find(|&order| self.free_blocks[order] > 0)
    }
}
