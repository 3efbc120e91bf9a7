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

//! NØNOS physical page allocator.
//!
//! Carves physical memory into power-of-two page blocks and tracks them
//! in hierarchical free-page bitmaps bootstrapped out of the firmware
//! memory map. Runs before any heap, scheduler or virtual memory exists:
//! no dynamic allocation, no blocking, no internal locking beyond the
//! spin mutex guarding the global instance.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

#[cfg(test)]
extern crate std;

pub mod layout;
pub mod log;
pub mod multiboot;
pub mod phys;

pub use phys::{AllocFlags, BuddyAllocator, BuddyStats, Frame, PageAllocError, PageAllocResult};
