// src/layout.rs
//
// NØNOS physical memory geometry.
// Single source of truth for page sizes, allocation orders and the
// direct-map window this subsystem reaches physical memory through.

use x86_64::{PhysAddr, VirtAddr};

// ───────────────────────────────────────────────────────────────────────────────
// Page geometry
// ───────────────────────────────────────────────────────────────────────────────

pub const PAGE_SIZE: usize = 4096;
pub const PAGE_SIZE_U64: u64 = PAGE_SIZE as u64;
pub const PAGE_SHIFT: usize = 12;
pub const PAGE_MASK: u64 = !(PAGE_SIZE_U64 - 1);

// ───────────────────────────────────────────────────────────────────────────────
// Allocation orders
// ───────────────────────────────────────────────────────────────────────────────

/// Highest supported allocation order (inclusive). An order-`k` block
/// spans `PAGE_SIZE << k` bytes, so the largest block is 4 MiB.
pub const MAX_PAGE_ORDER: usize = 10;

/// Number of order bitmaps the allocator maintains.
pub const ORDER_COUNT: usize = MAX_PAGE_ORDER + 1;

// ───────────────────────────────────────────────────────────────────────────────
// Direct map (phys→virt linear window)
// ───────────────────────────────────────────────────────────────────────────────

pub const DIRECTMAP_BASE: u64 = 0xFFFF_FFFF_B000_0000;
pub const DIRECTMAP_SIZE: u64 = 0x0000_0000_1000_0000; // 256 MiB

#[inline]
pub fn phys_to_virt(phys: PhysAddr) -> VirtAddr {
    VirtAddr::new(phys.as_u64() + DIRECTMAP_BASE)
}
