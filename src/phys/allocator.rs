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

use core::cmp;

use crate::layout::{MAX_PAGE_ORDER, ORDER_COUNT, PAGE_SHIFT};
use crate::multiboot::MemoryMapSource;
use crate::phys::bitmap::OrderBitmap;
use crate::phys::constants::{
    align_up, bit_index, block_addr, order_for_size, size_for_order, words_for_order,
    BITMAP_ALIGNMENT, WORD_BYTES,
};
use crate::phys::error::{PageAllocError, PageAllocResult};
use crate::phys::types::{AllocFlags, BuddyStats, Frame, MarkMode};
use crate::{log_err, log_info};

// ============================================================================
// BUDDY ALLOCATOR
// ============================================================================

/// Physical page allocator over hierarchical free-page bitmaps.
///
/// One bitmap per order covers all of physical memory from address zero;
/// a set bit is reserved, a clear bit is free at that order. The free
/// counters let allocation skip straight past exhausted orders. All
/// state beyond this struct lives inside the bitmap window the allocator
/// carves out of the firmware memory map during [`init`](Self::init).
pub struct BuddyAllocator {
    /// Number of free blocks per order. Right after bootstrap only the
    /// top order has free blocks; lower orders fill in as blocks split.
    free_count: [u32; ORDER_COUNT],

    /// Per-order bitmap views into the storage window.
    bitmaps: [OrderBitmap; ORDER_COUNT],

    /// Pages covered by the bitmaps, fixed at bootstrap.
    pages: u64,

    /// Added to a physical address to reach it through the direct map.
    /// Zero while the kernel is identity-mapped during early boot.
    phys_offset: u64,

    initialized: bool,
}

// SAFETY: the raw bitmap pointers are only dereferenced while the caller
// holds exclusive access (the global instance sits behind a Mutex), and
// the window they point into is owned by the allocator for its lifetime.
unsafe impl Send for BuddyAllocator {}
unsafe impl Sync for BuddyAllocator {}

impl BuddyAllocator {
    pub const fn new() -> Self {
        const EMPTY: OrderBitmap = OrderBitmap::empty();
        Self {
            free_count: [0; ORDER_COUNT],
            bitmaps: [EMPTY; ORDER_COUNT],
            pages: 0,
            phys_offset: 0,
            initialized: false,
        }
    }

    /// Bootstrap the allocator from the firmware memory map.
    ///
    /// Sizes the per-order bitmaps for `total_memory`, claims the first
    /// available region large enough to store them, seeds every bit as
    /// reserved, then frees each whole top-order block of the available
    /// regions. Lower orders stay reserved until splitting reaches them.
    ///
    /// `phys_offset` is the direct-map displacement used to touch
    /// physical memory (`layout::DIRECTMAP_BASE` once the direct map is
    /// up, zero while identity-mapped).
    pub fn init(
        &mut self,
        total_memory: u64,
        phys_offset: u64,
        map: &dyn MemoryMapSource,
    ) -> PageAllocResult<()> {
        if self.initialized {
            return Err(PageAllocError::InvalidParam);
        }

        self.phys_offset = phys_offset;
        self.pages = total_memory >> PAGE_SHIFT;

        // Size pass: one bit per block at every order, padded to whole
        // qwords, laid out back to back.
        let mut words = [0usize; ORDER_COUNT];
        let mut required = 0u64;
        for order in 0..ORDER_COUNT {
            words[order] = words_for_order(self.pages, order);
            required += (words[order] * WORD_BYTES) as u64;
        }

        // Locate pass: first available region with enough room left
        // after qword alignment of its start.
        let mut window = None;
        map.visit(&mut |entry| {
            if window.is_some() || !entry.is_available() {
                return;
            }
            let aligned = align_up(entry.base_addr, BITMAP_ALIGNMENT);
            let shrink = aligned - entry.base_addr;
            if entry.length < shrink || entry.length - shrink < required {
                return;
            }
            window = Some(aligned);
        });
        let window = match window {
            Some(addr) => addr,
            None => {
                log_err!("page allocator: no region fits {} bitmap bytes", required);
                return Err(PageAllocError::OutOfMemory);
            }
        };

        // Overlay the per-order views onto the window.
        let mut cursor = window;
        for order in 0..ORDER_COUNT {
            // SAFETY: [window, window + required) was carved out of an
            // available region and is reachable through the direct map;
            // the window is qword aligned and so is every cursor step.
            self.bitmaps[order] =
                unsafe { OrderBitmap::map_at(self.ptr_at(cursor), words[order]) };
            cursor += (words[order] * WORD_BYTES) as u64;
        }

        // Seed everything reserved, the bitmap window included.
        // SAFETY: the window is owned by the allocator from here on.
        unsafe { self.fill(window, 0xFF, required) };
        self.free_count = [0; ORDER_COUNT];

        // Mark pass: free every whole, naturally aligned top-order block
        // of each available region. Sub-top-order tails stay reserved;
        // they only become reachable through splitting.
        let block_size = size_for_order(MAX_PAGE_ORDER);
        map.visit(&mut |entry| {
            if !entry.is_available() {
                return;
            }
            let region_end = entry.base_addr.saturating_add(entry.length);
            let mut start = align_up(entry.base_addr, BITMAP_ALIGNMENT);
            // The window is carved out of whichever region hosts it.
            // Membership, not address equality: alignment padding may
            // leave the region start below the window.
            if window >= entry.base_addr && window < region_end && start <= window {
                start = align_up(window + required, BITMAP_ALIGNMENT);
            }
            let end = cmp::min(region_end, total_memory);
            let mut block = align_up(start, block_size);
            while block.saturating_add(block_size) <= end {
                let bit = bit_index(block, MAX_PAGE_ORDER);
                // SAFETY: block + block_size <= total_memory keeps the
                // bit inside the top-order coverage.
                let changed = unsafe { self.bitmaps[MAX_PAGE_ORDER].clear_run(bit, 1) };
                self.free_count[MAX_PAGE_ORDER] += changed;
                block += block_size;
            }
        });

        self.initialized = true;
        log_info!(
            "page allocator: {} bitmap bytes at {:#x}, {} free order-{} blocks",
            required,
            window,
            self.free_count[MAX_PAGE_ORDER],
            MAX_PAGE_ORDER
        );
        Ok(())
    }

    /// Allocate a block of `PAGE_SIZE << order` bytes, naturally aligned
    /// to its own size. The block is zeroed unless the caller opts out
    /// through [`AllocFlags::DO_NOT_CLEAR`].
    pub fn allocate(&mut self, order: usize, flags: AllocFlags) -> PageAllocResult<Frame> {
        if !self.initialized {
            return Err(PageAllocError::NotInitialized);
        }
        if order > MAX_PAGE_ORDER {
            return Err(PageAllocError::InvalidParam);
        }

        // Nothing free at this order: split the smallest free block of a
        // higher order to make room.
        if self.free_count[order] == 0 {
            self.split_higher_order(order)?;
        }

        let addr = self.reserve_free_block(order)?;

        self.mark_lower_orders(addr, order, MarkMode::Reserved);
        self.update_higher_orders(addr, order);

        if flags.should_clear() {
            // SAFETY: the block was just reserved for the caller and is
            // fully inside the managed range.
            unsafe { self.fill(addr, 0, size_for_order(order)) };
        }

        Ok(Frame::new(addr))
    }

    /// Release a block previously returned by [`allocate`](Self::allocate)
    /// at the same order. Coalescing with the buddy happens implicitly
    /// through upward propagation; there is no separate merge step.
    pub fn free(&mut self, frame: Frame, order: usize) -> PageAllocResult<()> {
        if !self.initialized {
            return Err(PageAllocError::NotInitialized);
        }
        if order > MAX_PAGE_ORDER {
            return Err(PageAllocError::InvalidParam);
        }

        let addr = frame.addr();
        // Block addresses are naturally aligned; anything else cannot
        // have come out of allocate at this order.
        if addr & (size_for_order(order) - 1) != 0 {
            return Err(PageAllocError::NotAllocated);
        }

        let bit = bit_index(addr, order);
        if bit >= (self.pages >> order) as usize {
            return Err(PageAllocError::NotAllocated);
        }
        // SAFETY: bit is inside this order's coverage, checked above.
        if !unsafe { self.bitmaps[order].bit_test(bit) } {
            return Err(PageAllocError::NotAllocated);
        }

        // SAFETY: as above.
        unsafe { self.bitmaps[order].bit_clear(bit) };
        self.free_count[order] += 1;

        self.mark_lower_orders(addr, order, MarkMode::Free);
        self.update_higher_orders(addr, order);

        Ok(())
    }

    /// Allocate the smallest block holding `count` contiguous pages.
    pub fn allocate_pages(&mut self, count: usize, flags: AllocFlags) -> PageAllocResult<Frame> {
        let order = self.order_for_pages(count)?;
        self.allocate(order, flags)
    }

    /// Release `count` pages obtained from [`allocate_pages`](Self::allocate_pages).
    pub fn free_pages(&mut self, frame: Frame, count: usize) -> PageAllocResult<()> {
        let order = self.order_for_pages(count)?;
        self.free(frame, order)
    }

    /// Snapshot of the free counters plus an exact free-page total. A
    /// page is counted at the topmost order it is free at, so pages free
    /// at several orders of a split block are not double counted.
    pub fn stats(&self) -> BuddyStats {
        let mut free_pages = 0u64;
        if self.initialized {
            for order in 0..ORDER_COUNT {
                let blocks = (self.pages >> order) as usize;
                for bit in 0..blocks {
                    // SAFETY: bit stays inside this order's coverage.
                    if unsafe { self.bitmaps[order].bit_test(bit) } {
                        continue;
                    }
                    let merged_up = order < MAX_PAGE_ORDER
                        // SAFETY: the parent of an in-coverage block is
                        // inside the next order's coverage.
                        && !unsafe { self.bitmaps[order + 1].bit_test(bit >> 1) };
                    if !merged_up {
                        free_pages += 1 << order;
                    }
                }
            }
        }
        BuddyStats {
            free_blocks: self.free_count,
            free_pages,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn order_for_pages(&self, count: usize) -> PageAllocResult<usize> {
        if count == 0 {
            return Err(PageAllocError::InvalidParam);
        }
        let order = order_for_size((count as u64) << PAGE_SHIFT);
        if order > MAX_PAGE_ORDER {
            return Err(PageAllocError::InvalidParam);
        }
        Ok(order)
    }

    /// Find the smallest order above `order` with a free block, reserve
    /// one there and release its sub-blocks down to `order`.
    fn split_higher_order(&mut self, order: usize) -> PageAllocResult<()> {
        for higher in order + 1..=MAX_PAGE_ORDER {
            if self.free_count[higher] == 0 {
                continue;
            }
            let addr = self.reserve_free_block(higher)?;
            self.release_sub_blocks(addr, higher, order);
            return Ok(());
        }
        Err(PageAllocError::OutOfMemory)
    }

    /// Scan this order's bitmap for the first free block, reserve it and
    /// return its physical address. Whole words of reserved blocks are
    /// skipped without touching individual bits.
    fn reserve_free_block(&mut self, order: usize) -> PageAllocResult<u64> {
        // SAFETY: the view is mapped once the allocator is initialized.
        let bit = match unsafe { self.bitmaps[order].find_first_zero() } {
            Some(bit) => bit,
            None => return Err(PageAllocError::OutOfMemory),
        };
        // SAFETY: find_first_zero returned an in-capacity index.
        unsafe { self.bitmaps[order].bit_set(bit) };
        self.free_count[order] -= 1;
        Ok(block_addr(bit, order))
    }

    /// Make the interior of a freshly reserved order-`higher` block
    /// available at every order in `[order, higher)`. The bit run
    /// covering the block doubles in length with each step down, and the
    /// free counters absorb exactly the bits that flipped.
    fn release_sub_blocks(&mut self, addr: u64, higher: usize, order: usize) {
        let mut first = bit_index(addr, higher - 1);
        let mut count = 2usize;
        for j in (order..higher).rev() {
            // SAFETY: the run lies under a block inside this order's
            // coverage.
            let changed = unsafe { self.bitmaps[j].clear_run(first, count) };
            self.free_count[j] += changed;
            first <<= 1;
            count <<= 1;
        }
    }

    /// Walk the orders below `order`, marking every sub-block of the
    /// block at `addr` reserved or free.
    fn mark_lower_orders(&mut self, addr: u64, order: usize, mode: MarkMode) {
        if order == 0 {
            return;
        }

        let mut first = bit_index(addr, order - 1);
        let mut count = 2usize;
        for j in (0..order).rev() {
            match mode {
                MarkMode::Reserved => {
                    // SAFETY: the run lies under a block inside this
                    // order's coverage.
                    let changed = unsafe { self.bitmaps[j].set_run(first, count) };
                    // Right after bootstrap the lower counters are zero
                    // while the seeded bits are already set; the guard
                    // keeps the counter from wrapping in that state.
                    if self.free_count[j] >= changed {
                        self.free_count[j] -= changed;
                    }
                }
                MarkMode::Free => {
                    // SAFETY: as above.
                    let changed = unsafe { self.bitmaps[j].clear_run(first, count) };
                    self.free_count[j] += changed;
                }
            }
            first <<= 1;
            count <<= 1;
        }
    }

    /// Walk the orders above `order`, re-deriving each ancestor bit from
    /// its pair of children: a block is reserved exactly when either
    /// half of it is. On free this is what coalesces buddies.
    fn update_higher_orders(&mut self, addr: u64, order: usize) {
        let start = cmp::max(order, 1);
        let mut bit = bit_index(addr, start);
        for j in start..=MAX_PAGE_ORDER {
            // SAFETY: ancestors of a block inside coverage stay inside
            // their own order's bitmap, as does the child pair below.
            let was_reserved = unsafe { self.bitmaps[j].bit_test(bit) };
            let pair = unsafe { self.bitmaps[j - 1].child_pair(bit) };
            if pair == 0 {
                if was_reserved {
                    unsafe { self.bitmaps[j].bit_clear(bit) };
                    self.free_count[j] += 1;
                }
            } else if !was_reserved {
                unsafe { self.bitmaps[j].bit_set(bit) };
                self.free_count[j] -= 1;
            }
            bit >>= 1;
        }
    }

    #[inline]
    fn ptr_at(&self, addr: u64) -> *mut u8 {
        self.phys_offset.wrapping_add(addr) as *mut u8
    }

    /// # Safety
    /// `[addr, addr + len)` must lie inside memory this allocator owns
    /// or has reserved for the caller, reachable through `phys_offset`.
    unsafe fn fill(&self, addr: u64, value: u8, len: u64) {
        // SAFETY: upheld by the caller.
        unsafe { core::ptr::write_bytes(self.ptr_at(addr), value, len as usize) };
    }
}

#[cfg(test)]
impl BuddyAllocator {
    pub(crate) fn zero_bits(&self, order: usize) -> u32 {
        // SAFETY: tests only call this on an initialized allocator.
        unsafe { self.bitmaps[order].count_zeros() }
    }

    pub(crate) fn bit_at(&self, order: usize, bit: usize) -> bool {
        // SAFETY: tests keep bit inside the order's capacity.
        unsafe { self.bitmaps[order].bit_test(bit) }
    }

    pub(crate) fn free_blocks(&self, order: usize) -> u32 {
        self.free_count[order]
    }

    pub(crate) fn snapshot(&self) -> (std::vec::Vec<std::vec::Vec<u64>>, [u32; ORDER_COUNT]) {
        let mut words = std::vec::Vec::new();
        for order in 0..ORDER_COUNT {
            // SAFETY: tests only snapshot initialized allocators.
            words.push(unsafe { self.bitmaps[order].snapshot_words() });
        }
        (words, self.free_count)
    }
}

// ============================================================================
// GLOBAL STATE
// ============================================================================

use spin::Mutex;

static ALLOCATOR: Mutex<BuddyAllocator> = Mutex::new(BuddyAllocator::new());

// ============================================================================
// PUBLIC API
// ============================================================================

pub fn phys_init(
    total_memory: u64,
    phys_offset: u64,
    map: &dyn MemoryMapSource,
) -> PageAllocResult<()> {
    let mut allocator = ALLOCATOR.lock();
    allocator.init(total_memory, phys_offset, map)
}

pub fn phys_allocate_page(order: usize, flags: AllocFlags) -> PageAllocResult<Frame> {
    let mut allocator = ALLOCATOR.lock();
    allocator.allocate(order, flags)
}

pub fn phys_free_page(frame: Frame, order: usize) -> PageAllocResult<()> {
    let mut allocator = ALLOCATOR.lock();
    allocator.free(frame, order)
}

pub fn phys_allocate_pages(count: usize, flags: AllocFlags) -> PageAllocResult<Frame> {
    let mut allocator = ALLOCATOR.lock();
    allocator.allocate_pages(count, flags)
}

pub fn phys_free_pages(frame: Frame, count: usize) -> PageAllocResult<()> {
    let mut allocator = ALLOCATOR.lock();
    allocator.free_pages(frame, count)
}

pub fn phys_stats() -> BuddyStats {
    ALLOCATOR.lock().stats()
}

pub fn phys_is_initialized() -> bool {
    ALLOCATOR.lock().is_initialized()
}
