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

pub mod allocator;
mod bitmap;
pub mod constants;
pub mod error;
mod types;


pub use allocator::{
    phys_allocate_page as allocate_page, phys_allocate_pages as allocate_pages,
    phys_free_page as free_page, phys_free_pages as free_pages, phys_init as init,
    phys_is_initialized as is_initialized, phys_stats as stats, BuddyAllocator,
};
pub use constants::*;
pub use error::{PageAllocError, PageAllocResult};
pub use types::{AllocFlags, BuddyStats, Frame};
