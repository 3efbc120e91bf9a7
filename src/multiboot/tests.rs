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

use super::*;
use std::vec;
use std::vec::Vec;

#[test]
fn test_entry_type_predicates() {
    let usable = MemoryMapEntry::available(0x100000, 0x700000);
    assert!(usable.is_available());
    assert_eq!(usable.type_name(), "Available");

    let blocked = MemoryMapEntry::reserved(0, 0x100000);
    assert!(!blocked.is_available());
    assert_eq!(blocked.type_name(), "Reserved");
}

#[test]
fn test_memory_type_names() {
    assert_eq!(memory_type::name(memory_type::AVAILABLE), "Available");
    assert_eq!(memory_type::name(memory_type::ACPI_NVS), "ACPI NVS");
    assert_eq!(memory_type::name(memory_type::BAD_MEMORY), "Bad Memory");
    assert_eq!(memory_type::name(0xdead), "Unknown");
}

#[test]
fn test_entry_addresses() {
    let entry = MemoryMapEntry::available(0x100000, 0x1000);
    assert_eq!(entry.start_addr().as_u64(), 0x100000);
    assert_eq!(entry.end_addr().as_u64(), 0x101000);
}

#[test]
fn test_slice_source_is_stable() {
    let map = vec![
        MemoryMapEntry::available(0, 0x1000),
        MemoryMapEntry::reserved(0x1000, 0x1000),
        MemoryMapEntry::available(0x2000, 0x4000),
    ];

    // The allocator walks the map twice during bootstrap and relies on
    // identical visitation order each time.
    let mut first = Vec::new();
    map.as_slice().visit(&mut |entry| first.push(*entry));
    let mut second = Vec::new();
    map.as_slice().visit(&mut |entry| second.push(*entry));

    assert_eq!(first, map);
    assert_eq!(second, map);
}
