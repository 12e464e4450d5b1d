//! Kernel heap.
//!
//! A fixed virtual range backed by frames taken from the boot memory map.
//! Everything behind `alloc` in the kernel lands here: the task table,
//! the keyboard wait queue, process futures.

use linked_list_allocator::LockedHeap;
use x86_64::{
    structures::paging::{
        mapper::MapToError, FrameAllocator, Mapper, Page, PageRangeInclusive, PageTableFlags,
        Size4KiB,
    },
    VirtAddr,
};

use crate::config::{HEAP_SIZE, HEAP_START};

#[global_allocator]
static HEAP: LockedHeap = LockedHeap::empty();

fn heap_pages() -> PageRangeInclusive<Size4KiB> {
    let first = VirtAddr::new(HEAP_START as u64);
    let last = first + (HEAP_SIZE as u64 - 1);
    Page::range_inclusive(Page::containing_address(first), Page::containing_address(last))
}

/// Backs the heap range with fresh frames and enables allocation.
///
/// Call once, before the first allocation.
pub fn init_heap(
    mapper: &mut impl Mapper<Size4KiB>,
    frames: &mut impl FrameAllocator<Size4KiB>,
) -> Result<(), MapToError<Size4KiB>> {
    let writable = PageTableFlags::PRESENT | PageTableFlags::WRITABLE;
    for page in heap_pages() {
        let Some(frame) = frames.allocate_frame() else {
            return Err(MapToError::FrameAllocationFailed);
        };
        // SAFETY: `frame` was just handed out by the frame allocator, and
        // nothing but the heap lives in this virtual range.
        let flush = unsafe { mapper.map_to(page, frame, writable, frames)? };
        flush.flush();
    }

    // SAFETY: the whole range is mapped writable above and given away once.
    unsafe { HEAP.lock().init(HEAP_START as *mut u8, HEAP_SIZE) };
    log::debug!("heap: {} KiB at {:#x}", HEAP_SIZE / 1024, HEAP_START);
    Ok(())
}
