//! Page-granular anonymous mappings.
//!
//! The narrow platform interface the allocator is written against. All
//! sizes are in bytes and must be whole multiples of [`page_size`] (use
//! [`round_to_pages`]); failures return the raw `errno`.
//!
//! Linux grows mappings with `mremap`. Other Unix systems have no `mremap`:
//! in-place growth asks `mmap` for the pages right after the mapping and
//! gives up if the kernel places them elsewhere, and relocation maps a new
//! region, copies, and unmaps the old one.
//!
//! Callers must always continue with the pointer [`relocate`] returns; the
//! old address is invalid afterwards.

use std::io;
use std::ptr::{self, NonNull};
use std::sync::OnceLock;

use log::{debug, warn};

const FALLBACK_PAGE_SIZE: usize = 4096;

fn last_os_error() -> i32 {
    io::Error::last_os_error()
        .raw_os_error()
        .unwrap_or(libc::ENOMEM)
}

/// The system page size in bytes.
pub fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();
    *PAGE_SIZE.get_or_init(|| {
        // SAFETY: sysconf has no preconditions.
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            size as usize
        } else {
            warn!("sysconf(_SC_PAGESIZE) failed, assuming {FALLBACK_PAGE_SIZE} byte pages");
            FALLBACK_PAGE_SIZE
        }
    })
}

/// Round `bytes` up to a whole number of pages. `None` on overflow.
pub fn round_to_pages(bytes: usize) -> Option<usize> {
    let mask = page_size() - 1;
    bytes.checked_add(mask).map(|b| b & !mask)
}

fn anonymous_map(hint: *mut libc::c_void, bytes: usize, populate: bool) -> *mut libc::c_void {
    #[cfg(target_os = "linux")]
    let extra = if populate { libc::MAP_POPULATE } else { 0 };
    #[cfg(not(target_os = "linux"))]
    let extra = {
        let _ = populate;
        0
    };
    // SAFETY: an anonymous private mapping without MAP_FIXED never replaces
    // existing mappings; `hint` is only advisory.
    unsafe {
        libc::mmap(
            hint,
            bytes,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | extra,
            -1,
            0,
        )
    }
}

/// Map `bytes` of zero-filled, read-write memory.
pub fn map(bytes: usize, populate: bool) -> Result<NonNull<u8>, i32> {
    debug_assert!(bytes > 0 && bytes % page_size() == 0);
    let p = anonymous_map(ptr::null_mut(), bytes, populate);
    if p == libc::MAP_FAILED {
        return Err(last_os_error());
    }
    debug!("mapped {bytes} bytes at {p:p}");
    NonNull::new(p.cast::<u8>()).ok_or(libc::ENOMEM)
}

/// Grow the mapping at `ptr` from `old` to `new` bytes without moving it.
///
/// # Safety
///
/// `[ptr, ptr + old)` must be a mapping obtained from this module.
pub unsafe fn extend_in_place(ptr: NonNull<u8>, old: usize, new: usize) -> Result<(), i32> {
    debug_assert!(new > old);
    #[cfg(target_os = "linux")]
    {
        // SAFETY: forwarded to the caller; without MREMAP_MAYMOVE the kernel
        // either grows the mapping where it is or fails.
        let p = unsafe { libc::mremap(ptr.as_ptr().cast(), old, new, 0) };
        if p == libc::MAP_FAILED {
            return Err(last_os_error());
        }
        debug_assert_eq!(p.cast::<u8>(), ptr.as_ptr());
    }
    #[cfg(not(target_os = "linux"))]
    {
        // SAFETY: `old` bytes past `ptr` stay inside or one past the mapping.
        let hint = unsafe { ptr.as_ptr().add(old) }.cast::<libc::c_void>();
        let p = anonymous_map(hint, new - old, false);
        if p == libc::MAP_FAILED {
            return Err(last_os_error());
        }
        if p != hint {
            // SAFETY: `p` is the mapping just created.
            unsafe { libc::munmap(p, new - old) };
            return Err(libc::ENOMEM);
        }
    }
    debug!("extended mapping at {ptr:p} in place: {old} -> {new} bytes");
    Ok(())
}

/// Grow the mapping at `ptr` from `old` to `new` bytes, moving it if needed.
///
/// The first `old` bytes keep their contents. On success the old address is
/// invalid; on failure the original mapping is untouched.
///
/// # Safety
///
/// `[ptr, ptr + old)` must be a mapping obtained from this module.
pub unsafe fn relocate(ptr: NonNull<u8>, old: usize, new: usize) -> Result<NonNull<u8>, i32> {
    debug_assert!(new > old);
    #[cfg(target_os = "linux")]
    let moved = {
        // SAFETY: forwarded to the caller; MREMAP_MAYMOVE moves page table
        // entries, not bytes.
        let p = unsafe { libc::mremap(ptr.as_ptr().cast(), old, new, libc::MREMAP_MAYMOVE) };
        if p == libc::MAP_FAILED {
            return Err(last_os_error());
        }
        NonNull::new(p.cast::<u8>()).ok_or(libc::ENOMEM)?
    };
    #[cfg(not(target_os = "linux"))]
    let moved = {
        let fresh = map(new, false)?;
        // SAFETY: the regions are distinct mappings of at least `old` bytes;
        // if the old one cannot be released the fresh one is dropped instead
        // and the caller keeps using `ptr`.
        unsafe {
            ptr::copy_nonoverlapping(ptr.as_ptr(), fresh.as_ptr(), old);
            if let Err(errno) = unmap(ptr, old) {
                let _ = unmap(fresh, new);
                return Err(errno);
            }
        }
        fresh
    };
    debug!("relocated mapping {ptr:p} -> {moved:p}: {old} -> {new} bytes");
    Ok(moved)
}

/// Release the pages past `new` bytes of the mapping at `ptr`.
///
/// # Safety
///
/// `[ptr, ptr + old)` must be a mapping obtained from this module and no
/// live data may remain past `new`.
pub unsafe fn trim(ptr: NonNull<u8>, old: usize, new: usize) -> Result<(), i32> {
    debug_assert!(new <= old);
    if new == old {
        return Ok(());
    }
    // SAFETY: `[ptr + new, ptr + old)` is a page-aligned tail of the mapping.
    let rc = unsafe { libc::munmap(ptr.as_ptr().add(new).cast(), old - new) };
    if rc != 0 {
        return Err(last_os_error());
    }
    debug!("trimmed mapping at {ptr:p}: {old} -> {new} bytes");
    Ok(())
}

/// Release the whole mapping at `ptr`.
///
/// # Safety
///
/// `[ptr, ptr + bytes)` must be a mapping obtained from this module that is
/// not used again.
pub unsafe fn unmap(ptr: NonNull<u8>, bytes: usize) -> Result<(), i32> {
    // SAFETY: forwarded to the caller.
    let rc = unsafe { libc::munmap(ptr.as_ptr().cast(), bytes) };
    if rc != 0 {
        let errno = last_os_error();
        warn!("munmap of {bytes} bytes at {ptr:p} failed (errno {errno})");
        return Err(errno);
    }
    debug!("unmapped {bytes} bytes at {ptr:p}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_power_of_two() {
        assert!(page_size().is_power_of_two());
    }

    #[test]
    fn rounding_to_pages() {
        let page = page_size();
        assert_eq!(round_to_pages(0), Some(0));
        assert_eq!(round_to_pages(1), Some(page));
        assert_eq!(round_to_pages(page), Some(page));
        assert_eq!(round_to_pages(page + 1), Some(2 * page));
        assert_eq!(round_to_pages(usize::MAX), None);
    }

    #[test]
    fn mapped_memory_is_zeroed_and_writable() {
        let page = page_size();
        let p = map(page, false).unwrap();
        // SAFETY: one fresh page.
        unsafe {
            let bytes = std::slice::from_raw_parts_mut(p.as_ptr(), page);
            assert!(bytes.iter().all(|&b| b == 0));
            bytes[page - 1] = 0xab;
            unmap(p, page).unwrap();
        }
    }

    #[test]
    fn relocate_preserves_contents() {
        let page = page_size();
        let p = map(page, false).unwrap();
        // SAFETY: the mapping is one page, then four after relocation.
        unsafe {
            p.as_ptr().write(42);
            p.as_ptr().add(page - 1).write(7);
            let q = relocate(p, page, 4 * page).unwrap();
            assert_eq!(q.as_ptr().read(), 42);
            assert_eq!(q.as_ptr().add(page - 1).read(), 7);
            assert_eq!(q.as_ptr().add(3 * page).read(), 0);
            unmap(q, 4 * page).unwrap();
        }
    }

    #[test]
    fn failed_relocate_keeps_the_original() {
        let page = page_size();
        let p = map(2 * page, false).unwrap();
        // SAFETY: the misaligned region lies inside the two-page mapping and
        // is only handed to calls that reject it.
        unsafe {
            p.as_ptr().add(1).write(5);
            let misaligned = NonNull::new_unchecked(p.as_ptr().add(1));
            assert_eq!(relocate(misaligned, page, 4 * page), Err(libc::EINVAL));
            assert_eq!(p.as_ptr().add(1).read(), 5);
            unmap(p, 2 * page).unwrap();
        }
    }

    #[test]
    fn extend_then_trim_round_trip() {
        let page = page_size();
        let p = map(page, false).unwrap();
        // SAFETY: the mapping only grows on success and is trimmed back.
        unsafe {
            p.as_ptr().write(9);
            match extend_in_place(p, page, 2 * page) {
                Ok(()) => {
                    p.as_ptr().add(2 * page - 1).write(1);
                    trim(p, 2 * page, page).unwrap();
                }
                // The neighbouring pages may legitimately be taken.
                Err(errno) => assert_ne!(errno, 0),
            }
            assert_eq!(p.as_ptr().read(), 9);
            unmap(p, page).unwrap();
        }
    }
}
