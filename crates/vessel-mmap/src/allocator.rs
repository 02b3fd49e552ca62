//! Element-level allocator over anonymous mappings.

use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};
use std::ptr::NonNull;
use std::slice;

use log::{debug, warn};
use vessel_mem::{construct, destroy, umove, Element};

use crate::config::MapConfig;
use crate::error::MapError;
use crate::sys;

/// Allocates arrays of `T` directly from the OS, growing them in place.
///
/// Unlike a heap buffer, every slot an allocation covers is live:
/// [`allocate`](Self::allocate) default-constructs all `n` slots and
/// [`reallocate`](Self::reallocate) constructs the new ones. For trivially
/// constructible types that construction is free, because fresh anonymous
/// pages are already zero.
///
/// The allocator keeps no bookkeeping of its own; callers hand back the
/// pointer and element count they were given.
///
/// # Address stability
///
/// `reallocate` may or may not return the original pointer. Callers must
/// always continue with the returned pointer; every reference into the old
/// allocation is invalid once it returns `Ok`.
pub struct MmapAllocator<T> {
    config: MapConfig,
    _marker: PhantomData<fn() -> T>,
}

/// Unmaps a region on drop unless disarmed.
struct MappingGuard {
    ptr: NonNull<u8>,
    bytes: usize,
}

impl MappingGuard {
    fn disarm(self) {
        mem::forget(self);
    }
}

impl Drop for MappingGuard {
    fn drop(&mut self) {
        // SAFETY: the guard owns a mapping nobody else references yet.
        let _ = unsafe { sys::unmap(self.ptr, self.bytes) };
    }
}

/// Trims an in-place extension back to its old size on drop unless disarmed.
struct ExtensionGuard {
    ptr: NonNull<u8>,
    old: usize,
    new: usize,
}

impl ExtensionGuard {
    fn disarm(self) {
        mem::forget(self);
    }
}

impl Drop for ExtensionGuard {
    fn drop(&mut self) {
        // SAFETY: nothing live remains in the extension being released.
        let _ = unsafe { sys::trim(self.ptr, self.new, self.old) };
    }
}

impl<T> MmapAllocator<T> {
    /// Allocator with the default [`MapConfig`].
    pub fn new() -> Self {
        Self::with_config(MapConfig::default())
    }

    /// Allocator with an explicit configuration.
    pub fn with_config(config: MapConfig) -> Self {
        Self {
            config,
            _marker: PhantomData,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Bytes of mapping backing `n` elements: whole pages, or zero.
    fn mapped_bytes(n: usize) -> Result<usize, MapError> {
        n.checked_mul(mem::size_of::<T>())
            .and_then(sys::round_to_pages)
            .ok_or(MapError::SizeOverflow { elements: n })
    }

    /// Number of slots available in the pages that back `n` elements.
    ///
    /// Containers grow to this many slots so that no mapped byte goes to
    /// waste. Zero-sized types and `n == 0` get exactly `n`.
    pub fn capacity_for(&self, n: usize) -> Result<usize, MapError> {
        let size = mem::size_of::<T>();
        if size == 0 || n == 0 {
            return Ok(n);
        }
        Ok(Self::mapped_bytes(n)? / size)
    }
}

impl<T: Element + Default> MmapAllocator<T> {
    /// Map storage for `n` elements and default-construct all of them.
    ///
    /// `n == 0` and zero-sized `T` return a dangling pointer without
    /// touching the OS. If a `Default` call panics, the slots constructed so
    /// far are destroyed and the mapping is released before unwinding
    /// continues.
    pub fn allocate(&self, n: usize) -> Result<NonNull<T>, MapError> {
        let bytes = Self::mapped_bytes(n)?;
        if bytes == 0 {
            let ptr = NonNull::dangling();
            // SAFETY: zero bytes of storage are needed; the dangling pointer
            // is valid for `n` zero-sized slots (or for none).
            construct(unsafe { slots(ptr, 0, n) });
            return Ok(ptr);
        }
        let raw = sys::map(bytes, self.config.populate).map_err(|os_error| {
            warn!("mmap of {bytes} bytes for {n} elements failed (errno {os_error})");
            MapError::MapFailed { bytes, os_error }
        })?;
        let ptr = raw.cast::<T>();
        if !T::TRIVIALLY_CONSTRUCTIBLE {
            let mapping = MappingGuard { ptr: raw, bytes };
            // SAFETY: the mapping holds `n` slots.
            construct(unsafe { slots(ptr, 0, n) });
            mapping.disarm();
        }
        Ok(ptr)
    }

    /// Destroy the `n` elements at `ptr` and release their mapping.
    ///
    /// If a destructor panics the mapping is still released.
    ///
    /// # Safety
    ///
    /// `ptr` and `n` must come from the latest `allocate`/`reallocate` of
    /// this allocator type, and the allocation must not be used again.
    pub unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) -> Result<(), MapError> {
        let bytes = Self::mapped_bytes(n)?;
        let mapping = (bytes > 0).then_some(MappingGuard {
            ptr: ptr.cast(),
            bytes,
        });
        // SAFETY: the caller transfers ownership of the `n` live elements.
        unsafe { destroy(&mut *slice::from_raw_parts_mut(ptr.as_ptr(), n)) };
        let Some(mapping) = mapping else {
            return Ok(());
        };
        mapping.disarm();
        // SAFETY: the elements are gone and the caller never reuses `ptr`.
        unsafe { sys::unmap(ptr.cast(), bytes) }
            .map_err(|os_error| MapError::UnmapFailed { bytes, os_error })
    }

    /// Grow the allocation at `ptr` from `n` to `req` elements.
    ///
    /// The first `n` elements keep their values; slots `[n, req)` are
    /// default-constructed. When the new size still fits in the mapped
    /// pages no system call is made. Otherwise the kernel is asked to extend
    /// the mapping in place; if it cannot and
    /// [`MapConfig::allow_relocation`] is set, the mapping moves.
    ///
    /// On `Err`, and when a `Default` call panics, the original allocation
    /// is left exactly as it was.
    ///
    /// # Safety
    ///
    /// `ptr` and `n` must come from the latest `allocate`/`reallocate` of
    /// this allocator type. After `Ok`, only the returned pointer is valid.
    pub unsafe fn reallocate(
        &self,
        ptr: NonNull<T>,
        n: usize,
        req: usize,
    ) -> Result<NonNull<T>, MapError> {
        if req < n {
            return Err(MapError::ShrinkRequested {
                current: n,
                requested: req,
            });
        }
        if req == n {
            return Ok(ptr);
        }
        let old = Self::mapped_bytes(n)?;
        let new = Self::mapped_bytes(req)?;

        if old == new {
            // Same pages: the tail bytes were never written and are still zero.
            if !T::TRIVIALLY_CONSTRUCTIBLE {
                // SAFETY: the mapping already covers `req` slots.
                construct(unsafe { slots(ptr, n, req) });
            }
            return Ok(ptr);
        }

        if old == 0 {
            // Nothing to keep: `n` is zero or the elements occupy no bytes.
            let fresh = self.allocate(req)?;
            // SAFETY: zero-sized or absent elements own no memory; the
            // dangling pointer needs no release.
            unsafe { destroy(&mut *slice::from_raw_parts_mut(ptr.as_ptr(), n)) };
            return Ok(fresh);
        }

        let raw = ptr.cast::<u8>();
        // SAFETY: the caller vouches that `raw` heads a mapping of `old` bytes.
        match unsafe { sys::extend_in_place(raw, old, new) } {
            Ok(()) => {
                if !T::TRIVIALLY_CONSTRUCTIBLE {
                    let extension = ExtensionGuard { ptr: raw, old, new };
                    // SAFETY: the mapping now covers `req` slots.
                    construct(unsafe { slots(ptr, n, req) });
                    extension.disarm();
                }
                return Ok(ptr);
            }
            Err(os_error) if !self.config.allow_relocation => {
                debug!("in-place growth to {new} bytes refused and relocation disabled");
                return Err(MapError::ExtendFailed {
                    bytes: new,
                    os_error,
                });
            }
            Err(_) => {}
        }

        if T::TRIVIALLY_CONSTRUCTIBLE {
            // The kernel moves the pages; the zeroed tail is already default.
            // SAFETY: as above.
            let moved = unsafe { sys::relocate(raw, old, new) }.map_err(|os_error| {
                warn!("relocating mapping to {new} bytes failed (errno {os_error})");
                MapError::ExtendFailed {
                    bytes: new,
                    os_error,
                }
            })?;
            return Ok(moved.cast());
        }

        // Build the new tail in a fresh mapping before touching the old one,
        // so a panicking `Default` leaves the original allocation intact.
        let fresh_raw = sys::map(new, self.config.populate).map_err(|os_error| {
            warn!("mmap of {new} bytes for relocation failed (errno {os_error})");
            MapError::ExtendFailed {
                bytes: new,
                os_error,
            }
        })?;
        let fresh = fresh_raw.cast::<T>();
        let mapping = MappingGuard {
            ptr: fresh_raw,
            bytes: new,
        };
        // SAFETY: the fresh mapping holds `req` slots.
        construct(unsafe { slots(fresh, n, req) });
        mapping.disarm();
        // SAFETY: the regions are distinct; ownership of the `n` elements
        // moves to the fresh mapping.
        unsafe {
            umove(ptr.as_ptr(), slots(fresh, 0, n));
            if let Err(os_error) = sys::unmap(raw, old) {
                warn!("leaking {old} byte mapping after relocation (errno {os_error})");
            }
        }
        debug!("relocated {n} elements by copy: {raw:p} -> {fresh:p}");
        Ok(fresh)
    }
}

impl<T> Default for MmapAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for MmapAllocator<T> {
    fn clone(&self) -> Self {
        Self::with_config(self.config.clone())
    }
}

impl<T> std::fmt::Debug for MmapAllocator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmapAllocator")
            .field("config", &self.config)
            .finish()
    }
}

/// Uninitialized view of slots `[from, to)` of the allocation at `base`.
///
/// # Safety
///
/// The slots must lie inside the allocation and hold no live values.
unsafe fn slots<'a, T>(base: NonNull<T>, from: usize, to: usize) -> &'a mut [MaybeUninit<T>] {
    // SAFETY: forwarded to the caller.
    unsafe {
        slice::from_raw_parts_mut(base.as_ptr().add(from).cast::<MaybeUninit<T>>(), to - from)
    }
}
