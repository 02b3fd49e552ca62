//! By-value iterators.

use std::fmt;
use std::iter::FusedIterator;
use std::mem::MaybeUninit;
use std::ptr;
use std::slice;

use vessel_mem::raw::destroy_n;

use crate::raw::RawBuf;

/// Owning iterator over a [`DynArray`](crate::DynArray).
///
/// Elements not yet yielded are destroyed when the iterator is dropped.
pub struct IntoIter<T> {
    buf: RawBuf<T>,
    start: usize,
    end: usize,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(buf: RawBuf<T>, len: usize) -> Self {
        Self {
            buf,
            start: 0,
            end: len,
        }
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[start, end)` is live.
        unsafe { slice::from_raw_parts(self.buf.ptr().add(self.start), self.end - self.start) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: slot `start` is live and leaves the counted range.
        let value = unsafe { ptr::read(self.buf.ptr().add(self.start)) };
        self.start += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.start;
        (n, Some(n))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: slot `end` was live and left the counted range.
        Some(unsafe { ptr::read(self.buf.ptr().add(self.end)) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        // SAFETY: `[start, end)` is live and never yielded.
        unsafe { destroy_n(self.buf.ptr().add(self.start), self.end - self.start) };
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

/// Owning iterator over a [`StaticArray`](crate::StaticArray).
pub struct StaticIntoIter<T, const N: usize> {
    buf: [MaybeUninit<T>; N],
    start: usize,
    end: usize,
}

impl<T, const N: usize> StaticIntoIter<T, N> {
    pub(crate) fn new(buf: [MaybeUninit<T>; N], len: usize) -> Self {
        Self {
            buf,
            start: 0,
            end: len,
        }
    }

    fn base(&mut self) -> *mut T {
        self.buf.as_mut_ptr().cast::<T>()
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[start, end)` is live.
        unsafe {
            slice::from_raw_parts(
                self.buf.as_ptr().cast::<T>().add(self.start),
                self.end - self.start,
            )
        }
    }
}

impl<T, const N: usize> Iterator for StaticIntoIter<T, N> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        let i = self.start;
        self.start += 1;
        // SAFETY: slot `i` is live and left the counted range.
        Some(unsafe { ptr::read(self.base().add(i)) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.start;
        (n, Some(n))
    }
}

impl<T, const N: usize> DoubleEndedIterator for StaticIntoIter<T, N> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        let i = self.end;
        // SAFETY: slot `i` was live and left the counted range.
        Some(unsafe { ptr::read(self.base().add(i)) })
    }
}

impl<T, const N: usize> ExactSizeIterator for StaticIntoIter<T, N> {}
impl<T, const N: usize> FusedIterator for StaticIntoIter<T, N> {}

impl<T, const N: usize> Drop for StaticIntoIter<T, N> {
    fn drop(&mut self) {
        let (start, n) = (self.start, self.end - self.start);
        // SAFETY: `[start, end)` is live and never yielded.
        unsafe { destroy_n(self.base().add(start), n) };
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for StaticIntoIter<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticIntoIter")
            .field(&self.as_slice())
            .finish()
    }
}
