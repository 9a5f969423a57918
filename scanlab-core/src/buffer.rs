//! Buffers under test
//!
//! A [`Buffer`] is the contiguous region of fixed-width elements every
//! strategy operates on. It is either owned heap memory or a read-only
//! shared mapping of a headerless column file.

use core::marker::PhantomData;
use core::ops::Deref;
use std::alloc::{self, Layout};
use std::fs::File;
use std::io;
use std::path::Path;

use log::debug;
use memmap2::{Mmap, MmapOptions};

use crate::element::Element;
use crate::error::{Error, Result};

/// Where a buffer's bytes come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backing {
    /// Anonymous memory owned by the process
    OwnedHeap,
    /// Read-only shared mapping of a file
    MappedReadonlyFile,
}

enum Storage<T> {
    Heap(Vec<T>),
    Mapped {
        /// `None` for a zero-length file, which cannot be mapped
        map: Option<Mmap>,
        count: usize,
        _marker: PhantomData<T>,
    },
}

/// A contiguous region of `T` elements
pub struct Buffer<T: Element> {
    storage: Storage<T>,
}

impl<T: Element> Buffer<T> {
    /// Allocate `count` elements on the heap.
    ///
    /// The pages come from the allocator zeroed and untouched, so the OS
    /// materialises them on first access. Callers fill the buffer before
    /// timing anything that depends on its contents.
    pub fn allocate(count: usize) -> Result<Self> {
        zeroed_vec(count).map(Self::from_vec)
    }

    /// Allocate `count` elements and fill element `i` with `fill(i)`.
    ///
    /// Every page is written here, so none is first touched while timed.
    pub fn filled_with(count: usize, fill: impl FnMut(usize) -> T) -> Result<Self> {
        filled_vec(count, fill).map(Self::from_vec)
    }

    /// Wrap an already filled vector
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { storage: Storage::Heap(data) }
    }

    /// Map the file at `path` read-only and shared.
    ///
    /// The descriptor is closed as soon as the mapping exists. The element
    /// count is `byte_len / T::WIDTH`; trailing bytes that do not form a
    /// whole element are not visible. Choosing a `T` that does not match
    /// the file's record layout is the caller's mistake and is not detected.
    pub fn map_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::OpenFailure {
            path: path.to_path_buf(),
            source,
        })?;

        let stat_failure = |source| Error::StatFailure { path: path.to_path_buf(), source };
        let byte_len = file.metadata().map_err(stat_failure)?.len();
        let byte_len = usize::try_from(byte_len).map_err(|_| {
            stat_failure(io::Error::new(
                io::ErrorKind::InvalidData,
                "file length exceeds the address space",
            ))
        })?;

        let map = if byte_len == 0 {
            None
        } else {
            // SAFETY: the mapping is read-only; this process never writes
            // through it. Concurrent truncation by another process is outside
            // the harness's control, as with any mmap-based reader.
            let map = unsafe { MmapOptions::new().len(byte_len).map(&file) }.map_err(|source| {
                Error::MapFailure { path: path.to_path_buf(), source }
            })?;
            debug_assert_eq!(map.as_ptr().align_offset(core::mem::align_of::<T>()), 0);
            Some(map)
        };
        drop(file);

        let count = byte_len / T::WIDTH;
        let buffer = Self {
            storage: Storage::Mapped { map, count, _marker: PhantomData },
        };
        debug!(
            "mapped {} at {:#x} ({} bytes, {} elements of {} bytes)",
            path.display(),
            buffer.base_addr(),
            byte_len,
            count,
            buffer.width()
        );
        Ok(buffer)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Heap(data) => data.len(),
            Storage::Mapped { count, .. } => *count,
        }
    }

    /// Whether the buffer holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element width in bytes
    pub fn width(&self) -> usize {
        T::WIDTH
    }

    /// Bytes covered by the typed view
    pub fn byte_len(&self) -> usize {
        self.len() * T::WIDTH
    }

    /// Backing kind
    pub fn backing(&self) -> Backing {
        match &self.storage {
            Storage::Heap(_) => Backing::OwnedHeap,
            Storage::Mapped { .. } => Backing::MappedReadonlyFile,
        }
    }

    /// Base address of the region, for reporting
    pub fn base_addr(&self) -> usize {
        self.as_slice().as_ptr() as usize
    }

    /// Typed read-only view
    pub fn as_slice(&self) -> &[T] {
        match &self.storage {
            Storage::Heap(data) => data,
            Storage::Mapped { map: None, .. } => &[],
            Storage::Mapped { map: Some(map), count, .. } => {
                // SAFETY: mappings are page aligned, `count * WIDTH` bytes
                // are inside the mapping, and every bit pattern is a valid
                // integer element.
                unsafe { core::slice::from_raw_parts(map.as_ptr() as *const T, *count) }
            }
        }
    }

    /// Mutable view; `None` for read-only mappings
    pub fn as_mut_slice(&mut self) -> Option<&mut [T]> {
        match &mut self.storage {
            Storage::Heap(data) => Some(data),
            Storage::Mapped { .. } => None,
        }
    }

    /// Unmap or free the region now instead of at end of scope.
    ///
    /// Consumes the buffer, so a second release cannot be written.
    pub fn release(self) {
        debug!("releasing {:?}", self);
        drop(self);
    }

    pub(crate) fn mapping(&self) -> Option<&Mmap> {
        match &self.storage {
            Storage::Mapped { map, .. } => map.as_ref(),
            Storage::Heap(_) => None,
        }
    }
}

/// Zeroed heap vector of `count` elements.
///
/// Used for strategy outputs, which must be writable. Fails with
/// [`Error::AllocationFailure`] instead of aborting when the allocator
/// refuses the request.
pub fn zeroed_vec<T: Element>(count: usize) -> Result<Vec<T>> {
    let failure = || Error::AllocationFailure { count, width: T::WIDTH };
    if count == 0 {
        return Ok(Vec::new());
    }

    let layout = Layout::array::<T>(count).map_err(|_| failure())?;
    // SAFETY: `layout` has non-zero size because `count > 0` and every
    // element type is at least one byte wide.
    let ptr = unsafe { alloc::alloc_zeroed(layout) } as *mut T;
    if ptr.is_null() {
        return Err(failure());
    }

    debug!("allocated {} elements ({} bytes) at {:#x}", count, layout.size(), ptr as usize);
    // SAFETY: `ptr` was allocated by the global allocator with the
    // layout of `[T; count]`, and all-zero bytes are a valid `T`.
    Ok(unsafe { Vec::from_raw_parts(ptr, count, count) })
}

/// Heap vector with element `i` set to `fill(i)`
pub fn filled_vec<T: Element>(count: usize, mut fill: impl FnMut(usize) -> T) -> Result<Vec<T>> {
    let mut data = zeroed_vec(count)?;
    for (i, slot) in data.iter_mut().enumerate() {
        *slot = fill(i);
    }
    Ok(data)
}

impl<T: Element> Deref for Buffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Element> core::fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Buffer")
            .field("backing", &self.backing())
            .field("len", &self.len())
            .field("width", &self.width())
            .field("base", &format_args!("{:#x}", self.base_addr()))
            .finish()
    }
}
