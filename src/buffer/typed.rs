use std::mem;
use std::ops::Range;

use bytemuck::Pod;

use crate::error::CapacityError;

/// Contiguous, strongly typed numeric storage with an explicit write cursor.
///
/// The backing storage is always fully initialised (zero-filled past the
/// cursor), so `capacity()` is the number of elements that can be written
/// before the next reallocation. Growth copies the occupied prefix
/// `[0, len)` into the new allocation unchanged.
#[derive(Debug, Clone)]
pub struct TypedBuffer<T: Pod> {
    storage: Vec<T>,
    len: usize,
    label: &'static str,
}

impl<T: Pod> TypedBuffer<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            storage: Vec::new(),
            len: 0,
            label,
        }
    }

    pub fn with_capacity(label: &'static str, capacity: usize) -> Result<Self, CapacityError> {
        let mut buffer = Self::new(label);
        buffer.grow(capacity)?;
        Ok(buffer)
    }

    /// Allocates exactly `len` zeroed elements and marks them all occupied.
    pub fn zeroed(label: &'static str, len: usize) -> Result<Self, CapacityError> {
        let mut buffer = Self::with_capacity(label, len)?;
        buffer.len = len;
        Ok(buffer)
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Occupied region only.
    pub fn as_slice(&self) -> &[T] {
        &self.storage[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.storage[..self.len]
    }

    /// Whole backing storage, including unused trailing capacity.
    pub fn storage(&self) -> &[T] {
        &self.storage
    }

    /// Replaces the backing storage with one of `new_capacity` elements.
    /// No-op when the buffer is already at least that large.
    pub fn grow(&mut self, new_capacity: usize) -> Result<(), CapacityError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }

        let element_size = mem::size_of::<T>().max(1);
        match new_capacity.checked_mul(element_size) {
            Some(bytes) if bytes <= isize::MAX as usize => {}
            _ => {
                return Err(CapacityError::Overflow {
                    requested: new_capacity,
                    element_size,
                })
            }
        }

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(new_capacity)
            .map_err(|_| CapacityError::AllocationFailed {
                requested: new_capacity,
            })?;
        storage.extend_from_slice(&self.storage[..self.len]);
        storage.resize(new_capacity, T::zeroed());

        log::debug!(
            "Growing {} buffer: {} -> {}",
            self.label,
            self.capacity(),
            new_capacity
        );

        self.storage = storage;
        Ok(())
    }

    /// Guarantees room for `additional` more elements past the cursor.
    pub fn reserve(&mut self, additional: usize) -> Result<(), CapacityError> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(CapacityError::Overflow {
                requested: usize::MAX,
                element_size: mem::size_of::<T>(),
            })?;
        if required <= self.capacity() {
            return Ok(());
        }

        let doubled = self.capacity().saturating_mul(2);
        self.grow(doubled.max(required))
    }

    /// Advances the cursor by `count` elements and returns the claimed,
    /// zero-initialised region for the caller to fill.
    pub fn claim(&mut self, count: usize) -> Result<&mut [T], CapacityError> {
        self.reserve(count)?;
        let start = self.len;
        self.len += count;
        Ok(&mut self.storage[start..self.len])
    }

    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<(), CapacityError> {
        self.claim(values.len())?.copy_from_slice(values);
        Ok(())
    }

    pub fn range_mut(&mut self, range: Range<usize>) -> &mut [T] {
        &mut self.as_mut_slice()[range]
    }

    /// Drops the occupied region but keeps the allocation.
    pub fn clear(&mut self) {
        self.storage[..self.len].fill(T::zeroed());
        self.len = 0;
    }

    /// Drops the allocation entirely.
    pub fn release(&mut self) {
        self.storage = Vec::new();
        self.len = 0;
    }
}
