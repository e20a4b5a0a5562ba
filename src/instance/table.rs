use glam::Mat4;

use super::sizer::{table_size, TableSize};
use super::upload::{TableFormat, TableUpload};
use crate::buffer::TypedBuffer;
use crate::error::CapacityError;

/// Floats per instance slot: one 4x4 matrix.
pub const SLOT_FLOATS: usize = 16;

/// One transform slot per mesh id, stored in a near-square float table.
///
/// Slot `i` always occupies floats `[16 * i, 16 * i + 16)` regardless of the
/// table's width, so growing the table never moves existing transforms.
#[derive(Debug, Clone)]
pub struct InstanceTable {
    data: TypedBuffer<f32>,
    size: TableSize,
    format: TableFormat,
    count: usize,
}

impl InstanceTable {
    pub fn new(format: TableFormat) -> Self {
        Self {
            data: TypedBuffer::new("instance table"),
            size: TableSize::default(),
            format,
            count: 0,
        }
    }

    pub fn format(&self) -> TableFormat {
        self.format
    }

    pub fn size(&self) -> TableSize {
        self.size
    }

    /// Number of live slots.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of slots the current table can hold.
    pub fn capacity(&self) -> usize {
        self.size.length / SLOT_FLOATS
    }

    fn texels_per_slot(&self) -> usize {
        SLOT_FLOATS / self.format.channels()
    }

    fn size_for(&self, slots: usize) -> TableSize {
        table_size(slots * self.texels_per_slot(), self.format.channels())
    }

    /// Replaces the table with one sized for exactly `count` slots.
    pub fn allocate_exact(&mut self, count: usize) -> Result<(), CapacityError> {
        let size = self.size_for(count);
        self.data = TypedBuffer::zeroed("instance table", size.length)?;
        self.size = size;
        self.count = count;
        Ok(())
    }

    /// Makes room for `count` slots, at least doubling when the table is full.
    pub fn ensure(&mut self, count: usize) -> Result<(), CapacityError> {
        if count > self.capacity() {
            let target = count.max(self.capacity() * 2);
            let size = self.size_for(target);
            self.data.grow(size.length)?;
            let extra = size.length - self.data.len();
            self.data.claim(extra)?;
            log::info!(
                "Growing instance table: {}x{} -> {}x{}",
                self.size.width,
                self.size.height,
                size.width,
                size.height
            );
            self.size = size;
        }
        self.count = self.count.max(count);
        Ok(())
    }

    pub fn as_slice(&self) -> &[f32] {
        self.data.as_slice()
    }

    pub fn slot(&self, id: usize) -> Option<&[f32; SLOT_FLOATS]> {
        if id >= self.count {
            return None;
        }
        let start = id * SLOT_FLOATS;
        <&[f32; SLOT_FLOATS]>::try_from(&self.data.as_slice()[start..start + SLOT_FLOATS]).ok()
    }

    pub fn slot_mut(&mut self, id: usize) -> Option<&mut [f32; SLOT_FLOATS]> {
        if id >= self.count {
            return None;
        }
        let start = id * SLOT_FLOATS;
        let slot = &mut self.data.as_mut_slice()[start..start + SLOT_FLOATS];
        <&mut [f32; SLOT_FLOATS]>::try_from(slot).ok()
    }

    /// Writes `transform` into slot `id`; returns false for an unknown id.
    pub fn set_transform(&mut self, id: usize, transform: Mat4) -> bool {
        match self.slot_mut(id) {
            Some(slot) => {
                *slot = transform.to_cols_array();
                true
            }
            None => false,
        }
    }

    pub fn transform(&self, id: usize) -> Option<Mat4> {
        self.slot(id).map(Mat4::from_cols_array)
    }

    pub fn upload(&self) -> TableUpload<'_> {
        TableUpload {
            data: self.data.as_slice(),
            width: self.size.width as u32,
            height: self.size.height as u32,
            format: self.format,
        }
    }

    pub fn clear(&mut self) {
        self.data.release();
        self.size = TableSize::default();
        self.count = 0;
    }
}
