use std::ops::Range;

use crate::buffer::TypedBuffer;
use crate::error::CapacityError;
use crate::mesh::rebase::rebase_in_place;
use crate::mesh::{flatten_into, MeshCounts, MeshDescriptor, CELL_WIDTH, POSITION_WIDTH};
use crate::settings::AttributeChannel;

use super::directory::MeshId;

/// Where one mesh lives inside the shared buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshRecord {
    pub id: MeshId,
    pub name: String,
    /// Element range in the position buffer (3 floats per vertex).
    pub positions: Range<usize>,
    /// Element range in the index buffer.
    pub cells: Range<usize>,
}

impl MeshRecord {
    /// Vertex range; also the element range of the id buffer.
    pub fn vertices(&self) -> Range<usize> {
        self.positions.start / POSITION_WIDTH..self.positions.end / POSITION_WIDTH
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().len()
    }

    pub fn index_count(&self) -> usize {
        self.cells.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.cells.len() / CELL_WIDTH
    }

    /// Element range of this mesh inside an attribute buffer of `width`.
    pub fn attribute_range(&self, width: usize) -> Range<usize> {
        let vertices = self.vertices();
        vertices.start * width..vertices.end * width
    }
}

#[derive(Debug, Clone)]
pub struct AttributeBuffer {
    pub channel: AttributeChannel,
    data: TypedBuffer<f32>,
}

impl AttributeBuffer {
    pub fn data(&self) -> &[f32] {
        self.data.as_slice()
    }
}

/// Shared position, id, index and attribute buffers.
#[derive(Debug, Clone)]
pub struct GeometryBuffers {
    positions: TypedBuffer<f32>,
    ids: TypedBuffer<u32>,
    elements: TypedBuffer<u32>,
    attributes: Vec<AttributeBuffer>,
}

impl GeometryBuffers {
    pub fn new(channels: &[AttributeChannel]) -> Self {
        Self {
            positions: TypedBuffer::new("positions"),
            ids: TypedBuffer::new("ids"),
            elements: TypedBuffer::new("elements"),
            attributes: channels
                .iter()
                .map(|channel| AttributeBuffer {
                    channel: channel.clone(),
                    data: TypedBuffer::new("attribute"),
                })
                .collect(),
        }
    }

    /// Buffers sized exactly for `totals`, every element occupied.
    pub fn exact(channels: &[AttributeChannel], totals: MeshCounts) -> Result<Self, CapacityError> {
        Ok(Self {
            positions: TypedBuffer::zeroed("positions", totals.vertices * POSITION_WIDTH)?,
            ids: TypedBuffer::zeroed("ids", totals.vertices)?,
            elements: TypedBuffer::zeroed("elements", totals.indices)?,
            attributes: channels
                .iter()
                .map(|channel| {
                    Ok(AttributeBuffer {
                        channel: channel.clone(),
                        data: TypedBuffer::zeroed("attribute", totals.vertices * channel.width)?,
                    })
                })
                .collect::<Result<_, CapacityError>>()?,
        })
    }

    pub fn positions(&self) -> &[f32] {
        self.positions.as_slice()
    }

    pub fn ids(&self) -> &[u32] {
        self.ids.as_slice()
    }

    pub fn elements(&self) -> &[u32] {
        self.elements.as_slice()
    }

    pub fn attribute(&self, name: &str) -> Option<&[f32]> {
        self.attributes
            .iter()
            .find(|attribute| attribute.channel.name == name)
            .map(AttributeBuffer::data)
    }

    pub fn attributes(&self) -> &[AttributeBuffer] {
        &self.attributes
    }

    pub fn vertex_count(&self) -> usize {
        self.ids.len()
    }

    pub fn index_count(&self) -> usize {
        self.elements.len()
    }

    /// Allocated vertex slots, including unused trailing capacity.
    pub fn vertex_capacity(&self) -> usize {
        self.ids.capacity()
    }

    /// Room for `counts` more data in every buffer. Growth preserves
    /// contents, so a failure here leaves the occupied regions untouched.
    pub fn reserve(&mut self, counts: MeshCounts) -> Result<(), CapacityError> {
        self.positions.reserve(counts.vertices * POSITION_WIDTH)?;
        self.ids.reserve(counts.vertices)?;
        self.elements.reserve(counts.indices)?;
        for attribute in &mut self.attributes {
            attribute
                .data
                .reserve(counts.vertices * attribute.channel.width)?;
        }
        Ok(())
    }

    /// Extends every occupied region by `counts`, zero-filled.
    pub fn claim(&mut self, counts: MeshCounts) -> Result<(), CapacityError> {
        self.reserve(counts)?;
        self.positions.claim(counts.vertices * POSITION_WIDTH)?;
        self.ids.claim(counts.vertices)?;
        self.elements.claim(counts.indices)?;
        for attribute in &mut self.attributes {
            attribute
                .data
                .claim(counts.vertices * attribute.channel.width)?;
        }
        Ok(())
    }

    /// Writes an already validated mesh into the ranges named by `record`,
    /// rebasing its indices onto the record's first vertex.
    pub fn write(
        &mut self,
        record: &MeshRecord,
        mesh: &MeshDescriptor,
    ) -> Result<(), CapacityError> {
        flatten_into(
            &mesh.positions,
            POSITION_WIDTH,
            self.positions.range_mut(record.positions.clone()),
        );

        self.ids.range_mut(record.vertices()).fill(record.id.get());

        let cells = self.elements.range_mut(record.cells.clone());
        flatten_into(&mesh.cells, CELL_WIDTH, cells);
        let base_vertex = u32::try_from(record.vertices().start)
            .map_err(|_| CapacityError::IndexSpace(record.vertices().end))?;
        rebase_in_place(cells, base_vertex)?;

        for attribute in &mut self.attributes {
            let width = attribute.channel.width;
            if let Some(data) = mesh.attributes.get(&attribute.channel.name) {
                flatten_into(data, width, attribute.data.range_mut(record.attribute_range(width)));
            }
        }
        Ok(())
    }

    /// Empties every buffer, keeping its allocation for reuse.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.ids.clear();
        self.elements.clear();
        for attribute in &mut self.attributes {
            attribute.data.clear();
        }
    }
}
