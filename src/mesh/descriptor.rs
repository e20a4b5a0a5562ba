use std::collections::BTreeMap;

use super::normalize::{element_count, normalize};
use super::rebase::validate_triangles;
use super::{ElementList, IndexList, VertexList};
use crate::error::ValidationError;
use crate::settings::AttributeChannel;

/// Components per position.
pub const POSITION_WIDTH: usize = 3;
/// Indices per triangle.
pub const CELL_WIDTH: usize = 3;

/// A caller-authored mesh, consumed by `MeshRegistry::add`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshDescriptor {
    pub positions: VertexList,
    pub cells: IndexList,
    pub attributes: BTreeMap<String, VertexList>,
}

/// Sizes of a validated mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshCounts {
    pub vertices: usize,
    pub indices: usize,
}

impl MeshDescriptor {
    pub fn new(positions: impl Into<VertexList>, cells: impl Into<IndexList>) -> Self {
        Self {
            positions: positions.into(),
            cells: cells.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, data: impl Into<VertexList>) -> Self {
        self.attributes.insert(name.into(), data.into());
        self
    }

    /// Validates shape, triangle indices and attribute channels against the
    /// registry's declared `channels`, returning the mesh's sizes.
    pub fn measure(&self, channels: &[AttributeChannel]) -> Result<MeshCounts, ValidationError> {
        let vertices = element_count(&self.positions, POSITION_WIDTH, "positions")?;

        if let ElementList::Flat(values) = &self.cells {
            if values.len() % CELL_WIDTH != 0 {
                return Err(ValidationError::PartialTriangle(values.len()));
            }
        }
        let cells = normalize(&self.cells, CELL_WIDTH, "cells")?;
        validate_triangles(&cells, vertices)?;

        for channel in channels {
            let data = self
                .attributes
                .get(&channel.name)
                .ok_or_else(|| ValidationError::MissingAttribute(channel.name.clone()))?;
            let count = element_count(data, channel.width, &channel.name)?;
            if count != vertices {
                return Err(ValidationError::AttributeCount {
                    channel: channel.name.clone(),
                    count,
                    expected: vertices,
                });
            }
        }

        if let Some(unknown) = self
            .attributes
            .keys()
            .find(|name| !channels.iter().any(|channel| &channel.name == *name))
        {
            return Err(ValidationError::UnknownAttribute(unknown.clone()));
        }

        Ok(MeshCounts {
            vertices,
            indices: cells.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshDescriptor {
        MeshDescriptor::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0u32, 1, 2]],
        )
    }

    fn uv_channel() -> Vec<AttributeChannel> {
        vec![AttributeChannel::new("uv", 2)]
    }

    #[test]
    fn measures_vertices_and_indices() {
        let counts = triangle().measure(&[]).unwrap();
        assert_eq!(
            counts,
            MeshCounts {
                vertices: 3,
                indices: 3
            }
        );
    }

    #[test]
    fn declared_attribute_must_be_present() {
        assert_eq!(
            triangle().measure(&uv_channel()),
            Err(ValidationError::MissingAttribute("uv".into()))
        );
    }

    #[test]
    fn attribute_vertex_count_must_match_positions() {
        let mesh = triangle().with_attribute("uv", vec![[0.0f32, 0.0], [1.0, 0.0]]);
        assert_eq!(
            mesh.measure(&uv_channel()),
            Err(ValidationError::AttributeCount {
                channel: "uv".into(),
                count: 2,
                expected: 3
            })
        );
    }

    #[test]
    fn undeclared_attribute_is_rejected() {
        let mesh = triangle().with_attribute("color", vec![0.0f32; 9]);
        assert_eq!(
            mesh.measure(&[]),
            Err(ValidationError::UnknownAttribute("color".into()))
        );
    }

    #[test]
    fn partial_flat_triangle_is_rejected() {
        let mut mesh = triangle();
        mesh.cells = vec![0u32, 1, 2, 0].into();
        assert_eq!(mesh.measure(&[]), Err(ValidationError::PartialTriangle(4)));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut mesh = triangle();
        mesh.cells = vec![0u32, 1, 5].into();
        assert!(matches!(
            mesh.measure(&[]),
            Err(ValidationError::IndexOutOfRange { index: 5, .. })
        ));
    }
}
