use crate::error::{CapacityError, PackError, ValidationError};

/// Checks that `local` is made of whole triangles addressing only the
/// mesh's own `vertex_count` vertices.
pub fn validate_triangles(local: &[u32], vertex_count: usize) -> Result<(), ValidationError> {
    if local.len() % 3 != 0 {
        return Err(ValidationError::PartialTriangle(local.len()));
    }
    if let Some((position, &index)) = local
        .iter()
        .enumerate()
        .find(|&(_, &index)| index as usize >= vertex_count)
    {
        return Err(ValidationError::IndexOutOfRange {
            position,
            index,
            vertex_count,
        });
    }
    Ok(())
}

/// Rebases local indices onto the shared vertex buffer.
///
/// `vertex_range_start` is the mesh's first element in the position buffer;
/// dividing by `component_width` turns it into a vertex offset.
pub fn rebase(
    local: &[u32],
    vertex_range_start: usize,
    component_width: usize,
) -> Result<Vec<u32>, PackError> {
    if component_width == 0 {
        return Err(ValidationError::ZeroWidth.into());
    }
    if local.len() % 3 != 0 {
        return Err(ValidationError::PartialTriangle(local.len()).into());
    }
    let base_vertex = vertex_range_start / component_width;
    let base_vertex =
        u32::try_from(base_vertex).map_err(|_| CapacityError::IndexSpace(base_vertex))?;

    let mut global = local.to_vec();
    rebase_in_place(&mut global, base_vertex)?;
    Ok(global)
}

/// Adds `base_vertex` to every index. Nothing is written if any result
/// would not fit in a `u32`.
pub fn rebase_in_place(indices: &mut [u32], base_vertex: u32) -> Result<(), CapacityError> {
    if let Some(&max) = indices.iter().max() {
        if max.checked_add(base_vertex).is_none() {
            return Err(CapacityError::IndexSpace(
                max as usize + base_vertex as usize + 1,
            ));
        }
    }
    for index in indices.iter_mut() {
        *index += base_vertex;
    }
    Ok(())
}
