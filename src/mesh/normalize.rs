use std::borrow::Cow;

use bytemuck::Pod;

use super::ElementList;
use crate::error::ValidationError;

/// Number of `width`-sized elements in `list`, validating its shape.
pub fn element_count<T>(
    list: &ElementList<T>,
    width: usize,
    channel: &str,
) -> Result<usize, ValidationError> {
    match list {
        ElementList::Flat(values) => {
            if width == 0 || values.len() % width != 0 {
                return Err(ValidationError::FlatLength {
                    channel: channel.to_owned(),
                    len: values.len(),
                    width,
                });
            }
            Ok(values.len() / width)
        }
        ElementList::Tuples(tuples) => {
            if let Some((index, tuple)) = tuples
                .iter()
                .enumerate()
                .find(|(_, tuple)| tuple.len() != width)
            {
                return Err(ValidationError::TupleWidth {
                    channel: channel.to_owned(),
                    index,
                    len: tuple.len(),
                    width,
                });
            }
            Ok(tuples.len())
        }
    }
}

/// Flat row-major view of `list`. Flat input is borrowed as is.
pub fn normalize<'a, T: Pod>(
    list: &'a ElementList<T>,
    width: usize,
    channel: &str,
) -> Result<Cow<'a, [T]>, ValidationError> {
    let count = element_count(list, width, channel)?;
    match list {
        ElementList::Flat(values) => Ok(Cow::Borrowed(values.as_slice())),
        ElementList::Tuples(_) => {
            let mut flat = vec![T::zeroed(); count * width];
            flatten_into(list, width, &mut flat);
            Ok(Cow::Owned(flat))
        }
    }
}

/// Writes the flat form of an already validated `list` into `dst`, which
/// must be exactly `count * width` long. Element `i`, component `j` lands at
/// `dst[i * width + j]`.
pub fn flatten_into<T: Pod>(list: &ElementList<T>, width: usize, dst: &mut [T]) {
    match list {
        ElementList::Flat(values) => dst.copy_from_slice(values),
        ElementList::Tuples(tuples) => {
            for (row, tuple) in dst.chunks_exact_mut(width).zip(tuples) {
                row.copy_from_slice(tuple);
            }
        }
    }
}
