use bytemuck::Pod;

/// Per-vertex or per-triangle data in one of the two accepted layouts.
///
/// `Flat` holds `count * width` scalars back to back, `Tuples` holds one
/// inner vector of `width` scalars per element. Both describe the same data
/// and normalize to the same flat sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementList<T> {
    Flat(Vec<T>),
    Tuples(Vec<Vec<T>>),
}

pub type VertexList = ElementList<f32>;
pub type IndexList = ElementList<u32>;

impl<T> ElementList<T> {
    /// Number of raw entries: scalars for `Flat`, tuples for `Tuples`.
    pub fn raw_len(&self) -> usize {
        match self {
            Self::Flat(values) => values.len(),
            Self::Tuples(tuples) => tuples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw_len() == 0
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Self::Flat(_))
    }
}

impl<T> Default for ElementList<T> {
    fn default() -> Self {
        Self::Flat(Vec::new())
    }
}

macro_rules! impl_flat_from {
    ($($scalar:ty),*) => {$(
        impl From<Vec<$scalar>> for ElementList<$scalar> {
            fn from(values: Vec<$scalar>) -> Self {
                Self::Flat(values)
            }
        }

        impl From<&[$scalar]> for ElementList<$scalar> {
            fn from(values: &[$scalar]) -> Self {
                Self::Flat(values.to_vec())
            }
        }
    )*};
}

impl_flat_from!(f32, u32);

impl<T: Pod, const N: usize> From<Vec<[T; N]>> for ElementList<T> {
    fn from(tuples: Vec<[T; N]>) -> Self {
        Self::Tuples(tuples.into_iter().map(|t| t.to_vec()).collect())
    }
}

impl<T: Pod, const N: usize> From<&[[T; N]]> for ElementList<T> {
    fn from(tuples: &[[T; N]]) -> Self {
        Self::Tuples(tuples.iter().map(|t| t.to_vec()).collect())
    }
}

impl<T> From<Vec<Vec<T>>> for ElementList<T> {
    fn from(tuples: Vec<Vec<T>>) -> Self {
        Self::Tuples(tuples)
    }
}
