/// Dimensions of a near-square 2D table holding at least `count` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableSize {
    pub width: usize,
    pub height: usize,
    /// Total scalar elements: `width * height * channels`.
    pub length: usize,
}

impl TableSize {
    pub fn cells(&self) -> usize {
        self.width * self.height
    }
}

/// Smallest near-square table with `width * height >= count`.
///
/// `width` is `ceil(sqrt(count))` and `height` is `ceil(count / width)`, so
/// the two never differ by more than one and `length` grows monotonically
/// with `count`. An empty table is `(0, 0, 0)`.
pub fn table_size(count: usize, channels: usize) -> TableSize {
    if count == 0 {
        return TableSize::default();
    }

    let width = ceil_sqrt(count);
    let height = count.div_ceil(width);
    TableSize {
        width,
        height,
        length: width * height * channels,
    }
}

fn ceil_sqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root * root < n {
        root += 1;
    }
    while root > 1 && (root - 1) * (root - 1) >= n {
        root -= 1;
    }
    root
}
