/// Channel layout of the instance table as seen by the render backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableFormat {
    R32Float,
    Rg32Float,
    Rgba32Float,
}

impl TableFormat {
    pub fn from_channels(channels: usize) -> Option<Self> {
        match channels {
            1 => Some(Self::R32Float),
            2 => Some(Self::Rg32Float),
            4 => Some(Self::Rgba32Float),
            _ => None,
        }
    }

    pub fn channels(self) -> usize {
        match self {
            Self::R32Float => 1,
            Self::Rg32Float => 2,
            Self::Rgba32Float => 4,
        }
    }

    pub fn bytes_per_texel(self) -> usize {
        self.channels() * std::mem::size_of::<f32>()
    }
}

/// A ready-to-upload view of the instance table.
#[derive(Debug, Clone, Copy)]
pub struct TableUpload<'a> {
    pub data: &'a [f32],
    pub width: u32,
    pub height: u32,
    pub format: TableFormat,
}

impl TableUpload<'_> {
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.data)
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * self.format.bytes_per_texel() as u32
    }
}

/// Receives the instance table and pushes it to a rendering backend.
pub trait UploadSink {
    fn upload(&mut self, upload: &TableUpload<'_>);
}

impl<F> UploadSink for F
where
    F: FnMut(&TableUpload<'_>),
{
    fn upload(&mut self, upload: &TableUpload<'_>) {
        self(upload)
    }
}
