use std::mem;

use wgpu::util::DeviceExt;

use crate::instance::{TableFormat, TableUpload, UploadSink};
use crate::mesh::POSITION_WIDTH;
use crate::registry::GeometryBuffers;

impl TableFormat {
    pub fn to_wgpu(self) -> wgpu::TextureFormat {
        match self {
            TableFormat::R32Float => wgpu::TextureFormat::R32Float,
            TableFormat::Rg32Float => wgpu::TextureFormat::Rg32Float,
            TableFormat::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
        }
    }
}

fn float_format(width: usize) -> Option<wgpu::VertexFormat> {
    match width {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}

struct VertexStream {
    name: String,
    buffer: wgpu::Buffer,
    stride: wgpu::BufferAddress,
    attribute: wgpu::VertexAttribute,
}

/// Packed geometry uploaded into one vertex buffer per channel plus a
/// shared index buffer. Location 0 is position, 1 is the mesh id and
/// declared attributes follow in declaration order.
pub struct GpuGeometry {
    streams: Vec<VertexStream>,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuGeometry {
    pub fn from_buffers(device: &wgpu::Device, buffers: &GeometryBuffers) -> Self {
        let mut streams = vec![
            VertexStream {
                name: "position".to_owned(),
                buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("PositionBuffer"),
                    contents: bytemuck::cast_slice(buffers.positions()),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                stride: (POSITION_WIDTH * mem::size_of::<f32>()) as wgpu::BufferAddress,
                attribute: wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
            },
            VertexStream {
                name: "id".to_owned(),
                buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("IdBuffer"),
                    contents: bytemuck::cast_slice(buffers.ids()),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                stride: mem::size_of::<u32>() as wgpu::BufferAddress,
                attribute: wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Uint32,
                    offset: 0,
                    shader_location: 1,
                },
            },
        ];

        for attribute in buffers.attributes() {
            let Some(format) = float_format(attribute.channel.width) else {
                log::warn!(
                    "Skipping attribute `{}`: width {} has no vertex format",
                    attribute.channel.name,
                    attribute.channel.width
                );
                continue;
            };
            let shader_location = streams.len() as u32;
            streams.push(VertexStream {
                name: attribute.channel.name.clone(),
                buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("AttributeBuffer"),
                    contents: bytemuck::cast_slice(attribute.data()),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                stride: format.size(),
                attribute: wgpu::VertexAttribute {
                    format,
                    offset: 0,
                    shader_location,
                },
            });
        }

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("IndexBuffer"),
            contents: bytemuck::cast_slice(buffers.elements()),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            streams,
            index_buffer,
            index_count: buffers.index_count() as u32,
        }
    }

    pub fn vertex_buffer(&self, name: &str) -> Option<&wgpu::Buffer> {
        self.streams
            .iter()
            .find(|stream| stream.name == name)
            .map(|stream| &stream.buffer)
    }

    pub fn vertex_buffers(&self) -> impl Iterator<Item = &wgpu::Buffer> {
        self.streams.iter().map(|stream| &stream.buffer)
    }

    pub fn layouts(&self) -> Vec<wgpu::VertexBufferLayout<'_>> {
        self.streams
            .iter()
            .map(|stream| wgpu::VertexBufferLayout {
                array_stride: stream.stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: std::slice::from_ref(&stream.attribute),
            })
            .collect()
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// GPU copy of the instance table, read in shaders with `textureLoad`.
pub struct InstanceTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
    format: TableFormat,
}

impl InstanceTexture {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, format: TableFormat) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("InstanceTable"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: format.to_wgpu(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            width,
            height,
            format,
        }
    }

    pub fn matches(&self, upload: &TableUpload<'_>) -> bool {
        self.width == upload.width && self.height == upload.height && self.format == upload.format
    }

    pub fn write(&self, queue: &wgpu::Queue, upload: &TableUpload<'_>) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            upload.bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(upload.bytes_per_row()),
                rows_per_image: Some(upload.height),
            },
            wgpu::Extent3d {
                width: upload.width,
                height: upload.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// Upload sink that keeps an [`InstanceTexture`] in sync with the table,
/// recreating it whenever the table's shape changes.
pub struct TextureSink<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    texture: Option<InstanceTexture>,
}

impl<'a> TextureSink<'a> {
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            texture: None,
        }
    }

    pub fn texture(&self) -> Option<&InstanceTexture> {
        self.texture.as_ref()
    }
}

impl UploadSink for TextureSink<'_> {
    fn upload(&mut self, upload: &TableUpload<'_>) {
        if upload.width == 0 || upload.height == 0 {
            log::debug!("Skipping upload of empty instance table");
            return;
        }

        let stale = self
            .texture
            .as_ref()
            .map_or(true, |texture| !texture.matches(upload));
        if stale {
            log::info!(
                "Creating instance texture {}x{} ({:?})",
                upload.width,
                upload.height,
                upload.format
            );
            self.texture = Some(InstanceTexture::new(
                self.device,
                upload.width,
                upload.height,
                upload.format,
            ));
        }

        if let Some(texture) = &self.texture {
            texture.write(self.queue, upload);
        }
    }
}

/// Blocks on a default adapter and device without a surface.
pub fn request_headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

    let adapter = match pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: None,
        force_fallback_adapter: false,
    })) {
        Ok(adapter) => adapter,
        Err(err) => {
            log::warn!("No GPU adapter available: {}", err);
            return None;
        }
    };
    log::info!("Using adapter: {:?}", adapter.get_info());

    match pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("Device"),
        ..Default::default()
    })) {
        Ok(pair) => Some(pair),
        Err(err) => {
            log::warn!("Failed to create device: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_formats_map_to_float_textures() {
        assert_eq!(
            TableFormat::Rgba32Float.to_wgpu().block_copy_size(None),
            Some(16)
        );
        assert_eq!(TableFormat::R32Float.to_wgpu(), wgpu::TextureFormat::R32Float);
    }

    #[test]
    fn attribute_widths_map_to_vertex_formats() {
        assert_eq!(float_format(3).map(|f| f.size()), Some(12));
        assert!(float_format(5).is_none());
    }
}
