use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use glam::{Mat4, Vec3};
use mesh_packer::gpu::{self, GpuGeometry, TextureSink};
use mesh_packer::{primitives, MeshRegistry, PackError, PackerSettings, TableUpload};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const MESH_COUNT: usize = 100;
const FRAMES: usize = 120;
const SCENE_AXIS: Vec3 = Vec3::new(0.39, 0.92, 0.04);

fn build_scene(registry: &mut MeshRegistry, clock: &Rc<Cell<f32>>) -> Result<(), PackError> {
    let mut rng = SmallRng::seed_from_u64(7);
    let with_normals = registry
        .settings()
        .attributes
        .iter()
        .any(|channel| channel.name == "normal");

    for i in 0..MESH_COUNT {
        let radius = rng.gen_range(0.0f32..20.0);
        let theta = rng.gen_range(0.0f32..std::f32::consts::TAU);
        let phi = rng.gen_range(-1.0f32..1.0) * std::f32::consts::FRAC_PI_2;
        let offset = Vec3::new(phi.sin() * radius, theta.sin() * radius, theta.cos() * radius);
        let axis = Vec3::new(
            rng.gen_range(-1.0f32..1.0),
            rng.gen_range(-1.0f32..1.0),
            rng.gen_range(-1.0f32..1.0),
        )
        .try_normalize()
        .unwrap_or(Vec3::Y);

        let mesh = if i % 2 == 0 || with_normals {
            primitives::sphere(12, 6, with_normals)
        } else {
            primitives::cube()
        };

        let clock = Rc::clone(clock);
        let spin = i as f32;
        registry.add_with_transform(&format!("object{i}"), mesh, move |slot: &mut [f32; 16]| {
            let t = clock.get();
            let model = Mat4::from_axis_angle(SCENE_AXIS.normalize(), t * 0.1)
                * Mat4::from_translation(offset)
                * Mat4::from_axis_angle(axis, t + spin);
            *slot = model.to_cols_array();
        })?;
    }

    registry.pack()
}

fn run() -> Result<(), PackError> {
    let settings = PackerSettings::load_from_path("packer.json");
    let mut registry = MeshRegistry::new(settings)?;
    let clock = Rc::new(Cell::new(0.0f32));

    let started = Instant::now();
    build_scene(&mut registry, &clock)?;
    log::info!(
        "Built {} meshes in {:?}: {} vertices, {} indices ({:?} mode)",
        registry.len(),
        started.elapsed(),
        registry.vertex_count(),
        registry.index_count(),
        registry.mode()
    );

    let device = gpu::request_headless_device();
    let mut uploaded_bytes = 0usize;

    match &device {
        Some((device, queue)) => {
            let geometry = GpuGeometry::from_buffers(device, registry.buffers());
            log::info!(
                "Uploaded {} vertex streams, {} indices",
                geometry.layouts().len(),
                geometry.index_count()
            );
            let mut sink = TextureSink::new(device, queue);
            for frame in 0..FRAMES {
                clock.set(frame as f32 / 60.0);
                registry.update();
                registry.upload_table(&mut sink);
                uploaded_bytes += registry.instances().upload().bytes().len();
            }
        }
        None => {
            let mut sink = |upload: &TableUpload<'_>| uploaded_bytes += upload.bytes().len();
            for frame in 0..FRAMES {
                clock.set(frame as f32 / 60.0);
                registry.update();
                registry.upload_table(&mut sink);
            }
        }
    }

    let size = registry.instances().size();
    log::info!(
        "Ran {} frames, instance table {}x{}, {} bytes uploaded",
        FRAMES,
        size.width,
        size.height,
        uploaded_bytes
    );

    Ok(())
}

fn main() {
    mesh_packer::init_logging();
    if let Err(err) = run() {
        log::error!("Application error: {}", err);
        eprintln!("Application error: {err}");
    }
}
