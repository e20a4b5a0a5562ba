//! End-to-end behaviour of `MeshRegistry` in both packing modes.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec3};
use mesh_packer::{
    primitives, ElementList, MeshDescriptor, MeshId, MeshRegistry, PackError, PackerSettings,
    TableUpload, ValidationError,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn packed(mut registry: MeshRegistry) -> MeshRegistry {
    registry.pack().unwrap();
    registry
}

fn assert_same_contents(a: &MeshRegistry, b: &MeshRegistry) {
    assert_eq!(a.buffers().positions(), b.buffers().positions());
    assert_eq!(a.buffers().ids(), b.buffers().ids());
    assert_eq!(a.buffers().elements(), b.buffers().elements());
    for attribute in a.buffers().attributes() {
        assert_eq!(
            Some(attribute.data()),
            b.buffers().attribute(&attribute.channel.name),
            "attribute `{}` differs",
            attribute.channel.name
        );
    }
    assert_eq!(a.records(), b.records());
}

fn assert_invariants(registry: &MeshRegistry) {
    let buffers = registry.buffers();
    let total = registry.vertex_count();

    assert_eq!(buffers.positions().len(), total * 3);
    assert_eq!(buffers.ids().len(), total);
    assert_eq!(buffers.elements().len(), registry.index_count());
    assert!(buffers.elements().iter().all(|&index| (index as usize) < total));
    for attribute in buffers.attributes() {
        assert_eq!(attribute.data().len(), total * attribute.channel.width);
    }

    let summed: usize = registry.records().iter().map(|r| r.vertex_count()).sum();
    assert_eq!(summed, total);

    for (expected, record) in registry.records().iter().enumerate() {
        assert_eq!(record.id.index(), expected);
        assert_eq!(registry.id(&record.name), Some(record.id));
        assert_eq!(registry.name(record.id), Some(record.name.as_str()));

        let vertices = record.vertices();
        assert!(buffers.ids()[vertices.clone()]
            .iter()
            .all(|&id| id == record.id.get()));
        assert!(buffers.elements()[record.cells.clone()]
            .iter()
            .all(|&index| vertices.contains(&(index as usize))));
    }

    assert!(registry.instances().capacity() >= registry.len());
}

#[test]
fn two_cubes_share_one_buffer() {
    for mut registry in [MeshRegistry::two_phase(), MeshRegistry::streaming()] {
        let first = registry.add("cube-a", primitives::cube()).unwrap();
        let second = registry.add("cube-b", primitives::cube()).unwrap();
        registry.pack().unwrap();

        assert_eq!((first.index(), second.index()), (0, 1));
        assert_eq!(registry.vertex_count(), 16);
        assert_eq!(registry.index_count(), 72);
        assert_eq!(registry.name(second), Some("cube-b"));
        assert_eq!(registry.id("cube-a"), Some(first));

        let cells = registry.record(second).unwrap().cells.clone();
        assert!(registry.buffers().elements()[cells]
            .iter()
            .all(|&index| (8..16).contains(&index)));
        assert_invariants(&registry);
    }
}

#[test]
fn flat_and_tuple_inputs_pack_identically() {
    let tuples = MeshDescriptor::new(
        vec![[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        vec![[0u32, 1, 2]],
    )
    .with_attribute("uv", vec![[0.0f32, 0.0], [1.0, 0.0], [0.0, 1.0]]);
    let flat = MeshDescriptor::new(
        vec![0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        vec![0u32, 1, 2],
    )
    .with_attribute("uv", vec![0.0f32, 0.0, 1.0, 0.0, 0.0, 1.0]);

    let settings = PackerSettings::two_phase().with_attribute("uv", 2);
    let mut a = MeshRegistry::new(settings.clone()).unwrap();
    let mut b = MeshRegistry::new(settings).unwrap();
    a.add("m", tuples.clone()).unwrap();
    a.add("n", flat.clone()).unwrap();
    b.add("m", flat).unwrap();
    b.add("n", tuples).unwrap();

    assert_same_contents(&packed(a), &packed(b));
}

#[test]
fn streaming_and_two_phase_agree_on_random_scenes() {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    let settings = PackerSettings::two_phase().with_attribute("color", 4);

    for _ in 0..8 {
        let mut two_phase = MeshRegistry::new(settings.clone()).unwrap();
        let mut streaming = MeshRegistry::new(PackerSettings {
            mode: mesh_packer::PackingMode::Streaming,
            ..settings.clone()
        })
        .unwrap();

        for i in 0..rng.gen_range(1..40) {
            let vertices = rng.gen_range(1..30u32);
            let triangles = rng.gen_range(0..20);
            let positions: Vec<[f32; 3]> = (0..vertices).map(|_| rng.gen()).collect();
            let colors: Vec<f32> = (0..vertices * 4).map(|_| rng.gen()).collect();
            let cells: Vec<u32> = (0..triangles * 3)
                .map(|_| rng.gen_range(0..vertices))
                .collect();
            let mesh = if rng.gen_bool(0.5) {
                MeshDescriptor::new(positions, cells)
            } else {
                MeshDescriptor::new(
                    positions.concat(),
                    ElementList::Tuples(cells.chunks(3).map(<[u32]>::to_vec).collect()),
                )
            };
            let mesh = mesh.with_attribute("color", colors);

            let name = format!("mesh{i}");
            let a = two_phase.add(&name, mesh.clone()).unwrap();
            let b = streaming.add(&name, mesh).unwrap();
            assert_eq!(a, b);
            assert_invariants(&streaming);
        }

        two_phase.pack().unwrap();
        assert_invariants(&two_phase);
        assert_same_contents(&two_phase, &streaming);
        assert!(streaming.buffers().vertex_capacity() >= two_phase.buffers().vertex_capacity());
    }
}

#[test]
fn failed_add_leaves_registry_unchanged() {
    for mut registry in [MeshRegistry::two_phase(), MeshRegistry::streaming()] {
        registry.add("ok", primitives::cube()).unwrap();
        let positions_before = registry.buffers().positions().to_vec();

        let broken = MeshDescriptor::new(vec![0.0f32; 9], vec![0u32, 1]);
        assert_eq!(
            registry.add("broken", broken),
            Err(PackError::Validation(ValidationError::PartialTriangle(2)))
        );
        assert_eq!(
            registry.add("ok", primitives::cube()),
            Err(PackError::Validation(ValidationError::DuplicateName(
                "ok".into()
            )))
        );

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.id("broken"), None);
        assert_eq!(registry.buffers().positions(), positions_before.as_slice());

        let next = registry.add("next", primitives::cube()).unwrap();
        assert_eq!(next, MeshId::new(1));
    }
}

#[test]
fn two_phase_pack_consumes_the_registry_until_reset() {
    let mut registry = MeshRegistry::two_phase();
    registry.add("a", primitives::cube()).unwrap();
    assert!(registry.buffers().positions().is_empty());
    assert!(!registry.is_ready());

    registry.pack().unwrap();
    assert!(registry.is_ready());
    assert_eq!(registry.buffers().vertex_capacity(), 8);
    assert_eq!(
        registry.add("b", primitives::cube()),
        Err(PackError::AlreadyPacked)
    );

    registry.reset();
    assert!(registry.is_empty());
    assert_eq!(registry.add("b", primitives::cube()), Ok(MeshId::new(0)));
}

#[test]
fn update_writes_each_slot_in_id_order() {
    for mut registry in [MeshRegistry::two_phase(), MeshRegistry::streaming()] {
        let visits = Rc::new(RefCell::new(Vec::new()));
        for i in 0..5 {
            let visits = Rc::clone(&visits);
            registry
                .add_with_transform(
                    &format!("cube{i}"),
                    primitives::cube(),
                    move |slot: &mut [f32; 16]| {
                        visits.borrow_mut().push(i);
                        *slot = Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0))
                            .to_cols_array();
                    },
                )
                .unwrap();
        }
        registry.pack().unwrap();

        assert_eq!(registry.update(), 5);
        assert_eq!(*visits.borrow(), vec![0, 1, 2, 3, 4]);

        let id = registry.id("cube3").unwrap();
        let moved = registry.instances().transform(id.index()).unwrap();
        assert_eq!(moved.transform_point3(Vec3::ZERO), Vec3::new(3.0, 0.0, 0.0));
    }
}

#[test]
fn upload_hands_sink_a_near_square_table() {
    let mut registry = MeshRegistry::two_phase();
    for i in 0..10 {
        registry.add(&format!("cube{i}"), primitives::cube()).unwrap();
    }
    registry.pack().unwrap();
    assert!(registry.set_transform(MeshId::new(9), Mat4::IDENTITY));

    let mut seen = None;
    registry.upload_table(&mut |upload: &TableUpload<'_>| {
        seen = Some((upload.width, upload.height, upload.data.len(), upload.data[9 * 16]));
    });

    // 10 matrices are 40 RGBA texels.
    assert_eq!(seen, Some((7, 6, 7 * 6 * 4, 1.0)));
}

#[test]
fn declared_attributes_are_packed_per_vertex() {
    let settings = PackerSettings::streaming().with_attribute("normal", 3);
    let mut registry = MeshRegistry::new(settings).unwrap();
    registry.add("a", primitives::sphere(6, 3, true)).unwrap();
    registry.add("b", primitives::sphere(4, 2, true)).unwrap();

    assert_eq!(
        registry.add("c", primitives::cube()),
        Err(PackError::Validation(ValidationError::MissingAttribute(
            "normal".into()
        )))
    );

    let normals = registry.buffers().attribute("normal").unwrap();
    assert_eq!(normals, registry.buffers().positions());
    assert_invariants(&registry);
}

#[test]
fn streaming_settings_preallocate() {
    let settings = PackerSettings {
        initial_vertex_capacity: 256,
        ..PackerSettings::streaming()
    };
    let mut registry = MeshRegistry::new(settings).unwrap();
    assert!(registry.buffers().vertex_capacity() >= 256);

    registry.add("cube", primitives::cube()).unwrap();
    assert_eq!(registry.buffers().vertex_capacity(), 256);
    assert_eq!(registry.buffers().ids(), &[0; 8]);

    registry.reset();
    assert!(registry.is_empty());
    assert!(registry.buffers().ids().is_empty());
    assert!(registry.buffers().vertex_capacity() >= 256);

    let id = registry.add("again", primitives::cube()).unwrap();
    assert_eq!(id, MeshId::new(0));
    assert_eq!(registry.vertex_count(), 8);
    assert_eq!(registry.buffers().vertex_capacity(), 256);
    assert_invariants(&registry);
}
