use glam::Mat4;

use super::buffers::{GeometryBuffers, MeshRecord};
use super::directory::{IdDirectory, MeshId};
use crate::error::{CapacityError, PackError, ValidationError};
use crate::instance::{InstanceTable, TransformCallbacks, UploadSink, SLOT_FLOATS};
use crate::mesh::{MeshCounts, MeshDescriptor, POSITION_WIDTH};
use crate::settings::{PackerSettings, PackingMode};

/// Packs many meshes into shared buffers and hands out dense ids.
///
/// In [`PackingMode::TwoPhase`] `add` only records meshes and `pack`
/// allocates every buffer once at its exact final size. In
/// [`PackingMode::Streaming`] each `add` writes straight into growable
/// buffers. For the same sequence of `add` calls both modes produce the same
/// occupied buffer contents.
#[derive(Debug)]
pub struct MeshRegistry {
    settings: PackerSettings,
    directory: IdDirectory,
    records: Vec<MeshRecord>,
    pending: Vec<MeshDescriptor>,
    totals: MeshCounts,
    buffers: GeometryBuffers,
    instances: InstanceTable,
    callbacks: TransformCallbacks,
    packed: bool,
}

impl MeshRegistry {
    pub fn new(settings: PackerSettings) -> Result<Self, PackError> {
        let mut registry = Self::empty(settings.validate());
        if registry.settings.mode == PackingMode::Streaming
            && registry.settings.initial_vertex_capacity > 0
        {
            registry.buffers.reserve(MeshCounts {
                vertices: registry.settings.initial_vertex_capacity,
                indices: registry.settings.initial_vertex_capacity * 3,
            })?;
        }
        Ok(registry)
    }

    pub fn two_phase() -> Self {
        Self::empty(PackerSettings::two_phase())
    }

    pub fn streaming() -> Self {
        Self::empty(PackerSettings::streaming())
    }

    fn empty(settings: PackerSettings) -> Self {
        Self {
            directory: IdDirectory::new(),
            records: Vec::new(),
            pending: Vec::new(),
            totals: MeshCounts::default(),
            buffers: GeometryBuffers::new(&settings.attributes),
            instances: InstanceTable::new(settings.table_format()),
            callbacks: TransformCallbacks::new(),
            packed: false,
            settings,
        }
    }

    pub fn settings(&self) -> &PackerSettings {
        &self.settings
    }

    pub fn mode(&self) -> PackingMode {
        self.settings.mode
    }

    /// Registers `mesh` under `name` and returns its id.
    ///
    /// Validation happens here in both modes; on error nothing is recorded.
    pub fn add(&mut self, name: &str, mesh: MeshDescriptor) -> Result<MeshId, PackError> {
        if self.packed {
            return Err(PackError::AlreadyPacked);
        }
        if self.directory.contains(name) {
            return Err(ValidationError::DuplicateName(name.to_owned()).into());
        }

        let counts = mesh.measure(&self.settings.attributes)?;
        let vertices = self.totals.vertices + counts.vertices;
        if vertices > u32::MAX as usize {
            return Err(CapacityError::IndexSpace(vertices).into());
        }

        let id = self.directory.next_id();
        let record = MeshRecord {
            id,
            name: name.to_owned(),
            positions: self.totals.vertices * POSITION_WIDTH..vertices * POSITION_WIDTH,
            cells: self.totals.indices..self.totals.indices + counts.indices,
        };

        match self.settings.mode {
            PackingMode::TwoPhase => self.pending.push(mesh),
            PackingMode::Streaming => {
                self.buffers.reserve(counts)?;
                self.instances.ensure(id.index() + 1)?;
                self.buffers.claim(counts)?;
                self.buffers.write(&record, &mesh)?;
            }
        }

        log::debug!(
            "Added mesh `{}` as {} ({} vertices, {} indices)",
            name,
            id,
            counts.vertices,
            counts.indices
        );

        self.directory.insert(name);
        self.records.push(record);
        self.totals = MeshCounts {
            vertices,
            indices: self.totals.indices + counts.indices,
        };
        Ok(id)
    }

    /// Like [`add`](Self::add), also registering the per-frame transform
    /// callback that [`update`](Self::update) runs for this id.
    pub fn add_with_transform<F>(
        &mut self,
        name: &str,
        mesh: MeshDescriptor,
        callback: F,
    ) -> Result<MeshId, PackError>
    where
        F: FnMut(&mut [f32; SLOT_FLOATS]) + 'static,
    {
        let id = self.add(name, mesh)?;
        self.callbacks.insert(id.index(), Box::new(callback));
        Ok(id)
    }

    /// Allocates the final buffers and writes every recorded mesh.
    ///
    /// Only meaningful in two-phase mode; streaming registries are always
    /// packed. On failure the previous buffers are kept.
    pub fn pack(&mut self) -> Result<(), PackError> {
        if self.settings.mode == PackingMode::Streaming || self.packed {
            return Ok(());
        }

        let mut buffers = GeometryBuffers::exact(&self.settings.attributes, self.totals)?;
        let mut instances = InstanceTable::new(self.settings.table_format());
        instances.allocate_exact(self.records.len())?;

        for (record, mesh) in self.records.iter().zip(self.pending.drain(..)) {
            buffers.write(record, &mesh)?;
        }

        log::info!(
            "Packed {} meshes: {} vertices, {} indices, instance table {}x{}",
            self.records.len(),
            self.totals.vertices,
            self.totals.indices,
            instances.size().width,
            instances.size().height
        );

        self.buffers = buffers;
        self.instances = instances;
        self.packed = true;
        Ok(())
    }

    pub fn is_packed(&self) -> bool {
        self.packed
    }

    /// Buffers are ready to read: streaming always, two-phase after `pack`.
    pub fn is_ready(&self) -> bool {
        self.settings.mode == PackingMode::Streaming || self.packed
    }

    /// Drops every mesh and id. Geometry buffers keep their allocations, so
    /// a streaming registry retains at least its initial reservation.
    pub fn reset(&mut self) {
        self.directory.clear();
        self.records.clear();
        self.pending.clear();
        self.totals = MeshCounts::default();
        self.buffers.clear();
        self.instances.clear();
        self.callbacks.clear();
        self.packed = false;
    }

    pub fn id(&self, name: &str) -> Option<MeshId> {
        self.directory.id(name)
    }

    pub fn name(&self, id: MeshId) -> Option<&str> {
        self.directory.name(id)
    }

    pub fn record(&self, id: MeshId) -> Option<&MeshRecord> {
        self.records.get(id.index())
    }

    pub fn records(&self) -> &[MeshRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.totals.vertices
    }

    pub fn index_count(&self) -> usize {
        self.totals.indices
    }

    pub fn buffers(&self) -> &GeometryBuffers {
        &self.buffers
    }

    pub fn instances(&self) -> &InstanceTable {
        &self.instances
    }

    pub fn instances_mut(&mut self) -> &mut InstanceTable {
        &mut self.instances
    }

    pub fn set_transform(&mut self, id: MeshId, transform: Mat4) -> bool {
        self.instances.set_transform(id.index(), transform)
    }

    /// Installs or replaces the transform callback of an existing id.
    pub fn set_transform_callback<F>(&mut self, id: MeshId, callback: F) -> bool
    where
        F: FnMut(&mut [f32; SLOT_FLOATS]) + 'static,
    {
        if id.index() >= self.records.len() {
            return false;
        }
        self.callbacks.insert(id.index(), Box::new(callback));
        true
    }

    /// Runs every transform callback in ascending id order. Returns the
    /// number of slots written; zero before a two-phase registry is packed.
    pub fn update(&mut self) -> usize {
        self.callbacks.run(&mut self.instances)
    }

    /// Hands the instance table to `sink`.
    pub fn upload_table<S: UploadSink + ?Sized>(&self, sink: &mut S) {
        sink.upload(&self.instances.upload());
    }
}
