use std::collections::HashMap;
use std::fmt;

/// Dense mesh identifier, assigned in insertion order starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u32);

impl MeshId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bidirectional name <-> id map. Ids are `0..len()` with no gaps.
#[derive(Debug, Clone, Default)]
pub struct IdDirectory {
    ids: HashMap<String, MeshId>,
    names: Vec<String>,
}

impl IdDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next `insert` will hand out.
    pub fn next_id(&self) -> MeshId {
        MeshId(self.names.len() as u32)
    }

    /// Assigns the next id to `name`. Returns `None` if the name is taken.
    pub fn insert(&mut self, name: &str) -> Option<MeshId> {
        if self.ids.contains_key(name) {
            return None;
        }
        let id = self.next_id();
        self.ids.insert(name.to_owned(), id);
        self.names.push(name.to_owned());
        Some(id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    pub fn id(&self, name: &str) -> Option<MeshId> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: MeshId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(index, name)| (MeshId(index as u32), name.as_str()))
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.names.clear();
    }
}
