use super::table::{InstanceTable, SLOT_FLOATS};

/// Fills one instance slot with that mesh's current transform.
pub type TransformFn = Box<dyn FnMut(&mut [f32; SLOT_FLOATS])>;

/// Per-id transform callbacks, stored densely by mesh id.
#[derive(Default)]
pub struct TransformCallbacks {
    slots: Vec<Option<TransformFn>>,
}

impl TransformCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: usize, callback: TransformFn) -> Option<TransformFn> {
        if id >= self.slots.len() {
            self.slots.resize_with(id + 1, || None);
        }
        self.slots[id].replace(callback)
    }

    pub fn remove(&mut self, id: usize) -> Option<TransformFn> {
        self.slots.get_mut(id).and_then(Option::take)
    }

    pub fn contains(&self, id: usize) -> bool {
        matches!(self.slots.get(id), Some(Some(_)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every callback in ascending id order against its table slot.
    /// Returns how many slots were written.
    pub fn run(&mut self, table: &mut InstanceTable) -> usize {
        let mut written = 0;
        for (id, callback) in self.slots.iter_mut().enumerate() {
            let Some(callback) = callback else {
                continue;
            };
            if let Some(slot) = table.slot_mut(id) {
                callback(slot);
                written += 1;
            }
        }
        written
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl std::fmt::Debug for TransformCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformCallbacks")
            .field("registered", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::TableFormat;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn visits_ids_in_ascending_order() {
        let mut table = InstanceTable::new(TableFormat::Rgba32Float);
        table.ensure(4).unwrap();

        let order = Rc::new(RefCell::new(Vec::new()));
        let mut callbacks = TransformCallbacks::new();
        for id in [3usize, 0, 2] {
            let order = Rc::clone(&order);
            callbacks.insert(
                id,
                Box::new(move |slot: &mut [f32; SLOT_FLOATS]| {
                    order.borrow_mut().push(id);
                    slot[0] = id as f32 + 1.0;
                }),
            );
        }

        assert_eq!(callbacks.run(&mut table), 3);
        assert_eq!(*order.borrow(), vec![0, 2, 3]);
        assert_eq!(table.slot(3).unwrap()[0], 4.0);
        assert_eq!(table.slot(1).unwrap()[0], 0.0);
    }

    #[test]
    fn insert_replaces_and_remove_takes() {
        let mut callbacks = TransformCallbacks::new();
        assert!(callbacks.insert(1, Box::new(|_: &mut [f32; SLOT_FLOATS]| {})).is_none());
        assert!(callbacks.insert(1, Box::new(|_: &mut [f32; SLOT_FLOATS]| {})).is_some());
        assert!(callbacks.contains(1));
        assert!(!callbacks.contains(0));
        assert!(callbacks.remove(1).is_some());
        assert!(callbacks.is_empty());
    }
}
