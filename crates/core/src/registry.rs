//! Ownership and iteration order for all live entities.
//!
//! Two insertion-ordered views over one owned sequence: "all objects"
//! (render and update order; the player ship is appended last so it draws
//! on top) and the collidable subset. Passes over either view operate on an
//! id snapshot taken up front, so an entity's update handler may add or
//! remove other entities without skipping or double-processing the rest of
//! the pass.

use crate::entities::{EntityId, EntityIdGenerator, GameObject};

#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: Vec<GameObject>,
    collidable_ids: Vec<EntityId>,
    ids: EntityIdGenerator,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self {
            objects: Vec::with_capacity(700),
            collidable_ids: Vec::with_capacity(64),
            ids: EntityIdGenerator::new(),
        }
    }

    /// Hands out the id for the next `add_object` call, so constructors can
    /// bake the id into the object.
    pub fn next_id(&mut self) -> EntityId {
        self.ids.next()
    }

    /// Appends to the all-objects sequence; collidable objects also join the
    /// collidable view. Well-behaved callers never add the same id twice.
    pub fn add_object(&mut self, object: GameObject, collidable: bool) {
        if collidable {
            self.collidable_ids.push(object.id);
        }
        self.objects.push(object);
    }

    /// Removes an entity from both views. Removing an absent id is a no-op.
    pub fn remove_object(&mut self, id: EntityId) {
        if let Some(index) = self.objects.iter().position(|o| o.id == id) {
            self.objects.remove(index);
        }
        if let Some(index) = self.collidable_ids.iter().position(|&c| c == id) {
            self.collidable_ids.remove(index);
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.objects.iter().any(|o| o.id == id)
    }

    pub fn get(&self, id: EntityId) -> Option<&GameObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut GameObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Snapshot of all object ids in insertion order, for a safe full pass.
    pub fn id_snapshot(&self) -> Vec<EntityId> {
        self.objects.iter().map(|o| o.id).collect()
    }

    /// Snapshot of the collidable view for the collision pass.
    pub fn collidable_snapshot(&self) -> Vec<EntityId> {
        self.collidable_ids.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
