//! Scene edits as undoable actions

use super::action::{Action, ActionError};
use crate::ecs::{EntityDesc, EntityId, SceneError, Tombstone, World};
use crate::foundation::math::{Axes, Transform, Vec3};
use std::fmt;

fn name_of(world: &World, entity: EntityId) -> Result<String, ActionError> {
    world
        .get(entity)
        .map(|e| e.name().to_string())
        .ok_or(ActionError::Scene(SceneError::EntityNotFound(entity)))
}

fn not_applied() -> ActionError {
    ActionError::Failed("action was never applied".to_string())
}

/// Which part of the local transform an edit touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformField {
    /// Local position
    Position,
    /// Local rotation (Euler degrees)
    Rotation,
    /// Local scale
    Scale,
}

impl TransformField {
    fn get(self, transform: &Transform) -> Vec3 {
        match self {
            Self::Position => transform.position,
            Self::Rotation => transform.rotation,
            Self::Scale => transform.scale,
        }
    }

    fn set(self, world: &mut World, entity: EntityId, value: Axes) -> Result<(), SceneError> {
        match self {
            Self::Position => world.set_position(entity, value),
            Self::Rotation => world.set_rotation(entity, value),
            Self::Scale => world.set_scale(entity, value),
        }
    }
}

impl fmt::Display for TransformField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Position => "position",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
        })
    }
}

/// Set position, rotation or scale (two or three axes)
#[derive(Debug, Clone)]
pub struct SetTransformAction {
    entity: EntityId,
    field: TransformField,
    value: Axes,
    before: Option<Vec3>,
}

impl SetTransformAction {
    /// Edit `field` of `entity`
    pub fn new(entity: EntityId, field: TransformField, value: impl Into<Axes>) -> Self {
        Self {
            entity,
            field,
            value: value.into(),
            before: None,
        }
    }

    /// Set local position
    pub fn position(entity: EntityId, value: impl Into<Axes>) -> Self {
        Self::new(entity, TransformField::Position, value)
    }

    /// Set local rotation
    pub fn rotation(entity: EntityId, value: impl Into<Axes>) -> Self {
        Self::new(entity, TransformField::Rotation, value)
    }

    /// Set local scale
    pub fn scale(entity: EntityId, value: impl Into<Axes>) -> Self {
        Self::new(entity, TransformField::Scale, value)
    }

    /// Record an edit that already happened live (e.g. a finished drag).
    ///
    /// Applying it sets `after` again, which is a no-op the first time.
    pub fn recorded(entity: EntityId, field: TransformField, before: Vec3, after: Vec3) -> Self {
        Self {
            entity,
            field,
            value: Axes::Three(after),
            before: Some(before),
        }
    }
}

impl Action for SetTransformAction {
    fn apply(&mut self, world: &mut World) -> Result<String, ActionError> {
        let name = name_of(world, self.entity)?;
        let current = world
            .local_transform(self.entity)
            .ok_or(SceneError::EntityNotFound(self.entity))?;
        let current = self.field.get(&current);
        // A recorded edit is already in place on first apply; keep its before
        if self.before.is_none() || current != self.value.apply(current) {
            self.before = Some(current);
        }
        self.field.set(world, self.entity, self.value)?;
        Ok(format!("Set {} of {}", self.field, name))
    }

    fn revert(&mut self, world: &mut World) -> Result<(), ActionError> {
        let before = self.before.ok_or_else(not_applied)?;
        self.field.set(world, self.entity, Axes::Three(before))?;
        Ok(())
    }
}

/// Reparent an entity
#[derive(Debug, Clone)]
pub struct ReparentAction {
    entity: EntityId,
    parent: Option<EntityId>,
    preserve_world: bool,
    previous: Option<(Option<EntityId>, Transform)>,
}

impl ReparentAction {
    /// Move `entity` under `parent` (`None` = scene root)
    pub fn new(entity: EntityId, parent: Option<EntityId>, preserve_world: bool) -> Self {
        Self {
            entity,
            parent,
            preserve_world,
            previous: None,
        }
    }
}

impl Action for ReparentAction {
    fn apply(&mut self, world: &mut World) -> Result<String, ActionError> {
        let name = name_of(world, self.entity)?;
        let local = world
            .local_transform(self.entity)
            .ok_or(SceneError::EntityNotFound(self.entity))?;
        let previous_parent = world.parent(self.entity);
        world.set_parent(self.entity, self.parent, self.preserve_world)?;
        self.previous = Some((previous_parent, local));

        let target = self
            .parent
            .and_then(|p| world.get(p))
            .map_or_else(|| "root".to_string(), |p| p.name().to_string());
        Ok(format!("Reparent {name} to {target}"))
    }

    fn revert(&mut self, world: &mut World) -> Result<(), ActionError> {
        let (parent, local) = self.previous.ok_or_else(not_applied)?;
        world.set_parent(self.entity, parent, false)?;
        world.set_transform(self.entity, local)?;
        Ok(())
    }
}

/// Spawn an entity; undo parks it in the trash, redo brings the same entity back
#[derive(Debug, Clone)]
pub struct SpawnAction {
    desc: EntityDesc,
    spawned: Option<EntityId>,
    tombstone: Option<Tombstone>,
}

impl SpawnAction {
    /// Spawn from a description
    pub fn new(desc: EntityDesc) -> Self {
        Self {
            desc,
            spawned: None,
            tombstone: None,
        }
    }

    /// The spawned entity, once applied
    pub fn entity(&self) -> Option<EntityId> {
        self.spawned
    }
}

impl Action for SpawnAction {
    fn apply(&mut self, world: &mut World) -> Result<String, ActionError> {
        if let Some(tombstone) = &self.tombstone {
            world.restore(tombstone)?;
            self.tombstone = None;
        } else {
            self.spawned = Some(world.spawn(self.desc.clone())?);
        }
        Ok(format!("Spawn {}", self.desc.name))
    }

    fn revert(&mut self, world: &mut World) -> Result<(), ActionError> {
        let entity = self.spawned.ok_or_else(not_applied)?;
        self.tombstone = Some(world.destroy(entity)?);
        Ok(())
    }
}

/// Destroy an entity and its subtree
#[derive(Debug, Clone)]
pub struct DestroyAction {
    entity: EntityId,
    tombstone: Option<Tombstone>,
}

impl DestroyAction {
    /// Destroy `entity`
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            tombstone: None,
        }
    }
}

impl Action for DestroyAction {
    fn apply(&mut self, world: &mut World) -> Result<String, ActionError> {
        let name = name_of(world, self.entity)?;
        self.tombstone = Some(world.destroy(self.entity)?);
        Ok(format!("Destroy {name}"))
    }

    fn revert(&mut self, world: &mut World) -> Result<(), ActionError> {
        let tombstone = self.tombstone.as_ref().ok_or_else(not_applied)?;
        world.restore(tombstone)?;
        self.tombstone = None;
        Ok(())
    }
}

/// Enable or disable an entity
#[derive(Debug, Clone)]
pub struct SetEnabledAction {
    entity: EntityId,
    enabled: bool,
    before: Option<bool>,
}

impl SetEnabledAction {
    /// Set the own enabled flag of `entity`
    pub fn new(entity: EntityId, enabled: bool) -> Self {
        Self {
            entity,
            enabled,
            before: None,
        }
    }
}

impl Action for SetEnabledAction {
    fn apply(&mut self, world: &mut World) -> Result<String, ActionError> {
        let name = name_of(world, self.entity)?;
        self.before = Some(world.is_enabled(self.entity));
        world.set_enabled(self.entity, self.enabled)?;
        let verb = if self.enabled { "Enable" } else { "Disable" };
        Ok(format!("{verb} {name}"))
    }

    fn revert(&mut self, world: &mut World) -> Result<(), ActionError> {
        let before = self.before.ok_or_else(not_applied)?;
        world.set_enabled(self.entity, before)?;
        Ok(())
    }
}

/// Rename an entity
#[derive(Debug, Clone)]
pub struct RenameAction {
    entity: EntityId,
    name: String,
    before: Option<String>,
}

impl RenameAction {
    /// Rename `entity` to `name`
    pub fn new(entity: EntityId, name: impl Into<String>) -> Self {
        Self {
            entity,
            name: name.into(),
            before: None,
        }
    }
}

impl Action for RenameAction {
    fn apply(&mut self, world: &mut World) -> Result<String, ActionError> {
        let before = name_of(world, self.entity)?;
        world.rename(self.entity, self.name.clone())?;
        let label = format!("Rename {} to {}", before, self.name);
        self.before = Some(before);
        Ok(label)
    }

    fn revert(&mut self, world: &mut World) -> Result<(), ActionError> {
        let before = self.before.clone().ok_or_else(not_applied)?;
        world.rename(self.entity, before)?;
        Ok(())
    }
}
