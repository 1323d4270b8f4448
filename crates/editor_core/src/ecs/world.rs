//! Scene registry
//!
//! The [`World`] owns every entity in a slotmap arena. Registry order (spawn
//! order) is kept separately and drives dispatch and hierarchy listing.
//! Children are never stored on their parent; they are found by scanning
//! parent back-references.
//!
//! Every mutation that can change a world transform or visibility pushes the
//! result to the renderer and collider collaborators for the whole affected
//! subtree before returning, so nothing downstream ever holds a stale world
//! value.

use super::component::AttachedComponent;
use super::entity::{ClickHandler, Collider, Entity, EntityDesc, EntityFlags, EntityId};
use super::systems::dispatch::{self, Hook, QueuedHook};
use crate::foundation::logging::{debug, warn};
use crate::foundation::math::{Axes, Transform, Vec3};
use crate::physics::{Aabb, ColliderBackend, ColliderChannel, ColliderKind, SimpleColliderBackend};
use crate::render::{HeadlessRenderer, RenderError, Renderer};
use slotmap::SlotMap;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Scene errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Reparent target does not exist or would create a cycle
    #[error("Invalid parent {parent:?} for entity {entity:?}")]
    InvalidParent {
        /// Entity being reparented
        entity: EntityId,
        /// Rejected parent
        parent: EntityId,
    },

    /// Entity is not alive in the registry
    #[error("Entity not found: {0:?}")]
    EntityNotFound(EntityId),

    /// No search location provides a component with this name
    #[error("Component '{name}' not found (searched: {searched:?})")]
    UnresolvedComponent {
        /// Requested component name
        name: String,
        /// Locations searched, in order
        searched: Vec<String>,
    },

    /// Asset reference could not be resolved
    #[error("Unresolved {kind} '{name}'")]
    UnresolvedAsset {
        /// Asset kind, e.g. `"model"`
        kind: &'static str,
        /// Requested reference
        name: String,
    },

    /// No component at this index
    #[error("Entity {entity:?} has no component at index {index}")]
    ComponentIndex {
        /// Owner
        entity: EntityId,
        /// Requested index
        index: usize,
    },

    /// Renderer failure
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Everything needed to bring a destroyed subtree back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tombstone {
    root: EntityId,
    parent: Option<EntityId>,
    entries: Vec<(EntityId, usize)>,
}

impl Tombstone {
    /// Root of the destroyed subtree
    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Parent the root had before it was destroyed
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Every destroyed entity, root first
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }
}

/// Scene registry: arena, registry order, selection and trash
pub struct World {
    pub(crate) entities: SlotMap<EntityId, Entity>,
    pub(crate) order: Vec<EntityId>,
    selection: HashSet<EntityId>,
    trash: EntityId,
    edit_mode: bool,
    renderer: Box<dyn Renderer>,
    colliders: Box<dyn ColliderBackend>,
    // Hooks waiting per entity, one frame per nested dispatch
    dispatch_frames: HashMap<EntityId, Vec<Vec<QueuedHook>>>,
}

impl World {
    /// Create a world in edit mode using the given collaborators
    pub fn new(renderer: Box<dyn Renderer>, colliders: Box<dyn ColliderBackend>) -> Self {
        let mut entities = SlotMap::with_key();
        let mut trash = Entity::new("trash".to_string());
        trash.enabled = false;
        let trash = entities.insert(trash);
        Self {
            entities,
            order: Vec::new(),
            selection: HashSet::new(),
            trash,
            edit_mode: true,
            renderer,
            colliders,
            dispatch_frames: HashMap::new(),
        }
    }

    /// World backed by [`HeadlessRenderer`] and [`SimpleColliderBackend`]
    pub fn headless() -> Self {
        Self::new(
            Box::new(HeadlessRenderer::new()),
            Box::new(SimpleColliderBackend::new()),
        )
    }

    // ---- lookup -------------------------------------------------------

    /// Whether `id` is a live (not destroyed) entity
    pub fn contains(&self, id: EntityId) -> bool {
        id != self.trash && self.entities.get(id).is_some_and(|e| !e.trashed)
    }

    /// Live entity by id
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id).filter(|e| !e.trashed && id != self.trash)
    }

    pub(crate) fn entity_ref(&self, id: EntityId) -> Result<&Entity, SceneError> {
        self.get(id).ok_or(SceneError::EntityNotFound(id))
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, SceneError> {
        let trash = self.trash;
        self.entities
            .get_mut(id)
            .filter(|e| !e.trashed && id != trash)
            .ok_or(SceneError::EntityNotFound(id))
    }

    /// Live entities in registry order
    pub fn entities(&self) -> &[EntityId] {
        &self.order
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The trash bucket entity
    pub fn trash(&self) -> EntityId {
        self.trash
    }

    /// Entities waiting in the trash for [`World::purge_trash`]
    pub fn trashed(&self) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.trashed)
            .map(|(id, _)| id)
            .collect()
    }

    /// First live entity with this name, in registry order
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.entities.get(*id).is_some_and(|e| e.name == name))
    }

    /// Whether the world is in edit mode
    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// The renderer collaborator
    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    /// The collider collaborator
    pub fn colliders(&self) -> &dyn ColliderBackend {
        self.colliders.as_ref()
    }

    // ---- lifecycle ----------------------------------------------------

    /// Create an entity and append it to the registry
    pub fn spawn(&mut self, desc: EntityDesc) -> Result<EntityId, SceneError> {
        let mut entity = Entity::new(desc.name);
        entity.transform = desc.transform;
        entity.enabled = desc.enabled;
        entity.flags = desc.flags;
        entity.origin = desc.origin;

        let id = self.entities.insert(entity);
        if let Some(parent) = desc.parent {
            if !self.contains(parent) {
                warn!("Cannot spawn under missing parent {:?}", parent);
                self.entities.remove(id);
                return Err(SceneError::InvalidParent { entity: id, parent });
            }
            if let Some(entity) = self.entities.get_mut(id) {
                entity.parent = Some(parent);
            }
        }
        self.order.push(id);

        if let Some(model) = desc.model {
            if let Err(e) = self.set_model(id, Some(&model)) {
                warn!("Spawned {:?} without renderable: {}", id, e);
            }
        }
        if let Some(kind) = desc.play_collider {
            self.set_collider(id, ColliderChannel::Play, Some(kind))?;
        }
        if let Some(kind) = desc.edit_collider {
            self.set_collider(id, ColliderChannel::Edit, Some(kind))?;
        }
        self.refresh(id);
        self.sync_subtree(id);

        debug!("Spawned {:?} '{}'", id, self.entities[id].name);
        Ok(id)
    }

    /// Destroy an entity and its whole subtree.
    ///
    /// The subtree is removed from the registry and selection, hidden, its
    /// colliders disabled, and parked in the trash. The returned
    /// [`Tombstone`] brings it back with [`World::restore`]; resources are
    /// freed only by [`World::purge_trash`].
    pub fn destroy(&mut self, id: EntityId) -> Result<Tombstone, SceneError> {
        let parent = self.entity_ref(id)?.parent;
        let subtree = self.subtree(id);

        let mut entries = Vec::with_capacity(subtree.len());
        for member in &subtree {
            if let Some(index) = self.order.iter().position(|e| e == member) {
                entries.push((*member, index));
            }
        }
        let doomed: HashSet<EntityId> = subtree.iter().copied().collect();
        self.order.retain(|e| !doomed.contains(e));

        for member in &subtree {
            self.selection.remove(member);
            if let Some(entity) = self.entities.get_mut(*member) {
                entity.trashed = true;
                entity.hovered = false;
            }
            self.refresh(*member);
        }
        if let Some(entity) = self.entities.get_mut(id) {
            entity.parent = Some(self.trash);
        }

        debug!("Destroyed {:?} ({} entities)", id, subtree.len());
        Ok(Tombstone {
            root: id,
            parent,
            entries,
        })
    }

    /// Bring a destroyed subtree back to where it was.
    ///
    /// If the original parent is gone the root is restored at scene root.
    pub fn restore(&mut self, tombstone: &Tombstone) -> Result<(), SceneError> {
        for (id, _) in &tombstone.entries {
            if !self.entities.get(*id).is_some_and(|e| e.trashed) {
                return Err(SceneError::EntityNotFound(*id));
            }
        }

        let parent = match tombstone.parent {
            Some(parent) if self.contains(parent) => Some(parent),
            Some(parent) => {
                warn!("Parent {:?} is gone, restoring {:?} at root", parent, tombstone.root);
                None
            }
            None => None,
        };

        let mut entries = tombstone.entries.clone();
        entries.sort_by_key(|(_, index)| *index);
        for (id, index) in entries {
            let index = index.min(self.order.len());
            self.order.insert(index, id);
            if let Some(entity) = self.entities.get_mut(id) {
                entity.trashed = false;
            }
        }
        if let Some(root) = self.entities.get_mut(tombstone.root) {
            root.parent = parent;
        }

        for id in tombstone.entities() {
            self.refresh(id);
        }
        self.sync_subtree(tombstone.root);
        debug!("Restored {:?}", tombstone.root);
        Ok(())
    }

    /// Free everything in the trash; returns how many entities were disposed
    pub fn purge_trash(&mut self) -> usize {
        let doomed = self.trashed();
        for id in &doomed {
            if let Some(entity) = self.entities.remove(*id) {
                if let Some(handle) = entity.renderable {
                    self.renderer.destroy(handle);
                }
                for collider in [entity.play_collider, entity.edit_collider].into_iter().flatten() {
                    self.colliders.destroy_collider(collider.handle);
                }
            }
        }
        if !doomed.is_empty() {
            debug!("Purged {} entities from trash", doomed.len());
        }
        doomed.len()
    }

    // ---- hierarchy ----------------------------------------------------

    /// Parent of a live entity (`None` = root)
    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.get(id)?.parent
    }

    /// Direct children in registry order
    pub fn children(&self, id: EntityId) -> Vec<EntityId> {
        self.order
            .iter()
            .copied()
            .filter(|child| self.entities.get(*child).and_then(|e| e.parent) == Some(id))
            .collect()
    }

    /// Root-level entities in registry order
    pub fn roots(&self) -> Vec<EntityId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.entities.get(*id).is_some_and(|e| e.parent.is_none()))
            .collect()
    }

    /// All descendants, depth-first
    pub fn descendants(&self, id: EntityId) -> Vec<EntityId> {
        let mut subtree = self.subtree(id);
        subtree.remove(0);
        subtree
    }

    /// `id` followed by its descendants, depth-first, children in registry order
    pub(crate) fn subtree(&self, id: EntityId) -> Vec<EntityId> {
        let mut children: HashMap<EntityId, Vec<EntityId>> = HashMap::new();
        for (child, entity) in &self.entities {
            if let Some(parent) = entity.parent {
                children.entry(parent).or_default().push(child);
            }
        }
        let rank: HashMap<EntityId, usize> =
            self.order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        for list in children.values_mut() {
            list.sort_by_key(|child| rank.get(child).copied().unwrap_or(usize::MAX));
        }

        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            result.push(next);
            if let Some(list) = children.get(&next) {
                stack.extend(list.iter().rev().copied());
            }
        }
        result
    }

    /// Whether `ancestor` appears on `node`'s parent chain
    pub fn is_ancestor(&self, ancestor: EntityId, node: EntityId) -> bool {
        let mut current = self.entities.get(node).and_then(|e| e.parent);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.entities.len() {
                break;
            }
            current = self.entities.get(id).and_then(|e| e.parent);
        }
        false
    }

    /// Depth-first listing of the live scene with depths, roots in registry order
    pub fn hierarchy(&self) -> Vec<(EntityId, usize)> {
        let mut listing = Vec::with_capacity(self.order.len());
        for root in self.roots() {
            let root_depth = self.depth(root);
            for id in self.subtree(root) {
                listing.push((id, self.depth(id) - root_depth));
            }
        }
        listing
    }

    fn depth(&self, id: EntityId) -> usize {
        let mut depth = 0;
        let mut current = self.entities.get(id).and_then(|e| e.parent);
        while let Some(parent) = current {
            depth += 1;
            if depth > self.entities.len() {
                break;
            }
            current = self.entities.get(parent).and_then(|e| e.parent);
        }
        depth
    }

    /// Reparent `id` under `parent` (`None` = scene root).
    ///
    /// With `preserve_world` the local transform is recomputed so the world
    /// transform stays put; otherwise the local transform is kept and
    /// reinterpreted under the new parent. A missing parent or a cycle is
    /// rejected and nothing changes.
    pub fn set_parent(
        &mut self,
        id: EntityId,
        parent: Option<EntityId>,
        preserve_world: bool,
    ) -> Result<(), SceneError> {
        let current = self.entity_ref(id)?.parent;
        if let Some(parent) = parent {
            if parent == id || !self.contains(parent) || self.is_ancestor(id, parent) {
                warn!("Rejected reparent of {:?} under {:?}", id, parent);
                return Err(SceneError::InvalidParent { entity: id, parent });
            }
        }
        if current == parent {
            return Ok(());
        }

        let subtree = self.subtree(id);
        let before = self.enabled_states(&subtree);
        let world_before = self.world_transform(id).unwrap_or_default();

        let parent_world = match parent {
            Some(parent) => self.world_transform(parent).unwrap_or_default(),
            None => Transform::identity(),
        };
        let entity = self.entity_mut(id)?;
        entity.parent = parent;
        if preserve_world {
            entity.transform = world_before.relative_to(&parent_world);
        }

        self.apply_enabled_transitions(&subtree, &before);
        self.sync_subtree(id);
        Ok(())
    }

    // ---- transforms ---------------------------------------------------

    /// Local transform
    pub fn local_transform(&self, id: EntityId) -> Option<Transform> {
        self.get(id).map(|e| e.transform)
    }

    /// World transform, composed from the root down
    pub fn world_transform(&self, id: EntityId) -> Option<Transform> {
        let mut chain = vec![self.entities.get(id)?.transform];
        let mut current = self.entities.get(id)?.parent;
        while let Some(parent) = current {
            if parent == self.trash || chain.len() > self.entities.len() {
                break;
            }
            let entity = self.entities.get(parent)?;
            chain.push(entity.transform);
            current = entity.parent;
        }
        Some(
            chain
                .iter()
                .rev()
                .fold(Transform::identity(), |world, local| world.combine(local)),
        )
    }

    /// Replace the whole local transform
    pub fn set_transform(&mut self, id: EntityId, transform: Transform) -> Result<(), SceneError> {
        self.entity_mut(id)?.transform = transform;
        self.sync_subtree(id);
        Ok(())
    }

    /// Set local position; two axes keep the current depth
    pub fn set_position(&mut self, id: EntityId, position: impl Into<Axes>) -> Result<(), SceneError> {
        let entity = self.entity_mut(id)?;
        entity.transform.position = position.into().apply(entity.transform.position);
        self.sync_subtree(id);
        Ok(())
    }

    /// Set local rotation in Euler degrees; two axes keep the current z rotation
    pub fn set_rotation(&mut self, id: EntityId, rotation: impl Into<Axes>) -> Result<(), SceneError> {
        let entity = self.entity_mut(id)?;
        entity.transform.rotation = rotation.into().apply(entity.transform.rotation);
        self.sync_subtree(id);
        Ok(())
    }

    /// Set local scale; two axes keep the current z scale
    pub fn set_scale(&mut self, id: EntityId, scale: impl Into<Axes>) -> Result<(), SceneError> {
        let entity = self.entity_mut(id)?;
        entity.transform.scale = scale.into().apply(entity.transform.scale);
        self.sync_subtree(id);
        Ok(())
    }

    /// Move the entity so its world position is `position`
    pub fn set_world_position(&mut self, id: EntityId, position: Vec3) -> Result<(), SceneError> {
        let parent = self.entity_ref(id)?.parent;
        let world = self.world_transform(id).unwrap_or_default();
        let parent_world = match parent {
            Some(parent) => self.world_transform(parent).unwrap_or_default(),
            None => Transform::identity(),
        };
        let target = Transform::new(position, world.rotation, world.scale);
        self.entity_mut(id)?.transform.position = target.relative_to(&parent_world).position;
        self.sync_subtree(id);
        Ok(())
    }

    /// Transform the renderable is drawn with: world transform plus origin offset
    pub fn render_transform(&self, id: EntityId) -> Option<Transform> {
        let entity = self.entities.get(id)?;
        let world = self.world_transform(id)?;
        let size = entity
            .renderable
            .and_then(|handle| self.renderer.get_bounds(handle))
            .map_or_else(Vec3::zeros, |bounds| bounds.size());
        let offset = -entity.origin.component_mul(&size);
        Some(world.combine(&Transform::from_position(offset)))
    }

    /// Set the renderable pivot (normalized by the mesh size; not cumulative)
    pub fn set_origin(&mut self, id: EntityId, origin: Vec3) -> Result<(), SceneError> {
        self.entity_mut(id)?.origin = origin;
        self.push_render_transform(id);
        Ok(())
    }

    // ---- enabled state ------------------------------------------------

    /// The entity's own enabled flag
    pub fn is_enabled(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(|e| e.enabled)
    }

    /// Enabled itself and through every ancestor
    pub fn is_effectively_enabled(&self, id: EntityId) -> bool {
        let Some(entity) = self.get(id) else {
            return false;
        };
        if !entity.enabled {
            return false;
        }
        let mut current = entity.parent;
        let mut steps = 0;
        while let Some(parent) = current {
            let Some(entity) = self.entities.get(parent) else {
                return false;
            };
            if !entity.enabled || entity.trashed {
                return false;
            }
            steps += 1;
            if steps > self.entities.len() {
                return false;
            }
            current = entity.parent;
        }
        true
    }

    /// Set the entity's own enabled flag; returns whether it changed.
    ///
    /// Descendants whose effective state flips get `on_enable`/`on_disable`.
    pub fn set_enabled(&mut self, id: EntityId, enabled: bool) -> Result<bool, SceneError> {
        if self.entity_ref(id)?.enabled == enabled {
            return Ok(false);
        }
        let subtree = self.subtree(id);
        let before = self.enabled_states(&subtree);
        self.entity_mut(id)?.enabled = enabled;
        self.apply_enabled_transitions(&subtree, &before);
        Ok(true)
    }

    fn enabled_states(&self, ids: &[EntityId]) -> Vec<bool> {
        ids.iter().map(|id| self.is_effectively_enabled(*id)).collect()
    }

    fn apply_enabled_transitions(&mut self, ids: &[EntityId], before: &[bool]) {
        for (id, was_enabled) in ids.iter().zip(before) {
            let now_enabled = self.is_effectively_enabled(*id);
            self.refresh(*id);
            if now_enabled != *was_enabled {
                let hook = if now_enabled { Hook::Enable } else { Hook::Disable };
                dispatch::invoke_entity(self, *id, hook);
            }
        }
    }

    // ---- renderable / collider ----------------------------------------

    /// Replace the renderable. An unknown mesh keeps the previous one.
    pub fn set_model(&mut self, id: EntityId, model: Option<&str>) -> Result<(), SceneError> {
        let old = self.entity_ref(id)?.renderable;
        let new = match model {
            Some(name) => match self.renderer.create_renderable(name) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    warn!("Could not resolve model '{}' for {:?}: {}", name, id, e);
                    return Err(SceneError::UnresolvedAsset {
                        kind: "model",
                        name: name.to_string(),
                    });
                }
            },
            None => None,
        };
        if let Some(handle) = old {
            self.renderer.destroy(handle);
        }
        let entity = self.entity_mut(id)?;
        entity.renderable = new;
        entity.model = model.map(str::to_string);

        self.refresh(id);
        self.push_render_transform(id);
        self.push_collider_bounds(id);
        Ok(())
    }

    /// Set or clear the collider on one channel.
    ///
    /// The volume is the renderable's local bounds (unit box without one) at
    /// the current world scale and position.
    pub fn set_collider(
        &mut self,
        id: EntityId,
        channel: ColliderChannel,
        kind: Option<ColliderKind>,
    ) -> Result<(), SceneError> {
        let old = self.entity_mut(id)?.collider_slot(channel).take();
        if let Some(old) = old {
            self.colliders.destroy_collider(old.handle);
        }
        if let Some(kind) = kind {
            let bounds = self.collider_bounds(id).unwrap_or_else(Aabb::unit);
            let handle = self.colliders.create_collider(kind, bounds);
            *self.entity_mut(id)?.collider_slot(channel) = Some(Collider {
                kind,
                handle,
                active: true,
            });
        }
        self.refresh(id);
        Ok(())
    }

    fn collider_bounds(&self, id: EntityId) -> Option<Aabb> {
        let entity = self.entities.get(id)?;
        let world = self.world_transform(id)?;
        let local = entity
            .renderable
            .and_then(|handle| self.renderer.get_bounds(handle))
            .unwrap_or_else(Aabb::unit);
        Some(local.scaled(&world.scale).translated(&world.position))
    }

    // ---- naming / flags / handlers ------------------------------------

    /// Rename
    pub fn rename(&mut self, id: EntityId, name: impl Into<String>) -> Result<(), SceneError> {
        self.entity_mut(id)?.name = name.into();
        Ok(())
    }

    /// Replace the behaviour flags
    pub fn set_flags(&mut self, id: EntityId, flags: EntityFlags) -> Result<(), SceneError> {
        self.entity_mut(id)?.flags = flags;
        self.refresh(id);
        Ok(())
    }

    /// Install the entity-level click handler
    pub fn set_on_click(&mut self, id: EntityId, handler: Option<ClickHandler>) -> Result<(), SceneError> {
        self.entity_mut(id)?.on_click = handler;
        Ok(())
    }

    // ---- selection ----------------------------------------------------

    /// Add to the selection
    pub fn select(&mut self, id: EntityId) -> Result<(), SceneError> {
        self.entity_ref(id)?;
        self.selection.insert(id);
        Ok(())
    }

    /// Remove from the selection; returns whether it was selected
    pub fn deselect(&mut self, id: EntityId) -> bool {
        self.selection.remove(&id)
    }

    /// Empty the selection
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Whether `id` is selected
    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selection.contains(&id)
    }

    /// Selected entities in registry order
    pub fn selection(&self) -> Vec<EntityId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.selection.contains(id))
            .collect()
    }

    // ---- mode ---------------------------------------------------------

    /// Flip the mode flag and re-derive visibility and colliders everywhere.
    /// Lifecycle callbacks are the mode system's job.
    pub(crate) fn set_mode_flag(&mut self, edit_mode: bool) {
        self.edit_mode = edit_mode;
        for id in self.order.clone() {
            self.refresh(id);
        }
    }

    /// Entity gets update/input dispatch right now
    pub(crate) fn is_dispatchable(&self, id: EntityId) -> bool {
        self.is_effectively_enabled(id)
            && (self.edit_mode || !self.entities[id].flags.contains(EntityFlags::EDITOR_ONLY))
    }

    /// Entity takes part in start/stop
    pub(crate) fn receives_lifecycle(&self, id: EntityId) -> bool {
        self.get(id)
            .is_some_and(|e| !e.flags.contains(EntityFlags::EDITOR_ONLY))
    }

    pub(crate) fn set_hovered_flag(&mut self, id: EntityId, hovered: bool) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.hovered = hovered;
        }
    }

    pub(crate) fn take_on_click(&mut self, id: EntityId) -> Option<ClickHandler> {
        self.entities.get_mut(id)?.on_click.take()
    }

    pub(crate) fn put_on_click(&mut self, id: EntityId, handler: ClickHandler) {
        if let Some(entity) = self.entities.get_mut(id) {
            if entity.on_click.is_none() {
                entity.on_click = Some(handler);
            }
        }
    }

    pub(crate) fn take_components(&mut self, id: EntityId) -> Option<Vec<AttachedComponent>> {
        self.entities.get_mut(id).map(|e| std::mem::take(&mut e.components))
    }

    /// Put components back in front of any attached meanwhile
    pub(crate) fn put_components(&mut self, id: EntityId, mut components: Vec<AttachedComponent>) {
        if let Some(entity) = self.entities.get_mut(id) {
            components.append(&mut entity.components);
            entity.components = components;
        }
    }

    pub(crate) fn begin_dispatch(&mut self, id: EntityId) {
        self.dispatch_frames.entry(id).or_default().push(Vec::new());
    }

    /// Queue `hook` if `id` is mid-dispatch; a no-op otherwise
    pub(crate) fn queue_hook(&mut self, id: EntityId, hook: Hook<'_>) {
        if let Some(frame) = self.dispatch_frames.get_mut(&id).and_then(|f| f.last_mut()) {
            frame.push(QueuedHook::from_hook(hook));
        }
    }

    pub(crate) fn take_queued_hooks(&mut self, id: EntityId) -> Vec<QueuedHook> {
        self.dispatch_frames
            .get_mut(&id)
            .and_then(|f| f.last_mut())
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Close the innermost dispatch of `id`, returning how many hooks were left unrun
    pub(crate) fn end_dispatch(&mut self, id: EntityId) -> usize {
        let Some(frames) = self.dispatch_frames.get_mut(&id) else {
            return 0;
        };
        let dropped = frames.pop().map_or(0, |frame| frame.len());
        if frames.is_empty() {
            self.dispatch_frames.remove(&id);
        }
        dropped
    }

    // ---- collaborator sync --------------------------------------------

    /// Re-derive visibility and collider activity of one entity
    fn refresh(&mut self, id: EntityId) {
        let visible = self.is_effectively_enabled(id)
            && (self.edit_mode || !self.entities[id].flags.contains(EntityFlags::EDITOR_ONLY));
        let edit_mode = self.edit_mode;
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        entity.visible = visible;
        if let Some(handle) = entity.renderable {
            self.renderer.set_visible(handle, visible);
        }
        for (collider, channel) in [
            (&mut entity.play_collider, ColliderChannel::Play),
            (&mut entity.edit_collider, ColliderChannel::Edit),
        ] {
            if let Some(collider) = collider {
                let active = visible && channel == ColliderChannel::for_mode(edit_mode);
                if active {
                    self.colliders.enable(collider.handle);
                } else {
                    self.colliders.disable(collider.handle);
                }
                collider.active = active;
            }
        }
    }

    fn push_render_transform(&mut self, id: EntityId) {
        let Some(handle) = self.entities.get(id).and_then(|e| e.renderable) else {
            return;
        };
        if let Some(transform) = self.render_transform(id) {
            self.renderer.set_transform(handle, &transform);
        }
    }

    fn push_collider_bounds(&mut self, id: EntityId) {
        let Some(bounds) = self.collider_bounds(id) else {
            return;
        };
        let Some(entity) = self.entities.get(id) else {
            return;
        };
        for collider in [entity.play_collider, entity.edit_collider].into_iter().flatten() {
            self.colliders.update_bounds(collider.handle, bounds);
        }
    }

    /// Push world transforms and collider volumes for `id` and its descendants
    fn sync_subtree(&mut self, id: EntityId) {
        for member in self.subtree(id) {
            self.push_render_transform(member);
            self.push_collider_bounds(member);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::headless()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.order.len())
            .field("selection", &self.selection.len())
            .field("edit_mode", &self.edit_mode)
            .finish_non_exhaustive()
    }
}
