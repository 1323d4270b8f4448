//! Entity implementation
//!
//! Entities live in the [`World`](super::World) arena and are addressed by
//! [`EntityId`]. The parent link is a back-reference only: a parent never
//! owns its children, the world owns every entity's lifetime.

use super::component::AttachedComponent;
use super::World;
use crate::foundation::math::{Axes, Transform, Vec3};
use crate::physics::{ColliderChannel, ColliderHandle, ColliderKind};
use crate::render::RenderHandle;
use bitflags::bitflags;

slotmap::new_key_type! {
    /// Entity identifier (generational, never reused for a different entity)
    pub struct EntityId;
}

bitflags! {
    /// Per-entity behaviour flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EntityFlags: u32 {
        /// Editor tooling (gizmos, grid, cursor); hidden and not dispatched in play mode
        const EDITOR_ONLY = 0b0001;
        /// Never returned by picking
        const UNPICKABLE = 0b0010;
    }
}

/// Handler invoked when the entity itself is clicked, before its components
pub type ClickHandler = Box<dyn FnMut(&mut World, EntityId)>;

/// A live collider on one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    /// Volume shape
    pub kind: ColliderKind,
    /// Backend handle
    pub handle: ColliderHandle,
    /// Whether the backend currently has it enabled
    pub active: bool,
}

/// A node in the scene graph
pub struct Entity {
    pub(crate) name: String,
    pub(crate) parent: Option<EntityId>,
    pub(crate) transform: Transform,
    pub(crate) enabled: bool,
    pub(crate) flags: EntityFlags,
    pub(crate) model: Option<String>,
    pub(crate) renderable: Option<RenderHandle>,
    pub(crate) origin: Vec3,
    pub(crate) play_collider: Option<Collider>,
    pub(crate) edit_collider: Option<Collider>,
    pub(crate) components: Vec<AttachedComponent>,
    pub(crate) on_click: Option<ClickHandler>,
    pub(crate) visible: bool,
    pub(crate) hovered: bool,
    pub(crate) trashed: bool,
}

impl Entity {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            parent: None,
            transform: Transform::identity(),
            enabled: true,
            flags: EntityFlags::empty(),
            model: None,
            renderable: None,
            origin: Vec3::zeros(),
            play_collider: None,
            edit_collider: None,
            components: Vec::new(),
            on_click: None,
            visible: false,
            hovered: false,
            trashed: false,
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent back-reference (`None` = scene root)
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Local transform relative to the parent
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// The entity's own enabled flag, ignoring ancestors
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Behaviour flags
    pub fn flags(&self) -> EntityFlags {
        self.flags
    }

    /// Whether the entity is editor tooling
    pub fn is_editor_only(&self) -> bool {
        self.flags.contains(EntityFlags::EDITOR_ONLY)
    }

    /// Mesh reference of the current renderable
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Renderer handle, if a renderable is attached
    pub fn renderable(&self) -> Option<RenderHandle> {
        self.renderable
    }

    /// Normalized pivot applied to the renderable
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Collider on the given channel
    pub fn collider(&self, channel: ColliderChannel) -> Option<&Collider> {
        match channel {
            ColliderChannel::Play => self.play_collider.as_ref(),
            ColliderChannel::Edit => self.edit_collider.as_ref(),
        }
    }

    pub(crate) fn collider_slot(&mut self, channel: ColliderChannel) -> &mut Option<Collider> {
        match channel {
            ColliderChannel::Play => &mut self.play_collider,
            ColliderChannel::Edit => &mut self.edit_collider,
        }
    }

    /// Visibility last pushed to the renderer
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the pointer is currently over this entity
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Whether the entity sits in the trash awaiting disposal
    pub fn is_trashed(&self) -> bool {
        self.trashed
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Names of attached components, in attachment order
    pub fn component_names(&self) -> Vec<&str> {
        self.components.iter().map(AttachedComponent::name).collect()
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("transform", &self.transform)
            .field("enabled", &self.enabled)
            .field("flags", &self.flags)
            .field("model", &self.model)
            .field("components", &self.component_names())
            .finish_non_exhaustive()
    }
}

/// Description of an entity to spawn
///
/// # Examples
/// ```
/// # use editor_core::ecs::{EntityDesc, World};
/// let mut world = World::headless();
/// let id = world
///     .spawn(EntityDesc::new("crate").with_model("cube").with_position((1.0, 2.0)))
///     .unwrap();
/// assert_eq!(world.get(id).unwrap().name(), "crate");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDesc {
    /// Human-readable name
    pub name: String,
    /// Parent (`None` = scene root)
    pub parent: Option<EntityId>,
    /// Local transform
    pub transform: Transform,
    /// Own enabled flag
    pub enabled: bool,
    /// Behaviour flags
    pub flags: EntityFlags,
    /// Mesh reference for the renderable
    pub model: Option<String>,
    /// Renderable pivot
    pub origin: Vec3,
    /// Collider for play mode
    pub play_collider: Option<ColliderKind>,
    /// Collider for edit-mode picking
    pub edit_collider: Option<ColliderKind>,
}

impl EntityDesc {
    /// Enabled root entity with identity transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            transform: Transform::identity(),
            enabled: true,
            flags: EntityFlags::empty(),
            model: None,
            origin: Vec3::zeros(),
            play_collider: None,
            edit_collider: None,
        }
    }

    /// Set the parent
    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the local position (two or three axes)
    pub fn with_position(mut self, position: impl Into<Axes>) -> Self {
        self.transform.position = position.into().apply(self.transform.position);
        self
    }

    /// Set the local rotation in Euler degrees (two or three axes)
    pub fn with_rotation(mut self, rotation: impl Into<Axes>) -> Self {
        self.transform.rotation = rotation.into().apply(self.transform.rotation);
        self
    }

    /// Set the local scale (two or three axes)
    pub fn with_scale(mut self, scale: impl Into<Axes>) -> Self {
        self.transform.scale = scale.into().apply(self.transform.scale);
        self
    }

    /// Set the mesh reference
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the renderable pivot
    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    /// Set the own enabled flag
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Add behaviour flags
    pub fn with_flags(mut self, flags: EntityFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Mark as editor tooling
    pub fn editor_only(self) -> Self {
        self.with_flags(EntityFlags::EDITOR_ONLY)
    }

    /// Use the same collider kind on both channels
    pub fn with_collider(mut self, kind: ColliderKind) -> Self {
        self.play_collider = Some(kind);
        self.edit_collider = Some(kind);
        self
    }

    /// Set the play-mode collider
    pub fn with_play_collider(mut self, kind: ColliderKind) -> Self {
        self.play_collider = Some(kind);
        self
    }

    /// Set the edit-mode picking collider
    pub fn with_edit_collider(mut self, kind: ColliderKind) -> Self {
        self.edit_collider = Some(kind);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desc_two_axis_position_keeps_depth() {
        let desc = EntityDesc::new("e")
            .with_position((1.0, 2.0, 3.0))
            .with_position((5.0, 6.0));

        assert_eq!(desc.transform.position, Vec3::new(5.0, 6.0, 3.0));
    }

    #[test]
    fn test_desc_flags_accumulate() {
        let desc = EntityDesc::new("gizmo")
            .editor_only()
            .with_flags(EntityFlags::UNPICKABLE);

        assert!(desc.flags.contains(EntityFlags::EDITOR_ONLY | EntityFlags::UNPICKABLE));
    }

    #[test]
    fn test_with_collider_sets_both_channels() {
        let desc = EntityDesc::new("e").with_collider(ColliderKind::Sphere);

        assert_eq!(desc.play_collider, Some(ColliderKind::Sphere));
        assert_eq!(desc.edit_collider, Some(ColliderKind::Sphere));
    }
}
