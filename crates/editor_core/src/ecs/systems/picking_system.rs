//! High-level picking system for mouse-based entity selection
//!
//! Orchestrates the picking pipeline: pointer → camera ray → colliders →
//! entity callbacks. Hover is edge-triggered: enter and exit fire only when
//! the hovered entity changes between polls.

use super::dispatch::{self, Hook};
use crate::config::PickingConfig;
use crate::ecs::{EntityFlags, EntityId, World};
use crate::foundation::logging::{debug, warn};
use crate::input::{KeyEvent, KeyState, PointerState};
use crate::physics::{ColliderChannel, ColliderHandle, Ray, RayHit};
use crate::render::Camera;

/// Selection mode for picking system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Replace current selection (default)
    Replace,
    /// Add to current selection (Ctrl)
    Add,
    /// Remove from current selection (Shift)
    Remove,
}

impl SelectionMode {
    /// Mode implied by the held modifier keys
    pub fn from_keys(keys: &KeyState) -> Self {
        if keys.control() {
            Self::Add
        } else if keys.shift() {
            Self::Remove
        } else {
            Self::Replace
        }
    }
}

/// Result of a pick: the entity and where its collider was hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick {
    /// Entity under the pointer
    pub entity: EntityId,
    /// Collider hit
    pub hit: RayHit,
}

/// Resolves the hovered entity once per poll and turns clicks into callbacks
#[derive(Debug)]
pub struct PickingSystem {
    /// Currently hovered entity (if any)
    hovered: Option<Pick>,

    /// Whether to perform hover detection
    hover_enabled: bool,

    /// Hits further along the ray are ignored
    max_distance: f32,

    /// Modifier key states for selection modes
    keys: KeyState,
}

impl PickingSystem {
    /// Create a picking system with default settings
    pub fn new() -> Self {
        Self::from_config(&PickingConfig::default())
    }

    /// Create a picking system from configuration
    pub fn from_config(config: &PickingConfig) -> Self {
        Self {
            hovered: None,
            hover_enabled: config.hover_enabled,
            max_distance: config.max_distance,
            keys: KeyState::new(),
        }
    }

    /// Currently hovered entity
    pub fn hovered(&self) -> Option<EntityId> {
        self.hovered.map(|pick| pick.entity)
    }

    /// Hit point on the hovered entity's collider
    pub fn hovered_point(&self) -> Option<crate::foundation::math::Vec3> {
        self.hovered.map(|pick| pick.hit.point)
    }

    /// Enable or disable hover tracking. Disabling exits the current hover.
    pub fn set_hover_enabled(&mut self, world: &mut World, enabled: bool) {
        self.hover_enabled = enabled;
        if !enabled {
            self.set_hovered(world, None);
        }
    }

    /// Modifier keys seen so far
    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    /// Resolve the hovered entity for this poll.
    ///
    /// Fires `on_mouse_exit` on the previous entity and `on_mouse_enter` on
    /// the new one when they differ; nothing fires while hover is unchanged.
    pub fn poll(&mut self, world: &mut World, camera: &Camera, pointer: &PointerState) -> Option<EntityId> {
        let pick = if self.hover_enabled {
            let (ndc_x, ndc_y) = pointer.screen_to_ndc();
            let ray = camera.screen_to_world_ray(ndc_x, ndc_y);
            self.pick(world, &ray)
        } else {
            None
        };
        self.set_hovered(world, pick);
        self.hovered()
    }

    /// Nearest pickable entity hit by `ray`; ties go to the earliest spawned
    pub fn pick(&self, world: &World, ray: &Ray) -> Option<Pick> {
        let channel = ColliderChannel::for_mode(world.is_edit_mode());
        let mut owners = Vec::new();
        let mut handles: Vec<ColliderHandle> = Vec::new();

        for &id in world.entities() {
            let Some(entity) = world.get(id) else {
                continue;
            };
            if entity.flags().contains(EntityFlags::UNPICKABLE) || !entity.is_visible() {
                continue;
            }
            if let Some(collider) = entity.collider(channel).filter(|c| c.active) {
                owners.push(id);
                handles.push(collider.handle);
            }
        }

        let hit = world.colliders().raycast(ray, &handles)?;
        if hit.distance > self.max_distance {
            return None;
        }
        let index = handles.iter().position(|h| *h == hit.collider)?;
        Some(Pick {
            entity: owners[index],
            hit,
        })
    }

    /// Handle a discrete input event.
    ///
    /// A left-mouse press over the hovered entity calls its click handler and
    /// every component's `on_click` once. In edit mode the press also updates
    /// the selection according to the held modifiers. Returns whether an
    /// entity was clicked.
    pub fn handle_event(&mut self, world: &mut World, event: &KeyEvent) -> bool {
        self.keys.apply(event);
        if !event.is_left_click() {
            return false;
        }

        let target = self.hovered().filter(|id| world.contains(*id));
        if world.is_edit_mode() {
            apply_selection(world, target, SelectionMode::from_keys(&self.keys));
        }
        let Some(id) = target else {
            return false;
        };

        debug!("Clicked {:?}", id);
        if let Some(mut handler) = world.take_on_click(id) {
            handler(world, id);
            world.put_on_click(id, handler);
        }
        dispatch::invoke_entity(world, id, Hook::Click);
        true
    }

    fn set_hovered(&mut self, world: &mut World, pick: Option<Pick>) {
        let previous = self.hovered();
        let current = pick.map(|p| p.entity);
        self.hovered = pick;
        if previous == current {
            return;
        }

        if let Some(old) = previous {
            world.set_hovered_flag(old, false);
            dispatch::invoke_entity(world, old, Hook::MouseExit);
        }
        if let Some(new) = current {
            world.set_hovered_flag(new, true);
            dispatch::invoke_entity(world, new, Hook::MouseEnter);
        }
    }
}

impl Default for PickingSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_selection(world: &mut World, target: Option<EntityId>, mode: SelectionMode) {
    match (mode, target) {
        (SelectionMode::Replace, target) => {
            world.clear_selection();
            if let Some(id) = target {
                select_logged(world, id);
            }
        }
        (SelectionMode::Add, Some(id)) => select_logged(world, id),
        (SelectionMode::Remove, Some(id)) => {
            world.deselect(id);
        }
        (_, None) => {}
    }
}

fn select_logged(world: &mut World, id: EntityId) {
    if let Err(e) = world.select(id) {
        warn!("Cannot select clicked entity: {}", e);
    }
}
