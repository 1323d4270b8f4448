//! Editor facade
//!
//! Ties the scene, history, picking and input together behind one frame
//! loop. Resolution, structural and history errors are logged here and never
//! reach the caller's loop.

use crate::config::EditorConfig;
use crate::ecs::systems::{dispatch, mode_system, DispatchReport, PickingSystem};
use crate::ecs::{ComponentRegistry, EntityDesc, EntityId, World};
use crate::foundation::logging::{info, warn};
use crate::input::{KeyEvent, PointerState};
use crate::render::Camera;
use crate::undo::{Action, ActionError, DestroyAction, SpawnAction, UndoStack};

/// Editor session
pub struct Editor {
    /// Scene registry
    pub world: World,

    /// Name-based component lookup
    pub registry: ComponentRegistry,

    /// View used for picking
    pub camera: Camera,

    /// Pointer position, updated by the host between polls
    pub pointer: PointerState,

    picking: PickingSystem,
    history: UndoStack,
    config: EditorConfig,
    frames: u64,
}

impl Editor {
    /// Create an editor with a headless world
    pub fn new(config: EditorConfig) -> Self {
        Self::with_world(config, World::headless())
    }

    /// Create an editor around an existing world
    pub fn with_world(config: EditorConfig, mut world: World) -> Self {
        info!("Initializing editor...");
        mode_system::set_edit_mode(&mut world, config.start_in_edit_mode);

        let mut camera = Camera::default();
        camera.aspect = config.viewport.width as f32 / config.viewport.height.max(1) as f32;

        Self {
            world,
            registry: ComponentRegistry::with_locations(config.components.search_locations.clone()),
            camera,
            pointer: PointerState::new(config.viewport.width, config.viewport.height),
            picking: PickingSystem::from_config(&config.picking),
            history: UndoStack::with_max_history(config.undo.max_history),
            config,
            frames: 0,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Run one update pass over every enabled entity
    pub fn frame(&mut self, dt: f32) -> DispatchReport {
        self.frames += 1;
        dispatch::dispatch_update(&mut self.world, dt)
    }

    /// One input poll: resolve hover, then deliver each event (click
    /// handling first, then component `input`). Returns the hovered entity.
    pub fn poll_input(&mut self, events: &[KeyEvent]) -> Option<EntityId> {
        let hovered = self.picking.poll(&mut self.world, &self.camera, &self.pointer);
        for event in events {
            self.picking.handle_event(&mut self.world, event);
            dispatch::dispatch_input(&mut self.world, event);
        }
        self.pointer.end_poll();
        hovered
    }

    /// [`Editor::poll_input`] for events in the input collaborator's string form
    pub fn poll_input_str(&mut self, events: &[&str]) -> Option<EntityId> {
        let parsed: Vec<KeyEvent> = events
            .iter()
            .filter_map(|event| match event.parse::<KeyEvent>() {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!("Ignoring input: {}", e);
                    None
                }
            })
            .collect();
        self.poll_input(&parsed)
    }

    /// Entity under the pointer at the last poll
    pub fn hovered(&self) -> Option<EntityId> {
        self.picking.hovered()
    }

    /// Picking state
    pub fn picking(&self) -> &PickingSystem {
        &self.picking
    }

    // ---- history ------------------------------------------------------

    /// Apply and record an action; returns its label
    pub fn do_action(&mut self, action: impl Action + 'static) -> Option<String> {
        let result = self.history.do_action(&mut self.world, action);
        Self::logged(result, "do")
    }

    /// Spawn through the history so the spawn can be undone
    pub fn spawn(&mut self, desc: EntityDesc) -> Option<EntityId> {
        let result = self
            .history
            .do_inspect(&mut self.world, SpawnAction::new(desc), SpawnAction::entity);
        Self::logged(result, "do").and_then(|(_, entity)| entity)
    }

    /// Destroy through the history so the destruction can be undone
    pub fn destroy(&mut self, entity: EntityId) -> bool {
        self.do_action(DestroyAction::new(entity)).is_some()
    }

    /// Undo the latest step; returns its label
    pub fn undo(&mut self) -> Option<String> {
        let result = self.history.undo(&mut self.world);
        Self::logged(result, "undo").flatten()
    }

    /// Redo the latest undone step; returns its label
    pub fn redo(&mut self) -> Option<String> {
        let result = self.history.redo(&mut self.world);
        Self::logged(result, "redo").flatten()
    }

    /// Record everything `body` does as one undo step
    pub fn group<R>(
        &mut self,
        label: impl Into<String>,
        body: impl FnOnce(&mut UndoStack, &mut World) -> Result<R, ActionError>,
    ) -> Option<R> {
        let result = self.history.group(&mut self.world, label, body);
        Self::logged(result, "group")
    }

    /// Undo history
    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Undo history, mutably (for listeners)
    pub fn history_mut(&mut self) -> &mut UndoStack {
        &mut self.history
    }

    /// Mark the current state as saved
    pub fn save_point(&mut self) {
        self.history.mark_saved();
    }

    /// Whether anything changed since the last save point
    pub fn has_unsaved_changes(&self) -> bool {
        self.history.has_unsaved_changes()
    }

    /// Forget history and free everything in the trash
    pub fn clear_history(&mut self) -> usize {
        self.history.clear();
        self.world.purge_trash()
    }

    // ---- mode ---------------------------------------------------------

    /// Whether the editor is in edit mode
    pub fn is_edit_mode(&self) -> bool {
        self.world.is_edit_mode()
    }

    /// Switch modes; returns whether a transition happened
    pub fn set_edit_mode(&mut self, edit_mode: bool) -> bool {
        mode_system::set_edit_mode(&mut self.world, edit_mode)
    }

    /// Flip the mode; returns the new `edit_mode`
    pub fn toggle_mode(&mut self) -> bool {
        mode_system::toggle_mode(&mut self.world)
    }

    // ---- components ---------------------------------------------------

    /// Attach a component by name through the registry
    pub fn attach_named(&mut self, entity: EntityId, name: &str) -> Option<usize> {
        match self.world.attach_named(entity, name, &self.registry) {
            Ok(index) => Some(index),
            Err(e) => {
                warn!("Could not attach '{}': {}", name, e);
                None
            }
        }
    }

    fn logged<T>(result: Result<T, ActionError>, what: &str) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{} failed: {}", what, e);
                None
            }
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
