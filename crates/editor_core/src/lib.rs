//! # Editor Core
//!
//! Runtime object model for an interactive scene editor.
//!
//! ## Features
//!
//! - **Scene Hierarchy**: Entities with local transforms, parenting and cascading enable state
//! - **Components**: Named, pluggable behaviours with fault-isolated callbacks
//! - **Edit/Play Modes**: Separate collider channels and editor-only entities per mode
//! - **Picking**: Edge-triggered hover, click and modifier-driven selection
//! - **Undo/Redo**: Reversible actions, groups and a savepoint
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use editor_core::prelude::*;
//!
//! let mut editor = Editor::new(EditorConfig::default());
//! let cube = editor
//!     .spawn(EntityDesc::new("cube").with_model("cube").with_collider(ColliderKind::Box))
//!     .expect("spawn failed");
//!
//! editor.do_action(SetTransformAction::position(cube, (1.0, 2.0, 0.0)));
//! editor.undo();
//!
//! editor.toggle_mode();
//! editor.frame(1.0 / 60.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod render;
pub mod undo;

mod editor;

pub use config::{ConfigError, EditorConfig};
pub use ecs::{ComponentError, SceneError};
pub use editor::Editor;
pub use render::RenderError;
pub use undo::ActionError;

/// Common imports for editor users
pub mod prelude {
    pub use crate::{
        config::{Config, EditorConfig},
        ecs::{
            systems::{DispatchReport, PickingSystem, SelectionMode},
            Component, ComponentContext, ComponentError, ComponentRegistry, ComponentResult,
            EntityDesc, EntityFlags, EntityId, SceneError, World,
        },
        foundation::math::{Axes, Transform, Vec3},
        input::{KeyEvent, PointerState},
        physics::{ColliderChannel, ColliderKind},
        render::Camera,
        undo::{
            Action, ActionError, ActionGroup, DestroyAction, ReparentAction, SetEnabledAction,
            SetTransformAction, SpawnAction, UndoStack,
        },
        Editor,
    };
}
