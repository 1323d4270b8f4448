//! Undo/redo
//!
//! Edits are expressed as [`Action`]s and recorded on an [`UndoStack`].

pub mod action;
pub mod actions;
pub mod stack;

pub use action::{Action, ActionError, ActionGroup, FnAction};
pub use actions::{
    DestroyAction, ReparentAction, RenameAction, SetEnabledAction, SetTransformAction, SpawnAction,
    TransformField,
};
pub use stack::UndoStack;
