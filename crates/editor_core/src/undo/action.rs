//! Reversible actions
//!
//! An action captures whatever it needs to reverse itself while it is
//! applied. `apply` may run again after `revert` (redo), so it re-captures
//! its "before" state each time.

use crate::ecs::{SceneError, World};
use thiserror::Error;

/// Errors raised while applying or reverting an action
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// A world operation failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Action-specific failure
    #[error("Action failed: {0}")]
    Failed(String),

    /// A group was built with no actions
    #[error("Action group is empty")]
    EmptyGroup,

    /// Undo or redo was requested while a group is being recorded
    #[error("Cannot undo or redo while a group is open")]
    GroupOpen,
}

/// A reversible edit
pub trait Action {
    /// Perform the forward effect; returns a label describing it
    fn apply(&mut self, world: &mut World) -> Result<String, ActionError>;

    /// Undo the forward effect
    fn revert(&mut self, world: &mut World) -> Result<(), ActionError>;
}

type ApplyFn = Box<dyn FnMut(&mut World) -> Result<String, ActionError>>;
type RevertFn = Box<dyn FnMut(&mut World) -> Result<(), ActionError>>;

/// Action built from a pair of closures
pub struct FnAction {
    apply: ApplyFn,
    revert: RevertFn,
}

impl FnAction {
    /// Create an action from forward and inverse closures
    pub fn new<A, R>(apply: A, revert: R) -> Self
    where
        A: FnMut(&mut World) -> Result<String, ActionError> + 'static,
        R: FnMut(&mut World) -> Result<(), ActionError> + 'static,
    {
        Self {
            apply: Box::new(apply),
            revert: Box::new(revert),
        }
    }
}

impl Action for FnAction {
    fn apply(&mut self, world: &mut World) -> Result<String, ActionError> {
        (self.apply)(world)
    }

    fn revert(&mut self, world: &mut World) -> Result<(), ActionError> {
        (self.revert)(world)
    }
}

/// Several actions undone and redone as one step
///
/// Applies in order and reverts in reverse order. If one member fails while
/// applying, the members already applied are reverted before the error is
/// returned.
pub struct ActionGroup {
    label: String,
    actions: Vec<Box<dyn Action>>,
}

impl ActionGroup {
    /// Empty group with a label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            actions: Vec::new(),
        }
    }

    /// Add a member (builder style)
    #[must_use]
    pub fn with(mut self, action: impl Action + 'static) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    /// Add a member
    pub fn push(&mut self, action: Box<dyn Action>) {
        self.actions.push(action);
    }

    /// Group label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Action for ActionGroup {
    fn apply(&mut self, world: &mut World) -> Result<String, ActionError> {
        if self.actions.is_empty() {
            return Err(ActionError::EmptyGroup);
        }
        for applied in 0..self.actions.len() {
            if let Err(e) = self.actions[applied].apply(world) {
                for action in self.actions[..applied].iter_mut().rev() {
                    action.revert(world)?;
                }
                return Err(e);
            }
        }
        Ok(self.label.clone())
    }

    fn revert(&mut self, world: &mut World) -> Result<(), ActionError> {
        for action in self.actions.iter_mut().rev() {
            action.revert(world)?;
        }
        Ok(())
    }
}
