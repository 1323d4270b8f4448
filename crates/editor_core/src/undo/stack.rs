//! Undo/redo stack with grouping and a savepoint
//!
//! New actions land on the undo stack and discard the redo branch. While a
//! group is open, actions land in the group's buffer instead and become one
//! composite entry when the group closes. Any failure while applying or
//! reverting clears the whole history.

use super::action::{Action, ActionError, ActionGroup};
use crate::ecs::World;
use crate::foundation::logging::{debug, warn};
use std::collections::VecDeque;

type Listener = Box<dyn FnMut(&str)>;

struct Entry {
    label: String,
    action: Box<dyn Action>,
}

/// Undo/redo history
pub struct UndoStack {
    undo: VecDeque<Entry>,
    redo: VecDeque<Entry>,
    groups: Vec<ActionGroup>,
    savepoint: Option<usize>,
    max_history: Option<usize>,
    on_did: Option<Listener>,
    on_undone: Option<Listener>,
}

impl UndoStack {
    /// Unbounded history; the empty state counts as saved
    pub fn new() -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            groups: Vec::new(),
            savepoint: Some(0),
            max_history: None,
            on_did: None,
            on_undone: None,
        }
    }

    /// History keeping at most `max_history` undo entries
    pub fn with_max_history(max_history: Option<usize>) -> Self {
        Self {
            max_history,
            ..Self::new()
        }
    }

    /// Called with the label after `do_action` or `redo` records an entry
    pub fn on_did(&mut self, listener: impl FnMut(&str) + 'static) {
        self.on_did = Some(Box::new(listener));
    }

    /// Called with the label after `undo`
    pub fn on_undone(&mut self, listener: impl FnMut(&str) + 'static) {
        self.on_undone = Some(Box::new(listener));
    }

    /// Apply `action` and record it. Returns the action's label.
    pub fn do_action(
        &mut self,
        world: &mut World,
        action: impl Action + 'static,
    ) -> Result<String, ActionError> {
        self.do_boxed(world, Box::new(action))
    }

    /// [`UndoStack::do_action`] for an already boxed action
    pub fn do_boxed(
        &mut self,
        world: &mut World,
        mut action: Box<dyn Action>,
    ) -> Result<String, ActionError> {
        let label = self.apply(world, action.as_mut())?;
        self.push_applied(label.clone(), action);
        Ok(label)
    }

    /// [`UndoStack::do_action`] that also reads the applied action, before
    /// it is recorded, through `inspect`
    pub fn do_inspect<A: Action + 'static, R>(
        &mut self,
        world: &mut World,
        mut action: A,
        inspect: impl FnOnce(&A) -> R,
    ) -> Result<(String, R), ActionError> {
        let label = self.apply(world, &mut action)?;
        let value = inspect(&action);
        self.push_applied(label.clone(), Box::new(action));
        Ok((label, value))
    }

    /// Revert the latest entry. `Ok(None)` if there is nothing to undo.
    pub fn undo(&mut self, world: &mut World) -> Result<Option<String>, ActionError> {
        if !self.groups.is_empty() {
            return Err(ActionError::GroupOpen);
        }
        let Some(mut entry) = self.undo.pop_back() else {
            return Ok(None);
        };
        if let Err(e) = entry.action.revert(world) {
            self.discard_history("undo", &e);
            return Err(e);
        }

        debug!("Undid '{}'", entry.label);
        let label = entry.label.clone();
        self.redo.push_back(entry);
        if let Some(listener) = self.on_undone.as_mut() {
            listener(&label);
        }
        Ok(Some(label))
    }

    /// Re-apply the latest undone entry. `Ok(None)` if there is nothing to redo.
    pub fn redo(&mut self, world: &mut World) -> Result<Option<String>, ActionError> {
        if !self.groups.is_empty() {
            return Err(ActionError::GroupOpen);
        }
        let Some(mut entry) = self.redo.pop_back() else {
            return Ok(None);
        };
        match entry.action.apply(world) {
            Ok(label) => entry.label = label,
            Err(e) => {
                self.discard_history("redo", &e);
                return Err(e);
            }
        }

        debug!("Redid '{}'", entry.label);
        let label = entry.label.clone();
        self.push_undo(entry);
        if let Some(listener) = self.on_did.as_mut() {
            listener(&label);
        }
        Ok(Some(label))
    }

    /// Record everything done inside `body` as one undo step labelled `label`.
    ///
    /// Groups nest: an inner group becomes one member of the outer one. If
    /// `body` fails, the members it already applied are reverted in reverse
    /// order and nothing is recorded. A group with no members records nothing.
    pub fn group<R>(
        &mut self,
        world: &mut World,
        label: impl Into<String>,
        body: impl FnOnce(&mut Self, &mut World) -> Result<R, ActionError>,
    ) -> Result<R, ActionError> {
        self.groups.push(ActionGroup::new(label));
        let result = body(self, world);
        let Some(mut group) = self.groups.pop() else {
            return result;
        };

        let value = match result {
            Ok(value) => value,
            Err(e) => {
                if let Err(rollback) = group.revert(world) {
                    self.discard_history("group rollback", &rollback);
                }
                return Err(e);
            }
        };
        if group.is_empty() {
            return Ok(value);
        }

        let label = group.label().to_string();
        match self.groups.last_mut() {
            Some(outer) => outer.push(Box::new(group)),
            None => self.record(label, Box::new(group)),
        }
        Ok(value)
    }

    /// Mark the current state as saved
    pub fn mark_saved(&mut self) {
        self.savepoint = Some(self.undo.len());
    }

    /// Whether the state differs from the last [`UndoStack::mark_saved`]
    pub fn has_unsaved_changes(&self) -> bool {
        self.savepoint != Some(self.undo.len())
    }

    /// Whether [`UndoStack::undo`] would do something
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether [`UndoStack::redo`] would do something
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Undo labels, most recent first
    pub fn undo_labels(&self) -> Vec<&str> {
        self.undo.iter().rev().map(|e| e.label.as_str()).collect()
    }

    /// Redo labels, next to redo first
    pub fn redo_labels(&self) -> Vec<&str> {
        self.redo.iter().rev().map(|e| e.label.as_str()).collect()
    }

    /// Whether a group is being recorded
    pub fn is_grouping(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Forget all history. The current state stays saved or unsaved.
    pub fn clear(&mut self) {
        let saved = !self.has_unsaved_changes();
        self.undo.clear();
        self.redo.clear();
        self.savepoint = saved.then_some(0);
    }

    fn apply(&mut self, world: &mut World, action: &mut dyn Action) -> Result<String, ActionError> {
        action.apply(world).map_err(|e| {
            self.discard_history("do", &e);
            e
        })
    }

    /// Record into the open group, or as a new entry
    fn push_applied(&mut self, label: String, action: Box<dyn Action>) {
        if let Some(group) = self.groups.last_mut() {
            group.push(action);
        } else {
            self.record(label, action);
        }
    }

    fn record(&mut self, label: String, action: Box<dyn Action>) {
        if self.savepoint.is_some_and(|s| s > self.undo.len()) {
            self.savepoint = None;
        }
        self.redo.clear();
        debug!("Did '{}'", label);
        self.push_undo(Entry {
            label: label.clone(),
            action,
        });
        if let Some(listener) = self.on_did.as_mut() {
            listener(&label);
        }
    }

    fn push_undo(&mut self, entry: Entry) {
        self.undo.push_back(entry);
        if let Some(max) = self.max_history {
            while self.undo.len() > max {
                self.undo.pop_front();
                self.savepoint = match self.savepoint {
                    Some(0) | None => None,
                    Some(s) => Some(s - 1),
                };
            }
        }
    }

    fn discard_history(&mut self, phase: &str, error: &ActionError) {
        warn!("Undo history cleared after {} failed: {}", phase, error);
        self.undo.clear();
        self.redo.clear();
        self.savepoint = None;
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UndoStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoStack")
            .field("undo", &self.undo_labels())
            .field("redo", &self.redo_labels())
            .field("savepoint", &self.savepoint)
            .field("groups", &self.groups.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undo::FnAction;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn counter_action(counter: &Rc<Cell<i32>>, step: i32) -> FnAction {
        let forward = Rc::clone(counter);
        let backward = Rc::clone(counter);
        FnAction::new(
            move |_| {
                forward.set(forward.get() + step);
                Ok(format!("add {step}"))
            },
            move |_| {
                backward.set(backward.get() - step);
                Ok(())
            },
        )
    }

    fn failing_revert() -> FnAction {
        FnAction::new(
            |_| Ok("fragile".to_string()),
            |_| Err(ActionError::Failed("corrupt".to_string())),
        )
    }

    #[test]
    fn test_undo_redo_moves_entries() {
        let counter = Rc::new(Cell::new(0));
        let mut world = World::headless();
        let mut stack = UndoStack::new();
        stack.do_action(&mut world, counter_action(&counter, 1)).unwrap();
        stack.do_action(&mut world, counter_action(&counter, 10)).unwrap();

        assert_eq!(stack.undo(&mut world).unwrap().as_deref(), Some("add 10"));
        assert_eq!(counter.get(), 1);
        assert_eq!(stack.redo_labels(), vec!["add 10"]);

        assert_eq!(stack.redo(&mut world).unwrap().as_deref(), Some("add 10"));
        assert_eq!(counter.get(), 11);
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_empty_undo_and_redo_are_no_ops() {
        let mut world = World::headless();
        let mut stack = UndoStack::new();

        assert_eq!(stack.undo(&mut world), Ok(None));
        assert_eq!(stack.redo(&mut world), Ok(None));
    }

    #[test]
    fn test_new_action_discards_redo_branch() {
        let counter = Rc::new(Cell::new(0));
        let mut world = World::headless();
        let mut stack = UndoStack::new();
        for step in [1, 2, 3] {
            stack.do_action(&mut world, counter_action(&counter, step)).unwrap();
        }
        stack.undo(&mut world).unwrap();
        stack.undo(&mut world).unwrap();
        assert_eq!(stack.redo_labels().len(), 2);

        stack.do_action(&mut world, counter_action(&counter, 100)).unwrap();

        assert!(!stack.can_redo());
        assert_eq!(stack.undo_labels(), vec!["add 100", "add 1"]);
    }

    #[test]
    fn test_failed_revert_clears_history() {
        let counter = Rc::new(Cell::new(0));
        let mut world = World::headless();
        let mut stack = UndoStack::new();
        stack.do_action(&mut world, counter_action(&counter, 1)).unwrap();
        stack.do_action(&mut world, failing_revert()).unwrap();

        assert!(stack.undo(&mut world).is_err());

        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert!(stack.has_unsaved_changes());
    }

    #[test]
    fn test_callbacks_fire() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let counter = Rc::new(Cell::new(0));
        let mut world = World::headless();
        let mut stack = UndoStack::new();
        let did = Rc::clone(&events);
        stack.on_did(move |label| did.borrow_mut().push(format!("did {label}")));
        let undone = Rc::clone(&events);
        stack.on_undone(move |label| undone.borrow_mut().push(format!("undone {label}")));

        stack.do_action(&mut world, counter_action(&counter, 1)).unwrap();
        stack.undo(&mut world).unwrap();

        assert_eq!(*events.borrow(), vec!["did add 1", "undone add 1"]);
    }

    #[test]
    fn test_do_inspect_reads_applied_action() {
        use crate::ecs::EntityDesc;
        use crate::undo::SpawnAction;

        let mut world = World::headless();
        let mut stack = UndoStack::new();

        let (label, spawned) = stack
            .do_inspect(&mut world, SpawnAction::new(EntityDesc::new("a")), SpawnAction::entity)
            .unwrap();
        let a = spawned.unwrap();
        assert_eq!(label, "Spawn a");
        assert_eq!(world.get(a).unwrap().name(), "a");
        assert_eq!(stack.undo_labels(), vec!["Spawn a"]);

        // Inside a group the action joins the group instead of the history
        stack
            .group(&mut world, "pair", |stack, world| {
                let (_, b) = stack.do_inspect(
                    world,
                    SpawnAction::new(EntityDesc::new("b").with_parent(a)),
                    SpawnAction::entity,
                )?;
                assert_eq!(world.parent(b.unwrap()), Some(a));
                Ok(())
            })
            .unwrap();
        assert_eq!(stack.undo_labels(), vec!["Spawn a", "pair"]);

        stack.undo(&mut world).unwrap();
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_group_is_one_step() {
        let counter = Rc::new(Cell::new(0));
        let mut world = World::headless();
        let mut stack = UndoStack::new();

        stack
            .group(&mut world, "three", |stack, world| {
                for step in [1, 2, 3] {
                    stack.do_action(world, counter_action(&counter, step))?;
                }
                Ok(())
            })
            .unwrap();
        assert_eq!(counter.get(), 6);
        assert_eq!(stack.undo_labels(), vec!["three"]);

        stack.undo(&mut world).unwrap();
        assert_eq!(counter.get(), 0);
        stack.redo(&mut world).unwrap();
        assert_eq!(counter.get(), 6);
    }

    #[test]
    fn test_failing_group_rolls_back() {
        let counter = Rc::new(Cell::new(0));
        let mut world = World::headless();
        let mut stack = UndoStack::new();
        stack.do_action(&mut world, counter_action(&counter, 100)).unwrap();

        let result: Result<(), _> = stack.group(&mut world, "broken", |stack, world| {
            stack.do_action(world, counter_action(&counter, 1))?;
            stack.do_action(world, counter_action(&counter, 2))?;
            Err(ActionError::Failed("abort".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(counter.get(), 100);
        assert_eq!(stack.undo_labels(), vec!["add 100"]);
    }

    #[test]
    fn test_nested_group_folds_into_outer() {
        let counter = Rc::new(Cell::new(0));
        let mut world = World::headless();
        let mut stack = UndoStack::new();

        stack
            .group(&mut world, "outer", |stack, world| {
                stack.do_action(world, counter_action(&counter, 1))?;
                stack.group(world, "inner", |stack, world| {
                    stack.do_action(world, counter_action(&counter, 2))
                })?;
                Ok(())
            })
            .unwrap();

        assert_eq!(stack.undo_labels(), vec!["outer"]);
        stack.undo(&mut world).unwrap();
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_empty_group_records_nothing() {
        let mut world = World::headless();
        let mut stack = UndoStack::new();

        stack.group(&mut world, "nothing", |_, _| Ok(())).unwrap();

        assert!(!stack.can_undo());
        assert!(!stack.has_unsaved_changes());
    }

    #[test]
    fn test_undo_inside_group_is_rejected() {
        let mut world = World::headless();
        let mut stack = UndoStack::new();

        let result = stack.group(&mut world, "g", |stack, world| stack.undo(world));

        assert_eq!(result, Err(ActionError::GroupOpen));
    }

    #[test]
    fn test_savepoint_tracks_depth() {
        let counter = Rc::new(Cell::new(0));
        let mut world = World::headless();
        let mut stack = UndoStack::new();
        assert!(!stack.has_unsaved_changes());

        stack.do_action(&mut world, counter_action(&counter, 1)).unwrap();
        assert!(stack.has_unsaved_changes());
        stack.mark_saved();
        assert!(!stack.has_unsaved_changes());

        stack.undo(&mut world).unwrap();
        assert!(stack.has_unsaved_changes());
        stack.redo(&mut world).unwrap();
        assert!(!stack.has_unsaved_changes());
    }

    #[test]
    fn test_savepoint_in_discarded_branch_is_unreachable() {
        let counter = Rc::new(Cell::new(0));
        let mut world = World::headless();
        let mut stack = UndoStack::new();
        stack.do_action(&mut world, counter_action(&counter, 1)).unwrap();
        stack.do_action(&mut world, counter_action(&counter, 2)).unwrap();
        stack.mark_saved();
        stack.undo(&mut world).unwrap();

        stack.do_action(&mut world, counter_action(&counter, 3)).unwrap();

        assert!(stack.has_unsaved_changes());
        stack.undo(&mut world).unwrap();
        assert!(stack.has_unsaved_changes());
    }

    #[test]
    fn test_max_history_drops_oldest() {
        let counter = Rc::new(Cell::new(0));
        let mut world = World::headless();
        let mut stack = UndoStack::with_max_history(Some(2));
        for step in [1, 2, 3] {
            stack.do_action(&mut world, counter_action(&counter, step)).unwrap();
        }

        assert_eq!(stack.undo_labels(), vec!["add 3", "add 2"]);
        assert!(stack.has_unsaved_changes());
        while stack.can_undo() {
            stack.undo(&mut world).unwrap();
        }
        assert_eq!(counter.get(), 1);
        assert!(stack.has_unsaved_changes());
    }
}
