//! Component dispatcher
//!
//! Callbacks run with the entity's component list taken out of the arena so
//! a component can freely mutate the world through its context. Afterwards
//! the list is put back in front of anything attached during the callbacks;
//! if the entity was purged in the meantime the list is dropped.
//!
//! Hooks raised on an entity from inside its own callbacks are queued and
//! run on the taken-out list before it goes back, so a component that
//! disables its owner or switches modes still sees every transition.
//!
//! A failing callback (an `Err` or a panic) is logged with the entity and
//! component identity and dispatch moves on to the next component.

use crate::ecs::component::{AttachedComponent, ComponentContext, ComponentResult};
use crate::ecs::{EntityId, World};
use crate::foundation::logging::{error, warn};
use crate::input::KeyEvent;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// A component callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hook<'a> {
    /// `start`
    Start,
    /// `stop`
    Stop,
    /// `update(dt)`
    Update(f32),
    /// `input(key)`
    Input(&'a KeyEvent),
    /// `on_enable`
    Enable,
    /// `on_disable`
    Disable,
    /// `on_mouse_enter`
    MouseEnter,
    /// `on_mouse_exit`
    MouseExit,
    /// `on_click`
    Click,
}

impl Hook<'_> {
    /// Callback name as it appears in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Update(_) => "update",
            Self::Input(_) => "input",
            Self::Enable => "on_enable",
            Self::Disable => "on_disable",
            Self::MouseEnter => "on_mouse_enter",
            Self::MouseExit => "on_mouse_exit",
            Self::Click => "on_click",
        }
    }
}

/// Owned copy of a [`Hook`] waiting for an entity that is mid-dispatch
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum QueuedHook {
    Start,
    Stop,
    Update(f32),
    Input(KeyEvent),
    Enable,
    Disable,
    MouseEnter,
    MouseExit,
    Click,
}

impl QueuedHook {
    pub(crate) fn from_hook(hook: Hook<'_>) -> Self {
        match hook {
            Hook::Start => Self::Start,
            Hook::Stop => Self::Stop,
            Hook::Update(dt) => Self::Update(dt),
            Hook::Input(key) => Self::Input(key.clone()),
            Hook::Enable => Self::Enable,
            Hook::Disable => Self::Disable,
            Hook::MouseEnter => Self::MouseEnter,
            Hook::MouseExit => Self::MouseExit,
            Hook::Click => Self::Click,
        }
    }

    fn as_hook(&self) -> Hook<'_> {
        match self {
            Self::Start => Hook::Start,
            Self::Stop => Hook::Stop,
            Self::Update(dt) => Hook::Update(*dt),
            Self::Input(key) => Hook::Input(key),
            Self::Enable => Hook::Enable,
            Self::Disable => Hook::Disable,
            Self::MouseEnter => Hook::MouseEnter,
            Self::MouseExit => Hook::MouseExit,
            Self::Click => Hook::Click,
        }
    }
}

// Bounds hooks that keep re-raising themselves on the same entity
const MAX_QUEUED_ROUNDS: usize = 16;

/// Outcome of a dispatch pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Callbacks invoked
    pub invoked: usize,
    /// Callbacks that returned an error or panicked
    pub failed: usize,
}

impl DispatchReport {
    fn merge(&mut self, other: Self) {
        self.invoked += other.invoked;
        self.failed += other.failed;
    }
}

/// `update(dt)` on every dispatchable entity, in registry order.
///
/// Entities spawned during the pass are first updated next frame.
pub fn dispatch_update(world: &mut World, dt: f32) -> DispatchReport {
    dispatch_all(world, Hook::Update(dt))
}

/// `input(key)` on every dispatchable entity, in registry order
pub fn dispatch_input(world: &mut World, key: &KeyEvent) -> DispatchReport {
    dispatch_all(world, Hook::Input(key))
}

fn dispatch_all(world: &mut World, hook: Hook<'_>) -> DispatchReport {
    let mut report = DispatchReport::default();
    for id in world.entities().to_vec() {
        if world.is_dispatchable(id) {
            report.merge(invoke_entity(world, id, hook));
        }
    }
    report
}

/// Run `hook` on every component of one entity.
///
/// If the entity is already mid-dispatch (the hook was raised from one of
/// its own callbacks), the hook is also queued for the components taken out
/// by that dispatch, which run it before they are put back.
pub fn invoke_entity(world: &mut World, id: EntityId, hook: Hook<'_>) -> DispatchReport {
    world.queue_hook(id, hook);
    invoke(world, id, hook, None)
}

/// Run `hook` on the component at `index` only
pub(crate) fn invoke_component(
    world: &mut World,
    id: EntityId,
    index: usize,
    hook: Hook<'_>,
) -> DispatchReport {
    invoke(world, id, hook, Some(index))
}

fn invoke(world: &mut World, id: EntityId, hook: Hook<'_>, only: Option<usize>) -> DispatchReport {
    let mut report = DispatchReport::default();
    let Some(mut components) = world.take_components(id) else {
        return report;
    };
    let entity_name = world.entities.get(id).map(|e| e.name.clone()).unwrap_or_default();

    world.begin_dispatch(id);
    report.merge(run(world, id, &entity_name, &mut components, hook, only));
    for _ in 0..MAX_QUEUED_ROUNDS {
        let queued = world.take_queued_hooks(id);
        if queued.is_empty() {
            break;
        }
        for queued_hook in &queued {
            report.merge(run(world, id, &entity_name, &mut components, queued_hook.as_hook(), None));
        }
    }
    let dropped = world.end_dispatch(id);
    if dropped > 0 {
        warn!(
            "Dropped {} hooks re-raised on entity '{}' ({:?})",
            dropped, entity_name, id
        );
    }

    world.put_components(id, components);
    report
}

fn run(
    world: &mut World,
    id: EntityId,
    entity_name: &str,
    components: &mut [AttachedComponent],
    hook: Hook<'_>,
    only: Option<usize>,
) -> DispatchReport {
    let mut report = DispatchReport::default();
    for (index, attached) in components.iter_mut().enumerate() {
        if only.is_some_and(|only| only != index) {
            continue;
        }
        match hook {
            Hook::Start if attached.started => continue,
            Hook::Stop if !attached.started => continue,
            Hook::Start => attached.started = true,
            Hook::Stop => attached.started = false,
            _ => {}
        }

        report.invoked += 1;
        let outcome = {
            let mut ctx = ComponentContext::new(world, id);
            catch_unwind(AssertUnwindSafe(|| call(attached, &mut ctx, hook)))
        };
        let message = match outcome {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => e.to_string(),
            Err(panic) => panic_message(panic.as_ref()),
        };
        report.failed += 1;
        error!(
            "{} failed on entity '{}' ({:?}), component {}: {}",
            hook.name(),
            entity_name,
            id,
            attached.name(),
            message
        );
    }
    report
}

fn call(attached: &mut AttachedComponent, ctx: &mut ComponentContext<'_>, hook: Hook<'_>) -> ComponentResult {
    let component = attached.component.as_mut();
    match hook {
        Hook::Start => component.start(ctx),
        Hook::Stop => component.stop(ctx),
        Hook::Update(dt) => component.update(ctx, dt),
        Hook::Input(key) => component.input(ctx, key),
        Hook::Enable => component.on_enable(ctx),
        Hook::Disable => component.on_disable(ctx),
        Hook::MouseEnter => component.on_mouse_enter(ctx),
        Hook::MouseExit => component.on_mouse_exit(ctx),
        Hook::Click => component.on_click(ctx),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{Component, ComponentError};
    use crate::ecs::EntityDesc;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        tag: &'static str,
        log: Log,
    }

    impl Component for Recorder {
        fn update(&mut self, ctx: &mut ComponentContext<'_>, _dt: f32) -> ComponentResult {
            self.log
                .borrow_mut()
                .push(format!("{}:{}", ctx.entity_name(), self.tag));
            Ok(())
        }

        fn input(&mut self, _ctx: &mut ComponentContext<'_>, key: &KeyEvent) -> ComponentResult {
            self.log.borrow_mut().push(format!("{}:{}", self.tag, key));
            Ok(())
        }
    }

    struct Failing;

    impl Component for Failing {
        fn update(&mut self, _ctx: &mut ComponentContext<'_>, _dt: f32) -> ComponentResult {
            Err(ComponentError::Failed("broken".to_string()))
        }
    }

    struct Panicking;

    impl Component for Panicking {
        fn update(&mut self, _ctx: &mut ComponentContext<'_>, _dt: f32) -> ComponentResult {
            panic!("boom");
        }
    }

    struct Quiet;

    impl Component for Quiet {}

    struct Spawner;

    impl Component for Spawner {
        fn update(&mut self, ctx: &mut ComponentContext<'_>, _dt: f32) -> ComponentResult {
            let me = ctx.entity();
            ctx.world_mut().attach(me, Box::new(Quiet))?;
            ctx.world_mut().spawn(EntityDesc::new("spawned"))?;
            Ok(())
        }
    }

    struct SelfDestruct;

    impl Component for SelfDestruct {
        fn update(&mut self, ctx: &mut ComponentContext<'_>, _dt: f32) -> ComponentResult {
            let me = ctx.entity();
            ctx.world_mut().destroy(me)?;
            ctx.world_mut().purge_trash();
            Ok(())
        }
    }

    struct Disabler;

    impl Component for Disabler {
        fn update(&mut self, ctx: &mut ComponentContext<'_>, _dt: f32) -> ComponentResult {
            let me = ctx.entity();
            ctx.world_mut().set_enabled(me, false)?;
            Ok(())
        }
    }

    /// Logs lifecycle and enable hooks
    struct Watcher {
        log: Log,
    }

    impl Component for Watcher {
        fn start(&mut self, _ctx: &mut ComponentContext<'_>) -> ComponentResult {
            self.log.borrow_mut().push("start".to_string());
            Ok(())
        }

        fn stop(&mut self, _ctx: &mut ComponentContext<'_>) -> ComponentResult {
            self.log.borrow_mut().push("stop".to_string());
            Ok(())
        }

        fn on_disable(&mut self, _ctx: &mut ComponentContext<'_>) -> ComponentResult {
            self.log.borrow_mut().push("disable".to_string());
            Ok(())
        }
    }

    /// Flips the mode on `p`
    struct Toggler {
        log: Log,
    }

    impl Component for Toggler {
        fn start(&mut self, _ctx: &mut ComponentContext<'_>) -> ComponentResult {
            self.log.borrow_mut().push("toggler start".to_string());
            Ok(())
        }

        fn input(&mut self, ctx: &mut ComponentContext<'_>, key: &KeyEvent) -> ComponentResult {
            if key.key == "p" && key.pressed {
                crate::ecs::systems::mode_system::toggle_mode(ctx.world_mut());
            }
            Ok(())
        }
    }

    fn recorder(tag: &'static str, log: &Log) -> Box<dyn Component> {
        Box::new(Recorder {
            tag,
            log: Rc::clone(log),
        })
    }

    #[test]
    fn test_update_follows_registry_order() {
        let log = Log::default();
        let mut world = World::headless();
        let a = world.spawn(EntityDesc::new("a")).unwrap();
        let b = world.spawn(EntityDesc::new("b")).unwrap();
        world.attach(b, recorder("1", &log)).unwrap();
        world.attach(a, recorder("1", &log)).unwrap();
        world.attach(a, recorder("2", &log)).unwrap();

        let report = dispatch_update(&mut world, 0.016);

        assert_eq!(*log.borrow(), vec!["a:1", "a:2", "b:1"]);
        assert_eq!(report, DispatchReport { invoked: 3, failed: 0 });
    }

    #[test]
    fn test_failures_are_isolated() {
        let log = Log::default();
        let mut world = World::headless();
        let a = world.spawn(EntityDesc::new("a")).unwrap();
        let b = world.spawn(EntityDesc::new("b")).unwrap();
        world.attach(a, Box::new(Failing)).unwrap();
        world.attach(a, Box::new(Panicking)).unwrap();
        world.attach(a, recorder("after", &log)).unwrap();
        world.attach(b, recorder("next", &log)).unwrap();

        let report = dispatch_update(&mut world, 0.016);

        assert_eq!(*log.borrow(), vec!["a:after", "b:next"]);
        assert_eq!(report.failed, 2);
        assert_eq!(world.get(a).unwrap().component_count(), 3);
    }

    #[test]
    fn test_missing_callbacks_are_not_errors() {
        let mut world = World::headless();
        let a = world.spawn(EntityDesc::new("a")).unwrap();
        world.attach(a, Box::new(Quiet)).unwrap();

        let report = dispatch_update(&mut world, 0.016);

        assert_eq!(report, DispatchReport { invoked: 1, failed: 0 });
    }

    #[test]
    fn test_disabled_subtree_is_skipped() {
        let log = Log::default();
        let mut world = World::headless();
        let parent = world.spawn(EntityDesc::new("p")).unwrap();
        let child = world.spawn(EntityDesc::new("c").with_parent(parent)).unwrap();
        world.attach(child, recorder("x", &log)).unwrap();
        world.set_enabled(parent, false).unwrap();

        dispatch_update(&mut world, 0.016);
        assert!(log.borrow().is_empty());

        world.set_enabled(parent, true).unwrap();
        dispatch_update(&mut world, 0.016);
        assert_eq!(*log.borrow(), vec!["c:x"]);
    }

    #[test]
    fn test_editor_only_input_only_in_edit_mode() {
        let log = Log::default();
        let mut world = World::headless();
        let gizmo = world.spawn(EntityDesc::new("gizmo").editor_only()).unwrap();
        world.attach(gizmo, recorder("g", &log)).unwrap();
        let key = KeyEvent::press("a");

        dispatch_input(&mut world, &key);
        crate::ecs::systems::mode_system::enter_play_mode(&mut world);
        dispatch_input(&mut world, &key);

        assert_eq!(*log.borrow(), vec!["g:a"]);
    }

    #[test]
    fn test_attach_and_spawn_during_dispatch() {
        let mut world = World::headless();
        let a = world.spawn(EntityDesc::new("a")).unwrap();
        world.attach(a, Box::new(Spawner)).unwrap();

        dispatch_update(&mut world, 0.016);

        let names = world.get(a).unwrap().component_names();
        assert_eq!(names.len(), 2);
        assert!(names[1].ends_with("Quiet"));
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn test_entity_purged_during_own_callback() {
        let mut world = World::headless();
        let a = world.spawn(EntityDesc::new("a")).unwrap();
        world.attach(a, Box::new(SelfDestruct)).unwrap();

        let report = dispatch_update(&mut world, 0.016);

        assert_eq!(report.failed, 0);
        assert!(world.is_empty());
    }

    #[test]
    fn test_disable_self_during_update_reaches_siblings() {
        let log = Log::default();
        let mut world = World::headless();
        let a = world.spawn(EntityDesc::new("a")).unwrap();
        world.attach(a, Box::new(Disabler)).unwrap();
        world
            .attach(a, Box::new(Watcher { log: Rc::clone(&log) }))
            .unwrap();

        let report = dispatch_update(&mut world, 0.016);

        assert!(!world.is_enabled(a));
        assert_eq!(*log.borrow(), vec!["disable"]);
        assert_eq!(report.failed, 0);
        assert_eq!(world.get(a).unwrap().component_count(), 2);
    }

    #[test]
    fn test_mode_toggle_from_own_input_starts_and_stops_components() {
        let log = Log::default();
        let mut world = World::headless();
        let a = world.spawn(EntityDesc::new("a")).unwrap();
        world
            .attach(a, Box::new(Toggler { log: Rc::clone(&log) }))
            .unwrap();
        world
            .attach(a, Box::new(Watcher { log: Rc::clone(&log) }))
            .unwrap();

        dispatch_input(&mut world, &KeyEvent::press("p"));

        assert!(!world.is_edit_mode());
        assert_eq!(*log.borrow(), vec!["toggler start", "start"]);

        crate::ecs::systems::mode_system::enter_edit_mode(&mut world);
        assert_eq!(*log.borrow(), vec!["toggler start", "start", "stop"]);

        // Stop cleared both, so the next play session starts both again
        crate::ecs::systems::mode_system::enter_play_mode(&mut world);
        assert_eq!(log.borrow().iter().filter(|e| e.ends_with("start")).count(), 4);
    }
}
