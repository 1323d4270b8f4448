//! Edit/play mode controller
//!
//! Entering play mode activates each entity's play collider, parks its edit
//! collider, hides editor-only entities and starts every component of the
//! other entities. Entering edit mode stops those components and reverses the
//! collider and visibility swap. Requesting the current mode does nothing.

use super::dispatch::{self, DispatchReport, Hook};
use crate::ecs::World;
use crate::foundation::logging::info;

/// Switch modes; returns whether a transition happened
pub fn set_edit_mode(world: &mut World, edit_mode: bool) -> bool {
    if world.is_edit_mode() == edit_mode {
        return false;
    }

    let report = if edit_mode {
        let report = lifecycle(world, Hook::Stop);
        world.set_mode_flag(true);
        report
    } else {
        world.set_mode_flag(false);
        lifecycle(world, Hook::Start)
    };

    info!(
        "Entered {} mode ({} callbacks, {} failed)",
        if edit_mode { "edit" } else { "play" },
        report.invoked,
        report.failed
    );
    true
}

/// Enter play mode (no-op if already playing)
pub fn enter_play_mode(world: &mut World) -> bool {
    set_edit_mode(world, false)
}

/// Enter edit mode (no-op if already editing)
pub fn enter_edit_mode(world: &mut World) -> bool {
    set_edit_mode(world, true)
}

/// Flip the mode; returns the new `edit_mode`
pub fn toggle_mode(world: &mut World) -> bool {
    let edit_mode = !world.is_edit_mode();
    set_edit_mode(world, edit_mode);
    edit_mode
}

fn lifecycle(world: &mut World, hook: Hook<'_>) -> DispatchReport {
    let mut report = DispatchReport::default();
    for id in world.entities().to_vec() {
        if world.receives_lifecycle(id) {
            let outcome = dispatch::invoke_entity(world, id, hook);
            report.invoked += outcome.invoked;
            report.failed += outcome.failed;
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{Component, ComponentContext, ComponentResult};
    use crate::ecs::EntityDesc;
    use crate::physics::{ColliderChannel, ColliderKind};

    #[derive(Default)]
    struct Lifecycle {
        starts: u32,
        stops: u32,
    }

    impl Component for Lifecycle {
        fn start(&mut self, _ctx: &mut ComponentContext<'_>) -> ComponentResult {
            self.starts += 1;
            Ok(())
        }

        fn stop(&mut self, _ctx: &mut ComponentContext<'_>) -> ComponentResult {
            self.stops += 1;
            Ok(())
        }
    }

    #[test]
    fn test_collider_channels_swap() {
        let mut world = World::headless();
        let id = world
            .spawn(
                EntityDesc::new("e")
                    .with_model("cube")
                    .with_play_collider(ColliderKind::Sphere)
                    .with_edit_collider(ColliderKind::Box),
            )
            .unwrap();

        let active = |world: &World, channel| world.get(id).unwrap().collider(channel).unwrap().active;
        assert!(active(&world, ColliderChannel::Edit));
        assert!(!active(&world, ColliderChannel::Play));

        assert!(enter_play_mode(&mut world));
        assert!(!active(&world, ColliderChannel::Edit));
        assert!(active(&world, ColliderChannel::Play));

        assert!(enter_edit_mode(&mut world));
        assert!(active(&world, ColliderChannel::Edit));
        assert!(!active(&world, ColliderChannel::Play));
    }

    #[test]
    fn test_editor_only_hidden_in_play_mode() {
        let mut world = World::headless();
        let gizmo = world
            .spawn(EntityDesc::new("gizmo").with_model("cube").editor_only())
            .unwrap();
        world.attach_default::<Lifecycle>(gizmo).unwrap();

        enter_play_mode(&mut world);
        assert!(!world.get(gizmo).unwrap().is_visible());
        assert_eq!(world.component::<Lifecycle>(gizmo).unwrap().starts, 0);

        enter_edit_mode(&mut world);
        assert!(world.get(gizmo).unwrap().is_visible());
    }

    #[test]
    fn test_toggle_returns_new_mode() {
        let mut world = World::headless();

        assert!(!toggle_mode(&mut world));
        assert!(!world.is_edit_mode());
        assert!(toggle_mode(&mut world));
        assert!(world.is_edit_mode());
    }

    #[test]
    fn test_stop_on_return_to_edit() {
        let mut world = World::headless();
        let id = world.spawn(EntityDesc::new("e")).unwrap();
        world.attach_default::<Lifecycle>(id).unwrap();

        enter_play_mode(&mut world);
        assert!(!enter_play_mode(&mut world));
        enter_edit_mode(&mut world);
        assert!(!enter_edit_mode(&mut world));

        let component = world.component::<Lifecycle>(id).unwrap();
        assert_eq!((component.starts, component.stops), (1, 1));
    }
}
