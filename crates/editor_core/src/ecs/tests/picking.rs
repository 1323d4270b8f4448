//! Hover and click across polls

use crate::ecs::systems::mode_system::enter_play_mode;
use crate::ecs::systems::PickingSystem;
use crate::ecs::{Component, ComponentContext, ComponentResult, EntityDesc, EntityId, World};
use crate::foundation::math::Vec3;
use crate::input::{KeyEvent, PointerState};
use crate::physics::ColliderKind;
use crate::render::Camera;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Default)]
struct Hover {
    enters: u32,
    exits: u32,
    clicks: u32,
}

impl Component for Hover {
    fn on_mouse_enter(&mut self, _ctx: &mut ComponentContext<'_>) -> ComponentResult {
        self.enters += 1;
        Ok(())
    }

    fn on_mouse_exit(&mut self, _ctx: &mut ComponentContext<'_>) -> ComponentResult {
        self.exits += 1;
        Ok(())
    }

    fn on_click(&mut self, _ctx: &mut ComponentContext<'_>) -> ComponentResult {
        self.clicks += 1;
        Ok(())
    }
}

fn scene() -> (World, Camera, PointerState, EntityId) {
    let mut world = World::headless();
    let target = world
        .spawn(EntityDesc::new("target").with_model("cube").with_collider(ColliderKind::Box))
        .unwrap();
    world.attach_default::<Hover>(target).unwrap();
    let camera = Camera::orthographic(Vec3::new(0.0, 0.0, -10.0), 10.0, 1.0);
    (world, camera, PointerState::new(100, 100), target)
}

#[test]
fn test_hover_is_edge_triggered() {
    let (mut world, camera, mut pointer, target) = scene();
    let mut picking = PickingSystem::new();

    for _ in 0..10 {
        assert_eq!(picking.poll(&mut world, &camera, &pointer), Some(target));
    }
    let hover = world.component::<Hover>(target).unwrap();
    assert_eq!((hover.enters, hover.exits), (1, 0));
    assert!(world.get(target).unwrap().is_hovered());

    pointer.set_ndc(-0.9, 0.9);
    for _ in 0..3 {
        assert_eq!(picking.poll(&mut world, &camera, &pointer), None);
    }
    let hover = world.component::<Hover>(target).unwrap();
    assert_eq!((hover.enters, hover.exits), (1, 1));
    assert!(!world.get(target).unwrap().is_hovered());
}

#[test]
fn test_disabling_hover_exits() {
    let (mut world, camera, pointer, target) = scene();
    let mut picking = PickingSystem::new();
    picking.poll(&mut world, &camera, &pointer);

    picking.set_hover_enabled(&mut world, false);
    assert_eq!(picking.poll(&mut world, &camera, &pointer), None);

    let hover = world.component::<Hover>(target).unwrap();
    assert_eq!((hover.enters, hover.exits), (1, 1));
}

#[test]
fn test_click_handler_and_components() {
    let (mut world, camera, pointer, target) = scene();
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    world
        .set_on_click(target, Some(Box::new(move |_world: &mut World, _id: EntityId| {
            seen.set(seen.get() + 1);
        })))
        .unwrap();
    let mut picking = PickingSystem::new();
    picking.poll(&mut world, &camera, &pointer);

    assert!(picking.handle_event(&mut world, &KeyEvent::press("left mouse")));
    picking.handle_event(&mut world, &KeyEvent::release("left mouse"));

    assert_eq!(calls.get(), 1);
    assert_eq!(world.component::<Hover>(target).unwrap().clicks, 1);
}

#[test]
fn test_play_mode_click_leaves_selection() {
    let (mut world, camera, pointer, target) = scene();
    let mut picking = PickingSystem::new();
    enter_play_mode(&mut world);
    picking.poll(&mut world, &camera, &pointer);

    assert!(picking.handle_event(&mut world, &KeyEvent::press("left mouse")));
    assert!(world.selection().is_empty());
    assert_eq!(world.component::<Hover>(target).unwrap().clicks, 1);
}

#[test]
fn test_destroyed_hover_target_is_not_clicked() {
    let (mut world, camera, pointer, target) = scene();
    let mut picking = PickingSystem::new();
    picking.poll(&mut world, &camera, &pointer);

    world.destroy(target).unwrap();

    assert!(!picking.handle_event(&mut world, &KeyEvent::press("left mouse")));
    assert_eq!(picking.poll(&mut world, &camera, &pointer), None);
}
