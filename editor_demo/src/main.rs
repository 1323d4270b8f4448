//! Headless editor session
//!
//! Builds a small scene, drives it through picking, history and mode
//! switches, and logs what happens. Pass a `.toml` or `.ron` config path as
//! the first argument to override the defaults.

use editor_core::prelude::*;

/// Turns its owner about Y while playing
#[derive(Default)]
struct Spinner {
    degrees_per_second: f32,
}

impl Component for Spinner {
    fn start(&mut self, ctx: &mut ComponentContext<'_>) -> ComponentResult {
        if self.degrees_per_second == 0.0 {
            self.degrees_per_second = 90.0;
        }
        log::info!("{} starts spinning", ctx.entity_name());
        Ok(())
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, dt: f32) -> ComponentResult {
        if !self.degrees_per_second.is_normal() {
            return Ok(());
        }
        let entity = ctx.entity();
        let world = ctx.world_mut();
        let Some(local) = world.local_transform(entity) else {
            return Ok(());
        };
        let yaw = (local.rotation.y + self.degrees_per_second * dt) % 360.0;
        world.set_rotation(entity, Vec3::new(local.rotation.x, yaw, local.rotation.z))?;
        Ok(())
    }

    fn stop(&mut self, ctx: &mut ComponentContext<'_>) -> ComponentResult {
        log::info!("{} stops spinning", ctx.entity_name());
        Ok(())
    }
}

/// Logs pointer traffic on its owner
#[derive(Default)]
struct HoverLogger;

impl Component for HoverLogger {
    fn on_mouse_enter(&mut self, ctx: &mut ComponentContext<'_>) -> ComponentResult {
        log::info!("Pointer entered {}", ctx.entity_name());
        Ok(())
    }

    fn on_mouse_exit(&mut self, ctx: &mut ComponentContext<'_>) -> ComponentResult {
        log::info!("Pointer left {}", ctx.entity_name());
        Ok(())
    }

    fn on_click(&mut self, ctx: &mut ComponentContext<'_>) -> ComponentResult {
        log::info!("Clicked {}", ctx.entity_name());
        Ok(())
    }
}

fn load_config() -> EditorConfig {
    let Some(path) = std::env::args().nth(1) else {
        return EditorConfig::default();
    };
    match EditorConfig::load_from_file(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Could not load {path}: {e}; using defaults");
            EditorConfig::default()
        }
    }
}

fn build_scene(editor: &mut Editor) -> Option<(EntityId, EntityId)> {
    editor.registry.register_default::<Spinner>("engine", "Spinner");
    editor.registry.register_default::<HoverLogger>("project", "HoverLogger");

    let table = editor.spawn(
        EntityDesc::new("table")
            .with_model("cube")
            .with_scale((4.0, 0.5, 4.0))
            .with_collider(ColliderKind::Box),
    )?;
    let teapot = editor.spawn(
        EntityDesc::new("teapot")
            .with_parent(table)
            .with_model("sphere")
            .with_position((0.0, 1.0, 0.0))
            .with_collider(ColliderKind::Sphere),
    )?;
    editor.spawn(
        EntityDesc::new("grid")
            .with_model("plane")
            .with_flags(EntityFlags::EDITOR_ONLY | EntityFlags::UNPICKABLE),
    )?;

    editor.attach_named(teapot, "Spinner")?;
    editor.attach_named(table, "HoverLogger")?;
    Some((table, teapot))
}

fn log_hierarchy(world: &World) {
    for (id, depth) in world.hierarchy() {
        if let Some(entity) = world.get(id) {
            log::info!(
                "{}{} {:?} visible={}",
                "  ".repeat(depth),
                entity.name(),
                world.world_transform(id).map(|t| t.position),
                entity.is_visible()
            );
        }
    }
}

fn main() {
    let config = load_config();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    log::info!("Starting editor demo");
    let mut editor = Editor::new(config);
    editor.camera = Camera::perspective(Vec3::new(0.0, 2.0, -10.0), 45.0, 16.0 / 9.0);

    let Some((table, teapot)) = build_scene(&mut editor) else {
        log::error!("Scene setup failed");
        return;
    };
    log_hierarchy(&editor.world);

    // Hover and click the table from the centre of the viewport
    editor.pointer.set_ndc(0.0, 0.0);
    editor.poll_input(&[]);
    editor.poll_input_str(&["left mouse down", "left mouse up"]);
    log::info!("Selection: {:?}", editor.world.selection());

    editor.group("Arrange teapot", |history, world| {
        history.do_action(world, SetTransformAction::position(teapot, (1.0, 1.0)))?;
        history.do_action(world, SetTransformAction::scale(teapot, (2.0, 2.0, 2.0)))?;
        Ok(())
    });
    editor.do_action(ReparentAction::new(teapot, None, true));
    log::info!("History: {:?}", editor.history().undo_labels());

    editor.save_point();
    editor.destroy(table);
    log::info!(
        "After destroy: {} live, unsaved={}",
        editor.world.len(),
        editor.has_unsaved_changes()
    );
    editor.undo();
    log::info!("Undo restored table: {}", editor.world.contains(table));

    editor.toggle_mode();
    for _ in 0..60 {
        editor.frame(1.0 / 60.0);
    }
    log_hierarchy(&editor.world);
    editor.toggle_mode();

    while editor.undo().is_some() {}
    log::info!(
        "Fully undone: {} live, {} redo steps",
        editor.world.len(),
        editor.history().redo_labels().len()
    );

    log::info!("Ran {} frames, hovering {:?}", editor.frame_count(), editor.hovered());
}
