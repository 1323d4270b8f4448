//! Renderer collaborator
//!
//! The scene core pushes world transforms and visibility to whatever renderer
//! the host plugs in, and asks it for local mesh bounds when building
//! colliders or applying an origin offset. Rendering itself happens elsewhere.

pub mod camera;

pub use camera::{Camera, Projection};

use crate::foundation::math::{Transform, Vec3};
use crate::physics::Aabb;
use slotmap::SlotMap;
use std::collections::HashMap;
use thiserror::Error;

slotmap::new_key_type! {
    /// Handle to a renderable owned by a [`Renderer`]
    pub struct RenderHandle;
}

/// Renderer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// No mesh is registered under this name
    #[error("Unknown mesh: {0}")]
    UnknownMesh(String),

    /// Handle does not refer to a live renderable
    #[error("Unknown render handle")]
    UnknownHandle,
}

/// Renderer collaborator consumed by the scene core
pub trait Renderer {
    /// Create a renderable for a mesh reference such as `"cube"` or a file stem
    fn create_renderable(&mut self, mesh: &str) -> Result<RenderHandle, RenderError>;

    /// Set the world transform the renderable is drawn with
    fn set_transform(&mut self, handle: RenderHandle, world: &Transform);

    /// Show or hide the renderable
    fn set_visible(&mut self, handle: RenderHandle, visible: bool);

    /// Free the renderable
    fn destroy(&mut self, handle: RenderHandle);

    /// Local-space bounds of the renderable's mesh
    fn get_bounds(&self, handle: RenderHandle) -> Option<Aabb>;
}

/// State recorded for each renderable by [`HeadlessRenderer`]
#[derive(Debug, Clone)]
pub struct HeadlessRenderable {
    /// Mesh name the renderable was created from
    pub mesh: String,
    /// Last world transform pushed
    pub transform: Transform,
    /// Last visibility pushed
    pub visible: bool,
}

/// Renderer that draws nothing and records what it was told
///
/// Knows the built-in primitive meshes; further meshes can be registered
/// with their bounds.
#[derive(Debug)]
pub struct HeadlessRenderer {
    meshes: HashMap<String, Aabb>,
    renderables: SlotMap<RenderHandle, HeadlessRenderable>,
}

impl HeadlessRenderer {
    /// Create a renderer knowing `cube`, `sphere`, `quad` and `plane`
    pub fn new() -> Self {
        let mut meshes = HashMap::new();
        meshes.insert("cube".to_string(), Aabb::unit());
        meshes.insert("sphere".to_string(), Aabb::unit());
        meshes.insert(
            "quad".to_string(),
            Aabb::from_center_extents(Vec3::zeros(), Vec3::new(0.5, 0.5, 0.0)),
        );
        meshes.insert(
            "plane".to_string(),
            Aabb::from_center_extents(Vec3::zeros(), Vec3::new(0.5, 0.0, 0.5)),
        );
        Self {
            meshes,
            renderables: SlotMap::with_key(),
        }
    }

    /// Register a mesh name with its local bounds
    pub fn register_mesh(&mut self, name: impl Into<String>, bounds: Aabb) {
        self.meshes.insert(name.into(), bounds);
    }

    /// Recorded state of a live renderable
    pub fn renderable(&self, handle: RenderHandle) -> Option<&HeadlessRenderable> {
        self.renderables.get(handle)
    }

    /// Number of live renderables
    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    /// Whether no renderables are alive
    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HeadlessRenderer {
    fn create_renderable(&mut self, mesh: &str) -> Result<RenderHandle, RenderError> {
        if !self.meshes.contains_key(mesh) {
            return Err(RenderError::UnknownMesh(mesh.to_string()));
        }
        Ok(self.renderables.insert(HeadlessRenderable {
            mesh: mesh.to_string(),
            transform: Transform::identity(),
            visible: true,
        }))
    }

    fn set_transform(&mut self, handle: RenderHandle, world: &Transform) {
        if let Some(renderable) = self.renderables.get_mut(handle) {
            renderable.transform = *world;
        }
    }

    fn set_visible(&mut self, handle: RenderHandle, visible: bool) {
        if let Some(renderable) = self.renderables.get_mut(handle) {
            renderable.visible = visible;
        }
    }

    fn destroy(&mut self, handle: RenderHandle) {
        self.renderables.remove(handle);
    }

    fn get_bounds(&self, handle: RenderHandle) -> Option<Aabb> {
        let renderable = self.renderables.get(handle)?;
        self.meshes.get(&renderable.mesh).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_mesh_is_rejected() {
        let mut renderer = HeadlessRenderer::new();

        assert_eq!(
            renderer.create_renderable("teapot"),
            Err(RenderError::UnknownMesh("teapot".to_string()))
        );
        assert!(renderer.is_empty());
    }

    #[test]
    fn test_registered_mesh_reports_bounds() {
        let mut renderer = HeadlessRenderer::new();
        let bounds = Aabb::new(Vec3::zeros(), Vec3::new(2.0, 4.0, 1.0));
        renderer.register_mesh("crate", bounds);

        let handle = renderer.create_renderable("crate").unwrap();
        assert_eq!(renderer.get_bounds(handle), Some(bounds));

        renderer.destroy(handle);
        assert_eq!(renderer.get_bounds(handle), None);
    }

    #[test]
    fn test_records_visibility_and_transform() {
        let mut renderer = HeadlessRenderer::new();
        let handle = renderer.create_renderable("cube").unwrap();
        let world = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));

        renderer.set_visible(handle, false);
        renderer.set_transform(handle, &world);

        let state = renderer.renderable(handle).unwrap();
        assert!(!state.visible);
        assert_eq!(state.transform, world);
    }
}
