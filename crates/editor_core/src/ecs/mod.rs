//! Entity-Component implementation
//!
//! Scene graph, component attachment and dispatch, mode switching and
//! picking for the editor.

pub mod component;
pub mod entity;
pub mod persistence;
pub mod registry;
pub mod systems;
pub mod world;

#[cfg(test)]
mod tests;

pub use component::{AsAny, Component, ComponentContext, ComponentError, ComponentResult};
pub use entity::{ClickHandler, Collider, Entity, EntityDesc, EntityFlags, EntityId};
pub use persistence::{EntityDefaults, Field, FieldValue};
pub use registry::{ComponentFactory, ComponentRegistry};
pub use world::{SceneError, Tombstone, World};
