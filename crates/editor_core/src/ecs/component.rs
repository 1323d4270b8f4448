//! Component trait and attachment
//!
//! A component is a behaviour object attached to exactly one entity. Every
//! callback is optional: the trait provides a no-op default for each, so a
//! component implements only the hooks it cares about.

use super::entity::EntityId;
use super::registry::ComponentRegistry;
use super::systems::dispatch::{self, Hook};
use super::world::{SceneError, World};
use crate::foundation::logging::debug;
use crate::input::KeyEvent;
use std::any::Any;
use thiserror::Error;

/// Errors returned by component callbacks
#[derive(Error, Debug)]
pub enum ComponentError {
    /// Behaviour-specific failure
    #[error("Component failed: {0}")]
    Failed(String),

    /// A world operation made by the callback failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Result of a component callback
pub type ComponentResult = Result<(), ComponentError>;

/// Downcasting support for boxed components
pub trait AsAny: Any {
    /// `&dyn Any` view of the concrete value
    fn as_any(&self) -> &dyn Any;
    /// `&mut dyn Any` view of the concrete value
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Name of the concrete type
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// What a callback sees: the world and the entity that owns the component
pub struct ComponentContext<'w> {
    world: &'w mut World,
    entity: EntityId,
}

impl<'w> ComponentContext<'w> {
    pub(crate) fn new(world: &'w mut World, entity: EntityId) -> Self {
        Self { world, entity }
    }

    /// Owning entity
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Shared access to the world
    pub fn world(&self) -> &World {
        self.world
    }

    /// Mutable access to the world
    pub fn world_mut(&mut self) -> &mut World {
        self.world
    }

    /// Name of the owning entity
    pub fn entity_name(&self) -> &str {
        self.world.get(self.entity).map_or("", |e| e.name())
    }
}

/// Behaviour attached to an entity
///
/// Callbacks run with the component temporarily detached from its entity, so
/// `World::component` on the owner does not see the running component.
#[allow(unused_variables)]
pub trait Component: AsAny {
    /// Identity used in logs
    fn name(&self) -> &str {
        self.type_name()
    }

    /// Entering play mode (or attached while in play mode)
    fn start(&mut self, ctx: &mut ComponentContext<'_>) -> ComponentResult {
        Ok(())
    }

    /// Leaving play mode
    fn stop(&mut self, ctx: &mut ComponentContext<'_>) -> ComponentResult {
        Ok(())
    }

    /// Once per frame while the owner is effectively enabled
    fn update(&mut self, ctx: &mut ComponentContext<'_>, dt: f32) -> ComponentResult {
        Ok(())
    }

    /// Once per discrete input event
    fn input(&mut self, ctx: &mut ComponentContext<'_>, key: &KeyEvent) -> ComponentResult {
        Ok(())
    }

    /// Owner became effectively enabled
    fn on_enable(&mut self, ctx: &mut ComponentContext<'_>) -> ComponentResult {
        Ok(())
    }

    /// Owner became effectively disabled
    fn on_disable(&mut self, ctx: &mut ComponentContext<'_>) -> ComponentResult {
        Ok(())
    }

    /// Pointer started hovering the owner
    fn on_mouse_enter(&mut self, ctx: &mut ComponentContext<'_>) -> ComponentResult {
        Ok(())
    }

    /// Pointer stopped hovering the owner
    fn on_mouse_exit(&mut self, ctx: &mut ComponentContext<'_>) -> ComponentResult {
        Ok(())
    }

    /// Owner was clicked
    fn on_click(&mut self, ctx: &mut ComponentContext<'_>) -> ComponentResult {
        Ok(())
    }
}

/// A component together with its lifecycle state
pub(crate) struct AttachedComponent {
    pub(crate) component: Box<dyn Component>,
    pub(crate) started: bool,
}

impl AttachedComponent {
    pub(crate) fn new(component: Box<dyn Component>) -> Self {
        Self {
            component,
            started: false,
        }
    }

    pub(crate) fn name(&self) -> &str {
        self.component.name()
    }

    pub(crate) fn downcast_ref<T: Component>(&self) -> Option<&T> {
        AsAny::as_any(self.component.as_ref()).downcast_ref::<T>()
    }

    pub(crate) fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        AsAny::as_any_mut(self.component.as_mut()).downcast_mut::<T>()
    }
}

impl World {
    /// Attach a component instance; returns its index on the entity.
    ///
    /// In play mode the component is started immediately.
    pub fn attach(
        &mut self,
        entity: EntityId,
        component: Box<dyn Component>,
    ) -> Result<usize, SceneError> {
        let name = component.name().to_string();
        let owner = self.entity_mut(entity)?;
        owner.components.push(AttachedComponent::new(component));
        let index = owner.components.len() - 1;
        let dispatch_start = !self.is_edit_mode() && self.receives_lifecycle(entity);
        debug!("Attached {} to {:?}", name, entity);

        if dispatch_start {
            dispatch::invoke_component(self, entity, index, Hook::Start);
        }
        Ok(index)
    }

    /// Attach a default-constructed component by type
    pub fn attach_default<T: Component + Default>(
        &mut self,
        entity: EntityId,
    ) -> Result<usize, SceneError> {
        self.attach(entity, Box::new(T::default()))
    }

    /// Attach a component resolved by name through the registry
    pub fn attach_named(
        &mut self,
        entity: EntityId,
        name: &str,
        registry: &ComponentRegistry,
    ) -> Result<usize, SceneError> {
        self.entity_ref(entity)?;
        let component = registry.resolve(name)?;
        self.attach(entity, component)
    }

    /// Detach the component at `index`. A started component is stopped first.
    pub fn detach(&mut self, entity: EntityId, index: usize) -> Result<Box<dyn Component>, SceneError> {
        let started = self
            .entity_ref(entity)?
            .components
            .get(index)
            .map(|attached| attached.started)
            .ok_or(SceneError::ComponentIndex { entity, index })?;
        if started {
            dispatch::invoke_component(self, entity, index, Hook::Stop);
        }

        let owner = self.entity_mut(entity)?;
        if index >= owner.components.len() {
            return Err(SceneError::ComponentIndex { entity, index });
        }
        Ok(owner.components.remove(index).component)
    }

    /// First attached component of type `T`
    pub fn component<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.get(entity)?
            .components
            .iter()
            .find_map(AttachedComponent::downcast_ref::<T>)
    }

    /// First attached component of type `T`, mutably
    pub fn component_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.entities
            .get_mut(entity)?
            .components
            .iter_mut()
            .find_map(AttachedComponent::downcast_mut::<T>)
    }
}
