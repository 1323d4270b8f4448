//! Name-based component lookup
//!
//! Components that are attached by name (from a scene file or an editor
//! menu) are resolved through factories registered at startup. Factories are
//! grouped by search location; locations are tried in order and the first
//! hit wins.

use super::component::Component;
use super::world::SceneError;
use crate::foundation::logging::warn;
use std::collections::HashMap;

/// Builds a fresh component instance
pub type ComponentFactory = Box<dyn Fn() -> Box<dyn Component>>;

struct SearchLocation {
    name: String,
    factories: HashMap<String, ComponentFactory>,
}

/// Ordered set of search locations, each mapping names to factories
pub struct ComponentRegistry {
    locations: Vec<SearchLocation>,
}

impl ComponentRegistry {
    /// Registry with the `engine` and `project` locations, in that order
    pub fn new() -> Self {
        Self::with_locations(["engine", "project"])
    }

    /// Registry with custom search locations, in lookup order
    pub fn with_locations<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            locations: locations
                .into_iter()
                .map(|name| SearchLocation {
                    name: name.into(),
                    factories: HashMap::new(),
                })
                .collect(),
        }
    }

    /// Register a factory under `name` in `location`.
    ///
    /// An unknown location is appended to the end of the search order.
    pub fn register<F>(&mut self, location: &str, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Component> + 'static,
    {
        let index = match self.locations.iter().position(|l| l.name == location) {
            Some(index) => index,
            None => {
                self.locations.push(SearchLocation {
                    name: location.to_string(),
                    factories: HashMap::new(),
                });
                self.locations.len() - 1
            }
        };
        self.locations[index]
            .factories
            .insert(name.into(), Box::new(factory));
    }

    /// Register `T::default` under `name` in `location`
    pub fn register_default<T: Component + Default>(&mut self, location: &str, name: impl Into<String>) {
        self.register(location, name, || Box::new(T::default()) as Box<dyn Component>);
    }

    /// Build the component registered under `name` in the first location
    /// that has it
    pub fn resolve(&self, name: &str) -> Result<Box<dyn Component>, SceneError> {
        for location in &self.locations {
            if let Some(factory) = location.factories.get(name) {
                return Ok(factory());
            }
        }
        let searched: Vec<String> = self.location_names().map(str::to_string).collect();
        warn!("Could not resolve component '{}' (searched {:?})", name, searched);
        Err(SceneError::UnresolvedComponent {
            name: name.to_string(),
            searched,
        })
    }

    /// Location that would serve `name`
    pub fn location_of(&self, name: &str) -> Option<&str> {
        self.locations
            .iter()
            .find(|l| l.factories.contains_key(name))
            .map(|l| l.name.as_str())
    }

    /// Whether any location knows `name`
    pub fn contains(&self, name: &str) -> bool {
        self.location_of(name).is_some()
    }

    /// Search locations in lookup order
    pub fn location_names(&self) -> impl Iterator<Item = &str> {
        self.locations.iter().map(|l| l.name.as_str())
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for location in &self.locations {
            let mut names: Vec<&String> = location.factories.keys().collect();
            names.sort();
            map.entry(&location.name, &names);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Engine;
    impl Component for Engine {
        fn name(&self) -> &str {
            "engine spin"
        }
    }

    #[derive(Default)]
    struct Project;
    impl Component for Project {
        fn name(&self) -> &str {
            "project spin"
        }
    }

    #[test]
    fn test_engine_location_wins() {
        let mut registry = ComponentRegistry::new();
        registry.register_default::<Project>("project", "spin");
        registry.register_default::<Engine>("engine", "spin");

        let component = registry.resolve("spin").unwrap();

        assert_eq!(component.name(), "engine spin");
        assert_eq!(registry.location_of("spin"), Some("engine"));
    }

    #[test]
    fn test_falls_through_to_project() {
        let mut registry = ComponentRegistry::new();
        registry.register_default::<Project>("project", "spin");

        assert_eq!(registry.resolve("spin").unwrap().name(), "project spin");
    }

    #[test]
    fn test_unresolved_names_every_location() {
        let registry = ComponentRegistry::new();

        match registry.resolve("missing") {
            Err(SceneError::UnresolvedComponent { name, searched }) => {
                assert_eq!(name, "missing");
                assert_eq!(searched, vec!["engine", "project"]);
            }
            other => panic!("unexpected: {:?}", other.map(|c| c.name().to_string())),
        }
    }

    #[test]
    fn test_unknown_location_is_appended() {
        let mut registry = ComponentRegistry::new();
        registry.register_default::<Engine>("plugins", "spin");

        assert_eq!(
            registry.location_names().collect::<Vec<_>>(),
            vec!["engine", "project", "plugins"]
        );
        assert!(registry.contains("spin"));
    }
}
