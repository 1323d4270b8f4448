//! Support for external scene serializers
//!
//! The core owns no file format. It lets a serializer walk the registry and
//! ask, per entity, which fields differ from a set of defaults so that only
//! those need to be written.

use super::entity::{Entity, EntityFlags, EntityId};
use super::World;
use crate::foundation::math::Vec3;
use crate::physics::{ColliderChannel, ColliderKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A serializable entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Entity name
    Name,
    /// Parent entity name
    Parent,
    /// Local position
    Position,
    /// Local rotation (Euler degrees)
    Rotation,
    /// Local scale
    Scale,
    /// Own enabled flag
    Enabled,
    /// Mesh reference
    Model,
    /// Renderable pivot
    Origin,
    /// Play-mode collider kind
    PlayCollider,
    /// Edit-mode collider kind
    EditCollider,
    /// Behaviour flag bits
    Flags,
    /// Attached component names
    Components,
}

/// Value of a [`Field`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean field
    Bool(bool),
    /// Unsigned integer field
    Uint(u32),
    /// Text field
    Text(String),
    /// Optional text field
    OptionalText(Option<String>),
    /// Vector field
    Vec3([f32; 3]),
    /// Optional collider
    Collider(Option<ColliderKind>),
    /// List of names
    List(Vec<String>),
}

/// Values a serializer considers default and therefore omits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityDefaults {
    /// Default name
    pub name: String,
    /// Default local position
    pub position: Vec3,
    /// Default local rotation
    pub rotation: Vec3,
    /// Default local scale
    pub scale: Vec3,
    /// Default enabled flag
    pub enabled: bool,
    /// Default mesh reference
    pub model: Option<String>,
    /// Default pivot
    pub origin: Vec3,
    /// Default play collider
    pub play_collider: Option<ColliderKind>,
    /// Default edit collider
    pub edit_collider: Option<ColliderKind>,
}

impl Default for EntityDefaults {
    fn default() -> Self {
        Self {
            name: "entity".to_string(),
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            enabled: true,
            model: None,
            origin: Vec3::zeros(),
            play_collider: None,
            edit_collider: None,
        }
    }
}

fn vec3(v: Vec3) -> FieldValue {
    FieldValue::Vec3([v.x, v.y, v.z])
}

impl World {
    /// Visit every live entity in registry order
    pub fn for_each_entity(&self, mut f: impl FnMut(EntityId, &Entity)) {
        for &id in self.entities() {
            if let Some(entity) = self.get(id) {
                f(id, entity);
            }
        }
    }

    /// Fields of `id` that differ from `defaults`.
    ///
    /// The parent is written by name and is always included for non-root
    /// entities; components are included when any are attached.
    pub fn changed_fields(&self, id: EntityId, defaults: &EntityDefaults) -> BTreeMap<Field, FieldValue> {
        let mut fields = BTreeMap::new();
        let Some(entity) = self.get(id) else {
            return fields;
        };
        let local = entity.transform();

        if entity.name() != defaults.name {
            fields.insert(Field::Name, FieldValue::Text(entity.name().to_string()));
        }
        if let Some(parent) = entity.parent().and_then(|p| self.get(p)) {
            fields.insert(Field::Parent, FieldValue::Text(parent.name().to_string()));
        }
        for (field, value, default) in [
            (Field::Position, local.position, defaults.position),
            (Field::Rotation, local.rotation, defaults.rotation),
            (Field::Scale, local.scale, defaults.scale),
            (Field::Origin, entity.origin(), defaults.origin),
        ] {
            if value != default {
                fields.insert(field, vec3(value));
            }
        }
        if entity.enabled() != defaults.enabled {
            fields.insert(Field::Enabled, FieldValue::Bool(entity.enabled()));
        }
        if entity.model() != defaults.model.as_deref() {
            fields.insert(
                Field::Model,
                FieldValue::OptionalText(entity.model().map(str::to_string)),
            );
        }
        for (field, channel, default) in [
            (Field::PlayCollider, ColliderChannel::Play, defaults.play_collider),
            (Field::EditCollider, ColliderChannel::Edit, defaults.edit_collider),
        ] {
            let kind = entity.collider(channel).map(|c| c.kind);
            if kind != default {
                fields.insert(field, FieldValue::Collider(kind));
            }
        }
        if entity.flags() != EntityFlags::empty() {
            fields.insert(Field::Flags, FieldValue::Uint(entity.flags().bits()));
        }
        if entity.component_count() > 0 {
            fields.insert(
                Field::Components,
                FieldValue::List(entity.component_names().into_iter().map(str::to_string).collect()),
            );
        }
        fields
    }
}
