//! Input events delivered by the host's input collaborator
//!
//! Discrete events arrive as strings in the collaborator's convention:
//! `"left mouse down"` / `"left mouse up"` for buttons, a bare key name such
//! as `"a"` for a key press and the same name with an `" up"` suffix for its
//! release. Only mouse buttons use the `" down"` suffix. Scroll wheel ticks
//! (`"scroll up"`, `"scroll down"`) and the page keys are whole key names, so
//! `"page up"` is a press and `"page up up"` its release. Continuous pointer position lives in [`picking::PointerState`].

pub mod picking;

pub use picking::PointerState;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Key name of the primary mouse button
pub const LEFT_MOUSE: &str = "left mouse";

const SCROLL_KEYS: [&str; 2] = ["scroll up", "scroll down"];

// Key names that themselves end in a transition word
const NAMED_KEYS: [&str; 4] = ["page up", "page down", "scroll up", "scroll down"];

/// A discrete key or button transition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Key or button name, e.g. `"a"`, `"left mouse"`, `"scroll up"`
    pub key: String,
    /// `true` for press, `false` for release
    pub pressed: bool,
}

impl KeyEvent {
    /// Press of `key`
    pub fn press(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            pressed: true,
        }
    }

    /// Release of `key`
    pub fn release(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            pressed: false,
        }
    }

    /// Whether this event names a mouse button
    pub fn is_mouse_button(&self) -> bool {
        self.key.ends_with(" mouse")
    }

    /// Whether this is the press of the primary mouse button
    pub fn is_left_click(&self) -> bool {
        self.pressed && self.key == LEFT_MOUSE
    }
}

/// Error for strings that are not a key event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid key event: {0:?}")]
pub struct ParseKeyEventError(pub String);

impl FromStr for KeyEvent {
    type Err = ParseKeyEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseKeyEventError(s.to_string()));
        }
        if NAMED_KEYS.contains(&s) {
            return Ok(Self::press(s));
        }
        if let Some(key) = s.strip_suffix(" down") {
            if key.ends_with(" mouse") {
                return Ok(Self::press(key));
            }
        }
        if let Some(key) = s.strip_suffix(" up") {
            if !key.is_empty() {
                return Ok(Self::release(key));
            }
        }
        Ok(Self::press(s))
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.pressed, self.is_mouse_button()) {
            (true, true) => write!(f, "{} down", self.key),
            (true, false) => write!(f, "{}", self.key),
            (false, _) => write!(f, "{} up", self.key),
        }
    }
}

/// Tracks which keys are currently held.
///
/// Used for modifier keys when selecting.
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    held: HashSet<String>,
}

impl KeyState {
    /// Create an empty key state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key event
    pub fn apply(&mut self, event: &KeyEvent) {
        if SCROLL_KEYS.contains(&event.key.as_str()) {
            return;
        }
        if event.pressed {
            self.held.insert(event.key.clone());
        } else {
            self.held.remove(&event.key);
        }
    }

    /// Returns `true` if the key is currently held down
    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(key)
    }

    /// Either control key held
    pub fn control(&self) -> bool {
        self.is_held("left control") || self.is_held("right control")
    }

    /// Either shift key held
    pub fn shift(&self) -> bool {
        self.is_held("left shift") || self.is_held("right shift")
    }
}
