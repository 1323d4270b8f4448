//! ECS Systems module

pub mod dispatch;
pub mod mode_system;
pub mod picking_system;

pub use dispatch::{dispatch_input, dispatch_update, DispatchReport, Hook};
pub use mode_system::{enter_edit_mode, enter_play_mode, set_edit_mode, toggle_mode};
pub use picking_system::{Pick, PickingSystem, SelectionMode};
