//! Scenario tests spanning the world, dispatcher, mode controller, picking
//! and history together

mod picking;
