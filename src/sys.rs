//! Collaborators the seat and the positioning solver run against: geometry,
//! windows and monitors, keymaps, cursors and timers.

pub mod cursor;
pub mod geometry;
pub mod keymap;
pub mod timer;
pub mod window;
