//! Placement of windows relative to an attachment rectangle.
//!
//! A window is positioned by picking one primary option and one secondary
//! option on the other axis, trying each list in order until both fit the
//! monitor's work area.

pub mod option;
pub mod params;
pub mod solver;

pub use option::{AttachmentOption, Axis};
pub use params::{AttachmentParameters, Border, PositionCallback, UserData, WindowTypeHint};
pub use solver::{Placement, Trial, move_using_attachment_parameters};
