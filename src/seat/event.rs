//! Events synthesized by the seat for the toolkit's event queue.

use serde::{Deserialize, Serialize};

use super::device::DeviceId;
pub use crate::sys::keymap::ModifierType;
use crate::sys::window::WindowId;

/// Event coordinates, relative to the event window and to the root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
    pub x_root: f64,
    pub y_root: f64,
}

impl Coords {
    pub fn new(x: f64, y: f64, x_root: f64, y_root: f64) -> Self { Self { x, y, x_root, y_root } }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossingMode {
    Normal,
    Grab,
    Ungrab,
}

/// Always `Nonlinear` for synthesized crossings: windows here are never
/// nested, so there is no ancestry to report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyType {
    Ancestor,
    Virtual,
    Inferior,
    Nonlinear,
    NonlinearVirtual,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossingKind {
    Enter,
    Leave,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Crossing {
    pub kind: CrossingKind,
    pub window: WindowId,
    /// The window on the other side of the crossing, if known.
    pub subwindow: Option<WindowId>,
    pub device: DeviceId,
    pub source_device: DeviceId,
    pub time: u32,
    pub mode: CrossingMode,
    pub detail: NotifyType,
    pub focus: bool,
    pub state: ModifierType,
    pub coords: Coords,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FocusChange {
    pub window: WindowId,
    pub device: DeviceId,
    pub source_device: DeviceId,
    pub focus_in: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Motion {
    pub window: WindowId,
    pub device: DeviceId,
    pub source_device: DeviceId,
    pub time: u32,
    pub state: ModifierType,
    pub coords: Coords,
    /// Tablet axis values in the device's axis order.
    pub axes: Option<Vec<f64>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    Press,
    Release,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Button {
    pub kind: ButtonKind,
    pub window: WindowId,
    pub device: DeviceId,
    pub source_device: DeviceId,
    pub time: u32,
    /// Modifier and button state from before this button changed.
    pub state: ModifierType,
    pub button: u32,
    pub coords: Coords,
    pub axes: Option<Vec<f64>>,
    /// Set on releases synthesized to end an implicit grab.
    pub send_event: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scroll {
    pub window: WindowId,
    pub device: DeviceId,
    pub source_device: DeviceId,
    pub time: u32,
    pub state: ModifierType,
    pub coords: Coords,
    pub delta_x: f64,
    pub delta_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    Press,
    Release,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Key {
    pub kind: KeyKind,
    pub window: WindowId,
    pub device: DeviceId,
    pub source_device: DeviceId,
    pub time: u32,
    pub state: ModifierType,
    pub hardware_keycode: u32,
    pub keyval: u32,
    pub is_modifier: bool,
    pub string: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Begin,
    Update,
    End,
    Cancel,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Touch {
    pub phase: TouchPhase,
    pub window: WindowId,
    pub device: DeviceId,
    pub source_device: DeviceId,
    pub time: u32,
    /// Touch slot id plus one, so that no sequence is zero.
    pub sequence: u32,
    pub state: ModifierType,
    pub coords: Coords,
    pub emulating_pointer: bool,
    pub send_event: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    Begin,
    Update,
    End,
    Cancel,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TouchpadSwipe {
    pub phase: GesturePhase,
    pub window: WindowId,
    pub device: DeviceId,
    pub source_device: DeviceId,
    pub time: u32,
    pub state: ModifierType,
    pub coords: Coords,
    pub n_fingers: u32,
    pub dx: f64,
    pub dy: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TouchpadPinch {
    pub phase: GesturePhase,
    pub window: WindowId,
    pub device: DeviceId,
    pub source_device: DeviceId,
    pub time: u32,
    pub state: ModifierType,
    pub coords: Coords,
    pub n_fingers: u32,
    pub dx: f64,
    pub dy: f64,
    pub scale: f64,
    /// Radians.
    pub angle_delta: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProximityKind {
    In,
    Out,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Proximity {
    pub kind: ProximityKind,
    pub window: WindowId,
    pub device: DeviceId,
    pub source_device: DeviceId,
    pub time: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragKind {
    Enter,
    Leave,
    Motion,
    DropStart,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Drag {
    pub kind: DragKind,
    pub window: WindowId,
    pub time: u32,
    pub x_root: f64,
    pub y_root: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeymapChange {
    Keys,
    State,
    Direction,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    DeviceAdded(DeviceId),
    DeviceRemoved(DeviceId),
    Crossing(Crossing),
    FocusChange(FocusChange),
    Motion(Motion),
    Button(Button),
    Scroll(Scroll),
    Key(Key),
    Touch(Touch),
    TouchpadSwipe(TouchpadSwipe),
    TouchpadPinch(TouchpadPinch),
    Proximity(Proximity),
    Drag(Drag),
    KeymapChanged(KeymapChange),
}

impl Event {
    pub fn window(&self) -> Option<WindowId> {
        match self {
            Event::DeviceAdded(_) | Event::DeviceRemoved(_) | Event::KeymapChanged(_) => None,
            Event::Crossing(e) => Some(e.window),
            Event::FocusChange(e) => Some(e.window),
            Event::Motion(e) => Some(e.window),
            Event::Button(e) => Some(e.window),
            Event::Scroll(e) => Some(e.window),
            Event::Key(e) => Some(e.window),
            Event::Touch(e) => Some(e.window),
            Event::TouchpadSwipe(e) => Some(e.window),
            Event::TouchpadPinch(e) => Some(e.window),
            Event::Proximity(e) => Some(e.window),
            Event::Drag(e) => Some(e.window),
        }
    }
}
