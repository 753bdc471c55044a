use tracing::{debug, trace};

use super::event::{Coords, Touch, TouchPhase};
use super::{Event, Seat};
use crate::sys::keymap::{Keymap, ModifierType};
use crate::sys::window::{SurfaceId, WindowId, WindowSystem};

/// A finger currently on the touchscreen.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchPoint {
    pub id: i32,
    pub window: WindowId,
    pub x: f64,
    pub y: f64,
    /// Set on the first finger down while no other finger was down; that
    /// touch drives pointer emulation.
    pub initial: bool,
    pub down_serial: u32,
}

/// Event sequences start at one so that zero can mean "no sequence".
pub fn touch_sequence(id: i32) -> u32 { (id as u32).wrapping_add(1) }

impl<S: WindowSystem, K: Keymap> Seat<S, K> {
    pub fn touch_point(&self, id: i32) -> Option<&TouchPoint> { self.touches.get(&id) }

    pub fn touch_count(&self) -> usize { self.touches.len() }

    fn touch_event(&self, touch: &TouchPoint, phase: TouchPhase, time: u32) -> Option<Event> {
        let source = self.touch?;
        let mut state = self.keyboard.key_modifiers;
        if phase != TouchPhase::Begin {
            state |= ModifierType::BUTTON1;
        }
        let origin = self.system.root_origin(touch.window);
        Some(Event::Touch(Touch {
            phase,
            window: touch.window,
            device: self.master_pointer,
            source_device: source,
            time,
            sequence: touch_sequence(touch.id),
            state,
            coords: Coords::new(
                touch.x,
                touch.y,
                touch.x + f64::from(origin.x),
                touch.y + f64::from(origin.y),
            ),
            emulating_pointer: touch.initial,
            send_event: false,
        }))
    }

    pub(super) fn touch_down(&mut self, serial: u32, time: u32, surface: SurfaceId, id: i32, x: f64, y: f64) {
        if self.touch.is_none() {
            return;
        }
        let Some(window) = self.system.window_for_surface(surface) else { return };
        self.update_serial(serial);

        let touch = TouchPoint {
            id,
            window,
            x,
            y,
            initial: self.touches.is_empty(),
            down_serial: serial,
        };
        debug!(id, x, y, initial = touch.initial, "Touch begin");
        if let Some(event) = self.touch_event(&touch, TouchPhase::Begin, time) {
            self.emit(event);
        }
        self.touches.insert(id, touch);
    }

    pub(super) fn touch_up(&mut self, serial: u32, time: u32, id: i32) {
        if self.touch.is_none() {
            return;
        }
        self.update_serial(serial);
        let Some(touch) = self.touches.get(&id) else {
            debug!(id, "Touch up for an unknown touch");
            return;
        };
        if let Some(event) = self.touch_event(touch, TouchPhase::End, time) {
            self.emit(event);
        }
        self.touches.remove(&id);
    }

    pub(super) fn touch_motion(&mut self, time: u32, id: i32, x: f64, y: f64) {
        let Some(touch) = self.touches.get_mut(&id) else {
            trace!(id, "Motion for an unknown touch");
            return;
        };
        touch.x = x;
        touch.y = y;
        let touch = touch.clone();
        if let Some(event) = self.touch_event(&touch, TouchPhase::Update, time) {
            self.emit(event);
        }
    }

    pub(super) fn touch_cancel(&mut self) {
        let touches = std::mem::take(&mut self.touches);
        debug!(count = touches.len(), "Touch cancel");
        for touch in touches.values() {
            if let Some(event) = self.touch_event(touch, TouchPhase::Cancel, 0) {
                self.emit(event);
            }
        }
    }
}
