use tracing::{debug, warn};

use super::event::{Button, ButtonKind, Coords, Crossing, CrossingKind, CrossingMode, Motion, NotifyType, Scroll};
use super::{ButtonState, DeviceId, Event, ScrollAxis, Seat};
use crate::sys::cursor::Cursor;
use crate::sys::keymap::{Keymap, ModifierType};
use crate::sys::timer::TimerId;
use crate::sys::window::{OutputId, SurfaceId, WindowId, WindowSystem};

const BTN_LEFT: u32 = 0x110;
const BTN_RIGHT: u32 = 0x111;
const BTN_MIDDLE: u32 = 0x112;

/// Pointer state shared by a master pointer and every slave feeding it.
#[derive(Debug)]
pub struct PointerData {
    pub focus: Option<WindowId>,
    pub surface_x: f64,
    pub surface_y: f64,
    pub button_modifiers: ModifierType,
    pub time: u32,
    pub enter_serial: u32,
    pub press_serial: u32,
    pub grab: Option<Grab>,

    pub cursor: Option<Cursor>,
    pub cursor_timer: Option<TimerId>,
    pub cursor_image_index: usize,
    pub cursor_image_delay: u32,
    pub current_output_scale: i32,
    /// Outputs the cursor surface currently overlaps.
    pub outputs: Vec<OutputId>,
}

impl Default for PointerData {
    fn default() -> Self {
        PointerData {
            focus: None,
            surface_x: 0.0,
            surface_y: 0.0,
            button_modifiers: ModifierType::empty(),
            time: 0,
            enter_serial: 0,
            press_serial: 0,
            grab: None,
            cursor: None,
            cursor_timer: None,
            cursor_image_index: 0,
            cursor_image_delay: 0,
            current_output_scale: 1,
            outputs: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grab {
    pub window: WindowId,
    pub time: u32,
}

/// Translates a Linux input button code into a 1-based toolkit button.
pub fn translate_button(code: u32) -> u32 {
    match code {
        BTN_MIDDLE => 2,
        BTN_RIGHT => 3,
        _ => code.saturating_sub(BTN_LEFT - 1),
    }
}

impl<S: WindowSystem, K: Keymap> Seat<S, K> {
    pub(super) fn pointer_coords(&self, pointer: &PointerData) -> Coords {
        let origin = pointer.focus.map(|w| self.system.root_origin(w)).unwrap_or_default();
        Coords::new(
            pointer.surface_x,
            pointer.surface_y,
            pointer.surface_x + f64::from(origin.x),
            pointer.surface_y + f64::from(origin.y),
        )
    }

    pub(super) fn pointer_enter(&mut self, serial: u32, surface: SurfaceId, x: f64, y: f64) {
        let Some(source) = self.pointer else { return };
        let Some(window) = self.system.window_for_surface(surface) else {
            debug!(?surface, "Enter on a foreign surface");
            return;
        };
        self.update_serial(serial);

        let master = self.master_pointer;
        let Some(pointer) = self.devices.pointer_mut(master) else { return };
        pointer.focus = Some(window);
        pointer.surface_x = x;
        pointer.surface_y = y;
        pointer.enter_serial = serial;

        self.update_cursor(master);

        let Some(pointer) = self.pointer_data(master) else { return };
        let event = Event::Crossing(Crossing {
            kind: CrossingKind::Enter,
            window,
            subwindow: None,
            device: master,
            source_device: source,
            time: self.now_ms(),
            mode: CrossingMode::Normal,
            detail: NotifyType::Nonlinear,
            focus: true,
            state: ModifierType::empty(),
            coords: self.pointer_coords(pointer),
        });
        self.emit(event);
    }

    pub(super) fn pointer_leave(&mut self, serial: u32, surface: SurfaceId) {
        let Some(source) = self.pointer else { return };
        if self.system.window_for_surface(surface).is_none() {
            return;
        }
        let master = self.master_pointer;
        let Some(window) = self.pointer_data(master).and_then(|p| p.focus) else {
            return;
        };
        self.update_serial(serial);

        self.update_cursor(master);

        let Some(pointer) = self.pointer_data(master) else { return };
        let event = Event::Crossing(Crossing {
            kind: CrossingKind::Leave,
            window,
            subwindow: None,
            device: master,
            source_device: source,
            time: self.now_ms(),
            mode: CrossingMode::Normal,
            detail: NotifyType::Nonlinear,
            focus: true,
            state: ModifierType::empty(),
            coords: self.pointer_coords(pointer),
        });
        self.emit(event);

        if let Some(pointer) = self.devices.pointer_mut(master) {
            pointer.focus = None;
        }
        self.stop_cursor_animation(master);
    }

    pub(super) fn pointer_motion(&mut self, time: u32, x: f64, y: f64) {
        let Some(source) = self.pointer else { return };
        let master = self.master_pointer;
        let Some(pointer) = self.devices.pointer_mut(master) else { return };
        let Some(window) = pointer.focus else { return };
        pointer.time = time;
        pointer.surface_x = x;
        pointer.surface_y = y;

        let Some(pointer) = self.pointer_data(master) else { return };
        let event = Event::Motion(Motion {
            window,
            device: master,
            source_device: source,
            time,
            state: self.device_modifiers(master),
            coords: self.pointer_coords(pointer),
            axes: None,
        });
        self.emit(event);
    }

    pub(super) fn pointer_button(&mut self, serial: u32, time: u32, code: u32, state: ButtonState) {
        let Some(source) = self.pointer else { return };
        let master = self.master_pointer;
        let Some(window) = self.pointer_data(master).and_then(|p| p.focus) else {
            return;
        };
        self.update_serial(serial);

        let button = translate_button(code);
        let pressed = state == ButtonState::Pressed;
        if let Some(pointer) = self.devices.pointer_mut(master) {
            pointer.time = time;
            if pressed {
                pointer.press_serial = serial;
            }
        }

        let Some(pointer) = self.pointer_data(master) else { return };
        let event = Event::Button(Button {
            kind: if pressed { ButtonKind::Press } else { ButtonKind::Release },
            window,
            device: master,
            source_device: source,
            time,
            state: self.device_modifiers(master),
            button,
            coords: self.pointer_coords(pointer),
            axes: None,
            send_event: false,
        });

        if let Some(pointer) = self.devices.pointer_mut(master) {
            let mask = ModifierType::for_button(button);
            if pressed {
                pointer.button_modifiers |= mask;
            } else {
                pointer.button_modifiers &= !mask;
            }
        }
        self.emit(event);
    }

    pub(super) fn pointer_axis(&mut self, time: u32, axis: ScrollAxis, value: f64) {
        let Some(source) = self.pointer else { return };
        let master = self.master_pointer;
        let Some(pointer) = self.devices.pointer_mut(master) else { return };
        let Some(window) = pointer.focus else { return };
        pointer.time = time;

        // Ten protocol units per discrete scroll step.
        let (delta_x, delta_y) = match axis {
            ScrollAxis::Vertical => (0.0, value / 10.0),
            ScrollAxis::Horizontal => (value / 10.0, 0.0),
        };

        let Some(pointer) = self.pointer_data(master) else { return };
        let event = Event::Scroll(Scroll {
            window,
            device: master,
            source_device: source,
            time,
            state: self.device_modifiers(master),
            coords: self.pointer_coords(pointer),
            delta_x,
            delta_y,
        });
        self.emit(event);
    }

    pub(super) fn pointer_surface_enter_output(&mut self, output: OutputId) {
        let master = self.master_pointer;
        let Some(pointer) = self.devices.pointer_mut(master) else { return };
        if !pointer.outputs.contains(&output) {
            pointer.outputs.push(output);
        }
        self.pointer_surface_update_scale(master);
    }

    pub(super) fn pointer_surface_leave_output(&mut self, output: OutputId) {
        let master = self.master_pointer;
        let Some(pointer) = self.devices.pointer_mut(master) else { return };
        if !pointer.outputs.contains(&output) {
            warn!(?output, "Cursor left an output it never entered");
            return;
        }
        pointer.outputs.retain(|o| *o != output);
        self.pointer_surface_update_scale(master);
    }

    /// The cursor is rendered at the largest scale of any output it touches.
    fn pointer_surface_update_scale(&mut self, device: DeviceId) {
        let Some(pointer) = self.pointer_data(device) else { return };
        let scale = pointer.outputs.iter().map(|o| self.system.output_scale(*o)).fold(1, i32::max);
        debug!(scale, "Cursor scale");
        if let Some(pointer) = self.devices.pointer_mut(device) {
            pointer.current_output_scale = scale;
            if let Some(cursor) = &mut pointer.cursor {
                cursor.set_scale(scale);
            }
        }
        self.update_cursor(device);
    }
}
