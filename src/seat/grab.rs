//! Explicit grabs, and the crossing events the compositor does not send for
//! them.

use tracing::debug;

use super::event::{Button, ButtonKind, Coords, Crossing, CrossingKind, CrossingMode, FocusChange, NotifyType, Touch, TouchPhase};
use super::pointer::Grab;
use super::touch::touch_sequence;
use super::{DeviceId, Event, InputSource, Seat, SeatError};
use crate::sys::cursor::Cursor;
use crate::sys::keymap::{Keymap, ModifierType};
use crate::sys::window::{WindowId, WindowSystem};

impl<S: WindowSystem, K: Keymap> Seat<S, K> {
    fn is_keyboard(&self, device: DeviceId) -> Result<bool, SeatError> {
        let entry = self.devices.get(device).ok_or(SeatError::UnknownDevice(device))?;
        Ok(entry.source == InputSource::Keyboard)
    }

    fn grab_owner(&self, device: DeviceId) -> Result<DeviceId, SeatError> {
        if !self.devices.contains(device) {
            return Err(SeatError::UnknownDevice(device));
        }
        self.pointer_owner(device).ok_or(SeatError::NotAPointer(device))
    }

    /// The window `device` is currently over, or focused on for keyboards.
    pub fn device_focus(&self, device: DeviceId) -> Result<Option<WindowId>, SeatError> {
        if self.is_keyboard(device)? {
            return Ok(self.keyboard.focus);
        }
        let owner = self.grab_owner(device)?;
        Ok(self.devices.pointer(owner).and_then(|p| p.focus))
    }

    pub fn grab_window(&self, device: DeviceId) -> Option<WindowId> {
        if self.is_keyboard(device).ok()? {
            return self.keyboard.grab;
        }
        let owner = self.pointer_owner(device)?;
        Some(self.devices.pointer(owner)?.grab?.window)
    }

    fn emulate_crossing(
        &self,
        device: DeviceId,
        window: WindowId,
        subwindow: Option<WindowId>,
        kind: CrossingKind,
        mode: CrossingMode,
        time: u32,
    ) {
        let Some(owner) = self.pointer_owner(device) else { return };
        let Some(pointer) = self.devices.pointer(owner) else { return };
        let (x, y) = (pointer.surface_x, pointer.surface_y);
        self.emit(Event::Crossing(Crossing {
            kind,
            window,
            subwindow,
            device,
            source_device: device,
            time,
            mode,
            detail: NotifyType::Nonlinear,
            focus: false,
            state: self.device_modifiers(owner),
            coords: Coords::new(x, y, x, y),
        }));
    }

    fn emulate_focus(&self, device: DeviceId, window: WindowId, focus_in: bool) {
        self.emit(Event::FocusChange(FocusChange {
            window,
            device,
            source_device: device,
            focus_in,
        }));
    }

    fn emit_grab_crossing(
        &self,
        device: DeviceId,
        keyboard: bool,
        from: Option<WindowId>,
        to: Option<WindowId>,
        mode: CrossingMode,
        time: u32,
    ) {
        if keyboard {
            if let Some(from) = from {
                self.emulate_focus(device, from, false);
            }
            if let Some(to) = to {
                self.emulate_focus(device, to, true);
            }
        } else {
            if let Some(from) = from {
                self.emulate_crossing(device, from, to, CrossingKind::Leave, mode, time);
            }
            if let Some(to) = to {
                self.emulate_crossing(device, to, from, CrossingKind::Enter, mode, time);
            }
        }
    }

    /// Grabs `device` for `window`. A `time` of zero means "now". A pointer
    /// grab fails when an existing grab is newer than `time`.
    pub fn grab(
        &mut self,
        device: DeviceId,
        window: WindowId,
        cursor: Option<Cursor>,
        time: u32,
    ) -> Result<(), SeatError> {
        let keyboard = self.is_keyboard(device)?;
        let prev_focus = self.device_focus(device)?;

        if keyboard {
            if prev_focus != Some(window) {
                self.emit_grab_crossing(device, true, prev_focus, Some(window), CrossingMode::Grab, time);
            }
            self.keyboard.grab = Some(window);
            return Ok(());
        }

        let owner = self.grab_owner(device)?;
        let pointer = self.devices.pointer(owner).ok_or(SeatError::NotAPointer(device))?;
        if let Some(grab) = pointer.grab {
            if time != 0 && grab.time > time {
                debug!(?device, time, grab_time = grab.time, "Grab refused");
                return Err(SeatError::AlreadyGrabbed { time, grab_time: grab.time });
            }
        }
        let time = if time == 0 { pointer.time } else { time };

        if prev_focus != Some(window) {
            self.emit_grab_crossing(device, false, prev_focus, Some(window), CrossingMode::Grab, time);
        }
        if let Some(pointer) = self.devices.pointer_mut(owner) {
            pointer.grab = Some(Grab { window, time });
        }
        debug!(?device, ?window, time, "Grabbed");
        match cursor {
            Some(cursor) => self.set_cursor(owner, Some(cursor)),
            None => self.update_cursor(owner),
        }
        Ok(())
    }

    pub fn ungrab(&mut self, device: DeviceId, time: u32) -> Result<(), SeatError> {
        let keyboard = self.is_keyboard(device)?;
        let focus = self.device_focus(device)?;

        if keyboard {
            let Some(prev) = self.keyboard.grab.take() else { return Ok(()) };
            if focus != Some(prev) {
                self.emit_grab_crossing(device, true, Some(prev), focus, CrossingMode::Ungrab, time);
            }
            return Ok(());
        }

        let owner = self.grab_owner(device)?;
        let Some(grab) = self.devices.pointer_mut(owner).and_then(|p| p.grab.take()) else {
            return Ok(());
        };
        if focus != Some(grab.window) {
            self.emit_grab_crossing(device, false, Some(grab.window), focus, CrossingMode::Ungrab, time);
        }
        debug!(?device, window = ?grab.window, "Ungrabbed");
        self.update_cursor(owner);
        Ok(())
    }

    /// Serial of the press that started the implicit grab for `sequence`,
    /// or of the last button press without one.
    pub fn implicit_grab_serial(&self, device: DeviceId, sequence: Option<u32>) -> Result<u32, SeatError> {
        let owner = self.grab_owner(device)?;
        if let Some(touch) = sequence.and_then(|s| self.touches.values().find(|t| touch_sequence(t.id) == s)) {
            return Ok(touch.down_serial);
        }
        Ok(self.devices.pointer(owner).map_or(0, |p| p.press_serial))
    }

    /// The newest press or touch-down serial, with the touch sequence when a
    /// touch is newest.
    pub fn last_implicit_grab_serial(&self, device: DeviceId) -> Result<(u32, Option<u32>), SeatError> {
        let owner = self.grab_owner(device)?;
        let mut serial = self.devices.pointer(owner).map_or(0, |p| p.press_serial);
        let mut sequence = None;
        for touch in self.touches.values() {
            if touch.down_serial > serial {
                serial = touch.down_serial;
                sequence = Some(touch_sequence(touch.id));
            }
        }
        Ok((serial, sequence))
    }

    /// Ends the implicit grab of `device` on its grab window by sending the
    /// release (or touch end) the compositor will no longer deliver.
    pub fn unset_grab(&mut self, device: DeviceId) -> Result<(), SeatError> {
        let owner = self.grab_owner(device)?;
        let Some(pointer) = self.devices.pointer(owner) else { return Ok(()) };
        let Some(grab) = pointer.grab else { return Ok(()) };
        let (_, sequence) = self.last_implicit_grab_serial(device)?;
        let state = self.device_modifiers(owner);
        let (x, y) = (pointer.surface_x, pointer.surface_y);
        let coords = Coords::new(x, y, x, y);

        let event = if let Some(sequence) = sequence {
            Event::Touch(Touch {
                phase: TouchPhase::End,
                window: grab.window,
                device,
                source_device: device,
                time: 0,
                sequence,
                state: ModifierType::empty(),
                coords,
                emulating_pointer: false,
                send_event: true,
            })
        } else {
            let button = if state.contains(ModifierType::BUTTON1) {
                1
            } else if state.contains(ModifierType::BUTTON2) {
                2
            } else if state.contains(ModifierType::BUTTON3) {
                3
            } else {
                return Ok(());
            };
            Event::Button(Button {
                kind: ButtonKind::Release,
                window: grab.window,
                device,
                source_device: device,
                time: 0,
                state: ModifierType::empty(),
                button,
                coords,
                axes: None,
                send_event: true,
            })
        };

        if let Some(pointer) = self.devices.pointer_mut(owner) {
            pointer.button_modifiers = ModifierType::empty();
        }
        self.emit(event);
        Ok(())
    }

    /// Forgets the touch behind `sequence` once its grab is over.
    pub fn unset_touch_grab(&mut self, device: DeviceId, sequence: u32) -> Result<(), SeatError> {
        self.grab_owner(device)?;
        let id = self.touches.values().find(|t| touch_sequence(t.id) == sequence).map(|t| t.id);
        if let Some(id) = id {
            debug!(sequence, "Dropping touch grab");
            self.touches.remove(&id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::super::testing::*;
    use super::*;
    use crate::seat::{ButtonState, SeatEvent};

    fn crossings(events: &[Event]) -> Vec<(CrossingKind, WindowId, CrossingMode)> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Crossing(c) => Some((c.kind, c.window, c.mode)),
                _ => None,
            })
            .collect()
    }

    fn entered_seat() -> (TestSeat, Receiver<Event>) {
        let (mut seat, mut rx) = pointer_seat();
        seat.handle_event(SeatEvent::PointerEnter { serial: 1, surface: SURFACE_A, x: 10.0, y: 10.0 });
        drain(&mut rx);
        (seat, rx)
    }

    #[test]
    fn it_emulates_crossings_into_the_grab_window() {
        let (mut seat, mut rx) = entered_seat();
        let master = seat.master_pointer();
        seat.grab(master, WINDOW_B, None, 100).unwrap();
        assert_eq!(crossings(&drain(&mut rx)), vec![
            (CrossingKind::Leave, WINDOW_A, CrossingMode::Grab),
            (CrossingKind::Enter, WINDOW_B, CrossingMode::Grab),
        ]);
        assert_eq!(seat.grab_window(master), Some(WINDOW_B));

        seat.ungrab(master, 110).unwrap();
        assert_eq!(crossings(&drain(&mut rx)), vec![
            (CrossingKind::Leave, WINDOW_B, CrossingMode::Ungrab),
            (CrossingKind::Enter, WINDOW_A, CrossingMode::Ungrab),
        ]);
        assert_eq!(seat.grab_window(master), None);
    }

    #[test]
    fn it_does_not_cross_into_the_focused_window() {
        let (mut seat, mut rx) = entered_seat();
        let master = seat.master_pointer();
        seat.grab(master, WINDOW_A, None, 100).unwrap();
        seat.ungrab(master, 110).unwrap();
        assert_eq!(crossings(&drain(&mut rx)), vec![]);
    }

    #[test]
    fn it_refuses_grabs_older_than_the_current_one() {
        let (mut seat, mut rx) = entered_seat();
        let master = seat.master_pointer();
        seat.grab(master, WINDOW_A, None, 100).unwrap();
        assert_eq!(
            seat.grab(master, WINDOW_B, None, 50),
            Err(SeatError::AlreadyGrabbed { time: 50, grab_time: 100 })
        );
        assert_eq!(drain(&mut rx), vec![]);
        assert_eq!(seat.grab_window(master), Some(WINDOW_A));

        seat.grab(master, WINDOW_B, None, 0).unwrap();
        assert_eq!(seat.grab_window(master), Some(WINDOW_B));
    }

    #[test]
    fn it_sends_focus_changes_for_keyboard_grabs() {
        let (mut seat, mut rx) = keyboard_seat();
        seat.handle_event(SeatEvent::KeyboardEnter { serial: 1, surface: SURFACE_A, keys: vec![] });
        drain(&mut rx);
        let keyboard = seat.master_keyboard();

        seat.grab(keyboard, WINDOW_B, None, 0).unwrap();
        let focus: Vec<(WindowId, bool)> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                Event::FocusChange(f) => Some((f.window, f.focus_in)),
                _ => None,
            })
            .collect();
        assert_eq!(focus, vec![(WINDOW_A, false), (WINDOW_B, true)]);
        assert_eq!(seat.grab_window(keyboard), Some(WINDOW_B));
    }

    #[test]
    fn it_rejects_unknown_devices() {
        let (mut seat, _rx) = pointer_seat();
        let slave = seat.pointer_device().unwrap();
        seat.handle_event(SeatEvent::Capabilities { capabilities: 0 });
        assert_eq!(seat.grab(slave, WINDOW_A, None, 0), Err(SeatError::UnknownDevice(slave)));
    }

    #[test]
    fn it_releases_the_held_button_on_unset_grab() {
        let (mut seat, mut rx) = entered_seat();
        let master = seat.master_pointer();
        seat.handle_event(SeatEvent::PointerButton { serial: 7, time: 90, button: 0x111, state: ButtonState::Pressed });
        seat.grab(master, WINDOW_A, None, 95).unwrap();
        drain(&mut rx);
        assert_eq!(seat.last_implicit_grab_serial(master), Ok((7, None)));

        seat.unset_grab(master).unwrap();
        let events = drain(&mut rx);
        let [Event::Button(release)] = events.as_slice() else { panic!("{events:?}") };
        assert_eq!((release.kind, release.button, release.send_event), (ButtonKind::Release, 3, true));
        assert_eq!(release.coords, Coords::new(10.0, 10.0, 10.0, 10.0));
        assert_eq!(seat.query_state(master).unwrap().mask, ModifierType::empty());
    }

    #[test]
    fn it_prefers_the_newest_touch_for_implicit_grabs() {
        let (mut seat, mut rx) = new_seat();
        seat.handle_event(SeatEvent::Capabilities {
            capabilities: (Capabilities::POINTER | Capabilities::TOUCH).bits(),
        });
        seat.handle_event(SeatEvent::PointerEnter { serial: 1, surface: SURFACE_A, x: 0.0, y: 0.0 });
        seat.handle_event(SeatEvent::PointerButton { serial: 2, time: 10, button: 0x110, state: ButtonState::Pressed });
        seat.handle_event(SeatEvent::TouchDown { serial: 3, time: 11, surface: SURFACE_A, id: 4, x: 1.0, y: 1.0 });
        let master = seat.master_pointer();
        assert_eq!(seat.last_implicit_grab_serial(master), Ok((3, Some(5))));
        assert_eq!(seat.implicit_grab_serial(master, Some(5)), Ok(3));
        assert_eq!(seat.implicit_grab_serial(master, None), Ok(2));

        seat.grab(master, WINDOW_A, None, 12).unwrap();
        drain(&mut rx);
        seat.unset_grab(master).unwrap();
        let events = drain(&mut rx);
        let [Event::Touch(end)] = events.as_slice() else { panic!("{events:?}") };
        assert_eq!((end.phase, end.sequence, end.send_event), (TouchPhase::End, 5, true));

        seat.unset_touch_grab(master, 5).unwrap();
        assert_eq!(seat.touch_count(), 0);
        assert_eq!(seat.last_implicit_grab_serial(master), Ok((2, None)));
    }
}
