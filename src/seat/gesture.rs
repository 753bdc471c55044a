use std::f64::consts::PI;

use super::event::{GesturePhase, TouchpadPinch, TouchpadSwipe};
use super::{DeviceId, Event, Seat};
use crate::sys::keymap::Keymap;
use crate::sys::window::{WindowId, WindowSystem};

impl<S: WindowSystem, K: Keymap> Seat<S, K> {
    fn gesture_target(&mut self, time: u32) -> Option<(DeviceId, WindowId)> {
        if !self.gestures {
            return None;
        }
        let source = self.pointer?;
        let pointer = self.devices.pointer_mut(self.master_pointer)?;
        let window = pointer.focus?;
        pointer.time = time;
        Some((source, window))
    }

    fn emit_swipe(&mut self, phase: GesturePhase, time: u32, n_fingers: u32, dx: f64, dy: f64) {
        let Some((source, window)) = self.gesture_target(time) else { return };
        let master = self.master_pointer;
        let Some(pointer) = self.pointer_data(master) else { return };
        let event = Event::TouchpadSwipe(TouchpadSwipe {
            phase,
            window,
            device: master,
            source_device: source,
            time,
            state: self.device_modifiers(master),
            coords: self.pointer_coords(pointer),
            n_fingers,
            dx,
            dy,
        });
        self.emit(event);
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_pinch(
        &mut self,
        phase: GesturePhase,
        time: u32,
        n_fingers: u32,
        dx: f64,
        dy: f64,
        scale: f64,
        rotation: f64,
    ) {
        let Some((source, window)) = self.gesture_target(time) else { return };
        let master = self.master_pointer;
        let Some(pointer) = self.pointer_data(master) else { return };
        let event = Event::TouchpadPinch(TouchpadPinch {
            phase,
            window,
            device: master,
            source_device: source,
            time,
            state: self.device_modifiers(master),
            coords: self.pointer_coords(pointer),
            n_fingers,
            dx,
            dy,
            scale,
            angle_delta: rotation * PI / 180.0,
        });
        self.emit(event);
    }

    pub(super) fn swipe_begin(&mut self, serial: u32, time: u32, fingers: u32) {
        self.update_serial(serial);
        self.emit_swipe(GesturePhase::Begin, time, fingers, 0.0, 0.0);
        self.gesture_fingers = fingers;
    }

    pub(super) fn swipe_update(&mut self, time: u32, dx: f64, dy: f64) {
        self.emit_swipe(GesturePhase::Update, time, self.gesture_fingers, dx, dy);
    }

    pub(super) fn swipe_end(&mut self, serial: u32, time: u32, cancelled: bool) {
        self.update_serial(serial);
        let phase = if cancelled { GesturePhase::Cancel } else { GesturePhase::End };
        self.emit_swipe(phase, time, self.gesture_fingers, 0.0, 0.0);
    }

    pub(super) fn pinch_begin(&mut self, serial: u32, time: u32, fingers: u32) {
        self.update_serial(serial);
        self.emit_pinch(GesturePhase::Begin, time, fingers, 0.0, 0.0, 1.0, 0.0);
        self.gesture_fingers = fingers;
    }

    pub(super) fn pinch_update(&mut self, time: u32, dx: f64, dy: f64, scale: f64, rotation: f64) {
        self.emit_pinch(GesturePhase::Update, time, self.gesture_fingers, dx, dy, scale, rotation);
    }

    pub(super) fn pinch_end(&mut self, serial: u32, time: u32, cancelled: bool) {
        self.update_serial(serial);
        let phase = if cancelled { GesturePhase::Cancel } else { GesturePhase::End };
        self.emit_pinch(phase, time, self.gesture_fingers, 0.0, 0.0, 1.0, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::super::testing::*;
    use super::*;
    use crate::seat::SeatEvent;

    fn focused_pointer_seat() -> (TestSeat, Receiver<Event>) {
        let (mut seat, mut rx) = pointer_seat();
        seat.handle_event(SeatEvent::PointerEnter { serial: 1, surface: SURFACE_A, x: 5.0, y: 5.0 });
        drain(&mut rx);
        (seat, rx)
    }

    #[test]
    fn it_reports_swipes_with_the_begin_finger_count() {
        let (mut seat, mut rx) = focused_pointer_seat();
        seat.handle_event(SeatEvent::SwipeBegin { serial: 2, time: 10, surface: SURFACE_A, fingers: 3 });
        seat.handle_event(SeatEvent::SwipeUpdate { time: 11, dx: 4.0, dy: -2.0 });
        seat.handle_event(SeatEvent::SwipeEnd { serial: 3, time: 12, cancelled: true });
        let swipes: Vec<(GesturePhase, u32, f64, f64)> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                Event::TouchpadSwipe(s) => Some((s.phase, s.n_fingers, s.dx, s.dy)),
                _ => None,
            })
            .collect();
        assert_eq!(swipes, vec![
            (GesturePhase::Begin, 3, 0.0, 0.0),
            (GesturePhase::Update, 3, 4.0, -2.0),
            (GesturePhase::Cancel, 3, 0.0, 0.0),
        ]);
        assert_eq!(seat.serial(), 3);
    }

    #[test]
    fn it_converts_pinch_rotation_to_radians() {
        let (mut seat, mut rx) = focused_pointer_seat();
        seat.handle_event(SeatEvent::PinchBegin { serial: 2, time: 10, surface: SURFACE_A, fingers: 2 });
        seat.handle_event(SeatEvent::PinchUpdate { time: 11, dx: 1.0, dy: 1.0, scale: 1.5, rotation: 180.0 });
        seat.handle_event(SeatEvent::PinchEnd { serial: 3, time: 12, cancelled: false });
        let events = drain(&mut rx);
        let [Event::TouchpadPinch(begin), Event::TouchpadPinch(update), Event::TouchpadPinch(end)] =
            events.as_slice()
        else {
            panic!("{events:?}")
        };
        assert_eq!((begin.phase, begin.scale, begin.n_fingers), (GesturePhase::Begin, 1.0, 2));
        assert_eq!((update.scale, update.angle_delta), (1.5, PI));
        assert_eq!((end.phase, end.scale, end.angle_delta), (GesturePhase::End, 1.0, 0.0));
    }

    #[test]
    fn it_drops_gestures_without_focus_or_when_disabled() {
        let (mut seat, mut rx) = pointer_seat();
        seat.handle_event(SeatEvent::SwipeBegin { serial: 2, time: 10, surface: SURFACE_A, fingers: 3 });
        assert_eq!(drain(&mut rx), vec![]);

        let settings = Settings { pointer_gestures: false, ..Settings::default() };
        let (mut seat, mut rx) = new_seat_with(display(), StaticKeymap::us(), settings);
        seat.handle_event(SeatEvent::Capabilities { capabilities: Capabilities::POINTER.bits() });
        seat.handle_event(SeatEvent::PointerEnter { serial: 1, surface: SURFACE_A, x: 5.0, y: 5.0 });
        drain(&mut rx);
        seat.handle_event(SeatEvent::PinchBegin { serial: 2, time: 10, surface: SURFACE_A, fingers: 2 });
        assert_eq!(drain(&mut rx), vec![]);
    }
}
