//! Drag-and-drop routing. Only where a drag is and where it drops are
//! tracked; offers and data transfer live elsewhere.

use tracing::debug;

use super::event::{Drag, DragKind};
use super::{Event, Seat};
use crate::sys::keymap::Keymap;
use crate::sys::window::{SurfaceId, WindowId, WindowSystem};

impl<S: WindowSystem, K: Keymap> Seat<S, K> {
    pub fn drop_target(&self) -> Option<WindowId> { self.drop_dest }

    fn emit_drag(&self, kind: DragKind, window: WindowId, time: u32) {
        let (x_root, y_root) = self
            .devices
            .pointer(self.master_pointer)
            .map(|p| self.pointer_coords(p))
            .map_or((0.0, 0.0), |c| (c.x_root, c.y_root));
        self.emit(Event::Drag(Drag { kind, window, time, x_root, y_root }));
    }

    pub(super) fn data_device_enter(&mut self, serial: u32, surface: SurfaceId, x: f64, y: f64) {
        let Some(window) = self.system.window_for_surface(surface) else { return };
        debug!(serial, ?window, x, y, "Drag entered");

        // Keep pointer state current so device queries work during the drag.
        if let Some(pointer) = self.devices.pointer_mut(self.master_pointer) {
            pointer.focus = Some(window);
            pointer.surface_x = x;
            pointer.surface_y = y;
        }
        self.drop_dest = Some(window);
        self.emit_drag(DragKind::Enter, window, 0);
    }

    pub(super) fn data_device_leave(&mut self) {
        let Some(window) = self.drop_dest.take() else { return };
        if let Some(pointer) = self.devices.pointer_mut(self.master_pointer) {
            pointer.focus = None;
        }
        self.emit(Event::Drag(Drag { kind: DragKind::Leave, window, time: 0, x_root: -1.0, y_root: -1.0 }));
    }

    pub(super) fn data_device_motion(&mut self, time: u32, x: f64, y: f64) {
        let Some(window) = self.drop_dest else { return };
        if let Some(pointer) = self.devices.pointer_mut(self.master_pointer) {
            pointer.surface_x = x;
            pointer.surface_y = y;
        }
        self.emit_drag(DragKind::Motion, window, time);
    }

    pub(super) fn data_device_drop(&mut self) {
        let Some(window) = self.drop_dest else { return };
        self.emit_drag(DragKind::DropStart, window, 0);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::super::testing::*;
    use super::*;
    use crate::seat::SeatEvent;

    fn drags(events: Vec<Event>) -> Vec<(DragKind, WindowId, f64, f64)> {
        events
            .into_iter()
            .filter_map(|e| match e {
                Event::Drag(d) => Some((d.kind, d.window, d.x_root, d.y_root)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn it_routes_a_drag_to_its_drop() {
        let (mut seat, mut rx) = new_seat();
        drain(&mut rx);
        seat.handle_event(SeatEvent::DataDeviceEnter { serial: 1, surface: SURFACE_B, x: 3.0, y: 4.0 });
        seat.handle_event(SeatEvent::DataDeviceMotion { time: 5, x: 6.0, y: 7.0 });
        assert_eq!(seat.query_state(seat.master_pointer()).unwrap().window, Some(WINDOW_B));
        seat.handle_event(SeatEvent::DataDeviceDrop);
        assert_eq!(drags(drain(&mut rx)), vec![
            (DragKind::Enter, WINDOW_B, 603.0, 104.0),
            (DragKind::Motion, WINDOW_B, 606.0, 107.0),
            (DragKind::DropStart, WINDOW_B, 606.0, 107.0),
        ]);
        assert_eq!(seat.drop_target(), Some(WINDOW_B));
    }

    #[test]
    fn it_leaves_at_minus_one() {
        let (mut seat, mut rx) = new_seat();
        drain(&mut rx);
        seat.handle_event(SeatEvent::DataDeviceLeave);
        seat.handle_event(SeatEvent::DataDeviceMotion { time: 5, x: 6.0, y: 7.0 });
        assert_eq!(drain(&mut rx), vec![]);

        seat.handle_event(SeatEvent::DataDeviceEnter { serial: 1, surface: SURFACE_A, x: 3.0, y: 4.0 });
        seat.handle_event(SeatEvent::DataDeviceLeave);
        assert_eq!(drags(drain(&mut rx)), vec![
            (DragKind::Enter, WINDOW_A, 103.0, 104.0),
            (DragKind::Leave, WINDOW_A, -1.0, -1.0),
        ]);
        assert_eq!(seat.drop_target(), None);
        assert_eq!(seat.query_state(seat.master_pointer()).unwrap().window, None);
    }
}
