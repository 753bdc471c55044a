use tracing::trace;

use super::{DeviceId, Seat, SeatTimer};
use crate::sys::cursor::Cursor;
use crate::sys::keymap::Keymap;
use crate::sys::window::WindowSystem;

impl<S: WindowSystem, K: Keymap> Seat<S, K> {
    /// Sets the cursor shown for `device`. `None` selects the default arrow
    /// at the current output scale.
    pub fn set_cursor(&mut self, device: DeviceId, cursor: Option<Cursor>) {
        let Some(pointer) = self.devices.pointer(device) else { return };
        let cursor = match cursor {
            None => Cursor::default_for_scale(pointer.current_output_scale),
            Some(mut cursor) => {
                cursor.set_scale(pointer.current_output_scale);
                cursor
            }
        };
        if pointer.cursor.as_ref() == Some(&cursor) {
            return;
        }
        self.stop_cursor_animation(device);
        if let Some(pointer) = self.devices.pointer_mut(device) {
            pointer.cursor = Some(cursor);
        }
        self.update_cursor(device);
    }

    pub fn cursor(&self, device: DeviceId) -> Option<&Cursor> { self.devices.pointer(device)?.cursor.as_ref() }

    pub(super) fn stop_cursor_animation(&mut self, device: DeviceId) {
        let Some(pointer) = self.devices.pointer_mut(device) else { return };
        if let Some(timer) = pointer.cursor_timer.take() {
            self.timers.cancel(timer);
        }
        pointer.cursor_image_index = 0;
        pointer.cursor_image_delay = 0;
    }

    /// Shows the current cursor image and schedules the next frame of an
    /// animated cursor. Also runs on every animation tick.
    pub(super) fn update_cursor(&mut self, device: DeviceId) {
        let is_tablet = self.is_tablet_device(device);
        let Some(pointer) = self.devices.pointer_mut(device) else { return };
        let Some(cursor) = &pointer.cursor else {
            if let Some(timer) = pointer.cursor_timer.take() {
                self.timers.cancel(timer);
            }
            return;
        };

        // Tablet tools get no cursor surface of their own yet; only the
        // animation state advances for them.
        if !is_tablet {
            if self.pointer.is_none() {
                return;
            }
            self.system.commit_cursor(pointer.enter_serial, cursor, pointer.cursor_image_index);
        }

        let (next_index, next_delay) = cursor.next_image_index(pointer.cursor_image_index);
        if next_index == pointer.cursor_image_index {
            self.stop_cursor_animation(device);
            return;
        }
        if next_delay != pointer.cursor_image_delay {
            if let Some(timer) = pointer.cursor_timer.take() {
                self.timers.cancel(timer);
            }
            trace!(?device, next_delay, "Scheduling cursor frame");
            pointer.cursor_timer = Some(self.timers.schedule_repeating(next_delay, SeatTimer::CursorFrame(device)));
        }
        pointer.cursor_image_index = next_index;
        pointer.cursor_image_delay = next_delay;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::super::testing::*;
    use super::*;
    use crate::sys::cursor::CursorFrame;

    fn frame(delay: u32) -> CursorFrame {
        CursorFrame { width: 16, height: 16, hotspot_x: 1, hotspot_y: 1, delay }
    }

    fn committed(seat: &TestSeat) -> Vec<usize> {
        seat.system().cursor_commits.iter().map(|c| c.image_index).collect()
    }

    #[test]
    fn it_commits_the_default_cursor_once() {
        let (mut seat, _rx) = pointer_seat();
        let master = seat.master_pointer();
        seat.set_cursor(master, None);
        seat.set_cursor(master, None);
        assert_eq!(seat.cursor(master).unwrap().name, "left_ptr");
        assert_eq!(committed(&seat), vec![0]);
        seat.advance_time(10_000);
        assert_eq!(committed(&seat), vec![0]);
    }

    #[test]
    fn it_animates_cursors() {
        let (mut seat, _rx) = pointer_seat();
        let master = seat.master_pointer();
        let watch = Cursor::new("watch", vec![frame(100), frame(100), frame(100)]);
        seat.set_cursor(master, Some(watch));
        assert_eq!(committed(&seat), vec![0]);

        seat.advance_time(99);
        assert_eq!(committed(&seat), vec![0]);
        seat.advance_time(100);
        assert_eq!(committed(&seat), vec![0, 1]);
        seat.advance_time(300);
        assert_eq!(committed(&seat), vec![0, 1, 2, 0]);
    }

    #[test]
    fn it_reschedules_when_frame_delays_change() {
        let (mut seat, _rx) = pointer_seat();
        let master = seat.master_pointer();
        seat.set_cursor(master, Some(Cursor::new("busy", vec![frame(50), frame(200)])));

        seat.advance_time(199);
        assert_eq!(committed(&seat), vec![0]);
        seat.advance_time(200);
        assert_eq!(committed(&seat), vec![0, 1]);
        seat.advance_time(249);
        assert_eq!(committed(&seat), vec![0, 1]);
        seat.advance_time(250);
        assert_eq!(committed(&seat), vec![0, 1, 0]);
    }

    #[test]
    fn it_stops_animating_on_leave() {
        let (mut seat, _rx) = pointer_seat();
        let master = seat.master_pointer();
        seat.handle_event(SeatEvent::PointerEnter { serial: 1, surface: SURFACE_A, x: 0.0, y: 0.0 });
        seat.set_cursor(master, Some(Cursor::new("watch", vec![frame(100), frame(100)])));
        seat.handle_event(SeatEvent::PointerLeave { serial: 2, surface: SURFACE_A });
        let commits = committed(&seat).len();
        seat.advance_time(1000);
        assert_eq!(committed(&seat).len(), commits);
    }

    #[test]
    fn it_needs_a_pointer_to_show_a_cursor() {
        let (mut seat, _rx) = new_seat();
        let master = seat.master_pointer();
        seat.set_cursor(master, None);
        assert_eq!(committed(&seat), vec![]);
        assert!(seat.cursor(master).is_some());
    }
}
