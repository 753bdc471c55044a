//! Shared fixtures for seat tests: two windows on one monitor, a low and a
//! high density output.

pub use super::{Capabilities, Event, Seat, SeatEvent};
pub use crate::common::channel::{Receiver, channel, drain};
pub use crate::common::config::Settings;
use crate::seat::tablet::{TabletHandle, ToolCapability, ToolHandle, ToolType};
pub use crate::sys::geometry::Rect;
pub use crate::sys::keymap::StaticKeymap;
pub use crate::sys::window::{OutputId, SurfaceId, VirtualDisplay, WindowId};

pub type TestSeat = Seat<VirtualDisplay, StaticKeymap>;

pub const WINDOW_A: WindowId = WindowId(1);
pub const SURFACE_A: SurfaceId = SurfaceId(10);
pub const WINDOW_B: WindowId = WindowId(2);
pub const SURFACE_B: SurfaceId = SurfaceId(20);
pub const OUTPUT_LODPI: OutputId = OutputId(1);
pub const OUTPUT_HIDPI: OutputId = OutputId(2);

pub fn display() -> VirtualDisplay {
    VirtualDisplay::default()
        .with_monitor(Rect::new(0, 0, 1920, 1080), None)
        .with_window(WINDOW_A, SURFACE_A, Rect::new(100, 100, 400, 300))
        .with_window(WINDOW_B, SURFACE_B, Rect::new(600, 100, 400, 300))
        .with_output(OUTPUT_LODPI, 1)
        .with_output(OUTPUT_HIDPI, 2)
}

pub fn new_seat_with(
    display: VirtualDisplay,
    keymap: StaticKeymap,
    settings: Settings,
) -> (TestSeat, Receiver<Event>) {
    let (tx, rx) = channel();
    (Seat::new(0, display, keymap, settings, tx), rx)
}

pub fn new_seat() -> (TestSeat, Receiver<Event>) {
    new_seat_with(display(), StaticKeymap::us(), Settings::default())
}

fn seat_with(capabilities: Capabilities) -> (TestSeat, Receiver<Event>) {
    let (mut seat, mut rx) = new_seat();
    seat.handle_event(SeatEvent::Capabilities { capabilities: capabilities.bits() });
    drain(&mut rx);
    (seat, rx)
}

pub fn pointer_seat() -> (TestSeat, Receiver<Event>) { seat_with(Capabilities::POINTER) }

pub fn keyboard_seat() -> (TestSeat, Receiver<Event>) { seat_with(Capabilities::KEYBOARD) }

pub fn touch_seat() -> (TestSeat, Receiver<Event>) { seat_with(Capabilities::TOUCH) }

pub fn focused_keyboard_seat() -> (TestSeat, Receiver<Event>) {
    let (mut seat, mut rx) = keyboard_seat();
    seat.handle_event(SeatEvent::KeyboardEnter { serial: 1, surface: SURFACE_A, keys: vec![] });
    drain(&mut rx);
    (seat, rx)
}

pub fn add_tablet(seat: &mut TestSeat, handle: u32, name: &str) {
    let tablet = TabletHandle(handle);
    seat.handle_events([
        SeatEvent::TabletAdded { tablet },
        SeatEvent::TabletName { tablet, name: name.to_string() },
        SeatEvent::TabletId { tablet, vid: 0x56a, pid: 0x357 },
        SeatEvent::TabletDone { tablet },
    ]);
}

pub fn add_tool(seat: &mut TestSeat, tool: ToolHandle, tool_type: ToolType, serial: u64, caps: &[ToolCapability]) {
    seat.handle_events([
        SeatEvent::ToolAdded { tool },
        SeatEvent::ToolType { tool, tool_type: tool_type as u32 },
        SeatEvent::ToolSerial { tool, serial_msb: (serial >> 32) as u32, serial_lsb: serial as u32 },
    ]);
    for cap in caps {
        seat.handle_event(SeatEvent::ToolCapability { tool, capability: *cap as u32 });
    }
    seat.handle_event(SeatEvent::ToolDone { tool });
}
