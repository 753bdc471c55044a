//! Per-seat input state and event synthesis.
//!
//! A [`Seat`] consumes protocol-shaped [`SeatEvent`]s, keeps the device
//! registry and per-device state in sync, and sends synthesized [`Event`]s
//! to the event channel. Everything runs on one thread; timers are driven
//! through [`Seat::advance_time`].

pub mod cursor;
pub mod data_device;
pub mod device;
pub mod error;
pub mod event;
pub mod gesture;
pub mod grab;
pub mod keyboard;
pub mod pointer;
pub mod tablet;
pub mod touch;

#[cfg(test)]
mod testing;

use bitflags::bitflags;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

pub use self::device::{Device, DeviceEntry, DeviceId, DeviceRegistry, DeviceType, InputSource};
pub use self::error::SeatError;
pub use self::event::Event;
use self::keyboard::KeyboardState;
use self::pointer::PointerData;
use self::tablet::{PendingTablet, PendingTool, TabletHandle, TabletPair, TabletTool, ToolHandle};
use self::touch::TouchPoint;
use crate::common::channel::Sender;
use crate::common::collections::{BTreeMap, HashMap};
use crate::common::config::Settings;
use crate::sys::keymap::{Keymap, KeymapFormat, ModifierType};
use crate::sys::timer::Scheduler;
use crate::sys::window::{OutputId, SurfaceId, WindowId, WindowSystem};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Capabilities: u32 {
        const POINTER = 1;
        const KEYBOARD = 2;
        const TOUCH = 4;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, Serialize, Deserialize)]
#[repr(u32)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Released = 0,
    Pressed = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, Serialize, Deserialize)]
#[repr(u32)]
#[serde(rename_all = "snake_case")]
pub enum KeyState {
    Released = 0,
    Pressed = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, Serialize, Deserialize)]
#[repr(u32)]
#[serde(rename_all = "snake_case")]
pub enum ScrollAxis {
    Vertical = 0,
    Horizontal = 1,
}

/// Input reported by the compositor for one seat. Coordinates are surface
/// local; times are compositor milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatEvent {
    /// The seat now offers exactly these capabilities (`Capabilities` bits).
    Capabilities { capabilities: u32 },

    PointerEnter { serial: u32, surface: SurfaceId, x: f64, y: f64 },
    PointerLeave { serial: u32, surface: SurfaceId },
    PointerMotion { time: u32, x: f64, y: f64 },
    PointerButton { serial: u32, time: u32, button: u32, state: ButtonState },
    PointerAxis { time: u32, axis: ScrollAxis, value: f64 },
    /// The cursor surface started overlapping an output.
    PointerSurfaceEnterOutput { output: OutputId },
    PointerSurfaceLeaveOutput { output: OutputId },

    KeyboardKeymap { format: KeymapFormat },
    KeyboardEnter { serial: u32, surface: SurfaceId, keys: Vec<u32> },
    KeyboardLeave { serial: u32, surface: SurfaceId },
    Key { serial: u32, time: u32, key: u32, state: KeyState },
    Modifiers { serial: u32, depressed: u32, latched: u32, locked: u32, group: u32 },
    /// `rate` is in keys per second; zero disables repeat.
    RepeatInfo { rate: i32, delay: i32 },

    TouchDown { serial: u32, time: u32, surface: SurfaceId, id: i32, x: f64, y: f64 },
    TouchUp { serial: u32, time: u32, id: i32 },
    TouchMotion { time: u32, id: i32, x: f64, y: f64 },
    TouchFrame,
    TouchCancel,

    SwipeBegin { serial: u32, time: u32, surface: SurfaceId, fingers: u32 },
    SwipeUpdate { time: u32, dx: f64, dy: f64 },
    SwipeEnd { serial: u32, time: u32, cancelled: bool },
    PinchBegin { serial: u32, time: u32, surface: SurfaceId, fingers: u32 },
    /// `rotation` is in degrees.
    PinchUpdate { time: u32, dx: f64, dy: f64, scale: f64, rotation: f64 },
    PinchEnd { serial: u32, time: u32, cancelled: bool },

    TabletAdded { tablet: TabletHandle },
    TabletName { tablet: TabletHandle, name: String },
    TabletId { tablet: TabletHandle, vid: u32, pid: u32 },
    TabletType { tablet: TabletHandle, tablet_type: u32 },
    TabletPath { tablet: TabletHandle, path: String },
    TabletDone { tablet: TabletHandle },
    TabletRemoved { tablet: TabletHandle },

    ToolAdded { tool: ToolHandle },
    ToolType { tool: ToolHandle, tool_type: u32 },
    ToolSerial { tool: ToolHandle, serial_msb: u32, serial_lsb: u32 },
    ToolHardwareId { tool: ToolHandle, hardware_id_msb: u32, hardware_id_lsb: u32 },
    ToolCapability { tool: ToolHandle, capability: u32 },
    ToolDone { tool: ToolHandle },
    ToolRemoved { tool: ToolHandle },
    ToolProximityIn { tool: ToolHandle, serial: u32, time: u32, tablet: TabletHandle, surface: SurfaceId },
    ToolProximityOut { tool: ToolHandle, time: u32 },
    ToolDown { tool: ToolHandle, serial: u32, time: u32 },
    ToolUp { tool: ToolHandle, serial: u32 },
    ToolMotion { tool: ToolHandle, time: u32, x: f64, y: f64 },
    ToolPressure { tool: ToolHandle, time: u32, pressure: u32 },
    ToolDistance { tool: ToolHandle, time: u32, distance: u32 },
    ToolTilt { tool: ToolHandle, time: u32, tilt_x: i32, tilt_y: i32 },
    ToolButton { tool: ToolHandle, serial: u32, time: u32, button: u32, state: ButtonState },
    /// Ends a group of tool events.
    ToolFrame { tool: ToolHandle },

    DataDeviceEnter { serial: u32, surface: SurfaceId, x: f64, y: f64 },
    DataDeviceLeave,
    DataDeviceMotion { time: u32, x: f64, y: f64 },
    DataDeviceDrop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeatTimer {
    KeyRepeat,
    CursorFrame(DeviceId),
}

/// Position and button state of a pointing device.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceState {
    pub window: Option<WindowId>,
    pub x: f64,
    pub y: f64,
    pub x_root: f64,
    pub y_root: f64,
    pub mask: ModifierType,
}

pub struct Seat<S: WindowSystem, K: Keymap> {
    id: u32,
    system: S,
    keymap: K,
    settings: Settings,
    events: Sender<Event>,
    timers: Scheduler<SeatTimer>,
    serial: u32,

    devices: DeviceRegistry,
    master_pointer: DeviceId,
    master_keyboard: DeviceId,
    capabilities: Capabilities,
    pointer: Option<DeviceId>,
    keyboard_device: Option<DeviceId>,
    touch: Option<DeviceId>,
    gestures: bool,
    gesture_fingers: u32,

    keyboard: KeyboardState,
    touches: BTreeMap<i32, TouchPoint>,
    drop_dest: Option<WindowId>,

    tablets: Vec<TabletPair>,
    pending_tablets: HashMap<TabletHandle, PendingTablet>,
    pending_tools: HashMap<ToolHandle, PendingTool>,
    tools: HashMap<ToolHandle, TabletTool>,
}

impl<S: WindowSystem, K: Keymap> Seat<S, K> {
    /// Creates the seat with its core pointer and keyboard.
    pub fn new(id: u32, system: S, keymap: K, settings: Settings, events: Sender<Event>) -> Self {
        let mut devices = DeviceRegistry::default();
        let master_pointer = devices.add(
            DeviceEntry::new(
                "Core Pointer",
                DeviceType::Master,
                InputSource::Mouse,
                Device::Pointer(Some(Box::default())),
            )
            .with_cursor(),
        );
        let master_keyboard = devices.add(DeviceEntry::new(
            "Core Keyboard",
            DeviceType::Master,
            InputSource::Keyboard,
            Device::Keyboard,
        ));
        devices.associate(master_pointer, Some(master_keyboard));
        devices.associate(master_keyboard, Some(master_pointer));

        let seat = Seat {
            id,
            system,
            keymap,
            settings,
            events,
            timers: Scheduler::new(),
            serial: 0,
            devices,
            master_pointer,
            master_keyboard,
            capabilities: Capabilities::empty(),
            pointer: None,
            keyboard_device: None,
            touch: None,
            gestures: false,
            gesture_fingers: 0,
            keyboard: KeyboardState::default(),
            touches: BTreeMap::new(),
            drop_dest: None,
            tablets: Vec::new(),
            pending_tablets: HashMap::default(),
            pending_tools: HashMap::default(),
            tools: HashMap::default(),
        };
        seat.emit(Event::DeviceAdded(master_pointer));
        seat.emit(Event::DeviceAdded(master_keyboard));
        seat
    }

    pub fn id(&self) -> u32 { self.id }

    pub fn system(&self) -> &S { &self.system }

    pub fn system_mut(&mut self) -> &mut S { &mut self.system }

    pub fn keymap(&self) -> &K { &self.keymap }

    pub fn devices(&self) -> &DeviceRegistry { &self.devices }

    pub fn master_pointer(&self) -> DeviceId { self.master_pointer }

    pub fn master_keyboard(&self) -> DeviceId { self.master_keyboard }

    pub fn capabilities(&self) -> Capabilities { self.capabilities }

    pub fn pointer_device(&self) -> Option<DeviceId> { self.pointer }

    pub fn keyboard_device(&self) -> Option<DeviceId> { self.keyboard_device }

    pub fn touch_device(&self) -> Option<DeviceId> { self.touch }

    /// The most recent serial seen from the compositor.
    pub fn serial(&self) -> u32 { self.serial }

    pub fn list_devices(&self, device_type: DeviceType) -> Vec<DeviceId> { self.devices.list(device_type) }

    pub fn client_pointer(&self) -> Option<DeviceId> { self.devices.client_pointer() }

    pub fn now(&self) -> u64 { self.timers.now() }

    fn now_ms(&self) -> u32 { self.timers.now() as u32 }

    fn update_serial(&mut self, serial: u32) { self.serial = serial; }

    fn emit(&self, event: Event) {
        trace!(?event, "Emitting");
        self.events.send(event);
    }

    fn log_event(&self, event: &SeatEvent) {
        match event {
            SeatEvent::PointerMotion { .. }
            | SeatEvent::TouchMotion { .. }
            | SeatEvent::TouchFrame
            | SeatEvent::SwipeUpdate { .. }
            | SeatEvent::PinchUpdate { .. }
            | SeatEvent::ToolMotion { .. }
            | SeatEvent::ToolPressure { .. }
            | SeatEvent::ToolDistance { .. }
            | SeatEvent::ToolTilt { .. }
            | SeatEvent::ToolFrame { .. }
            | SeatEvent::DataDeviceMotion { .. } => trace!(?event, "Event"),
            _ => debug!(?event, "Event"),
        }
    }

    #[instrument(name = "seat::handle_event", skip(self), fields(event = ?event))]
    pub fn handle_event(&mut self, event: SeatEvent) {
        self.log_event(&event);
        match event {
            SeatEvent::Capabilities { capabilities } => {
                self.set_capabilities(Capabilities::from_bits_truncate(capabilities))
            }

            SeatEvent::PointerEnter { serial, surface, x, y } => self.pointer_enter(serial, surface, x, y),
            SeatEvent::PointerLeave { serial, surface } => self.pointer_leave(serial, surface),
            SeatEvent::PointerMotion { time, x, y } => self.pointer_motion(time, x, y),
            SeatEvent::PointerButton { serial, time, button, state } => {
                self.pointer_button(serial, time, button, state)
            }
            SeatEvent::PointerAxis { time, axis, value } => self.pointer_axis(time, axis, value),
            SeatEvent::PointerSurfaceEnterOutput { output } => self.pointer_surface_enter_output(output),
            SeatEvent::PointerSurfaceLeaveOutput { output } => self.pointer_surface_leave_output(output),

            SeatEvent::KeyboardKeymap { format } => self.keyboard_keymap(format),
            SeatEvent::KeyboardEnter { serial, surface, keys: _ } => self.keyboard_enter(serial, surface),
            SeatEvent::KeyboardLeave { serial, surface } => self.keyboard_leave(serial, surface),
            SeatEvent::Key { serial, time, key, state } => self.keyboard_key(serial, time, key, state),
            SeatEvent::Modifiers { serial: _, depressed, latched, locked, group } => {
                self.keyboard_modifiers(depressed, latched, locked, group)
            }
            SeatEvent::RepeatInfo { rate, delay } => self.keyboard_repeat_info(rate, delay),

            SeatEvent::TouchDown { serial, time, surface, id, x, y } => {
                self.touch_down(serial, time, surface, id, x, y)
            }
            SeatEvent::TouchUp { serial, time, id } => self.touch_up(serial, time, id),
            SeatEvent::TouchMotion { time, id, x, y } => self.touch_motion(time, id, x, y),
            SeatEvent::TouchFrame => {}
            SeatEvent::TouchCancel => self.touch_cancel(),

            SeatEvent::SwipeBegin { serial, time, surface: _, fingers } => self.swipe_begin(serial, time, fingers),
            SeatEvent::SwipeUpdate { time, dx, dy } => self.swipe_update(time, dx, dy),
            SeatEvent::SwipeEnd { serial, time, cancelled } => self.swipe_end(serial, time, cancelled),
            SeatEvent::PinchBegin { serial, time, surface: _, fingers } => self.pinch_begin(serial, time, fingers),
            SeatEvent::PinchUpdate { time, dx, dy, scale, rotation } => {
                self.pinch_update(time, dx, dy, scale, rotation)
            }
            SeatEvent::PinchEnd { serial, time, cancelled } => self.pinch_end(serial, time, cancelled),

            SeatEvent::TabletAdded { tablet } => self.tablet_added(tablet),
            SeatEvent::TabletName { tablet, name } => self.tablet_name(tablet, name),
            SeatEvent::TabletId { tablet, vid, pid } => self.tablet_id(tablet, vid, pid),
            SeatEvent::TabletType { tablet, tablet_type } => self.tablet_type(tablet, tablet_type),
            SeatEvent::TabletPath { tablet, path } => self.tablet_path(tablet, path),
            SeatEvent::TabletDone { tablet } => self.tablet_done(tablet),
            SeatEvent::TabletRemoved { tablet } => self.tablet_removed(tablet),

            SeatEvent::ToolAdded { tool } => self.tool_added(tool),
            SeatEvent::ToolType { tool, tool_type } => self.tool_type(tool, tool_type),
            SeatEvent::ToolSerial { tool, serial_msb, serial_lsb } => self.tool_serial(tool, serial_msb, serial_lsb),
            SeatEvent::ToolHardwareId { tool, hardware_id_msb, hardware_id_lsb } => {
                self.tool_hardware_id(tool, hardware_id_msb, hardware_id_lsb)
            }
            SeatEvent::ToolCapability { tool, capability } => self.tool_capability(tool, capability),
            SeatEvent::ToolDone { tool } => self.tool_done(tool),
            SeatEvent::ToolRemoved { tool } => self.tool_removed(tool),
            SeatEvent::ToolProximityIn { tool, serial, time, tablet, surface } => {
                self.tool_proximity_in(tool, serial, time, tablet, surface)
            }
            SeatEvent::ToolProximityOut { tool, time } => self.tool_proximity_out(tool, time),
            SeatEvent::ToolDown { tool, serial, time } => self.tool_down(tool, serial, time),
            SeatEvent::ToolUp { tool, serial } => self.tool_up(tool, serial),
            SeatEvent::ToolMotion { tool, time, x, y } => self.tool_motion(tool, time, x, y),
            SeatEvent::ToolPressure { tool, time, pressure } => self.tool_pressure(tool, time, pressure),
            SeatEvent::ToolDistance { tool, time, distance } => self.tool_distance(tool, time, distance),
            SeatEvent::ToolTilt { tool, time, tilt_x, tilt_y } => self.tool_tilt(tool, time, tilt_x, tilt_y),
            SeatEvent::ToolButton { tool, serial, time, button, state } => {
                self.tool_button(tool, serial, time, button, state)
            }
            SeatEvent::ToolFrame { tool } => self.tool_frame(tool),

            SeatEvent::DataDeviceEnter { serial, surface, x, y } => self.data_device_enter(serial, surface, x, y),
            SeatEvent::DataDeviceLeave => self.data_device_leave(),
            SeatEvent::DataDeviceMotion { time, x, y } => self.data_device_motion(time, x, y),
            SeatEvent::DataDeviceDrop => self.data_device_drop(),
        }
    }

    pub fn handle_events(&mut self, events: impl IntoIterator<Item = SeatEvent>) {
        for event in events {
            self.handle_event(event);
        }
    }

    /// Moves the clock to `now` (milliseconds), firing every timer due by
    /// then in order.
    pub fn advance_time(&mut self, now: u64) {
        while let Some((id, timer)) = self.timers.pop_due(now) {
            trace!(?id, ?timer, now = self.timers.now(), "Timer fired");
            match timer {
                SeatTimer::KeyRepeat => self.keyboard_repeat(),
                SeatTimer::CursorFrame(device) => self.update_cursor(device),
            }
        }
    }

    /// Announced capabilities are level triggered: protocol objects are
    /// created or released until the held set matches `capabilities`.
    fn set_capabilities(&mut self, capabilities: Capabilities) {
        debug!(?capabilities, "Seat capabilities");

        if capabilities.contains(Capabilities::POINTER) && self.pointer.is_none() {
            let id = self.devices.add(
                DeviceEntry::new("Wayland Pointer", DeviceType::Slave, InputSource::Mouse, Device::Pointer(None))
                    .with_cursor(),
            );
            self.devices.associate(id, Some(self.master_pointer));
            self.pointer = Some(id);
            self.gestures = self.settings.pointer_gestures;
            self.emit(Event::DeviceAdded(id));
        } else if !capabilities.contains(Capabilities::POINTER) {
            if let Some(id) = self.pointer.take() {
                self.gestures = false;
                self.remove_device(id);
            }
        }

        if capabilities.contains(Capabilities::KEYBOARD) && self.keyboard_device.is_none() {
            let id = self.devices.add(DeviceEntry::new(
                "Wayland Keyboard",
                DeviceType::Slave,
                InputSource::Keyboard,
                Device::Keyboard,
            ));
            self.devices.associate(id, Some(self.master_keyboard));
            self.keyboard_device = Some(id);
            self.emit(Event::DeviceAdded(id));
        } else if !capabilities.contains(Capabilities::KEYBOARD) {
            if let Some(id) = self.keyboard_device.take() {
                self.remove_device(id);
            }
        }

        if capabilities.contains(Capabilities::TOUCH) && self.touch.is_none() {
            let id = self.devices.add(DeviceEntry::new(
                "Wayland Touch",
                DeviceType::Slave,
                InputSource::Touchscreen,
                Device::Touch,
            ));
            self.devices.associate(id, Some(self.master_pointer));
            self.touch = Some(id);
            self.emit(Event::DeviceAdded(id));
        } else if !capabilities.contains(Capabilities::TOUCH) {
            if let Some(id) = self.touch.take() {
                self.remove_device(id);
            }
        }

        self.capabilities = capabilities;
    }

    fn remove_device(&mut self, id: DeviceId) {
        self.devices.associate(id, None);
        self.emit(Event::DeviceRemoved(id));
        self.devices.remove(id);
    }

    /// Tears the seat down: tablets go away, every capability is dropped and
    /// pending timers are cancelled.
    pub fn remove(&mut self) {
        let handles: Vec<TabletHandle> = self.tablets.iter().map(|t| t.handle).collect();
        for handle in handles {
            self.tablet_removed(handle);
        }
        self.set_capabilities(Capabilities::empty());
        self.stop_key_repeat();
        self.touches.clear();
        self.stop_cursor_animation(self.master_pointer);
    }

    /// `key_modifiers` plus the buttons held on `device`.
    fn device_modifiers(&self, device: DeviceId) -> ModifierType {
        let buttons = self.devices.pointer(device).map(|p| p.button_modifiers).unwrap_or_default();
        self.keyboard.key_modifiers | buttons
    }

    /// The device holding pointer state for `device`: itself for master
    /// pointers, its master for slaves.
    fn pointer_owner(&self, device: DeviceId) -> Option<DeviceId> {
        let entry = self.devices.get(device)?;
        if entry.pointer().is_some() {
            return Some(device);
        }
        if entry.device_type == DeviceType::Slave {
            let master = entry.associated?;
            return self.devices.pointer(master).map(|_| master);
        }
        None
    }

    pub fn query_state(&self, device: DeviceId) -> Option<DeviceState> {
        let owner = self.pointer_owner(device)?;
        let pointer = self.devices.pointer(owner)?;
        let coords = self.pointer_coords(pointer);
        Some(DeviceState {
            window: pointer.focus,
            x: coords.x,
            y: coords.y,
            x_root: coords.x_root,
            y_root: coords.y_root,
            mask: self.device_modifiers(owner),
        })
    }

    fn pointer_data(&self, device: DeviceId) -> Option<&PointerData> { self.devices.pointer(device) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::testing::*;
    use super::*;

    #[test]
    fn it_creates_core_devices() {
        let (seat, mut rx) = new_seat();
        let events = drain(&mut rx);
        assert_eq!(events, vec![
            Event::DeviceAdded(seat.master_pointer()),
            Event::DeviceAdded(seat.master_keyboard())
        ]);
        let pointer = seat.devices().get(seat.master_pointer()).unwrap();
        assert_eq!(pointer.name, "Core Pointer");
        assert!(pointer.has_cursor);
        assert_eq!(pointer.associated, Some(seat.master_keyboard()));
        assert_eq!(
            seat.devices().get(seat.master_keyboard()).unwrap().associated,
            Some(seat.master_pointer())
        );
        assert_eq!(seat.client_pointer(), Some(seat.master_pointer()));
    }

    #[test]
    fn it_adds_each_capability_once() {
        let (mut seat, mut rx) = new_seat();
        drain(&mut rx);

        seat.handle_event(SeatEvent::Capabilities { capabilities: Capabilities::POINTER.bits() });
        seat.handle_event(SeatEvent::Capabilities { capabilities: Capabilities::POINTER.bits() });
        let pointer = seat.pointer_device().unwrap();
        assert_eq!(drain(&mut rx), vec![Event::DeviceAdded(pointer)]);
        assert_eq!(seat.list_devices(DeviceType::Slave), vec![pointer]);
        assert_eq!(seat.devices().get(pointer).unwrap().associated, Some(seat.master_pointer()));

        seat.handle_event(SeatEvent::Capabilities { capabilities: 0 });
        seat.handle_event(SeatEvent::Capabilities { capabilities: 0 });
        assert_eq!(drain(&mut rx), vec![Event::DeviceRemoved(pointer)]);
        assert!(seat.pointer_device().is_none());
        assert!(!seat.devices().contains(pointer));
    }

    #[test]
    fn it_tracks_all_capabilities() {
        let (mut seat, mut rx) = new_seat();
        drain(&mut rx);
        seat.handle_event(SeatEvent::Capabilities { capabilities: Capabilities::all().bits() });
        let keyboard = seat.keyboard_device().unwrap();
        let touch = seat.touch_device().unwrap();
        assert_eq!(seat.devices().get(keyboard).unwrap().associated, Some(seat.master_keyboard()));
        assert_eq!(seat.devices().get(touch).unwrap().associated, Some(seat.master_pointer()));
        assert_eq!(drain(&mut rx).len(), 3);

        seat.handle_event(SeatEvent::Capabilities { capabilities: Capabilities::KEYBOARD.bits() });
        assert_eq!(drain(&mut rx).len(), 2);
        assert_eq!(seat.list_devices(DeviceType::Slave), vec![keyboard]);
        assert_eq!(seat.capabilities(), Capabilities::KEYBOARD);
    }

    #[test]
    fn it_tears_everything_down_on_removal() {
        let (mut seat, mut rx) = new_seat();
        seat.handle_event(SeatEvent::Capabilities { capabilities: Capabilities::all().bits() });
        add_tablet(&mut seat, 1, "Pad");
        drain(&mut rx);

        seat.remove();
        let removed = drain(&mut rx).into_iter().filter(|e| matches!(e, Event::DeviceRemoved(_))).count();
        assert_eq!(removed, 6);
        assert_eq!(seat.list_devices(DeviceType::Slave), vec![]);
        assert_eq!(seat.list_devices(DeviceType::Master), vec![seat.master_pointer(), seat.master_keyboard()]);
    }
}
