//! Drawing tablets and their tools.
//!
//! Every tablet becomes a pair of slave devices, one for the stylus end and
//! one for the eraser end, under a master pointer of its own. Tools are
//! announced separately and bound to a tablet when they come into
//! proximity of it.

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::device::{AxisFlags, AxisUse, Device, DeviceEntry, DeviceType, InputSource, ToolDevice};
use super::event::{Button, ButtonKind, Crossing, CrossingKind, CrossingMode, Motion, NotifyType, Proximity, ProximityKind};
use super::pointer::PointerData;
use super::{ButtonState, DeviceId, Event, Seat};
use crate::sys::keymap::{Keymap, ModifierType};
use crate::sys::window::{SurfaceId, WindowSystem};

const BTN_STYLUS: u32 = 0x14b;
const BTN_STYLUS2: u32 = 0x14c;

/// Compositor handle of a tablet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabletHandle(pub u32);

/// Compositor handle of a tablet tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolHandle(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, TryFromPrimitive, Serialize, Deserialize)]
#[repr(u32)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    #[default]
    Unknown = 0,
    Pen = 0x140,
    Eraser = 0x141,
    Brush = 0x142,
    Pencil = 0x143,
    Airbrush = 0x144,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum ToolCapability {
    Tilt = 1,
    Pressure = 2,
    Distance = 3,
}

impl ToolCapability {
    pub fn axes(self) -> AxisFlags {
        match self {
            ToolCapability::Tilt => AxisFlags::XTILT | AxisFlags::YTILT,
            ToolCapability::Pressure => AxisFlags::PRESSURE,
            ToolCapability::Distance => AxisFlags::DISTANCE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabletTool {
    pub serial: u64,
    pub hardware_id: u64,
    pub tool_type: ToolType,
    pub axes: AxisFlags,
}

/// A tool whose description is still arriving.
#[derive(Debug)]
pub struct PendingTool(TabletTool);

impl Default for PendingTool {
    fn default() -> Self {
        PendingTool(TabletTool {
            serial: 0,
            hardware_id: 0,
            tool_type: ToolType::Unknown,
            axes: AxisFlags::X | AxisFlags::Y,
        })
    }
}

/// A tablet whose description is still arriving.
#[derive(Debug, Default)]
pub struct PendingTablet {
    pub name: String,
    pub vid: u32,
    pub pid: u32,
    pub tablet_type: u32,
    pub path: Option<String>,
}

#[derive(Debug)]
pub struct TabletPair {
    pub handle: TabletHandle,
    pub name: String,
    pub vid: u32,
    pub pid: u32,
    pub path: Option<String>,
    pub master: DeviceId,
    pub stylus: DeviceId,
    pub eraser: DeviceId,
    /// Stylus or eraser, whichever end the tool in proximity is using.
    pub current_device: Option<DeviceId>,
    pub current_tool: Option<ToolHandle>,
    /// Latest value of every axis of `current_device`, flushed on frame.
    pub axes: Vec<f64>,
}

impl TabletPair {
    fn contains(&self, device: DeviceId) -> bool {
        self.master == device || self.stylus == device || self.eraser == device
    }
}

impl<S: WindowSystem, K: Keymap> Seat<S, K> {
    pub fn tablets(&self) -> &[TabletPair] { &self.tablets }

    pub fn tablet(&self, handle: TabletHandle) -> Option<&TabletPair> {
        self.tablets.iter().find(|t| t.handle == handle)
    }

    pub fn tool(&self, handle: ToolHandle) -> Option<&TabletTool> { self.tools.get(&handle) }

    pub(super) fn is_tablet_device(&self, device: DeviceId) -> bool {
        self.tablets.iter().any(|t| t.contains(device))
    }

    pub(super) fn tablet_added(&mut self, tablet: TabletHandle) {
        self.pending_tablets.insert(tablet, PendingTablet::default());
    }

    pub(super) fn tablet_name(&mut self, tablet: TabletHandle, name: String) {
        if let Some(pending) = self.pending_tablets.get_mut(&tablet) {
            pending.name = name;
        }
    }

    pub(super) fn tablet_id(&mut self, tablet: TabletHandle, vid: u32, pid: u32) {
        if let Some(pending) = self.pending_tablets.get_mut(&tablet) {
            pending.vid = vid;
            pending.pid = pid;
        }
    }

    pub(super) fn tablet_type(&mut self, tablet: TabletHandle, tablet_type: u32) {
        if let Some(pending) = self.pending_tablets.get_mut(&tablet) {
            pending.tablet_type = tablet_type;
        }
    }

    pub(super) fn tablet_path(&mut self, tablet: TabletHandle, path: String) {
        if let Some(pending) = self.pending_tablets.get_mut(&tablet) {
            pending.path = Some(path);
        }
    }

    pub(super) fn tablet_done(&mut self, tablet: TabletHandle) {
        let Some(pending) = self.pending_tablets.remove(&tablet) else {
            warn!(?tablet, "Done for a tablet that was never added");
            return;
        };
        let name = pending.name;

        let master = self.devices.add(
            DeviceEntry::new(
                format!("Master pointer for {name}"),
                DeviceType::Master,
                InputSource::Mouse,
                Device::Pointer(Some(Box::default())),
            )
            .with_cursor(),
        );
        self.emit(Event::DeviceAdded(master));
        let stylus = self.devices.add(DeviceEntry::new(
            name.clone(),
            DeviceType::Slave,
            InputSource::Pen,
            Device::TabletTool(ToolDevice::default()),
        ));
        self.emit(Event::DeviceAdded(stylus));
        let eraser = self.devices.add(DeviceEntry::new(
            format!("{name} (Eraser)"),
            DeviceType::Slave,
            InputSource::Eraser,
            Device::TabletTool(ToolDevice::default()),
        ));
        self.emit(Event::DeviceAdded(eraser));

        self.devices.associate(master, Some(self.master_keyboard));
        self.devices.associate(stylus, Some(master));
        self.devices.associate(eraser, Some(master));

        debug!(?tablet, %name, vid = pending.vid, pid = pending.pid, "Tablet ready");
        self.tablets.push(TabletPair {
            handle: tablet,
            name,
            vid: pending.vid,
            pid: pending.pid,
            path: pending.path,
            master,
            stylus,
            eraser,
            current_device: None,
            current_tool: None,
            axes: Vec::new(),
        });
    }

    pub(super) fn tablet_removed(&mut self, tablet: TabletHandle) {
        if self.pending_tablets.remove(&tablet).is_some() {
            return;
        }
        let Some(index) = self.tablets.iter().position(|t| t.handle == tablet) else {
            return;
        };
        let pair = self.tablets.remove(index);
        self.stop_cursor_animation(pair.master);

        for device in [pair.stylus, pair.eraser, pair.master] {
            self.emit(Event::DeviceRemoved(device));
        }
        for device in [pair.master, pair.stylus, pair.eraser] {
            self.devices.associate(device, None);
            self.devices.remove(device);
        }
        debug!(?tablet, name = %pair.name, "Tablet removed");
    }

    pub(super) fn tool_added(&mut self, tool: ToolHandle) { self.pending_tools.insert(tool, PendingTool::default()); }

    pub(super) fn tool_type(&mut self, tool: ToolHandle, tool_type: u32) {
        if let Some(pending) = self.pending_tools.get_mut(&tool) {
            pending.0.tool_type = ToolType::try_from(tool_type).unwrap_or_default();
        }
    }

    pub(super) fn tool_serial(&mut self, tool: ToolHandle, msb: u32, lsb: u32) {
        if let Some(pending) = self.pending_tools.get_mut(&tool) {
            pending.0.serial = (u64::from(msb) << 32) | u64::from(lsb);
        }
    }

    pub(super) fn tool_hardware_id(&mut self, tool: ToolHandle, msb: u32, lsb: u32) {
        if let Some(pending) = self.pending_tools.get_mut(&tool) {
            pending.0.hardware_id = (u64::from(msb) << 32) | u64::from(lsb);
        }
    }

    pub(super) fn tool_capability(&mut self, tool: ToolHandle, capability: u32) {
        let Some(pending) = self.pending_tools.get_mut(&tool) else { return };
        match ToolCapability::try_from(capability) {
            Ok(capability) => pending.0.axes |= capability.axes(),
            Err(_) => trace!(capability, "Ignoring tool capability"),
        }
    }

    pub(super) fn tool_done(&mut self, tool: ToolHandle) {
        let Some(PendingTool(done)) = self.pending_tools.remove(&tool) else { return };
        debug!(?tool, serial = done.serial, tool_type = ?done.tool_type, axes = ?done.axes, "Tool ready");
        self.tools.insert(tool, done);
    }

    pub(super) fn tool_removed(&mut self, tool: ToolHandle) {
        self.pending_tools.remove(&tool);
        self.tools.remove(&tool);
        for pair in &mut self.tablets {
            if pair.current_tool == Some(tool) {
                pair.current_tool = None;
            }
        }
    }

    fn pair_for_tool(&self, tool: ToolHandle) -> Option<usize> {
        self.tablets.iter().position(|t| t.current_tool == Some(tool))
    }

    fn pair_pointer(&self, index: usize) -> Option<&PointerData> {
        self.devices.pointer(self.tablets.get(index)?.master)
    }

    fn pair_pointer_mut(&mut self, index: usize) -> Option<&mut PointerData> {
        let master = self.tablets.get(index)?.master;
        self.devices.pointer_mut(master)
    }

    /// Rebuilds the axes of the device the tool is using from the tool's
    /// capabilities and copies them onto the pair's master.
    fn clone_tool_axes(&mut self, index: usize, axes: AxisFlags) {
        let Some(pair) = self.tablets.get(index) else { return };
        let (Some(device), master) = (pair.current_device, pair.master) else { return };

        self.devices.reset_axes(device);
        self.devices.add_axis(device, AxisUse::X, 0.0, 0.0, 0.0);
        self.devices.add_axis(device, AxisUse::Y, 0.0, 0.0, 0.0);
        if axes.intersects(AxisFlags::XTILT | AxisFlags::YTILT) {
            self.devices.add_axis(device, AxisUse::XTilt, -65535.0, 65535.0, 0.0);
            self.devices.add_axis(device, AxisUse::YTilt, -65535.0, 65535.0, 0.0);
        }
        if axes.contains(AxisFlags::DISTANCE) {
            self.devices.add_axis(device, AxisUse::Distance, 0.0, 65535.0, 0.0);
        }
        if axes.contains(AxisFlags::PRESSURE) {
            self.devices.add_axis(device, AxisUse::Pressure, 0.0, 65535.0, 0.0);
        }
        let count = self.devices.get(device).map_or(0, |d| d.axes.len());
        self.devices.mimic_axes(device, master);
        if let Some(pair) = self.tablets.get_mut(index) {
            pair.axes = vec![0.0; count];
        }
    }

    pub(super) fn tool_proximity_in(
        &mut self,
        tool: ToolHandle,
        serial: u32,
        time: u32,
        tablet: TabletHandle,
        surface: SurfaceId,
    ) {
        let Some(index) = self.tablets.iter().position(|t| t.handle == tablet) else { return };
        let Some(tool_info) = self.tools.get(&tool).cloned() else {
            warn!(?tool, "Proximity in for an unknown tool");
            return;
        };
        let Some(window) = self.system.window_for_surface(surface) else { return };
        self.update_serial(serial);

        let pair = &mut self.tablets[index];
        let device = if tool_info.tool_type == ToolType::Eraser { pair.eraser } else { pair.stylus };
        pair.current_device = Some(device);
        pair.current_tool = Some(tool);
        let master = pair.master;

        if let Some(pointer) = self.pair_pointer_mut(index) {
            pointer.enter_serial = serial;
            pointer.focus = Some(window);
        }
        if let Some(tools) = self.devices.get_mut(device).and_then(|d| d.tool_device_mut()) {
            if tools.lookup_tool(tool_info.serial).is_none() {
                tools.tools.push(tool_info.clone());
            }
            tools.current_tool = Some(tool_info.serial);
        }
        self.clone_tool_axes(index, tool_info.axes);

        self.emit(Event::Proximity(Proximity {
            kind: ProximityKind::In,
            window,
            device: master,
            source_device: device,
            time,
        }));

        self.update_cursor(master);

        let Some(pointer) = self.pair_pointer(index) else { return };
        let event = Event::Crossing(Crossing {
            kind: CrossingKind::Enter,
            window,
            subwindow: None,
            device: master,
            source_device: device,
            time,
            mode: CrossingMode::Normal,
            detail: NotifyType::Nonlinear,
            focus: true,
            state: self.device_modifiers(self.master_pointer),
            coords: self.pointer_coords(pointer),
        });
        self.emit(event);
    }

    pub(super) fn tool_proximity_out(&mut self, tool: ToolHandle, time: u32) {
        let Some(index) = self.pair_for_tool(tool) else { return };
        let Some(pointer) = self.pair_pointer(index) else { return };
        let Some(window) = pointer.focus else { return };
        let pair = &self.tablets[index];
        let (master, Some(device)) = (pair.master, pair.current_device) else { return };

        let event = Event::Crossing(Crossing {
            kind: CrossingKind::Leave,
            window,
            subwindow: None,
            device: master,
            source_device: device,
            time,
            mode: CrossingMode::Normal,
            detail: NotifyType::Nonlinear,
            focus: true,
            state: self.device_modifiers(self.master_pointer),
            coords: self.pointer_coords(pointer),
        });
        self.emit(event);
        self.emit(Event::Proximity(Proximity {
            kind: ProximityKind::Out,
            window,
            device: master,
            source_device: device,
            time,
        }));

        self.stop_cursor_animation(master);
        self.update_cursor(master);
        if let Some(pointer) = self.pair_pointer_mut(index) {
            pointer.focus = None;
        }
        self.tablets[index].current_tool = None;
    }

    pub(super) fn tool_motion(&mut self, tool: ToolHandle, time: u32, x: f64, y: f64) {
        let Some(index) = self.pair_for_tool(tool) else { return };
        if let Some(pointer) = self.pair_pointer_mut(index) {
            pointer.time = time;
            pointer.surface_x = x;
            pointer.surface_y = y;
        }
    }

    fn tablet_button_event(&self, index: usize, kind: ButtonKind, button: u32) -> Option<Event> {
        let pair = self.tablets.get(index)?;
        let pointer = self.pair_pointer(index)?;
        Some(Event::Button(Button {
            kind,
            window: pointer.focus?,
            device: pair.master,
            source_device: pair.current_device?,
            time: pointer.time,
            state: self.device_modifiers(pair.master),
            button,
            coords: self.pointer_coords(pointer),
            axes: Some(pair.axes.clone()),
            send_event: false,
        }))
    }

    pub(super) fn tool_down(&mut self, tool: ToolHandle, serial: u32, time: u32) {
        let Some(index) = self.pair_for_tool(tool) else { return };
        if self.pair_pointer(index).and_then(|p| p.focus).is_none() {
            return;
        }
        self.update_serial(serial);
        if let Some(pointer) = self.pair_pointer_mut(index) {
            pointer.time = time;
            pointer.press_serial = serial;
        }
        if let Some(event) = self.tablet_button_event(index, ButtonKind::Press, 1) {
            self.emit(event);
        }
        if let Some(pointer) = self.pair_pointer_mut(index) {
            pointer.button_modifiers |= ModifierType::BUTTON1;
        }
    }

    pub(super) fn tool_up(&mut self, tool: ToolHandle, serial: u32) {
        let Some(index) = self.pair_for_tool(tool) else { return };
        if self.pair_pointer(index).and_then(|p| p.focus).is_none() {
            return;
        }
        self.update_serial(serial);
        let time = self.now_ms();
        if let Some(pointer) = self.pair_pointer_mut(index) {
            pointer.time = time;
            pointer.press_serial = serial;
        }
        if let Some(event) = self.tablet_button_event(index, ButtonKind::Release, 1) {
            self.emit(event);
        }
        if let Some(pointer) = self.pair_pointer_mut(index) {
            pointer.button_modifiers &= !ModifierType::BUTTON1;
        }
    }

    /// Stores the translated value of one axis until the next frame.
    fn set_tool_axis(&mut self, index: usize, axis_use: AxisUse, value: f64) {
        let Some(pair) = self.tablets.get(index) else { return };
        let Some(device) = pair.current_device else { return };
        let Some(axis) = self.devices.get(device).and_then(|d| d.axis_index(axis_use)) else {
            trace!(?axis_use, "Tool has no such axis");
            return;
        };
        let Some(translated) = self.devices.translate_axis(device, axis, value) else { return };
        if let Some(slot) = self.tablets[index].axes.get_mut(axis) {
            *slot = translated;
        }
    }

    pub(super) fn tool_pressure(&mut self, tool: ToolHandle, time: u32, pressure: u32) {
        let Some(index) = self.pair_for_tool(tool) else { return };
        if let Some(pointer) = self.pair_pointer_mut(index) {
            pointer.time = time;
        }
        self.set_tool_axis(index, AxisUse::Pressure, f64::from(pressure));
    }

    pub(super) fn tool_distance(&mut self, tool: ToolHandle, time: u32, distance: u32) {
        let Some(index) = self.pair_for_tool(tool) else { return };
        if let Some(pointer) = self.pair_pointer_mut(index) {
            pointer.time = time;
        }
        self.set_tool_axis(index, AxisUse::Distance, f64::from(distance));
    }

    pub(super) fn tool_tilt(&mut self, tool: ToolHandle, time: u32, tilt_x: i32, tilt_y: i32) {
        let Some(index) = self.pair_for_tool(tool) else { return };
        if let Some(pointer) = self.pair_pointer_mut(index) {
            pointer.time = time;
        }
        self.set_tool_axis(index, AxisUse::XTilt, f64::from(tilt_x));
        self.set_tool_axis(index, AxisUse::YTilt, f64::from(tilt_y));
    }

    pub(super) fn tool_button(&mut self, tool: ToolHandle, serial: u32, time: u32, button: u32, state: ButtonState) {
        let Some(index) = self.pair_for_tool(tool) else { return };
        let Some(pointer) = self.pair_pointer_mut(index) else { return };
        if pointer.focus.is_none() {
            return;
        }
        pointer.time = time;
        pointer.press_serial = serial;

        let button = match button {
            BTN_STYLUS => 3,
            BTN_STYLUS2 => 2,
            _ => return,
        };
        let kind = match state {
            ButtonState::Pressed => ButtonKind::Press,
            ButtonState::Released => ButtonKind::Release,
        };
        if let Some(event) = self.tablet_button_event(index, kind, button) {
            self.emit(event);
        }
    }

    /// Flushes everything reported since the last frame as one motion event.
    pub(super) fn tool_frame(&mut self, tool: ToolHandle) {
        let Some(index) = self.pair_for_tool(tool) else { return };
        let pair = &self.tablets[index];
        let Some(pointer) = self.pair_pointer(index) else { return };
        let (Some(window), Some(device)) = (pointer.focus, pair.current_device) else { return };
        let event = Event::Motion(Motion {
            window,
            device: pair.master,
            source_device: device,
            time: pointer.time,
            state: self.device_modifiers(pair.master),
            coords: self.pointer_coords(pointer),
            axes: Some(pair.axes.clone()),
        });
        self.emit(event);
    }
}
