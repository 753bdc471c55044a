use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use tracing::debug;

use super::pointer::PointerData;
use super::tablet::TabletTool;

new_key_type! { pub struct DeviceId; }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Master,
    Slave,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Mouse,
    Pen,
    Eraser,
    Keyboard,
    Touchscreen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisUse {
    X,
    Y,
    Pressure,
    XTilt,
    YTilt,
    Distance,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct AxisFlags: u32 {
        const X = 1 << 1;
        const Y = 1 << 2;
        const PRESSURE = 1 << 3;
        const XTILT = 1 << 4;
        const YTILT = 1 << 5;
        const DISTANCE = 1 << 7;
    }
}

/// Calibration of one device axis: raw values in `min_value..=max_value` map
/// linearly onto `min_axis..=max_axis`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AxisInfo {
    pub axis_use: AxisUse,
    pub min_value: f64,
    pub max_value: f64,
    pub resolution: f64,
    pub min_axis: f64,
    pub max_axis: f64,
}

impl AxisInfo {
    pub fn new(axis_use: AxisUse, min_value: f64, max_value: f64, resolution: f64) -> Self {
        let (min_axis, max_axis) = match axis_use {
            AxisUse::X | AxisUse::Y => (0.0, 0.0),
            AxisUse::XTilt | AxisUse::YTilt => (-1.0, 1.0),
            AxisUse::Pressure | AxisUse::Distance => (0.0, 1.0),
        };
        AxisInfo { axis_use, min_value, max_value, resolution, min_axis, max_axis }
    }

    /// `None` for position axes, which are reported in event coordinates
    /// instead.
    pub fn translate(&self, value: f64) -> Option<f64> {
        if matches!(self.axis_use, AxisUse::X | AxisUse::Y) {
            return None;
        }
        let width = self.max_value - self.min_value;
        if width == 0.0 {
            return Some(self.min_axis);
        }
        Some((self.max_axis - self.min_axis) * (value - self.min_value) / width + self.min_axis)
    }
}

/// Per-capability state of a device.
#[derive(Debug)]
pub enum Device {
    /// Master pointers carry the pointer state; slave pointers feed their
    /// master and carry none.
    Pointer(Option<Box<PointerData>>),
    Keyboard,
    Touch,
    TabletTool(ToolDevice),
}

#[derive(Debug, Default)]
pub struct ToolDevice {
    pub tools: Vec<TabletTool>,
    pub current_tool: Option<u64>,
}

impl ToolDevice {
    pub fn lookup_tool(&self, serial: u64) -> Option<&TabletTool> {
        self.tools.iter().find(|t| t.serial == serial)
    }
}

#[derive(Debug)]
pub struct DeviceEntry {
    pub name: String,
    pub device_type: DeviceType,
    pub source: InputSource,
    pub has_cursor: bool,
    pub associated: Option<DeviceId>,
    pub axes: Vec<AxisInfo>,
    pub kind: Device,
}

impl DeviceEntry {
    pub fn new(name: impl Into<String>, device_type: DeviceType, source: InputSource, kind: Device) -> Self {
        DeviceEntry {
            name: name.into(),
            device_type,
            source,
            has_cursor: false,
            associated: None,
            axes: Vec::new(),
            kind,
        }
    }

    pub fn with_cursor(mut self) -> Self {
        self.has_cursor = true;
        self
    }

    pub fn pointer(&self) -> Option<&PointerData> {
        match &self.kind {
            Device::Pointer(pointer) => pointer.as_deref(),
            _ => None,
        }
    }

    pub fn pointer_mut(&mut self) -> Option<&mut PointerData> {
        match &mut self.kind {
            Device::Pointer(pointer) => pointer.as_deref_mut(),
            _ => None,
        }
    }

    pub fn tool_device(&self) -> Option<&ToolDevice> {
        match &self.kind {
            Device::TabletTool(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn tool_device_mut(&mut self) -> Option<&mut ToolDevice> {
        match &mut self.kind {
            Device::TabletTool(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn axis_index(&self, axis_use: AxisUse) -> Option<usize> {
        self.axes.iter().position(|a| a.axis_use == axis_use)
    }
}

/// All devices of one seat, in the order they were added.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: SlotMap<DeviceId, DeviceEntry>,
    order: Vec<DeviceId>,
}

impl DeviceRegistry {
    pub fn add(&mut self, entry: DeviceEntry) -> DeviceId {
        let id = self.devices.insert(entry);
        self.order.push(id);
        debug!(?id, name = %self.devices[id].name, "Added device");
        id
    }

    pub fn remove(&mut self, id: DeviceId) -> Option<DeviceEntry> {
        self.order.retain(|d| *d != id);
        let entry = self.devices.remove(id)?;
        for other in self.devices.values_mut() {
            if other.associated == Some(id) {
                other.associated = None;
            }
        }
        debug!(?id, name = %entry.name, "Removed device");
        Some(entry)
    }

    pub fn get(&self, id: DeviceId) -> Option<&DeviceEntry> { self.devices.get(id) }

    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut DeviceEntry> { self.devices.get_mut(id) }

    pub fn contains(&self, id: DeviceId) -> bool { self.devices.contains_key(id) }

    pub fn len(&self) -> usize { self.devices.len() }

    pub fn is_empty(&self) -> bool { self.devices.is_empty() }

    pub fn pointer(&self, id: DeviceId) -> Option<&PointerData> { self.get(id)?.pointer() }

    pub fn pointer_mut(&mut self, id: DeviceId) -> Option<&mut PointerData> { self.get_mut(id)?.pointer_mut() }

    /// Links `id` with `master`, or unlinks it with `None`.
    pub fn associate(&mut self, id: DeviceId, master: Option<DeviceId>) {
        if let Some(entry) = self.devices.get_mut(id) {
            entry.associated = master;
        }
    }

    pub fn list(&self, device_type: DeviceType) -> Vec<DeviceId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.devices[*id].device_type == device_type)
            .collect()
    }

    /// The first master pointer, which is the seat's core pointer.
    pub fn client_pointer(&self) -> Option<DeviceId> {
        self.order.iter().copied().find(|id| {
            let d = &self.devices[*id];
            d.device_type == DeviceType::Master && d.source == InputSource::Mouse
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, &DeviceEntry)> {
        self.order.iter().map(|id| (*id, &self.devices[*id]))
    }

    pub fn reset_axes(&mut self, id: DeviceId) {
        if let Some(entry) = self.devices.get_mut(id) {
            entry.axes.clear();
        }
    }

    /// Appends an axis and returns its index.
    pub fn add_axis(&mut self, id: DeviceId, axis_use: AxisUse, min: f64, max: f64, resolution: f64) -> Option<usize> {
        let entry = self.devices.get_mut(id)?;
        entry.axes.push(AxisInfo::new(axis_use, min, max, resolution));
        Some(entry.axes.len() - 1)
    }

    /// Copies the axis layout of `from` onto `to`.
    pub fn mimic_axes(&mut self, from: DeviceId, to: DeviceId) {
        let Some(axes) = self.get(from).map(|d| d.axes.clone()) else {
            return;
        };
        if let Some(entry) = self.devices.get_mut(to) {
            entry.axes = axes;
        }
    }

    pub fn translate_axis(&self, id: DeviceId, index: usize, value: f64) -> Option<f64> {
        self.get(id)?.axes.get(index)?.translate(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn it_translates_raw_axis_values() {
        let pressure = AxisInfo::new(AxisUse::Pressure, 0.0, 65535.0, 0.0);
        assert_eq!(pressure.translate(65535.0), Some(1.0));
        assert_eq!(pressure.translate(0.0), Some(0.0));

        let tilt = AxisInfo::new(AxisUse::XTilt, -65535.0, 65535.0, 0.0);
        assert_eq!(tilt.translate(0.0), Some(0.0));
        assert_eq!(tilt.translate(-65535.0), Some(-1.0));

        assert_eq!(AxisInfo::new(AxisUse::X, 0.0, 0.0, 0.0).translate(5.0), None);
    }

    #[test]
    fn it_unlinks_slaves_when_their_master_goes_away() {
        let mut registry = DeviceRegistry::default();
        let master = registry.add(
            DeviceEntry::new("Core Pointer", DeviceType::Master, InputSource::Mouse, Device::Pointer(None)).with_cursor(),
        );
        let slave = registry.add(DeviceEntry::new(
            "Wayland Pointer",
            DeviceType::Slave,
            InputSource::Mouse,
            Device::Pointer(None),
        ));
        registry.associate(slave, Some(master));
        assert_eq!(registry.client_pointer(), Some(master));
        assert_eq!(registry.list(DeviceType::Slave), vec![slave]);

        registry.remove(master);
        assert_eq!(registry.get(slave).unwrap().associated, None);
        assert_eq!(registry.client_pointer(), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn it_mirrors_axes() {
        let mut registry = DeviceRegistry::default();
        let stylus = registry.add(DeviceEntry::new(
            "pen",
            DeviceType::Slave,
            InputSource::Pen,
            Device::TabletTool(ToolDevice::default()),
        ));
        let master = registry.add(DeviceEntry::new("master", DeviceType::Master, InputSource::Mouse, Device::Pointer(None)));
        registry.add_axis(stylus, AxisUse::X, 0.0, 0.0, 0.0);
        registry.add_axis(stylus, AxisUse::Y, 0.0, 0.0, 0.0);
        assert_eq!(registry.add_axis(stylus, AxisUse::Pressure, 0.0, 65535.0, 0.0), Some(2));
        registry.mimic_axes(stylus, master);
        assert_eq!(registry.get(master).unwrap().axis_index(AxisUse::Pressure), Some(2));
        assert_eq!(registry.translate_axis(master, 2, 32767.5), Some(0.5));
    }
}
