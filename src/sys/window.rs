use serde::{Deserialize, Serialize};
use tracing::trace;

use super::cursor::Cursor;
use super::geometry::{Point, Rect, Size};

/// A toplevel or popup window known to the windowing layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

/// A protocol surface. Surfaces that do not belong to one of our windows are
/// ignored by the seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputId(pub u32);

/// Everything the seat and the positioning solver need from the windowing
/// layer. The seat never owns windows; it only looks them up.
pub trait WindowSystem {
    fn window_for_surface(&self, surface: SurfaceId) -> Option<WindowId>;
    /// Root coordinates of the window's top-left corner.
    fn root_origin(&self, window: WindowId) -> Point;
    fn window_size(&self, window: WindowId) -> Option<Size>;
    fn move_window(&mut self, window: WindowId, position: Point);
    fn monitor_at_point(&self, point: Point) -> Option<usize>;
    fn monitor_work_area(&self, monitor: usize) -> Option<Rect>;
    fn output_scale(&self, output: OutputId) -> i32;
    /// Attaches `cursor`'s image `image_index` to the pointer surface.
    fn commit_cursor(&mut self, enter_serial: u32, cursor: &Cursor, image_index: usize);
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Monitor {
    pub geometry: Rect,
    /// Defaults to the full geometry when no panels reserve space.
    pub workarea: Option<Rect>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VirtualWindow {
    pub id: WindowId,
    pub surface: SurfaceId,
    pub frame: Rect,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Output {
    pub id: OutputId,
    pub scale: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CursorCommit {
    pub enter_serial: u32,
    pub name: String,
    pub image_index: usize,
    pub scale: i32,
}

/// An in-memory window system: a fixed monitor layout plus windows that can
/// be moved. It records cursor commits so callers can observe them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VirtualDisplay {
    #[serde(default)]
    pub monitors: Vec<Monitor>,
    #[serde(default)]
    pub windows: Vec<VirtualWindow>,
    #[serde(default)]
    pub outputs: Vec<Output>,
    #[serde(skip)]
    pub cursor_commits: Vec<CursorCommit>,
}

impl VirtualDisplay {
    pub fn with_monitor(mut self, geometry: Rect, workarea: Option<Rect>) -> Self {
        self.monitors.push(Monitor { geometry, workarea });
        self
    }

    pub fn with_window(mut self, id: WindowId, surface: SurfaceId, frame: Rect) -> Self {
        self.windows.push(VirtualWindow { id, surface, frame });
        self
    }

    pub fn with_output(mut self, id: OutputId, scale: i32) -> Self {
        self.outputs.push(Output { id, scale });
        self
    }

    pub fn parse(buf: &str) -> anyhow::Result<Self> { Ok(toml::from_str(buf)?) }

    pub fn window(&self, id: WindowId) -> Option<&VirtualWindow> {
        self.windows.iter().find(|w| w.id == id)
    }
}

impl WindowSystem for VirtualDisplay {
    fn window_for_surface(&self, surface: SurfaceId) -> Option<WindowId> {
        self.windows.iter().find(|w| w.surface == surface).map(|w| w.id)
    }

    fn root_origin(&self, window: WindowId) -> Point {
        self.window(window).map(|w| w.frame.origin()).unwrap_or_default()
    }

    fn window_size(&self, window: WindowId) -> Option<Size> { self.window(window).map(|w| w.frame.size()) }

    fn move_window(&mut self, window: WindowId, position: Point) {
        if let Some(w) = self.windows.iter_mut().find(|w| w.id == window) {
            trace!(?window, ?position, "Moving window");
            w.frame.x = position.x;
            w.frame.y = position.y;
        }
    }

    fn monitor_at_point(&self, point: Point) -> Option<usize> {
        if let Some(index) = self.monitors.iter().position(|m| m.geometry.contains(point)) {
            return Some(index);
        }
        self.monitors
            .iter()
            .enumerate()
            .min_by_key(|(_, m)| m.geometry.distance_squared(point))
            .map(|(index, _)| index)
    }

    fn monitor_work_area(&self, monitor: usize) -> Option<Rect> {
        self.monitors.get(monitor).map(|m| m.workarea.unwrap_or(m.geometry))
    }

    fn output_scale(&self, output: OutputId) -> i32 {
        self.outputs.iter().find(|o| o.id == output).map_or(1, |o| o.scale)
    }

    fn commit_cursor(&mut self, enter_serial: u32, cursor: &Cursor, image_index: usize) {
        self.cursor_commits.push(CursorCommit {
            enter_serial,
            name: cursor.name.clone(),
            image_index,
            scale: cursor.scale,
        });
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn it_picks_the_nearest_monitor_for_offscreen_points() {
        let display = VirtualDisplay::default()
            .with_monitor(Rect::new(0, 0, 1000, 800), Some(Rect::new(0, 30, 1000, 770)))
            .with_monitor(Rect::new(1000, 0, 1000, 800), None);
        assert_eq!(display.monitor_at_point(Point::new(1500, 10)), Some(1));
        assert_eq!(display.monitor_at_point(Point::new(-50, 400)), Some(0));
        assert_eq!(display.monitor_work_area(0), Some(Rect::new(0, 30, 1000, 770)));
        assert_eq!(display.monitor_work_area(1), Some(Rect::new(1000, 0, 1000, 800)));
        assert_eq!(VirtualDisplay::default().monitor_at_point(Point::new(0, 0)), None);
    }

    #[test]
    fn it_loads_a_layout_from_toml() {
        let display = VirtualDisplay::parse(
            r#"
            [[monitors]]
            geometry = { x = 0, y = 0, width = 1920, height = 1080 }

            [[windows]]
            id = 7
            surface = 70
            frame = { x = 10, y = 20, width = 300, height = 200 }

            [[outputs]]
            id = 1
            scale = 2
            "#,
        )
        .unwrap();
        assert_eq!(display.window_for_surface(SurfaceId(70)), Some(WindowId(7)));
        assert_eq!(display.window_for_surface(SurfaceId(71)), None);
        assert_eq!(display.root_origin(WindowId(7)), Point::new(10, 20));
        assert_eq!(display.output_scale(OutputId(1)), 2);
        assert_eq!(display.output_scale(OutputId(9)), 1);
    }
}
