use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::option::{AttachmentOption, Axis};
use super::params::AttachmentParameters;
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::window::{WindowId, WindowSystem};

/// Where a single option would put the window along its axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trial {
    pub axis: Axis,
    pub value: i32,
    pub satisfiable: bool,
}

/// Outcome of a successful search. `offset` is how far the window was pushed
/// to keep it inside the bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Point,
    pub offset: Point,
    pub primary: AttachmentOption,
    pub secondary: AttachmentOption,
}

/// First and last satisfiable options seen during one pass, at most one of
/// each per axis.
#[derive(Default)]
struct Remembered {
    first: [Option<AttachmentOption>; 2],
    last: [Option<AttachmentOption>; 2],
}

impl Remembered {
    fn record(&mut self, option: AttachmentOption, axis: Axis) {
        match self.first {
            [None, _] => self.first[0] = Some(option),
            [Some(first), None] if first.axis() != Some(axis) => self.first[1] = Some(option),
            _ => {}
        }
        if let Some(last) = self.last[0] {
            if last.axis() != Some(axis) {
                self.last[1] = Some(last);
            }
        }
        self.last[0] = Some(option);
    }

    fn first_on(&self, axis: Axis) -> Option<AttachmentOption> {
        self.first.iter().flatten().copied().find(|o| o.axis() == Some(axis))
    }

    fn last_on(&self, axis: Axis) -> Option<AttachmentOption> {
        self.last.iter().flatten().copied().find(|o| o.axis() == Some(axis))
    }
}

fn nearest_before(options: &[AttachmentOption], index: usize, axis: Option<Axis>) -> Option<AttachmentOption> {
    options[..index].iter().rev().copied().find(|o| o.axis().is_some() && (axis.is_none() || o.axis() == axis))
}

fn saturate(value: i64) -> i32 { value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32 }

impl AttachmentParameters {
    /// Computes where `option` puts a `size` window along the option's axis
    /// and whether that fits inside `bounds`. Without bounds every
    /// positioning option is satisfiable.
    ///
    /// Returns `None` for control tokens and when there is no attachment
    /// rectangle.
    pub fn is_satisfiable(&self, option: AttachmentOption, size: Size, bounds: Option<Rect>) -> Option<Trial> {
        use AttachmentOption::*;

        let Some(r) = self.rectangle() else {
            warn!("no attachment rectangle");
            return None;
        };
        // Computed in i64; positions are clamped back into i32.
        let o = self.origin();
        let am = self.attachment_margin().widen();
        let wm = self.window_margin().widen();
        let wp = self.window_padding().widen();
        let off = self.window_offset();
        let (off_x, off_y) = (i64::from(off.x), i64::from(off.y));
        let (w, h) = (i64::from(size.width), i64::from(size.height));
        let (rw, rh) = (i64::from(r.width), i64::from(r.height));
        let x = i64::from(o.x) + i64::from(r.x);
        let y = i64::from(o.y) + i64::from(r.y);
        // Content width/height, i.e. without the padding.
        let cw = w - wp.left - wp.right;
        let ch = h - wp.top - wp.bottom;

        let (axis, value) = match option.base_option(self.is_right_to_left()) {
            AttachTopEdge => (Axis::Vertical, y - am.top - h - wm.bottom + wp.bottom + off_y),
            AttachLeftEdge => (Axis::Horizontal, x - am.left - w - wm.right + wp.right + off_x),
            AttachRightEdge => (Axis::Horizontal, x + rw + am.right + wm.left - wp.left + off_x),
            AttachBottomEdge => (Axis::Vertical, y + rh + am.bottom + wm.top - wp.top + off_y),
            AlignTopEdges => (Axis::Vertical, y - wp.top + off_y),
            AlignLeftEdges => (Axis::Horizontal, x - wp.left + off_x),
            AlignRightEdges => (Axis::Horizontal, x + rw - w + wp.right + off_x),
            AlignBottomEdges => (Axis::Vertical, y + rh - h + wp.bottom + off_y),
            CenterHorizontally => (Axis::Horizontal, x + rw / 2 - cw / 2 - wp.left + off_x),
            CenterVertically => (Axis::Vertical, y + rh / 2 - ch / 2 - wp.top + off_y),
            CenterOnTopEdge => (Axis::Vertical, y - ch / 2 - wp.top + off_y),
            CenterOnLeftEdge => (Axis::Horizontal, x - cw / 2 - wp.left + off_x),
            CenterOnRightEdge => (Axis::Horizontal, x + rw - cw / 2 - wp.left + off_x),
            CenterOnBottomEdge => (Axis::Vertical, y + rh - ch / 2 - wp.top + off_y),
            AttachAboveCenter => (Axis::Vertical, y + rh / 2 - h + wp.bottom + off_y),
            AttachBelowCenter => (Axis::Vertical, y + rh / 2 - wp.top + off_y),
            AttachLeftOfCenter => (Axis::Horizontal, x + rw / 2 - w + wp.right + off_x),
            AttachRightOfCenter => (Axis::Horizontal, x + rw / 2 - wp.left + off_x),
            control => {
                warn!(option = %control, "unexpected control option");
                return None;
            }
        };

        let satisfiable = match (bounds, axis) {
            (None, _) => true,
            (Some(b), Axis::Horizontal) => {
                i64::from(b.x) <= value && value + w <= i64::from(b.x) + i64::from(b.width)
            }
            (Some(b), Axis::Vertical) => {
                i64::from(b.y) <= value && value + h <= i64::from(b.y) + i64::from(b.height)
            }
        };
        let value = saturate(value);
        trace!(%option, ?axis, value, satisfiable, "Tried option");
        Some(Trial { axis, value, satisfiable })
    }

    /// Searches the primary options in order for one that is satisfiable (or
    /// forced) and has a matching secondary option on the other axis.
    pub fn choose_position(&self, size: Size, bounds: Option<Rect>) -> Option<Placement> {
        if self.rectangle().is_none() {
            warn!("no attachment rectangle");
            return None;
        }

        let options = self.primary_options();
        let mut remembered = Remembered::default();

        for (index, &entry) in options.iter().enumerate() {
            let (option, forced) = if entry == AttachmentOption::EndOptions {
                warn!("unexpected end_options in primary options");
                continue;
            } else if entry.is_force_first() {
                if entry.is_if_primary_forced() {
                    warn!(option = %entry, "only meaningful in secondary options");
                }
                let substitute = remembered.first[0]
                    .or_else(|| options.iter().copied().find(|o| o.axis().is_some()));
                let Some(substitute) = substitute else {
                    warn!(option = %entry, "nothing to force");
                    continue;
                };
                (substitute, true)
            } else if entry.is_force_last() {
                if entry.is_if_primary_forced() {
                    warn!(option = %entry, "only meaningful in secondary options");
                }
                let Some(substitute) = remembered.last[0].or_else(|| nearest_before(options, index, None))
                else {
                    warn!("started with {entry}");
                    continue;
                };
                (substitute, true)
            } else {
                (entry, false)
            };

            let Some(trial) = self.is_satisfiable(option, size, bounds) else {
                continue;
            };
            if trial.satisfiable {
                remembered.record(option, trial.axis);
            }
            if !trial.satisfiable && !forced {
                continue;
            }

            if let Some((secondary, value)) = self.choose_secondary(trial.axis, forced, size, bounds) {
                let position = match trial.axis {
                    Axis::Horizontal => Point::new(trial.value, value),
                    Axis::Vertical => Point::new(value, trial.value),
                };
                let (position, offset) = self.push_on_screen(position, size, bounds);
                debug!(%option, %secondary, ?position, ?offset, forced, "Chose position");
                return Some(Placement {
                    position,
                    offset,
                    primary: option,
                    secondary,
                });
            }
        }

        debug!("No satisfiable pair of options");
        None
    }

    fn choose_secondary(
        &self,
        primary_axis: Axis,
        primary_forced: bool,
        size: Size,
        bounds: Option<Rect>,
    ) -> Option<(AttachmentOption, i32)> {
        let options = self.secondary_options();
        let wanted = primary_axis.cross();
        let mut remembered = Remembered::default();

        for (index, &entry) in options.iter().enumerate() {
            if entry.axis() == Some(primary_axis) {
                continue;
            }

            let (option, forced) = if entry == AttachmentOption::EndOptions {
                warn!("unexpected end_options in secondary options");
                continue;
            } else if entry.is_force_first() {
                if entry.is_if_primary_forced() && !primary_forced {
                    continue;
                }
                let substitute = remembered
                    .first_on(wanted)
                    .or_else(|| options.iter().copied().find(|o| o.axis() == Some(wanted)));
                let Some(substitute) = substitute else { continue };
                (substitute, true)
            } else if entry.is_force_last() {
                if entry.is_if_primary_forced() && !primary_forced {
                    continue;
                }
                let substitute = match remembered.last_on(wanted) {
                    Some(option) => option,
                    None if index == 0 => {
                        warn!("started with {entry}");
                        continue;
                    }
                    None => match nearest_before(options, index, Some(wanted)) {
                        Some(option) => option,
                        None => continue,
                    },
                };
                (substitute, true)
            } else {
                (entry, false)
            };

            let Some(trial) = self.is_satisfiable(option, size, bounds) else {
                continue;
            };
            if trial.satisfiable {
                remembered.record(option, trial.axis);
            }
            if trial.satisfiable || forced {
                return Some((option, trial.value));
            }
        }
        None
    }

    /// Shifts `position` so the window (less its padding) lies inside
    /// `bounds`, returning the new position and the shift applied.
    fn push_on_screen(&self, position: Point, size: Size, bounds: Option<Rect>) -> (Point, Point) {
        let Some(b) = bounds else {
            return (position, Point::default());
        };
        let wp = self.window_padding().widen();
        let (mut x, mut y) = (i64::from(position.x), i64::from(position.y));
        let (w, h) = (i64::from(size.width), i64::from(size.height));
        let (bx, by) = (i64::from(b.x), i64::from(b.y));
        let (br, bb) = (bx + i64::from(b.width), by + i64::from(b.height));

        if x + w - wp.right > br {
            x = br - w + wp.right;
        }
        if x + wp.left < bx {
            x = bx - wp.left;
        }
        if y + h - wp.bottom > bb {
            y = bb - h + wp.bottom;
        }
        if y + wp.top < by {
            y = by - wp.top;
        }
        let offset = Point::new(saturate(x - i64::from(position.x)), saturate(y - i64::from(position.y)));
        (Point::new(saturate(x), saturate(y)), offset)
    }

    /// Like [`choose_position`](Self::choose_position), using `window`'s size
    /// and the work area of the monitor under the rectangle's center.
    pub fn choose_position_for_window<S: WindowSystem + ?Sized>(
        &self,
        window: WindowId,
        system: &S,
    ) -> Option<Placement> {
        let Some(rect) = self.rectangle() else {
            warn!("no attachment rectangle");
            return None;
        };
        let Some(size) = system.window_size(window) else {
            warn!(?window, "unknown window");
            return None;
        };
        let center = rect.center();
        let center =
            Point::new(self.origin().x.saturating_add(center.x), self.origin().y.saturating_add(center.y));
        let bounds = system.monitor_at_point(center).and_then(|m| system.monitor_work_area(m));
        self.choose_position(size, bounds)
    }
}

/// Moves `window` to the best position for `params` and reports it to the
/// parameters' callback. Does nothing when no position can be found.
pub fn move_using_attachment_parameters<S: WindowSystem + ?Sized>(
    system: &mut S,
    window: WindowId,
    params: Option<&AttachmentParameters>,
) -> Option<Placement> {
    let params = params?;
    if params.rectangle().is_none() {
        return None;
    }
    let placement = params.choose_position_for_window(window, &*system)?;
    system.move_window(window, placement.position);
    if let Some(callback) = params.callback() {
        callback(window, params, &placement, params.user_data());
    }
    Some(placement)
}
