use std::any::Any;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::option::AttachmentOption;
use super::solver::Placement;
use crate::sys::geometry::{Point, Rect};
use crate::sys::window::WindowId;

/// Space reserved around a rectangle. Negative values shrink it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Border {
    #[serde(default)]
    pub top: i32,
    #[serde(default)]
    pub left: i32,
    #[serde(default)]
    pub right: i32,
    #[serde(default)]
    pub bottom: i32,
}

/// A [`Border`] widened to `i64`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct WideBorder {
    pub top: i64,
    pub left: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Border {
    pub(crate) fn widen(self) -> WideBorder {
        WideBorder {
            top: i64::from(self.top),
            left: i64::from(self.left),
            right: i64::from(self.right),
            bottom: i64::from(self.bottom),
        }
    }

    pub const fn new(top: i32, left: i32, right: i32, bottom: i32) -> Self {
        Self { top, left, right, bottom }
    }
}

/// Advisory window role, carried along for the window-move collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowTypeHint {
    #[default]
    Normal,
    Dialog,
    Menu,
    Toolbar,
    Splashscreen,
    Utility,
    Dock,
    Desktop,
    DropdownMenu,
    PopupMenu,
    Tooltip,
    Notification,
    Combo,
    Dnd,
}

pub type UserData = Rc<dyn Any>;

/// Called after a window was moved with the final placement.
pub type PositionCallback =
    Box<dyn Fn(WindowId, &AttachmentParameters, &Placement, Option<&UserData>)>;

/// How to position a window relative to an attachment rectangle.
///
/// Cloning (and [`AttachmentParameters::copy`]) duplicates the geometry and
/// both option lists but not the position callback or its user data.
#[derive(Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentParameters {
    #[serde(default)]
    origin: Point,
    #[serde(default)]
    rectangle: Option<Rect>,
    #[serde(default)]
    attachment_margin: Border,
    #[serde(default)]
    window_margin: Border,
    #[serde(default)]
    window_padding: Border,
    #[serde(default)]
    window_offset: Point,
    #[serde(default)]
    window_type_hint: WindowTypeHint,
    #[serde(default)]
    right_to_left: bool,
    #[serde(default)]
    primary: Vec<AttachmentOption>,
    #[serde(default)]
    secondary: Vec<AttachmentOption>,
    #[serde(skip)]
    callback: Option<PositionCallback>,
    #[serde(skip)]
    user_data: Option<UserData>,
}

impl AttachmentParameters {
    pub fn new() -> Self { Self::default() }

    /// Deep copy of `params`, if any.
    pub fn copy(params: Option<&Self>) -> Option<Self> { params.cloned() }

    pub fn origin(&self) -> Point { self.origin }

    pub fn rectangle(&self) -> Option<Rect> { self.rectangle }

    pub fn attachment_margin(&self) -> Border { self.attachment_margin }

    pub fn window_margin(&self) -> Border { self.window_margin }

    pub fn window_padding(&self) -> Border { self.window_padding }

    pub fn window_offset(&self) -> Point { self.window_offset }

    pub fn window_type_hint(&self) -> WindowTypeHint { self.window_type_hint }

    pub fn is_right_to_left(&self) -> bool { self.right_to_left }

    pub fn primary_options(&self) -> &[AttachmentOption] { &self.primary }

    pub fn secondary_options(&self) -> &[AttachmentOption] { &self.secondary }

    pub fn callback(&self) -> Option<&PositionCallback> { self.callback.as_ref() }

    pub fn user_data(&self) -> Option<&UserData> { self.user_data.as_ref() }

    /// Root-coordinate origin of the rectangle's coordinate system.
    pub fn set_attachment_origin(&mut self, origin: Option<Point>) {
        self.origin = origin.unwrap_or_default();
    }

    /// `None` clears the rectangle, after which nothing can be placed.
    pub fn set_attachment_rectangle(&mut self, rectangle: Option<Rect>) { self.rectangle = rectangle; }

    pub fn set_attachment_margin(&mut self, margin: Option<Border>) {
        self.attachment_margin = margin.unwrap_or_default();
    }

    pub fn set_window_margin(&mut self, margin: Option<Border>) {
        self.window_margin = margin.unwrap_or_default();
    }

    pub fn set_window_padding(&mut self, padding: Option<Border>) {
        self.window_padding = padding.unwrap_or_default();
    }

    pub fn set_window_offset(&mut self, offset: Option<Point>) {
        self.window_offset = offset.unwrap_or_default();
    }

    pub fn set_window_type_hint(&mut self, hint: WindowTypeHint) { self.window_type_hint = hint; }

    pub fn set_right_to_left(&mut self, right_to_left: bool) { self.right_to_left = right_to_left; }

    /// Appends to the primary options, stopping at the first `EndOptions`.
    pub fn add_primary_options(&mut self, options: &[AttachmentOption]) {
        append_options(&mut self.primary, options);
    }

    /// Appends to the secondary options, stopping at the first `EndOptions`.
    pub fn add_secondary_options(&mut self, options: &[AttachmentOption]) {
        append_options(&mut self.secondary, options);
    }

    /// Installs `callback`. Different user data replaces (and drops) the
    /// data held so far.
    pub fn set_position_callback(
        &mut self,
        callback: Option<PositionCallback>,
        user_data: Option<UserData>,
    ) {
        self.callback = callback;

        let same = match (&self.user_data, &user_data) {
            (Some(old), Some(new)) => Rc::ptr_eq(old, new),
            (None, None) => true,
            _ => false,
        };
        if !same {
            self.user_data = user_data;
        } else if user_data.is_some() {
            warn!("parameters already owns user data");
        }
    }
}

fn append_options(list: &mut Vec<AttachmentOption>, options: &[AttachmentOption]) {
    list.extend(options.iter().copied().take_while(|o| *o != AttachmentOption::EndOptions));
}

impl Clone for AttachmentParameters {
    fn clone(&self) -> Self {
        AttachmentParameters {
            origin: self.origin,
            rectangle: self.rectangle,
            attachment_margin: self.attachment_margin,
            window_margin: self.window_margin,
            window_padding: self.window_padding,
            window_offset: self.window_offset,
            window_type_hint: self.window_type_hint,
            right_to_left: self.right_to_left,
            primary: self.primary.clone(),
            secondary: self.secondary.clone(),
            callback: None,
            user_data: None,
        }
    }
}

impl fmt::Debug for AttachmentParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentParameters")
            .field("origin", &self.origin)
            .field("rectangle", &self.rectangle)
            .field("attachment_margin", &self.attachment_margin)
            .field("window_margin", &self.window_margin)
            .field("window_padding", &self.window_padding)
            .field("window_offset", &self.window_offset)
            .field("window_type_hint", &self.window_type_hint)
            .field("right_to_left", &self.right_to_left)
            .field("primary", &self.primary)
            .field("secondary", &self.secondary)
            .field("has_callback", &self.callback.is_some())
            .field("has_user_data", &self.user_data.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::attachment::option::AttachmentOption::*;

    #[test]
    fn it_stops_appending_at_end_options() {
        let mut params = AttachmentParameters::new();
        params.add_primary_options(&[AttachBottomEdge, AttachTopEdge, EndOptions, AttachLeftEdge]);
        params.add_primary_options(&[ForceFirstOption]);
        params.add_secondary_options(&[EndOptions, AlignLeftEdges]);
        assert_eq!(params.primary_options(), &[AttachBottomEdge, AttachTopEdge, ForceFirstOption]);
        assert_eq!(params.secondary_options(), &[]);
    }

    #[test]
    fn it_copies_deeply_without_the_callback() {
        let mut params = AttachmentParameters::new();
        params.set_attachment_rectangle(Some(Rect::new(1, 2, 3, 4)));
        params.set_window_padding(Some(Border::new(1, 2, 3, 4)));
        params.add_primary_options(&[AttachBottomEdge]);
        params.add_secondary_options(&[AlignLeftEdges]);
        let callback: PositionCallback = Box::new(|_: WindowId, _: &AttachmentParameters, _: &Placement, _: Option<&UserData>| {});
        params.set_position_callback(Some(callback), Some(Rc::new(5u32) as UserData));

        let mut copy = AttachmentParameters::copy(Some(&params)).unwrap();
        copy.add_primary_options(&[AttachTopEdge]);
        copy.add_secondary_options(&[AlignRightEdges]);

        assert_eq!(params.primary_options(), &[AttachBottomEdge]);
        assert_eq!(params.secondary_options(), &[AlignLeftEdges]);
        assert_eq!(copy.primary_options(), &[AttachBottomEdge, AttachTopEdge]);
        assert_eq!(copy.rectangle(), Some(Rect::new(1, 2, 3, 4)));
        assert_eq!(copy.window_padding(), Border::new(1, 2, 3, 4));
        assert!(copy.callback().is_none());
        assert!(copy.user_data().is_none());
        assert!(params.callback().is_some());

        assert!(AttachmentParameters::copy(None).is_none());
    }

    #[test]
    fn it_releases_replaced_user_data() {
        thread_local! {
            static DROPS: Cell<u32> = const { Cell::new(0) };
        }
        struct Tracked;
        impl Drop for Tracked {
            fn drop(&mut self) { DROPS.with(|d| d.set(d.get() + 1)); }
        }

        let mut params = AttachmentParameters::new();
        let first: UserData = Rc::new(Tracked);
        params.set_position_callback(None, Some(first.clone()));
        drop(first);
        assert_eq!(DROPS.with(Cell::get), 0);

        let same = params.user_data().cloned();
        params.set_position_callback(None, same);
        assert_eq!(DROPS.with(Cell::get), 0);
        assert!(params.user_data().is_some());

        params.set_position_callback(None, Some(Rc::new(Tracked) as UserData));
        assert_eq!(DROPS.with(Cell::get), 1);

        drop(params);
        assert_eq!(DROPS.with(Cell::get), 2);
    }

    #[test]
    fn it_resets_optional_values_to_zero() {
        let mut params = AttachmentParameters::new();
        params.set_window_offset(Some(Point::new(3, 4)));
        params.set_window_offset(None);
        params.set_attachment_margin(Some(Border::new(1, 1, 1, 1)));
        params.set_attachment_margin(None);
        assert_eq!(params.window_offset(), Point::default());
        assert_eq!(params.attachment_margin(), Border::default());
        assert_eq!(params.window_type_hint(), WindowTypeHint::Normal);
    }
}
