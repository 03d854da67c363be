//! Coordinate spaces and the transforms between them.
//!
//! The diagram lives in four spaces:
//! - **data space**: where node, annotation and legend positions are stored.
//!   The y axis grows upward, as in the map coordinates networks are drawn from.
//! - **full-document space**: the content bounds padded out to the aspect ratio
//!   of the print medium (see [`aspect_fit`]).
//! - **current-view space**: the part of the data plane visible on the active target.
//! - **device space**: pixels (or egui points) of the active target, y grows downward.
//!
//! Document and view are both [`DataRect`]s; [`DeviceTransform`] maps one of them
//! onto a device rectangle.

use eframe::egui;
use serde::{Deserialize, Serialize};

/// A position in data units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DataPoint {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate, growing upward.
    pub y: f64,
}

impl DataPoint {
    /// Creates a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this point moved by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Returns the `(dx, dy)` that moves `other` onto `self`.
    pub fn delta_from(self, other: Self) -> (f64, f64) {
        (self.x - other.x, self.y - other.y)
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned rectangle in data units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataRect {
    /// Left edge.
    pub min_x: f64,
    /// Bottom edge.
    pub min_y: f64,
    /// Right edge.
    pub max_x: f64,
    /// Top edge.
    pub max_y: f64,
}

impl Default for DataRect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }
}

impl DataRect {
    /// Creates a rectangle from two corners given in any order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// Creates a rectangle of the given size centered on `center`.
    pub fn from_center(center: DataPoint, width: f64, height: f64) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            center.x + width / 2.0,
            center.y + height / 2.0,
        )
    }

    /// Smallest rectangle containing all `points`, or `None` for an empty iterator.
    pub fn bounding(points: impl IntoIterator<Item = DataPoint>) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<Self>, p| {
            Some(match acc {
                None => Self::new(p.x, p.y, p.x, p.y),
                Some(r) => r.include(p),
            })
        })
    }

    /// Width in data units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height in data units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center point.
    pub fn center(&self) -> DataPoint {
        DataPoint::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// Whether `p` lies inside or on the edge of this rectangle.
    pub fn contains(&self, p: DataPoint) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Grows the rectangle to include `p`.
    pub fn include(self, p: DataPoint) -> Self {
        Self {
            min_x: self.min_x.min(p.x),
            min_y: self.min_y.min(p.y),
            max_x: self.max_x.max(p.x),
            max_y: self.max_y.max(p.y),
        }
    }

    /// Smallest rectangle containing both rectangles.
    pub fn union(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grows each side by the matching buffer amount.
    pub fn expand(self, buffer: Buffer) -> Self {
        Self {
            min_x: self.min_x - buffer.left,
            min_y: self.min_y - buffer.bottom,
            max_x: self.max_x + buffer.right,
            max_y: self.max_y + buffer.top,
        }
    }

    /// Clamps `p` into the rectangle grown by `half_w`/`half_h` on each side.
    pub fn clamp_point(&self, p: DataPoint, half_w: f64, half_h: f64) -> DataPoint {
        DataPoint::new(
            clamp_axis(p.x, self.min_x - half_w, self.max_x + half_w),
            clamp_axis(p.y, self.min_y - half_h, self.max_y + half_h),
        )
    }

    /// Whether the rectangle has a strictly positive area.
    pub fn is_positive(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }
}

/// Clamp that tolerates an inverted range by collapsing it to its midpoint.
fn clamp_axis(v: f64, lo: f64, hi: f64) -> f64 {
    if lo > hi {
        (lo + hi) / 2.0
    } else {
        v.clamp(lo, hi)
    }
}

/// Padding between content and the edge of a medium, in data units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Buffer {
    /// Padding on the left.
    pub left: f64,
    /// Padding on the right.
    pub right: f64,
    /// Padding on the top.
    pub top: f64,
    /// Padding on the bottom.
    pub bottom: f64,
}

impl Buffer {
    /// The same padding on all four sides.
    pub const fn uniform(amount: f64) -> Self {
        Self {
            left: amount,
            right: amount,
            top: amount,
            bottom: amount,
        }
    }
}

/// Fits `content` (padded by `buffer`) to a medium with the given width/height ratio.
///
/// The axis that is already wide enough for the target aspect is kept exactly;
/// the other axis is grown to match the aspect and the content is centered on it
/// with half the slack on each side. If the content already exceeds the computed
/// size on an axis, that axis is kept verbatim and the result overflows the medium
/// in that direction only.
///
/// # Arguments
///
/// * `content` - Bounding box of everything to show, in data units
/// * `medium_aspect` - Width divided by height of the target device area
/// * `buffer` - Extra padding around the content, in data units
///
/// # Returns
///
/// A data rectangle that contains the padded content and (unless it overflows)
/// has the medium's aspect ratio.
pub fn aspect_fit(content: DataRect, medium_aspect: f64, buffer: Buffer) -> DataRect {
    let padded = content.expand(buffer);
    let width = padded.width();
    let height = padded.height();
    if !(medium_aspect.is_finite() && medium_aspect > 0.0) || width <= 0.0 || height <= 0.0 {
        return padded;
    }

    let content_aspect = width / height;
    if content_aspect >= medium_aspect {
        // Width fits exactly; grow height.
        let fit_height = width / medium_aspect;
        if height > fit_height {
            return padded;
        }
        let slack = fit_height - height;
        DataRect {
            min_x: padded.min_x,
            max_x: padded.max_x,
            min_y: padded.min_y - slack / 2.0,
            max_y: padded.max_y + slack / 2.0,
        }
    } else {
        let fit_width = height * medium_aspect;
        if width > fit_width {
            return padded;
        }
        let slack = fit_width - width;
        DataRect {
            min_x: padded.min_x - slack / 2.0,
            max_x: padded.max_x + slack / 2.0,
            min_y: padded.min_y,
            max_y: padded.max_y,
        }
    }
}

/// Width over height of a device rectangle, or 1.0 for a degenerate one.
pub fn device_aspect(rect: egui::Rect) -> f64 {
    let (w, h) = (rect.width() as f64, rect.height() as f64);
    if w > 0.0 && h > 0.0 {
        w / h
    } else {
        1.0
    }
}

/// Affine map between a data rectangle and a device rectangle.
///
/// The data rectangle's top-left (`min_x`, `max_y`) lands on the device rectangle's
/// top-left; the y axis is flipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceTransform {
    data: DataRect,
    device: egui::Rect,
    sx: f64,
    sy: f64,
}

impl DeviceTransform {
    /// Creates the transform mapping `data` onto `device`.
    pub fn new(data: DataRect, device: egui::Rect) -> Self {
        let sx = if data.width() > 0.0 {
            device.width() as f64 / data.width()
        } else {
            1.0
        };
        let sy = if data.height() > 0.0 {
            device.height() as f64 / data.height()
        } else {
            1.0
        };
        Self { data, device, sx, sy }
    }

    /// The data rectangle shown on the device.
    pub fn data_rect(&self) -> DataRect {
        self.data
    }

    /// The device rectangle the data is mapped onto.
    pub fn device_rect(&self) -> egui::Rect {
        self.device
    }

    /// Horizontal device units per data unit.
    pub fn scale_x(&self) -> f64 {
        self.sx
    }

    /// Vertical device units per data unit.
    pub fn scale_y(&self) -> f64 {
        self.sy
    }

    /// Converts a data point to device space.
    pub fn data_to_device(&self, p: DataPoint) -> egui::Pos2 {
        egui::pos2(
            (self.device.min.x as f64 + (p.x - self.data.min_x) * self.sx) as f32,
            (self.device.min.y as f64 + (self.data.max_y - p.y) * self.sy) as f32,
        )
    }

    /// Converts a device point to data space.
    pub fn device_to_data(&self, p: egui::Pos2) -> DataPoint {
        DataPoint::new(
            self.data.min_x + (p.x as f64 - self.device.min.x as f64) / self.sx,
            self.data.max_y - (p.y as f64 - self.device.min.y as f64) / self.sy,
        )
    }

    /// Converts a data rectangle to the device rectangle covering it.
    pub fn rect_to_device(&self, r: &DataRect) -> egui::Rect {
        egui::Rect::from_two_pos(
            self.data_to_device(DataPoint::new(r.min_x, r.max_y)),
            self.data_to_device(DataPoint::new(r.max_x, r.min_y)),
        )
    }

    /// Converts a device rectangle to the data rectangle it covers.
    pub fn rect_to_data(&self, r: egui::Rect) -> DataRect {
        let a = self.device_to_data(r.min);
        let b = self.device_to_data(r.max);
        DataRect::new(a.x, a.y, b.x, b.y)
    }

    /// Converts a horizontal data length to device units.
    pub fn length_to_device(&self, len: f64) -> f32 {
        (len * self.sx) as f32
    }

    /// Converts a horizontal device length to data units.
    pub fn length_to_data(&self, len: f32) -> f64 {
        len as f64 / self.sx
    }

    /// Converts a device delta into the matching data delta (y flipped).
    pub fn delta_to_data(&self, delta: egui::Vec2) -> (f64, f64) {
        (delta.x as f64 / self.sx, -(delta.y as f64) / self.sy)
    }
}
