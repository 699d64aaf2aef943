//! Dimension resolution and crop geometry.
//!
//! Pure integer arithmetic over source dimensions — no pixel operations,
//! no allocations. Everything here is reused by the [`ImageResize`] engine,
//! but can also be called directly to preview a layout.
//!
//! # Example
//!
//! ```
//! use zenresize::{Anchor, Rect, Size, geometry};
//!
//! let source = Size::new(640, 480);
//! let scaled = geometry::cover(source, 300, 300);
//! assert_eq!(scaled, Size::new(400, 300));
//!
//! let rect = geometry::crop_rect(scaled, 300, 300, Anchor::Center, Anchor::Center);
//! assert_eq!(rect, Rect::new(50, 0, 300, 300));
//! ```
//!
//! [`ImageResize`]: crate::ImageResize

use crate::anchor::Anchor;

/// Width × height dimensions in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `self` is larger than `other` on at least one axis.
    pub const fn exceeds(&self, other: Size) -> bool {
        self.width > other.width || self.height > other.height
    }
}

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new rect.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rect covering a whole canvas of the given size.
    pub const fn full(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Dimensions of this rect.
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether this rect covers the full source (no actual crop).
    pub fn is_full(&self, source: Size) -> bool {
        self.x == 0 && self.y == 0 && self.width == source.width && self.height == source.height
    }
}

/// Width that keeps the source aspect ratio at `target_height`.
///
/// Truncates toward zero. Returns the source width unchanged when the
/// source has no height (nothing loaded).
pub fn auto_width(source: Size, target_height: u32) -> u32 {
    if source.height == 0 {
        return source.width;
    }
    // u64 keeps the product exact; the quotient can exceed u32 only for absurd ratios.
    let w = source.width as u64 * target_height as u64 / source.height as u64;
    u32::try_from(w).unwrap_or(u32::MAX)
}

/// Height that keeps the source aspect ratio at `target_width`.
///
/// Truncates toward zero. Returns the source height unchanged when the
/// source has no width.
pub fn auto_height(source: Size, target_width: u32) -> u32 {
    if source.width == 0 {
        return source.height;
    }
    let h = source.height as u64 * target_width as u64 / source.width as u64;
    u32::try_from(h).unwrap_or(u32::MAX)
}

/// Scale to fit inside `box_w × box_h`, preserving aspect ratio.
///
/// The axis with the smaller scale factor is kept; the other is derived.
/// On a tie the width is kept and the height recomputed.
pub fn fit(source: Size, box_w: u32, box_h: u32) -> Size {
    if source.is_empty() {
        return source;
    }
    let ratio_x = box_w as f64 / source.width as f64;
    let ratio_y = box_h as f64 / source.height as f64;
    if ratio_x <= ratio_y {
        // Width constrains — compute height.
        Size::new(box_w, auto_height(source, box_w))
    } else {
        Size::new(auto_width(source, box_h), box_h)
    }
}

/// Scale to cover `box_w × box_h`, preserving aspect ratio.
///
/// When the source scaled to the box width would fall short vertically,
/// the height is matched instead, so the result overflows on the width.
pub fn cover(source: Size, box_w: u32, box_h: u32) -> Size {
    if auto_height(source, box_w) < box_h {
        Size::new(auto_width(source, box_h), box_h)
    } else {
        Size::new(box_w, auto_height(source, box_w))
    }
}

/// Compute a crop window inside `source`.
///
/// The window is clamped to the source dimensions, each axis is placed by
/// its anchor, and the offsets are clamped so the window never extends past
/// the source edge.
pub fn crop_rect(source: Size, width: u32, height: u32, anchor_x: Anchor, anchor_y: Anchor) -> Rect {
    let width = width.min(source.width);
    let height = height.min(source.height);

    let x = anchor_x
        .resolve(source.width, width)
        .min(source.width - width);
    let y = anchor_y
        .resolve(source.height, height)
        .min(source.height - height);

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Clamp computed target dimensions to at least one pixel per axis.
pub(crate) fn at_least_one(size: Size) -> Size {
    Size::new(size.width.max(1), size.height.max(1))
}
