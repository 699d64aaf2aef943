//! The raster canvas seam: everything that touches pixels goes through here.

use core::fmt;

use crate::geometry::{Rect, Size};

/// Encoded type of a loaded image.
///
/// Drives the [`TransparencyPolicy`](crate::TransparencyPolicy) applied to
/// every canvas the engine creates, and picks the encoder when saving.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImageType {
    Jpeg,
    Gif,
    Png,
}

impl ImageType {
    /// Conventional file extension, without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Png => "png",
        }
    }

    /// Look up a type from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.');
        if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") {
            Some(Self::Jpeg)
        } else if ext.eq_ignore_ascii_case("gif") {
            Some(Self::Gif)
        } else if ext.eq_ignore_ascii_case("png") {
            Some(Self::Png)
        } else {
            None
        }
    }

    /// MIME type.
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Png => "image/png",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Png => "png",
        })
    }
}

/// An 8-bit RGB triplet, as stored in an indexed color table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Pixel buffer operations the resize engine needs.
///
/// A value of the implementing type *is* the raster handle: the engine owns
/// exactly one, builds replacements with [`create`](Self::create), and drops
/// the old one once the replacement is installed. Releasing pixel memory is
/// the implementor's `Drop`.
///
/// Color indices address the canvas's color table. Truecolor backends may
/// emulate one; they only need to keep indices they hand out stable for the
/// lifetime of the canvas.
pub trait RasterCanvas: Sized {
    /// Allocate a blank canvas.
    fn create(width: u32, height: u32) -> Self;

    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Dimensions as a [`Size`].
    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Scale `src_rect` of `src` into `dst_rect` of `self`.
    fn resample_from(&mut self, src: &Self, dst_rect: Rect, src_rect: Rect);

    /// Copy `src_rect` of `src` unscaled, placing its top-left at `(dst_x, dst_y)`.
    fn copy_region_from(&mut self, src: &Self, dst_x: u32, dst_y: u32, src_rect: Rect);

    /// Index of the color marked transparent, if it is a valid table entry.
    fn transparent_index(&self) -> Option<u32>;

    /// Color table entry at `index`.
    fn color_at(&self, index: u32) -> Option<Rgb>;

    /// Add `color` to the color table. `None` when the table is full.
    fn allocate_color(&mut self, color: Rgb) -> Option<u32>;

    /// Mark the color table entry at `index` as transparent.
    fn set_transparent_index(&mut self, index: u32);

    /// Flood-fill from `(x, y)` with the color at `index`.
    fn fill(&mut self, x: u32, y: u32, index: u32);

    /// Toggle alpha preservation: when enabled, copies overwrite destination
    /// pixels including their alpha instead of blending, and the alpha
    /// channel is kept on save.
    fn set_alpha_preserving(&mut self, enabled: bool);
}
