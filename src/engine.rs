//! The resize engine: target configuration, resize strategies, and cropping.
//!
//! [`ImageResize`] owns at most one canvas. Each successful resize or crop
//! builds a replacement canvas from the current one and installs it; the
//! previous canvas is dropped right away.
//!
//! # Example
//!
//! ```
//! # use zenresize::{Rect, RasterCanvas, Rgb};
//! # struct Blank(u32, u32);
//! # impl RasterCanvas for Blank {
//! #     fn create(w: u32, h: u32) -> Self { Blank(w, h) }
//! #     fn width(&self) -> u32 { self.0 }
//! #     fn height(&self) -> u32 { self.1 }
//! #     fn resample_from(&mut self, _: &Self, _: Rect, _: Rect) {}
//! #     fn copy_region_from(&mut self, _: &Self, _: u32, _: u32, _: Rect) {}
//! #     fn transparent_index(&self) -> Option<u32> { None }
//! #     fn color_at(&self, _: u32) -> Option<Rgb> { None }
//! #     fn allocate_color(&mut self, _: Rgb) -> Option<u32> { None }
//! #     fn set_transparent_index(&mut self, _: u32) {}
//! #     fn fill(&mut self, _: u32, _: u32, _: u32) {}
//! #     fn set_alpha_preserving(&mut self, _: bool) {}
//! # }
//! use zenresize::{Anchor, ImageResize, ImageType};
//!
//! let mut image = ImageResize::from_canvas(Blank(640, 480), ImageType::Jpeg);
//! image.set_width(300).set_height(300);
//! image.resize_to_fill(Anchor::Center, Anchor::Center).unwrap();
//! assert_eq!((image.width(), image.height()), (300, 300));
//! ```

use tracing::{debug, trace};

use crate::anchor::Anchor;
use crate::canvas::{ImageType, RasterCanvas};
use crate::geometry::{self, Rect, Size};
use crate::transparency::TransparencyPolicy;

/// Why a resize or crop request was refused.
///
/// A refused request leaves the engine untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResizeError {
    /// No canvas is loaded.
    #[error("no image loaded")]
    NoImageLoaded,
    /// `resize_to_width` / `resize_to_height` without the matching target.
    #[error("no target dimension set")]
    NoTargetSet,
}

/// Encoder quality settings carried alongside the image.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Quality {
    /// JPEG quality, 0–100.
    pub jpeg: u8,
    /// PNG compression level, 0–9.
    pub png: u8,
}

impl Quality {
    pub const DEFAULT_JPEG: u8 = 80;
    pub const DEFAULT_PNG: u8 = 2;
    pub const MAX_JPEG: u32 = 100;
    pub const MAX_PNG: u32 = 9;
}

impl Default for Quality {
    fn default() -> Self {
        Self {
            jpeg: Self::DEFAULT_JPEG,
            png: Self::DEFAULT_PNG,
        }
    }
}

/// A loaded image plus the resize targets to apply to it.
#[derive(Debug)]
pub struct ImageResize<C> {
    canvas: Option<C>,
    image_type: Option<ImageType>,
    target_width: Option<u32>,
    target_height: Option<u32>,
    upscale: bool,
    quality: Quality,
}

impl<C> Default for ImageResize<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ImageResize<C> {
    /// Create an engine with no image loaded.
    pub const fn new() -> Self {
        Self {
            canvas: None,
            image_type: None,
            target_width: None,
            target_height: None,
            upscale: false,
            quality: Quality {
                jpeg: Quality::DEFAULT_JPEG,
                png: Quality::DEFAULT_PNG,
            },
        }
    }

    /// Encoded type of the loaded image, `None` when empty.
    pub fn image_type(&self) -> Option<ImageType> {
        self.canvas.as_ref().and(self.image_type)
    }

    /// The loaded canvas.
    pub fn canvas(&self) -> Option<&C> {
        self.canvas.as_ref()
    }

    /// Whether a canvas is loaded.
    pub fn is_loaded(&self) -> bool {
        self.canvas.is_some()
    }

    /// Configured target width.
    pub fn target_width(&self) -> Option<u32> {
        self.target_width
    }

    /// Configured target height.
    pub fn target_height(&self) -> Option<u32> {
        self.target_height
    }

    /// Whether enlarging beyond the current dimensions is allowed.
    pub fn upscale(&self) -> bool {
        self.upscale
    }

    /// Encoder quality settings.
    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Set the target width. Zero is ignored.
    pub fn set_width(&mut self, width: u32) -> &mut Self {
        set_positive(&mut self.target_width, width, "width");
        self
    }

    /// Set the target height. Zero is ignored.
    pub fn set_height(&mut self, height: u32) -> &mut Self {
        set_positive(&mut self.target_height, height, "height");
        self
    }

    /// Clear both target dimensions.
    pub fn reset_dimensions(&mut self) -> &mut Self {
        self.target_width = None;
        self.target_height = None;
        self
    }

    /// Allow or forbid enlarging the image.
    pub fn set_upscale(&mut self, upscale: bool) -> &mut Self {
        self.upscale = upscale;
        self
    }

    /// Set JPEG quality. Values above 100 are ignored.
    pub fn set_jpeg_quality(&mut self, quality: u32) -> &mut Self {
        set_bounded(&mut self.quality.jpeg, quality, Quality::MAX_JPEG, "jpeg quality");
        self
    }

    /// Set PNG compression level. Values above 9 are ignored.
    pub fn set_png_compression(&mut self, level: u32) -> &mut Self {
        set_bounded(&mut self.quality.png, level, Quality::MAX_PNG, "png compression");
        self
    }

    /// Drop the loaded canvas. Targets and quality settings are kept.
    pub fn dispose(&mut self) {
        if self.canvas.take().is_some() {
            trace!("canvas disposed");
        }
        self.image_type = None;
    }

    /// Give up ownership of the loaded canvas.
    pub fn into_canvas(mut self) -> Option<C> {
        self.canvas.take()
    }
}

impl<C: RasterCanvas> ImageResize<C> {
    /// Wrap an already decoded canvas.
    pub fn from_canvas(canvas: C, image_type: ImageType) -> Self {
        let mut engine = Self::new();
        engine.load(canvas, image_type);
        engine
    }

    /// Replace the loaded canvas.
    pub fn load(&mut self, canvas: C, image_type: ImageType) -> &mut Self {
        debug!(
            width = canvas.width(),
            height = canvas.height(),
            %image_type,
            "canvas loaded",
        );
        self.canvas = Some(canvas);
        self.image_type = Some(image_type);
        self
    }

    /// Current width, 0 when empty.
    pub fn width(&self) -> u32 {
        self.canvas.as_ref().map_or(0, RasterCanvas::width)
    }

    /// Current height, 0 when empty.
    pub fn height(&self) -> u32 {
        self.canvas.as_ref().map_or(0, RasterCanvas::height)
    }

    /// Current dimensions, zero when empty.
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Set the target for whichever side is currently longer.
    ///
    /// Width counts as the long side of a square image. Ignored when no
    /// image is loaded.
    pub fn set_long_side(&mut self, length: u32) -> &mut Self {
        let size = self.canvas.as_ref().map(RasterCanvas::size);
        match size {
            Some(size) if size.width >= size.height => self.set_width(length),
            Some(_) => self.set_height(length),
            None => {
                trace!(length, "long side ignored without an image");
                self
            }
        }
    }

    /// Set the target for whichever side is currently shorter.
    ///
    /// Height counts as the short side of a square image. Ignored when no
    /// image is loaded.
    pub fn set_short_side(&mut self, length: u32) -> &mut Self {
        let size = self.canvas.as_ref().map(RasterCanvas::size);
        match size {
            Some(size) if size.width < size.height => self.set_width(length),
            Some(_) => self.set_height(length),
            None => {
                trace!(length, "short side ignored without an image");
                self
            }
        }
    }

    /// Width the given height would produce at the current aspect ratio.
    pub fn auto_width(&self, target_height: u32) -> u32 {
        geometry::auto_width(self.size(), target_height)
    }

    /// Height the given width would produce at the current aspect ratio.
    pub fn auto_height(&self, target_width: u32) -> u32 {
        geometry::auto_height(self.size(), target_width)
    }

    /// Resize to the configured targets.
    ///
    /// Unset targets default to the current dimensions. With
    /// `preserve_proportions`, the result fits inside the target box;
    /// otherwise it is stretched to exactly the box.
    pub fn resize(&mut self, preserve_proportions: bool) -> Result<(), ResizeError> {
        let source = self.loaded_size()?;
        let (width, height) = self.target_box(source);

        let target = if preserve_proportions {
            geometry::fit(source, width, height)
        } else {
            Size::new(width, height)
        };
        self.resample(target);
        Ok(())
    }

    /// Resize to the target width, deriving the height from the aspect ratio.
    pub fn resize_to_width(&mut self) -> Result<(), ResizeError> {
        let source = self.loaded_size()?;
        let width = self.target_width.ok_or(ResizeError::NoTargetSet)?;
        self.resample(Size::new(width, geometry::auto_height(source, width)));
        Ok(())
    }

    /// Resize to the target height, deriving the width from the aspect ratio.
    pub fn resize_to_height(&mut self) -> Result<(), ResizeError> {
        let source = self.loaded_size()?;
        let height = self.target_height.ok_or(ResizeError::NoTargetSet)?;
        self.resample(Size::new(geometry::auto_width(source, height), height));
        Ok(())
    }

    /// Scale to cover the target box, then crop the overflow.
    ///
    /// Unset targets default to the current dimensions. The anchors place
    /// the crop window on the scaled image.
    pub fn resize_to_fill(&mut self, anchor_x: Anchor, anchor_y: Anchor) -> Result<(), ResizeError> {
        let source = self.loaded_size()?;
        let (width, height) = self.target_box(source);

        self.resample(geometry::cover(source, width, height));
        self.crop_to(width, height, anchor_x, anchor_y);
        Ok(())
    }

    /// Crop to the target box without scaling.
    ///
    /// Unset targets default to the current dimensions; the window is
    /// clamped to the image.
    pub fn crop(&mut self, anchor_x: Anchor, anchor_y: Anchor) -> Result<(), ResizeError> {
        let source = self.loaded_size()?;
        let (width, height) = self.target_box(source);
        self.crop_to(width, height, anchor_x, anchor_y);
        Ok(())
    }

    fn loaded_size(&self) -> Result<Size, ResizeError> {
        self.canvas
            .as_ref()
            .map(RasterCanvas::size)
            .ok_or(ResizeError::NoImageLoaded)
    }

    fn target_box(&self, source: Size) -> (u32, u32) {
        (
            self.target_width.unwrap_or(source.width),
            self.target_height.unwrap_or(source.height),
        )
    }

    fn policy(&self) -> TransparencyPolicy {
        self.image_type
            .map_or(TransparencyPolicy::None, TransparencyPolicy::for_type)
    }

    /// Scale the whole canvas to `target`, unless that would enlarge it
    /// while upscaling is off.
    fn resample(&mut self, target: Size) {
        let Some(src) = self.canvas.as_ref() else {
            return;
        };
        let source = src.size();
        let target = geometry::at_least_one(target);

        if !self.upscale && target.exceeds(source) {
            debug!(
                source_width = source.width,
                source_height = source.height,
                target_width = target.width,
                target_height = target.height,
                "upscale disallowed, resample skipped",
            );
            return;
        }

        let mut dst = C::create(target.width, target.height);
        self.policy().apply(src, &mut dst);
        dst.resample_from(src, Rect::full(target), Rect::full(source));
        debug!(
            source_width = source.width,
            source_height = source.height,
            target_width = target.width,
            target_height = target.height,
            "resampled",
        );
        self.install(dst);
    }

    /// Copy an anchored `width × height` window into a new canvas.
    fn crop_to(&mut self, width: u32, height: u32, anchor_x: Anchor, anchor_y: Anchor) {
        let Some(src) = self.canvas.as_ref() else {
            return;
        };
        let source = src.size();
        let rect = geometry::crop_rect(source, width.max(1), height.max(1), anchor_x, anchor_y);

        let mut dst = C::create(rect.width, rect.height);
        self.policy().apply(src, &mut dst);
        dst.copy_region_from(src, 0, 0, rect);
        debug!(
            source_width = source.width,
            source_height = source.height,
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "cropped",
        );
        self.install(dst);
    }

    fn install(&mut self, canvas: C) {
        // The previous canvas drops here.
        self.canvas = Some(canvas);
    }
}

fn set_positive(field: &mut Option<u32>, value: u32, name: &'static str) {
    if value == 0 {
        trace!(setting = name, "zero target ignored");
        return;
    }
    *field = Some(value);
}

fn set_bounded(field: &mut u8, value: u32, max: u32, name: &'static str) {
    match u8::try_from(value) {
        Ok(v) if value <= max => *field = v,
        _ => trace!(setting = name, value, max, "out of range value ignored"),
    }
}
