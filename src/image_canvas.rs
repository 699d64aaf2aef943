//! [`RasterCanvas`] backed by the `image` crate, plus file load/save glue.
//!
//! Pixels live in an [`RgbaImage`]. A small color table is emulated next to
//! it so indexed transparency (GIF) can be carried between canvases.

use std::fs::File;
use std::io::{BufRead, BufWriter, Cursor, Seek, Write};
use std::path::Path;

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{self, CompressionType, PngEncoder};
use image::imageops::{self, FilterType};
use image::{
    DynamicImage, ExtendedColorType, Frame, ImageEncoder, ImageFormat, ImageReader, Rgba,
    RgbaImage,
};
use tracing::debug;

use crate::canvas::{ImageType, RasterCanvas, Rgb};
use crate::engine::{ImageResize, Quality};
use crate::geometry::Rect;

/// Largest color table a canvas can hold, as in GIF.
const MAX_COLORS: usize = 256;

/// Opaque black, the color of a freshly created canvas.
const BLANK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Errors from decoding or encoding image files.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported image format")]
    UnsupportedFormat,

    #[error("no image loaded")]
    NoImageLoaded,
}

/// Truecolor canvas with an emulated color table.
#[derive(Clone, Debug)]
pub struct ImageCanvas {
    pixels: RgbaImage,
    palette: Vec<Rgb>,
    transparent: Option<u32>,
    alpha_preserving: bool,
}

impl ImageCanvas {
    /// Wrap decoded pixels. Alpha is preserved on copies.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            palette: Vec::new(),
            transparent: None,
            alpha_preserving: true,
        }
    }

    /// Build a canvas from a decoded image of the given type.
    ///
    /// For GIF, the color of the first fully transparent pixel becomes color
    /// table entry 0 and is marked transparent.
    pub fn from_image(image: DynamicImage, image_type: ImageType) -> Self {
        let pixels = image.to_rgba8();
        let mut canvas = Self {
            pixels,
            palette: Vec::new(),
            transparent: None,
            alpha_preserving: image_type == ImageType::Png,
        };
        if image_type == ImageType::Gif
            && let Some(px) = canvas.pixels.pixels().find(|px| px[3] == 0)
        {
            let color = Rgb::new(px[0], px[1], px[2]);
            canvas.palette.push(color);
            canvas.transparent = Some(0);
        }
        canvas
    }

    /// Decode a JPEG, GIF or PNG file, detecting the format from its content.
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, ImageType), CanvasError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        Self::decode(reader)
    }

    /// Decode JPEG, GIF or PNG bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, ImageType), CanvasError> {
        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        Self::decode(reader)
    }

    fn decode<R: BufRead + Seek>(reader: ImageReader<R>) -> Result<(Self, ImageType), CanvasError> {
        let image_type = match reader.format() {
            Some(ImageFormat::Jpeg) => ImageType::Jpeg,
            Some(ImageFormat::Gif) => ImageType::Gif,
            Some(ImageFormat::Png) => ImageType::Png,
            _ => return Err(CanvasError::UnsupportedFormat),
        };
        let image = reader.decode()?;
        debug!(
            width = image.width(),
            height = image.height(),
            %image_type,
            "decoded",
        );
        Ok((Self::from_image(image, image_type), image_type))
    }

    /// Encode as `image_type` into `writer`.
    pub fn encode<W: Write>(
        &self,
        writer: W,
        image_type: ImageType,
        quality: Quality,
    ) -> Result<(), CanvasError> {
        let (width, height) = self.pixels.dimensions();
        match image_type {
            ImageType::Jpeg => {
                let rgb = DynamicImage::ImageRgba8(self.pixels.clone()).to_rgb8();
                JpegEncoder::new_with_quality(writer, quality.jpeg.max(1)).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )?;
            }
            ImageType::Png => {
                let compression = match quality.png {
                    0 => CompressionType::Uncompressed,
                    level => CompressionType::Level(level),
                };
                PngEncoder::new_with_quality(writer, compression, png::FilterType::Adaptive)
                    .write_image(self.pixels.as_raw(), width, height, ExtendedColorType::Rgba8)?;
            }
            ImageType::Gif => {
                let mut encoder = GifEncoder::new(writer);
                encoder.encode_frame(Frame::new(self.pixels.clone()))?;
            }
        }
        Ok(())
    }

    /// The pixel buffer.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Take the pixel buffer.
    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }

    /// Whether copies into this canvas keep source alpha verbatim.
    pub fn alpha_preserving(&self) -> bool {
        self.alpha_preserving
    }

    fn palette_pixel(&self, index: u32) -> Option<Rgba<u8>> {
        let c = self.palette.get(index as usize)?;
        let alpha = if self.transparent == Some(index) { 0 } else { 255 };
        Some(Rgba([c.r, c.g, c.b, alpha]))
    }

    fn place(&mut self, region: &RgbaImage, x: u32, y: u32) {
        if self.alpha_preserving {
            imageops::replace(&mut self.pixels, region, x as i64, y as i64);
        } else {
            imageops::overlay(&mut self.pixels, region, x as i64, y as i64);
        }
    }
}

impl RasterCanvas for ImageCanvas {
    fn create(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, BLANK),
            palette: Vec::new(),
            transparent: None,
            alpha_preserving: false,
        }
    }

    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn resample_from(&mut self, src: &Self, dst_rect: Rect, src_rect: Rect) {
        if dst_rect.width == 0 || dst_rect.height == 0 {
            return;
        }
        let region = imageops::crop_imm(
            &src.pixels,
            src_rect.x,
            src_rect.y,
            src_rect.width,
            src_rect.height,
        )
        .to_image();
        let scaled = imageops::resize(&region, dst_rect.width, dst_rect.height, FilterType::Triangle);
        self.place(&scaled, dst_rect.x, dst_rect.y);
    }

    fn copy_region_from(&mut self, src: &Self, dst_x: u32, dst_y: u32, src_rect: Rect) {
        let region = imageops::crop_imm(
            &src.pixels,
            src_rect.x,
            src_rect.y,
            src_rect.width,
            src_rect.height,
        )
        .to_image();
        self.place(&region, dst_x, dst_y);
    }

    fn transparent_index(&self) -> Option<u32> {
        self.transparent
            .filter(|&index| (index as usize) < self.palette.len())
    }

    fn color_at(&self, index: u32) -> Option<Rgb> {
        self.palette.get(index as usize).copied()
    }

    fn allocate_color(&mut self, color: Rgb) -> Option<u32> {
        if self.palette.len() >= MAX_COLORS {
            return None;
        }
        self.palette.push(color);
        u32::try_from(self.palette.len() - 1).ok()
    }

    fn set_transparent_index(&mut self, index: u32) {
        self.transparent = Some(index);
    }

    fn fill(&mut self, x: u32, y: u32, index: u32) {
        let Some(color) = self.palette_pixel(index) else {
            return;
        };
        let (width, height) = self.pixels.dimensions();
        if x >= width || y >= height {
            return;
        }
        let seed = *self.pixels.get_pixel(x, y);
        if seed == color {
            return;
        }

        // 4-connected flood fill over pixels matching the seed color.
        let mut stack = vec![(x, y)];
        while let Some((px, py)) = stack.pop() {
            if *self.pixels.get_pixel(px, py) != seed {
                continue;
            }
            self.pixels.put_pixel(px, py, color);
            if px > 0 {
                stack.push((px - 1, py));
            }
            if px + 1 < width {
                stack.push((px + 1, py));
            }
            if py > 0 {
                stack.push((px, py - 1));
            }
            if py + 1 < height {
                stack.push((px, py + 1));
            }
        }
    }

    fn set_alpha_preserving(&mut self, enabled: bool) {
        self.alpha_preserving = enabled;
    }
}

impl ImageResize<ImageCanvas> {
    /// Load a JPEG, GIF or PNG file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CanvasError> {
        let (canvas, image_type) = ImageCanvas::open(path)?;
        Ok(Self::from_canvas(canvas, image_type))
    }

    /// Load JPEG, GIF or PNG bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CanvasError> {
        let (canvas, image_type) = ImageCanvas::from_bytes(bytes)?;
        Ok(Self::from_canvas(canvas, image_type))
    }

    /// Write the current image to `path`.
    ///
    /// `image_type` defaults to the type the image was loaded as.
    pub fn save(
        &self,
        path: impl AsRef<Path>,
        image_type: Option<ImageType>,
    ) -> Result<(), CanvasError> {
        let (canvas, image_type) = self.output(image_type)?;
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        canvas.encode(&mut writer, image_type, self.quality())?;
        writer.flush()?;
        debug!(path = %path.display(), %image_type, "saved");
        Ok(())
    }

    /// Encode the current image in memory.
    pub fn to_bytes(&self, image_type: Option<ImageType>) -> Result<Vec<u8>, CanvasError> {
        let (canvas, image_type) = self.output(image_type)?;
        let mut buffer = Vec::new();
        canvas.encode(&mut buffer, image_type, self.quality())?;
        Ok(buffer)
    }

    fn output(
        &self,
        image_type: Option<ImageType>,
    ) -> Result<(&ImageCanvas, ImageType), CanvasError> {
        let canvas = self.canvas().ok_or(CanvasError::NoImageLoaded)?;
        let image_type = image_type
            .or(self.image_type())
            .ok_or(CanvasError::NoImageLoaded)?;
        Ok((canvas, image_type))
    }
}
