//! End-to-end engine tests on a simulated canvas.
//!
//! Every pixel in the source stores its (x, y) origin coordinates, making
//! any geometric error immediately detectable — wrong crop, wrong scale,
//! wrong placement all show up as mismatched coordinates. Each canvas also
//! records the primitive calls it received, so the transparency handling
//! and the single-commit behavior of every operation can be checked.

use std::cell::Cell;
use std::rc::Rc;

use zenresize::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ---- Pixel simulation ----

/// A pixel that remembers where it came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Pixel {
    /// Source pixel at (x, y) in the original image.
    Source(u32, u32),
    /// Untouched pixel of a fresh canvas.
    Blank,
    /// Filled with a color table entry.
    Indexed(u32),
}

/// Primitive call received by a canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Op {
    Resample { dst: Rect, src: Rect },
    CopyRegion { x: u32, y: u32, src: Rect },
    Allocate(Rgb),
    SetTransparent(u32),
    Fill { x: u32, y: u32, index: u32 },
    AlphaPreserving(bool),
}

/// A pixel buffer for geometric validation.
#[derive(Debug)]
struct Grid {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
    palette: Vec<Rgb>,
    transparent: Option<u32>,
    ops: Vec<Op>,
    drops: Option<Rc<Cell<u32>>>,
}

impl Grid {
    /// Source image: pixel at (x,y) stores Source(x,y).
    fn source(w: u32, h: u32) -> Self {
        let pixels = (0..h)
            .flat_map(|y| (0..w).map(move |x| Pixel::Source(x, y)))
            .collect();
        Self {
            width: w,
            height: h,
            pixels,
            palette: Vec::new(),
            transparent: None,
            ops: Vec::new(),
            drops: None,
        }
    }

    /// Source image with a transparent color table entry, like a GIF.
    fn indexed_source(w: u32, h: u32, transparent: Rgb) -> Self {
        let mut grid = Self::source(w, h);
        grid.palette = vec![Rgb::new(0, 0, 0), transparent];
        grid.transparent = Some(1);
        grid
    }

    /// Count drops of this grid in `counter`.
    fn tracked(mut self, counter: &Rc<Cell<u32>>) -> Self {
        self.drops = Some(Rc::clone(counter));
        self
    }

    fn get(&self, x: u32, y: u32) -> Pixel {
        assert!(
            x < self.width && y < self.height,
            "({x},{y}) out of bounds {}x{}",
            self.width,
            self.height
        );
        self.pixels[(y * self.width + x) as usize]
    }

    fn set(&mut self, x: u32, y: u32, px: Pixel) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = px;
        }
    }
}

impl Drop for Grid {
    fn drop(&mut self) {
        if let Some(counter) = &self.drops {
            counter.set(counter.get() + 1);
        }
    }
}

impl RasterCanvas for Grid {
    fn create(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Pixel::Blank; (width * height) as usize],
            palette: Vec::new(),
            transparent: None,
            ops: Vec::new(),
            drops: None,
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    /// Nearest-neighbor resample.
    fn resample_from(&mut self, src: &Self, dst: Rect, src_rect: Rect) {
        self.ops.push(Op::Resample { dst, src: src_rect });
        for y in 0..dst.height {
            let sy = ((y as f64 + 0.5) * src_rect.height as f64 / dst.height as f64).floor() as u32;
            let sy = src_rect.y + sy.min(src_rect.height - 1);
            for x in 0..dst.width {
                let sx =
                    ((x as f64 + 0.5) * src_rect.width as f64 / dst.width as f64).floor() as u32;
                let sx = src_rect.x + sx.min(src_rect.width - 1);
                self.set(dst.x + x, dst.y + y, src.get(sx, sy));
            }
        }
    }

    fn copy_region_from(&mut self, src: &Self, dst_x: u32, dst_y: u32, src_rect: Rect) {
        self.ops.push(Op::CopyRegion {
            x: dst_x,
            y: dst_y,
            src: src_rect,
        });
        for y in 0..src_rect.height {
            for x in 0..src_rect.width {
                self.set(dst_x + x, dst_y + y, src.get(src_rect.x + x, src_rect.y + y));
            }
        }
    }

    fn transparent_index(&self) -> Option<u32> {
        self.transparent
            .filter(|&i| (i as usize) < self.palette.len())
    }

    fn color_at(&self, index: u32) -> Option<Rgb> {
        self.palette.get(index as usize).copied()
    }

    fn allocate_color(&mut self, color: Rgb) -> Option<u32> {
        self.ops.push(Op::Allocate(color));
        self.palette.push(color);
        Some(self.palette.len() as u32 - 1)
    }

    fn set_transparent_index(&mut self, index: u32) {
        self.ops.push(Op::SetTransparent(index));
        self.transparent = Some(index);
    }

    /// Fresh canvases are uniform, so the flood fill covers everything.
    fn fill(&mut self, x: u32, y: u32, index: u32) {
        self.ops.push(Op::Fill { x, y, index });
        self.pixels.fill(Pixel::Indexed(index));
    }

    fn set_alpha_preserving(&mut self, enabled: bool) {
        self.ops.push(Op::AlphaPreserving(enabled));
    }
}

fn engine(w: u32, h: u32, ty: ImageType) -> ImageResize<Grid> {
    init_tracing();
    ImageResize::from_canvas(Grid::source(w, h), ty)
}

fn current(e: &ImageResize<Grid>) -> &Grid {
    e.canvas().expect("image loaded")
}

// ============================================================
// Concrete scenarios
// ============================================================

#[test]
fn width_400_from_800x600() {
    let mut e = engine(800, 600, ImageType::Jpeg);
    e.set_width(400);
    e.resize(true).unwrap();

    let g = current(&e);
    assert_eq!((g.width, g.height), (400, 300));
    assert_eq!(
        g.ops,
        [Op::Resample {
            dst: Rect::new(0, 0, 400, 300),
            src: Rect::new(0, 0, 800, 600),
        }]
    );
    assert_eq!(g.get(0, 0), Pixel::Source(1, 1));
    assert_eq!(g.get(399, 299), Pixel::Source(799, 599));
}

#[test]
fn fill_640x480_into_300x300() {
    let mut e = engine(640, 480, ImageType::Jpeg);
    e.set_width(300).set_height(300);
    e.resize_to_fill(Anchor::Center, Anchor::Center).unwrap();

    let g = current(&e);
    assert_eq!((g.width, g.height), (300, 300));
    assert_eq!(
        g.ops,
        [Op::CopyRegion {
            x: 0,
            y: 0,
            src: Rect::new(50, 0, 300, 300),
        }]
    );
    // Scaled column 50 samples source column floor(50.5 * 1.6) = 80.
    assert_eq!(g.get(0, 0), Pixel::Source(80, 0));
}

#[test]
fn jpeg_quality_150_ignored_chain_continues() {
    let mut e = engine(100, 100, ImageType::Jpeg);
    e.set_jpeg_quality(150).set_width(50);
    assert_eq!(e.quality().jpeg, 80);
    assert_eq!(e.resize_to_width(), Ok(()));
    assert_eq!(e.size(), Size::new(50, 50));
}

// ============================================================
// Crop
// ============================================================

#[test]
fn centered_full_frame_crop_is_identity() {
    let mut e = engine(37, 21, ImageType::Png);
    e.crop(Anchor::Center, Anchor::Center).unwrap();

    let g = current(&e);
    let original = Grid::source(37, 21);
    assert_eq!((g.width, g.height), (37, 21));
    assert_eq!(g.pixels, original.pixels);
}

#[test]
fn crop_bottom_right() {
    let mut e = engine(100, 80, ImageType::Jpeg);
    e.set_width(30).set_height(20);
    e.crop(Anchor::parse("right"), Anchor::parse("BOTTOM")).unwrap();

    let g = current(&e);
    assert_eq!(g.get(0, 0), Pixel::Source(70, 60));
    assert_eq!(g.get(29, 19), Pixel::Source(99, 79));
}

#[test]
fn crop_offset_past_edge_is_clamped() {
    let mut e = engine(100, 80, ImageType::Jpeg);
    e.set_width(30).set_height(20);
    e.crop(Anchor::parse("500"), Anchor::parse("garbage")).unwrap();

    let g = current(&e);
    assert_eq!(g.get(0, 0), Pixel::Source(70, 0));
}

#[test]
fn crop_window_larger_than_source() {
    let mut e = engine(40, 30, ImageType::Jpeg);
    e.set_width(400).set_height(10);
    e.crop(Anchor::Center, Anchor::Center).unwrap();

    let g = current(&e);
    assert_eq!((g.width, g.height), (40, 10));
    assert_eq!(g.get(0, 0), Pixel::Source(0, 10));
}

// ============================================================
// Laws
// ============================================================

#[test]
fn fill_yields_exact_box_and_stays_inside_scaled_image() {
    let sources = [(640, 480), (480, 640), (1399, 697), (100, 100), (30, 100)];
    let boxes = [(300, 300), (50, 200), (200, 50), (1, 1)];
    let anchors = [Anchor::Start, Anchor::Center, Anchor::End, Anchor::Offset(7)];

    for (sw, sh) in sources {
        for (bw, bh) in boxes {
            for anchor in anchors {
                let mut e = engine(sw, sh, ImageType::Jpeg);
                e.set_width(bw).set_height(bh).set_upscale(true);
                e.resize_to_fill(anchor, anchor).unwrap();
                assert_eq!(e.size(), Size::new(bw, bh), "{sw}x{sh} fill {bw}x{bh}");

                let g = current(&e);
                let Some(Op::CopyRegion { src, .. }) = g.ops.last() else {
                    panic!("fill must end with a region copy: {:?}", g.ops);
                };
                // The scaled image the window was taken from covered the box.
                let scaled = geometry::cover(Size::new(sw, sh), bw, bh);
                assert!(scaled.width >= bw && scaled.height >= bh);
                assert!(src.x + src.width <= scaled.width);
                assert!(src.y + src.height <= scaled.height);
            }
        }
    }
}

#[test]
fn proportional_resize_fits_box() {
    let sources = [(800, 600), (600, 800), (1621, 883), (5, 1399)];
    let boxes = [(400, 300), (100, 33), (512, 512), (1000, 10)];

    for (sw, sh) in sources {
        for (bw, bh) in boxes {
            let mut e = engine(sw, sh, ImageType::Jpeg);
            e.set_width(bw).set_height(bh).set_upscale(true);
            e.resize(true).unwrap();
            let s = e.size();
            assert!(s.width <= bw && s.height <= bh, "{sw}x{sh} in {bw}x{bh} → {s:?}");
            assert!(s.width == bw || s.height == bh, "{sw}x{sh} in {bw}x{bh} → {s:?}");
        }
    }
}

// ============================================================
// Upscale guard
// ============================================================

#[test]
fn upscale_guard_keeps_original_canvas() {
    let mut e = engine(100, 50, ImageType::Jpeg);
    e.set_width(200);
    assert_eq!(e.resize_to_width(), Ok(()));

    let g = current(&e);
    assert_eq!((g.width, g.height), (100, 50));
    assert!(g.ops.is_empty());
    assert_eq!(g.pixels, Grid::source(100, 50).pixels);
}

#[test]
fn upscale_when_allowed() {
    let mut e = engine(100, 50, ImageType::Jpeg);
    e.set_width(200).set_upscale(true);
    e.resize_to_width().unwrap();
    assert_eq!(e.size(), Size::new(200, 100));
    assert_eq!(current(&e).get(199, 99), Pixel::Source(99, 49));
}

// ============================================================
// Transparency
// ============================================================

#[test]
fn gif_transparent_color_prefilled_before_copy() {
    init_tracing();
    let key = Rgb::new(255, 0, 255);
    let mut e = ImageResize::from_canvas(Grid::indexed_source(60, 40, key), ImageType::Gif);
    e.set_width(20).set_height(20);
    e.crop(Anchor::Start, Anchor::Start).unwrap();

    let g = current(&e);
    assert_eq!(
        g.ops,
        [
            Op::Allocate(key),
            Op::SetTransparent(0),
            Op::Fill {
                x: 0,
                y: 0,
                index: 0
            },
            Op::CopyRegion {
                x: 0,
                y: 0,
                src: Rect::new(0, 0, 20, 20),
            },
        ]
    );
    assert_eq!(g.transparent_index(), Some(0));
    assert_eq!(g.color_at(0), Some(key));
}

#[test]
fn gif_transparency_survives_chained_operations() {
    init_tracing();
    let key = Rgb::new(0, 255, 0);
    let mut e = ImageResize::from_canvas(Grid::indexed_source(400, 200, key), ImageType::Gif);
    e.set_width(100).set_height(100);
    e.resize_to_fill(Anchor::Center, Anchor::Center).unwrap();

    let g = current(&e);
    assert_eq!(g.transparent_index(), Some(0));
    assert_eq!(g.color_at(0), Some(key));
}

#[test]
fn png_enables_alpha_before_resample() {
    let mut e = engine(80, 40, ImageType::Png);
    e.set_height(20);
    e.resize_to_height().unwrap();

    let g = current(&e);
    assert_eq!(g.ops[0], Op::AlphaPreserving(true));
    assert!(matches!(g.ops[1], Op::Resample { .. }));
    assert_eq!(g.ops.len(), 2);
}

#[test]
fn jpeg_gets_no_transparency_calls() {
    let mut e = engine(80, 40, ImageType::Jpeg);
    e.set_height(20);
    e.resize_to_height().unwrap();
    assert_eq!(current(&e).ops.len(), 1);
}

// ============================================================
// Ownership
// ============================================================

#[test]
fn replaced_canvas_is_released() {
    init_tracing();
    let drops = Rc::new(Cell::new(0));
    let mut e = ImageResize::from_canvas(Grid::source(50, 50).tracked(&drops), ImageType::Jpeg);
    e.set_width(10);

    e.resize_to_width().unwrap();
    assert_eq!(drops.get(), 1);
}

#[test]
fn refused_requests_keep_canvas() {
    init_tracing();
    let drops = Rc::new(Cell::new(0));
    let mut e = ImageResize::from_canvas(Grid::source(50, 50).tracked(&drops), ImageType::Jpeg);

    assert_eq!(e.resize_to_width(), Err(ResizeError::NoTargetSet));
    e.set_width(100);
    assert_eq!(e.resize_to_width(), Ok(()));
    assert_eq!(drops.get(), 0);

    e.dispose();
    assert_eq!(drops.get(), 1);
    assert_eq!(e.width(), 0);
    assert_eq!(e.resize(true), Err(ResizeError::NoImageLoaded));
}

#[test]
fn drop_releases_canvas() {
    let drops = Rc::new(Cell::new(0));
    {
        let _e = ImageResize::from_canvas(Grid::source(5, 5).tracked(&drops), ImageType::Gif);
    }
    assert_eq!(drops.get(), 1);
}
