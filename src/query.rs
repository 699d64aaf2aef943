//! Query string configuration.
//!
//! Parses strings like `?w=400&h=300&upscale=true&jpeg.quality=90` into
//! [`Params`] that can be applied to an [`ImageResize`](crate::ImageResize).
//! Bad values never fail the parse; they are skipped and reported as
//! [`ParseWarning`]s, and out-of-range values are still dropped silently by
//! the engine setters when applied.
//!
//! ```
//! use zenresize::query;
//!
//! let result = query::parse("w=400&h=300&ax=left&jpeg.quality=900");
//! assert_eq!(result.params.width, Some(400));
//! assert_eq!(result.params.jpeg_quality, Some(900));
//! assert!(result.warnings.is_empty());
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use crate::anchor::Anchor;
use crate::canvas::RasterCanvas;
use crate::engine::ImageResize;

/// Parsed configuration values. `None` = key absent or unparseable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Params {
    /// Target width (`w`, `width`).
    pub width: Option<u32>,
    /// Target height (`h`, `height`).
    pub height: Option<u32>,
    /// Long-side target (`long`, `longside`).
    pub long_side: Option<u32>,
    /// Short-side target (`short`, `shortside`).
    pub short_side: Option<u32>,
    /// Allow enlarging (`upscale`, `enlarge`).
    pub upscale: Option<bool>,
    /// JPEG quality (`quality`, `jpeg.quality`). Range-checked on apply.
    pub jpeg_quality: Option<u32>,
    /// PNG compression level (`png.compression`, `png.level`). Range-checked on apply.
    pub png_compression: Option<u32>,
    /// Horizontal crop anchor (`ax`, `anchor.x`).
    pub anchor_x: Option<Anchor>,
    /// Vertical crop anchor (`ay`, `anchor.y`).
    pub anchor_y: Option<Anchor>,
}

impl Params {
    /// Run every present value through the engine's setters.
    ///
    /// Dimensions are applied before the long/short shortcuts, so a
    /// shortcut wins when both name the same side. Anchors are not engine
    /// state; read them from [`anchors`](Self::anchors) when cropping.
    pub fn apply_to<C: RasterCanvas>(&self, engine: &mut ImageResize<C>) {
        if let Some(w) = self.width {
            engine.set_width(w);
        }
        if let Some(h) = self.height {
            engine.set_height(h);
        }
        if let Some(v) = self.long_side {
            engine.set_long_side(v);
        }
        if let Some(v) = self.short_side {
            engine.set_short_side(v);
        }
        if let Some(up) = self.upscale {
            engine.set_upscale(up);
        }
        if let Some(q) = self.jpeg_quality {
            engine.set_jpeg_quality(q);
        }
        if let Some(l) = self.png_compression {
            engine.set_png_compression(l);
        }
    }

    /// Crop anchors, centered where unspecified.
    pub fn anchors(&self) -> (Anchor, Anchor) {
        (
            self.anchor_x.unwrap_or_default(),
            self.anchor_y.unwrap_or_default(),
        )
    }
}

/// Result of parsing a query string.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed values.
    pub params: Params,
    /// Non-fatal parse warnings.
    pub warnings: Vec<ParseWarning>,
}

/// Non-fatal warning from query string parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A key appeared more than once (last value wins).
    DuplicateKey { key: String, value: String },
    /// A key was not recognized.
    KeyNotRecognized { key: String, value: String },
    /// A key was recognized but its value could not be parsed.
    ValueInvalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Parse a query string (with or without leading `?`).
pub fn parse(query: &str) -> ParseResult {
    let mut params = Params::default();
    let mut warnings = Vec::new();

    let query = query.strip_prefix('?').unwrap_or(query);
    for pair in query.split('&').filter(|s| !s.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = percent_decode(raw_key).to_ascii_lowercase();
        let value = percent_decode(raw_value);
        dispatch_key(&key, &value, &mut params, &mut warnings);
    }

    ParseResult { params, warnings }
}

fn dispatch_key(key: &str, value: &str, params: &mut Params, warnings: &mut Vec<ParseWarning>) {
    match key {
        "w" | "width" => set_dimension(&mut params.width, "width", value, warnings),
        "h" | "height" => set_dimension(&mut params.height, "height", value, warnings),
        "long" | "longside" => set_dimension(&mut params.long_side, "long", value, warnings),
        "short" | "shortside" => set_dimension(&mut params.short_side, "short", value, warnings),
        "upscale" | "enlarge" => set_or_warn(
            &mut params.upscale,
            parse_bool(value),
            "upscale",
            value,
            "expected true|false|1|0|yes|no|on|off",
            warnings,
        ),
        "quality" | "jpeg.quality" => set_or_warn(
            &mut params.jpeg_quality,
            parse_level(value),
            "jpeg.quality",
            value,
            "expected an integer",
            warnings,
        ),
        "png.compression" | "png.level" => set_or_warn(
            &mut params.png_compression,
            parse_level(value),
            "png.compression",
            value,
            "expected an integer",
            warnings,
        ),
        // Anchor parsing never fails; unknown tokens mean the near edge.
        "ax" | "anchor.x" => set_or_warn(
            &mut params.anchor_x,
            Some(Anchor::parse(value)),
            "anchor.x",
            value,
            "",
            warnings,
        ),
        "ay" | "anchor.y" => set_or_warn(
            &mut params.anchor_y,
            Some(Anchor::parse(value)),
            "anchor.y",
            value,
            "",
            warnings,
        ),
        _ => warnings.push(ParseWarning::KeyNotRecognized {
            key: String::from(key),
            value: String::from(value),
        }),
    }
}

fn set_dimension(
    field: &mut Option<u32>,
    key: &'static str,
    value: &str,
    warnings: &mut Vec<ParseWarning>,
) {
    let parsed = parse_dimension(value);
    set_or_warn(field, parsed, key, value, "expected a positive integer", warnings);
}

fn set_or_warn<T>(
    field: &mut Option<T>,
    parsed: Option<T>,
    key: &'static str,
    value: &str,
    reason: &'static str,
    warnings: &mut Vec<ParseWarning>,
) {
    match parsed {
        Some(v) => {
            if field.is_some() {
                warnings.push(ParseWarning::DuplicateKey {
                    key: String::from(key),
                    value: String::from(value),
                });
            }
            *field = Some(v);
        }
        None => warnings.push(ParseWarning::ValueInvalid {
            key,
            value: String::from(value),
            reason,
        }),
    }
}

fn parse_dimension(s: &str) -> Option<u32> {
    s.trim().parse::<u32>().ok().filter(|&v| v > 0)
}

fn parse_level(s: &str) -> Option<u32> {
    s.trim().parse::<u32>().ok()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Percent-decode a URL component. Also handles '+' as space.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() && hex_pair(bytes[i + 1], bytes[i + 2]).is_some() => {
                out.extend(hex_pair(bytes[i + 1], bytes[i + 2]));
                i += 2;
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}
