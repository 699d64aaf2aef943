//! Crop anchors: symbolic or numeric placement along one axis.

use num_traits::Float;

/// Where a crop window sits along one axis of the source.
///
/// Parsed from position names (`"left"`, `"right"`, `"top"`, `"bottom"`,
/// `"center"`, `"middle"`) or a pixel offset. Parsing never fails:
/// anything unrecognized resolves to [`Start`](Self::Start).
///
/// ```
/// use zenresize::Anchor;
///
/// assert_eq!(Anchor::parse("Right"), Anchor::End);
/// assert_eq!(Anchor::parse("middle"), Anchor::Center);
/// assert_eq!(Anchor::parse("25"), Anchor::Offset(25));
/// assert_eq!(Anchor::parse("-4"), Anchor::Start);
///
/// assert_eq!(Anchor::End.resolve(800, 200), 600);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Near edge (left or top).
    Start,
    /// Far edge (right or bottom).
    End,
    /// Centered.
    #[default]
    Center,
    /// Fixed pixel offset from the near edge.
    ///
    /// Not range-checked here; the crop engine clamps it so the window
    /// stays inside the source.
    Offset(u32),
}

impl Anchor {
    /// Parse a position token. Case-insensitive, surrounding whitespace ignored.
    ///
    /// Numbers must be positive to count as an offset; fractional offsets
    /// are truncated.
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if token.eq_ignore_ascii_case("left") || token.eq_ignore_ascii_case("top") {
            Self::Start
        } else if token.eq_ignore_ascii_case("right") || token.eq_ignore_ascii_case("bottom") {
            Self::End
        } else if token.eq_ignore_ascii_case("center") || token.eq_ignore_ascii_case("middle") {
            Self::Center
        } else {
            parse_offset(token).map_or(Self::Start, Self::Offset)
        }
    }

    /// Offset of a `window` long span inside a `source` long span.
    pub fn resolve(self, source: u32, window: u32) -> u32 {
        match self {
            Self::Start => 0,
            Self::End => source.saturating_sub(window),
            Self::Center => source.saturating_sub(window) / 2,
            Self::Offset(px) => px,
        }
    }
}

impl From<&str> for Anchor {
    fn from(token: &str) -> Self {
        Self::parse(token)
    }
}

impl From<u32> for Anchor {
    fn from(px: u32) -> Self {
        if px == 0 { Self::Start } else { Self::Offset(px) }
    }
}

fn parse_offset(token: &str) -> Option<u32> {
    let v: f64 = token.parse().ok()?;
    if !v.is_finite() || v <= 0.0 {
        return None;
    }
    let px = Float::trunc(v);
    if px < 1.0 {
        // "0.5" is positive but has no whole pixel of offset.
        return None;
    }
    Some(if px >= u32::MAX as f64 { u32::MAX } else { px as u32 })
}
