//! Which transparency a freshly created canvas must carry over from its source.

use tracing::trace;

use crate::canvas::{ImageType, RasterCanvas};

/// Transparency preservation behavior for a new destination canvas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransparencyPolicy {
    /// Per-pixel alpha: disable blending and keep the alpha channel.
    AlphaChannel,
    /// Indexed transparency: propagate the source's transparent color and
    /// pre-fill the destination with it.
    IndexedColor,
    /// The format has no transparency.
    None,
}

impl TransparencyPolicy {
    /// Policy for images of the given encoded type.
    pub const fn for_type(ty: ImageType) -> Self {
        match ty {
            ImageType::Png => Self::AlphaChannel,
            ImageType::Gif => Self::IndexedColor,
            ImageType::Jpeg => Self::None,
        }
    }

    /// Prepare `dst` before pixels from `src` are copied into it.
    pub fn apply<C: RasterCanvas>(self, src: &C, dst: &mut C) {
        match self {
            Self::AlphaChannel => dst.set_alpha_preserving(true),
            Self::IndexedColor => {
                let Some(index) = src.transparent_index() else {
                    return;
                };
                let Some(color) = src.color_at(index) else {
                    return;
                };
                let Some(dst_index) = dst.allocate_color(color) else {
                    trace!(?color, "destination color table full, transparency dropped");
                    return;
                };
                dst.set_transparent_index(dst_index);
                dst.fill(0, 0, dst_index);
            }
            Self::None => {}
        }
    }
}

impl From<ImageType> for TransparencyPolicy {
    fn from(ty: ImageType) -> Self {
        Self::for_type(ty)
    }
}
