//! Resize and anchor-crop geometry over an abstract raster canvas.
//!
//! Pure geometry in the core — pixels are only touched through the
//! [`RasterCanvas`] trait, so the engine is `no_std` compatible and does not
//! allocate.
//!
//! # Modules
//!
//! - [`geometry`] — Dimension resolution, fit/cover boxes, crop windows
//! - [`anchor`] — Symbolic and numeric crop anchors
//! - [`transparency`] — Which transparency a new canvas inherits
//! - [`engine`] — [`ImageResize`]: targets, resize strategies, cropping
//! - [`query`] — Query string configuration (feature `query`)
//! - [`image_canvas`] — Canvas and file I/O over the `image` crate (feature `image`)

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod anchor;
pub mod canvas;
pub mod engine;
pub mod geometry;
pub mod transparency;

#[cfg(feature = "image")]
pub mod image_canvas;
#[cfg(feature = "query")]
pub mod query;

pub use anchor::Anchor;
pub use canvas::{ImageType, RasterCanvas, Rgb};
pub use engine::{ImageResize, Quality, ResizeError};
pub use geometry::{Rect, Size};
pub use transparency::TransparencyPolicy;

#[cfg(feature = "image")]
pub use image_canvas::{CanvasError, ImageCanvas};
