//! declara-signature
//!
//! Free-hand signature capture and rasterization: records press-drag-release
//! strokes as line segments, serializes them losslessly, and renders them to
//! an anti-aliased grayscale raster for document embedding.

pub mod capture;
pub mod error;
pub mod png;
pub mod raster;

pub use capture::{Point, Segment, SignatureCapture, SignatureData, Stroke};
pub use raster::{RasterImage, rasterize};
