//! Comparison chart: one column per model, one jittered marker per test,
//! a dashed zero line, and the global confidence band.
//!
//! [`ChartLayout::build`] decides what goes where; [`render_svg`] draws it.
//! Writing the document to disk is left to the caller.

pub mod layout;
pub mod svg;

pub use layout::{
    jitter_offset, ChartLayout, ChartOptions, LegendEntry, Marker, MarkerShape, ModelColumn, Rgb,
};
pub use svg::render_svg;
