//! Backend-independent chart layout.
//!
//! Every position, colour, and legend decision is made here so the drawing
//! stage only translates a finished [`ChartLayout`] into backend calls.

use serde::{Deserialize, Serialize};

use crate::domain::{ReferenceGrid, RenderError};
use crate::stats::{Comparison, ConfidenceBand};

/// Label of the y axis.
pub const Y_AXIS_LABEL: &str = "Quantile score error";

/// Model colours, cycled by model index.
pub const MODEL_COLORS: [Rgb; 6] = [
    Rgb(31, 119, 180),
    Rgb(255, 127, 14),
    Rgb(44, 160, 44),
    Rgb(148, 103, 189),
    Rgb(214, 39, 40),
    Rgb(23, 190, 207),
];

/// Colour used for legend glyphs, which describe tests rather than models.
pub const NEUTRAL_COLOR: Rgb = Rgb(128, 128, 128);

/// Marker shapes, cycled by test index.
pub const MARKER_SHAPES: [MarkerShape; 6] = [
    MarkerShape::Circle,
    MarkerShape::Square,
    MarkerShape::TriangleUp,
    MarkerShape::Star,
    MarkerShape::Hexagon,
    MarkerShape::TriangleRight,
];

/// Chart geometry settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartOptions {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// The y axis spans `[-y_limit, y_limit]`.
    pub y_limit: f64,
    /// Horizontal pixel spacing between markers of the same model.
    pub jitter_px: i32,
    /// Marker radius in pixels.
    pub marker_size: i32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 700,
            height: 700,
            y_limit: 0.005,
            jitter_px: 10,
            marker_size: 5,
        }
    }
}

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    Circle,
    Square,
    TriangleUp,
    Star,
    Hexagon,
    TriangleRight,
}

impl MarkerShape {
    /// Shape for the test at `index` in column order.
    pub fn for_test(index: usize) -> Self {
        MARKER_SHAPES[index % MARKER_SHAPES.len()]
    }

    /// Polygon vertices relative to `(cx, cy)`, or `None` for the circle.
    ///
    /// Pixel y grows downwards.
    pub fn vertices(self, cx: i32, cy: i32, size: i32) -> Option<Vec<(i32, i32)>> {
        let s = size as f64;
        let at = |dx: f64, dy: f64| (cx + dx.round() as i32, cy + dy.round() as i32);
        let ring = |points: usize, radius: &dyn Fn(usize) -> f64, phase: f64| {
            (0..points)
                .map(|i| {
                    let theta = phase + std::f64::consts::TAU * i as f64 / points as f64;
                    let r = radius(i);
                    at(r * theta.cos(), -r * theta.sin())
                })
                .collect::<Vec<_>>()
        };
        match self {
            Self::Circle => None,
            Self::Square => Some(vec![at(-s, -s), at(s, -s), at(s, s), at(-s, s)]),
            Self::TriangleUp => Some(vec![at(0.0, -s), at(s, s), at(-s, s)]),
            Self::TriangleRight => Some(vec![at(s, 0.0), at(-s, -s), at(-s, s)]),
            Self::Hexagon => Some(ring(6, &|_| s, std::f64::consts::FRAC_PI_2)),
            Self::Star => Some(ring(
                10,
                &|i| if i % 2 == 0 { s * 1.3 } else { s * 0.55 },
                std::f64::consts::FRAC_PI_2,
            )),
        }
    }
}

/// One x-axis column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelColumn {
    pub model: String,
    /// Data-space x position, 1-based.
    pub x: f64,
}

/// One plotted difference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Marker {
    pub model: String,
    pub test: String,
    /// Column position in data space.
    pub x: f64,
    /// Signed difference.
    pub y: f64,
    /// Horizontal offset applied in device pixels after mapping `(x, y)`.
    pub pixel_offset: i32,
    pub shape: MarkerShape,
    pub color: Rgb,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegendEntry {
    pub test: String,
    pub shape: MarkerShape,
    pub color: Rgb,
}

/// Fully resolved chart contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartLayout {
    pub columns: Vec<ModelColumn>,
    pub markers: Vec<Marker>,
    pub legend: Vec<LegendEntry>,
    /// Global band on the mean difference, spanning the whole x range.
    pub band: ConfidenceBand,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub y_label: String,
}

impl ChartLayout {
    /// Lay out a comparison using reference-table model and test order.
    pub fn build(
        reference: &ReferenceGrid,
        comparison: &Comparison,
        options: &ChartOptions,
    ) -> Result<Self, RenderError> {
        if reference.is_empty() {
            return Err(RenderError::EmptyLayout);
        }

        let columns: Vec<ModelColumn> = reference
            .models()
            .enumerate()
            .map(|(i, model)| ModelColumn {
                model: model.to_string(),
                x: (i + 1) as f64,
            })
            .collect();

        let tests = reference.tests();
        let mut markers = Vec::with_capacity(comparison.cells.len());
        for cell in &comparison.cells {
            let (Some(model_idx), Some(test_idx)) = (
                columns.iter().position(|c| c.model == cell.model),
                tests.iter().position(|t| *t == cell.test),
            ) else {
                continue;
            };
            let Some(difference) = cell.difference() else {
                continue;
            };
            markers.push(Marker {
                model: cell.model.clone(),
                test: cell.test.clone(),
                x: columns[model_idx].x,
                y: difference,
                pixel_offset: jitter_offset(test_idx, tests.len(), options.jitter_px),
                shape: MarkerShape::for_test(test_idx),
                color: MODEL_COLORS[model_idx % MODEL_COLORS.len()],
            });
        }

        let legend = tests
            .iter()
            .enumerate()
            .map(|(j, test)| LegendEntry {
                test: test.clone(),
                shape: MarkerShape::for_test(j),
                color: NEUTRAL_COLOR,
            })
            .collect();

        Ok(Self {
            x_range: (0.25, columns.len() as f64 + 0.75),
            y_range: (-options.y_limit, options.y_limit),
            columns,
            markers,
            legend,
            band: comparison.summary.band,
            y_label: Y_AXIS_LABEL.to_string(),
        })
    }

    /// Column x positions; the only x-axis ticks.
    pub fn column_positions(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.x).collect()
    }

    /// Model name for an x value that falls on a column.
    pub fn column_label(&self, x: f64) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| (c.x - x).abs() < 1e-6)
            .map(|c| c.model.as_str())
    }
}

/// Pixel offset of test `index` among `count` tests sharing one column.
pub fn jitter_offset(index: usize, count: usize, jitter_px: i32) -> i32 {
    let centred = index as f64 - count as f64 / 2.0;
    (jitter_px as f64 * centred).round() as i32
}
