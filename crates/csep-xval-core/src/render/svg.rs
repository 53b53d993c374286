//! SVG drawing of a [`ChartLayout`] with plotters.

use plotters::coord::combinators::{BindKeyPoints, WithKeyPoints};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::layout::{ChartLayout, ChartOptions, MarkerShape, Rgb};
use crate::domain::RenderError;

type PlotArea<'a> =
    DrawingArea<SVGBackend<'a>, Cartesian2d<WithKeyPoints<RangedCoordf64>, RangedCoordf64>>;
type DrawResult<T> = Result<T, DrawingAreaErrorKind<std::io::Error>>;

const FONT: &str = "sans-serif";

/// Fill of the confidence band, drawn at 20% opacity.
const BAND_COLOR: Rgb = Rgb(160, 160, 160);

/// Stroke of the dashed zero line.
const ZERO_LINE_COLOR: Rgb = Rgb(64, 64, 64);

/// Render the layout to an SVG document.
pub fn render_svg(layout: &ChartLayout, options: &ChartOptions) -> Result<String, RenderError> {
    if layout.columns.is_empty() {
        return Err(RenderError::EmptyLayout);
    }
    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (options.width, options.height)).into_drawing_area();
        draw_chart(&root, layout, options).map_err(|e| RenderError::Draw(e.to_string()))?;
        root.present().map_err(|e| RenderError::Draw(e.to_string()))?;
    }
    Ok(svg)
}

fn draw_chart(
    root: &DrawingArea<SVGBackend<'_>, plotters::coord::Shift>,
    layout: &ChartLayout,
    options: &ChartOptions,
) -> DrawResult<()> {
    root.fill(&WHITE)?;

    let (x0, x1) = layout.x_range;
    let (y0, y1) = layout.y_range;
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .x_label_area_size(110)
        .y_label_area_size(80)
        .build_cartesian_2d(
            (x0..x1).with_key_points(layout.column_positions()),
            y0..y1,
        )?;

    let label = |x: &f64| layout.column_label(*x).unwrap_or_default().to_string();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(layout.columns.len())
        .x_label_formatter(&label)
        .x_label_style(
            TextStyle::from((FONT, 14).into_font().transform(FontTransform::Rotate90))
                .pos(Pos::new(HPos::Left, VPos::Center)),
        )
        .y_labels(11)
        .y_label_formatter(&|y| format!("{:.3}", y))
        .y_desc(layout.y_label.as_str())
        .label_style((FONT, 14))
        .axis_desc_style((FONT, 16))
        .draw()?;

    // band first so markers stay on top
    let band = layout.band;
    chart.draw_series(std::iter::once(Rectangle::new(
        [(x0, band.lower), (x1, band.upper)],
        color(BAND_COLOR).mix(0.2).filled(),
    )))?;

    chart.draw_series(DashedLineSeries::new(
        vec![(x0, 0.0), (x1, 0.0)],
        6,
        4,
        color(ZERO_LINE_COLOR).stroke_width(1),
    ))?;

    let area = chart.plotting_area();
    for marker in &layout.markers {
        draw_marker(
            area,
            (marker.x, marker.y),
            marker.shape,
            (marker.pixel_offset, 0),
            options.marker_size,
            color(marker.color).filled(),
        )?;
    }

    draw_legend(area, layout, options)
}

fn draw_marker(
    area: &PlotArea<'_>,
    anchor: (f64, f64),
    shape: MarkerShape,
    (dx, dy): (i32, i32),
    size: i32,
    style: ShapeStyle,
) -> DrawResult<()> {
    match shape.vertices(dx, dy, size) {
        None => area.draw(&(EmptyElement::at(anchor) + Circle::new((dx, dy), size, style))),
        Some(points) => area.draw(&(EmptyElement::at(anchor) + Polygon::new(points, style))),
    }
}

/// Legend box in the upper-right corner, one row per test.
fn draw_legend(
    area: &PlotArea<'_>,
    layout: &ChartLayout,
    options: &ChartOptions,
) -> DrawResult<()> {
    if layout.legend.is_empty() {
        return Ok(());
    }
    let anchor = (layout.x_range.1, layout.y_range.1);
    let row_height = 22;
    let width = 130;
    let height = row_height * layout.legend.len() as i32 + 10;

    area.draw(
        &(EmptyElement::at(anchor)
            + Rectangle::new([(-width - 10, 10), (-10, 10 + height)], WHITE.mix(0.8).filled())),
    )?;
    area.draw(
        &(EmptyElement::at(anchor)
            + Rectangle::new([(-width - 10, 10), (-10, 10 + height)], BLACK.mix(0.5))),
    )?;

    for (i, entry) in layout.legend.iter().enumerate() {
        let y = 10 + row_height / 2 + 5 + row_height * i as i32;
        draw_marker(
            area,
            anchor,
            entry.shape,
            (-width + 4, y),
            options.marker_size,
            color(entry.color).filled(),
        )?;
        area.draw(
            &(EmptyElement::at(anchor)
                + Text::new(
                    entry.test.clone(),
                    (-width + 16, y),
                    TextStyle::from((FONT, 14).into_font())
                        .pos(Pos::new(HPos::Left, VPos::Center)),
                )),
        )?;
    }
    Ok(())
}

fn color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QuantileKind, ReferenceGrid};
    use crate::stats::{summarize, CellOutcome, Comparison, ComparisonCell};

    fn layout() -> ChartLayout {
        let tests = vec!["n-test1".to_string(), "l-test".to_string()];
        let mut grid = ReferenceGrid::new(tests);
        for model in ["shen", "kagan"] {
            grid.push_row(model.to_string(), vec!["0.1".to_string(), "0.2".to_string()])
                .expect("row");
        }
        let cells: Vec<ComparisonCell> = grid
            .cells()
            .map(|(model, test, text)| ComparisonCell {
                model: model.to_string(),
                test: test.to_string(),
                live: 0.101,
                kind: QuantileKind::OneSided,
                reference_text: text.to_string(),
                outcome: CellOutcome::Compared {
                    reference: 0.1,
                    difference: 0.001,
                },
            })
            .collect();
        let summary = summarize(vec![0.001, -0.002, 0.0, 0.003], 0).expect("summary");
        ChartLayout::build(&grid, &Comparison { cells, summary }, &ChartOptions::default())
            .expect("layout")
    }

    #[test]
    fn test_svg_contains_labels() {
        let svg = render_svg(&layout(), &ChartOptions::default()).expect("render");
        assert!(svg.contains("<svg"));
        assert!(svg.contains("shen"));
        assert!(svg.contains("kagan"));
        assert!(svg.contains("n-test1"));
        assert!(svg.contains("l-test"));
        assert!(svg.contains("Quantile score error"));
    }

    #[test]
    fn test_svg_draws_band_and_dashed_zero_line() {
        let svg = render_svg(&layout(), &ChartOptions::default())
            .expect("render")
            .to_ascii_uppercase();
        assert_eq!(svg.matches("#A0A0A0").count(), 1, "one band rectangle");
        assert!(
            svg.matches("#404040").count() > 10,
            "zero line should be split into dashes"
        );
    }

    #[test]
    fn test_empty_layout_is_rejected() {
        let mut empty = layout();
        empty.columns.clear();
        assert!(matches!(
            render_svg(&empty, &ChartOptions::default()),
            Err(RenderError::EmptyLayout)
        ));
    }
}
