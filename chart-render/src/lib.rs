use fn_core::{AxisSpec, SampleSeries};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use thiserror::Error;

/// Dark theme colours shared by every chart.
pub mod palette {
    use plotters::style::{RGBAColor, RGBColor};

    pub const BACKGROUND: RGBColor = RGBColor(0x1E, 0x1E, 0x1E);
    pub const GRID: RGBColor = RGBColor(0x2E, 0x2E, 0x2E);
    pub const AXIS: RGBColor = RGBColor(0x55, 0x55, 0x55);
    pub const TEXT: RGBColor = RGBColor(0xCC, 0xCC, 0xCC);

    pub const LINE_BLUE: RGBColor = RGBColor(0x4B, 0x9E, 0xFF);
    pub const LINE_RED: RGBColor = RGBColor(0xFF, 0x41, 0x36);

    pub const ANNOTATION_FILL: RGBAColor = RGBAColor(0, 0, 0, 0.5);
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("drawing backend error: {0}")]
    Backend(String),
    #[error("invalid chart size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("empty axis range [{min}, {max}]")]
    InvalidAxis { min: f64, max: f64 },
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Backend(err.to_string())
    }
}

/// One plotted curve.
#[derive(Debug, Clone)]
pub struct Trace {
    pub name: String,
    pub series: SampleSeries,
    pub color: RGBColor,
}

impl Trace {
    pub fn new(name: impl Into<String>, series: SampleSeries, color: RGBColor) -> Self {
        Self {
            name: name.into(),
            series,
            color,
        }
    }
}

/// Fixed layout of a chart: size, axes, titles and the formula box.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub x_title: String,
    pub y_title: String,
    /// Lines of the boxed legend in the upper right corner.
    pub annotation: Vec<String>,
    pub annotation_font_size: u32,
    pub line_width: u32,
}

pub const CHART_WIDTH: u32 = 1100;
pub const CHART_HEIGHT: u32 = 600;

impl ChartSpec {
    pub fn new(x_axis: AxisSpec, y_axis: AxisSpec) -> Self {
        Self {
            title: None,
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
            margin: 50,
            x_axis,
            y_axis,
            x_title: "x".to_string(),
            y_title: "y".to_string(),
            annotation: Vec::new(),
            annotation_font_size: 14,
            line_width: 2,
        }
    }

    /// Layout of the quadratic demo.
    pub fn quadratic(annotation: Vec<String>) -> Self {
        Self {
            annotation,
            annotation_font_size: 16,
            ..Self::new(
                AxisSpec::new(-25.0, 25.0, 5.0, 2.5),
                AxisSpec::new(-250.0, 250.0, 50.0, 25.0),
            )
        }
    }

    /// Layout of the transformation demo.
    pub fn transformation(annotation: Vec<String>) -> Self {
        Self {
            title: Some("Function Transformation Visualization".to_string()),
            annotation,
            ..Self::new(
                AxisSpec::new(-10.0, 10.0, 2.0, 1.0),
                AxisSpec::new(-10.0, 10.0, 2.0, 1.0),
            )
        }
    }

    fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        for axis in [&self.x_axis, &self.y_axis] {
            if !(axis.min.is_finite() && axis.max.is_finite() && axis.min < axis.max) {
                return Err(RenderError::InvalidAxis {
                    min: axis.min,
                    max: axis.max,
                });
            }
        }
        Ok(())
    }
}

/// Renders the chart to a standalone SVG document.
pub fn render_svg(spec: &ChartSpec, traces: &[Trace]) -> Result<String, RenderError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (spec.width, spec.height)).into_drawing_area();
        draw_chart(&root, spec, traces)?;
        root.present()?;
    }
    Ok(svg)
}

/// Draws onto any plotters backend: background, grid, zero lines, axes,
/// curves (clipped to the axis window) and the formula box.
pub fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    traces: &[Trace],
) -> Result<(), RenderError> {
    spec.validate()?;
    root.fill(&palette::BACKGROUND)?;

    let text = |size: u32| ("sans-serif", size).into_font().color(&palette::TEXT);
    let (x, y) = (&spec.x_axis, &spec.y_axis);

    let mut builder = ChartBuilder::on(root);
    builder
        .margin(spec.margin)
        .x_label_area_size(40)
        .y_label_area_size(60);
    if let Some(title) = &spec.title {
        builder.caption(title, text(20));
    }
    let mut chart = builder.build_cartesian_2d(x.range(), y.range())?;

    // Minor grid first so major lines sit on top.
    let verticals = x.minor_ticks().into_iter().chain(x.major_ticks());
    chart.draw_series(
        verticals
            .filter(|v| *v != 0.0)
            .map(|v| PathElement::new(vec![(v, y.min), (v, y.max)], palette::GRID.stroke_width(1))),
    )?;
    let horizontals = y.minor_ticks().into_iter().chain(y.major_ticks());
    chart.draw_series(
        horizontals
            .filter(|v| *v != 0.0)
            .map(|v| PathElement::new(vec![(x.min, v), (x.max, v)], palette::GRID.stroke_width(1))),
    )?;

    if x.contains(0.0) {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(0.0, y.min), (0.0, y.max)],
            palette::AXIS.stroke_width(2),
        )))?;
    }
    if y.contains(0.0) {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x.min, 0.0), (x.max, 0.0)],
            palette::AXIS.stroke_width(2),
        )))?;
    }

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(spec.x_title.as_str())
        .y_desc(spec.y_title.as_str())
        .x_labels(x.major_ticks().len())
        .y_labels(y.major_ticks().len())
        .x_label_formatter(&|v: &f64| format_tick(*v))
        .y_label_formatter(&|v: &f64| format_tick(*v))
        .axis_style(palette::AXIS.stroke_width(1))
        .label_style(text(12))
        .axis_desc_style(text(14))
        .draw()?;

    for trace in traces {
        for run in trace.series.visible_runs(x, y) {
            chart.draw_series(LineSeries::new(
                run,
                trace.color.stroke_width(spec.line_width),
            ))?;
        }
    }

    draw_annotation(root, spec)?;
    Ok(())
}

const ANNOTATION_PAD: i32 = 6;

fn draw_annotation<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
) -> Result<(), RenderError> {
    if spec.annotation.is_empty() {
        return Ok(());
    }
    let font_size = spec.annotation_font_size as i32;
    let style = ("monospace", spec.annotation_font_size)
        .into_font()
        .style(FontStyle::Bold)
        .color(&palette::TEXT);
    let line_height = font_size + 6;
    // Monospace glyphs are roughly 0.6em wide.
    let widest = spec
        .annotation
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0) as i32;
    let width = widest * font_size * 6 / 10 + 2 * ANNOTATION_PAD;
    let height = line_height * spec.annotation.len() as i32 + 2 * ANNOTATION_PAD;

    let (root_w, _) = root.dim_in_pixel();
    let right = root_w as i32 - spec.margin as i32 - 10;
    let top = spec.margin as i32 + 10;
    let corners = [(right - width, top), (right, top + height)];

    root.draw(&Rectangle::new(corners, palette::ANNOTATION_FILL.filled()))?;
    root.draw(&Rectangle::new(corners, palette::TEXT.stroke_width(2)))?;
    for (i, line) in spec.annotation.iter().enumerate() {
        let pos = (
            right - width + ANNOTATION_PAD,
            top + ANNOTATION_PAD + i as i32 * line_height,
        );
        root.draw(&Text::new(line.as_str(), pos, style.clone()))?;
    }
    Ok(())
}

fn format_tick(v: f64) -> String {
    // Avoid "-0" on the zero tick.
    let v = if v == 0.0 { 0.0 } else { v };
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}
