//! Static SVG rendering of analysis results (feature = "plot").
//!
//! The `draw_*` functions work on any plotters drawing area; [`render_analysis`]
//! writes the standard four-figure sequence for one system to disk.

use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::analysis::{ComponentSeries, SystemAnalysis};
use crate::errors::AnalysisError;
use crate::math::{CScalar, Scalar};
use crate::simulation::TimeResponse;
use crate::systems::PhysicalSystem;

/// Pixel size of rendered figures.
pub const FIGURE_SIZE: (u32, u32) = (800, 600);

const TRACE_COLORS: [RGBColor; 6] = [
    BLUE,
    RED,
    GREEN,
    MAGENTA,
    CYAN,
    RGBColor(255, 140, 0),
];

fn plot_err<E>(err: DrawingAreaErrorKind<E>) -> AnalysisError
where
    E: std::error::Error + Send + Sync,
{
    AnalysisError::Plot(err.to_string())
}

/// Finite min/max of `values` widened by 5 %, never empty.
fn padded_range(values: impl IntoIterator<Item = Scalar>) -> Range<Scalar> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((Scalar::INFINITY, Scalar::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return -1.0..1.0;
    }
    let span = hi - lo;
    let pad = if span > 0.0 {
        0.05 * span
    } else {
        0.1 * lo.abs().max(1.0)
    };
    (lo - pad)..(hi + pad)
}

fn time_range(times: &[Scalar]) -> Range<Scalar> {
    match (times.first(), times.last()) {
        (Some(&start), Some(&end)) if end > start => start..end,
        (Some(&start), _) => start..start + 1.0,
        _ => 0.0..1.0,
    }
}

/// Draws a pole-zero map: poles as crosses, zeros as circles, axes through the origin.
///
/// # Errors
/// Returns [`AnalysisError::Plot`] when the backend fails.
pub fn draw_pole_zero_map<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    poles: &[CScalar],
    zeros: &[CScalar],
) -> Result<(), AnalysisError> {
    let roots = || poles.iter().chain(zeros);
    let x_range = padded_range(roots().map(|z| z.re).chain(std::iter::once(0.0)));
    let y_range = padded_range(roots().map(|z| z.im).chain(std::iter::once(0.0)));

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc("Real part")
        .y_desc("Imaginary part")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series([
            PathElement::new(vec![(x_range.start, 0.0), (x_range.end, 0.0)], BLACK.stroke_width(1)),
            PathElement::new(vec![(0.0, y_range.start), (0.0, y_range.end)], BLACK.stroke_width(1)),
        ])
        .map_err(plot_err)?;

    chart
        .draw_series(
            poles
                .iter()
                .map(|p| Cross::new((p.re, p.im), 7, RED.stroke_width(2))),
        )
        .map_err(plot_err)?
        .label("Poles")
        .legend(|(x, y)| Cross::new((x, y), 5, RED.stroke_width(2)));

    if !zeros.is_empty() {
        chart
            .draw_series(
                zeros
                    .iter()
                    .map(|z| Circle::new((z.re, z.im), 7, BLUE.stroke_width(2))),
            )
            .map_err(plot_err)?
            .label("Zeros")
            .legend(|(x, y)| Circle::new((x, y), 5, BLUE.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(plot_err)
}

/// Draws a single time-domain response.
///
/// # Errors
/// Returns [`AnalysisError::Plot`] when the backend fails.
pub fn draw_time_series<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    y_label: &str,
    response: &TimeResponse,
) -> Result<(), AnalysisError> {
    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(
            time_range(&response.times),
            padded_range(response.values.iter().copied()),
        )
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc("Time [s]")
        .y_desc(y_label)
        .draw()
        .map_err(plot_err)?;
    chart
        .draw_series(LineSeries::new(response.points(), BLUE.stroke_width(2)))
        .map_err(plot_err)?;
    Ok(())
}

/// Draws each partial-fraction component and their dashed sum.
///
/// # Errors
/// Returns [`AnalysisError::Plot`] when the backend fails.
pub fn draw_components<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    y_label: &str,
    series: &ComponentSeries,
) -> Result<(), AnalysisError> {
    let all_values = series
        .components
        .iter()
        .flat_map(|c| c.values.iter().copied())
        .chain(series.total.iter().copied());
    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(time_range(&series.times), padded_range(all_values))
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc("Time [s]")
        .y_desc(y_label)
        .draw()
        .map_err(plot_err)?;

    for (i, component) in series.components.iter().enumerate() {
        let color = TRACE_COLORS[i % TRACE_COLORS.len()];
        let points: Vec<(Scalar, Scalar)> = series
            .times
            .iter()
            .copied()
            .zip(component.values.iter().copied())
            .collect();
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(plot_err)?
            .label(format!("Component {}: {}", i + 1, component.term))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    let total: Vec<(Scalar, Scalar)> = series
        .times
        .iter()
        .copied()
        .zip(series.total.iter().copied())
        .collect();
    chart
        .draw_series(DashedLineSeries::new(total, 8, 5, BLACK.stroke_width(2)))
        .map_err(plot_err)?
        .label("Sum of components")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(2)));

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(plot_err)
}

fn render_svg<F>(path: &Path, draw: F) -> Result<(), AnalysisError>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> Result<(), AnalysisError>,
{
    let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    draw(&root)?;
    root.present().map_err(plot_err)
}

/// Renders the pole-zero map, impulse response, step response and partial-fraction
/// components of `analysis` into `out_dir`, in that order.
///
/// Files are named `<system>_pole_zero.svg`, `<system>_impulse.svg`,
/// `<system>_step.svg` and `<system>_partial_fractions.svg`.
///
/// # Errors
/// Returns [`AnalysisError::Io`] when the directory cannot be created, and the
/// simulation or plot error of the first figure that fails.
pub fn render_analysis<S: PhysicalSystem>(
    analysis: &SystemAnalysis<S>,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, AnalysisError> {
    std::fs::create_dir_all(out_dir)?;
    let system = analysis.system();
    let name = system.name();
    let y_label = system.output_label();
    let _span = tracing::info_span!("render_analysis", system = name).entered();

    let pole_zero = out_dir.join(format!("{name}_pole_zero.svg"));
    render_svg(&pole_zero, |root| {
        draw_pole_zero_map(
            root,
            &format!("Pole-zero map - {name}"),
            analysis.poles(),
            analysis.zeros(),
        )
    })?;

    let impulse = analysis.impulse_response()?;
    let impulse_path = out_dir.join(format!("{name}_impulse.svg"));
    render_svg(&impulse_path, |root| {
        draw_time_series(root, &format!("Impulse response - {name}"), y_label, &impulse)
    })?;

    let step = analysis.step_response()?;
    let step_path = out_dir.join(format!("{name}_step.svg"));
    render_svg(&step_path, |root| {
        draw_time_series(root, &format!("Step response - {name}"), y_label, &step)
    })?;

    let components = analysis.partial_fraction_components()?;
    let components_path = out_dir.join(format!("{name}_partial_fractions.svg"));
    render_svg(&components_path, |root| {
        draw_components(
            root,
            &format!("Partial-fraction components - {name}"),
            y_label,
            &components,
        )
    })?;

    let written = vec![pole_zero, impulse_path, step_path, components_path];
    for path in &written {
        tracing::info!(path = %path.display(), "wrote figure");
    }
    Ok(written)
}
