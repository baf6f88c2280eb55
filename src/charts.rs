//! SVG chart export for the three dashboard views (plotters SVG backend).

use crate::aggregate::{Scale, TopCropView};
use crate::error::{DashboardError, Result};
use crate::types::{CropCount, YearlyPoint};
use plotters::prelude::*;
use std::fmt::Display;
use std::path::Path;

const LINE_SIZE: (u32, u32) = (900, 500);
const BAR_SIZE: (u32, u32) = (900, 450);

fn render_err<E: Display>(e: E) -> DashboardError {
    DashboardError::Render(e.to_string())
}

/// Y span for bar charts: always includes zero, headroom above the tallest
/// bar, never degenerate.
pub fn bar_range(values: &[f64]) -> (f64, f64) {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if hi - lo <= f64::EPSILON {
        return (lo, lo + 1.0);
    }
    let pad = (hi - lo) * 0.1;
    (if lo < 0.0 { lo - pad } else { lo }, hi + pad)
}

/// Y span for line charts: padded min..max of the finite values.
pub fn line_range(values: &[f64]) -> (f64, f64) {
    let mut finite = values.iter().copied().filter(|v| v.is_finite()).peekable();
    if finite.peek().is_none() {
        return (0.0, 1.0);
    }
    let (lo, hi) = finite.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = if hi - lo <= f64::EPSILON {
        hi.abs().max(1.0) * 0.1
    } else {
        (hi - lo) * 0.05
    };
    (lo - pad, hi + pad)
}

/// X span for the trend chart, widened by a year on each side.
pub fn year_range(trend: &[YearlyPoint]) -> (i32, i32) {
    let lo = trend.iter().map(|p| p.year).min().unwrap_or(0);
    let hi = trend.iter().map(|p| p.year).max().unwrap_or(lo);
    (lo - 1, hi + 1)
}

/// Production and yield per year as two line series with markers.
pub fn render_trend_svg(path: &Path, district: &str, trend: &[YearlyPoint]) -> Result<()> {
    let production: Vec<(i32, f64)> = trend
        .iter()
        .filter(|p| p.production.is_finite())
        .map(|p| (p.year, p.production))
        .collect();
    let yields: Vec<(i32, f64)> = trend
        .iter()
        .filter(|p| p.yield_.is_finite())
        .map(|p| (p.year, p.yield_))
        .collect();
    let all: Vec<f64> = production.iter().chain(&yields).map(|(_, v)| *v).collect();
    let (x0, x1) = year_range(trend);
    let (y0, y1) = line_range(&all);

    let root = SVGBackend::new(path, LINE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Yearly Trend in {}", district), ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Values")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(production.iter().copied(), &BLUE))
        .map_err(render_err)?
        .label("Production")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
    chart
        .draw_series(production.iter().map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())))
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(yields.iter().copied(), &RED))
        .map_err(render_err)?
        .label("Yield")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
    chart
        .draw_series(yields.iter().map(|&(x, y)| Circle::new((x, y), 3, RED.filled())))
        .map_err(render_err)?;

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(render_err)?;
    root.present().map_err(render_err)?;
    Ok(())
}

fn render_bars_svg(
    path: &Path,
    title: &str,
    y_desc: &str,
    labels: &[String],
    values: &[f64],
) -> Result<()> {
    let n = labels.len().max(1) as u32;
    let (y0, y1) = bar_range(values);

    let root = SVGBackend::new(path, BAR_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d((0u32..n).into_segmented(), y0..y1)
        .map_err(render_err)?;

    let label_of = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Crop")
        .y_desc(y_desc)
        .x_labels(n as usize)
        .x_label_formatter(&label_of)
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.mix(0.7).filled())
                .margin(8)
                .data(
                    values
                        .iter()
                        .enumerate()
                        .filter(|(_, v)| v.is_finite())
                        .map(|(i, v)| (i as u32, *v)),
                ),
        )
        .map_err(render_err)?;
    root.present().map_err(render_err)?;
    Ok(())
}

/// Bar chart of the most frequently sown crops. An empty list still yields
/// an (empty) chart.
pub fn render_crop_distribution_svg(path: &Path, counts: &[CropCount]) -> Result<()> {
    let labels: Vec<String> = counts.iter().map(|c| c.crop.clone()).collect();
    let values: Vec<f64> = counts.iter().map(|c| c.count as f64).collect();
    render_bars_svg(path, "Most Frequently Sown Crops", "Count", &labels, &values)
}

/// Bar chart of top crops by mean production. `values` are the already
/// scaled plot values, in the same order as `view`.
pub fn render_top_crops_svg(
    path: &Path,
    view: &TopCropView,
    values: &[f64],
    scale: Scale,
) -> Result<()> {
    let labels: Vec<String> = view.labels().into_iter().map(str::to_string).collect();
    render_bars_svg(path, scale.chart_title(), scale.axis_label(), &labels, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_range_includes_zero_and_headroom() {
        assert_eq!(bar_range(&[]), (0.0, 1.0));
        assert_eq!(bar_range(&[0.0, 0.0]), (0.0, 1.0));
        let (lo, hi) = bar_range(&[10.0, 50.0, f64::NAN]);
        assert_eq!(lo, 0.0);
        assert!((hi - 55.0).abs() < 1e-9);
        let (lo, hi) = bar_range(&[-10.0, 10.0]);
        assert!(lo < -10.0);
        assert!(hi > 10.0);
    }

    #[test]
    fn line_range_pads_and_handles_flat_series() {
        assert_eq!(line_range(&[f64::NAN]), (0.0, 1.0));
        let (lo, hi) = line_range(&[100.0, 200.0]);
        assert!((lo - 95.0).abs() < 1e-9);
        assert!((hi - 205.0).abs() < 1e-9);
        let (lo, hi) = line_range(&[5.0, 5.0]);
        assert!(lo < 5.0 && hi > 5.0);
    }

    #[test]
    fn year_range_is_widened() {
        let trend = vec![
            YearlyPoint { year: 2001, production: 1.0, yield_: 1.0 },
            YearlyPoint { year: 2004, production: 1.0, yield_: 1.0 },
        ];
        assert_eq!(year_range(&trend), (2000, 2005));
    }

    #[test]
    fn writes_svg_files() {
        let dir = tempfile::tempdir().unwrap();

        let trend = vec![
            YearlyPoint { year: 2001, production: 10.0, yield_: 2.0 },
            YearlyPoint { year: 2002, production: f64::NAN, yield_: 3.0 },
        ];
        let path = dir.path().join("trend.svg");
        render_trend_svg(&path, "SALEM", &trend).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Yearly Trend in SALEM"));

        let counts = vec![CropCount { crop: "Rice".into(), count: 3 }];
        let path = dir.path().join("dist.svg");
        render_crop_distribution_svg(&path, &counts).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Most Frequently Sown Crops"));

        let path = dir.path().join("empty.svg");
        render_crop_distribution_svg(&path, &[]).unwrap();
        assert!(path.exists());
    }
}
