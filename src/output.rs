use crate::charts;
use crate::dashboard::DashboardView;
use crate::error::Result;
use crate::types::{
    CropCountRow, DistrictRow, Insight, InsightSummary, NumericColumn, RankedGroup, TopCropRow,
    TrendRow,
};
use crate::util::{format_int, format_number};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown-style table, or a placeholder line when there is nothing to show.
pub fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows).with(Style::markdown()).to_string()
}

pub fn district_rows(ranking: &[RankedGroup]) -> Vec<DistrictRow> {
    ranking
        .iter()
        .enumerate()
        .map(|(idx, g)| DistrictRow {
            rank: idx + 1,
            district: g.label.clone(),
            mean_production: format_number(g.mean, 2),
            records: format_int(g.count),
        })
        .collect()
}

pub fn trend_rows(view: &DashboardView) -> Vec<TrendRow> {
    view.trend
        .iter()
        .flatten()
        .map(|p| TrendRow {
            year: p.year,
            production: format_number(p.production, 2),
            yield_: format_number(p.yield_, 2),
        })
        .collect()
}

pub fn crop_count_rows(view: &DashboardView) -> Vec<CropCountRow> {
    view.crop_distribution
        .iter()
        .map(|c| CropCountRow {
            crop: c.crop.clone(),
            count: format_int(c.count),
        })
        .collect()
}

pub fn top_crop_rows(view: &DashboardView) -> Vec<TopCropRow> {
    view.top_crops
        .entries
        .iter()
        .zip(&view.top_crop_values)
        .enumerate()
        .map(|(idx, (e, plotted))| TopCropRow {
            rank: idx + 1,
            crop: e.crop.clone(),
            mean_production: format_number(e.mean_production, 2),
            plotted: format_number(*plotted, 2),
        })
        .collect()
}

pub fn insight_line(insight: &Insight) -> String {
    if insight.derived {
        format!("- {}", insight.text)
    } else {
        format!("- {} (static note, not computed)", insight.text)
    }
}

pub fn print_districts(state_display: &str, rank_by: NumericColumn, ranking: &[RankedGroup]) {
    println!(
        "Top {} districts in {} by mean {}\n",
        ranking.len(),
        state_display,
        rank_by
    );
    println!("{}\n", render_table(district_rows(ranking)));
}

pub fn print_dashboard(view: &DashboardView) {
    println!("\n{}", view.title);
    println!("{}\n", view.subtitle());
    println!(
        "Matching rows: {}\n",
        format_int(view.filtered_rows)
    );

    println!("Yearly Trend in {}\n", view.selection.district);
    if view.trend.is_some() {
        println!("{}\n", render_table(trend_rows(view)));
    } else {
        println!("No data for this selection.\n");
    }

    println!("Crop Distribution (Most Frequently Sown Crops)\n");
    println!("{}\n", render_table(crop_count_rows(view)));

    println!("{}\n", view.scale.chart_title());
    println!("{}\n", render_table(top_crop_rows(view)));
    if let Some(caption) = view.scale.caption() {
        println!("{}\n", caption);
    }

    println!("Key Insights for this District\n");
    match &view.insights {
        Some(insights) => {
            for insight in insights {
                println!("{}", insight_line(insight));
            }
            println!();
        }
        None => println!("No data for this selection.\n"),
    }

    println!("Project Motivation\n");
    println!("{}\n", view.motivation);
}

/// Write every view of `view` into `dir` and return the files written.
pub fn export(view: &DashboardView, state_display: &str, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    if let Some(trend) = &view.trend {
        let path = dir.join("yearly_trend.csv");
        write_csv(&path, trend)?;
        written.push(path);
        let path = dir.join("yearly_trend.svg");
        charts::render_trend_svg(&path, &view.selection.district, trend)?;
        written.push(path);
    }

    let path = dir.join("crop_distribution.csv");
    write_csv(&path, &view.crop_distribution)?;
    written.push(path);
    let path = dir.join("crop_distribution.svg");
    charts::render_crop_distribution_svg(&path, &view.crop_distribution)?;
    written.push(path);

    let path = dir.join("top_crops.csv");
    write_csv(&path, &view.top_crops.entries)?;
    written.push(path);
    let path = dir.join("top_crops.svg");
    charts::render_top_crops_svg(&path, &view.top_crops, &view.top_crop_values, view.scale)?;
    written.push(path);

    let summary = InsightSummary {
        generated_at: chrono::Local::now().to_rfc3339(),
        state: state_display.to_string(),
        selection: view.selection.clone(),
        filtered_rows: view.filtered_rows,
        insights: view.insights.clone().unwrap_or_default(),
    };
    let path = dir.join("insights.json");
    write_json(&path, &summary)?;
    written.push(path);

    info!(files = written.len(), dir = %dir.display(), "exports written");
    Ok(written)
}
