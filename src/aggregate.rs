use crate::error::{DashboardError, Result};
use crate::ranking::top_k;
use crate::types::{CategoryColumn, CropCount, CropProduction, NumericColumn, Record, YearlyPoint};
use crate::util::{log1p_checked, mean};
use std::collections::BTreeMap;

/// Entries in each crop view, independent of the district list size.
pub const CROP_VIEW_SIZE: usize = 10;

/// How the top-crop bars are plotted. Ranking never depends on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Linear,
    Log1p,
}

impl Scale {
    pub fn from_flag(log_scale: bool) -> Self {
        if log_scale {
            Scale::Log1p
        } else {
            Scale::Linear
        }
    }

    pub fn axis_label(self) -> &'static str {
        match self {
            Scale::Linear => "Average Production",
            Scale::Log1p => "Log(Production + 1)",
        }
    }

    pub fn chart_title(self) -> &'static str {
        match self {
            Scale::Linear => "Top Crops by Production",
            Scale::Log1p => "Top Crops by Production (Log Scale)",
        }
    }

    pub fn caption(self) -> Option<&'static str> {
        match self {
            Scale::Linear => None,
            Scale::Log1p => {
                Some("Note: Log scale applied to reduce skew (e.g., Coconut values in millions).")
            }
        }
    }
}

/// Mean production and yield per crop year, ascending by year. An empty
/// table is `InsufficientData`.
pub fn yearly_trend(records: &[Record]) -> Result<Vec<YearlyPoint>> {
    if records.is_empty() {
        return Err(DashboardError::InsufficientData);
    }
    let mut by_year: BTreeMap<i32, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for r in records {
        let e = by_year.entry(r.crop_year).or_default();
        if let Some(p) = r.production {
            e.0.push(p);
        }
        if let Some(y) = r.yield_ {
            e.1.push(y);
        }
    }
    Ok(by_year
        .into_iter()
        .map(|(year, (production, yields))| YearlyPoint {
            year,
            production: mean(&production),
            yield_: mean(&yields),
        })
        .collect())
}

/// The `k` most frequently sown crops.
pub fn crop_distribution(records: &[Record], k: usize) -> Vec<CropCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in records {
        *counts.entry(r.category(CategoryColumn::Crop)).or_insert(0) += 1;
    }
    let mut out: Vec<CropCount> = counts
        .into_iter()
        .map(|(crop, count)| CropCount {
            crop: crop.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out.truncate(k);
    out
}

/// Top crops by raw mean production. Display scaling is applied later via
/// [`TopCropView::display_values`] and cannot change the order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TopCropView {
    pub entries: Vec<CropProduction>,
}

impl TopCropView {
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.crop.as_str()).collect()
    }

    pub fn display_values(&self, scale: Scale) -> Result<Vec<f64>> {
        self.entries
            .iter()
            .map(|e| match scale {
                Scale::Linear => Ok(e.mean_production),
                Scale::Log1p => {
                    log1p_checked(e.mean_production).ok_or_else(|| DashboardError::InvalidLogInput {
                        label: e.crop.clone(),
                        value: e.mean_production,
                    })
                }
            })
            .collect()
    }
}

/// Same ranking as the district selector, applied to crops. An empty table
/// gives an empty view.
pub fn top_crop_production(records: &[Record], k: usize) -> Result<TopCropView> {
    if records.is_empty() {
        return Ok(TopCropView::default());
    }
    let entries = top_k(records, CategoryColumn::Crop, NumericColumn::Production, k)?
        .into_iter()
        .map(|g| CropProduction {
            crop: g.label,
            mean_production: g.mean,
        })
        .collect();
    Ok(TopCropView { entries })
}
