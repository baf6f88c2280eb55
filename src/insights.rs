use crate::aggregate::TopCropView;
use crate::error::{DashboardError, Result};
use crate::types::{Insight, InsightKind, Selection, YearlyPoint};

const MAJOR_CROP_COUNT: usize = 5;

const SEASONAL_DIVERSITY_NOTE: &str =
    "Crop diversity is higher in Rabi season crops compared to Kharif in this district.";

/// Outcome of comparing the last sample of a series against the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Rising,
    NotRising,
}

impl TrendDirection {
    /// Strictly greater counts as rising; equal or NaN does not.
    pub fn classify(first: f64, last: f64) -> Self {
        if last > first {
            TrendDirection::Rising
        } else {
            TrendDirection::NotRising
        }
    }

    fn of_series(points: &[YearlyPoint], value: impl Fn(&YearlyPoint) -> f64) -> Result<Self> {
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Err(DashboardError::InsufficientData);
        };
        Ok(Self::classify(value(first), value(last)))
    }
}

/// Names that the sentences need beyond the selection itself.
#[derive(Debug, Clone)]
pub struct NarrationContext {
    pub state_display: String,
    pub top_k: usize,
}

/// Build the five insight sentences for a render pass.
pub fn narrate(
    selection: &Selection,
    ctx: &NarrationContext,
    trend: &[YearlyPoint],
    top_crops: &TopCropView,
) -> Result<Vec<Insight>> {
    let production = TrendDirection::of_series(trend, |p| p.production)?;
    let yields = TrendDirection::of_series(trend, |p| p.yield_)?;
    let (lo, hi) = selection.years;

    let major: Vec<&str> = top_crops
        .labels()
        .into_iter()
        .take(MAJOR_CROP_COUNT)
        .collect();

    Ok(vec![
        Insight {
            kind: InsightKind::TopDistrict,
            text: format!(
                "{} is one of the Top {} agricultural districts in {}.",
                selection.district, ctx.top_k, ctx.state_display
            ),
            derived: true,
        },
        Insight {
            kind: InsightKind::MajorCrops,
            text: format!(
                "The major crops cultivated here include: {}.",
                major.join(", ")
            ),
            derived: true,
        },
        Insight {
            kind: InsightKind::ProductionTrend,
            text: format!(
                "Over the selected years ({lo}–{hi}), production shows {} trend.",
                match production {
                    TrendDirection::Rising => "an increasing",
                    TrendDirection::NotRising => "a decreasing",
                }
            ),
            derived: true,
        },
        Insight {
            kind: InsightKind::YieldTrend,
            text: format!(
                "Yield levels indicate {} in farming efficiency.",
                match yields {
                    TrendDirection::Rising => "improvement",
                    TrendDirection::NotRising => "stability/decline",
                }
            ),
            derived: true,
        },
        Insight {
            kind: InsightKind::SeasonalDiversity,
            text: SEASONAL_DIVERSITY_NOTE.to_string(),
            derived: false,
        },
    ])
}
