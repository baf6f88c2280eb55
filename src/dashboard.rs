use crate::aggregate::{
    crop_distribution, top_crop_production, yearly_trend, Scale, TopCropView, CROP_VIEW_SIZE,
};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::filter::{clamp_years, filter_selection, validate_selection};
use crate::insights::{narrate, NarrationContext};
use crate::loader::Dataset;
use crate::ranking::{labels, top_k};
use crate::types::{
    CategoryColumn, CropCount, Insight, NumericColumn, RankedGroup, Selection, YearlyPoint,
};
use crate::util::title_case;
use std::sync::Arc;
use tracing::debug;

pub fn motivation(state_display: &str) -> String {
    format!(
        "This project was designed to analyze agricultural performance at the district level \
         in {state_display}, highlighting key crops and trends. By narrowing down to the \
         top-performing districts and enabling interactive insights, this dashboard shows how \
         data can help in decision-making for crop planning, policy, and food security."
    )
}

/// Everything one render pass produces for the presentation layer.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub title: String,
    pub selection: Selection,
    pub filtered_rows: usize,
    /// `None` when the selection matched no rows.
    pub trend: Option<Vec<YearlyPoint>>,
    pub crop_distribution: Vec<CropCount>,
    pub top_crops: TopCropView,
    /// Plotted values for `top_crops`, already scaled.
    pub top_crop_values: Vec<f64>,
    pub scale: Scale,
    /// `None` when there was not enough data to narrate.
    pub insights: Option<Vec<Insight>>,
    pub motivation: String,
}

impl DashboardView {
    pub fn subtitle(&self) -> String {
        let (lo, hi) = self.selection.years;
        format!("District: {}, Years: {}–{}", self.selection.district, lo, hi)
    }
}

/// The loaded dataset plus the district ranking derived from it once.
pub struct Dashboard {
    dataset: Arc<Dataset>,
    ranking: Vec<RankedGroup>,
    rank_by: NumericColumn,
    districts: Vec<String>,
    bounds: (i32, i32),
    top_k: usize,
    state_display: String,
}

impl Dashboard {
    pub fn new(dataset: Arc<Dataset>, config: &DashboardConfig) -> Result<Self> {
        let bounds = dataset.year_bounds().ok_or(DashboardError::EmptyInput)?;
        let rank_by: NumericColumn = config.rank_by.parse()?;
        let ranking = top_k(&dataset.records, CategoryColumn::District, rank_by, config.top_k)?;
        let districts = labels(&ranking);
        debug!(districts = districts.len(), "district ranking computed");
        Ok(Dashboard {
            state_display: title_case(&dataset.state),
            dataset,
            ranking,
            rank_by,
            districts,
            bounds,
            top_k: config.top_k,
        })
    }

    pub fn state_display(&self) -> &str {
        &self.state_display
    }

    pub fn districts(&self) -> &[String] {
        &self.districts
    }

    pub fn ranking(&self) -> &[RankedGroup] {
        &self.ranking
    }

    pub fn year_bounds(&self) -> (i32, i32) {
        self.bounds
    }

    pub fn rank_by(&self) -> NumericColumn {
        self.rank_by
    }

    /// Starting selection: the requested (or top ranked) district and the
    /// configured year range pulled into the data's bounds.
    pub fn initial_selection(
        &self,
        district: Option<&str>,
        config: &DashboardConfig,
    ) -> Result<Selection> {
        let district = match district {
            Some(d) => d.to_string(),
            None => self
                .districts
                .first()
                .cloned()
                .ok_or(DashboardError::EmptyInput)?,
        };
        let selection = Selection {
            district,
            years: clamp_years(config.default_years(), self.bounds),
            log_scale: config.log_scale,
        };
        validate_selection(&selection, &self.districts, self.bounds)?;
        Ok(selection)
    }

    /// Full recomputation for one selection. Missing data for the trend or
    /// the insights degrades to `None`; anything else fails the pass.
    pub fn render(&self, selection: &Selection) -> Result<DashboardView> {
        validate_selection(selection, &self.districts, self.bounds)?;
        let (lo, hi) = selection.years;
        let filtered = filter_selection(&self.dataset.records, &selection.district, lo, hi);
        debug!(
            district = %selection.district,
            lo,
            hi,
            rows = filtered.len(),
            "render pass"
        );

        let trend = match yearly_trend(&filtered) {
            Ok(t) => Some(t),
            Err(DashboardError::InsufficientData) => None,
            Err(e) => return Err(e),
        };
        let distribution = crop_distribution(&filtered, CROP_VIEW_SIZE);
        let top_crops = top_crop_production(&filtered, CROP_VIEW_SIZE)?;
        let scale = Scale::from_flag(selection.log_scale);
        let top_crop_values = top_crops.display_values(scale)?;

        let ctx = NarrationContext {
            state_display: self.state_display.clone(),
            top_k: self.top_k,
        };
        let insights = match trend.as_deref() {
            Some(t) => match narrate(selection, &ctx, t, &top_crops) {
                Ok(i) => Some(i),
                Err(DashboardError::InsufficientData) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };

        Ok(DashboardView {
            title: format!("{} Agriculture Insights", self.state_display),
            selection: selection.clone(),
            filtered_rows: filtered.len(),
            trend,
            crop_distribution: distribution,
            top_crops,
            top_crop_values,
            scale,
            insights,
            motivation: motivation(&self.state_display),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;

    fn rec(district: &str, year: i32, crop: &str, production: f64, yield_: f64) -> Record {
        Record {
            district: district.into(),
            crop_year: year,
            crop: crop.into(),
            area: Some(1.0),
            production: Some(production),
            yield_: Some(yield_),
        }
    }

    fn dashboard() -> Dashboard {
        let records = vec![
            rec("A", 1999, "Rice", 100.0, 1.0),
            rec("A", 2000, "Rice", 80.0, 1.0),
            rec("A", 2000, "Coconut", 120.0, 4.0),
            rec("A", 2003, "Rice", 150.0, 2.0),
            rec("A", 2006, "Banana", 50.0, 1.0),
            rec("B", 2001, "Rice", 50.0, 1.0),
            rec("B", 2004, "Maize", 50.0, 1.0),
        ];
        let dataset = Arc::new(Dataset::from_records("tamil nadu", records));
        Dashboard::new(dataset, &DashboardConfig::default()).unwrap()
    }

    #[test]
    fn ranking_is_computed_once_at_construction() {
        let d = dashboard();
        assert_eq!(d.districts(), &["A".to_string(), "B".to_string()]);
        assert_eq!(d.ranking()[0].mean, 100.0);
        assert_eq!(d.year_bounds(), (1999, 2006));
        assert_eq!(d.state_display(), "Tamil Nadu");
        assert_eq!(d.rank_by(), NumericColumn::Production);
    }

    #[test]
    fn initial_selection_uses_top_district_and_clamped_years() {
        let d = dashboard();
        let s = d.initial_selection(None, &DashboardConfig::default()).unwrap();
        assert_eq!(s.district, "A");
        assert_eq!(s.years, (2000, 2006));
        assert!(s.log_scale);
        assert!(d
            .initial_selection(Some("Nowhere"), &DashboardConfig::default())
            .is_err());
    }

    #[test]
    fn render_runs_the_whole_pipeline() {
        let d = dashboard();
        let selection = Selection {
            district: "A".into(),
            years: (2000, 2005),
            log_scale: false,
        };
        let view = d.render(&selection).unwrap();
        assert_eq!(view.title, "Tamil Nadu Agriculture Insights");
        assert_eq!(view.subtitle(), "District: A, Years: 2000–2005");
        assert!(view
            .motivation
            .contains("district level in Tamil Nadu, highlighting key crops"));
        assert_eq!(view.filtered_rows, 3);

        let trend = view.trend.as_ref().unwrap();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].production, 100.0);
        assert_eq!(trend[1].production, 150.0);

        assert_eq!(view.crop_distribution[0].crop, "Rice");
        assert_eq!(view.crop_distribution[0].count, 2);
        assert_eq!(view.top_crops.labels(), vec!["Coconut", "Rice"]);
        assert_eq!(view.top_crop_values, vec![120.0, 115.0]);

        let insights = view.insights.unwrap();
        assert_eq!(insights.len(), 5);
        assert!(insights[2].text.contains("an increasing trend"));
        assert!(insights[3].text.contains("stability/decline"));
    }

    #[test]
    fn log_toggle_changes_values_but_not_order() {
        let d = dashboard();
        let mut selection = Selection {
            district: "A".into(),
            years: (1999, 2006),
            log_scale: false,
        };
        let linear = d.render(&selection).unwrap();
        selection.log_scale = true;
        let logged = d.render(&selection).unwrap();
        assert_eq!(linear.top_crops.labels(), logged.top_crops.labels());
        assert_eq!(logged.scale, Scale::Log1p);
        for (raw, shown) in linear.top_crop_values.iter().zip(&logged.top_crop_values) {
            assert!((raw.ln_1p() - shown).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_selection_falls_back_instead_of_failing() {
        let d = dashboard();
        let selection = Selection {
            district: "B".into(),
            years: (2005, 2006),
            log_scale: true,
        };
        let view = d.render(&selection).unwrap();
        assert_eq!(view.filtered_rows, 0);
        assert!(view.trend.is_none());
        assert!(view.insights.is_none());
        assert!(view.crop_distribution.is_empty());
        assert!(view.top_crops.entries.is_empty());
    }

    #[test]
    fn district_list_size_leaves_crop_views_alone() {
        let mut records: Vec<Record> = (1..=7)
            .map(|i| rec("A", 2000, &format!("C{i}"), 100.0 - i as f64, 1.0))
            .collect();
        records.extend(["B", "C", "D"].iter().map(|d| rec(d, 2000, "Rice", 1.0, 1.0)));
        let dataset = Arc::new(Dataset::from_records("tamil nadu", records));
        let config = DashboardConfig {
            top_k: 3,
            ..DashboardConfig::default()
        };
        let d = Dashboard::new(dataset, &config).unwrap();
        assert_eq!(d.districts().len(), 3);

        let selection = Selection {
            district: "A".into(),
            years: (2000, 2000),
            log_scale: false,
        };
        let view = d.render(&selection).unwrap();
        assert_eq!(view.crop_distribution.len(), 7);
        assert_eq!(view.top_crops.entries.len(), 7);
        let insights = view.insights.unwrap();
        assert!(insights[0].text.contains("Top 3 agricultural districts"));
        assert_eq!(
            insights[1].text,
            "The major crops cultivated here include: C1, C2, C3, C4, C5."
        );
    }

    #[test]
    fn invalid_selection_is_rejected() {
        let d = dashboard();
        let selection = Selection {
            district: "A".into(),
            years: (1990, 2000),
            log_scale: true,
        };
        assert!(matches!(
            d.render(&selection),
            Err(DashboardError::InvalidSelection(_))
        ));
    }

    #[test]
    fn empty_dataset_cannot_build_a_dashboard() {
        let dataset = Arc::new(Dataset::from_records("tamil nadu", Vec::new()));
        assert!(matches!(
            Dashboard::new(dataset, &DashboardConfig::default()),
            Err(DashboardError::EmptyInput)
        ));
    }
}
