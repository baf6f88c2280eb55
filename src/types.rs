use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// One CSV row exactly as it appears on disk. Everything is optional text so
/// a single malformed cell does not abort deserialization of the whole row.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "State_Name", default)]
    pub state_name: Option<String>,
    #[serde(rename = "District_Name", default)]
    pub district_name: Option<String>,
    #[serde(rename = "Crop_Year", default)]
    pub crop_year: Option<String>,
    #[serde(rename = "Crop", default)]
    pub crop: Option<String>,
    #[serde(rename = "Area", default)]
    pub area: Option<String>,
    #[serde(rename = "Production", default)]
    pub production: Option<String>,
    #[serde(rename = "Yield", default)]
    pub yield_: Option<String>,
}

/// A cleaned row. Missing numerics stay `None` and are skipped by means.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub district: String,
    pub crop_year: i32,
    pub crop: String,
    pub area: Option<f64>,
    pub production: Option<f64>,
    pub yield_: Option<f64>,
}

impl Record {
    pub fn category(&self, column: CategoryColumn) -> &str {
        match column {
            CategoryColumn::District => &self.district,
            CategoryColumn::Crop => &self.crop,
        }
    }

    pub fn numeric(&self, column: NumericColumn) -> Option<f64> {
        match column {
            NumericColumn::CropYear => Some(self.crop_year as f64),
            NumericColumn::Area => self.area,
            NumericColumn::Production => self.production,
            NumericColumn::Yield => self.yield_,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryColumn {
    District,
    Crop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    CropYear,
    Area,
    Production,
    Yield,
}

impl NumericColumn {
    pub fn name(self) -> &'static str {
        match self {
            Self::CropYear => "Crop_Year",
            Self::Area => "Area",
            Self::Production => "Production",
            Self::Yield => "Yield",
        }
    }
}

impl FromStr for NumericColumn {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Crop_Year" => Ok(Self::CropYear),
            "Area" => Ok(Self::Area),
            "Production" => Ok(Self::Production),
            "Yield" => Ok(Self::Yield),
            other => Err(DashboardError::MissingColumn(other.to_string())),
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A group label with the mean of its values and how many values went into
/// it. `mean` is NaN when every value in the group was missing.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedGroup {
    pub label: String,
    pub mean: f64,
    pub count: usize,
}

/// What the user picked: district, inclusive year range and the log toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub district: String,
    pub years: (i32, i32),
    pub log_scale: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyPoint {
    #[serde(rename = "Crop_Year")]
    pub year: i32,
    #[serde(rename = "Production")]
    pub production: f64,
    #[serde(rename = "Yield")]
    pub yield_: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CropCount {
    #[serde(rename = "Crop")]
    pub crop: String,
    #[serde(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropProduction {
    #[serde(rename = "Crop")]
    pub crop: String,
    #[serde(rename = "AvgProduction")]
    pub mean_production: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    TopDistrict,
    MajorCrops,
    ProductionTrend,
    YieldTrend,
    SeasonalDiversity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub text: String,
    /// False for sentences that are fixed text rather than computed from data.
    pub derived: bool,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendRow {
    #[tabled(rename = "Year")]
    pub year: i32,
    #[tabled(rename = "Avg Production")]
    pub production: String,
    #[tabled(rename = "Avg Yield")]
    pub yield_: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CropCountRow {
    #[tabled(rename = "Crop")]
    pub crop: String,
    #[tabled(rename = "Count")]
    pub count: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TopCropRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "Crop")]
    pub crop: String,
    #[tabled(rename = "Avg Production")]
    pub mean_production: String,
    #[tabled(rename = "Plotted Value")]
    pub plotted: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DistrictRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "District")]
    pub district: String,
    #[tabled(rename = "Mean")]
    pub mean_production: String,
    #[tabled(rename = "Records")]
    pub records: String,
}

/// Payload of `insights.json`.
#[derive(Debug, Serialize)]
pub struct InsightSummary {
    pub generated_at: String,
    pub state: String,
    pub selection: Selection,
    pub filtered_rows: usize,
    pub insights: Vec<Insight>,
}
