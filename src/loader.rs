use crate::error::{DashboardError, Result};
use crate::types::{RawRow, Record};
use crate::util::{clean_text, parse_f64_safe, parse_year_safe};
use csv::{ReaderBuilder, Trim};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Headers every input file must carry. `Area` is optional; other columns
/// such as `Season` are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "State_Name",
    "District_Name",
    "Crop_Year",
    "Crop",
    "Production",
    "Yield",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub state_rows: usize,
    pub parse_errors: usize,
}

/// The rows of a single state, read once and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub state: String,
    pub records: Vec<Record>,
    pub report: LoadReport,
}

impl Dataset {
    #[cfg(test)]
    pub fn from_records(state: &str, records: Vec<Record>) -> Self {
        let n = records.len();
        Dataset {
            state: state.to_string(),
            records,
            report: LoadReport {
                total_rows: n,
                state_rows: n,
                parse_errors: 0,
            },
        }
    }

    /// Inclusive `[min, max]` of `Crop_Year`, `None` for an empty dataset.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().map(|r| r.crop_year).min()?;
        let max = self.records.iter().map(|r| r.crop_year).max()?;
        Some((min, max))
    }
}

fn unavailable(path: &Path, reason: impl ToString) -> DashboardError {
    DashboardError::DataUnavailable {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Read `path` and keep only rows whose `State_Name` equals `state`,
/// ignoring case and surrounding whitespace.
pub fn load(path: &Path, state: &str) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)
        .map_err(|e| unavailable(path, e))?;

    let headers = rdr.headers().map_err(|e| unavailable(path, e))?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DashboardError::MissingColumn(column.to_string()));
        }
    }

    let target = state.trim().to_lowercase();
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records: Vec<Record> = Vec::new();

    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                // +2: one for the header, one for 1-based line numbers
                debug!("skipping malformed row {}: {}", idx + 2, e);
                parse_errors += 1;
                continue;
            }
        };

        let in_state = clean_text(row.state_name).is_some_and(|s| s.to_lowercase() == target);
        if !in_state {
            continue;
        }

        let crop_year = parse_year_safe(row.crop_year.as_deref());
        let district = clean_text(row.district_name);
        let crop = clean_text(row.crop);
        let (Some(crop_year), Some(district), Some(crop)) = (crop_year, district, crop) else {
            parse_errors += 1;
            continue;
        };

        records.push(Record {
            district,
            crop_year,
            crop,
            area: parse_f64_safe(row.area.as_deref()),
            production: parse_f64_safe(row.production.as_deref()),
            yield_: parse_f64_safe(row.yield_.as_deref()),
        });
    }

    if parse_errors > 0 {
        warn!(
            "{} rows skipped due to parse errors in {}",
            parse_errors,
            path.display()
        );
    }
    let report = LoadReport {
        total_rows,
        state_rows: records.len(),
        parse_errors,
    };
    info!(
        total = report.total_rows,
        kept = report.state_rows,
        state = %state,
        "dataset loaded"
    );

    Ok(Dataset {
        state: state.trim().to_string(),
        records,
        report,
    })
}

/// Holds the dataset for the life of the process: loaded on first `get`,
/// shared afterwards, replaced only through an explicit `reload`.
pub struct DatasetStore {
    path: PathBuf,
    state: String,
    cell: OnceCell<Arc<Dataset>>,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>, state: impl Into<String>) -> Self {
        DatasetStore {
            path: path.into(),
            state: state.into(),
            cell: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Result<Arc<Dataset>> {
        self.cell
            .get_or_try_init(|| load(&self.path, &self.state).map(Arc::new))
            .map(Arc::clone)
    }

    /// Re-read the file. The cached dataset is kept if the new read fails.
    pub fn reload(&mut self) -> Result<Arc<Dataset>> {
        let fresh = Arc::new(load(&self.path, &self.state)?);
        self.cell = OnceCell::with_value(Arc::clone(&fresh));
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
State_Name,District_Name,Crop_Year,Season,Crop,Area,Production,Yield
Tamil Nadu,COIMBATORE,2000,Kharif,Rice,100,\"1,200\",12
tamil nadu,COIMBATORE,2001.0,Rabi,Maize,50,NaN,
Kerala,KOLLAM,2000,Kharif,Rice,10,100,10
TAMIL NADU ,SALEM,,Kharif,Rice,10,100,10
Tamil Nadu,SALEM,2003,Whole Year,Coconut,5,9000000,1800000
";

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn keeps_only_target_state_case_insensitively() {
        let f = write_csv(SAMPLE);
        let ds = load(f.path(), "tamil nadu").unwrap();
        assert_eq!(ds.report.total_rows, 5);
        assert_eq!(ds.report.state_rows, 3);
        assert_eq!(ds.report.parse_errors, 1);
        assert!(ds.records.iter().all(|r| r.district != "KOLLAM"));
        assert_eq!(ds.year_bounds(), Some((2000, 2003)));
    }

    #[test]
    fn missing_numerics_become_none() {
        let f = write_csv(SAMPLE);
        let ds = load(f.path(), "Tamil Nadu").unwrap();
        let maize = ds.records.iter().find(|r| r.crop == "Maize").unwrap();
        assert_eq!(maize.crop_year, 2001);
        assert_eq!(maize.production, None);
        assert_eq!(maize.yield_, None);
        let rice = ds.records.iter().find(|r| r.crop == "Rice").unwrap();
        assert_eq!(rice.production, Some(1200.0));
    }

    #[test]
    fn exponent_cells_are_kept() {
        let f = write_csv(
            "State_Name,District_Name,Crop_Year,Crop,Production,Yield\n\
             Tamil Nadu,SALEM,2004,Rice,2.5E+06,1e-05\n",
        );
        let ds = load(f.path(), "tamil nadu").unwrap();
        assert_eq!(ds.records[0].production, Some(2_500_000.0));
        assert_eq!(ds.records[0].yield_, Some(1e-5));
    }

    #[test]
    fn padded_headers_still_feed_their_columns() {
        let f = write_csv(
            "State_Name,District_Name,Crop_Year,Crop, Production , Yield\n\
             Tamil Nadu,SALEM,2004,Rice,300,2.5\n",
        );
        let ds = load(f.path(), "tamil nadu").unwrap();
        assert_eq!(ds.records[0].production, Some(300.0));
        assert_eq!(ds.records[0].yield_, Some(2.5));
    }

    #[test]
    fn missing_file_is_data_unavailable() {
        let err = load(Path::new("/definitely/not/here.csv"), "tamil nadu").unwrap_err();
        assert!(matches!(err, DashboardError::DataUnavailable { .. }));
    }

    #[test]
    fn missing_required_header_is_reported() {
        let f = write_csv("State_Name,District_Name,Crop_Year,Crop,Production\nx,y,2000,z,1\n");
        let err = load(f.path(), "x").unwrap_err();
        match err {
            DashboardError::MissingColumn(c) => assert_eq!(c, "Yield"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let f = write_csv(
            "State_Name,District_Name,Crop_Year,Crop,Production,Yield\nTamil Nadu,SALEM,2001,Rice,10,2\n",
        );
        let ds = load(f.path(), "tamil nadu").unwrap();
        assert_eq!(ds.records.len(), 1);
        assert_eq!(ds.records[0].area, None);
    }

    #[test]
    fn store_loads_once_and_reloads_on_request() {
        let mut f = write_csv(SAMPLE);
        let mut store = DatasetStore::new(f.path(), "tamil nadu");
        assert!(store.cell.get().is_none());
        let first = store.get().unwrap();
        let second = store.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        f.write_all(b"Tamil Nadu,SALEM,2004,Kharif,Rice,1,1,1\n").unwrap();
        f.flush().unwrap();
        // cached value is not invalidated behind the caller's back
        assert_eq!(store.get().unwrap().records.len(), 3);
        let reloaded = store.reload().unwrap();
        assert_eq!(reloaded.records.len(), 4);
        assert!(!Arc::ptr_eq(&first, &reloaded));
    }
}
