use crate::error::{DashboardError, Result};
use crate::types::{Record, Selection};

/// Rows of `district` whose crop year lies in `lo..=hi`. An empty result is
/// a normal outcome, not an error.
pub fn filter_selection(records: &[Record], district: &str, lo: i32, hi: i32) -> Vec<Record> {
    records
        .iter()
        .filter(|r| r.district == district && (lo..=hi).contains(&r.crop_year))
        .cloned()
        .collect()
}

/// Check a selection against what the selectors would have allowed: one of
/// the ranked districts and a range inside the dataset's year bounds.
pub fn validate_selection(
    selection: &Selection,
    districts: &[String],
    bounds: (i32, i32),
) -> Result<()> {
    if !districts.iter().any(|d| d == &selection.district) {
        return Err(DashboardError::InvalidSelection(format!(
            "'{}' is not one of the ranked districts",
            selection.district
        )));
    }
    let (lo, hi) = selection.years;
    if lo > hi {
        return Err(DashboardError::InvalidSelection(format!(
            "year range {lo}-{hi} is reversed"
        )));
    }
    if lo < bounds.0 || hi > bounds.1 {
        return Err(DashboardError::InvalidSelection(format!(
            "year range {lo}-{hi} is outside {}-{}",
            bounds.0, bounds.1
        )));
    }
    Ok(())
}

/// Pull a default range into the dataset bounds, keeping it ordered.
pub fn clamp_years(wanted: (i32, i32), bounds: (i32, i32)) -> (i32, i32) {
    let lo = wanted.0.clamp(bounds.0, bounds.1);
    let hi = wanted.1.clamp(bounds.0, bounds.1);
    if lo <= hi {
        (lo, hi)
    } else {
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(district: &str, year: i32) -> Record {
        Record {
            district: district.into(),
            crop_year: year,
            crop: "Rice".into(),
            area: None,
            production: Some(1.0),
            yield_: Some(1.0),
        }
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let rows = vec![rec("A", 1999), rec("A", 2000), rec("A", 2003), rec("A", 2006)];
        let out = filter_selection(&rows, "A", 2000, 2005);
        let years: Vec<i32> = out.iter().map(|r| r.crop_year).collect();
        assert_eq!(years, vec![2000, 2003]);

        let edge = filter_selection(&rows, "A", 2000, 2006);
        assert_eq!(edge.len(), 3);
    }

    #[test]
    fn output_is_exactly_the_matching_subset() {
        let rows: Vec<Record> = (1995..2010)
            .flat_map(|y| vec![rec("A", y), rec("B", y), rec("a", y)])
            .collect();
        let out = filter_selection(&rows, "A", 2001, 2004);
        assert!(out.iter().all(|r| rows.contains(r)));
        assert!(out
            .iter()
            .all(|r| r.district == "A" && (2001..=2004).contains(&r.crop_year)));
        let expected = rows
            .iter()
            .filter(|r| r.district == "A" && (2001..=2004).contains(&r.crop_year))
            .count();
        assert_eq!(out.len(), expected);
    }

    #[test]
    fn no_match_yields_empty_table() {
        let rows = vec![rec("A", 2000)];
        assert!(filter_selection(&rows, "B", 2000, 2000).is_empty());
        assert!(filter_selection(&rows, "A", 2001, 2003).is_empty());
    }

    #[test]
    fn validates_district_and_range() {
        let districts = vec!["A".to_string(), "B".to_string()];
        let ok = Selection {
            district: "A".into(),
            years: (2000, 2005),
            log_scale: true,
        };
        assert!(validate_selection(&ok, &districts, (1997, 2014)).is_ok());

        let unknown = Selection {
            district: "Q".into(),
            ..ok.clone()
        };
        assert!(matches!(
            validate_selection(&unknown, &districts, (1997, 2014)),
            Err(DashboardError::InvalidSelection(_))
        ));

        let reversed = Selection {
            years: (2005, 2000),
            ..ok.clone()
        };
        assert!(validate_selection(&reversed, &districts, (1997, 2014)).is_err());

        let outside = Selection {
            years: (1990, 2000),
            ..ok
        };
        assert!(validate_selection(&outside, &districts, (1997, 2014)).is_err());
    }

    #[test]
    fn clamps_default_range_into_bounds() {
        assert_eq!(clamp_years((2000, 2015), (1997, 2013)), (2000, 2013));
        assert_eq!(clamp_years((2000, 2015), (2003, 2020)), (2003, 2015));
        assert_eq!(clamp_years((1980, 1990), (1997, 2013)), (1997, 1997));
    }
}
