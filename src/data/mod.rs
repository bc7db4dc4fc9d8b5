//! Catalog ingestion from delimited text.
//!
//! One record per line, `name,x,y,z`, no header row. Fields are trimmed and
//! blank lines skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::config::CatalogConfig;
use crate::{Coordinate, Star};

const FIELD_DELIMITER: char = ',';
const FIELDS_PER_RECORD: usize = 4;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Parses one record. `line_no` is 1-based and only used for errors.
/// Returns `Ok(None)` for a blank line.
pub fn parse_record(line: &str, line_no: usize) -> Result<Option<Star>, DataError> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(FIELD_DELIMITER).map(str::trim).collect();
    if fields.len() != FIELDS_PER_RECORD {
        return Err(DataError::Parse {
            line: line_no,
            message: format!(
                "expected {FIELDS_PER_RECORD} fields (name,x,y,z), found {}",
                fields.len()
            ),
        });
    }
    if fields[0].is_empty() {
        return Err(DataError::Parse {
            line: line_no,
            message: "empty star name".into(),
        });
    }

    let mut axes = [0.0_f64; 3];
    for (axis, raw) in axes.iter_mut().zip(&fields[1..]) {
        *axis = raw.parse().map_err(|e| DataError::Parse {
            line: line_no,
            message: format!("invalid coordinate {raw:?}: {e}"),
        })?;
        if !axis.is_finite() {
            return Err(DataError::Parse {
                line: line_no,
                message: format!("non-finite coordinate {raw:?}"),
            });
        }
    }

    Ok(Some(Star::new(fields[0], Coordinate::from(axes))))
}

/// Reads every record from `reader`, stopping at the first malformed one.
pub fn read_stars<R: BufRead>(reader: R) -> Result<Vec<Star>, DataError> {
    let mut stars = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        if let Some(star) = parse_record(&line?, idx + 1)? {
            stars.push(star);
        }
    }
    Ok(stars)
}

pub fn load_catalog<P: AsRef<Path>>(path: P, config: CatalogConfig) -> Result<Catalog, DataError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let stars = read_stars(BufReader::new(file))?;
    let records = stars.len();
    let catalog = Catalog::from_stars_with_config(stars, config);
    info!(
        "loaded {} stars from {} ({} duplicate names ignored)",
        catalog.len(),
        path.display(),
        records - catalog.len()
    );
    Ok(catalog)
}
