//! Module providing CSV IO for the condition table and the result tables
use std::path::Path;

use indexmap::{IndexMap, IndexSet};

use crate::conditions::{Condition, ConditionTable};
use crate::features::{FeatureValue, WideFeatureRow};
use crate::io::IoError;
use crate::regime::labeler::Nutrient;
use crate::regime::saturation::SaturationResult;
use crate::regime::table::RegimeTable;

/// Prefix marking condition columns that carry uptake bounds
const UPTAKE_PREFIX: &str = "uptake_";

/// Read the experimental condition table from a CSV file
///
/// The `condition_id` column is required and must be unique. Columns named
/// `uptake_<rid>` are parsed as numeric uptake settings for reaction `<rid>`;
/// every other column is kept as string metadata.
pub fn read_condition_table<P: AsRef<Path>>(path: P) -> Result<ConditionTable, IoError> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path).map_err(|source| IoError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    let headers = reader
        .headers()
        .map_err(|source| IoError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let id_index = headers
        .iter()
        .position(|header| header == "condition_id")
        .ok_or_else(|| IoError::MissingColumn {
            path: path.to_path_buf(),
            column: "condition_id".to_string(),
        })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IoError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let mut condition_id = String::new();
        let mut uptakes: IndexMap<String, f64> = IndexMap::new();
        let mut metadata: IndexMap<String, String> = IndexMap::new();
        for (index, field) in record.iter().enumerate() {
            let header = &headers[index];
            if index == id_index {
                condition_id = field.to_string();
            } else if let Some(reaction_id) = header.strip_prefix(UPTAKE_PREFIX) {
                let value: f64 = field.parse().map_err(|_| IoError::InvalidNumeric {
                    path: path.to_path_buf(),
                    column: header.to_string(),
                    value: field.to_string(),
                })?;
                uptakes.insert(reaction_id.to_string(), value);
            } else {
                metadata.insert(header.to_string(), field.to_string());
            }
        }
        rows.push(Condition {
            condition_id,
            uptakes,
            metadata,
        });
    }
    Ok(ConditionTable::new(rows)?)
}

/// Write the regime table as CSV
///
/// One row per condition: `condition_id`, `objective_value`, then per
/// nutrient the `{key}_rid`, `{key}_flux`, `{key}_lb`, `{key}_ub`,
/// `{key}_constrained`, `{key}_sat`, `{key}_sat_side` block, then `label`.
/// Missing values are written as empty fields.
pub fn write_regime_table<P: AsRef<Path>>(path: P, table: &RegimeTable) -> Result<(), IoError> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).map_err(|source| IoError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let nutrients: Vec<Nutrient> = table
        .rows()
        .first()
        .map(|row| row.readings.keys().copied().collect())
        .unwrap_or_default();

    let mut header = vec!["condition_id".to_string(), "objective_value".to_string()];
    for nutrient in &nutrients {
        for suffix in ["rid", "flux", "lb", "ub", "constrained", "sat", "sat_side"] {
            header.push(format!("{}_{}", nutrient.key(), suffix));
        }
    }
    header.push("label".to_string());
    writer
        .write_record(&header)
        .map_err(|source| IoError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    for row in table.rows() {
        let mut record = vec![
            row.condition_id.clone(),
            row.objective_value
                .map(|value| value.to_string())
                .unwrap_or_default(),
        ];
        for nutrient in &nutrients {
            let reading = row
                .readings
                .get(nutrient)
                .cloned()
                .unwrap_or_else(SaturationResult::missing);
            record.push(reading.reaction_id.clone().unwrap_or_default());
            record.push(optional_number(reading.flux));
            record.push(optional_number(reading.lower_bound));
            record.push(optional_number(reading.upper_bound));
            record.push(reading.is_constrained.to_string());
            record.push(reading.saturated.to_string());
            record.push(reading.side.to_string());
        }
        record.push(
            row.label
                .map(|label| label.to_string())
                .unwrap_or_default(),
        );
        writer
            .write_record(&record)
            .map_err(|source| IoError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
    }
    writer.flush().map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the wide feature table as CSV
///
/// The header is `condition_id` plus the union of row columns in first-seen
/// order; cells absent from a row are written as empty fields.
pub fn write_wide_table<P: AsRef<Path>>(
    path: P,
    rows: &[WideFeatureRow],
) -> Result<(), IoError> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).map_err(|source| IoError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let mut columns: IndexSet<String> = IndexSet::new();
    for row in rows {
        for column in row.columns.keys() {
            columns.insert(column.clone());
        }
    }

    let mut header = vec!["condition_id".to_string()];
    header.extend(columns.iter().cloned());
    writer
        .write_record(&header)
        .map_err(|source| IoError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    for row in rows {
        let mut record = vec![row.condition_id.clone()];
        for column in &columns {
            let cell = match row.columns.get(column) {
                Some(FeatureValue::Number(value)) => value.to_string(),
                Some(FeatureValue::Flag(value)) => value.to_string(),
                Some(FeatureValue::Text(value)) => value.clone(),
                None => String::new(),
            };
            record.push(cell);
        }
        writer
            .write_record(&record)
            .map_err(|source| IoError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
    }
    writer.flush().map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn optional_number(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}
