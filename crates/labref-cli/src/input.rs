//! Observation files handed over by the extraction stage.
//!
//! Two layouts are accepted: a JSON array of observation objects, or a CSV
//! file with the columns `raw_test_name`, `value`, `unit`, `subject_sex`,
//! `subject_age` and `subject_condition`. Only the first two are required;
//! blank cells mean "not reported".

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use labref_model::text::non_blank;
use labref_model::{ObservedValue, Observation, Sex};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    /// CSV for a `.csv` extension (any case), JSON otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

pub fn read_observations(path: &Path) -> Result<Vec<Observation>> {
    let format = InputFormat::from_path(path);
    let observations = match format {
        InputFormat::Json => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read observations {}", path.display()))?;
            parse_json(&text)
        }
        InputFormat::Csv => {
            let file = fs::File::open(path)
                .with_context(|| format!("open observations {}", path.display()))?;
            parse_csv(file)
        }
    };
    observations.with_context(|| format!("parse observations {}", path.display()))
}

pub fn parse_json(text: &str) -> Result<Vec<Observation>> {
    serde_json::from_str(text).context("expected a JSON array of observations")
}

#[derive(Debug, Deserialize)]
struct ObservationRow {
    raw_test_name: String,
    value: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    subject_sex: String,
    #[serde(default)]
    subject_age: String,
    #[serde(default)]
    subject_condition: String,
}

impl ObservationRow {
    fn into_observation(self) -> Result<Observation> {
        let subject_sex = non_blank(Some(self.subject_sex.as_str()))
            .map(str::parse::<Sex>)
            .transpose()?;
        let subject_age = non_blank(Some(self.subject_age.as_str()))
            .map(|age| {
                age.parse::<f64>()
                    .with_context(|| format!("invalid subject_age '{age}'"))
            })
            .transpose()?;
        let subject_condition =
            non_blank(Some(self.subject_condition.as_str())).map(str::to_string);
        Ok(Observation {
            raw_test_name: self.raw_test_name.trim().to_string(),
            value: ObservedValue::from_raw(&self.value),
            unit: self.unit.trim().to_string(),
            subject_sex,
            subject_age,
            subject_condition,
        })
    }
}

pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Observation>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let mut observations = Vec::new();
    for (index, row) in reader.deserialize::<ObservationRow>().enumerate() {
        // Header is line 1.
        let line = index + 2;
        let row = row.with_context(|| format!("line {line}"))?;
        let observation = row
            .into_observation()
            .with_context(|| format!("line {line}"))?;
        observations.push(observation);
    }
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(InputFormat::from_path(Path::new("batch.CSV")), InputFormat::Csv);
        assert_eq!(InputFormat::from_path(Path::new("batch.json")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("batch")), InputFormat::Json);
    }

    #[test]
    fn csv_blank_cells_are_not_reported() {
        let csv = "raw_test_name,value,unit,subject_sex,subject_age,subject_condition\n\
                   Hgb,11.2,g/dL,,,\n";
        let observations = parse_csv(csv.as_bytes()).expect("parse csv");
        assert_eq!(observations.len(), 1);
        let observation = &observations[0];
        assert_eq!(observation.value, ObservedValue::Numeric(11.2));
        assert_eq!(observation.subject_sex, None);
        assert_eq!(observation.subject_age, None);
        assert_eq!(observation.subject_condition, None);
    }
}
