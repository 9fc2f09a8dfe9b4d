//! Unit spelling normalization.
//!
//! Only spelling is harmonized here; values are never converted between units.

const UNIT_SPELLINGS: &[(&str, &str)] = &[
    ("g/dl", "g/dL"),
    ("g/l", "g/L"),
    ("mg/dl", "mg/dL"),
    ("mg/l", "mg/L"),
    ("mmol/l", "mmol/L"),
    ("umol/l", "μmol/L"),
    ("µmol/l", "μmol/L"),
    ("μmol/l", "μmol/L"),
    ("iu/l", "IU/L"),
    ("u/l", "U/L"),
    ("miu/l", "mIU/L"),
    ("uiu/ml", "μIU/mL"),
    ("µiu/ml", "μIU/mL"),
    ("μiu/ml", "μIU/mL"),
    ("pg/ml", "pg/mL"),
    ("ng/ml", "ng/mL"),
    ("ng/dl", "ng/dL"),
    ("fl", "fL"),
    ("pg", "pg"),
];

/// Maps a unit to its canonical spelling, or returns it trimmed when unknown.
pub fn normalize_unit(unit: &str) -> String {
    let trimmed = unit.trim();
    let lower = trimmed.to_lowercase();
    UNIT_SPELLINGS
        .iter()
        .find(|(spelling, _)| *spelling == lower)
        .map_or_else(|| trimmed.to_string(), |(_, canonical)| (*canonical).to_string())
}

/// True when both units are present and spell different units.
pub fn units_conflict(observed: &str, reference: Option<&str>) -> bool {
    let Some(reference) = reference else {
        return false;
    };
    if observed.trim().is_empty() || reference.trim().is_empty() {
        return false;
    }
    normalize_unit(observed) != normalize_unit(reference)
}
