use std::collections::BTreeSet;

use crate::models::PatientCondition;

/// Split comma-joined condition names, trim and lowercase each piece, and
/// collapse duplicates. Blank pieces are dropped.
pub fn extract_conditions(records: &[PatientCondition]) -> BTreeSet<String> {
    normalize_condition_names(records.iter().map(PatientCondition::condition_name))
}

pub fn normalize_condition_names<'a, I>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .flat_map(|name| name.split(','))
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_lowercase)
        .collect()
}
