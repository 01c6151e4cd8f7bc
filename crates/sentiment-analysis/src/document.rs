use analysis_core::AnalysisError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Pull typed records out of a loosely-typed document from a fetcher.
///
/// Anything other than a JSON array is `not_a_list`; elements that do not
/// parse are skipped, and if every element was skipped the result is
/// `none_valid`. An empty array is returned as-is so the caller's own
/// empty-input rule applies.
pub(crate) fn records_from_document<T: DeserializeOwned>(
    document: &Value,
    not_a_list: &str,
    none_valid: &str,
) -> Result<Vec<T>, AnalysisError> {
    let Some(items) = document.as_array() else {
        return Err(AnalysisError::EmptyInput(not_a_list.to_string()));
    };

    let records: Vec<T> = items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Skipping malformed item: {}", e);
                None
            }
        })
        .collect();

    if records.is_empty() && !items.is_empty() {
        return Err(AnalysisError::EmptyInput(none_valid.to_string()));
    }
    Ok(records)
}
