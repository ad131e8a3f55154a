//! Candidate-company sourcing: universe loading and attribute filtering.
//!
//! This is the deterministic half of the sourcing stage. The universe comes
//! from a JSON file of open-ended company records; filters are exact-match
//! (case-insensitive) on attributes such as sector, country or industry.

use async_trait::async_trait;
use screening_core::{CompanyProvider, CompanyRecord, ScreeningError, SourcingFilters};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

/// Qualified companies are capped so downstream screening stays bounded.
const MAX_QUALIFIED: usize = 50;

/// Result of one sourcing pass.
#[derive(Debug, Clone, Serialize)]
pub struct SourcingResult {
    pub total_companies: usize,
    pub match_count: usize,
    pub qualified: Vec<CompanyRecord>,
    pub filters_applied: SourcingFilters,
}

/// Loads the candidate universe from a JSON array file.
pub struct FileCompanyProvider {
    path: PathBuf,
}

impl FileCompanyProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CompanyProvider for FileCompanyProvider {
    async fn load_universe(&self) -> Result<Vec<CompanyRecord>, ScreeningError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            ScreeningError::DataSource(format!("{}: {e}", self.path.display()))
        })?;
        let records: Vec<CompanyRecord> = serde_json::from_slice(&bytes)?;
        info!(
            "📂 Loaded {} companies from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// Absent, null, zero, false and empty attributes never disqualify; comparison
// only applies to a substantive value.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Apply attribute filters to a universe.
///
/// A company matches when every filter attribute it *has a substantive value
/// for* equals the requested value, case-insensitively. Blank attributes do
/// not disqualify, which mirrors the sourcing data where many records carry
/// partial metadata.
pub fn filter_companies(companies: &[CompanyRecord], filters: &SourcingFilters) -> SourcingResult {
    let mut matched = Vec::new();

    for company in companies {
        let qualifies = filters.iter().all(|(key, wanted)| {
            match company.get(key) {
                None => true,
                Some(actual) if is_blank(actual) => true,
                Some(actual) => {
                    value_text(actual).to_lowercase() == value_text(wanted).to_lowercase()
                }
            }
        });
        if qualifies {
            matched.push(company.clone());
        }
    }

    let match_count = matched.len();
    let qualified: Vec<CompanyRecord> = matched.into_iter().take(MAX_QUALIFIED).collect();

    info!(
        "🔍 Sourcing filter matched {match_count}/{} companies ({} qualified)",
        companies.len(),
        qualified.len()
    );

    SourcingResult {
        total_companies: companies.len(),
        match_count,
        qualified,
        filters_applied: filters.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn universe() -> Vec<CompanyRecord> {
        [
            json!({ "Company": "Acme", "Sector": "Technology", "Country": "USA" }),
            json!({ "Company": "Globex", "Sector": "Energy", "Country": "USA" }),
            json!({ "Company": "Initech", "Sector": "Technology", "Country": "Germany" }),
            json!({ "Company": "Umbrella", "Sector": "", "Country": "UK" }),
        ]
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
    }

    fn filters(v: serde_json::Value) -> SourcingFilters {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn filters_match_case_insensitively() {
        let result = filter_companies(&universe(), &filters(json!({ "Sector": "technology" })));
        // Acme, Initech match; Umbrella's empty sector does not disqualify
        assert_eq!(result.match_count, 3);
        assert_eq!(result.total_companies, 4);
    }

    #[test]
    fn multiple_filters_intersect() {
        let result = filter_companies(
            &universe(),
            &filters(json!({ "Sector": "Technology", "Country": "USA" })),
        );
        let names: Vec<&str> = result
            .qualified
            .iter()
            .filter_map(|c| c.get("Company").and_then(|v| v.as_str()))
            .collect();
        assert_eq!(names, vec!["Acme"]);
    }

    #[test]
    fn absent_attributes_do_not_disqualify() {
        let result = filter_companies(&universe(), &filters(json!({ "Industry": "Software" })));
        assert_eq!(result.match_count, 4);
    }

    #[test]
    fn zero_and_false_attributes_do_not_disqualify() {
        let records: Vec<CompanyRecord> = [
            json!({ "Company": "ZeroCo", "Employees": 0, "Listed": false }),
            json!({ "Company": "BigCo", "Employees": 500, "Listed": true }),
        ]
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();

        let result = filter_companies(&records, &filters(json!({ "Employees": "500" })));
        // ZeroCo's zero headcount is blank metadata, not a mismatch
        assert_eq!(result.match_count, 2);

        let result = filter_companies(&records, &filters(json!({ "Listed": "true" })));
        assert_eq!(result.match_count, 2);
    }

    #[test]
    fn qualified_list_is_capped() {
        let many: Vec<CompanyRecord> = (0..120)
            .map(|i| {
                json!({ "Company": format!("Co{i}"), "Sector": "Technology" })
                    .as_object()
                    .unwrap()
                    .clone()
            })
            .collect();
        let result = filter_companies(&many, &filters(json!({ "Sector": "Technology" })));
        assert_eq!(result.match_count, 120);
        assert_eq!(result.qualified.len(), MAX_QUALIFIED);
    }

    #[tokio::test]
    async fn file_provider_reports_missing_files() {
        let provider = FileCompanyProvider::new("/nonexistent/companies.json");
        let err = provider.load_universe().await.unwrap_err();
        assert!(matches!(err, ScreeningError::DataSource(_)));
    }
}
