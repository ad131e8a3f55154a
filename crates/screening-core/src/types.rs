use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Open-ended company record: field name -> raw value.
///
/// Different sources populate different subsets of fields, and values may be
/// numbers, strings with currency/magnitude/percentage decoration, or null.
/// The engine never mutates a record; it only reads and annotates copies.
pub type CompanyRecord = serde_json::Map<String, Value>;

/// Attribute filters applied during sourcing (e.g. sector, country).
pub type SourcingFilters = serde_json::Map<String, Value>;

/// One named screening criterion, e.g. `("revenue", "> 40000000")`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MandateCriterion {
    pub parameter: String,
    pub constraint: String,
}

/// An ordered set of screening criteria extracted from a fund mandate.
///
/// Order matters: evaluation short-circuits on the first failing criterion,
/// so published reasons only cover criteria up to and including that one.
/// Parameter names are matched case-insensitively downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mandate {
    pub criteria: Vec<MandateCriterion>,
}

impl Mandate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, parameter: impl Into<String>, constraint: impl Into<String>) {
        self.criteria.push(MandateCriterion {
            parameter: parameter.into(),
            constraint: constraint.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MandateCriterion> {
        self.criteria.iter()
    }

    /// Build a mandate from a JSON object, preserving key order.
    ///
    /// Non-string constraint values (numbers, booleans) are stringified so
    /// that `{"pe_ratio": "< 40"}` and `{"pe_ratio": 40}` both parse.
    pub fn from_json_object(params: &serde_json::Map<String, Value>) -> Self {
        let criteria = params
            .iter()
            .map(|(name, value)| MandateCriterion {
                parameter: name.clone(),
                constraint: match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            })
            .collect();
        Self { criteria }
    }
}

impl FromIterator<(String, String)> for Mandate {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let criteria = iter
            .into_iter()
            .map(|(parameter, constraint)| MandateCriterion {
                parameter,
                constraint,
            })
            .collect();
        Self { criteria }
    }
}

/// Comparison operator extracted from a constraint string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Ne,
}

impl ComparisonOp {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            ">" => Some(ComparisonOp::Gt),
            ">=" => Some(ComparisonOp::Gte),
            "<" => Some(ComparisonOp::Lt),
            "<=" => Some(ComparisonOp::Lte),
            "==" => Some(ComparisonOp::Eq),
            "!=" => Some(ComparisonOp::Ne),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Eq => "==",
            ComparisonOp::Ne => "!=",
        }
    }

    /// Compare an actual value against a threshold.
    ///
    /// `!=` is recognized by the constraint grammar but never satisfied here;
    /// the production comparator has always fallen through to false for it.
    pub fn compare(&self, actual: f64, threshold: f64) -> bool {
        match self {
            ComparisonOp::Gt => actual > threshold,
            ComparisonOp::Gte => actual >= threshold,
            ComparisonOp::Lt => actual < threshold,
            ComparisonOp::Lte => actual <= threshold,
            ComparisonOp::Eq => actual == threshold,
            ComparisonOp::Ne => false,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking one criterion against one company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionCheck {
    pub parameter: String,
    pub clause: String,
    pub passed: bool,
}

/// Full evaluation of one company against a mandate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyVerdict {
    pub company_name: String,
    pub sector: String,
    pub passed: bool,
    pub checks: Vec<CriterionCheck>,
}

impl CompanyVerdict {
    /// Human-readable reason string: per-criterion clauses joined by `" | "`.
    pub fn reason(&self) -> String {
        self.checks
            .iter()
            .map(|c| c.clause.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// A company that passed every mandate criterion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenedCompany {
    pub company_name: String,
    pub sector: String,
    pub status: String,
    pub reason: String,
    pub details: CompanyRecord,
}

impl ScreenedCompany {
    /// Flatten to the wire shape: the original fields plus `status`/`reason`.
    pub fn into_record(self) -> CompanyRecord {
        let mut record = self.details;
        record.insert("status".to_string(), Value::String(self.status));
        record.insert("reason".to_string(), Value::String(self.reason));
        record
    }
}

/// Result of one full screening pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningRun {
    pub passed: Vec<ScreenedCompany>,
    pub total_screened: usize,
    pub total_passed: usize,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mandate_from_json_object_preserves_order_and_stringifies() {
        let params = json!({
            "revenue": "> 40000000",
            "pe_ratio": 40,
            "debt_to_equity": "< 0.5"
        });
        let mandate = Mandate::from_json_object(params.as_object().unwrap());
        let names: Vec<&str> = mandate.iter().map(|c| c.parameter.as_str()).collect();
        assert_eq!(names, vec!["revenue", "pe_ratio", "debt_to_equity"]);
        assert_eq!(mandate.criteria[1].constraint, "40");
    }

    #[test]
    fn comparison_op_round_trip() {
        for op in ["<", "<=", ">", ">=", "==", "!="] {
            assert_eq!(ComparisonOp::parse(op).unwrap().as_str(), op);
        }
        assert!(ComparisonOp::parse("~").is_none());
    }

    #[test]
    fn not_equal_never_satisfied() {
        assert!(!ComparisonOp::Ne.compare(1.0, 2.0));
        assert!(!ComparisonOp::Ne.compare(2.0, 2.0));
    }

    #[test]
    fn screened_company_flattens_with_annotations() {
        let mut details = CompanyRecord::new();
        details.insert("Company".into(), json!("Microsoft"));
        details.insert("Revenue".into(), json!(281724.0));

        let passed = ScreenedCompany {
            company_name: "Microsoft".into(),
            sector: "Technology".into(),
            status: "Pass".into(),
            reason: "revenue: 281724 > 40".into(),
            details,
        };

        let record = passed.into_record();
        assert_eq!(record.get("status"), Some(&json!("Pass")));
        assert_eq!(record.get("Revenue"), Some(&json!(281724.0)));
        assert!(record.get("reason").is_some());
    }
}
