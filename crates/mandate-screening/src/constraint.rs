use lazy_static::lazy_static;
use regex::Regex;
use screening_core::ComparisonOp;
use thiserror::Error;
use tracing::warn;

lazy_static! {
    static ref OPERATOR_RE: Regex =
        Regex::new(r"([><]=?|==|!=)\s*([\d.]+)").expect("operator pattern is valid");
    static ref UNIT_TOKEN_RE: Regex =
        Regex::new(r"\s*(USD|M|B|%|Positive)\s*").expect("unit token pattern is valid");
}

/// Operator + threshold extracted from a free-form constraint string, with
/// the threshold already converted to the canonical basis (millions for
/// currency, decimals for percentage intents).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedConstraint {
    pub op: ComparisonOp,
    pub threshold: f64,
}

impl ParsedConstraint {
    /// The `"Positive"` sentinel: anything strictly greater than zero.
    pub const POSITIVE: ParsedConstraint = ParsedConstraint {
        op: ComparisonOp::Gt,
        threshold: 0.0,
    };

    pub fn is_satisfied_by(&self, actual: f64) -> bool {
        self.op.compare(actual, self.threshold)
    }
}

#[derive(Error, Debug)]
pub enum ConstraintParseError {
    #[error("no operator/threshold found in constraint {0:?}")]
    NoMatch(String),

    #[error("unparseable threshold {threshold:?} in constraint {raw:?}")]
    BadThreshold { raw: String, threshold: String },
}

/// Strict form of [`parse_constraint`]: surfaces what went wrong instead of
/// substituting the default.
pub fn try_parse_constraint(raw: &str) -> Result<ParsedConstraint, ConstraintParseError> {
    let trimmed = raw.trim();
    // Percentage intent is decided before unit tokens are stripped.
    let is_percentage = trimmed.contains('%');

    let cleaned: String = trimmed.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    let cleaned = UNIT_TOKEN_RE.replace_all(&cleaned, "");

    let caps = OPERATOR_RE
        .captures(&cleaned)
        .ok_or_else(|| ConstraintParseError::NoMatch(raw.to_string()))?;

    let op = ComparisonOp::parse(&caps[1])
        .ok_or_else(|| ConstraintParseError::NoMatch(raw.to_string()))?;
    let mut threshold: f64 =
        caps[2]
            .parse()
            .map_err(|_| ConstraintParseError::BadThreshold {
                raw: raw.to_string(),
                threshold: caps[2].to_string(),
            })?;

    if is_percentage && threshold > 1.0 {
        // Percentage number -> decimal, matching the field resolver's
        // convention for ratio metrics.
        threshold /= 100.0;
    } else if threshold > 1000.0 && !is_percentage {
        // Magnitude heuristic: large bare thresholds are raw dollars.
        threshold /= 1_000_000.0;
    }

    Ok(ParsedConstraint { op, threshold })
}

/// Parse a constraint string, substituting the `Positive` default when
/// nothing usable is found. This is the production-facing contract: a bad
/// constraint must never abort a screening pass.
pub fn parse_constraint(raw: &str) -> ParsedConstraint {
    match try_parse_constraint(raw) {
        Ok(parsed) => parsed,
        // Plain "Positive" (or any operator-free string) lands here; that is
        // the normal path for the sentinel, not a diagnostic.
        Err(ConstraintParseError::NoMatch(_)) => ParsedConstraint::POSITIVE,
        Err(e) => {
            warn!("defaulting constraint to Positive: {e}");
            ParsedConstraint::POSITIVE
        }
    }
}
