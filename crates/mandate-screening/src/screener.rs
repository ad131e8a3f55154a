use crate::constraint::parse_constraint;
use crate::fields::resolve_value;
use screening_core::{
    CompanyRecord, CompanyVerdict, CriterionCheck, Mandate, NullProgress, ProgressSink,
    ScreenedCompany, ScreeningRun,
};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Controls how much of a mandate is evaluated once a company has failed.
#[derive(Debug, Clone, Copy)]
pub struct ScreeningPolicy {
    /// Stop at the first failing criterion (the production default). With
    /// `false`, every criterion is evaluated so diagnostics cover the whole
    /// mandate; the set of passers is identical either way.
    pub short_circuit: bool,
}

impl Default for ScreeningPolicy {
    fn default() -> Self {
        Self { short_circuit: true }
    }
}

impl ScreeningPolicy {
    pub fn exhaustive() -> Self {
        Self {
            short_circuit: false,
        }
    }
}

/// Evaluates companies against a mandate's criteria.
///
/// Pure and stateless: safe to share across threads and call concurrently on
/// independent inputs. Performs no I/O.
#[derive(Debug, Default)]
pub struct MandateScreener {
    policy: ScreeningPolicy,
}

impl MandateScreener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ScreeningPolicy) -> Self {
        Self { policy }
    }

    /// Extract a display label, trying keys in order. `Some("Unknown")` when
    /// no key is present; `None` when a key is present but not a string,
    /// which marks the whole record as unevaluable.
    fn extract_label(company: &CompanyRecord, keys: &[&str]) -> Option<String> {
        for key in keys {
            if let Some(raw) = company.get(*key) {
                return match raw {
                    Value::String(s) => Some(s.trim().to_string()),
                    _ => None,
                };
            }
        }
        Some("Unknown".to_string())
    }

    /// Evaluate one company against every criterion, in mandate order.
    ///
    /// Returns `None` for records the engine cannot evaluate at all (name or
    /// sector field present but not a string); such records are skipped by
    /// [`screen`](Self::screen), not failed with a reason.
    pub fn evaluate_company(
        &self,
        mandate: &Mandate,
        company: &CompanyRecord,
    ) -> Option<CompanyVerdict> {
        let company_name = match Self::extract_label(company, &["Company ", "Company"]) {
            Some(name) => name,
            None => {
                warn!("skipping record with non-string company name field");
                return None;
            }
        };
        let sector = match Self::extract_label(company, &["Sector"]) {
            Some(sector) => sector,
            None => {
                warn!(company = %company_name, "skipping record with non-string sector field");
                return None;
            }
        };

        let mut checks = Vec::with_capacity(mandate.len());
        let mut passed = true;

        for criterion in mandate.iter() {
            let parameter = criterion.parameter.as_str();
            let constraint = parse_constraint(&criterion.constraint);

            match resolve_value(company, parameter) {
                None => {
                    passed = false;
                    checks.push(CriterionCheck {
                        parameter: parameter.to_string(),
                        clause: format!("{parameter}: N/A"),
                        passed: false,
                    });
                    if self.policy.short_circuit {
                        break;
                    }
                }
                Some(actual) => {
                    let ok = constraint.is_satisfied_by(actual);
                    checks.push(CriterionCheck {
                        parameter: parameter.to_string(),
                        clause: format!(
                            "{parameter}: {actual} {} {}",
                            constraint.op, constraint.threshold
                        ),
                        passed: ok,
                    });
                    if !ok {
                        passed = false;
                        if self.policy.short_circuit {
                            break;
                        }
                    }
                }
            }
        }

        Some(CompanyVerdict {
            company_name,
            sector,
            passed,
            checks,
        })
    }

    /// Screen a universe, returning only the companies that pass every
    /// criterion, annotated with `status`/`reason`. Rejected and skipped
    /// companies are dropped. Empty mandate or universe yields an empty list.
    pub fn screen(&self, mandate: &Mandate, companies: &[CompanyRecord]) -> Vec<ScreenedCompany> {
        self.screen_with_progress(mandate, companies, &NullProgress)
    }

    /// [`screen`](Self::screen) with a per-company progress notification for
    /// streaming transports.
    pub fn screen_with_progress(
        &self,
        mandate: &Mandate,
        companies: &[CompanyRecord],
        progress: &dyn ProgressSink,
    ) -> Vec<ScreenedCompany> {
        if mandate.is_empty() || companies.is_empty() {
            return Vec::new();
        }

        info!(
            "📊 Screening {} companies against {} criteria",
            companies.len(),
            mandate.len()
        );

        let mut passed_companies = Vec::new();

        for company in companies {
            let Some(verdict) = self.evaluate_company(mandate, company) else {
                continue;
            };
            progress.on_company(&verdict);

            if verdict.passed {
                let reason = verdict.reason();
                passed_companies.push(ScreenedCompany {
                    company_name: verdict.company_name,
                    sector: verdict.sector,
                    status: "Pass".to_string(),
                    reason,
                    details: company.clone(),
                });
            } else {
                debug!(
                    company = %verdict.company_name,
                    reason = %verdict.reason(),
                    "rejected"
                );
            }
        }

        info!(
            "✅ Screen complete: {}/{} companies passed",
            passed_companies.len(),
            companies.len()
        );

        passed_companies
    }

    /// Full screening pass with counts and a timestamp attached.
    pub fn run(&self, mandate: &Mandate, companies: &[CompanyRecord]) -> ScreeningRun {
        let passed = self.screen(mandate, companies);
        ScreeningRun {
            total_screened: companies.len(),
            total_passed: passed.len(),
            timestamp: chrono::Utc::now(),
            passed,
        }
    }
}
