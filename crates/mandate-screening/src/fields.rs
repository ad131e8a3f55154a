use crate::value::parse_value;
use screening_core::CompanyRecord;
use serde_json::Value;
use tracing::debug;

/// Candidate source fields for the table-driven parameters. Listed in lookup
/// order; the first field that yields a usable value wins.
fn field_candidates(param_lower: &str) -> Option<&'static [&'static str]> {
    match param_lower {
        "ebitda_margin" => Some(&["EBITDA Margin"]),
        "growth" => Some(&["5-Years Growth", "1-Year Change"]),
        "debt_to_equity" => Some(&["Debt / Equity"]),
        "pe_ratio" => Some(&["P/E Ratio"]),
        "price_to_book" => Some(&["Price/Book"]),
        "dividend_yield" => Some(&["Dividend Yield"]),
        _ => None,
    }
}

/// Percentage-formatted numbers (78.8) become decimals (0.788); values at or
/// below 1 are assumed to already be decimals.
fn as_decimal_ratio(parsed: Option<f64>) -> Option<f64> {
    parsed.map(|v| if v > 1.0 { v / 100.0 } else { v })
}

/// Resolve a logical mandate parameter to a normalized numeric value on a
/// company record. Currency metrics come back in millions, ratio metrics as
/// decimals. `None` means value-unavailable, which always fails the criterion
/// for the company in question.
///
/// `ebitda` is the deliberate exception to the ratios-as-decimals rule: it
/// resolves to EBITDA margin as a *percentage number* (e.g. 55.6), because
/// mandate thresholds for that metric arrive as percentage figures.
pub fn resolve_value(company: &CompanyRecord, parameter: &str) -> Option<f64> {
    let param_lower = parameter.to_lowercase();

    match param_lower.as_str() {
        "net_income" => parse_value(company.get("Net Income")?),
        "revenue" => parse_value(company.get("Revenue")?),
        "market_cap" => parse_value(company.get("Market Cap")?),
        "ebitda" => {
            let revenue = parse_value(company.get("Revenue")?)?;
            let ebitda = parse_value(company.get("EBITDA")?)?;
            if revenue == 0.0 {
                return None;
            }
            Some((ebitda / revenue) * 100.0)
        }
        "gross_profit_margin" => {
            as_decimal_ratio(parse_value(company.get("Gross Profit Margin")?))
        }
        "return_on_equity" => as_decimal_ratio(parse_value(company.get("Return on Equity")?)),
        _ => {
            let literal = [parameter];
            let candidates: &[&str] = match field_candidates(&param_lower) {
                Some(fields) => fields,
                None => &literal,
            };

            for field in candidates {
                let Some(raw) = company.get(*field) else {
                    continue;
                };
                if raw.is_null() {
                    continue;
                }
                let Some(parsed) = parse_value(raw) else {
                    continue;
                };
                // Percentage-decorated strings resolve to decimals.
                if matches!(raw, Value::String(s) if s.contains('%')) {
                    return Some(parsed / 100.0);
                }
                return Some(parsed);
            }

            debug!(parameter, "no resolvable field for parameter");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn company(fields: serde_json::Value) -> CompanyRecord {
        fields.as_object().expect("test fixture is an object").clone()
    }

    #[test]
    fn currency_metrics_resolve_in_millions() {
        let c = company(json!({
            "Revenue": "2.5B",
            "Net Income": 120.0,
            "Market Cap": "$1.1T"
        }));
        assert_eq!(resolve_value(&c, "revenue"), Some(2500.0));
        assert_eq!(resolve_value(&c, "net_income"), Some(120.0));
        assert_eq!(resolve_value(&c, "market_cap"), Some(1_100_000.0));
    }

    #[test]
    fn parameter_names_are_case_insensitive() {
        let c = company(json!({ "Revenue": 100.0 }));
        assert_eq!(resolve_value(&c, "Revenue"), Some(100.0));
        assert_eq!(resolve_value(&c, "REVENUE"), Some(100.0));
    }

    #[test]
    fn ebitda_is_a_percentage_of_revenue() {
        let c = company(json!({ "Revenue": 200.0, "EBITDA": 50.0 }));
        assert_eq!(resolve_value(&c, "ebitda"), Some(25.0));
    }

    #[test]
    fn ebitda_needs_both_sides_and_nonzero_revenue() {
        let no_revenue = company(json!({ "EBITDA": 50.0 }));
        assert_eq!(resolve_value(&no_revenue, "ebitda"), None);

        let no_ebitda = company(json!({ "Revenue": 200.0 }));
        assert_eq!(resolve_value(&no_ebitda, "ebitda"), None);

        let zero_revenue = company(json!({ "Revenue": 0.0, "EBITDA": 50.0 }));
        assert_eq!(resolve_value(&zero_revenue, "ebitda"), None);
    }

    #[test]
    fn margin_metrics_collapse_to_decimals() {
        let pct = company(json!({ "Gross Profit Margin": 78.8 }));
        let v = resolve_value(&pct, "gross_profit_margin").unwrap();
        assert!((v - 0.788).abs() < 1e-12);

        let dec = company(json!({ "Gross Profit Margin": 0.788 }));
        assert_eq!(resolve_value(&dec, "gross_profit_margin"), Some(0.788));

        let roe = company(json!({ "Return on Equity": 18.5 }));
        let v = resolve_value(&roe, "return_on_equity").unwrap();
        assert!((v - 0.185).abs() < 1e-12);
    }

    #[test]
    fn growth_tries_candidate_fields_in_order() {
        let five_year = company(json!({ "5-Years Growth": 12.0, "1-Year Change": 3.0 }));
        assert_eq!(resolve_value(&five_year, "growth"), Some(12.0));

        let fallback = company(json!({ "5-Years Growth": null, "1-Year Change": 3.0 }));
        assert_eq!(resolve_value(&fallback, "growth"), Some(3.0));
    }

    #[test]
    fn percent_strings_resolve_to_decimals_in_the_generic_path() {
        let c = company(json!({ "Dividend Yield": "2.4%" }));
        let v = resolve_value(&c, "dividend_yield").unwrap();
        assert!((v - 0.024).abs() < 1e-12);
    }

    #[test]
    fn unknown_parameters_fall_back_to_literal_field_names() {
        let c = company(json!({ "Free Cash Flow": 42.0 }));
        assert_eq!(resolve_value(&c, "Free Cash Flow"), Some(42.0));
        assert_eq!(resolve_value(&c, "no_such_field"), None);
    }

    #[test]
    fn missing_or_unparseable_values_are_none() {
        let c = company(json!({ "Debt / Equity": "n/a" }));
        assert_eq!(resolve_value(&c, "debt_to_equity"), None);
        assert_eq!(resolve_value(&c, "pe_ratio"), None);
    }
}
