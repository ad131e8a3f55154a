//! Deterministic fund-mandate screening engine.
//!
//! Takes an ordered set of free-form criteria (e.g. `revenue: "> 40000000"`,
//! `debt_to_equity: "< 0.5"`, `net_income: "Positive"`) and a list of
//! open-ended company records, normalizes the heterogeneous raw values into a
//! common basis (currency in millions, ratios as decimals) and returns the
//! companies that satisfy every criterion, with per-criterion reasons.
//!
//! The engine is synchronous, pure, and stateless across calls. Parse
//! failures never propagate: unparseable constraints fall back to the
//! `Positive` sentinel and unresolvable values fail the company.

pub mod constraint;
pub mod fields;
pub mod screener;
pub mod value;

pub use constraint::{parse_constraint, try_parse_constraint, ConstraintParseError, ParsedConstraint};
pub use fields::resolve_value;
pub use screener::{MandateScreener, ScreeningPolicy};
pub use value::{parse_value, parse_value_str};
