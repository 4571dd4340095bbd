//! Bond metrics: current yield, YTM, total interest, premium/discount and
//! the cash-flow schedule, assembled into one result.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::fixed_income::periods::{validate_bond_input, BondInput, PeriodDecomposition};
use crate::fixed_income::schedule::{generate_cash_flow_schedule, CashFlowScheduleEntry};
use crate::fixed_income::yields::{solve_ytm_for_periods, validate_solver_config, SolverConfig};
use crate::types::{round_2dp, with_metadata, ComputationOutput, Money, Percent, Rate, Years};
use crate::BondYieldResult;

/// Relative gap under which a non-par classification is flagged as float noise.
const NEAR_PAR_RELATIVE_GAP: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Market price relative to face value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PremiumOrDiscount {
    Premium,
    Discount,
    Par,
}

impl fmt::Display for PremiumOrDiscount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PremiumOrDiscount::Premium => write!(f, "PREMIUM"),
            PremiumOrDiscount::Discount => write!(f, "DISCOUNT"),
            PremiumOrDiscount::Par => write!(f, "PAR"),
        }
    }
}

/// Unrounded metrics, for callers that re-round or re-format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBondMetrics {
    pub annual_coupon: Money,
    /// Current yield as a decimal (0.0526 = 5.26%).
    pub current_yield: Rate,
    /// Annual yield to maturity as a percentage.
    pub ytm: Percent,
    pub total_interest: Money,
    pub periods: PeriodDecomposition,
    pub solver_iterations: u32,
}

/// Result of a full bond calculation.
///
/// The headline figures are rounded to two places. The schedule is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondMetricsResult {
    /// Current yield as a percentage.
    #[serde(with = "rust_decimal::serde::float")]
    pub current_yield: Decimal,
    /// Annual yield to maturity as a percentage.
    #[serde(with = "rust_decimal::serde::float")]
    pub ytm: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_interest: Decimal,
    pub premium_or_discount: PremiumOrDiscount,
    pub cash_flow_schedule: Vec<CashFlowScheduleEntry>,
    pub raw: RawBondMetrics,
}

/// A bond calculation request as received at a boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondRequest {
    #[serde(flatten)]
    pub bond: BondInput,
    /// Anchor for the schedule's payment dates. Boundaries default it to now.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub solver: SolverConfig,
}

// ---------------------------------------------------------------------------
// Simple metrics
// ---------------------------------------------------------------------------

/// Annual coupon amount: `face * rate / 100`.
pub fn annual_coupon(face_value: Money, annual_coupon_rate: Percent) -> Money {
    face_value * (annual_coupon_rate / 100.0)
}

/// Current yield as a decimal: `annual coupon / market price`.
pub fn current_yield(annual_coupon: Money, market_price: Money) -> Rate {
    annual_coupon / market_price
}

/// Undiscounted sum of coupons over the life of the bond.
pub fn total_interest(annual_coupon: Money, years_to_maturity: Years) -> Money {
    annual_coupon * years_to_maturity
}

/// Classify by exact comparison. A price a rounding error away from face is
/// not PAR.
pub fn premium_or_discount(face_value: Money, market_price: Money) -> PremiumOrDiscount {
    if market_price > face_value {
        PremiumOrDiscount::Premium
    } else if market_price < face_value {
        PremiumOrDiscount::Discount
    } else {
        PremiumOrDiscount::Par
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute all metrics with the reference solver settings.
///
/// `input` is assumed validated. `start` anchors the schedule dates.
pub fn calculate_bond_metrics(
    input: &BondInput,
    start: DateTime<Utc>,
) -> BondYieldResult<BondMetricsResult> {
    calculate_bond_metrics_with_config(input, start, &SolverConfig::default())
}

pub fn calculate_bond_metrics_with_config(
    input: &BondInput,
    start: DateTime<Utc>,
    config: &SolverConfig,
) -> BondYieldResult<BondMetricsResult> {
    let coupon = annual_coupon(input.face_value, input.annual_coupon_rate);
    let current_yield_decimal = current_yield(coupon, input.market_price);
    let interest = total_interest(coupon, input.years_to_maturity);
    let classification = premium_or_discount(input.face_value, input.market_price);

    let periods = PeriodDecomposition::from_input(input);
    let solution = solve_ytm_for_periods(input.face_value, input.market_price, &periods, config)?;

    let cash_flow_schedule = generate_cash_flow_schedule(input, start)?;

    Ok(BondMetricsResult {
        current_yield: round_2dp(current_yield_decimal * 100.0),
        ytm: round_2dp(solution.ytm),
        total_interest: round_2dp(interest),
        premium_or_discount: classification,
        cash_flow_schedule,
        raw: RawBondMetrics {
            annual_coupon: coupon,
            current_yield: current_yield_decimal,
            ytm: solution.ytm,
            total_interest: interest,
            periods,
            solver_iterations: solution.iterations,
        },
    })
}

/// Validate a request, compute the metrics and wrap them with methodology,
/// assumptions and warnings.
pub fn analyze_bond(
    request: &BondRequest,
    default_start: DateTime<Utc>,
) -> BondYieldResult<ComputationOutput<BondMetricsResult>> {
    let timer = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_bond_input(&request.bond)?;
    validate_solver_config(&request.solver)?;

    let bond = &request.bond;
    let start = request.start_date.unwrap_or(default_start);
    let output = calculate_bond_metrics_with_config(bond, start, &request.solver)?;

    let gap = (bond.market_price - bond.face_value).abs() / bond.face_value;
    if output.premium_or_discount != PremiumOrDiscount::Par && gap < NEAR_PAR_RELATIVE_GAP {
        warnings.push(format!(
            "Market price {} differs from face value {} only by floating-point noise; classified as {}",
            bond.market_price, bond.face_value, output.premium_or_discount
        ));
    }
    if bond.annual_coupon_rate == 0.0 {
        warnings.push("Zero coupon: cumulative interest stays at 0 across the schedule".into());
    }

    let elapsed = timer.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "ytm_method": "bisection",
        "periodic_rate_bounds": [request.solver.lower_bound, request.solver.upper_bound],
        "abs_tolerance": request.solver.abs_tolerance,
        "rel_tolerance": request.solver.rel_tolerance,
        "max_iterations": request.solver.max_iterations,
        "schedule_start": start.to_rfc3339(),
        "rounding": "headline metrics 2dp, schedule unrounded",
        "premium_discount_rule": "exact comparison, no tolerance band"
    });

    Ok(with_metadata(
        "Bond metrics: bisection YTM over whole coupon periods",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_income::periods::CouponFrequency;
    use crate::BondYieldError;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
    }

    fn request(market_price: f64) -> BondRequest {
        BondRequest {
            bond: BondInput {
                face_value: 1000.0,
                annual_coupon_rate: 5.0,
                market_price,
                years_to_maturity: 5.0,
                coupon_frequency: CouponFrequency::Annual,
            },
            start_date: None,
            solver: SolverConfig::default(),
        }
    }

    #[test]
    fn test_annual_coupon() {
        assert_eq!(annual_coupon(1000.0, 5.0), 50.0);
        assert_eq!(annual_coupon(5000.0, 4.0), 200.0);
        assert_eq!(annual_coupon(1000.0, 0.0), 0.0);
    }

    #[test]
    fn test_current_yield() {
        assert!((current_yield(50.0, 950.0) - 50.0 / 950.0).abs() < 1e-15);
        assert!((current_yield(50.0, 1050.0) - 50.0 / 1050.0).abs() < 1e-15);
        assert_eq!(current_yield(50.0, 1000.0), 0.05);
    }

    #[test]
    fn test_total_interest() {
        assert_eq!(total_interest(50.0, 5.0), 250.0);
        assert_eq!(total_interest(80.0, 10.0), 800.0);
        assert_eq!(total_interest(0.0, 5.0), 0.0);
    }

    #[test]
    fn test_premium_or_discount() {
        assert_eq!(premium_or_discount(1000.0, 950.0), PremiumOrDiscount::Discount);
        assert_eq!(premium_or_discount(1000.0, 1050.0), PremiumOrDiscount::Premium);
        assert_eq!(premium_or_discount(1000.0, 1000.0), PremiumOrDiscount::Par);
        assert_eq!(premium_or_discount(1000.0, 980.0), PremiumOrDiscount::Discount);
    }

    #[test]
    fn test_premium_or_discount_has_no_tolerance_band() {
        // 0.1 + 0.2 != 0.3 in binary floating point
        assert_eq!(premium_or_discount(0.3, 0.1 + 0.2), PremiumOrDiscount::Premium);
    }

    #[test]
    fn test_metrics_rounding() {
        let result = calculate_bond_metrics(&request(950.0).bond, anchor()).unwrap();
        assert_eq!(result.current_yield, dec!(5.26));
        assert_eq!(result.total_interest, dec!(250));
        assert_eq!(result.ytm, dec!(6.19));
        assert_eq!(result.premium_or_discount, PremiumOrDiscount::Discount);
        assert_eq!(result.raw.annual_coupon, 50.0);
        assert!((result.raw.current_yield - 50.0 / 950.0).abs() < 1e-15);
    }

    #[test]
    fn test_metrics_propagates_convergence_failure() {
        let mut bond = request(950.0).bond;
        bond.market_price = 0.0;
        let err = calculate_bond_metrics(&bond, anchor()).unwrap_err();
        assert!(matches!(err, BondYieldError::ConvergenceFailure { .. }));
    }

    #[test]
    fn test_analyze_validates() {
        let err = analyze_bond(&request(0.0), anchor()).unwrap_err();
        assert!(matches!(err, BondYieldError::InvalidInput { .. }));
    }

    #[test]
    fn test_analyze_envelope() {
        let out = analyze_bond(&request(950.0), anchor()).unwrap();
        assert!(out.warnings.is_empty());
        assert_eq!(out.assumptions["max_iterations"], 2000);
        assert_eq!(out.assumptions["ytm_method"], "bisection");
        assert_eq!(out.result.cash_flow_schedule.len(), 5);
        assert_eq!(
            out.result.cash_flow_schedule[0].payment_date,
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_analyze_prefers_request_start_date() {
        let mut req = request(950.0);
        req.start_date = Some(Utc.with_ymd_and_hms(2030, 6, 30, 0, 0, 0).unwrap());
        let out = analyze_bond(&req, anchor()).unwrap();
        assert_eq!(
            out.result.cash_flow_schedule[0].payment_date,
            Utc.with_ymd_and_hms(2031, 6, 30, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_analyze_warns_near_par() {
        let out = analyze_bond(&request(1000.0 + 1e-10), anchor()).unwrap();
        assert_eq!(out.result.premium_or_discount, PremiumOrDiscount::Premium);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("floating-point noise"));
    }

    #[test]
    fn test_analyze_warns_zero_coupon() {
        let mut req = request(900.0);
        req.bond.annual_coupon_rate = 0.0;
        let out = analyze_bond(&req, anchor()).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("Zero coupon")));
    }

    #[test]
    fn test_result_wire_format() {
        let result = calculate_bond_metrics(&request(950.0).bond, anchor()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["currentYield"], 5.26);
        assert_eq!(json["ytm"], 6.19);
        assert_eq!(json["totalInterest"], 250.0);
        assert_eq!(json["premiumOrDiscount"], "DISCOUNT");
        assert_eq!(json["cashFlowSchedule"].as_array().unwrap().len(), 5);
        assert_eq!(json["raw"]["annualCoupon"], 50.0);
    }

    #[test]
    fn test_request_parses_optional_fields() {
        let req: BondRequest = serde_json::from_str(
            r#"{"faceValue":1000,"annualCouponRate":5,"marketPrice":950,
                "yearsToMaturity":5,"couponFrequency":"SEMI_ANNUAL",
                "startDate":"2024-01-01T00:00:00Z","solver":{"maxIterations":100}}"#,
        )
        .unwrap();
        assert_eq!(req.bond.coupon_frequency, CouponFrequency::SemiAnnual);
        assert_eq!(req.solver.max_iterations, 100);
        assert!(req.start_date.is_some());

        let req: BondRequest = serde_json::from_str(
            r#"{"faceValue":1000,"annualCouponRate":5,"marketPrice":950,
                "yearsToMaturity":5,"couponFrequency":"ANNUAL"}"#,
        )
        .unwrap();
        assert!(req.start_date.is_none());
        assert_eq!(req.solver, SolverConfig::default());
    }

    #[test]
    fn test_analyze_rejects_solver_overrides() {
        let req: BondRequest = serde_json::from_str(
            r#"{"faceValue":1000,"annualCouponRate":5,"marketPrice":950,
                "yearsToMaturity":5,"couponFrequency":"ANNUAL",
                "solver":{"absTolerance":1e9}}"#,
        )
        .unwrap();
        match analyze_bond(&req, anchor()) {
            Err(BondYieldError::InvalidInput { field, .. }) => {
                assert_eq!(field, "solver.absTolerance")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }

        let mut req = request(1300.0);
        req.solver.max_iterations = 4_000_000_000;
        match analyze_bond(&req, anchor()) {
            Err(BondYieldError::InvalidInput { field, .. }) => {
                assert_eq!(field, "solver.maxIterations")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
