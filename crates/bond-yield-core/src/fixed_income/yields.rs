//! Yield to maturity by bisection over the bond pricing function.
//!
//! The periodic rate is searched in `[0, 1]`. Price falls monotonically as
//! the rate rises, so the bracket is narrowed towards the rate whose price
//! matches the market. The result is annualized and quoted as a percentage.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::BondYieldError;
use crate::fixed_income::periods::{validate_bond_terms, CouponFrequency, PeriodDecomposition};
use crate::time_value::bond_price_at_rate;
use crate::types::{Money, Percent, Rate, Years};
use crate::BondYieldResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest periodic rate searched.
pub const BISECTION_LOWER_BOUND: Rate = 0.0;

/// Highest periodic rate searched (100% per period).
pub const BISECTION_UPPER_BOUND: Rate = 1.0;

/// Absolute price tolerance, in currency units.
pub const BISECTION_TOLERANCE_ABS: Money = 0.0001;

/// Price tolerance relative to the market price.
pub const BISECTION_TOLERANCE_REL: f64 = 1e-8;

/// Maximum bisection iterations before giving up.
pub const BISECTION_MAX_ITERATIONS: u32 = 2000;

/// Hard ceiling on a caller-supplied iteration cap.
pub const MAX_SOLVER_ITERATIONS: u32 = 10_000;

/// Largest accepted absolute price tolerance, in currency units.
pub const MAX_TOLERANCE_ABS: Money = 1.0;

/// Largest accepted relative price tolerance.
pub const MAX_TOLERANCE_REL: f64 = 0.01;

/// Bracket width at which further halving cannot move the midpoint.
const BRACKET_COLLAPSE_WIDTH: f64 = f64::EPSILON * 2.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Bisection search bounds, tolerances and iteration cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolverConfig {
    pub lower_bound: Rate,
    pub upper_bound: Rate,
    pub abs_tolerance: Money,
    pub rel_tolerance: f64,
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            lower_bound: BISECTION_LOWER_BOUND,
            upper_bound: BISECTION_UPPER_BOUND,
            abs_tolerance: BISECTION_TOLERANCE_ABS,
            rel_tolerance: BISECTION_TOLERANCE_REL,
            max_iterations: BISECTION_MAX_ITERATIONS,
        }
    }
}

/// Which test accepted the midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Acceptance {
    /// Priced within the absolute or relative tolerance.
    PriceTolerance,
    /// The bracket shrank to floating-point resolution around the root.
    BracketCollapsed,
}

/// A converged yield with solver diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtmSolution {
    /// Annual yield to maturity as a percentage.
    pub ytm: Percent,
    /// Periodic rate the bisection converged to.
    pub periodic_rate: Rate,
    pub iterations: u32,
    /// Model price minus market price at the accepted rate.
    pub residual: Money,
    pub acceptance: Acceptance,
}

/// Bond terms plus a quoted yield, for pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAtYieldInput {
    pub face_value: Money,
    pub annual_coupon_rate: Percent,
    pub years_to_maturity: Years,
    pub coupon_frequency: CouponFrequency,
    /// Annual yield as a percentage.
    pub annual_yield: Percent,
}

/// Price of a bond at a quoted yield.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAtYieldOutput {
    pub price: Money,
    pub periodic_rate: Rate,
    pub periods: PeriodDecomposition,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Annual yield to maturity (percent) with the reference solver settings.
pub fn solve_ytm(
    face_value: Money,
    annual_coupon_rate: Percent,
    market_price: Money,
    years_to_maturity: Years,
    coupon_frequency: CouponFrequency,
) -> BondYieldResult<Percent> {
    let periods = PeriodDecomposition::derive(
        face_value,
        annual_coupon_rate,
        years_to_maturity,
        coupon_frequency,
    );
    solve_ytm_for_periods(face_value, market_price, &periods, &SolverConfig::default())
        .map(|s| s.ytm)
}

/// Check caller-supplied solver settings before they reach the bisection loop.
pub fn validate_solver_config(config: &SolverConfig) -> BondYieldResult<()> {
    let invalid = |field: &str, reason: String| BondYieldError::InvalidInput {
        field: format!("solver.{field}"),
        reason,
    };

    if !config.lower_bound.is_finite() {
        return Err(invalid("lowerBound", "lowerBound must be finite".into()));
    }
    if !config.upper_bound.is_finite() {
        return Err(invalid("upperBound", "upperBound must be finite".into()));
    }
    if config.lower_bound <= -1.0 {
        return Err(invalid(
            "lowerBound",
            "lowerBound must be greater than -1".into(),
        ));
    }
    if config.lower_bound >= config.upper_bound {
        return Err(invalid(
            "upperBound",
            "upperBound must be greater than lowerBound".into(),
        ));
    }
    if !config.abs_tolerance.is_finite()
        || config.abs_tolerance < 0.0
        || config.abs_tolerance > MAX_TOLERANCE_ABS
    {
        return Err(invalid(
            "absTolerance",
            format!("absTolerance must be between 0 and {MAX_TOLERANCE_ABS}"),
        ));
    }
    if !config.rel_tolerance.is_finite()
        || config.rel_tolerance < 0.0
        || config.rel_tolerance > MAX_TOLERANCE_REL
    {
        return Err(invalid(
            "relTolerance",
            format!("relTolerance must be between 0 and {MAX_TOLERANCE_REL}"),
        ));
    }
    if config.max_iterations == 0 || config.max_iterations > MAX_SOLVER_ITERATIONS {
        return Err(invalid(
            "maxIterations",
            format!("maxIterations must be between 1 and {MAX_SOLVER_ITERATIONS}"),
        ));
    }
    Ok(())
}

/// Solve for the periodic rate that prices the bond at `market_price`.
///
/// Fails with [`BondYieldError::ConvergenceFailure`] once
/// `config.max_iterations` are spent without meeting a convergence test.
/// The collapsed-bracket test only applies while the target price is still
/// bracketed, so a price with no root in range (for example zero) runs the
/// iteration budget out instead of returning a bound.
///
/// Settings outside [`validate_solver_config`] are rejected up front.
pub fn solve_ytm_for_periods(
    face_value: Money,
    market_price: Money,
    periods: &PeriodDecomposition,
    config: &SolverConfig,
) -> BondYieldResult<YtmSolution> {
    validate_solver_config(config)?;

    let price_at = |rate: Rate| {
        bond_price_at_rate(
            face_value,
            periods.coupon_per_period,
            periods.total_periods,
            rate,
        )
    };

    let mut low = config.lower_bound;
    let mut high = config.upper_bound;

    // price(low) >= market >= price(high) holds for the whole search once
    // true at the bounds, since each update keeps one side of the target.
    let bracketed = price_at(low) >= market_price && price_at(high) <= market_price;

    let mut last_delta = f64::NAN;

    for i in 0..config.max_iterations {
        let mid = (low + high) / 2.0;
        let price_at_mid = price_at(mid);
        let delta = price_at_mid - market_price;
        last_delta = delta;

        let abs_error = delta.abs();
        // No relative test against a non-positive price
        let within_rel = market_price > 0.0 && abs_error / market_price <= config.rel_tolerance;

        let acceptance = if abs_error <= config.abs_tolerance || within_rel {
            Some(Acceptance::PriceTolerance)
        } else if bracketed && high - low <= BRACKET_COLLAPSE_WIDTH {
            Some(Acceptance::BracketCollapsed)
        } else {
            None
        };

        if let Some(acceptance) = acceptance {
            let ytm = periods.annualize(mid);
            debug!(
                iterations = i + 1,
                periodic_rate = mid,
                ytm,
                residual = delta,
                ?acceptance,
                "YTM converged"
            );
            return Ok(YtmSolution {
                ytm,
                periodic_rate: mid,
                iterations: i + 1,
                residual: delta,
                acceptance,
            });
        }

        if price_at_mid > market_price {
            low = mid;
        } else {
            high = mid;
        }
    }

    warn!(
        max_iterations = config.max_iterations,
        last_delta,
        market_price,
        "YTM failed to converge"
    );
    Err(BondYieldError::ConvergenceFailure {
        function: "YTM".into(),
        max_iterations: config.max_iterations,
        last_delta,
    })
}

/// Price a bond at an annual yield, the inverse of the YTM solve.
pub fn price_at_yield(input: &PriceAtYieldInput) -> BondYieldResult<PriceAtYieldOutput> {
    validate_bond_terms(
        input.face_value,
        input.annual_coupon_rate,
        input.years_to_maturity,
        input.coupon_frequency,
    )?;

    let periods = PeriodDecomposition::derive(
        input.face_value,
        input.annual_coupon_rate,
        input.years_to_maturity,
        input.coupon_frequency,
    );
    let periodic_rate = periods.periodic_rate(input.annual_yield);
    if !periodic_rate.is_finite() || periodic_rate <= -1.0 {
        return Err(BondYieldError::InvalidInput {
            field: "annualYield".into(),
            reason: "annualYield must be finite and above -100% per period".into(),
        });
    }

    let price = bond_price_at_rate(
        input.face_value,
        periods.coupon_per_period,
        periods.total_periods,
        periodic_rate,
    );
    Ok(PriceAtYieldOutput {
        price,
        periodic_rate,
        periods,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
