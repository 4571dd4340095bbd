//! Bond input, coupon frequency and the shared period decomposition.
//!
//! Every consumer of period counts or per-period coupons (the YTM solver and
//! the cash-flow schedule) goes through [`PeriodDecomposition::derive`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BondYieldError;
use crate::types::{Money, Percent, Years};
use crate::BondYieldResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Largest schedule accepted at the boundary (100 years of semi-annual coupons).
pub const MAX_TOTAL_PERIODS: u32 = 200;

/// Slack allowed when checking that maturity covers whole coupon periods.
const WHOLE_PERIOD_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How often the bond pays its coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponFrequency {
    Annual,
    SemiAnnual,
}

impl CouponFrequency {
    /// Coupon periods per year: 1 or 2.
    pub fn periods_per_year(self) -> u32 {
        match self {
            CouponFrequency::Annual => 1,
            CouponFrequency::SemiAnnual => 2,
        }
    }

    /// Calendar months between coupon dates: 12 or 6.
    pub fn months_per_period(self) -> u32 {
        12 / self.periods_per_year()
    }
}

impl fmt::Display for CouponFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CouponFrequency::Annual => write!(f, "ANNUAL"),
            CouponFrequency::SemiAnnual => write!(f, "SEMI_ANNUAL"),
        }
    }
}

/// Bond parameters for a single calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondInput {
    /// Face (par) value repaid at maturity.
    pub face_value: Money,
    /// Annual coupon rate as a percentage (5.0 = 5%).
    pub annual_coupon_rate: Percent,
    /// Current market price of the bond.
    pub market_price: Money,
    /// Years remaining until maturity. Must cover a whole number of periods.
    pub years_to_maturity: Years,
    pub coupon_frequency: CouponFrequency,
}

/// Period count and coupon size derived from the bond terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDecomposition {
    pub periods_per_year: u32,
    pub total_periods: u32,
    pub coupon_per_period: Money,
}

impl PeriodDecomposition {
    /// The single derivation of periods and per-period coupon.
    ///
    /// `total_periods = years * periods_per_year` and
    /// `coupon_per_period = (face * rate / 100) / periods_per_year`.
    /// Maturity is assumed to cover whole periods (see [`validate_bond_input`]).
    pub fn derive(
        face_value: Money,
        annual_coupon_rate: Percent,
        years_to_maturity: Years,
        frequency: CouponFrequency,
    ) -> Self {
        let periods_per_year = frequency.periods_per_year();
        let ppy = f64::from(periods_per_year);
        let total_periods = (years_to_maturity * ppy).round() as u32;
        let coupon_per_period = (face_value * (annual_coupon_rate / 100.0)) / ppy;

        PeriodDecomposition {
            periods_per_year,
            total_periods,
            coupon_per_period,
        }
    }

    pub fn from_input(input: &BondInput) -> Self {
        Self::derive(
            input.face_value,
            input.annual_coupon_rate,
            input.years_to_maturity,
            input.coupon_frequency,
        )
    }

    /// Convert a periodic rate to an annual percentage.
    pub fn annualize(&self, periodic_rate: f64) -> Percent {
        periodic_rate * f64::from(self.periods_per_year) * 100.0
    }

    /// Convert an annual percentage to the periodic rate.
    pub fn periodic_rate(&self, annual_percent: Percent) -> f64 {
        (annual_percent / 100.0) / f64::from(self.periods_per_year)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Boundary validation of a bond request.
///
/// The numeric core assumes these rules hold and does not re-check them.
pub fn validate_bond_input(input: &BondInput) -> BondYieldResult<()> {
    validate_bond_terms(
        input.face_value,
        input.annual_coupon_rate,
        input.years_to_maturity,
        input.coupon_frequency,
    )?;

    if !input.market_price.is_finite() {
        return Err(BondYieldError::InvalidInput {
            field: "marketPrice".into(),
            reason: "marketPrice must be a finite number".into(),
        });
    }
    if input.market_price <= 0.0 {
        return Err(BondYieldError::InvalidInput {
            field: "marketPrice".into(),
            reason: "marketPrice must be greater than 0".into(),
        });
    }
    Ok(())
}

/// Validate the contractual terms shared by every calculation.
pub fn validate_bond_terms(
    face_value: Money,
    annual_coupon_rate: Percent,
    years_to_maturity: Years,
    frequency: CouponFrequency,
) -> BondYieldResult<()> {
    let finite = [
        ("faceValue", face_value),
        ("annualCouponRate", annual_coupon_rate),
        ("yearsToMaturity", years_to_maturity),
    ];
    for (field, value) in finite {
        if !value.is_finite() {
            return Err(BondYieldError::InvalidInput {
                field: field.into(),
                reason: format!("{field} must be a finite number"),
            });
        }
    }

    if face_value <= 0.0 {
        return Err(BondYieldError::InvalidInput {
            field: "faceValue".into(),
            reason: "faceValue must be greater than 0".into(),
        });
    }
    if annual_coupon_rate < 0.0 {
        return Err(BondYieldError::InvalidInput {
            field: "annualCouponRate".into(),
            reason: "annualCouponRate must be greater than or equal to 0".into(),
        });
    }
    if years_to_maturity <= 0.0 {
        return Err(BondYieldError::InvalidInput {
            field: "yearsToMaturity".into(),
            reason: "yearsToMaturity must be greater than 0".into(),
        });
    }

    let periods = years_to_maturity * f64::from(frequency.periods_per_year());
    if (periods - periods.round()).abs() > WHOLE_PERIOD_EPSILON || periods.round() < 1.0 {
        return Err(BondYieldError::InvalidInput {
            field: "yearsToMaturity".into(),
            reason: format!(
                "yearsToMaturity must span a whole number of {frequency} coupon periods"
            ),
        });
    }
    if periods.round() > f64::from(MAX_TOTAL_PERIODS) {
        return Err(BondYieldError::InvalidInput {
            field: "yearsToMaturity".into(),
            reason: format!("schedule cannot exceed {MAX_TOTAL_PERIODS} coupon periods"),
        });
    }

    Ok(())
}
