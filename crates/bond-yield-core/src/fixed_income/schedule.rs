//! Periodic cash-flow schedule for a bullet bond.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::BondYieldError;
use crate::fixed_income::periods::{BondInput, PeriodDecomposition};
use crate::types::Money;
use crate::BondYieldResult;

/// One coupon period of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowScheduleEntry {
    pub period: u32,
    pub payment_date: DateTime<Utc>,
    pub coupon_payment: Money,
    /// Running sum of coupons paid through this period.
    pub cumulative_interest: Money,
    /// Face value outstanding after this payment; zero once redeemed.
    pub remaining_principal: Money,
}

/// Build the coupon schedule for `input`, dating period `n` at
/// `start + n * months_per_period` months.
///
/// Values are unrounded. Cumulative interest is accumulated one coupon at a
/// time, not multiplied out, so it carries the same float drift as a running
/// ledger.
pub fn generate_cash_flow_schedule(
    input: &BondInput,
    start: DateTime<Utc>,
) -> BondYieldResult<Vec<CashFlowScheduleEntry>> {
    let periods = PeriodDecomposition::from_input(input);
    let months_per_period = input.coupon_frequency.months_per_period();

    let mut schedule = Vec::with_capacity(periods.total_periods as usize);
    let mut cumulative_interest = 0.0;

    for period in 1..=periods.total_periods {
        let payment_date = add_months(start, months_per_period * period)?;

        cumulative_interest += periods.coupon_per_period;
        let remaining_principal = if period == periods.total_periods {
            0.0
        } else {
            input.face_value
        };

        schedule.push(CashFlowScheduleEntry {
            period,
            payment_date,
            coupon_payment: periods.coupon_per_period,
            cumulative_interest,
            remaining_principal,
        });
    }

    trace!(
        entries = schedule.len(),
        frequency = %input.coupon_frequency,
        "cash-flow schedule built"
    );
    Ok(schedule)
}

/// Add calendar months, clamping the day to the end of a shorter month.
fn add_months(start: DateTime<Utc>, months: u32) -> BondYieldResult<DateTime<Utc>> {
    start.checked_add_months(Months::new(months)).ok_or_else(|| {
        BondYieldError::DateError(format!(
            "payment date {months} months after {start} is out of range"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_income::periods::CouponFrequency;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
    }

    fn bond(frequency: CouponFrequency, years: f64) -> BondInput {
        BondInput {
            face_value: 1000.0,
            annual_coupon_rate: 5.0,
            market_price: 950.0,
            years_to_maturity: years,
            coupon_frequency: frequency,
        }
    }

    #[test]
    fn test_annual_schedule_entries() {
        let schedule = generate_cash_flow_schedule(&bond(CouponFrequency::Annual, 3.0), anchor())
            .unwrap();

        assert_eq!(
            schedule,
            vec![
                CashFlowScheduleEntry {
                    period: 1,
                    payment_date: Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap(),
                    coupon_payment: 50.0,
                    cumulative_interest: 50.0,
                    remaining_principal: 1000.0,
                },
                CashFlowScheduleEntry {
                    period: 2,
                    payment_date: Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap(),
                    coupon_payment: 50.0,
                    cumulative_interest: 100.0,
                    remaining_principal: 1000.0,
                },
                CashFlowScheduleEntry {
                    period: 3,
                    payment_date: Utc.with_ymd_and_hms(2027, 1, 15, 9, 30, 0).unwrap(),
                    coupon_payment: 50.0,
                    cumulative_interest: 150.0,
                    remaining_principal: 0.0,
                },
            ]
        );
    }

    #[test]
    fn test_semi_annual_dates_step_six_months() {
        let schedule =
            generate_cash_flow_schedule(&bond(CouponFrequency::SemiAnnual, 2.0), anchor()).unwrap();

        assert_eq!(schedule.len(), 4);
        let dates: Vec<_> = schedule.iter().map(|e| e.payment_date).collect();
        assert_eq!(
            dates,
            vec![
                Utc.with_ymd_and_hms(2024, 7, 15, 9, 30, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 7, 15, 9, 30, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap(),
            ]
        );
        assert!(schedule.iter().all(|e| e.coupon_payment == 25.0));
    }

    #[test]
    fn test_month_end_anchor_clamps() {
        let start = Utc.with_ymd_and_hms(2023, 8, 31, 0, 0, 0).unwrap();
        let schedule =
            generate_cash_flow_schedule(&bond(CouponFrequency::SemiAnnual, 1.0), start).unwrap();
        // Feb 2024 has 29 days
        assert_eq!(
            schedule[0].payment_date,
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
        assert_eq!(
            schedule[1].payment_date,
            Utc.with_ymd_and_hms(2024, 8, 31, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_principal_retired_only_at_final_period() {
        let schedule =
            generate_cash_flow_schedule(&bond(CouponFrequency::SemiAnnual, 5.0), anchor()).unwrap();
        let (last, rest) = schedule.split_last().unwrap();
        assert!(rest.iter().all(|e| e.remaining_principal == 1000.0));
        assert_eq!(last.remaining_principal, 0.0);
        assert_eq!(last.period, 10);
    }

    #[test]
    fn test_cumulative_interest_is_running_sum() {
        // 0.1-sized coupons make float accumulation visible
        let input = BondInput {
            face_value: 1.0,
            annual_coupon_rate: 10.0,
            market_price: 1.0,
            years_to_maturity: 10.0,
            coupon_frequency: CouponFrequency::Annual,
        };
        let schedule = generate_cash_flow_schedule(&input, anchor()).unwrap();

        let coupon: f64 = (1.0 * (10.0 / 100.0)) / 1.0;
        let mut expected = 0.0_f64;
        for entry in &schedule {
            expected += coupon;
            assert_eq!(entry.cumulative_interest.to_bits(), expected.to_bits());
        }
    }

    #[test]
    fn test_single_period_schedule() {
        let schedule =
            generate_cash_flow_schedule(&bond(CouponFrequency::Annual, 1.0), anchor()).unwrap();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].remaining_principal, 0.0);
        assert_eq!(schedule[0].cumulative_interest, 50.0);
    }

    #[test]
    fn test_zero_coupon_schedule() {
        let mut input = bond(CouponFrequency::Annual, 2.0);
        input.annual_coupon_rate = 0.0;
        let schedule = generate_cash_flow_schedule(&input, anchor()).unwrap();
        assert!(schedule.iter().all(|e| e.coupon_payment == 0.0 && e.cumulative_interest == 0.0));
    }

    #[test]
    fn test_date_overflow_is_error() {
        let start = DateTime::<Utc>::MAX_UTC;
        let err = generate_cash_flow_schedule(&bond(CouponFrequency::Annual, 1.0), start)
            .unwrap_err();
        assert!(matches!(err, BondYieldError::DateError(_)));
    }

    #[test]
    fn test_entry_wire_format() {
        let schedule =
            generate_cash_flow_schedule(&bond(CouponFrequency::Annual, 1.0), anchor()).unwrap();
        let json = serde_json::to_value(&schedule[0]).unwrap();
        assert_eq!(json["period"], 1);
        assert_eq!(json["paymentDate"], "2025-01-15T09:30:00Z");
        assert_eq!(json["couponPayment"], 50.0);
        assert_eq!(json["cumulativeInterest"], 50.0);
        assert_eq!(json["remainingPrincipal"], 0.0);
    }
}
