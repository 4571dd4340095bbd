use crate::types::{Money, Rate};

/// Present value of a level-coupon bond at a periodic discount rate.
///
/// PV = sum(c / (1+r)^t, t = 1..n) + F / (1+r)^n
///
/// At exactly zero rate the sum collapses to `n * c + F`. Inputs are not
/// guarded: callers guarantee `periods > 0` and `rate_per_period > -1`.
pub fn bond_price_at_rate(
    face_value: Money,
    coupon_per_period: Money,
    periods: u32,
    rate_per_period: Rate,
) -> Money {
    if rate_per_period == 0.0 {
        return f64::from(periods) * coupon_per_period + face_value;
    }

    let one_plus_r = 1.0 + rate_per_period;
    let mut pv = 0.0;
    for t in 1..=periods {
        pv += coupon_per_period / one_plus_r.powi(t as i32);
    }
    pv + face_value / one_plus_r.powi(periods as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_price_zero_rate() {
        let result = bond_price_at_rate(1000.0, 50.0, 5, 0.0);
        assert_eq!(result, 1250.0);
    }

    #[test]
    fn test_price_at_coupon_rate_is_par() {
        // 5% annual coupon discounted at 5% prices at par
        let result = bond_price_at_rate(1000.0, 50.0, 5, 0.05);
        assert_relative_eq!(result, 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_price_semi_annual_par() {
        let result = bond_price_at_rate(5000.0, 100.0, 20, 0.02);
        assert_relative_eq!(result, 5000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_price_zero_coupon() {
        // 1000 / 1.1^2 = 826.446...
        let result = bond_price_at_rate(1000.0, 0.0, 2, 0.10);
        assert_relative_eq!(result, 1000.0 / 1.21, epsilon = 1e-9);
    }

    #[test]
    fn test_price_decreases_with_rate() {
        let mut last = f64::INFINITY;
        for i in 0..20 {
            let r = f64::from(i) * 0.05;
            let price = bond_price_at_rate(1000.0, 50.0, 10, r);
            assert!(price < last, "price should fall as rate rises (r={r})");
            last = price;
        }
    }

    #[test]
    fn test_price_at_full_rate_bound() {
        // r = 100% per period: each flow halves per period
        let result = bond_price_at_rate(1000.0, 50.0, 2, 1.0);
        assert_relative_eq!(result, 25.0 + 12.5 + 250.0, epsilon = 1e-12);
    }
}
