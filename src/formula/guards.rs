//! Arithmetic guards shared by calculator steps
//!
//! Every helper here returns a finite number or a sentinel, never NaN or an
//! infinity.

use super::output::OutputValue;

/// Smallest denominator used by [`safe_div`]
pub const EPSILON: f64 = 1e-9;

/// Periods needed for a recurring benefit to recover an upfront cost.
///
/// - `cost <= 0` pays back immediately (0)
/// - `benefit <= 0` with a positive cost never pays back
pub fn payback(cost: f64, benefit_per_period: f64) -> OutputValue {
    if cost <= 0.0 {
        OutputValue::Number(0.0)
    } else if benefit_per_period <= 0.0 {
        OutputValue::Never
    } else {
        OutputValue::Number(cost / benefit_per_period)
    }
}

/// `numerator / max(EPSILON, denominator)`
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    numerator / denominator.max(EPSILON)
}

/// Ratio that has no meaning when the denominator is zero
pub fn ratio(numerator: f64, denominator: f64) -> OutputValue {
    if denominator.abs() < EPSILON {
        OutputValue::NotApplicable
    } else {
        OutputValue::Number(numerator / denominator)
    }
}

pub fn non_negative(value: f64) -> f64 {
    value.max(0.0)
}

/// Level payment that amortizes `principal` over `periods` at `rate` per period.
/// A zero rate falls back to straight-line repayment.
pub fn annuity_payment(principal: f64, rate: f64, periods: u32) -> OutputValue {
    if periods == 0 {
        return OutputValue::NotApplicable;
    }
    if principal <= 0.0 {
        return OutputValue::Number(0.0);
    }
    if rate.abs() < EPSILON {
        return OutputValue::Number(principal / periods as f64);
    }
    let growth = (1.0 + rate).powi(periods as i32);
    OutputValue::Number(principal * rate * growth / (growth - 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_payback_edge_cases() {
        assert_eq!(payback(1000.0, 250.0), OutputValue::Number(4.0));
        assert_eq!(payback(1000.0, 0.0), OutputValue::Never);
        assert_eq!(payback(1000.0, -10.0), OutputValue::Never);
        assert_eq!(payback(0.0, -10.0), OutputValue::Number(0.0));
        assert_eq!(payback(-500.0, 100.0), OutputValue::Number(0.0));
    }

    #[test]
    fn test_payback_never_returns_infinity() {
        for cost in [-1.0, 0.0, 1e-12, 1.0, 1e12] {
            for benefit in [-1.0, 0.0, 1e-12, 1.0] {
                if let OutputValue::Number(n) = payback(cost, benefit) {
                    assert!(n.is_finite() && n >= 0.0, "{} / {} -> {}", cost, benefit, n);
                }
            }
        }
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(10.0, 2.0), 5.0);
        assert!(safe_div(10.0, 0.0).is_finite());
        assert!(safe_div(10.0, -3.0).is_finite());
    }

    #[test]
    fn test_annuity_payment() {
        // 200k over 25 years at 3% annual, monthly
        let p = annuity_payment(200_000.0, 0.03 / 12.0, 300).as_number().unwrap();
        assert_relative_eq!(p, 948.42, epsilon = 0.01);

        assert_eq!(annuity_payment(1200.0, 0.0, 12), OutputValue::Number(100.0));
        assert_eq!(annuity_payment(1200.0, 0.01, 0), OutputValue::NotApplicable);
    }
}
