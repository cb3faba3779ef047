//! Distribution Functions
//!
//! Cumulative distribution functions and survival functions (`1 - cdf`)
//! used to turn test statistics into p-values. Survival functions are
//! evaluated directly rather than as `1 - cdf` so that far-tail p-values keep
//! their relative precision.
//!
//! Degrees of freedom must be positive and finite; anything else fails with
//! [`StatsError::InvalidParameter`].

use crate::error::StatsError;
use crate::special::{erfc, gamma_p, gamma_q, incomplete_beta};
use std::f64::consts::SQRT_2;

fn check_df(function: &'static str, name: &str, df: f64) -> Result<(), StatsError> {
    if df.is_finite() && df > 0.0 {
        Ok(())
    } else {
        Err(StatsError::invalid(
            function,
            format!("{name} must be positive and finite, got {df}"),
        ))
    }
}

fn check_statistic(function: &'static str, x: f64) -> Result<(), StatsError> {
    if x.is_nan() {
        Err(StatsError::invalid(function, "statistic is NaN"))
    } else {
        Ok(())
    }
}

/// Probability mass in one tail beyond |t|
fn student_t_tail(t: f64, df: f64) -> f64 {
    if t.is_infinite() {
        return 0.0;
    }
    let x = df / (df + t * t);
    0.5 * incomplete_beta(df / 2.0, 0.5, x)
}

/// Student's t CDF, P(T <= t)
///
/// # Examples
///
/// ```
/// # use hypotest_stats::student_t_cdf;
/// assert_eq!(student_t_cdf(0.0, 5.0).unwrap(), 0.5);
/// ```
pub fn student_t_cdf(t: f64, df: f64) -> Result<f64, StatsError> {
    check_df("student_t_cdf", "df", df)?;
    check_statistic("student_t_cdf", t)?;
    let tail = student_t_tail(t, df);
    Ok(if t > 0.0 { 1.0 - tail } else { tail })
}

/// Student's t survival function, P(T > t)
pub fn student_t_sf(t: f64, df: f64) -> Result<f64, StatsError> {
    check_df("student_t_sf", "df", df)?;
    check_statistic("student_t_sf", t)?;
    let tail = student_t_tail(t, df);
    Ok(if t > 0.0 { tail } else { 1.0 - tail })
}

/// Chi-square CDF, P(X <= x)
pub fn chi_square_cdf(x: f64, df: f64) -> Result<f64, StatsError> {
    check_df("chi_square_cdf", "df", df)?;
    check_statistic("chi_square_cdf", x)?;
    if x.is_infinite() {
        return Ok(if x > 0.0 { 1.0 } else { 0.0 });
    }
    Ok(gamma_p(df / 2.0, x / 2.0))
}

/// Chi-square survival function, P(X > x)
pub fn chi_square_sf(x: f64, df: f64) -> Result<f64, StatsError> {
    check_df("chi_square_sf", "df", df)?;
    check_statistic("chi_square_sf", x)?;
    if x.is_infinite() {
        return Ok(if x > 0.0 { 0.0 } else { 1.0 });
    }
    Ok(gamma_q(df / 2.0, x / 2.0))
}

/// Standard normal CDF, Φ(z)
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

/// Standard normal survival function, 1 - Φ(z)
pub fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / SQRT_2)
}

/// F distribution CDF, P(F <= f)
pub fn f_cdf(f: f64, df1: f64, df2: f64) -> Result<f64, StatsError> {
    check_df("f_cdf", "df1", df1)?;
    check_df("f_cdf", "df2", df2)?;
    check_statistic("f_cdf", f)?;
    if f <= 0.0 {
        return Ok(0.0);
    }
    if f.is_infinite() {
        return Ok(1.0);
    }
    Ok(incomplete_beta(df1 / 2.0, df2 / 2.0, df1 * f / (df1 * f + df2)))
}

/// F distribution survival function, P(F > f)
pub fn f_sf(f: f64, df1: f64, df2: f64) -> Result<f64, StatsError> {
    check_df("f_sf", "df1", df1)?;
    check_df("f_sf", "df2", df2)?;
    check_statistic("f_sf", f)?;
    if f <= 0.0 {
        return Ok(1.0);
    }
    if f.is_infinite() {
        return Ok(0.0);
    }
    Ok(incomplete_beta(df2 / 2.0, df1 / 2.0, df2 / (df2 + df1 * f)))
}
