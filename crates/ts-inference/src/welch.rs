use statrs::distribution::{ContinuousCDF, StudentsT};
use ts_core::{CohortSummary, Error, Result};

/// Result of Welch's unequal-variance t-test.
#[derive(Debug, Clone, PartialEq)]
pub struct WelchTest {
    /// t statistic, `(mean_a - mean_b) / se`.
    pub t: f64,
    /// Welch–Satterthwaite degrees of freedom.
    pub df: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Summary of the first sample.
    pub a: CohortSummary,
    /// Summary of the second sample.
    pub b: CohortSummary,
}

/// Mean and unbiased standard deviation. `sd` is NaN for fewer than two values.
pub(crate) fn summarize(x: &[f64]) -> CohortSummary {
    let n = x.len();
    if n == 0 {
        return CohortSummary { n, mean: f64::NAN, sd: f64::NAN };
    }
    let mean = x.iter().sum::<f64>() / n as f64;
    let sd = if n > 1 {
        let ss: f64 = x.iter().map(|v| (v - mean) * (v - mean)).sum();
        (ss / (n - 1) as f64).sqrt()
    } else {
        f64::NAN
    };
    CohortSummary { n, mean, sd }
}

/// Two-sided Welch t-test of `a` against `b`.
///
/// Inputs must already have missing values removed. Each sample needs at
/// least two observations. When both samples have zero variance the
/// standard error vanishes: p is 1 for equal means and 0 otherwise.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Result<WelchTest> {
    if a.len() < 2 || b.len() < 2 {
        return Err(Error::Validation(format!(
            "each cohort needs at least 2 non-missing values (got {} and {})",
            a.len(),
            b.len()
        )));
    }
    let sa = summarize(a);
    let sb = summarize(b);

    let va = sa.sd * sa.sd / sa.n as f64;
    let vb = sb.sd * sb.sd / sb.n as f64;
    let se = (va + vb).sqrt();
    let diff = sa.mean - sb.mean;

    if se == 0.0 {
        let df = (sa.n + sb.n - 2) as f64;
        let (t, p_value) = if diff == 0.0 {
            (0.0, 1.0)
        } else {
            (diff.signum() * f64::INFINITY, 0.0)
        };
        return Ok(WelchTest { t, df, p_value, a: sa, b: sb });
    }

    let df = (va + vb).powi(2)
        / (va * va / (sa.n - 1) as f64 + vb * vb / (sb.n - 1) as f64);
    let t = diff / se;
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| Error::Validation(format!("invalid t distribution (df={df}): {e}")))?;
    let p_value = (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0);

    Ok(WelchTest { t, df, p_value, a: sa, b: sb })
}
