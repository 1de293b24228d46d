use kalshi_signal::indicator::student_t::{t_cdf, t_quantile, two_sided_critical};
use kalshi_signal::strategy::ConfidenceGate;

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

#[test]
/// Verifies quantiles against standard t-table values.
fn quantiles_match_table() {
    assert!(close(t_quantile(0.975, 1.0).unwrap(), 12.7062, 1e-3));
    assert!(close(t_quantile(0.975, 2.0).unwrap(), 4.3027, 1e-3));
    assert!(close(t_quantile(0.975, 10.0).unwrap(), 2.2281, 1e-3));
    assert!(close(t_quantile(0.95, 5.0).unwrap(), 2.0150, 1e-3));
    assert!(close(two_sided_critical(0.99, 3.0).unwrap(), 5.8409, 1e-3));
}

#[test]
/// Verifies the quantile inverts the CDF and is antisymmetric.
fn quantile_inverts_cdf() {
    let t = t_quantile(0.9, 7.0).unwrap();
    assert!(close(t_cdf(t, 7.0), 0.9, 1e-9));
    let neg = t_quantile(0.1, 7.0).unwrap();
    assert!(close(neg, -t, 1e-9));
    assert_eq!(t_quantile(0.5, 4.0), Some(0.0));
}

#[test]
/// Verifies invalid inputs produce no value instead of a bogus number.
fn invalid_inputs_are_none() {
    assert_eq!(t_quantile(0.0, 5.0), None);
    assert_eq!(t_quantile(1.0, 5.0), None);
    assert_eq!(t_quantile(0.9, 0.0), None);
    assert_eq!(two_sided_critical(1.0, 5.0), None);
}

#[test]
/// Verifies the 95% interval for [10, 11, 12] uses the standard error and df = 2.
fn symmetric_interval_for_three_samples() {
    let gate = ConfidenceGate::default();
    let ci = gate.interval(&[10.0, 11.0, 12.0]).unwrap();
    assert_eq!(ci.df, 2);
    assert!(close(ci.mean, 11.0, 1e-12));
    assert!(close(ci.std_dev, 1.0, 1e-12));
    assert!(close(ci.lower, 8.516, 1e-3));
    assert!(close(ci.upper, 13.484, 1e-3));
    assert!(gate.admits(&[10.0, 11.0, 12.0], 11.5));
    assert!(!gate.admits(&[10.0, 11.0, 12.0], 1000.0));
}

#[test]
/// Verifies the asymmetric preset is wider above the mean than below it.
fn asymmetric_interval_is_wider_above() {
    let gate = ConfidenceGate::asymmetric_default();
    let ci = gate.interval(&[10.0, 11.0, 12.0, 13.0]).unwrap();
    assert!(ci.upper - ci.mean > ci.mean - ci.lower);
    assert!(close(ci.margin_of_error(), ci.upper - ci.mean, 1e-12));
}

#[test]
/// Verifies a single sample yields no interval.
fn single_sample_has_no_interval() {
    assert!(ConfidenceGate::default().interval(&[5.0]).is_none());
    assert!(!ConfidenceGate::default().admits(&[5.0], 5.0));
}
