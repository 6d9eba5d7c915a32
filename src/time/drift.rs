/// Least-squares slope of offset against time, in parts per million.
///
/// Both axes share the timestamp unit, so the slope is dimensionless.
pub fn linreg_slope_ppm(samples: &[(f64, f64)]) -> f64 {
    if samples.len() < 3 {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mt = samples.iter().map(|(t, _)| *t).sum::<f64>() / n;
    let mo = samples.iter().map(|(_, o)| *o).sum::<f64>() / n;
    let (mut num, mut den) = (0.0, 0.0);
    for (t, o) in samples {
        let dt = t - mt;
        num += dt * (o - mo);
        den += dt * dt;
    }
    let slope = if den > 0.0 { num / den } else { 0.0 };
    slope * 1.0e6
}
