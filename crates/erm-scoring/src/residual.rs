//! Residual risk

/// `inherent × (1 − effectiveness)`, effectiveness clamped to 0..=1
pub fn residual_risk(inherent: f64, effectiveness: f64) -> f64 {
    inherent * (1.0 - effectiveness.clamp(0.0, 1.0))
}

/// Residual of a risk mitigated by several controls: the lowest residual,
/// i.e. the most effective control wins. `None` without controls.
pub fn combine_residual<I>(inherent: f64, effectivenesses: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    effectivenesses
        .into_iter()
        .map(|e| residual_risk(inherent, e))
        .reduce(f64::min)
}
