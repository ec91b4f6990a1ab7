use std::collections::HashMap;

/// Day-over-day heat change, in percent with one decimal place.
///
/// A name missing from the prior-day table is a fresh appearance and reports
/// 100% growth; so does a prior heat of zero (division guard). Both are
/// deliberate simplifications rather than mathematically exact values.
pub fn heat_change_pct(name: &str, current_heat: f64, prior_day: &HashMap<String, f64>) -> f64 {
    match prior_day.get(name) {
        None => 100.0,
        Some(&prior) if prior == 0.0 => 100.0,
        Some(&prior) => (((current_heat - prior) / prior) * 1000.0).round() / 10.0,
    }
}
