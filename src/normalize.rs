use regex::Regex;
use std::sync::LazyLock;

use crate::models::RawHeat;

static NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9.]").unwrap());

/// Normalize a raw heat value onto a single numeric scale.
///
/// Numbers pass through. Strings are stripped of everything but digits and
/// the decimal point, then scaled by unit suffix: `万`/`w` means ×10,000 and
/// `亿` means ×100,000,000. Anything that still fails to parse is zero heat,
/// never an error.
pub fn normalize_heat(raw: &RawHeat) -> f64 {
    let text = match raw {
        RawHeat::Number(n) => return *n,
        RawHeat::Text(s) => s,
    };

    let num_str = NON_NUMERIC.replace_all(text, "");
    let Ok(value) = num_str.parse::<f64>() else {
        return 0.0;
    };
    if !value.is_finite() {
        return 0.0;
    }

    if text.contains('万') || text.to_lowercase().contains('w') {
        value * 10_000.0
    } else if text.contains('亿') {
        value * 100_000_000.0
    } else {
        value
    }
}
