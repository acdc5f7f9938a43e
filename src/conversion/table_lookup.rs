use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]` mapped to a physical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub value: f64,
}

/// Table lookup over `(key, value)` pairs sorted by key: either interpolated
/// or nearest neighbour. Values outside the table clamp to the first/last entry.
pub(super) fn lookup_table(table: &[(f64, f64)], raw: f64, interpolate: bool) -> Option<f64> {
    let (first, last) = (table.first()?, table.last()?);
    if raw.is_nan() {
        return None;
    }
    if raw <= first.0 {
        return Some(first.1);
    }
    if raw >= last.0 {
        return Some(last.1);
    }
    table.windows(2).find_map(|w| {
        let ((k0, v0), (k1, v1)) = (w[0], w[1]);
        if raw < k0 || raw > k1 {
            return None;
        }
        Some(if interpolate {
            v0 + (raw - k0) / (k1 - k0) * (v1 - v0)
        } else if k1 - raw < raw - k0 {
            v1
        } else {
            v0
        })
    })
}

pub(super) fn lookup_range(ranges: &[ValueRange], raw: f64) -> Option<f64> {
    ranges
        .iter()
        .find(|r| raw >= r.min && raw <= r.max)
        .map(|r| r.value)
}
