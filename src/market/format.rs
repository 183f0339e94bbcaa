//! Human-readable number formatting for quote fields.

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `1_234_567` → `"1.23M"`.
pub fn format_volume(volume: u64) -> String {
    let v = volume as f64;
    if v >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if v >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else if v >= 1e3 {
        format!("{:.2}K", v / 1e3)
    } else {
        volume.to_string()
    }
}

/// `19_800_000_000_000` → `"19.8T"`.
pub fn format_market_cap(cap: u64) -> String {
    let c = cap as f64;
    if c >= 1e12 {
        format!("{:.1}T", c / 1e12)
    } else if c >= 1e9 {
        format!("{:.1}B", c / 1e9)
    } else if c >= 1e6 {
        format!("{:.1}M", c / 1e6)
    } else {
        cap.to_string()
    }
}
