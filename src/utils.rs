/// Utility helpers for vidchrome

/// Clamp `value` into `[min, max]`. NaN collapses to `min` so a corrupt
/// number can never leak into media state.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// Parse a boolean-ish attribute or stored value.
/// Accepts `true/1/yes/y` and `false/0/no/n` in any case; anything else,
/// including an empty string, yields `fallback`.
pub fn parse_bool(raw: Option<&str>, fallback: bool) -> bool {
    let Some(raw) = raw else {
        return fallback;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        _ => fallback,
    }
}

/// Parse a finite number, falling back on absence, emptiness or garbage.
pub fn parse_number(raw: Option<&str>, fallback: f64) -> f64 {
    let Some(raw) = raw else {
        return fallback;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return fallback;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => fallback,
    }
}

/// Accept `#rgb` or `#rrggbb` (surrounding whitespace ignored).
pub fn parse_hex_color(raw: Option<&str>, fallback: &str) -> String {
    let Some(raw) = raw else {
        return fallback.to_string();
    };
    let s = raw.trim();
    let Some(digits) = s.strip_prefix('#') else {
        return fallback.to_string();
    };
    let valid_len = digits.len() == 3 || digits.len() == 6;
    if valid_len && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        s.to_string()
    } else {
        fallback.to_string()
    }
}

/// Format seconds as `m:ss`, or `h:mm:ss` past the hour.
/// Negative or non-finite input renders as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Render a number the way a chip or a stored value shows it: integers
/// without a fractional part, everything else in shortest form.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Create a simple slug from a string suitable for class names.
/// Lowercases the string, converts groups of non-alphanumeric chars to single hyphens,
/// and trims leading/trailing hyphens.
pub fn slugify<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref().to_lowercase();
    let mut out = String::with_capacity(s.len());
    let mut prev_dash = false;

    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            prev_dash = false;
        } else if !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }

    out.trim_matches('-').to_string()
}
