//! Binary-suffix quantity formatting for host capacity fields.

const UNITS: [&str; 4] = ["Ki", "Mi", "Gi", "Ti"];

/// Format a Ki-denominated quantity with a binary suffix and two decimals.
///
/// Accepts values like `"2097152"` or `"16384Ki"` (the leading numeric part
/// is used). Non-numeric input is returned unchanged.
pub fn format_memory(quantity: &str) -> String {
    let trimmed = quantity.trim();
    let sign_len = if trimmed.starts_with('-') || trimmed.starts_with('+') {
        1
    } else {
        0
    };
    let numeric_len = sign_len
        + trimmed[sign_len..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .count();

    let mut value: f64 = match trimmed[..numeric_len].parse() {
        Ok(v) => v,
        Err(_) => return quantity.to_string(),
    };

    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_memory_scales_units() {
        assert_eq!(format_memory("512"), "512.00 Ki");
        assert_eq!(format_memory("16384"), "16.00 Mi");
        assert_eq!(format_memory("2097152"), "2.00 Gi");
        assert_eq!(format_memory("3298534883"), "3.07 Ti");
    }

    #[test]
    fn test_format_memory_strips_suffix() {
        assert_eq!(format_memory("16384Ki"), "16.00 Mi");
        assert_eq!(format_memory("1536.0Ki"), "1.50 Mi");
    }

    #[test]
    fn test_format_memory_non_numeric_passthrough() {
        assert_eq!(format_memory("unknown"), "unknown");
        assert_eq!(format_memory(""), "");
    }
}
