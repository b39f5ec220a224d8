//! Number formatting shared by cards, labels and tooltips.

/// Shortest display form: integral values without a fraction, others as-is.
pub fn plain(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

pub fn fixed(n: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, n);
    // "-0.00" reads as noise on a dashboard
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}

pub fn integer(n: f64) -> String {
    fixed(n.round(), 0)
}

pub fn percent(n: f64, decimals: usize) -> String {
    format!("{}%", fixed(n, decimals))
}

/// Coordinates in SVG output: two decimals, trailing zeros dropped.
pub fn coord(n: f64) -> String {
    let s = format!("{:.2}", n);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_drops_integral_fraction() {
        assert_eq!(plain(40.0), "40");
        assert_eq!(plain(75.25), "75.25");
        assert_eq!(plain(-3.0), "-3");
    }

    #[test]
    fn fixed_precision() {
        assert_eq!(fixed(7.456, 2), "7.46");
        assert_eq!(fixed(-0.001, 2), "0.00");
        assert_eq!(integer(12.6), "13");
        assert_eq!(percent(60.0, 0), "60%");
    }

    #[test]
    fn coords_are_compact() {
        assert_eq!(coord(60.0), "60");
        assert_eq!(coord(12.345), "12.35");
        assert_eq!(coord(-0.001), "0");
        assert_eq!(coord(1.5), "1.5");
    }
}
