pub fn div_or_zero(lhs: f32, rhs: f32) -> f32 {
    if rhs == 0.0 {
        0.0
    } else {
        lhs / rhs
    }
}

pub fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f32>() / values.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_div_or_zero() {
        assert_eq!(div_or_zero(3.0, 0.0), 0.0);
        assert_approx_eq!(div_or_zero(3.0, 2.0), 1.5);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_approx_eq!(mean(&[1.0, 2.0, 6.0]).unwrap(), 3.0);
    }
}
