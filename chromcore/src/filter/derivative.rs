/// First, second and third discrete derivative of a trace, index aligned.
#[derive(Clone, Debug)]
pub struct Derivatives {
    pub first: Vec<f64>,
    pub second: Vec<f64>,
    pub third: Vec<f64>,
}

/// Forward difference `d[i] = x[i+1] - x[i]`. The last slot repeats the
/// final difference so the output keeps the length of the input.
pub fn forward_difference(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mut d: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    d.push(d[n - 2]);
    d
}

/// Apply the difference filter once, then twice more to its own output.
pub fn derivatives(values: &[f64]) -> Derivatives {
    let first = forward_difference(values);
    let second = forward_difference(&first);
    let third = forward_difference(&second);
    Derivatives { first, second, third }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_difference() {
        let d = forward_difference(&[1.0, 4.0, 9.0, 16.0]);
        assert_eq!(d, vec![3.0, 5.0, 7.0, 7.0]);
    }

    #[test]
    fn test_derivatives_of_cubic() {
        // x^3 has a constant third forward difference of 6 away from the tail
        let x: Vec<f64> = (0..8).map(|i| (i as f64).powi(3)).collect();
        let d = derivatives(&x);
        assert_eq!(d.first.len(), x.len());
        assert_eq!(d.third.len(), x.len());
        for i in 0..4 {
            assert!((d.third[i] - 6.0).abs() < 1e-12);
        }
        assert!((d.second[0] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input() {
        assert!(forward_difference(&[]).is_empty());
        let d = derivatives(&[5.0]);
        assert_eq!(d.first, vec![0.0]);
    }
}
