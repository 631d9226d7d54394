/// Iterator over `init, init * factor, init * factor^2, ...`.
///
/// Ends instead of overflowing.
pub struct MultStep {
    factor: usize,
    next: Option<usize>,
}

impl Iterator for MultStep {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.next?;
        self.next = next.checked_mul(self.factor);
        Some(next)
    }
}

// Returns an iterator that generates numbers by multiplying by the given
// factor.
pub fn mult_step(init: usize, factor: usize) -> MultStep {
    MultStep {
        factor,
        next: Some(init),
    }
}

/// Iterator over `init, init / denom, init / denom^2, ...` that ends once the
/// value reaches zero.
pub struct DivStep {
    denom: usize,
    next: usize,
}

impl Iterator for DivStep {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == 0 {
            return None;
        }
        let next = self.next;
        self.next /= self.denom;
        Some(next)
    }
}

// Returns an iterator that generates numbers by dividing by the given
// denominator. The denominator must be at least 2.
pub fn div_step(init: usize, denom: usize) -> DivStep {
    debug_assert!(denom > 1);
    DivStep { denom, next: init }
}

#[cfg(test)]
mod tests {
    use super::{div_step, mult_step};

    #[test]
    fn mult_step_doubles() {
        let actual: Vec<usize> = mult_step(1, 2).take_while(|&s| s < 20).collect();
        let expected = vec![1, 2, 4, 8, 16];
        assert_eq!(actual, expected);
    }

    #[test]
    fn mult_step_stops_before_overflow() {
        let last = mult_step(1, 2).last();
        assert_eq!(last, Some(1 << (usize::BITS - 1)));
    }

    #[test]
    fn div_step_ends_at_zero() {
        let actual: Vec<usize> = div_step(17, 8).collect();
        let expected = vec![17, 2];
        assert_eq!(actual, expected);
        assert_eq!(div_step(0, 8).count(), 0);
    }
}
