/// Mixed-radix counter over digit vectors.
///
/// Digit 0 is the most significant, so counting increments the last digit
/// first and carries towards the front. After the largest value the
/// counter wraps back to all zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Odometer {
    radix: Vec<usize>,
}

impl From<Vec<usize>> for Odometer {
    fn from(radix: Vec<usize>) -> Self {
        assert!(radix.iter().all(|r| *r > 0), "every digit needs a positive radix");
        Self { radix }
    }
}

impl Odometer {
    pub fn uniform(radix: usize, digits: usize) -> Self {
        Self::from(vec![radix; digits])
    }

    pub fn radix(&self) -> &[usize] {
        &self.radix
    }
    pub fn digits(&self) -> usize {
        self.radix.len()
    }

    /// the successor of `digits`, and whether counting wrapped to zero
    pub fn next(&self, digits: &[usize]) -> (Vec<usize>, bool) {
        let mut next = digits.to_vec();
        let wrapped = self.advance(&mut next);
        (next, wrapped)
    }

    /// in-place successor. returns true when every digit rolled over.
    pub fn advance(&self, digits: &mut [usize]) -> bool {
        assert!(digits.len() == self.radix.len(), "digit count mismatch");
        for (digit, radix) in digits.iter_mut().zip(self.radix.iter()).rev() {
            *digit = (*digit + 1) % radix;
            if *digit != 0 {
                return false;
            }
        }
        true
    }

    /// number of distinct values, `None` when it does not fit in a u128
    pub fn size(&self) -> Option<u128> {
        self.radix
            .iter()
            .try_fold(1u128, |size, r| size.checked_mul(*r as u128))
    }

    /// position of `digits` in counting order
    pub fn rank(&self, digits: &[usize]) -> Option<u128> {
        assert!(digits.len() == self.radix.len(), "digit count mismatch");
        digits
            .iter()
            .zip(self.radix.iter())
            .try_fold(0u128, |rank, (d, r)| {
                assert!(d < r, "digit {} out of range {}", d, r);
                rank.checked_mul(*r as u128)?.checked_add(*d as u128)
            })
    }

    /// the digits at position `rank` in counting order
    pub fn unrank(&self, mut rank: u128) -> Vec<usize> {
        let mut digits = vec![0; self.radix.len()];
        for (digit, radix) in digits.iter_mut().zip(self.radix.iter()).rev() {
            *digit = (rank % *radix as u128) as usize;
            rank /= *radix as u128;
        }
        assert!(rank == 0, "rank beyond the odometer range");
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_through_every_value_once() {
        let odometer = Odometer::from(vec![2, 3, 2]);
        let mut digits = vec![0; 3];
        let mut seen = std::collections::BTreeSet::new();
        loop {
            assert!(seen.insert(digits.clone()));
            if odometer.advance(&mut digits) {
                break;
            }
        }
        assert!(seen.len() == 12);
        assert!(odometer.size() == Some(12));
        assert!(digits == vec![0, 0, 0]);
    }

    #[test]
    fn last_digit_is_least_significant() {
        let odometer = Odometer::uniform(3, 2);
        assert!(odometer.next(&[0, 2]) == (vec![1, 0], false));
        assert!(odometer.next(&[2, 2]) == (vec![0, 0], true));
    }

    #[test]
    fn rank_follows_counting_order() {
        let odometer = Odometer::from(vec![3, 1, 4]);
        let mut digits = vec![0; 3];
        for rank in 0..12u128 {
            assert!(odometer.rank(&digits) == Some(rank));
            assert!(odometer.unrank(rank) == digits);
            odometer.advance(&mut digits);
        }
    }

    #[test]
    fn size_overflow() {
        assert!(Odometer::uniform(usize::MAX, 3).size().is_none());
    }
}
