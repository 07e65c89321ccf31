//! Compare-exchange, the only computation a comparator performs

/// One unsorted input value
pub type Element = u8;

/// Ascending compare-exchange: the smaller value ends in the low slot.
///
/// Used by every comparator and by the root's own first-layer step.
#[inline]
pub fn compare_exchange(pair: [Element; 2]) -> [Element; 2] {
    let [low, high] = pair;
    if low > high {
        [high, low]
    } else {
        [low, high]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_swaps_descending_pair() {
        assert_eq!(compare_exchange([9, 3]), [3, 9]);
    }

    #[test]
    fn test_keeps_ascending_and_equal_pairs() {
        assert_eq!(compare_exchange([3, 9]), [3, 9]);
        assert_eq!(compare_exchange([4, 4]), [4, 4]);
    }

    proptest! {
        #[test]
        fn prop_low_never_exceeds_high(a: u8, b: u8) {
            let [low, high] = compare_exchange([a, b]);
            prop_assert!(low <= high);
            prop_assert_eq!(low.min(high), a.min(b));
            prop_assert_eq!(low.max(high), a.max(b));
        }
    }
}
