//! Property tests for the bootstrap percentile interval.

use eventlab_runner::{block_bootstrap_sharpe, percentile, BootstrapConfig};
use proptest::prelude::*;

proptest! {
    #[test]
    fn percentile_stays_within_range_and_is_monotone(
        mut values in prop::collection::vec(-1e3f64..1e3, 1..200),
        q1 in 0.0f64..100.0,
        q2 in 0.0f64..100.0,
    ) {
        values.sort_by(f64::total_cmp);
        let (lo_q, hi_q) = if q1 <= q2 { (q1, q2) } else { (q2, q1) };
        let lo = percentile(&values, lo_q);
        let hi = percentile(&values, hi_q);
        prop_assert!(lo >= values[0] - 1e-9 && hi <= values[values.len() - 1] + 1e-9);
        prop_assert!(lo <= hi + 1e-9);
    }

    #[test]
    fn interval_is_ordered_and_seed_stable(
        returns in prop::collection::vec(-0.05f64..0.05, 2..120),
        block_size in 1usize..30,
        seed in any::<u64>(),
    ) {
        let cfg = BootstrapConfig { n_samples: 40, block_size, seed };
        let a = block_bootstrap_sharpe(&returns, &cfg);
        let b = block_bootstrap_sharpe(&returns, &cfg);
        prop_assert_eq!(a, b);
        prop_assert!(a.lo <= a.hi);
    }
}
