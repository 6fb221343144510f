//! Moving-block bootstrap confidence interval for the Sharpe ratio.
//!
//! Fixed-length blocks of consecutive daily returns are drawn with replacement
//! and concatenated until the resample matches the original length. Blocks keep
//! short-range serial dependence that an i.i.d. bootstrap would destroy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use eventlab_core::metrics::sharpe_ratio;

use crate::config::BootstrapConfig;

/// Lower and upper bounds of the 95% percentile interval.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SharpeInterval {
    pub lo: f64,
    pub hi: f64,
}

/// Percentile interval of resampled annualized Sharpe ratios.
///
/// Fewer than two returns, or zero resamples, yields `(0, 0)`.
pub fn block_bootstrap_sharpe(returns: &[f64], cfg: &BootstrapConfig) -> SharpeInterval {
    let n = returns.len();
    if n < 2 || cfg.n_samples == 0 {
        return SharpeInterval::default();
    }

    let block = cfg.block_size.max(1);
    let n_blocks = n.div_ceil(block).max(1);
    let start_range = (n + 1).saturating_sub(block).max(1);
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    let mut sharpes = Vec::with_capacity(cfg.n_samples);
    let mut sample = Vec::with_capacity(n_blocks * block);
    for _ in 0..cfg.n_samples {
        sample.clear();
        for _ in 0..n_blocks {
            let s = rng.gen_range(0..start_range);
            sample.extend_from_slice(&returns[s..(s + block).min(n)]);
        }
        sample.truncate(n);
        sharpes.push(sharpe_ratio(&sample));
    }

    sharpes.sort_by(f64::total_cmp);
    SharpeInterval {
        lo: percentile(&sharpes, 2.5),
        hi: percentile(&sharpes, 97.5),
    }
}

/// `q`-th percentile (0..=100) of ascending `sorted`, linearly interpolated
/// between the two nearest ranks. NaN for an empty slice.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        len => {
            let rank = (q / 100.0).clamp(0.0, 1.0) * (len - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let frac = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(n_samples: usize, block_size: usize, seed: u64) -> BootstrapConfig {
        BootstrapConfig {
            n_samples,
            block_size,
            seed,
        }
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 100.0), 4.0);
        assert!((percentile(&v, 50.0) - 2.5).abs() < 1e-12);
        assert!((percentile(&v, 2.5) - 1.075).abs() < 1e-12);
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn too_few_returns_is_zero_interval() {
        let ci = block_bootstrap_sharpe(&[0.01], &BootstrapConfig::default());
        assert_eq!(ci, SharpeInterval { lo: 0.0, hi: 0.0 });
        let ci = block_bootstrap_sharpe(&[0.01, 0.02], &cfg(0, 10, 0));
        assert_eq!(ci, SharpeInterval::default());
    }

    #[test]
    fn same_seed_same_interval() {
        let returns: Vec<f64> = (0..120).map(|i| ((i * 37 % 11) as f64 - 5.0) / 1_000.0).collect();
        let a = block_bootstrap_sharpe(&returns, &cfg(200, 10, 7));
        let b = block_bootstrap_sharpe(&returns, &cfg(200, 10, 7));
        assert_eq!(a, b);
        assert!(a.lo <= a.hi);
    }

    #[test]
    fn strictly_positive_returns_give_positive_interval() {
        let returns: Vec<f64> = (0..60).map(|i| 0.001 + (i % 5) as f64 * 0.0005).collect();
        let ci = block_bootstrap_sharpe(&returns, &cfg(100, 10, 1));
        assert!(ci.lo > 0.0);
        assert!(ci.hi >= ci.lo);
    }

    #[test]
    fn block_longer_than_series_still_resamples() {
        let returns = [0.01, -0.02, 0.015, 0.0];
        let ci = block_bootstrap_sharpe(&returns, &cfg(50, 10, 3));
        // A single block start at 0 reproduces the series every time.
        let expected = sharpe_ratio(&returns);
        assert!((ci.lo - expected).abs() < 1e-12);
        assert!((ci.hi - expected).abs() < 1e-12);
    }
}
