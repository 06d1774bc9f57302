use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::screening::{ScreeningDecision, Zone};

/// Reproducible validation sample for human review.
///
/// Human-review records come first. The rest of `size` is split between
/// auto-include (half, rounded down) and auto-exclude, which also absorbs any
/// auto-include shortfall. With no human-review records at all, each zone
/// gets a share proportional to its size. Error-zone records are never
/// sampled. The same `seed` always picks the same records.
pub fn stratified_sample(decisions: &[ScreeningDecision], size: usize, seed: u64) -> Vec<ScreeningDecision> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let in_zone = |zone: Zone| decisions.iter().filter(move |d| d.zone == zone).collect::<Vec<_>>();

    let review = in_zone(Zone::HumanReview);
    let include = in_zone(Zone::AutoInclude);
    let exclude = in_zone(Zone::AutoExclude);

    let mut sample: Vec<ScreeningDecision> = Vec::with_capacity(size);

    if review.is_empty() {
        let eligible = include.len() + exclude.len();
        if eligible == 0 {
            return sample;
        }
        for pool in [&include, &exclude] {
            let share = (size * pool.len() / eligible).min(pool.len());
            sample.extend(pool.choose_multiple(&mut rng, share).map(|d| (*d).clone()));
        }
    } else {
        let from_review = size.min(review.len());
        sample.extend(review.choose_multiple(&mut rng, from_review).map(|d| (*d).clone()));

        let remaining = size - from_review;
        let n_include = (remaining / 2).min(include.len());
        let n_exclude = (remaining - n_include).min(exclude.len());
        sample.extend(include.choose_multiple(&mut rng, n_include).map(|d| (*d).clone()));
        sample.extend(exclude.choose_multiple(&mut rng, n_exclude).map(|d| (*d).clone()));
    }

    debug!(requested = size, sampled = sample.len(), seed, "Drew validation sample");
    sample
}
