//! Score aggregation
//!
//! Folds per-task analytics records into a page's `{score, progress, stars}`
//! summary and derives the coarse achievement tier used by compact displays.
//!
//! # Star tiers
//!
//! | score / scoreMax | stars |
//! |------------------|-------|
//! | < 1%             | 0     |
//! | < 34%            | 1     |
//! | < 67%            | 2     |
//! | otherwise        | 3     |
//!
//! # Achievement tiers
//!
//! Pages without a maximum score report `visited ? 1 : 0` out of 1. Scored
//! pages report 0 at 0%, 1 up to 34%, 2 up to 67% and 3 above, out of 3.

use crate::models::{PageScores, TaskProgress};

pub const STARS_MAX: u8 = 3;

/// Coarse 0-3 display tier, independent of stars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub tier: u8,
    pub max: u8,
}

pub struct ScoreAggregator;

impl ScoreAggregator {
    /// Fold task records into `scores`
    ///
    /// `task_count` is the number of tasks the page declares; progress is
    /// averaged over it and converted from percent to a `[0, 1]` ratio.
    pub fn fold<'a, I>(scores: &mut PageScores, task_count: u32, records: I)
    where
        I: IntoIterator<Item = &'a TaskProgress>,
    {
        let mut score = 0.0;
        let mut progress = 0.0;
        let mut seen = 0usize;
        for record in records {
            score += record.score;
            progress += record.progress;
            seen += 1;
        }

        scores.score = score;
        scores.progress = if task_count > 0 {
            (progress / f64::from(task_count) / 100.0).clamp(0.0, 1.0)
        } else {
            0.0
        };
        scores.visited = seen > 0;
        scores.stars = Self::star_tier(scores.score, scores.score_max);
        scores.stars_max = STARS_MAX;
    }

    fn percent(score: f64, score_max: f64) -> f64 {
        if score_max == 0.0 {
            0.0
        } else {
            score / score_max
        }
    }

    pub fn star_tier(score: f64, score_max: f64) -> u8 {
        let percent = Self::percent(score, score_max);
        if percent < 0.01 {
            0
        } else if percent < 0.34 {
            1
        } else if percent < 0.67 {
            2
        } else {
            3
        }
    }

    pub fn achievement(scores: &PageScores) -> Achievement {
        if scores.score_max == 0.0 {
            return Achievement {
                tier: u8::from(scores.visited),
                max: 1,
            };
        }

        let percent = Self::percent(scores.score, scores.score_max);
        let tier = if percent <= 0.0 {
            0
        } else if percent <= 0.34 {
            1
        } else if percent <= 0.67 {
            2
        } else {
            3
        };
        Achievement { tier, max: 3 }
    }
}
