//! Ballot Model
//!
//! One scored evaluation of one candidate by one voter. Unique per
//! (room, voter, candidate); re-submission overwrites.

use serde::{Deserialize, Serialize};

/// The five LR evaluation criteria.
///
/// Each score is in [0, 5] on half-point steps. `half_point_sum` converts a
/// ballot to exact integer arithmetic (score * 2 per criterion) so that
/// aggregate comparison and tie detection never depend on float rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BallotScores {
    pub technical_score: f64,
    pub experience_score: f64,
    pub availability_score: f64,
    pub communication_score: f64,
    pub leadership_score: f64,
}

impl BallotScores {
    pub const MIN_SCORE: f64 = 0.0;
    pub const MAX_SCORE: f64 = 5.0;
    pub const CRITERIA: usize = 5;

    pub fn values(&self) -> [f64; Self::CRITERIA] {
        [
            self.technical_score,
            self.experience_score,
            self.availability_score,
            self.communication_score,
            self.leadership_score,
        ]
    }

    /// Sum of the five criteria in half-point units.
    ///
    /// Returns `None` when any score is out of range or not on a half-point
    /// step; callers treat that as a validation failure.
    pub fn half_point_sum(&self) -> Option<i64> {
        let mut sum = 0i64;
        for value in self.values() {
            sum += half_points(value)?;
        }
        Some(sum)
    }

    /// Mean of the five criteria (the ballot's contribution to a candidate's
    /// total score).
    pub fn mean(&self) -> f64 {
        self.values().iter().sum::<f64>() / Self::CRITERIA as f64
    }
}

fn half_points(value: f64) -> Option<i64> {
    if !(BallotScores::MIN_SCORE..=BallotScores::MAX_SCORE).contains(&value) {
        return None;
    }
    let doubled = value * 2.0;
    let rounded = doubled.round();
    if (doubled - rounded).abs() > 1e-9 {
        return None;
    }
    Some(rounded as i64)
}

/// Ballot entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Ballot {
    pub room_id: i64,
    pub voter_id: i64,
    pub candidate_id: i64,
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub scores: BallotScores,
    pub updated_at: i64,
}

/// Aggregated standing for one candidate (derived, never stored)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub candidate_id: i64,
    /// Mean of per-ballot means, rounded to two decimals for presentation
    pub total_score: f64,
    /// Number of distinct voters who have ballotted for this candidate
    pub vote_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(v: f64) -> BallotScores {
        BallotScores {
            technical_score: v,
            experience_score: v,
            availability_score: v,
            communication_score: v,
            leadership_score: v,
        }
    }

    #[test]
    fn test_half_point_sum_accepts_half_steps() {
        assert_eq!(scores(4.5).half_point_sum(), Some(45));
        assert_eq!(scores(0.0).half_point_sum(), Some(0));
        assert_eq!(scores(5.0).half_point_sum(), Some(50));
    }

    #[test]
    fn test_half_point_sum_rejects_out_of_range() {
        assert_eq!(scores(5.5).half_point_sum(), None);
        assert_eq!(scores(-0.5).half_point_sum(), None);
    }

    #[test]
    fn test_half_point_sum_rejects_off_grid_values() {
        assert_eq!(scores(4.2).half_point_sum(), None);
        assert_eq!(scores(3.99).half_point_sum(), None);
    }

    #[test]
    fn test_mean_matches_half_point_sum() {
        let s = BallotScores {
            technical_score: 4.0,
            experience_score: 3.5,
            availability_score: 5.0,
            communication_score: 2.0,
            leadership_score: 4.5,
        };
        let sum = s.half_point_sum().unwrap();
        // mean == (sum of half points) / (2 * criteria)
        assert!((s.mean() - sum as f64 / 10.0).abs() < 1e-12);
    }
}
