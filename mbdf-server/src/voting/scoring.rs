//! Score aggregation and completion logic
//!
//! Pure functions over in-memory snapshots of a room's members, candidates
//! and ballots. All persistence and triggering lives in [`super::engine`].
//!
//! A candidate's total score is the mean of per-ballot means. Tallies are
//! kept in half-point integer units (criterion score * 2) and compared by
//! cross-multiplication, so two candidates are tied exactly when their score
//! fractions are equal — float rounding can neither create nor mask a tie.

use std::cmp::Ordering;

use shared::models::{Ballot, Candidate, CandidateResult, Membership, RoomRole};

/// Aggregated ballot data for one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTally {
    pub candidate_id: i64,
    /// Sum over ballots of the five criterion scores, in half-point units
    pub sum_half_points: i64,
    /// Number of distinct voters who have ballotted for this candidate
    pub vote_count: i64,
    /// Nomination time, the stable secondary presentation key
    pub created_at: i64,
}

impl CandidateTally {
    /// Mean of per-ballot means; 0.0 when no ballots have been cast
    pub fn total_score(&self) -> f64 {
        if self.vote_count == 0 {
            return 0.0;
        }
        // Each ballot contributes sum/10 (5 criteria in half-point units).
        self.sum_half_points as f64 / (10.0 * self.vote_count as f64)
    }

    /// Score as an exact fraction (numerator, denominator)
    fn score_fraction(&self) -> (i64, i64) {
        if self.vote_count == 0 {
            (0, 1)
        } else {
            (self.sum_half_points, 10 * self.vote_count)
        }
    }

    /// Exact score comparison, immune to float rounding
    pub fn cmp_score(&self, other: &Self) -> Ordering {
        let (a_num, a_den) = self.score_fraction();
        let (b_num, b_den) = other.score_fraction();
        (a_num as i128 * b_den as i128).cmp(&(b_num as i128 * a_den as i128))
    }
}

/// Fold ballots into per-candidate tallies.
///
/// Output is sorted by score descending; exact ties keep nomination order
/// (created_at, then id) so presentation is deterministic. Ballots that
/// reference no current candidate are ignored (cannot happen through the
/// engine, which validates candidate existence before writing).
pub fn tally_ballots(candidates: &[Candidate], ballots: &[Ballot]) -> Vec<CandidateTally> {
    let mut tallies: Vec<CandidateTally> = candidates
        .iter()
        .map(|c| CandidateTally {
            candidate_id: c.id,
            sum_half_points: 0,
            vote_count: 0,
            created_at: c.created_at,
        })
        .collect();

    for ballot in ballots {
        let Some(tally) = tallies
            .iter_mut()
            .find(|t| t.candidate_id == ballot.candidate_id)
        else {
            continue;
        };
        let Some(sum) = ballot.scores.half_point_sum() else {
            continue;
        };
        tally.sum_half_points += sum;
        tally.vote_count += 1;
    }

    tallies.sort_by(|a, b| {
        b.cmp_score(a)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
    tallies
}

/// Presentation form of the tallies, scores rounded to two decimals
pub fn to_results(tallies: &[CandidateTally]) -> Vec<CandidateResult> {
    tallies
        .iter()
        .map(|t| CandidateResult {
            candidate_id: t.candidate_id,
            total_score: (t.total_score() * 100.0).round() / 100.0,
            vote_count: t.vote_count,
        })
        .collect()
}

/// Ballot-count progress of a room's vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteProgress {
    pub eligible_voters: i64,
    pub candidate_count: i64,
    pub actual_ballots: i64,
}

impl VoteProgress {
    pub fn expected_ballots(&self) -> i64 {
        self.eligible_voters * self.candidate_count
    }

    /// Voting is complete once every eligible voter has ballotted every
    /// candidate. Rooms with no eligible voters or no candidates never
    /// complete.
    pub fn is_complete(&self) -> bool {
        self.eligible_voters > 0
            && self.candidate_count > 0
            && self.actual_ballots >= self.expected_ballots()
    }
}

/// Members eligible to vote: everyone who is not the sitting LR and is not
/// themselves nominated (candidates are evaluated, not evaluators).
pub fn eligible_voter_count(members: &[Membership], candidates: &[Candidate]) -> i64 {
    members
        .iter()
        .filter(|m| m.role != RoomRole::Lr)
        .filter(|m| !candidates.iter().any(|c| c.user_id == m.user_id))
        .count() as i64
}

/// Decision taken after every successful ballot write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteDecision {
    /// Not all expected ballots are in yet
    Pending,
    /// All ballots in, but the top candidates are exactly tied — voting
    /// stays open for differentiated re-submission
    RevoteRequired(Vec<i64>),
    /// All ballots in and a single leader exists
    Winner(i64),
}

/// Evaluate completion over sorted tallies.
///
/// Idempotent: under a persistent tie every evaluation keeps returning
/// `RevoteRequired` and finalization is never triggered.
pub fn decide(tallies: &[CandidateTally], progress: &VoteProgress) -> VoteDecision {
    if tallies.is_empty() || !progress.is_complete() {
        return VoteDecision::Pending;
    }

    // Tallies are sorted; collect everyone exactly tied with the leader.
    let leader = &tallies[0];
    let top: Vec<i64> = tallies
        .iter()
        .take_while(|t| t.cmp_score(leader) == Ordering::Equal)
        .map(|t| t.candidate_id)
        .collect();

    if top.len() > 1 {
        VoteDecision::RevoteRequired(top)
    } else {
        VoteDecision::Winner(leader.candidate_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::BallotScores;

    fn member(user_id: i64, role: RoomRole) -> Membership {
        Membership {
            room_id: 1,
            user_id,
            role,
            created_at: 0,
        }
    }

    fn candidate(id: i64, user_id: i64, created_at: i64) -> Candidate {
        Candidate {
            id,
            room_id: 1,
            user_id,
            is_selected: false,
            created_at,
        }
    }

    fn ballot(voter_id: i64, candidate_id: i64, score: f64) -> Ballot {
        Ballot {
            room_id: 1,
            voter_id,
            candidate_id,
            scores: BallotScores {
                technical_score: score,
                experience_score: score,
                availability_score: score,
                communication_score: score,
                leadership_score: score,
            },
            updated_at: 0,
        }
    }

    #[test]
    fn test_tally_mean_of_ballot_means() {
        let candidates = vec![candidate(10, 100, 1)];
        let ballots = vec![ballot(1, 10, 4.0), ballot(2, 10, 3.0)];

        let tallies = tally_ballots(&candidates, &ballots);
        assert_eq!(tallies.len(), 1);
        assert_eq!(tallies[0].vote_count, 2);
        assert!((tallies[0].total_score() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_tally_sorts_by_score_then_nomination_order() {
        let candidates = vec![
            candidate(10, 100, 5),
            candidate(11, 101, 1),
            candidate(12, 102, 3),
        ];
        let ballots = vec![
            ballot(1, 10, 2.0),
            ballot(1, 11, 4.0),
            ballot(1, 12, 4.0),
        ];

        let tallies = tally_ballots(&candidates, &ballots);
        // 11 and 12 tie on score; 11 was nominated first.
        assert_eq!(
            tallies.iter().map(|t| t.candidate_id).collect::<Vec<_>>(),
            vec![11, 12, 10]
        );
    }

    #[test]
    fn test_exact_tie_detection_across_different_vote_counts() {
        // 4.0 from two ballots vs 4.0 from one ballot: still an exact tie.
        let a = CandidateTally {
            candidate_id: 1,
            sum_half_points: 80,
            vote_count: 2,
            created_at: 0,
        };
        let b = CandidateTally {
            candidate_id: 2,
            sum_half_points: 40,
            vote_count: 1,
            created_at: 0,
        };
        assert_eq!(a.cmp_score(&b), Ordering::Equal);
    }

    #[test]
    fn test_unvoted_candidate_scores_zero() {
        let a = CandidateTally {
            candidate_id: 1,
            sum_half_points: 0,
            vote_count: 0,
            created_at: 0,
        };
        let b = CandidateTally {
            candidate_id: 2,
            sum_half_points: 5,
            vote_count: 1,
            created_at: 0,
        };
        assert_eq!(a.total_score(), 0.0);
        assert_eq!(a.cmp_score(&b), Ordering::Less);
    }

    #[test]
    fn test_eligible_voters_excludes_lr_and_candidates() {
        let members = vec![
            member(1, RoomRole::Admin),
            member(2, RoomRole::Member),
            member(3, RoomRole::Member),
            member(4, RoomRole::Lr),
            member(5, RoomRole::Member), // nominated below
        ];
        let candidates = vec![candidate(10, 5, 0)];
        assert_eq!(eligible_voter_count(&members, &candidates), 3);
    }

    #[test]
    fn test_completion_threshold() {
        // E=3, C=2 → complete only at >= 6 ballots
        let progress = |actual| VoteProgress {
            eligible_voters: 3,
            candidate_count: 2,
            actual_ballots: actual,
        };
        assert!(!progress(5).is_complete());
        assert!(progress(6).is_complete());
    }

    #[test]
    fn test_no_completion_without_candidates_or_voters() {
        let no_candidates = VoteProgress {
            eligible_voters: 3,
            candidate_count: 0,
            actual_ballots: 0,
        };
        let no_voters = VoteProgress {
            eligible_voters: 0,
            candidate_count: 2,
            actual_ballots: 0,
        };
        assert!(!no_candidates.is_complete());
        assert!(!no_voters.is_complete());
    }

    #[test]
    fn test_decide_pending_then_winner() {
        let candidates = vec![candidate(10, 100, 1), candidate(11, 101, 2)];
        let partial = vec![ballot(1, 10, 4.0)];
        let progress = VoteProgress {
            eligible_voters: 1,
            candidate_count: 2,
            actual_ballots: 1,
        };
        let tallies = tally_ballots(&candidates, &partial);
        assert_eq!(decide(&tallies, &progress), VoteDecision::Pending);

        let all = vec![ballot(1, 10, 4.0), ballot(1, 11, 3.0)];
        let progress = VoteProgress {
            actual_ballots: 2,
            ..progress
        };
        let tallies = tally_ballots(&candidates, &all);
        assert_eq!(decide(&tallies, &progress), VoteDecision::Winner(10));
    }

    #[test]
    fn test_decide_tie_blocks_winner_and_is_idempotent() {
        let candidates = vec![candidate(10, 100, 1), candidate(11, 101, 2)];
        let ballots = vec![ballot(1, 10, 4.0), ballot(1, 11, 4.0)];
        let progress = VoteProgress {
            eligible_voters: 1,
            candidate_count: 2,
            actual_ballots: 2,
        };

        let tallies = tally_ballots(&candidates, &ballots);
        let first = decide(&tallies, &progress);
        let second = decide(&tallies, &progress);
        assert_eq!(first, VoteDecision::RevoteRequired(vec![10, 11]));
        assert_eq!(first, second);
    }

    #[test]
    fn test_results_round_to_two_decimals() {
        let candidates = vec![candidate(10, 100, 1)];
        // 4.0 + 4.5 + 3.5 → mean 4.0; then a 1/3 split: 4.0, 4.0, 3.5 → 3.8333…
        let ballots = vec![
            ballot(1, 10, 4.0),
            ballot(2, 10, 4.0),
            ballot(3, 10, 3.5),
        ];
        let results = to_results(&tally_ballots(&candidates, &ballots));
        assert_eq!(results[0].vote_count, 3);
        assert!((results[0].total_score - 3.83).abs() < 1e-9);
    }
}
