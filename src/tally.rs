//! Instant-runoff tallying.
//!
//! A pure read-and-report pass over the anonymous ballots of one election:
//! no writes, idempotent, safe to re-run at any time. Per position it
//! produces the ordered first-preference counts and a winner, falling back
//! to instant-runoff elimination rounds when no candidate holds a
//! first-preference majority.
//!
//! Tie-breaking is explicit rather than insertion-order-dependent: leaders
//! sort by (count, then lexically smallest candidate ID), and when several
//! candidates tie for fewest round votes, the lexically greatest ID is
//! eliminated. An exact tie between the final two candidates is reported as
//! such instead of being resolved by ID.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::model::{
    common::Position,
    db::{candidate::Candidate, vote::Vote},
    mongodb::Id,
};

/// A candidate's first-preference score for one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirstPreference {
    pub candidate_id: Id,
    pub candidate_name: String,
    pub count: u64,
}

/// The result of tallying one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Winner {
        candidate_id: Id,
        candidate_name: String,
    },
    /// The final two active candidates were exactly tied.
    Tie { candidate_names: Vec<String> },
    /// No ballots (or only empty rankings) were cast for the position.
    NoVotes,
}

/// The full report for one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionTally {
    pub position: Position,
    pub total_votes: u64,
    /// Ordered by count descending, then candidate ID.
    pub first_preference: Vec<FirstPreference>,
    pub outcome: Outcome,
    /// True iff no first-preference majority existed and elimination rounds
    /// were run.
    pub runoff_used: bool,
}

/// Tally every position contested in an election.
///
/// `candidates` is the election's roster (for ID resolution and position
/// discovery order); `votes` are all recorded ballots for the election.
pub fn tally_election(candidates: &[Candidate], votes: &[Vote]) -> Vec<PositionTally> {
    let names: HashMap<Id, String> = candidates
        .iter()
        .map(|c| (c.id, c.name.clone()))
        .collect();

    // Positions in roster discovery order, without duplicates.
    let mut positions: Vec<Position> = Vec::new();
    for candidate in candidates {
        if !positions.contains(&candidate.position) {
            positions.push(candidate.position.clone());
        }
    }

    positions
        .into_iter()
        .map(|position| {
            let rankings: Vec<&[Id]> = votes
                .iter()
                .filter(|v| v.position == position)
                .map(|v| v.ranking.as_slice())
                .collect();
            tally_position(position, &rankings, &names)
        })
        .collect()
}

/// Tally a single position from its ballots.
pub fn tally_position(
    position: Position,
    rankings: &[&[Id]],
    names: &HashMap<Id, String>,
) -> PositionTally {
    let total = rankings.len() as u64;
    let first_preference = first_preference_counts(rankings, names);

    if total == 0 {
        return PositionTally {
            position,
            total_votes: 0,
            first_preference,
            outcome: Outcome::NoVotes,
            runoff_used: false,
        };
    }

    let majority = total / 2 + 1;
    if let Some(leader) = first_preference.first() {
        if leader.count >= majority {
            return PositionTally {
                position,
                total_votes: total,
                outcome: Outcome::Winner {
                    candidate_id: leader.candidate_id,
                    candidate_name: leader.candidate_name.clone(),
                },
                first_preference,
                runoff_used: false,
            };
        }
    }

    let outcome = instant_runoff(rankings, majority, names);
    PositionTally {
        position,
        total_votes: total,
        first_preference,
        outcome,
        runoff_used: true,
    }
}

/// Credit each ballot's first choice with one point. Ballots with an empty
/// ranking should not exist post-validation but are tolerated and ignored.
fn first_preference_counts(rankings: &[&[Id]], names: &HashMap<Id, String>) -> Vec<FirstPreference> {
    let mut counts: HashMap<Id, u64> = HashMap::new();
    for ranking in rankings {
        if let Some(first) = ranking.first() {
            *counts.entry(*first).or_insert(0) += 1;
        }
    }
    let mut tallied: Vec<FirstPreference> = counts
        .into_iter()
        .map(|(candidate_id, count)| FirstPreference {
            candidate_id,
            candidate_name: resolve_name(candidate_id, names),
            count,
        })
        .collect();
    tallied.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(a.candidate_id.cmp(&b.candidate_id))
    });
    tallied
}

/// Elimination rounds. Each round every ballot counts for its highest-ranked
/// candidate still in the race; a candidate wins on a majority of the
/// *original* ballot count, and otherwise the candidate with the fewest
/// round votes is eliminated so their supporters' ballots transfer to each
/// voter's next active choice.
fn instant_runoff(rankings: &[&[Id]], majority: u64, names: &HashMap<Id, String>) -> Outcome {
    // Only candidates actually appearing on a ballot take part.
    let mut active: BTreeSet<Id> = rankings.iter().flat_map(|r| r.iter()).copied().collect();
    if active.is_empty() {
        return Outcome::NoVotes;
    }

    let mut round = 0;
    while active.len() > 1 {
        round += 1;
        let mut counts: HashMap<Id, u64> = active.iter().map(|id| (*id, 0)).collect();
        for ranking in rankings {
            // Exhausted ballots (no active candidates left) contribute nothing.
            if let Some(choice) = ranking.iter().find(|id| active.contains(id)) {
                // Unwrap safe: counts was seeded with every active candidate.
                *counts.get_mut(choice).unwrap() += 1;
            }
        }

        let mut sorted: Vec<Id> = active.iter().copied().collect();
        sorted.sort_by(|a, b| counts[b].cmp(&counts[a]).then(a.cmp(b)));

        let leader = sorted[0];
        if counts[&leader] >= majority {
            debug!(
                "round {round}: {} has {} votes (majority {majority}), winner",
                resolve_name(leader, names),
                counts[&leader]
            );
            return Outcome::Winner {
                candidate_id: leader,
                candidate_name: resolve_name(leader, names),
            };
        }

        // A dead heat between the last two is reported, not resolved by ID.
        if active.len() == 2 && counts[&sorted[0]] == counts[&sorted[1]] {
            debug!("round {round}: exact tie between the final two candidates");
            return Outcome::Tie {
                candidate_names: sorted.iter().map(|id| resolve_name(*id, names)).collect(),
            };
        }

        // Unwrap safe: at least two candidates are active here.
        let eliminated = *sorted.last().unwrap();
        debug!(
            "round {round}: eliminating {} with {} votes",
            resolve_name(eliminated, names),
            counts[&eliminated]
        );
        active.remove(&eliminated);
    }

    // Unwrap safe: exactly one candidate remains.
    let winner = *active.iter().next().unwrap();
    Outcome::Winner {
        candidate_id: winner,
        candidate_name: resolve_name(winner, names),
    }
}

fn resolve_name(id: Id, names: &HashMap<Id, String>) -> String {
    names
        .get(&id)
        .cloned()
        .unwrap_or_else(|| "(unknown)".to_string())
}
