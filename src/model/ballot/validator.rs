//! Ballot validation: accept or reject a submission before any persistence.
//!
//! Checks run fail-fast, in order: the submission is non-empty, positions
//! are unique, each ranking is non-empty with syntactically valid and
//! duplicate-free candidate IDs, every ID resolves to a candidate of the
//! claimed position in the claimed election, and at most one resolved
//! candidate is a write-in. Any failure rejects the whole submission;
//! nothing is persisted.

use std::collections::HashSet;

use mongodb::bson::doc;
use rocket::futures::TryStreamExt;
use thiserror::Error;

use crate::error::Result;
use crate::model::{
    api::BallotSpec,
    common::Position,
    db::candidate::Candidate,
    mongodb::{Coll, Id},
};

/// Why a submission was rejected, tagged with the position/rule at fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BallotError {
    #[error("at least one vote must be submitted")]
    NoVotes,
    #[error("more than one vote submitted for position '{0}'")]
    DuplicatePosition(Position),
    #[error("empty ranking for position '{0}'")]
    EmptyRanking(Position),
    #[error("invalid candidate ID '{id}' in ranking for position '{position}'")]
    InvalidCandidateId { position: Position, id: String },
    #[error("duplicate candidate in ranking for position '{0}'")]
    DuplicateCandidate(Position),
    #[error("ranking for position '{0}' contains unknown candidates")]
    UnknownCandidates(Position),
    #[error("more than one write-in candidate ranked for position '{0}'")]
    MultipleWriteIns(Position),
}

/// A structurally valid ballot with parsed candidate IDs, ready for
/// resolution against the candidate roster and then for recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBallot {
    pub position: Position,
    pub ranking: Vec<Id>,
}

/// The pure (storage-free) validation steps: non-empty submission, unique
/// positions, and well-formed rankings.
pub fn check_structure(votes: &[BallotSpec]) -> std::result::Result<Vec<ValidBallot>, BallotError> {
    if votes.is_empty() {
        return Err(BallotError::NoVotes);
    }

    let mut positions = HashSet::new();
    for vote in votes {
        if !positions.insert(&vote.position) {
            return Err(BallotError::DuplicatePosition(vote.position.clone()));
        }
    }

    votes
        .iter()
        .map(|vote| {
            if vote.ranking.is_empty() {
                return Err(BallotError::EmptyRanking(vote.position.clone()));
            }
            let mut seen = HashSet::new();
            let mut ranking = Vec::with_capacity(vote.ranking.len());
            for raw_id in &vote.ranking {
                let id = raw_id
                    .parse::<Id>()
                    .map_err(|_| BallotError::InvalidCandidateId {
                        position: vote.position.clone(),
                        id: raw_id.clone(),
                    })?;
                if !seen.insert(id) {
                    return Err(BallotError::DuplicateCandidate(vote.position.clone()));
                }
                ranking.push(id);
            }
            Ok(ValidBallot {
                position: vote.position.clone(),
                ranking,
            })
        })
        .collect()
}

/// Full validation of a submission, including resolution of every ranked
/// candidate against the election's roster. Read-only.
pub async fn validate_votes(
    candidates: &Coll<Candidate>,
    election_id: Id,
    votes: &[BallotSpec],
) -> Result<Vec<ValidBallot>> {
    let ballots = check_structure(votes)?;

    for ballot in &ballots {
        let filter = doc! {
            "_id": {
                "$in": ballot.ranking.iter().map(|id| **id).collect::<Vec<_>>(),
            },
            "election_id": election_id,
            "position": &ballot.position,
        };
        let resolved: Vec<Candidate> = candidates.find(filter, None).await?.try_collect().await?;

        // IDs from other elections or positions simply fail to resolve.
        if resolved.len() != ballot.ranking.len() {
            return Err(BallotError::UnknownCandidates(ballot.position.clone()).into());
        }

        let write_ins = resolved.iter().filter(|c| c.is_write_in).count();
        if write_ins > 1 {
            return Err(BallotError::MultipleWriteIns(ballot.position.clone()).into());
        }
    }

    Ok(ballots)
}
