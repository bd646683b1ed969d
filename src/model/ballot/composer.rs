//! Ballot composition: which candidates may this voter rank?
//!
//! Three disjoint subsets make up a ballot: the campus representative race
//! matching the voter's housing, the class races matching their year, and
//! everything at-large. All queries are read-only, so composition is safe to
//! repeat and to run concurrently.

use mongodb::bson::{doc, Bson};
use rocket::futures::TryStreamExt;

use crate::error::Result;
use crate::model::{
    common::{Campus, Position},
    db::{ballot_info::StudentBallotInfo, candidate::Candidate},
    mongodb::{Coll, Id},
};

/// The campus representative candidates for the voter's side of campus.
pub async fn campus_rep_candidates(
    candidates: &Coll<Candidate>,
    election_id: Id,
    campus: Campus,
) -> Result<Vec<Candidate>> {
    let filter = doc! {
        "election_id": election_id,
        "position": &campus.rep_position(),
    };
    Ok(candidates.find(filter, None).await?.try_collect().await?)
}

/// The class-race candidates for the voter's year.
/// Unrecognised years get no class races.
pub async fn class_rep_candidates(
    candidates: &Coll<Candidate>,
    election_id: Id,
    year: u8,
) -> Result<Vec<Candidate>> {
    let positions = Position::class_ballot(year);
    if positions.is_empty() {
        return Ok(Vec::new());
    }
    let filter = doc! {
        "election_id": election_id,
        "position": {
            "$in": positions.iter().map(Bson::from).collect::<Vec<_>>(),
        },
    };
    Ok(candidates.find(filter, None).await?.try_collect().await?)
}

/// Every candidate outside the eligibility-gated positions.
/// These appear on every voter's ballot.
pub async fn at_large_candidates(
    candidates: &Coll<Candidate>,
    election_id: Id,
) -> Result<Vec<Candidate>> {
    let filter = doc! {
        "election_id": election_id,
        "position": {
            "$nin": Position::restricted().iter().map(Bson::from).collect::<Vec<_>>(),
        },
    };
    Ok(candidates.find(filter, None).await?.try_collect().await?)
}

/// Compose the full ballot for a registered voter: the union of the three
/// disjoint subsets. Never includes candidates from races the voter is not
/// eligible for.
pub async fn compose_ballot(
    candidates: &Coll<Candidate>,
    info: &StudentBallotInfo,
) -> Result<Vec<Candidate>> {
    let mut ballot = campus_rep_candidates(candidates, info.election_id, info.campus_rep).await?;
    ballot.extend(class_rep_candidates(candidates, info.election_id, info.year).await?);
    ballot.extend(at_large_candidates(candidates, info.election_id).await?);
    Ok(ballot)
}
