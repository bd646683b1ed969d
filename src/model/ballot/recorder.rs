//! Vote recording: the concurrency-critical step.
//!
//! A single transaction performs a conditional update on the voter's
//! registration ("set `has_voted` where it is still false") and inserts the
//! anonymous ballots. The condition makes the update a compare-and-swap:
//! exactly one concurrent caller can observe a match, so a voter casts at
//! most one ballot no matter how many submissions race. The inserts share
//! the transaction, so an abort (explicit or via early return dropping the
//! session) leaves no partial ballots behind.

use mongodb::bson::doc;
use mongodb::Client;
use rocket::http::Status;

use crate::error::{Error, Result};
use crate::model::{
    db::{
        ballot_info::StudentBallotInfo,
        vote::{NewVote, VoteCore},
    },
    mongodb::{Coll, Id},
};

use super::validator::ValidBallot;

/// The undifferentiated rejection for both "already voted" and "lost a
/// concurrent race". Distinguishing the two would leak submission timing to
/// the client.
pub const UNABLE_TO_SUBMIT: &str = "Unable to submit vote";

/// Atomically mark the voter as having voted and persist their ballots,
/// stripped of any voter-identifying information.
///
/// Exactly one call per (election, voter) can ever succeed. On any failure,
/// including a conflict detected at commit time, the whole operation rolls
/// back and no ballots persist.
pub async fn record_votes(
    db_client: &Client,
    ballot_info: &Coll<StudentBallotInfo>,
    votes: &Coll<NewVote>,
    election_id: Id,
    email: &str,
    ballots: Vec<ValidBallot>,
) -> Result<()> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    // The compare-and-swap: only matches while the voter has not voted.
    let filter = doc! {
        "election_id": election_id,
        "email": email,
        "has_voted": false,
    };
    let update = doc! {
        "$set": {
            "has_voted": true,
        }
    };
    let updated = ballot_info
        .find_one_and_update_with_session(filter, update, None, &mut session)
        .await?;

    // No match: never registered, already voted, or beaten by a concurrent
    // submission. All three get the same answer.
    if updated.is_none() {
        session.abort_transaction().await?;
        return Err(Error::Status(
            Status::BadRequest,
            UNABLE_TO_SUBMIT.to_string(),
        ));
    }

    let vote_docs = ballots
        .into_iter()
        .map(|ballot| VoteCore::new(election_id, ballot.position, ballot.ranking))
        .collect::<Vec<_>>();
    votes
        .insert_many_with_session(vote_docs, None, &mut session)
        .await?;

    session.commit_transaction().await?;
    Ok(())
}
