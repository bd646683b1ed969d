//! Administrative endpoints: bulk voter registration and pre-start
//! election deletion.

use mongodb::{bson::doc, Client};
use rocket::{http::Status, serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    api::StudentBallotInfoSpec,
    auth::AdminUser,
    db::{
        ballot_info::{NewStudentBallotInfo, StudentBallotInfoCore},
        candidate::Candidate,
        election::Election,
        vote::Vote,
    },
    mongodb::{is_duplicate_key_error, Coll, Id},
};

pub fn routes() -> Vec<Route> {
    routes![register_voters, delete_election]
}

/// Register a batch of voters for an election.
///
/// All-or-nothing per batch: a duplicate registration (within the batch or
/// against existing voters) rejects the request, and the whole batch rolls
/// back so no partial registrations persist.
#[post("/elections/<election_id>/voters", data = "<registrations>")]
async fn register_voters(
    _admin: AdminUser,
    election_id: Id,
    registrations: Json<Vec<StudentBallotInfoSpec>>,
    db_client: &State<Client>,
    elections: Coll<Election>,
    ballot_info: Coll<NewStudentBallotInfo>,
) -> Result<()> {
    elections
        .find_one(election_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election with ID '{election_id}'")))?;

    let registrations = registrations.into_inner();
    if registrations.is_empty() {
        return Err(Error::Status(
            Status::BadRequest,
            "No voters supplied".to_string(),
        ));
    }

    let new_registrations = registrations
        .iter()
        .map(|spec| StudentBallotInfoCore::new(election_id, &spec.email, spec.campus_rep, spec.year))
        .collect::<Vec<_>>();

    // Insert inside a transaction: an ordered insert stops at the first
    // duplicate, so without the rollback the earlier documents would stick.
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;
    let result = ballot_info
        .insert_many_with_session(new_registrations, None, &mut session)
        .await;
    if is_duplicate_key_error(result.as_ref().map(|_| ())) {
        session.abort_transaction().await?;
        return Err(Error::Status(
            Status::BadRequest,
            "One or more voters are already registered for this election".to_string(),
        ));
    }
    result?;
    session.commit_transaction().await?;
    Ok(())
}

/// Delete an election that has not yet opened, along with everything
/// belonging to it. Refused once voting has started; ballots are
/// irrevocable from that point.
#[delete("/elections/<election_id>")]
async fn delete_election(
    _admin: AdminUser,
    election_id: Id,
    db_client: &State<Client>,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    ballot_info: Coll<NewStudentBallotInfo>,
    votes: Coll<Vote>,
) -> Result<()> {
    let election = elections
        .find_one(election_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election with ID '{election_id}'")))?;
    if election.has_started() {
        return Err(Error::Status(
            Status::BadRequest,
            "Cannot delete an election once voting has opened".to_string(),
        ));
    }

    // Cascade in one transaction so a partial delete never survives.
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;
    elections
        .delete_one_with_session(election_id.as_doc(), None, &mut session)
        .await?;
    let by_election = doc! { "election_id": election_id };
    candidates
        .delete_many_with_session(by_election.clone(), None, &mut session)
        .await?;
    ballot_info
        .delete_many_with_session(by_election.clone(), None, &mut session)
        .await?;
    votes
        .delete_many_with_session(by_election, None, &mut session)
        .await?;
    session.commit_transaction().await?;
    Ok(())
}
