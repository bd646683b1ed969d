//! The voter-facing endpoints: fetch the current election, compose a
//! personalised ballot, submit votes, and nominate write-in candidates.

use mongodb::{
    bson::doc,
    options::{Collation, CollationStrength, FindOneOptions},
    Client,
};
use rocket::{http::Status, serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    api::{
        CandidateDescription, ElectionDescription, HasVotedResponse, VoteSubmission, WriteInSpec,
    },
    auth::VoterUser,
    ballot::{compose_ballot, record_votes, validate_votes},
    db::{
        ballot_info::StudentBallotInfo,
        candidate::{Candidate, CandidateCore, NewCandidate},
        election::Election,
        vote::NewVote,
    },
    mongodb::{Coll, Id},
};

pub fn routes() -> Vec<Route> {
    routes![
        get_election,
        has_voted,
        get_ballot,
        submit_votes,
        create_write_in,
    ]
}

/// Get the current election: the one with the latest start date. Elections
/// are scheduled ahead of time, so this can be one whose voting window has
/// not opened yet.
#[get("/elections")]
async fn get_election(elections: Coll<Election>) -> Result<Json<ElectionDescription>> {
    let latest = FindOneOptions::builder()
        .sort(doc! { "start_date": -1 })
        .build();
    let election = elections
        .find_one(None, latest)
        .await?
        .ok_or_else(|| Error::not_found("Current election".to_string()))?;
    Ok(Json(election.into()))
}

/// Has the authenticated voter already cast their ballot in this election?
#[get("/elections/<election_id>/voted")]
async fn has_voted(
    voter: VoterUser,
    election_id: Id,
    ballot_info: Coll<StudentBallotInfo>,
) -> Result<Json<HasVotedResponse>> {
    let info = registration(&ballot_info, election_id, &voter.email).await?;
    Ok(Json(HasVotedResponse {
        has_voted: info.has_voted,
    }))
}

/// Compose the authenticated voter's personalised ballot.
#[get("/elections/<election_id>/ballot")]
async fn get_ballot(
    voter: VoterUser,
    election_id: Id,
    ballot_info: Coll<StudentBallotInfo>,
    candidates: Coll<Candidate>,
) -> Result<Json<Vec<CandidateDescription>>> {
    let info = registration(&ballot_info, election_id, &voter.email).await?;
    let ballot = compose_ballot(&candidates, &info).await?;
    Ok(Json(ballot.into_iter().map(Into::into).collect()))
}

/// Submit the authenticated voter's votes.
///
/// The whole submission is validated before anything is written, then
/// recorded atomically. A voter can succeed here at most once per election,
/// regardless of concurrent submissions.
#[post("/elections/<election_id>/votes", data = "<submission>")]
async fn submit_votes(
    voter: VoterUser,
    election_id: Id,
    submission: Json<VoteSubmission>,
    db_client: &State<Client>,
    candidates: Coll<Candidate>,
    ballot_info: Coll<StudentBallotInfo>,
    votes: Coll<NewVote>,
) -> Result<()> {
    let ballots = validate_votes(&candidates, election_id, &submission.votes).await?;
    record_votes(
        db_client,
        &ballot_info,
        &votes,
        election_id,
        &voter.email,
        ballots,
    )
    .await
}

/// Nominate a write-in candidate.
///
/// Idempotent on (election, position, name) up to letter case: nominating
/// an existing write-in returns the stored candidate instead of a
/// duplicate, so rankings from different voters converge on one ID.
#[post("/elections/<election_id>/write-ins", data = "<spec>")]
async fn create_write_in(
    _voter: VoterUser,
    election_id: Id,
    spec: Json<WriteInSpec>,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    new_candidates: Coll<NewCandidate>,
) -> Result<Json<CandidateDescription>> {
    let spec = spec.into_inner();
    let first_name = spec.first_name.trim();
    let last_name = spec.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(Error::Status(
            Status::BadRequest,
            "Write-in candidates need a non-empty first and last name".to_string(),
        ));
    }

    elections
        .find_one(election_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election with ID '{election_id}'")))?;

    let name = format!("{first_name} {last_name}");
    let filter = doc! {
        "election_id": election_id,
        "position": &spec.position,
        "name": &name,
    };
    let case_insensitive = FindOneOptions::builder()
        .collation(
            Collation::builder()
                .locale(String::from("en"))
                .strength(CollationStrength::Secondary)
                .build(),
        )
        .build();
    if let Some(existing) = candidates.find_one(filter, case_insensitive).await? {
        return Ok(Json(existing.into()));
    }

    let candidate = CandidateCore::write_in(election_id, name, spec.position);
    let result = new_candidates.insert_one(&candidate, None).await?;
    let id = result.inserted_id.as_object_id().ok_or_else(|| {
        Error::Status(
            Status::InternalServerError,
            "Write-in insertion returned a non-ObjectId ID".to_string(),
        )
    })?;
    Ok(Json(
        Candidate {
            id: id.into(),
            candidate,
        }
        .into(),
    ))
}

/// Look up the voter's registration in this election, or 404.
async fn registration(
    ballot_info: &Coll<StudentBallotInfo>,
    election_id: Id,
    email: &str,
) -> Result<StudentBallotInfo> {
    let filter = doc! {
        "election_id": election_id,
        "email": email,
    };
    ballot_info
        .find_one(filter, None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Registration for '{email}'")))
}

#[cfg(test)]
mod tests {
    use mongodb::{bson::Document, Database};
    use rocket::{
        futures::future::join_all,
        http::{Cookie, Status},
        local::asynchronous::Client,
        serde::json::serde_json,
    };

    use crate::model::{
        api::BallotSpec,
        auth::VOTER_COOKIE,
        ballot::UNABLE_TO_SUBMIT,
        common::{Campus, Position},
        db::{
            ballot_info::{NewStudentBallotInfo, StudentBallotInfoCore},
            candidate::NewCandidate,
            election::{ElectionCore, NewElection},
            vote::Vote,
        },
        mongodb::MongoCollection,
    };

    use super::*;

    const ALICE: &str = "alice@example.edu";

    async fn insert_election(db: &Database, core: ElectionCore) -> Election {
        let result = Coll::<NewElection>::from_db(db)
            .insert_one(&core, None)
            .await
            .unwrap();
        Election {
            id: result.inserted_id.as_object_id().unwrap().into(),
            election: core,
        }
    }

    async fn insert_candidate(db: &Database, core: CandidateCore) -> Candidate {
        let result = Coll::<NewCandidate>::from_db(db)
            .insert_one(&core, None)
            .await
            .unwrap();
        Candidate {
            id: result.inserted_id.as_object_id().unwrap().into(),
            candidate: core,
        }
    }

    async fn register_voter(db: &Database, election_id: Id, email: &str, campus: Campus, year: u8) {
        Coll::<NewStudentBallotInfo>::from_db(db)
            .insert_one(
                StudentBallotInfoCore::new(election_id, email, campus, year),
                None,
            )
            .await
            .unwrap();
    }

    fn voter_cookie(email: &str) -> Cookie<'static> {
        Cookie::new(VOTER_COOKIE, email.to_string())
    }

    async fn count_votes(db: &Database) -> u64 {
        Coll::<Vote>::from_db(db)
            .count_documents(None, None)
            .await
            .unwrap()
    }

    #[backend_test]
    async fn get_election_returns_most_recent(client: Client, db: Database) {
        insert_election(&db, ElectionCore::future_example()).await;
        let current = insert_election(&db, ElectionCore::current_example()).await;

        let response = client.get(uri!(get_election)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        let fetched: ElectionDescription =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        // The fall election has the later start date, so it is returned
        // even though its voting window has not opened yet.
        assert_ne!(fetched.id, current.id);
        assert_eq!(fetched.name, ElectionCore::future_example().name);
    }

    #[backend_test]
    async fn ballot_composition_respects_eligibility(client: Client, db: Database) {
        let election = insert_election(&db, ElectionCore::current_example()).await;
        for (name, position) in [
            ("North Rep", Position::NorthCampusRepresentative),
            ("South Rep", Position::SouthCampusRepresentative),
            ("First Year Pres", Position::FirstYearClassPresident),
            ("Sophomore Pres", Position::SophomoreClassPresident),
            ("At Large Pres", Position::President),
        ] {
            insert_candidate(
                &db,
                CandidateCore::new(election.id, name.to_string(), position),
            )
            .await;
        }
        register_voter(&db, election.id, ALICE, Campus::North, 1).await;

        let response = client
            .get(uri!(get_ballot(election.id)))
            .private_cookie(voter_cookie(ALICE))
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        let ballot: Vec<CandidateDescription> =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        let mut names = ballot.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
        names.sort_unstable();
        // North campus, year 1: first-years vote one class ahead, so they
        // get the sophomore race; the south rep and first-year races stay
        // off this voter's ballot.
        assert_eq!(names, ["At Large Pres", "North Rep", "Sophomore Pres"]);
    }

    #[backend_test]
    async fn ballot_requires_registration(client: Client, db: Database) {
        let election = insert_election(&db, ElectionCore::current_example()).await;

        let response = client
            .get(uri!(get_ballot(election.id)))
            .private_cookie(voter_cookie(ALICE))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());

        // And no cookie at all is unauthorized.
        let response = client.get(uri!(get_ballot(election.id))).dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());
    }

    #[backend_test]
    async fn submitted_votes_are_anonymous(client: Client, db: Database) {
        let election = insert_election(&db, ElectionCore::current_example()).await;
        let first = insert_candidate(
            &db,
            CandidateCore::new(election.id, "Alice Able".to_string(), Position::President),
        )
        .await;
        let second = insert_candidate(
            &db,
            CandidateCore::new(election.id, "Bob Baker".to_string(), Position::President),
        )
        .await;
        register_voter(&db, election.id, ALICE, Campus::North, 1).await;

        let submission = VoteSubmission {
            votes: vec![BallotSpec {
                position: Position::President,
                ranking: vec![first.id.to_string(), second.id.to_string()],
            }],
        };
        let response = client
            .post(uri!(submit_votes(election.id)))
            .private_cookie(voter_cookie(ALICE))
            .json(&submission)
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        // The stored ballot carries no voter identity at all.
        let raw_votes: Vec<Document> = {
            use rocket::futures::TryStreamExt;
            db.collection::<Document>(Vote::NAME)
                .find(None, None)
                .await
                .unwrap()
                .try_collect()
                .await
                .unwrap()
        };
        assert_eq!(raw_votes.len(), 1);
        assert!(!raw_votes[0].contains_key("email"));
        assert!(raw_votes[0]
            .iter()
            .all(|(_, value)| !value.to_string().contains(ALICE)));

        // And the voter is now marked as having voted.
        let response = client
            .get(uri!(has_voted(election.id)))
            .private_cookie(voter_cookie(ALICE))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let voted: HasVotedResponse =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(voted.has_voted);
    }

    #[backend_test]
    async fn second_submission_is_rejected(client: Client, db: Database) {
        let election = insert_election(&db, ElectionCore::current_example()).await;
        let candidate = insert_candidate(
            &db,
            CandidateCore::new(election.id, "Alice Able".to_string(), Position::President),
        )
        .await;
        register_voter(&db, election.id, ALICE, Campus::North, 1).await;

        let submission = VoteSubmission {
            votes: vec![BallotSpec {
                position: Position::President,
                ranking: vec![candidate.id.to_string()],
            }],
        };
        let response = client
            .post(uri!(submit_votes(election.id)))
            .private_cookie(voter_cookie(ALICE))
            .json(&submission)
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        let response = client
            .post(uri!(submit_votes(election.id)))
            .private_cookie(voter_cookie(ALICE))
            .json(&submission)
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        // The undifferentiated rejection, not a validation reason.
        assert_eq!(UNABLE_TO_SUBMIT, response.into_string().await.unwrap());
        assert_eq!(1, count_votes(&db).await);
    }

    #[backend_test]
    async fn concurrent_submissions_record_exactly_one_ballot(client: Client, db: Database) {
        let election = insert_election(&db, ElectionCore::current_example()).await;
        let candidate = insert_candidate(
            &db,
            CandidateCore::new(election.id, "Alice Able".to_string(), Position::President),
        )
        .await;
        register_voter(&db, election.id, ALICE, Campus::North, 1).await;

        let submission = VoteSubmission {
            votes: vec![BallotSpec {
                position: Position::President,
                ranking: vec![candidate.id.to_string()],
            }],
        };
        let requests = (0..5).map(|_| {
            client
                .post(uri!(submit_votes(election.id)))
                .private_cookie(voter_cookie(ALICE))
                .json(&submission)
                .dispatch()
        });
        let responses = join_all(requests).await;

        let successes = responses
            .iter()
            .filter(|r| r.status() == Status::Ok)
            .count();
        assert_eq!(1, successes);
        assert_eq!(1, count_votes(&db).await);
    }

    #[backend_test]
    async fn invalid_submission_persists_nothing(client: Client, db: Database) {
        let election = insert_election(&db, ElectionCore::current_example()).await;
        let candidate = insert_candidate(
            &db,
            CandidateCore::new(election.id, "Alice Able".to_string(), Position::President),
        )
        .await;
        register_voter(&db, election.id, ALICE, Campus::North, 1).await;

        // Two ballots for the same position.
        let submission = VoteSubmission {
            votes: vec![
                BallotSpec {
                    position: Position::President,
                    ranking: vec![candidate.id.to_string()],
                },
                BallotSpec {
                    position: Position::President,
                    ranking: vec![candidate.id.to_string()],
                },
            ],
        };
        let response = client
            .post(uri!(submit_votes(election.id)))
            .private_cookie(voter_cookie(ALICE))
            .json(&submission)
            .dispatch()
            .await;

        assert_eq!(Status::BadRequest, response.status());
        // The rejection names the rule and position at fault.
        let reason = response.into_string().await.unwrap();
        assert!(reason.contains("more than one vote"));
        assert!(reason.contains("president"));
        assert_eq!(0, count_votes(&db).await);

        // The rejected submission does not consume the voter's ballot.
        let response = client
            .get(uri!(has_voted(election.id)))
            .private_cookie(voter_cookie(ALICE))
            .dispatch()
            .await;
        let voted: HasVotedResponse =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(!voted.has_voted);
    }

    #[backend_test]
    async fn candidates_must_match_the_claimed_position(client: Client, db: Database) {
        let election = insert_election(&db, ElectionCore::current_example()).await;
        let finance = insert_candidate(
            &db,
            CandidateCore::new(election.id, "Frank Funds".to_string(), Position::VpFinance),
        )
        .await;
        register_voter(&db, election.id, ALICE, Campus::North, 1).await;

        let submission = VoteSubmission {
            votes: vec![BallotSpec {
                position: Position::President,
                ranking: vec![finance.id.to_string()],
            }],
        };
        let response = client
            .post(uri!(submit_votes(election.id)))
            .private_cookie(voter_cookie(ALICE))
            .json(&submission)
            .dispatch()
            .await;

        assert_eq!(Status::BadRequest, response.status());
        assert_eq!(0, count_votes(&db).await);
    }

    #[backend_test]
    async fn write_in_nomination_is_idempotent(client: Client, db: Database) {
        let election = insert_election(&db, ElectionCore::current_example()).await;
        register_voter(&db, election.id, ALICE, Campus::North, 1).await;

        let spec = WriteInSpec {
            first_name: "  Wendy ".to_string(),
            last_name: "Writein".to_string(),
            position: Position::President,
        };
        let response = client
            .post(uri!(create_write_in(election.id)))
            .private_cookie(voter_cookie(ALICE))
            .json(&spec)
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let created: CandidateDescription =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(created.name, "Wendy Writein");
        assert!(created.is_write_in);

        // Same name, different case: the original candidate comes back.
        let again = WriteInSpec {
            first_name: "wendy".to_string(),
            last_name: "WRITEIN".to_string(),
            position: Position::President,
        };
        let response = client
            .post(uri!(create_write_in(election.id)))
            .private_cookie(voter_cookie(ALICE))
            .json(&again)
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let fetched: CandidateDescription =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(created.id, fetched.id);

        let total = Coll::<Candidate>::from_db(&db)
            .count_documents(None, None)
            .await
            .unwrap();
        assert_eq!(1, total);
    }

    #[backend_test]
    async fn blank_write_in_names_are_rejected(client: Client, db: Database) {
        let election = insert_election(&db, ElectionCore::current_example()).await;
        register_voter(&db, election.id, ALICE, Campus::North, 1).await;

        let spec = WriteInSpec {
            first_name: "   ".to_string(),
            last_name: "Writein".to_string(),
            position: Position::President,
        };
        let response = client
            .post(uri!(create_write_in(election.id)))
            .private_cookie(voter_cookie(ALICE))
            .json(&spec)
            .dispatch()
            .await;

        assert_eq!(Status::BadRequest, response.status());
    }
}
