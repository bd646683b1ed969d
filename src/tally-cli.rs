//! A simple CLI tool for tallying senate elections.
//! This reads the same collections the API writes, and uses the internal
//! instant-runoff implementation, so its report is by definition consistent
//! with what the server recorded.

use clap::{Arg, ArgAction, ArgMatches, Command};
use mongodb::bson::doc;
use mongodb::options::FindOneOptions;
use mongodb::Client;
use rocket::futures::TryStreamExt;

use senate_backend::config::DATABASE_NAME;
use senate_backend::model::db::{candidate::Candidate, election::Election, vote::Vote};
use senate_backend::model::mongodb::{Coll, Id};
use senate_backend::tally::{tally_election, Outcome, PositionTally};

const PROGRAM_NAME: &str = "tally-senate";

const ABOUT_TEXT: &str = "Tally a ranked-choice senate election.

Read-only: re-running it never changes the stored ballots.

EXIT CODES:
     0: Tally produced.
 Other: Error.";

const ELECTION_ID: &str = "ELECTION_ID";

const ELECTION_ID_HELP: &str = "The ID of the election to tally.\n\
Defaults to the election with the most recent end date.";

const DB_URI: &str = "db-uri";

const DB_URI_HELP: &str = "The MongoDB connection URI.\n\
Defaults to $MONGODB_URI, or mongodb://localhost:27017.";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .arg(
            Arg::new(ELECTION_ID)
                .help(ELECTION_ID_HELP)
                .action(ArgAction::Set)
                .required(false),
        )
        .arg(
            Arg::new(DB_URI)
                .long(DB_URI)
                .help(DB_URI_HELP)
                .action(ArgAction::Set)
                .required(false),
        )
}

/// Errors that this program may produce.
#[derive(Debug)]
enum Error {
    /// Bad command-line input.
    Input(String),
    /// Database error described by the inner message.
    Db(String),
    /// The requested election does not exist.
    NotFound(String),
}

impl From<mongodb::error::Error> for Error {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Db(err.to_string())
    }
}

/// Find the election to tally: by ID if given, otherwise the one that
/// finished (or finishes) last.
async fn find_election(
    elections: &Coll<Election>,
    election_id: Option<&String>,
) -> Result<Election, Error> {
    let election = match election_id {
        Some(raw_id) => {
            let id = raw_id
                .parse::<Id>()
                .map_err(|_| Error::Input(format!("'{raw_id}' is not a valid election ID")))?;
            elections.find_one(id.as_doc(), None).await?
        }
        None => {
            let most_recent = FindOneOptions::builder()
                .sort(doc! { "end_date": -1 })
                .build();
            elections.find_one(None, most_recent).await?
        }
    };
    election.ok_or_else(|| Error::NotFound("No matching election found".to_string()))
}

/// Print the report for one position.
fn print_position(tally: &PositionTally) {
    println!();
    println!("=== {} ===", tally.position);
    println!(
        "{} ballot{} cast",
        tally.total_votes,
        if tally.total_votes != 1 { "s" } else { "" }
    );
    for preference in &tally.first_preference {
        println!(
            "  {}: {} first-preference vote{}",
            preference.candidate_name,
            preference.count,
            if preference.count != 1 { "s" } else { "" }
        );
    }
    match &tally.outcome {
        Outcome::Winner { candidate_name, .. } => {
            if tally.runoff_used {
                println!("Winner after instant runoff: {candidate_name}");
            } else {
                println!("Winner by first-preference majority: {candidate_name}");
            }
        }
        Outcome::Tie { candidate_names } => {
            println!("Exact tie between: {}", candidate_names.join(", "));
        }
        Outcome::NoVotes => {
            println!("No votes cast");
        }
    }
}

/// Load the election's data and tally it.
async fn tally(args: &ArgMatches) -> Result<(), Error> {
    let default_uri = std::env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let db_uri: &String = args.get_one(DB_URI).unwrap_or(&default_uri);

    let client = Client::with_uri_str(db_uri).await?;
    let db = client.database(DATABASE_NAME);
    let elections = Coll::<Election>::from_db(&db);
    let candidates = Coll::<Candidate>::from_db(&db);
    let votes = Coll::<Vote>::from_db(&db);

    let election = find_election(&elections, args.get_one(ELECTION_ID)).await?;
    println!("Tallying election '{}' ({})", election.name, election.id);

    let candidates: Vec<Candidate> = candidates
        .find(doc! { "election_id": election.id }, None)
        .await?
        .try_collect()
        .await?;
    let votes: Vec<Vote> = votes
        .find(doc! { "election_id": election.id }, None)
        .await?
        .try_collect()
        .await?;

    if candidates.is_empty() {
        println!("No candidates are standing in this election.");
        return Ok(());
    }

    for position_tally in tally_election(&candidates, &votes) {
        print_position(&position_tally);
    }
    Ok(())
}

/// Run the tally, report the result, and return the exit code.
async fn run(args: &ArgMatches) -> u8 {
    match tally(args).await {
        Ok(()) => 0,
        Err(Error::Input(msg)) => {
            println!("Invalid input: {msg}");
            1
        }
        Err(Error::Db(msg)) => {
            println!("Database error: {msg}");
            1
        }
        Err(Error::NotFound(msg)) => {
            println!("{msg}");
            1
        }
    }
}

#[rocket::main]
async fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args).await;
    std::process::exit(exit_code.into())
}
