use mongodb::bson::oid::Error as OidError;
use mongodb::error::Error as DbError;
use rocket::{
    http::Status,
    response::{status::Custom, Responder},
};
use thiserror::Error;

use crate::model::ballot::BallotError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    OidParse(#[from] OidError),
    #[error("Invalid ballot: {0}")]
    Ballot(#[from] BallotError),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    /// A 404 with a standardised message.
    pub fn not_found(what: String) -> Self {
        Self::Status(Status::NotFound, format!("{what} not found"))
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = match &self {
            Self::Db(_) => Status::InternalServerError,
            Self::OidParse(_) | Self::Ballot(_) => Status::BadRequest,
            Self::Status(status, _) => *status,
        };
        if status.class().is_server_error() {
            // Infrastructure details stay server-side; the client gets a
            // bare status.
            error!("{self}");
            Err(status)
        } else {
            // Client errors carry their reason in the body, so the caller
            // can tell a validation failure from a submission rejection.
            warn!("{self}");
            Custom(status, self.to_string()).respond_to(req)
        }
    }
}
