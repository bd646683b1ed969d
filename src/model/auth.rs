//! Identity guards for requests.
//!
//! Authentication itself lives in an external SSO collaborator; by the time
//! a request reaches this subsystem, that collaborator has verified the user
//! and recorded their identity in a private (encrypted, tamper-proof)
//! cookie. These guards extract that identity and trust it without
//! re-verification. They are constructed per-request rather than via any
//! global session state.

use rocket::{
    http::Status,
    request::{FromRequest, Outcome, Request},
};

/// Private cookie holding the authenticated voter's email address.
pub const VOTER_COOKIE: &str = "voter_email";

/// Private cookie holding the authenticated administrator's username.
pub const ADMIN_COOKIE: &str = "admin_user";

/// An authenticated voter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterUser {
    /// The voter's verified email address, lowercased. Used as the
    /// registration lookup key.
    pub email: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for VoterUser {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.cookies().get_private(VOTER_COOKIE) {
            Some(cookie) => Outcome::Success(VoterUser {
                email: cookie.value().to_lowercase(),
            }),
            None => Outcome::Failure((Status::Unauthorized, ())),
        }
    }
}

/// An authenticated administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    pub username: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.cookies().get_private(ADMIN_COOKIE) {
            Some(cookie) => Outcome::Success(AdminUser {
                username: cookie.value().to_string(),
            }),
            None => Outcome::Failure((Status::Unauthorized, ())),
        }
    }
}
