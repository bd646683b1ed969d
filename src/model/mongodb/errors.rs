//! For some reason, the mongodb crate doesn't provide error code constants.
//! This module fills in the gaps.

use mongodb::error::{Error as DbError, ErrorKind, WriteFailure};

pub const DUPLICATE_KEY: i32 = 11000;

/// Return true if the given result is a duplicate key write error.
/// Covers both single writes and bulk inserts.
pub fn is_duplicate_key_error<T>(result: Result<T, &DbError>) -> bool {
    if let Err(err) = result {
        match *err.kind {
            ErrorKind::Write(WriteFailure::WriteError(ref e)) => {
                return e.code == DUPLICATE_KEY;
            }
            ErrorKind::BulkWrite(ref failure) => {
                if let Some(ref write_errors) = failure.write_errors {
                    return write_errors.iter().any(|e| e.code == DUPLICATE_KEY);
                }
            }
            _ => {}
        }
    }
    false
}
