//! Represents a registered account.

use sqlx::FromRow;

/// A registered user.
///
/// Users own zero or more bucketlists. The password is only ever held as a
/// salted PBKDF2 digest and is never serialized.
#[derive(Clone, FromRow, Debug)]
pub struct User {
    /// Row identifier, also the `sub` claim of issued tokens.
    pub id: i64,

    /// Unique login name.
    pub username: String,

    /// Encoded password digest (`pbkdf2-sha256$iterations$salt$hash`).
    pub password_hash: String,
}

/// The authenticated caller, resolved from a verified token.
///
/// Inserted into request extensions by the auth middleware and passed
/// explicitly into every service call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}
