//! Password hashing and session authentication.

use argon2::{
    Argon2,
    password_hash::{Error, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng},
};
use diesel::result::QueryResult;

use crate::{
    db::{DbConnection, get_user_by_name},
    models::User,
};

/// Hash a password for storage.
///
/// # Errors
/// Returns any error reported by the Argon2 hasher.
pub fn hash_password(argon2: &Argon2, pw: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon2.hash_password(pw.as_bytes(), &salt)?.to_string())
}

/// Verify a password against a stored hash.
///
/// An unparseable stored hash fails verification rather than erroring; the
/// caller cannot do anything more useful with a corrupt credential row.
#[must_use]
pub fn verify_password(hash: &str, pw: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(pw.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Authenticate a username/password pair against the user table.
///
/// Returns the matching user on success and `None` for an unknown name or
/// wrong password; the two cases are deliberately indistinguishable.
///
/// # Errors
/// Returns any error produced by the user lookup query.
#[must_use = "handle the result"]
pub async fn authenticate(
    conn: &mut DbConnection,
    username: &str,
    password: &str,
) -> QueryResult<Option<User>> {
    let Some(user) = get_user_by_name(conn, username).await? else {
        return Ok(None);
    };
    if verify_password(&user.password, password) {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}
