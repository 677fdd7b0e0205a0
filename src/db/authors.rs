//! Author record helpers.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::models::{Author, NewAuthor};

/// Insert a new author record.
///
/// # Errors
/// Returns any error produced by the insertion query.
#[must_use = "handle the result"]
pub async fn create_author(conn: &mut DbConnection, author: &NewAuthor<'_>) -> QueryResult<usize> {
    use crate::schema::authors::dsl::authors;
    diesel::insert_into(authors)
        .values(author)
        .execute(conn)
        .await
}

/// Look up an author by primary key.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_author(conn: &mut DbConnection, author_id: i32) -> QueryResult<Option<Author>> {
    use crate::schema::authors::dsl::{authors, id};
    authors
        .filter(id.eq(author_id))
        .first::<Author>(conn)
        .await
        .optional()
}
