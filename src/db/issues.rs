//! Issue record helpers.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::models::{Issue, NewIssue};

/// Insert a new issue record.
///
/// The `number` column carries a unique constraint; inserting a duplicate
/// issue number fails with a database error.
///
/// # Errors
/// Returns any error produced by the insertion query.
#[must_use = "handle the result"]
pub async fn create_issue(conn: &mut DbConnection, issue: &NewIssue) -> QueryResult<usize> {
    use crate::schema::issues::dsl::issues;
    diesel::insert_into(issues).values(issue).execute(conn).await
}

/// Look up an issue by its unique public number.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_issue_by_number(
    conn: &mut DbConnection,
    issue_number: i32,
) -> QueryResult<Option<Issue>> {
    use crate::schema::issues::dsl::{issues, number};
    issues
        .filter(number.eq(issue_number))
        .first::<Issue>(conn)
        .await
        .optional()
}

/// Toggle an issue's published flag.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn set_published(
    conn: &mut DbConnection,
    issue_id: i32,
    value: bool,
) -> QueryResult<usize> {
    use crate::schema::issues::dsl::{id, issues, published};
    diesel::update(issues.filter(id.eq(issue_id)))
        .set(published.eq(value))
        .execute(conn)
        .await
}

/// Select the most recent published issue.
///
/// Orders by `issue_date` descending with `number` descending as the
/// deterministic tie-break. Returns `None` when no published issue exists;
/// that is a valid empty state for the index page, not an error.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn current_issue(conn: &mut DbConnection) -> QueryResult<Option<Issue>> {
    use crate::schema::issues::dsl::{issue_date, issues, number, published};
    issues
        .filter(published.eq(true))
        .order(issue_date.desc())
        .then_order_by(number.desc())
        .first::<Issue>(conn)
        .await
        .optional()
}
