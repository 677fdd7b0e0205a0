//! Map requested issue numbers and article ids onto concrete records.
//!
//! The checks run in a fixed, observable order: issue existence, then
//! visibility, then article existence, then issue match. Collapsing them
//! would change which requests surface as not-found, so callers get a
//! tagged [`ResolveError`] rather than a bare option.

use thiserror::Error;

use crate::{
    db::{self, DbConnection},
    models::{Article, Issue},
};

/// Failure modes of the resolution layer.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The requested resource does not exist or is not visible to the
    /// requesting principal. Surfaced as a 404-equivalent at the boundary.
    #[error("resource not found")]
    NotFound,
    /// Underlying storage failure, surfaced as an internal error.
    #[error(transparent)]
    Diesel(#[from] diesel::result::Error),
}

/// Resolve an issue by its public number, enforcing visibility.
///
/// Unpublished issues resolve only for staff principals; everyone else
/// receives [`ResolveError::NotFound`], indistinguishable from a missing
/// issue.
///
/// # Errors
/// Returns [`ResolveError::NotFound`] when the issue is missing or hidden,
/// or a storage error.
#[must_use = "handle the result"]
pub async fn resolve_issue(
    conn: &mut DbConnection,
    issue_number: i32,
    is_staff: bool,
) -> Result<Issue, ResolveError> {
    let issue = db::get_issue_by_number(conn, issue_number)
        .await?
        .ok_or(ResolveError::NotFound)?;
    if !issue.published && !is_staff {
        return Err(ResolveError::NotFound);
    }
    Ok(issue)
}

/// Resolve an article addressed by `(issue_number, article_id)`.
///
/// The article must exist and belong to the issue named in the request; an
/// existing article under a different issue is not silently substituted.
/// One successful resolution records exactly one visit, and the returned
/// article carries the freshly incremented count re-read from storage.
///
/// # Errors
/// Returns [`ResolveError::NotFound`] per the rules above, or a storage
/// error.
#[must_use = "handle the result"]
pub async fn resolve_article(
    conn: &mut DbConnection,
    issue_number: i32,
    article_id: i32,
    is_staff: bool,
) -> Result<(Issue, Article), ResolveError> {
    let issue = resolve_issue(conn, issue_number, is_staff).await?;
    let article = db::get_article(conn, article_id)
        .await?
        .ok_or(ResolveError::NotFound)?;
    if article.issue_id != issue.id {
        return Err(ResolveError::NotFound);
    }
    db::mark_visited(conn, article.id).await?;
    let article = db::get_article(conn, article.id)
        .await?
        .ok_or(ResolveError::NotFound)?;
    Ok((issue, article))
}

/// Resolve the current issue for callers that require one.
///
/// The index page treats "no published issue" as a valid empty state and
/// queries [`db::current_issue`] directly; this wrapper is for contexts
/// where an issue is mandatory.
///
/// # Errors
/// Returns [`ResolveError::NotFound`] when no published issue exists, or a
/// storage error.
#[must_use = "handle the result"]
pub async fn current_issue(conn: &mut DbConnection) -> Result<Issue, ResolveError> {
    db::current_issue(conn)
        .await?
        .ok_or(ResolveError::NotFound)
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "test assertions")]

    use chrono::NaiveDate;
    use diesel_async::AsyncConnection;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::models::{NewArticle, NewAuthor, NewIssue};

    /// Connection seeded with the fixture set from the original test data:
    /// issue pk 1 = number 1 (published), pk 2 = number 3 (published),
    /// pk 3 = number 2 (unpublished); articles 1-2 in issue 1, article 3 in
    /// issue 2, article 4 in issue 3.
    #[fixture]
    async fn seeded_conn() -> DbConnection {
        let mut conn = DbConnection::establish(":memory:")
            .await
            .expect("failed to create in-memory connection");
        db::run_migrations(&mut conn)
            .await
            .expect("failed to apply migrations");
        db::create_author(
            &mut conn,
            &NewAuthor {
                forename: "Paul",
                surname: "Beasley-Murray",
                details: None,
            },
        )
        .await
        .expect("author");
        let issues = [
            (1, NaiveDate::from_ymd_opt(2010, 1, 5), true),
            (3, NaiveDate::from_ymd_opt(2010, 4, 1), true),
            (2, NaiveDate::from_ymd_opt(2010, 2, 1), false),
        ];
        for (number, issue_date, published) in issues {
            db::create_issue(
                &mut conn,
                &NewIssue {
                    number,
                    issue_date: issue_date.expect("valid date"),
                    published,
                },
            )
            .await
            .expect("issue");
        }
        for issue_id in [1, 1, 2, 3] {
            db::create_article(
                &mut conn,
                &NewArticle {
                    issue_id,
                    author_id: 1,
                    title: "An article",
                    subheading: None,
                    description: None,
                    text: Some("Body"),
                    allow_preview: false,
                },
            )
            .await
            .expect("article");
        }
        conn
    }

    #[rstest]
    #[tokio::test]
    async fn published_issue_resolves_for_anyone(#[future] seeded_conn: DbConnection) {
        let mut conn = seeded_conn.await;
        let issue = resolve_issue(&mut conn, 1, false).await.expect("resolved");
        assert_eq!(issue.number, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_issue_number_is_not_found(#[future] seeded_conn: DbConnection) {
        let mut conn = seeded_conn.await;
        let err = resolve_issue(&mut conn, 4, false)
            .await
            .expect_err("must not resolve");
        assert!(matches!(err, ResolveError::NotFound));
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    #[tokio::test]
    async fn unpublished_issue_gated_on_staff(
        #[future] seeded_conn: DbConnection,
        #[case] is_staff: bool,
    ) {
        let mut conn = seeded_conn.await;
        let result = resolve_issue(&mut conn, 2, is_staff).await;
        if is_staff {
            let issue = result.expect("staff sees unpublished issues");
            assert_eq!(issue.number, 2);
            assert!(!issue.published);
        } else {
            assert!(matches!(result, Err(ResolveError::NotFound)));
        }
    }

    #[rstest]
    #[tokio::test]
    async fn article_resolves_and_counts_one_visit(#[future] seeded_conn: DbConnection) {
        let mut conn = seeded_conn.await;
        let (issue, article) = resolve_article(&mut conn, 1, 1, false)
            .await
            .expect("resolved");
        assert_eq!(issue.number, 1);
        assert_eq!(article.id, 1);
        assert_eq!(article.hits, 1);

        let (_, article) = resolve_article(&mut conn, 1, 1, false)
            .await
            .expect("resolved");
        assert_eq!(article.hits, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn article_under_wrong_issue_number_is_not_found(#[future] seeded_conn: DbConnection) {
        let mut conn = seeded_conn.await;
        // Article 3 exists, issue number 1 exists, but article 3 belongs to
        // the issue numbered 3.
        let err = resolve_article(&mut conn, 1, 3, false)
            .await
            .expect_err("must not substitute the article's real issue");
        assert!(matches!(err, ResolveError::NotFound));

        // A failed resolution must not count a visit.
        let article = db::get_article(&mut conn, 3)
            .await
            .expect("query ok")
            .expect("article exists");
        assert_eq!(article.hits, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn article_id_and_issue_number_do_not_line_up_with_pks(
        #[future] seeded_conn: DbConnection,
    ) {
        let mut conn = seeded_conn.await;
        // Issue with pk 2 has number 3; article 3 belongs to it.
        let (issue, article) = resolve_article(&mut conn, 3, 3, false)
            .await
            .expect("resolved");
        assert_eq!(issue.id, 2);
        assert_eq!(issue.number, 3);
        assert_eq!(article.id, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_article_is_not_found(#[future] seeded_conn: DbConnection) {
        let mut conn = seeded_conn.await;
        let err = resolve_article(&mut conn, 1, 200, false)
            .await
            .expect_err("must not resolve");
        assert!(matches!(err, ResolveError::NotFound));
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    #[tokio::test]
    async fn article_in_unpublished_issue_gated_on_staff(
        #[future] seeded_conn: DbConnection,
        #[case] is_staff: bool,
    ) {
        let mut conn = seeded_conn.await;
        let result = resolve_article(&mut conn, 2, 4, is_staff).await;
        if is_staff {
            let (issue, article) = result.expect("staff sees unpublished issues");
            assert_eq!(issue.number, 2);
            assert_eq!(article.id, 4);
        } else {
            assert!(matches!(result, Err(ResolveError::NotFound)));
        }
    }

    #[rstest]
    #[tokio::test]
    async fn current_issue_requires_a_published_issue(#[future] seeded_conn: DbConnection) {
        let mut conn = seeded_conn.await;
        let issue = current_issue(&mut conn).await.expect("resolved");
        assert_eq!(issue.number, 3);

        db::set_published(&mut conn, 1, false).await.expect("ok");
        db::set_published(&mut conn, 2, false).await.expect("ok");
        let err = current_issue(&mut conn).await.expect_err("none published");
        assert!(matches!(err, ResolveError::NotFound));
    }
}
