//! Article record helpers, including the atomic hit counter.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::models::{Article, NewArticle};

/// Insert a new article record.
///
/// # Errors
/// Returns any error produced by the insertion query.
#[must_use = "handle the result"]
pub async fn create_article(
    conn: &mut DbConnection,
    article: &NewArticle<'_>,
) -> QueryResult<usize> {
    use crate::schema::articles::dsl::articles;
    diesel::insert_into(articles)
        .values(article)
        .execute(conn)
        .await
}

/// Look up an article by primary key.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_article(conn: &mut DbConnection, article_id: i32) -> QueryResult<Option<Article>> {
    use crate::schema::articles::dsl::{articles, id};
    articles
        .filter(id.eq(article_id))
        .first::<Article>(conn)
        .await
        .optional()
}

/// List all articles belonging to an issue, in stable id order.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn articles_for_issue(
    conn: &mut DbConnection,
    for_issue_id: i32,
) -> QueryResult<Vec<Article>> {
    use crate::schema::articles::dsl::{articles, id, issue_id};
    articles
        .filter(issue_id.eq(for_issue_id))
        .order(id.asc())
        .load::<Article>(conn)
        .await
}

/// Record one view of an article.
///
/// Performs a single storage-level `hits = hits + 1` update so that
/// concurrent callers each contribute an independent increment; never a
/// read-modify-write of an application-held value.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn mark_visited(conn: &mut DbConnection, article_id: i32) -> QueryResult<usize> {
    use crate::schema::articles::dsl::{articles, hits, id};
    diesel::update(articles.filter(id.eq(article_id)))
        .set(hits.eq(hits + 1))
        .execute(conn)
        .await
}
