//! Rendering contexts for the three logical endpoints.
//!
//! Each function selects the entities a page needs and returns them as a
//! serialisable context; HTML rendering belongs to the external templating
//! boundary. Not-found outcomes arrive as [`ResolveError::NotFound`] from
//! the resolution layer, never as an empty context.

use serde::Serialize;

use crate::{
    db::{self, DbConnection},
    models::{Article, Author, Issue},
    resolve::{self, ResolveError},
};

/// An article as listed on index and issue pages, with its derived teaser
/// and canonical link alongside the stored fields.
#[derive(Debug, Serialize)]
pub struct ArticleContext {
    /// The stored article fields.
    #[serde(flatten)]
    pub article: Article,
    /// Derived preview string.
    pub teaser: String,
    /// Canonical link target for the article.
    pub link: String,
}

impl ArticleContext {
    fn new(article: Article, issue_number: i32) -> Self {
        let teaser = article.teaser();
        let link = article.canonical_path(issue_number);
        Self {
            article,
            teaser,
            link,
        }
    }
}

/// Context for the landing page.
#[derive(Debug, Serialize)]
pub struct IndexContext {
    /// The most recent published issue, absent when none exists.
    pub current_issue: Option<Issue>,
    /// The current issue's articles, empty when no issue is current.
    pub current_articles: Vec<ArticleContext>,
}

/// Context for an issue detail page.
#[derive(Debug, Serialize)]
pub struct IssueDetailContext {
    /// The resolved issue.
    pub issue: Issue,
    /// The issue's articles in stable id order.
    pub articles: Vec<ArticleContext>,
}

/// Context for an article detail page.
#[derive(Debug, Serialize)]
pub struct ArticleDetailContext {
    /// The issue named in the request path.
    pub issue: Issue,
    /// The resolved article, with its visit already counted.
    pub article: Article,
    /// The credited author.
    pub author: Author,
}

/// Build the landing page context.
///
/// A catalogue with no published issue yields an absent current issue and
/// an empty article list; that renders gracefully rather than failing.
///
/// # Errors
/// Returns a storage error; never [`ResolveError::NotFound`].
#[must_use = "handle the result"]
pub async fn index(conn: &mut DbConnection) -> Result<IndexContext, ResolveError> {
    let Some(issue) = db::current_issue(conn).await? else {
        return Ok(IndexContext {
            current_issue: None,
            current_articles: Vec::new(),
        });
    };
    let current_articles = article_contexts(conn, &issue).await?;
    Ok(IndexContext {
        current_issue: Some(issue),
        current_articles,
    })
}

/// Build an issue detail context for the issue addressed by `number`.
///
/// # Errors
/// Returns [`ResolveError::NotFound`] when the issue is missing or hidden
/// from the requesting principal, or a storage error.
#[must_use = "handle the result"]
pub async fn issue_detail(
    conn: &mut DbConnection,
    issue_number: i32,
    is_staff: bool,
) -> Result<IssueDetailContext, ResolveError> {
    let issue = resolve::resolve_issue(conn, issue_number, is_staff).await?;
    let articles = article_contexts(conn, &issue).await?;
    Ok(IssueDetailContext { issue, articles })
}

/// Build an article detail context, counting the view.
///
/// # Errors
/// Returns [`ResolveError::NotFound`] per the resolution rules, or a
/// storage error.
#[must_use = "handle the result"]
pub async fn article_detail(
    conn: &mut DbConnection,
    issue_number: i32,
    article_id: i32,
    is_staff: bool,
) -> Result<ArticleDetailContext, ResolveError> {
    let (issue, article) = resolve::resolve_article(conn, issue_number, article_id, is_staff).await?;
    // The FK guarantees an author row; a miss here is storage corruption,
    // not a request-level 404.
    let author = db::get_author(conn, article.author_id)
        .await?
        .ok_or(ResolveError::Diesel(diesel::result::Error::NotFound))?;
    Ok(ArticleDetailContext {
        issue,
        article,
        author,
    })
}

async fn article_contexts(
    conn: &mut DbConnection,
    issue: &Issue,
) -> Result<Vec<ArticleContext>, ResolveError> {
    let articles = db::articles_for_issue(conn, issue.id).await?;
    Ok(articles
        .into_iter()
        .map(|article| ArticleContext::new(article, issue.number))
        .collect())
}
