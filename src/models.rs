//! Queryable entities and the pure domain rules attached to them.
//!
//! The rule methods here are pure functions of the current field values;
//! nothing is cached. Anything that touches the store lives in [`crate::db`].

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of characters of `text` used for a generated teaser.
const TEASER_LENGTH: usize = 200;
/// Suffix appended to teasers truncated from `text`.
const TEASER_SUFFIX: &str = " ...";
/// Teaser returned when an article has neither description nor text.
const TEASER_FALLBACK: &str = "None available.";

/// A contributing author.
#[derive(Queryable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Author {
    /// Primary key.
    pub id: i32,
    /// Given name.
    pub forename: String,
    /// Family name.
    pub surname: String,
    /// Optional biographical notes.
    pub details: Option<String>,
}

impl Author {
    /// Name shown wherever the author is credited.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.forename, self.surname)
    }
}

/// Insertable author record.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::authors)]
pub struct NewAuthor<'a> {
    /// Given name.
    pub forename: &'a str,
    /// Family name.
    pub surname: &'a str,
    /// Optional biographical notes.
    pub details: Option<&'a str>,
}

/// One periodical release, addressed externally by its unique `number`.
#[derive(Queryable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Issue {
    /// Primary key.
    pub id: i32,
    /// Globally unique, positive issue number.
    pub number: i32,
    /// Cover date of the release.
    pub issue_date: NaiveDate,
    /// Whether the issue is visible to non-staff readers.
    pub published: bool,
}

impl Issue {
    /// Display label, e.g. `"Issue 3"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("Issue {}", self.number)
    }

    /// Cover date as full month name and year, e.g. `"January 2010"`.
    #[must_use]
    pub fn month_year(&self) -> String {
        self.issue_date.format("%B %Y").to_string()
    }

    /// Canonical link target for this issue, derived from `number`.
    #[must_use]
    pub fn canonical_path(&self) -> String {
        format!("/issues/{}", self.number)
    }
}

/// Insertable issue record.
#[derive(Insertable, Deserialize)]
#[diesel(table_name = crate::schema::issues)]
pub struct NewIssue {
    /// Globally unique, positive issue number.
    pub number: i32,
    /// Cover date of the release.
    pub issue_date: NaiveDate,
    /// Whether the issue is visible to non-staff readers.
    pub published: bool,
}

/// One piece of content belonging to exactly one issue and one author.
#[derive(Queryable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Article {
    /// Primary key. Article ids are not scoped per issue.
    pub id: i32,
    /// Owning issue.
    pub issue_id: i32,
    /// Credited author.
    pub author_id: i32,
    /// Headline.
    pub title: String,
    /// Optional subheading shown under the title.
    pub subheading: Option<String>,
    /// Optional hand-written preview text.
    pub description: Option<String>,
    /// Optional full body text.
    pub text: Option<String>,
    /// View counter; only ever incremented.
    pub hits: i32,
    /// Whether the article may be previewed before its issue is published.
    pub allow_preview: bool,
}

impl Article {
    /// Short preview string for listings.
    ///
    /// A non-empty `description` is returned verbatim. Otherwise the first
    /// 200 characters of `text` are returned with `" ..."` appended. With
    /// neither present the literal `"None available."` is returned.
    #[must_use]
    pub fn teaser(&self) -> String {
        if let Some(description) = non_empty(self.description.as_deref()) {
            return description.to_owned();
        }
        if let Some(text) = non_empty(self.text.as_deref()) {
            let mut teaser: String = text.chars().take(TEASER_LENGTH).collect();
            teaser.push_str(TEASER_SUFFIX);
            return teaser;
        }
        TEASER_FALLBACK.to_owned()
    }

    /// Canonical link target for this article.
    ///
    /// Addressed by the pair (issue number, article id); the id alone is
    /// ambiguous because article ids are not scoped per issue.
    #[must_use]
    pub fn canonical_path(&self, issue_number: i32) -> String {
        format!("/issues/{issue_number}/articles/{}", self.id)
    }
}

/// Insertable article record. `hits` starts at the schema default of zero.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::articles)]
pub struct NewArticle<'a> {
    /// Owning issue.
    pub issue_id: i32,
    /// Credited author.
    pub author_id: i32,
    /// Headline.
    pub title: &'a str,
    /// Optional subheading.
    pub subheading: Option<&'a str>,
    /// Optional hand-written preview text.
    pub description: Option<&'a str>,
    /// Optional full body text.
    pub text: Option<&'a str>,
    /// Whether the article may be previewed before its issue is published.
    pub allow_preview: bool,
}

/// An account that may carry the staff capability.
#[derive(Queryable, Serialize, Deserialize, Debug)]
pub struct User {
    /// Primary key.
    pub id: i32,
    /// Unique login name.
    pub username: String,
    /// Argon2 password hash.
    pub password: String,
    /// Staff accounts may view unpublished issues.
    pub is_staff: bool,
}

/// Insertable user record.
#[derive(Insertable, Deserialize)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    /// Unique login name.
    pub username: &'a str,
    /// Argon2 password hash.
    pub password: &'a str,
    /// Staff accounts may view unpublished issues.
    pub is_staff: bool,
}

/// Treat absent and empty-string optional fields alike.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "test assertions")]

    use rstest::rstest;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn article(description: Option<&str>, text: Option<&str>) -> Article {
        Article {
            id: 1,
            issue_id: 1,
            author_id: 1,
            title: "My first article".to_owned(),
            subheading: None,
            description: description.map(str::to_owned),
            text: text.map(str::to_owned),
            hits: 0,
            allow_preview: false,
        }
    }

    #[test]
    fn author_display_name_joins_forename_and_surname() {
        let author = Author {
            id: 1,
            forename: "Paul".to_owned(),
            surname: "Beasley-Murray".to_owned(),
            details: None,
        };
        assert_eq!(author.display_name(), "Paul Beasley-Murray");
    }

    #[rstest]
    #[case(1, "Issue 1")]
    #[case(3, "Issue 3")]
    fn issue_label_uses_number(#[case] number: i32, #[case] expected: &str) {
        let issue = Issue {
            id: 1,
            number,
            issue_date: date(2010, 1, 5),
            published: true,
        };
        assert_eq!(issue.label(), expected);
    }

    #[rstest]
    #[case(date(2010, 1, 5), "January 2010")]
    #[case(date(2010, 4, 1), "April 2010")]
    #[case(date(2026, 12, 31), "December 2026")]
    fn issue_month_year_formats_full_month_name(
        #[case] issue_date: NaiveDate,
        #[case] expected: &str,
    ) {
        let issue = Issue {
            id: 1,
            number: 1,
            issue_date,
            published: true,
        };
        assert_eq!(issue.month_year(), expected);
    }

    #[test]
    fn issue_canonical_path_uses_number_not_id() {
        let issue = Issue {
            id: 7,
            number: 3,
            issue_date: date(2010, 4, 1),
            published: true,
        };
        assert_eq!(issue.canonical_path(), "/issues/3");
    }

    #[test]
    fn article_canonical_path_pairs_issue_number_with_article_id() {
        let art = article(None, None);
        assert_eq!(art.canonical_path(3), "/issues/3/articles/1");
    }

    #[test]
    fn teaser_prefers_description_verbatim() {
        let art = article(Some("Witty description"), Some("Full text"));
        assert_eq!(art.teaser(), "Witty description");
    }

    #[test]
    fn teaser_truncates_long_text_to_200_chars() {
        let text = "x".repeat(450);
        let art = article(None, Some(&text));
        let expected = format!("{} ...", "x".repeat(200));
        assert_eq!(art.teaser(), expected);
    }

    #[test]
    fn teaser_counts_characters_not_bytes() {
        let text = "é".repeat(250);
        let art = article(None, Some(&text));
        let expected = format!("{} ...", "é".repeat(200));
        assert_eq!(art.teaser(), expected);
    }

    #[test]
    fn teaser_appends_suffix_to_short_text() {
        let art = article(None, Some("Short body"));
        assert_eq!(art.teaser(), "Short body ...");
    }

    #[test]
    fn teaser_falls_back_when_nothing_available() {
        let art = article(None, None);
        assert_eq!(art.teaser(), "None available.");
    }

    #[test]
    fn teaser_treats_empty_strings_as_absent() {
        let art = article(Some(""), Some(""));
        assert_eq!(art.teaser(), "None available.");

        let art = article(Some(""), Some("Body"));
        assert_eq!(art.teaser(), "Body ...");
    }
}
