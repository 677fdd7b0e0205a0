//! Parse and execute line-protocol commands.
//!
//! This module converts one request line into a [`Command`] and runs the
//! appropriate view, translating the resolution layer's tagged result into
//! the wire reply: `OK <json>` on success, `ERR 404 not found` for the
//! not-found outcome, and `ERR 401`/`ERR 500` for credential and
//! infrastructure failures.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::{db::DbPool, handler::Session, login, resolve::ResolveError, views};

/// Reply line sent when a resource cannot be resolved.
pub const REPLY_NOT_FOUND: &str = "ERR 404 not found";
/// Reply line sent when credentials are rejected.
pub const REPLY_UNAUTHORIZED: &str = "ERR 401 invalid credentials";
/// Reply line sent on unexpected server-side failures.
pub const REPLY_INTERNAL: &str = "ERR 500 internal error";

/// High-level command representation parsed from a request line.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Authenticate the session.
    Login {
        /// Login name.
        username: String,
        /// Plain-text password, verified against the stored hash.
        password: String,
    },
    /// Request the landing page context.
    Index,
    /// Request an issue detail context, addressed by issue number.
    Issue {
        /// Public issue number.
        number: i32,
    },
    /// Request an article detail context, addressed by issue number and
    /// article id.
    Article {
        /// Public issue number.
        number: i32,
        /// Article primary key.
        article_id: i32,
    },
}

/// Errors produced while parsing a request line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The verb is not one of the known commands.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    /// The verb is known but the argument count is wrong.
    #[error("usage: {0}")]
    Usage(&'static str),
    /// A numeric argument did not parse.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

impl Command {
    /// Parse a single request line.
    ///
    /// # Errors
    /// Returns a [`ParseError`] describing what is wrong with the line.
    #[must_use = "handle the result"]
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((verb, args)) = tokens.split_first() else {
            return Err(ParseError::UnknownCommand(String::new()));
        };
        match verb.to_ascii_uppercase().as_str() {
            "LOGIN" => match args {
                [username, password] => Ok(Self::Login {
                    username: (*username).to_owned(),
                    password: (*password).to_owned(),
                }),
                _ => Err(ParseError::Usage("LOGIN <username> <password>")),
            },
            "INDEX" => match args {
                [] => Ok(Self::Index),
                _ => Err(ParseError::Usage("INDEX")),
            },
            "ISSUE" => match args {
                [number] => Ok(Self::Issue {
                    number: parse_number(number)?,
                }),
                _ => Err(ParseError::Usage("ISSUE <number>")),
            },
            "ARTICLE" => match args {
                [number, article_id] => Ok(Self::Article {
                    number: parse_number(number)?,
                    article_id: parse_number(article_id)?,
                }),
                _ => Err(ParseError::Usage("ARTICLE <issue-number> <article-id>")),
            },
            _ => Err(ParseError::UnknownCommand((*verb).to_owned())),
        }
    }

    /// Execute the command against the store and build the reply line.
    pub async fn process(self, pool: &DbPool, session: &mut Session) -> String {
        let mut conn = match pool.get().await {
            Ok(conn) => conn,
            Err(err) => return internal_error("failed to get database connection", &err),
        };
        match self {
            Self::Login { username, password } => {
                match login::authenticate(&mut conn, &username, &password).await {
                    Ok(Some(user)) => {
                        session.user_id = Some(user.id);
                        session.is_staff = user.is_staff;
                        info!(username, "session authenticated");
                        ok_reply(&serde_json::json!({
                            "username": user.username,
                            "is_staff": user.is_staff,
                        }))
                    }
                    Ok(None) => REPLY_UNAUTHORIZED.to_owned(),
                    Err(err) => internal_error("login query failed", &err),
                }
            }
            Self::Index => reply_from(views::index(&mut conn).await),
            Self::Issue { number } => {
                reply_from(views::issue_detail(&mut conn, number, session.is_staff).await)
            }
            Self::Article { number, article_id } => reply_from(
                views::article_detail(&mut conn, number, article_id, session.is_staff).await,
            ),
        }
    }
}

fn parse_number(token: &str) -> Result<i32, ParseError> {
    token
        .parse::<i32>()
        .map_err(|_| ParseError::InvalidNumber(token.to_owned()))
}

fn reply_from<T: Serialize>(result: Result<T, ResolveError>) -> String {
    match result {
        Ok(ctx) => ok_reply(&ctx),
        Err(ResolveError::NotFound) => REPLY_NOT_FOUND.to_owned(),
        Err(ResolveError::Diesel(err)) => internal_error("storage error", &err),
    }
}

fn ok_reply<T: Serialize>(ctx: &T) -> String {
    match serde_json::to_string(ctx) {
        Ok(json) => format!("OK {json}"),
        Err(err) => internal_error("failed to encode reply", &err),
    }
}

fn internal_error(context: &str, err: &dyn fmt::Display) -> String {
    error!(%err, context, "command failed");
    REPLY_INTERNAL.to_owned()
}
