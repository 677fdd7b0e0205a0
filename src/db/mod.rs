//! Manage database connections and domain queries.
//!
//! This module tree exposes helpers for creating pooled Diesel connections,
//! running embedded migrations, and executing the magazine queries grouped
//! by domain concern.

mod articles;
mod authors;
mod connection;
mod issues;
mod migrations;
mod users;


pub use self::{
    articles::{articles_for_issue, create_article, get_article, mark_visited},
    authors::{create_author, get_author},
    connection::{DbConnection, DbPool, MIGRATIONS, establish_pool},
    issues::{create_issue, current_issue, get_issue_by_number, set_published},
    migrations::{apply_migrations, run_migrations},
    users::{create_user, get_user_by_name},
};
