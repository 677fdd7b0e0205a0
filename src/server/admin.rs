//! Administrative command handlers.
//!
//! These helpers stay free of transport concerns so they can run before the
//! daemon starts or as one-shot CLI invocations.

#![allow(
    clippy::print_stdout,
    reason = "intentional user output for CLI commands"
)]

use anyhow::{Context, Result};
use argon2::Argon2;
use diesel_async::AsyncConnection;

use super::cli::{AppConfig, Commands, CreateUserArgs};
use crate::{
    db::{DbConnection, apply_migrations, create_user},
    login::hash_password,
    models::NewUser,
};

/// Execute an administrative command.
///
/// # Errors
/// Propagates failures from password hashing or database operations.
pub async fn run_command(command: Commands, cfg: &AppConfig) -> Result<()> {
    match command {
        Commands::CreateUser(args) => run_create_user(args, cfg).await,
    }
}

async fn run_create_user(args: CreateUserArgs, cfg: &AppConfig) -> Result<()> {
    let argon2 = Argon2::default();
    let hashed = hash_password(&argon2, &args.password)?;
    let new_user = NewUser {
        username: &args.username,
        password: &hashed,
        is_staff: args.staff,
    };
    let mut conn = DbConnection::establish(&cfg.database).await?;
    apply_migrations(&mut conn, &cfg.database).await?;
    create_user(&mut conn, &new_user)
        .await
        .with_context(|| format!("failed to create user '{}'", args.username))?;
    println!("User {} created", args.username);
    Ok(())
}
