//! Core library for the masthead publishing service.
//!
//! This crate models a periodical magazine: issues, authors, and articles,
//! backed by a relational store. It exposes the domain rule layer
//! (current-issue selection, visibility gating, teaser generation, hit
//! counting), the request resolution layer, and the thin server runtime
//! that fronts them. Only one database backend (either `sqlite` or
//! `postgres`) should be enabled at a time.

pub mod commands;
pub mod db;
pub mod handler;
pub mod login;
pub mod models;
pub mod resolve;
pub mod schema;
pub mod server;
pub mod views;
