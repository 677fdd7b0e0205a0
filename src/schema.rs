//! Diesel table definitions for the magazine schema.
#![allow(missing_docs, reason = "diesel::table! generates undocumented items")]

diesel::table! {
    authors (id) {
        id -> Integer,
        forename -> Text,
        surname -> Text,
        details -> Nullable<Text>,
    }
}

diesel::table! {
    issues (id) {
        id -> Integer,
        number -> Integer,
        issue_date -> Date,
        published -> Bool,
    }
}

diesel::table! {
    articles (id) {
        id -> Integer,
        issue_id -> Integer,
        author_id -> Integer,
        title -> Text,
        subheading -> Nullable<Text>,
        description -> Nullable<Text>,
        text -> Nullable<Text>,
        hits -> Integer,
        allow_preview -> Bool,
    }
}

diesel::table! {
    users (id) {
        id -> Integer,
        username -> Text,
        password -> Text,
        is_staff -> Bool,
    }
}

diesel::joinable!(articles -> issues (issue_id));
diesel::joinable!(articles -> authors (author_id));

diesel::allow_tables_to_appear_in_same_query!(authors, issues, articles);
