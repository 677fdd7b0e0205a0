//! Connection-level request processing.
//!
//! The handler owns per-client [`Session`] state and dispatches request
//! lines to [`Command`] processors. Each connection runs in its own
//! asynchronous task.

use std::net::SocketAddr;

use crate::{commands::Command, db::DbPool};

/// Per-connection context used by [`handle_request`].
pub struct Context {
    /// Remote peer address.
    pub peer: SocketAddr,
    /// Shared database pool.
    pub pool: DbPool,
}

impl Context {
    /// Build a context for one accepted connection.
    #[must_use]
    pub const fn new(peer: SocketAddr, pool: DbPool) -> Self {
        Self { peer, pool }
    }
}

/// Session state for a single connection.
///
/// Sessions start anonymous; a successful `LOGIN` records the account and
/// its staff capability, which the resolution layer consumes as an explicit
/// boolean.
#[derive(Default)]
pub struct Session {
    /// Authenticated account id, if any.
    pub user_id: Option<i32>,
    /// Whether the authenticated account carries staff privilege.
    pub is_staff: bool,
}

/// Process a single request line and build the reply line.
///
/// Malformed lines become `ERR 400` replies; all other failures are mapped
/// by the command layer, so this function never fails the connection.
pub async fn handle_request(ctx: &Context, session: &mut Session, line: &str) -> String {
    match Command::parse(line) {
        Ok(cmd) => cmd.process(&ctx.pool, session).await,
        Err(err) => format!("ERR 400 {err}"),
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "test assertions")]

    use std::time::Duration;

    use diesel_async::pooled_connection::{AsyncDieselConnectionManager, bb8::Pool};

    use super::*;
    use crate::db::DbConnection;

    fn dummy_pool() -> DbPool {
        let manager = AsyncDieselConnectionManager::<DbConnection>::new(":memory:");
        Pool::builder()
            .max_size(1)
            .min_idle(Some(0))
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .test_on_check_out(false)
            .build_unchecked(manager)
    }

    #[test]
    fn session_starts_anonymous() {
        let session = Session::default();
        assert!(session.user_id.is_none());
        assert!(!session.is_staff);
    }

    #[tokio::test]
    async fn malformed_line_yields_bad_request_reply() {
        let pool = dummy_pool();
        let peer: SocketAddr = "127.0.0.1:9001".parse().expect("loopback address");
        let ctx = Context::new(peer, pool);
        let mut session = Session::default();

        let reply = handle_request(&ctx, &mut session, "FETCH 1").await;
        assert_eq!(reply, "ERR 400 unknown command 'FETCH'");
    }
}
