//! Masthead server binary: parses the CLI and hands off to the library
//! runtime.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    masthead::server::run().await
}
