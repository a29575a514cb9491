/*
 * Responsibility
 * - tokio runtime startup
 * - calls app::run() (no logic here)
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    identity_binding::app::run().await
}
