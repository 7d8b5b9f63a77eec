//! Placeholder traffic handler used by the binary
//!
//! Stands in for a real application: every request sleeps for the
//! configured amount of simulated work, then answers "Hello world!".

use axum::{extract::State, routing::get, Router};
use std::time::Duration;

pub const GREETING: &str = "Hello world!";

async fn hello(State(work): State<Duration>) -> &'static str {
    tokio::time::sleep(work).await;
    GREETING
}

/// Router answering `GET /` after `work` of simulated processing
pub fn router(work: Duration) -> Router {
    Router::new().route("/", get(hello)).with_state(work)
}
