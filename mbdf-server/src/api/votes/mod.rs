//! Votes API module
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /votes | POST | Submit one ballot |
//! | /votes/batch | POST | Submit one voter's ballots for several candidates |
//! | /votes | GET | Standings, caller's latest ballot, finalization flag |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/votes", post(handler::submit).get(handler::list))
        .route("/votes/batch", post(handler::submit_batch))
}
