//! Candidates API module
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /candidates | GET | Candidates of a room, nomination order |
//! | /candidates | POST | Nominate a member (409 on duplicate) |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/candidates", post(handler::create).get(handler::list))
}
