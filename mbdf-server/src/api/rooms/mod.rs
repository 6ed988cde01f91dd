//! Rooms API module
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /rooms | POST | Create a room; creator becomes admin |
//! | /rooms/{id} | GET | Room metadata |
//! | /rooms/{id}/members | GET/POST | List / add members |
//! | /rooms/{id}/archive/check | GET | Archival precheck |
//! | /rooms/{id}/archive/confirm | POST | Archive with cascading effects |
//! | /rooms/{id}/unarchive | POST | Reopen an archived room (admin) |
//! | /rooms/{id}/access-requests | GET/POST | List (admin/LR) / file a request |
//! | /rooms/{id}/access-requests/{req_id}/approve | POST | Approve (admin/LR) |
//! | /rooms/{id}/agreements | GET/POST | List / draft agreements |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/rooms", post(handler::create))
        .route("/rooms/{id}", get(handler::get_by_id))
        .route(
            "/rooms/{id}/members",
            get(handler::list_members).post(handler::add_member),
        )
        .route("/rooms/{id}/archive/check", get(handler::archive_check))
        .route("/rooms/{id}/archive/confirm", post(handler::archive_confirm))
        .route("/rooms/{id}/unarchive", post(handler::unarchive))
        .route(
            "/rooms/{id}/access-requests",
            get(handler::list_access_requests).post(handler::create_access_request),
        )
        .route(
            "/rooms/{id}/access-requests/{req_id}/approve",
            post(handler::approve_access_request),
        )
        .route(
            "/rooms/{id}/agreements",
            get(handler::list_agreements).post(handler::create_agreement),
        )
}
