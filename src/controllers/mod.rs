pub mod auth;
pub mod bookings;
pub mod logs;
pub mod reviews;
pub mod transactions;
pub mod workspaces;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(auth::routes())
        .merge(workspaces::routes())
        .merge(bookings::routes())
        .merge(reviews::routes())
        .merge(transactions::routes())
        .merge(logs::routes())
}
