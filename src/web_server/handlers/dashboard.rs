//! Admin dashboard statistics.

use axum::extract::State;
use axum::Json;

use crate::dashboard::{compute_stats, StatsSnapshot};
use crate::error::ApiError;
use crate::web_server::extract::MaybeSession;
use crate::web_server::state::SharedState;
use crate::web_server::utils::now_secs;

pub async fn stats_handler(
    State(state): State<SharedState>,
    MaybeSession(session): MaybeSession,
) -> Result<Json<StatsSnapshot>, ApiError> {
    let storage = state.storage.lock().await;
    compute_stats(session.as_ref(), &*storage, now_secs()).map(Json)
}
