//! Note endpoint. A blank body deletes the note.

use actix_web::web;
use planner_types::SaveNoteRequest;

use super::{success, ApiResult};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/save_note").route(web::post().to(save_note)));
}

async fn save_note(state: web::Data<AppState>, body: web::Json<SaveNoteRequest>) -> ApiResult {
    log::debug!("[API] Saving note '{}' ({} bytes)", body.key, body.note.len());
    state.store.upsert_note(&body.key, &body.note).await?;
    Ok(success())
}
