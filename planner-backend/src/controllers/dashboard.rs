//! Dashboard data and the static front end.

use actix_files::Files;
use actix_web::{web, HttpResponse, Responder};
use std::path::Path;

use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/get_data").route(web::get().to(get_data)));
}

async fn get_data(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.store.get_all().await)
}

/// Static file service for the dashboard, or None if `dir` does not exist.
/// Register it last so it does not shadow the API routes.
pub fn static_files(dir: &Path) -> Option<Files> {
    dir.is_dir().then(|| Files::new("/", dir).index_file("index.html"))
}
