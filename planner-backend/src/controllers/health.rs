use actix_web::{web, HttpResponse, Responder};
use planner_types::ConfigStatus;

use crate::AppState;

/// Version from Cargo.toml, available at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/health").route(web::get().to(health_check)));
    cfg.service(web::resource("/api/health/config").route(web::get().to(get_config_status)));
}

async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": VERSION,
        "uptime_secs": state.started_at.elapsed().as_secs()
    }))
}

async fn get_config_status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ConfigStatus {
        storage_backend: state.store.backend_name().to_string(),
        mail_configured: state.notifier.is_configured(),
        reminder_times: state
            .config
            .reminder
            .trigger_times
            .iter()
            .map(|t| t.to_string())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::test_support::state_with;
    use crate::store::UnavailableStore;
    use actix_web::{test, App};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_health_and_config_status() {
        let app = test::init_service(
            App::new()
                .app_data(state_with(Arc::new(UnavailableStore::new("no backend"))))
                .configure(config_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], VERSION);

        let req = test::TestRequest::get().uri("/api/health/config").to_request();
        let status: ConfigStatus = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status.storage_backend, "unavailable");
        assert!(!status.mail_configured);
        assert_eq!(status.reminder_times, vec!["17:00", "21:00"]);
    }
}
