//! Task endpoints: create, complete (delete), and extend deadline.

use actix_web::web;
use planner_types::{DeleteTaskRequest, Task, UpdateTaskRequest};

use super::{success, ApiResult};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/save_task").route(web::post().to(save_task)));
    cfg.service(web::resource("/api/delete_task").route(web::post().to(delete_task)));
    cfg.service(web::resource("/api/update_task").route(web::post().to(update_task)));
}

async fn save_task(state: web::Data<AppState>, body: web::Json<Task>) -> ApiResult {
    let task = body.into_inner();
    log::debug!("[API] Saving task {} due {}", task.id, task.date);
    state.store.insert_task(task).await?;
    Ok(success())
}

async fn delete_task(state: web::Data<AppState>, body: web::Json<DeleteTaskRequest>) -> ApiResult {
    log::debug!("[API] Deleting task {}", body.id);
    state.store.delete_task(&body.id).await?;
    Ok(success())
}

async fn update_task(state: web::Data<AppState>, body: web::Json<UpdateTaskRequest>) -> ApiResult {
    log::debug!("[API] Moving task {} to {}", body.id, body.date);
    state.store.update_task_date(&body.id, &body.date).await?;
    Ok(success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::test_support::state_with;
    use crate::controllers::{dashboard, json_config};
    use crate::store::{JsonFileStore, TaskStore, UnavailableStore};
    use actix_web::http::header::ContentType;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use planner_types::{DashboardData, StatusResponse, TaskId};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn math_task() -> serde_json::Value {
        json!({
            "id": 1,
            "date": "2026-03-11",
            "type": "HW",
            "subject": "Math",
            "title": "Problem set"
        })
    }

    #[actix_web::test]
    async fn test_task_lifecycle() {
        let dir = tempdir().unwrap();
        let store: Arc<dyn TaskStore> = Arc::new(JsonFileStore::new(dir.path().join("data.json")));
        let app = test::init_service(
            App::new()
                .app_data(state_with(store.clone()))
                .app_data(json_config())
                .configure(config)
                .configure(dashboard::config),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/save_task").set_json(math_task()).to_request();
        let resp: StatusResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp.status, "success");

        let req = test::TestRequest::post()
            .uri("/api/update_task")
            .set_json(json!({ "id": 1, "date": "2026-03-14" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/get_data").to_request();
        let data: DashboardData = test::call_and_read_body_json(&app, req).await;
        assert_eq!(data.tasks.len(), 1);
        assert_eq!(data.tasks[0].date, "2026-03-14");

        let req = test::TestRequest::post()
            .uri("/api/delete_task")
            .set_json(json!({ "id": 1 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(store.get_all().await.tasks.is_empty());
    }

    #[actix_web::test]
    async fn test_delete_unknown_task_succeeds() {
        let dir = tempdir().unwrap();
        let store: Arc<dyn TaskStore> = Arc::new(JsonFileStore::new(dir.path().join("data.json")));
        let app = test::init_service(
            App::new()
                .app_data(state_with(store.clone()))
                .app_data(json_config())
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/delete_task")
            .set_json(json!({ "id": "missing" }))
            .to_request();
        let resp: StatusResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp.status, "success");
        assert!(store.get_all().await.tasks.is_empty());
        assert!(store.delete_task(&TaskId::Number(5)).await.is_ok());
    }

    #[actix_web::test]
    async fn test_malformed_bodies_are_server_errors() {
        let dir = tempdir().unwrap();
        let store: Arc<dyn TaskStore> = Arc::new(JsonFileStore::new(dir.path().join("data.json")));
        let app = test::init_service(
            App::new()
                .app_data(state_with(store.clone()))
                .app_data(json_config())
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/save_task")
            .insert_header(ContentType::json())
            .set_payload("{ not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(test::read_body(resp).await.is_empty());

        let req = test::TestRequest::post()
            .uri("/api/update_task")
            .set_json(json!({ "id": 1 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(test::read_body(resp).await.is_empty());

        assert!(store.get_all().await.is_empty());
    }

    #[actix_web::test]
    async fn test_unavailable_store_is_server_error() {
        let app = test::init_service(
            App::new()
                .app_data(state_with(Arc::new(UnavailableStore::new("no backend"))))
                .app_data(json_config())
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/save_task").set_json(math_task()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(test::read_body(resp).await.is_empty());
    }
}
