pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::applications::handlers as applications;
use crate::dashboard::handlers as dashboard;
use crate::jobs::handlers as jobs;
use crate::matching::handlers as matching;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Resumes
        .route(
            "/api/v1/resumes",
            post(resumes::handle_upload).get(resumes::handle_list_resumes),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get_resume).delete(resumes::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/download",
            get(resumes::handle_download_resume),
        )
        // Jobs
        .route(
            "/api/v1/jobs",
            post(jobs::handle_analyze_job).get(jobs::handle_list_jobs),
        )
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handle_get_job).delete(jobs::handle_delete_job),
        )
        // Matching
        .route("/api/v1/match", post(matching::handle_match))
        // Applications
        .route(
            "/api/v1/applications",
            post(applications::handle_create_application)
                .get(applications::handle_list_applications),
        )
        .route(
            "/api/v1/applications/:id",
            get(applications::handle_get_application)
                .put(applications::handle_update_application)
                .delete(applications::handle_delete_application),
        )
        // Dashboard
        .route("/api/v1/dashboard/stats", get(dashboard::handle_stats))
        .route("/api/v1/dashboard/activity", get(dashboard::handle_activity))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use bytes::Bytes;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::extraction::Dictionary;

    const BOUNDARY: &str = "resume-ranker-test-boundary";

    fn app(dir: &tempfile::TempDir) -> Router {
        let state = AppState::new(Config::with_data_dir(dir.path()), Dictionary::default()).unwrap();
        build_router(state)
    }

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = docx_rs::Docx::new();
        for p in paragraphs {
            docx = docx.add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(*p)),
            );
        }
        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    fn upload(filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/resumes")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send_raw(app: &Router, req: Request<Body>) -> (StatusCode, header::HeaderMap, Bytes) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = send_raw(app, req).await;
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }

    const RESUME: &[&str] = &[
        "Jane Doe",
        "jane@example.com",
        "SKILLS",
        "Python, SQL",
        "EXPERIENCE",
        "Software Engineer at Acme",
        "Jan 2020 - Dec 2021",
        "EDUCATION",
        "Bachelor of Science, MIT, 2019",
    ];

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(&app(&dir), empty_request("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resume-ranker-api");
    }

    #[tokio::test]
    async fn test_txt_upload_is_rejected_and_nothing_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let (status, body) = send(&app, upload("resume.txt", b"Jane Doe\nPython")).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_FORMAT");

        let (_, list) = send(&app, empty_request("GET", "/api/v1/resumes")).await;
        assert_eq!(list["resumes"], json!([]));
        assert!(!dir.path().join("uploads").exists());
        assert!(!dir.path().join("resumes.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(&app(&dir), upload("cv.pdf", b"definitely not a pdf")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "CORRUPT_DOCUMENT");
        assert!(!dir.path().join("resumes.json").exists());
    }

    #[tokio::test]
    async fn test_oversized_upload_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_data_dir(dir.path());
        config.max_upload_bytes = 256;
        let app = build_router(AppState::new(config, Dictionary::default()).unwrap());

        let (status, body) = send(&app, upload("cv.docx", &docx_bytes(RESUME))).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert!(!dir.path().join("resumes.json").exists());
    }

    #[tokio::test]
    async fn test_missing_records_are_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);
        let missing = uuid::Uuid::new_v4();

        let (status, _) = send(&app, empty_request("GET", &format!("/api/v1/resumes/{missing}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/match",
                json!({"resume_id": missing, "job_id": missing}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/applications",
                json!({"resume_id": missing, "job_id": missing}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_job_requires_title() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            &app(&dir),
            json_request("POST", "/api/v1/jobs", json!({"title": " ", "description": "Python"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_full_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);
        let original = docx_bytes(RESUME);

        // Upload
        let (status, resume) = send(&app, upload("jane.docx", &original)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(resume["name"], "Jane Doe");
        assert_eq!(resume["education"][0]["institution"], "MIT");
        let resume_id = resume["id"].as_str().unwrap().to_string();

        let (status, fetched) =
            send(&app, empty_request("GET", &format!("/api/v1/resumes/{resume_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["filename"], "jane.docx");

        let (status, headers, bytes) = send_raw(
            &app,
            empty_request("GET", &format!("/api/v1/resumes/{resume_id}/download")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes.as_ref(), original.as_slice());
        assert!(headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("jane.docx"));

        // Job
        let (status, job) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/jobs",
                json!({
                    "title": "Backend Engineer",
                    "company": "Globex",
                    "description": "Must know Python and Java. Bachelor's degree required."
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(job["required_skills"], json!(["Python", "Java"]));
        let job_id = job["id"].as_str().unwrap().to_string();

        // Match
        let (status, result) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/match",
                json!({"resume_id": resume_id, "job_id": job_id}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["scores"]["skills"], 0.5);
        assert_eq!(result["missing_skills"], json!(["Java"]));

        // Applications
        let (status, application) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/applications",
                json!({"resume_id": resume_id, "job_id": job_id, "notes": "referral"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(application["status"], "Applied");
        assert!(application["match_score"].as_f64().unwrap() > 0.0);
        let application_id = application["id"].as_str().unwrap().to_string();

        let (status, updated) = send(
            &app,
            json_request(
                "PUT",
                &format!("/api/v1/applications/{application_id}"),
                json!({"status": "Interviewing"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "Interviewing");
        assert_eq!(updated["notes"], "referral");

        // Dashboard
        let (_, stats) = send(&app, empty_request("GET", "/api/v1/dashboard/stats")).await;
        assert_eq!(stats["total_resumes"], 1);
        assert_eq!(stats["total_jobs"], 1);
        assert_eq!(stats["total_applications"], 1);
        assert_eq!(stats["applications_by_status"]["Interviewing"], 1);

        let (_, activity) = send(&app, empty_request("GET", "/api/v1/dashboard/activity")).await;
        assert_eq!(activity.as_array().unwrap().len(), 3);

        // Deletes
        let (status, _) = send(
            &app,
            empty_request("DELETE", &format!("/api/v1/applications/{application_id}")),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, stats) = send(&app, empty_request("GET", "/api/v1/dashboard/stats")).await;
        assert_eq!(stats["total_applications"], 0);
        assert_eq!(stats["average_match_score"], 0.0);

        let (status, _) =
            send(&app, empty_request("DELETE", &format!("/api/v1/resumes/{resume_id}"))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) =
            send(&app, empty_request("GET", &format!("/api/v1/resumes/{resume_id}/download"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Jobs survive resume deletion.
        let (status, _) = send(&app, empty_request("GET", &format!("/api/v1/jobs/{job_id}"))).await;
        assert_eq!(status, StatusCode::OK);
    }
}
