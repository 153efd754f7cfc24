use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

mod handlers;
pub mod reps;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(handlers::get_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/import",
            post(handlers::import_transactions),
        )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::{
        ledger::services::LedgerService,
        repos::memory::InMemoryLedger,
        server::{self, AppState, UploadDirectory},
    };

    const BOUNDARY: &str = "bookkeeper-test-boundary";

    fn app(ledger: &InMemoryLedger, uploads: &TempDir) -> Router {
        let state = AppState::new(
            LedgerService::new(Arc::new(ledger.clone())),
            UploadDirectory::new(uploads.path().to_path_buf()),
        );

        server::router(state)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should be valid")
    }

    fn multipart_request(field: &str, contents: &str) -> Request<Body> {
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"import.csv\"\r\n\
             Content-Type: text/csv\r\n\
             \r\n\
             {contents}\r\n\
             --{boundary}--\r\n",
            boundary = BOUNDARY,
            field = field,
            contents = contents,
        );

        Request::builder()
            .method(Method::POST)
            .uri("/ledger/transactions/import")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .expect("request should be valid")
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = hyper::body::to_bytes(response.into_body())
            .await
            .expect("body should be readable");

        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[tokio::test]
    async fn create_and_list_transactions() {
        let ledger = InMemoryLedger::new();
        let uploads = tempfile::tempdir().expect("could not create temp dir");
        let app = app(&ledger, &uploads);

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/ledger/transactions",
                json!({"title": "Salary", "value": 1000, "type": "income", "category": "Job"}),
            ))
            .await
            .expect("request should be handled");

        assert_eq!(StatusCode::CREATED, response.status());
        let created = body_json(response).await;
        assert_eq!(json!("Salary"), created["title"]);
        assert_eq!(json!("Job"), created["category"]["title"]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/ledger/transactions")
                    .body(Body::empty())
                    .expect("request should be valid"),
            )
            .await
            .expect("request should be handled");

        assert_eq!(StatusCode::OK, response.status());
        let ledger_rep = body_json(response).await;
        assert_eq!(1, ledger_rep["transactions"].as_array().map_or(0, Vec::len));
        assert_eq!(json!("1000"), ledger_rep["balance"]["total"]);
    }

    #[tokio::test]
    async fn create_outcome_without_balance_is_bad_request() {
        let ledger = InMemoryLedger::new();
        let uploads = tempfile::tempdir().expect("could not create temp dir");

        let response = app(&ledger, &uploads)
            .oneshot(json_request(
                Method::POST,
                "/ledger/transactions",
                json!({"title": "Rent", "value": 500, "type": "outcome", "category": "Housing"}),
            ))
            .await
            .expect("request should be handled");

        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        let error = body_json(response).await;
        assert!(error["message"]
            .as_str()
            .map_or(false, |message| message.contains("insufficient balance")));
        assert!(ledger.categories().is_empty());
    }

    #[tokio::test]
    async fn import_uploaded_file() {
        let ledger = InMemoryLedger::new();
        let uploads = tempfile::tempdir().expect("could not create temp dir");

        let response = app(&ledger, &uploads)
            .oneshot(multipart_request(
                "file",
                "title,type,value,category\nCoffee,outcome,5,Food\nCoffee,outcome,5,Food\n,,,",
            ))
            .await
            .expect("request should be handled");

        assert_eq!(StatusCode::CREATED, response.status());
        let imported = body_json(response).await;
        assert_eq!(2, imported.as_array().map_or(0, Vec::len));
        assert_eq!(1, ledger.categories().len());

        let leftover_uploads = std::fs::read_dir(uploads.path())
            .expect("upload directory should exist")
            .count();
        assert_eq!(0, leftover_uploads);
    }

    #[tokio::test]
    async fn import_without_file_field_is_bad_request() {
        let ledger = InMemoryLedger::new();
        let uploads = tempfile::tempdir().expect("could not create temp dir");

        let response = app(&ledger, &uploads)
            .oneshot(multipart_request("attachment", "title,type,value,category\n"))
            .await
            .expect("request should be handled");

        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        assert!(ledger.transactions().is_empty());
    }
}
