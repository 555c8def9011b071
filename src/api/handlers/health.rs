use crate::types::TestResponse;
use axum::Json;

/// Liveness check
#[utoipa::path(
    get,
    path = "/test",
    responses(
        (status = 200, description = "Service is up", body = TestResponse)
    ),
    tag = "health"
)]
pub async fn test() -> Json<TestResponse> {
    Json(TestResponse {
        message: "Foo".to_string(),
    })
}
