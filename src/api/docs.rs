use crate::api::handlers;
use crate::types::{AskForm, AskResponse, ErrorResponse, QuestionContext, TestResponse};
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sensei API",
        description = "Math tutor backed by a language model with Wolfram Alpha access"
    ),
    paths(handlers::health::test, handlers::ask::ask),
    components(schemas(AskForm, AskResponse, TestResponse, ErrorResponse, QuestionContext)),
    tags(
        (name = "health", description = "Liveness"),
        (name = "tutor", description = "Question answering")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
