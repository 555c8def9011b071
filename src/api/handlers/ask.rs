use crate::{
    AppState,
    types::{AppError, AskMeta, AskResponse, ErrorResponse, Result},
};
use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};

/// The three form fields of an ask request, as received.
#[derive(Debug, Default)]
struct AskFields {
    image: Option<Bytes>,
    user_query: Option<String>,
    meta: Option<String>,
}

impl AskFields {
    /// Drain the multipart stream. Unknown fields are skipped; a repeated
    /// field keeps its last value.
    async fn read(multipart: &mut Multipart) -> Result<Self> {
        let mut fields = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => fields.image = Some(field.bytes().await.map_err(multipart_error)?),
                "user_query" => {
                    fields.user_query = Some(field.text().await.map_err(multipart_error)?)
                }
                "meta" => fields.meta = Some(field.text().await.map_err(multipart_error)?),
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(fields)
    }
}

fn missing(field: &str) -> AppError {
    AppError::MissingField(field.to_string())
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// Ask the tutor a math question
///
/// `meta` is a JSON object; `{"context": "doubt"}` selects the doubt-clearing
/// template and an optional `session_id` keeps the conversation separate from
/// other callers. The image is accepted but not interpreted.
#[utoipa::path(
    post,
    path = "/api/v1/ask",
    request_body(content = crate::types::AskForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Answer from the tutor", body = AskResponse),
        (status = 400, description = "Malformed metadata or body", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse),
        (status = 422, description = "Missing form field", body = ErrorResponse),
        (status = 502, description = "Language model or tool failure", body = ErrorResponse)
    ),
    tag = "tutor"
)]
#[tracing::instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn ask(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<AskResponse>> {
    let mut multipart =
        multipart.map_err(|e| AppError::InvalidInput(format!("Expected multipart form: {}", e)))?;
    let fields = AskFields::read(&mut multipart).await?;

    let image = fields.image.ok_or_else(|| missing("image"))?;
    let user_query = fields.user_query.ok_or_else(|| missing("user_query"))?;
    let raw_meta = fields.meta.ok_or_else(|| missing("meta"))?;

    let meta = AskMeta::parse(&raw_meta)?;

    tracing::info!(
        context = meta.context.as_str(),
        question_len = user_query.len(),
        image_bytes = image.len(),
        has_session = meta.session_id.is_some(),
        "Received question"
    );

    let memory = state.tutor.memory().resolve(meta.session_id.as_deref());
    let answer = state
        .tutor
        .answer(&user_query, meta.context, &memory)
        .await?;

    tracing::info!(answer_len = answer.len(), "Answered question");

    Ok(Json(AskResponse::success(answer)))
}
