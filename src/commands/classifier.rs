use crate::error::AppError;
use crate::models::classify_types::{Classification, ModelStatus};
use crate::state::SharedState;
use axum::extract::{Multipart, State};
use axum::response::Html;
use axum::Json;
use tracing::{debug, info};

const UPLOAD_FIELD: &str = "file";
const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /api/status
pub async fn get_model_status(State(state): State<SharedState>) -> Json<ModelStatus> {
    Json(state.model_manager.status())
}

/// POST /api/predict - multipart upload with a single `file` field
pub async fn predict_image(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<Classification>, AppError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("Failed to read upload: {}", e)))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| AppError::bad_request("Missing `file` field in upload"))?;
    if bytes.is_empty() {
        return Err(AppError::bad_request("Uploaded file is empty"));
    }

    debug!("Classifying {} ({} bytes)", file_name, bytes.len());
    let result = state.model_manager.classify(bytes.to_vec()).await?;
    info!("{}: {} ({:.2}%)", file_name, result.label, result.confidence);

    Ok(Json(result))
}
