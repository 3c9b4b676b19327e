use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, info_span};
use uuid::Uuid;

use crate::compose::table::{build_line_item_table, RowKind};
use crate::compose::{render_quotation, resolve, CompositionError, RenderedQuotation, ResolvedQuotation};
use crate::errors::AppError;
use crate::quotation::request::QuotationRequest;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub quotation: ResolvedQuotation,
    pub table_rows: Vec<RowKind>,
    pub page_estimate: u32,
}

/// `quotation_<number>.pdf` with anything outside `[A-Za-z0-9_-]` replaced by `_`.
pub fn attachment_name(quote_number: &str) -> String {
    let safe: String = quote_number
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("quotation_{safe}.pdf")
}

/// Runs CPU-bound composition off the async executor. A panic or join failure
/// becomes one opaque composition failure.
async fn run_blocking<T, F>(render_id: Uuid, job: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CompositionError> + Send + 'static,
{
    let span = info_span!("render", %render_id);
    let outcome = tokio::task::spawn_blocking(move || span.in_scope(job))
        .await
        .map_err(|e| {
            tracing::error!(%render_id, "render task failed: {e}");
            AppError::from(CompositionError::Failure(format!("render task failed: {e}")))
        })?;
    Ok(outcome?)
}

fn pdf_response(rendered: RenderedQuotation, quote_number: &str) -> Result<Response, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    let disposition = format!("attachment; filename=\"{}\"", attachment_name(quote_number));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid disposition header: {e}")))?,
    );
    headers.insert("x-page-count", HeaderValue::from(rendered.page_count));
    headers.insert("x-page-estimate", HeaderValue::from(rendered.page_estimate));
    headers.insert(
        "x-missing-dimensions",
        HeaderValue::from(rendered.missing_dimensions.len()),
    );
    Ok((headers, rendered.bytes).into_response())
}

/// POST /api/v1/quotations/render
pub async fn handle_render(
    State(state): State<AppState>,
    Json(req): Json<QuotationRequest>,
) -> Result<Response, AppError> {
    let render_id = Uuid::new_v4();
    let input = req.into_input(&state.config)?;
    let quote_number = input.header.quote_number.clone();
    info!(%render_id, quote = %quote_number, options = input.option_count(), "render requested");

    let page = state.page_config.clone();
    let rendered = run_blocking(render_id, move || render_quotation(&input, &page)).await?;

    info!(
        %render_id,
        pages = rendered.page_count,
        estimate = rendered.page_estimate,
        missing = rendered.missing_dimensions.len(),
        "render complete"
    );
    pdf_response(rendered, &quote_number)
}

/// POST /api/v1/quotations/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(req): Json<QuotationRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let render_id = Uuid::new_v4();
    let input = req.into_input(&state.config)?;
    let preview = run_blocking(render_id, move || {
        let quotation = resolve(&input)?;
        let table_rows = build_line_item_table(&quotation).kinds;
        Ok(PreviewResponse {
            page_estimate: quotation.page_estimate,
            quotation,
            table_rows,
        })
    })
    .await?;
    Ok(Json(preview))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
