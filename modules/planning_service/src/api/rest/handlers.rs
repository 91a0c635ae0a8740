//! HTTP request handlers - thin layer that delegates to domain service

use super::auth::Authenticated;
use super::dto::*;
use super::error::Problem;
use super::mapper::IntoDomain;
use super::openapi::ApiDoc;
use super::resource::{RestCreate, RestResource};
use crate::contract::AlignmentTarget;
use crate::domain::Service;
use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;
use utoipa::OpenApi;

type ApiResult<T> = Result<T, Problem>;

// ===== Generic record handlers =====

/// List live records with filters and paging
pub async fn list<R: RestResource>(
    Authenticated(ctx): Authenticated,
    Extension(service): Extension<Arc<Service>>,
    page: Result<Query<PageQuery>, QueryRejection>,
    query: Result<Query<R::QueryParams>, QueryRejection>,
) -> ApiResult<Json<ListResponse<R::Dto>>> {
    let Query(page) = page?;
    let Query(query) = query?;
    let filter = query.into_domain()?;

    let paged = service.list::<R>(&ctx, filter, page.into()).await?;
    Ok(Json(paged.into()))
}

/// Get one live record
pub async fn get<R: RestResource>(
    Authenticated(ctx): Authenticated,
    Extension(service): Extension<Arc<Service>>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<R::Dto>> {
    let Path(id) = id?;
    let record = service.get::<R>(&ctx, id).await?;
    Ok(Json(record.into()))
}

/// Create a record
pub async fn create<R: RestCreate>(
    Authenticated(ctx): Authenticated,
    Extension(service): Extension<Arc<Service>>,
    body: Result<Json<R::CreateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<R::Dto>)> {
    let Json(req) = body?;
    let record = service.create::<R>(&ctx, req.into_domain()?).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Partially update a record
pub async fn update<R: RestResource>(
    Authenticated(ctx): Authenticated,
    Extension(service): Extension<Arc<Service>>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<R::UpdateRequest>, JsonRejection>,
) -> ApiResult<Json<R::Dto>> {
    let Path(id) = id?;
    let Json(req) = body?;
    let record = service.update::<R>(&ctx, id, req.into_domain()?).await?;
    Ok(Json(record.into()))
}

/// Soft delete a record
pub async fn delete<R: RestResource>(
    Authenticated(ctx): Authenticated,
    Extension(service): Extension<Arc<Service>>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    service.delete::<R>(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Alignment Handlers =====

/// Current alignments of a strategic objective with their total weight
pub async fn alignment_summary(
    Authenticated(ctx): Authenticated,
    Extension(service): Extension<Arc<Service>>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<AlignmentSummaryDto>> {
    let Path(id) = id?;
    let summary = service.alignment_summary(&ctx, id).await?;
    Ok(Json(summary.into()))
}

/// Replace the whole alignment set of a strategic objective
pub async fn replace_alignments(
    Authenticated(ctx): Authenticated,
    Extension(service): Extension<Arc<Service>>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<ReplaceAlignmentsRequest>, JsonRejection>,
) -> ApiResult<Json<AlignmentSummaryDto>> {
    let Path(id) = id?;
    let Json(req) = body?;
    let targets: Vec<AlignmentTarget> = req.alignments.into_iter().map(Into::into).collect();

    let summary = service.replace_alignments(&ctx, id, targets).await?;
    Ok(Json(summary.into()))
}

// ===== Attachment Handlers =====

/// Upload the raw request body as an attachment of a project
pub async fn upload_attachment(
    Authenticated(ctx): Authenticated,
    Extension(service): Extension<Arc<Service>>,
    project_id: Result<Path<i32>, PathRejection>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<(StatusCode, Json<AttachmentDto>)> {
    let Path(project_id) = project_id?;
    let Query(query) = query?;
    let content = body?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let attachment = service
        .upload_attachment(&ctx, project_id, &query.file_name, content_type, content)
        .await?;
    Ok((StatusCode::CREATED, Json(attachment.into())))
}

/// Download the stored content of an attachment
pub async fn attachment_content(
    Authenticated(ctx): Authenticated,
    Extension(service): Extension<Arc<Service>>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Response> {
    let Path(id) = id?;
    let stored = service.attachment_content(&ctx, id).await?;

    let content_type = HeaderValue::from_str(&stored.attachment.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        header_safe(&stored.attachment.file_name)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        stored.content,
    )
        .into_response())
}

/// Replace characters that cannot appear in a quoted header parameter
fn header_safe(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ===== Session and service endpoints =====

/// Claims of the caller
pub async fn me(Authenticated(ctx): Authenticated) -> Json<MeDto> {
    Json(ctx.into())
}

pub async fn health() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_safe_file_names() {
        assert_eq!(header_safe("informe final.pdf"), "informe final.pdf");
        assert_eq!(header_safe("a\"b\\c.pdf"), "a_b_c.pdf");
        assert_eq!(header_safe("año.xlsx"), "a_o.xlsx");
    }
}
