//! Route registration

use super::auth::JwtVerifier;
use super::handlers;
use crate::contract::*;
use crate::domain::Service;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;

/// Body allowance on top of the attachment maximum, so an oversized upload
/// reaches the size check instead of failing extraction
const UPLOAD_BODY_SLACK: usize = 1024;

/// `GET/POST {path}` and `GET/PUT/DELETE {path}/{id}` for a record type
macro_rules! crud_routes {
    ($router:expr, $path:literal, $record:ty) => {
        $router
            .route(
                $path,
                get(handlers::list::<$record>).post(handlers::create::<$record>),
            )
            .route(
                concat!($path, "/{id}"),
                get(handlers::get::<$record>)
                    .put(handlers::update::<$record>)
                    .delete(handlers::delete::<$record>),
            )
    };
}

/// Register all REST routes under `/api`
pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    verifier: Arc<JwtVerifier>,
) -> Router {
    let upload_limit = service
        .config()
        .max_attachment_size
        .saturating_add(UPLOAD_BODY_SLACK);

    let router = crud_routes!(router, "/api/plans", InstitutionalPlan);
    let router = crud_routes!(router, "/api/strategic-objectives", StrategicObjective);
    let router = crud_routes!(router, "/api/pnd-objectives", PndObjective);
    let router = crud_routes!(router, "/api/ods-goals", OdsGoal);
    let router = crud_routes!(router, "/api/alignments", ObjectiveAlignment);
    let router = crud_routes!(router, "/api/programs", Program);
    let router = crud_routes!(router, "/api/projects", Project);
    let router = crud_routes!(router, "/api/activities", Activity);
    let router = crud_routes!(router, "/api/indicators", Indicator);
    let router = crud_routes!(router, "/api/goals", Goal);
    let router = crud_routes!(router, "/api/typologies", Typology);
    let router = crud_routes!(router, "/api/sectors", Sector);
    let router = crud_routes!(router, "/api/observations", ProjectObservation);

    router
        // Alignment sets
        .route(
            "/api/strategic-objectives/{id}/alignments",
            get(handlers::alignment_summary).put(handlers::replace_alignments),
        )
        // Attachments
        .route(
            "/api/projects/{id}/attachments",
            post(handlers::upload_attachment).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/attachments", get(handlers::list::<Attachment>))
        .route(
            "/api/attachments/{id}",
            get(handlers::get::<Attachment>)
                .put(handlers::update::<Attachment>)
                .delete(handlers::delete::<Attachment>),
        )
        .route(
            "/api/attachments/{id}/content",
            get(handlers::attachment_content),
        )
        // Session and service endpoints
        .route("/api/me", get(handlers::me))
        .route("/api/health", get(handlers::health))
        .route("/api/openapi.json", get(handlers::openapi))
        .layer(Extension(service))
        .layer(Extension(verifier))
}
