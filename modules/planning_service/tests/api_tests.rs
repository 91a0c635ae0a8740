//! REST surface: authentication, status codes and Problem Details bodies

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::*;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use planning_service::api::rest::{register_routes, Claims, JwtVerifier};
use planning_service::config::Config;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "api-test-secret-0123456789abcdef-xyz";

fn token(subject: &str, roles: &[&str]) -> String {
    let claims = Claims {
        sub: subject.to_string(),
        name: Some(format!("Usuario {subject}")),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: (chrono::Utc::now().timestamp() + 3600) as u64,
        iss: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

struct Api {
    router: Router,
    env: TestEnv,
}

async fn api() -> Api {
    api_with(Config::default()).await
}

async fn api_with(config: Config) -> Api {
    let env = setup_with(config, |_| {}).await;
    let verifier = Arc::new(JwtVerifier::new(SECRET, None));
    let router = register_routes(Router::new(), env.service.clone(), verifier);
    Api { router, env }
}

impl Api {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec(), headers)
    }

    async fn json(
        &self,
        method: Method,
        uri: &str,
        roles: &[&str],
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token("user-1", roles)));
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let (status, bytes, _) = self.send(builder.body(body).unwrap()).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

fn plan_body(code: &str) -> Value {
    json!({
        "code": code,
        "name": "Plan Estratégico Institucional",
        "institution": "Ministerio de Salud",
        "start_date": "2025-01-01",
        "end_date": "2028-12-31"
    })
}

#[tokio::test]
async fn requests_without_valid_token_are_unauthorized() {
    let api = api().await;

    let (status, body, headers) = api
        .send(Request::get("/api/plans").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers[header::CONTENT_TYPE], "application/problem+json");
    let problem: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(problem["status"], 401);
    assert_eq!(problem["detail"], "Missing Authorization header");
    assert_eq!(problem["instance"], "/api/plans");

    let (status, body, _) = api
        .send(
            Request::get("/api/plans")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let problem: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(problem["detail"], "Expected a Bearer token");

    let (status, _, _) = api
        .send(
            Request::get("/api/plans")
                .header(header::AUTHORIZATION, "Bearer not.a.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Health stays open
    let (status, _, _) = api
        .send(Request::get("/api/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn plan_lifecycle_over_http() {
    let api = api().await;

    let (status, created) = api
        .json(Method::POST, "/api/plans", &["PLANNER"], Some(plan_body("PEI-MSP")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "DRAFT");
    assert_eq!(created["created_by"], "user-1");
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = api
        .json(Method::GET, &format!("/api/plans/{id}"), &["AUDITOR"], None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["code"], "PEI-MSP");

    let (status, problem) = api
        .json(Method::POST, "/api/plans", &["PLANNER"], Some(plan_body("PEI-MSP")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(problem["title"], "Conflict");

    let (status, updated) = api
        .json(
            Method::PUT,
            &format!("/api/plans/{id}"),
            &["ADMIN"],
            Some(json!({ "status": "APPROVED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "APPROVED");
    assert_eq!(updated["name"], "Plan Estratégico Institucional");

    let (status, list) = api
        .json(Method::GET, "/api/plans?status=APPROVED&limit=10", &["AUDITOR"], None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    assert_eq!(list["limit"], 10);
    assert_eq!(list["items"][0]["id"], id);

    let (status, body) = api
        .json(Method::DELETE, &format!("/api/plans/{id}"), &["PLANNER"], None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, problem) = api
        .json(Method::GET, &format!("/api/plans/{id}"), &["PLANNER"], None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(problem["title"], "plan Not Found");

    let (status, _) = api
        .json(Method::DELETE, &format!("/api/plans/{id}"), &["PLANNER"], None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn forbidden_roles_get_403() {
    let api = api().await;

    let (status, problem) = api
        .json(Method::POST, "/api/plans", &["AUDITOR"], Some(plan_body("PEI-X")))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(problem["status"], 403);

    let (status, _) = api
        .json(
            Method::POST,
            "/api/ods-goals",
            &["PLANNER"],
            Some(json!({ "code": "ODS-3", "number": 3, "name": "Salud y bienestar" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = api
        .json(
            Method::POST,
            "/api/ods-goals",
            &["ADMIN"],
            Some(json!({ "code": "ODS-3", "number": 3, "name": "Salud y bienestar" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn bad_input_is_400_problem() {
    let api = api().await;

    let mut body = plan_body("PEI-BAD");
    body["status"] = json!("ACTIVE");
    body["end_date"] = json!("2024-01-01");
    let (status, problem) = api
        .json(Method::POST, "/api/plans", &["PLANNER"], Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["title"], "Validation Error");
    assert_eq!(problem["errors"][0]["field"], "status");

    // The enum parses; field rules run next
    let mut body = plan_body("PEI-BAD");
    body["end_date"] = json!("2024-01-01");
    let (status, problem) = api
        .json(Method::POST, "/api/plans", &["PLANNER"], Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["errors"][0]["field"], "end_date");

    let (status, bytes, headers) = api
        .send(
            Request::post("/api/plans")
                .header(header::AUTHORIZATION, format!("Bearer {}", token("u", &["PLANNER"])))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"code\": "))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers[header::CONTENT_TYPE], "application/problem+json");
    let problem: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(problem["title"], "Invalid Request Body");

    let (status, _) = api
        .json(Method::GET, "/api/plans/abc", &["PLANNER"], None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn body_shape_mismatch_is_400_with_field() {
    let api = api().await;

    let mut body = plan_body("PEI-SHAPE");
    body.as_object_mut().unwrap().remove("name");
    let (status, problem) = api
        .json(Method::POST, "/api/plans", &["PLANNER"], Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["title"], "Validation Error");
    assert_eq!(problem["errors"][0]["field"], "name");
    assert_eq!(problem["errors"][0]["message"], "missing field `name`");

    let plan = seed_plan(&api.env.service, "PEI-SHAPE").await;
    let objective = seed_objective(&api.env.service, plan.id, "OE-SHAPE").await;
    let pnd = seed_pnd(&api.env.service, "PND-SHAPE").await;
    let ods = seed_ods(&api.env.service, 6).await;
    let (status, problem) = api
        .json(
            Method::PUT,
            &format!("/api/strategic-objectives/{}/alignments", objective.id),
            &["PLANNER"],
            Some(json!({ "alignments": [
                { "pnd_objective_id": pnd.id, "ods_goal_id": ods.id, "weight": "60" }
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["errors"][0]["field"], "alignments[0].weight");
    assert!(api.env.events.event_types().iter().all(|t| *t != "alignments_replaced"));

    // Without a JSON content type the body is refused outright
    let (status, bytes, _) = api
        .send(
            Request::post("/api/plans")
                .header(header::AUTHORIZATION, format!("Bearer {}", token("u", &["PLANNER"])))
                .body(Body::from(plan_body("PEI-TEXT").to_string()))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let problem: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(problem["status"], 415);
}

#[tokio::test]
async fn huge_offset_lists_nothing() {
    let api = api().await;
    seed_plan(&api.env.service, "PEI-OFFSET").await;

    let (status, list) = api
        .json(Method::GET, "/api/plans?offset=18446744073709551615", &["AUDITOR"], None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    assert_eq!(list["offset"], i64::MAX);
    assert_eq!(list["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn alignment_set_replacement_over_http() {
    let api = api().await;
    let plan = seed_plan(&api.env.service, "PEI-HTTP").await;
    let objective = seed_objective(&api.env.service, plan.id, "OE-HTTP").await;
    let pnd_a = seed_pnd(&api.env.service, "PND-A").await;
    let pnd_b = seed_pnd(&api.env.service, "PND-B").await;
    let ods_a = seed_ods(&api.env.service, 4).await;
    let ods_b = seed_ods(&api.env.service, 5).await;
    let uri = format!("/api/strategic-objectives/{}/alignments", objective.id);

    let (status, summary) = api
        .json(
            Method::PUT,
            &uri,
            &["PLANNER"],
            Some(json!({ "alignments": [
                { "pnd_objective_id": pnd_a.id, "ods_goal_id": ods_a.id, "weight": 60 },
                { "pnd_objective_id": pnd_b.id, "ods_goal_id": ods_b.id, "weight": 40 }
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["is_complete"], true);
    assert_eq!(summary["total_weight"], 100.0);
    assert_eq!(summary["alignments"].as_array().unwrap().len(), 2);

    let (status, problem) = api
        .json(
            Method::PUT,
            &uri,
            &["PLANNER"],
            Some(json!({ "alignments": [
                { "pnd_objective_id": pnd_a.id, "ods_goal_id": ods_a.id, "weight": 59 },
                { "pnd_objective_id": pnd_b.id, "ods_goal_id": ods_b.id, "weight": 40 }
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["errors"][0]["field"], "alignments");

    let (status, problem) = api
        .json(
            Method::PUT,
            &uri,
            &["PLANNER"],
            Some(json!({ "alignments": [
                { "pnd_objective_id": pnd_a.id, "ods_goal_id": ods_a.id, "weight": 50 },
                { "pnd_objective_id": pnd_a.id, "ods_goal_id": ods_a.id, "weight": 50 }
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(problem["detail"].as_str().unwrap().contains("duplicate"));

    let (status, summary) = api.json(Method::GET, &uri, &["AUDITOR"], None).await;
    assert_eq!(status, StatusCode::OK);
    let weights: Vec<f64> = summary["alignments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["weight"].as_f64().unwrap())
        .collect();
    assert_eq!(weights, vec![60.0, 40.0]);

    let (status, _) = api
        .json(Method::GET, "/api/strategic-objectives/9999/alignments", &["AUDITOR"], None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn attachment_upload_and_download_over_http() {
    let api = api_with(Config {
        max_attachment_size: 64,
        ..Config::default()
    })
    .await;
    let project = seed_project_chain(&api.env.service).await;
    let planner_token = format!("Bearer {}", token("planner-9", &["PLANNER"]));

    let (status, bytes, _) = api
        .send(
            Request::post(format!(
                "/api/projects/{}/attachments?file_name=informe%20final.pdf",
                project.id
            ))
            .header(header::AUTHORIZATION, &planner_token)
            .header(header::CONTENT_TYPE, "application/pdf")
            .body(Body::from("%PDF-1.7 contenido"))
            .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let attachment: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(attachment["file_name"], "informe final.pdf");
    assert_eq!(attachment["size_bytes"], 18);
    assert!(attachment.get("storage_key").is_none());
    let id = attachment["id"].as_i64().unwrap();

    let (status, bytes, headers) = api
        .send(
            Request::get(format!("/api/attachments/{id}/content"))
                .header(header::AUTHORIZATION, &planner_token)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"%PDF-1.7 contenido");
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"informe final.pdf\""
    );

    // Over the limit but within the body allowance: rejected by the size rule
    let (status, bytes, _) = api
        .send(
            Request::post(format!("/api/projects/{}/attachments?file_name=big.pdf", project.id))
                .header(header::AUTHORIZATION, &planner_token)
                .body(Body::from(vec![b'x'; 65]))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let problem: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(problem["errors"][0]["field"], "content");

    // Far over the limit: the body is never buffered
    let (status, _, _) = api
        .send(
            Request::post(format!("/api/projects/{}/attachments?file_name=huge.pdf", project.id))
                .header(header::AUTHORIZATION, &planner_token)
                .body(Body::from(vec![b'x'; 64 + 4096]))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    // file_name is required
    let (status, _, _) = api
        .send(
            Request::post(format!("/api/projects/{}/attachments", project.id))
                .header(header::AUTHORIZATION, &planner_token)
                .body(Body::from("abc"))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(api.env.store.len(), 1);
}

#[tokio::test]
async fn me_and_openapi_endpoints() {
    let api = api().await;

    let (status, me) = api
        .json(Method::GET, "/api/me", &["PLANNER", "REVIEWER", "GUEST"], None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["subject"], "user-1");
    assert_eq!(me["display_name"], "Usuario user-1");
    assert_eq!(me["roles"], json!(["PLANNER", "REVIEWER"]));

    let (status, bytes, _) = api
        .send(Request::get("/api/openapi.json").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(doc["info"]["title"], "SIPeIP Planning API");
    assert!(doc["components"]["schemas"]["AlignmentSummaryDto"].is_object());
}
