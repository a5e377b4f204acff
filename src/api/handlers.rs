//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use super::AppState;
use super::error::ApiError;
use super::types::{
    AllocateRequest, AllocateResponse, CredentialsRequest, HistoryResponse, MessageResponse,
    TokenResponse,
};
use crate::allocation::{AllocationRequest, allocate as run_allocation, check_request};
use crate::appliances::ApplianceRating;
use crate::auth;
use crate::io::export::{REPORT_FILE_NAME, to_csv_string};
use crate::report::{ChartBar, UsageReport};
use crate::store::ConsumptionRow;

/// Lists the appliance catalog in menu order.
///
/// `GET /appliances` → 200 + `[{name, watts}]`
pub async fn list_appliances(State(state): State<Arc<AppState>>) -> Json<Vec<ApplianceRating>> {
    Json(state.catalog.iter().cloned().collect())
}

/// `POST /register` → 201, or 400 / 409 on policy or duplicate errors.
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(body) = body?;
    blocking(&state, move |state| {
        auth::register(
            state.store.as_ref(),
            &body.user_id,
            &body.password,
            &state.policy,
        )
        .map_err(ApiError::from)
    })
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "registration successful, please login".to_string(),
        }),
    ))
}

/// `POST /login` → 200 + bearer token, or 401.
///
/// A successful login replaces any session the user already had.
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(body) = body?;
    blocking(&state, move |state| {
        auth::login(state.store.as_ref(), &body.user_id, &body.password)?;
        let token = state.sessions.issue(&body.user_id);
        Ok(Json(TokenResponse {
            token,
            user_id: body.user_id,
        }))
    })
    .await
}

/// `POST /logout` → 204, clearing the caller's session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = bearer_token(&headers).ok_or_else(missing_token)?;
    if !state.sessions.revoke(token) {
        return Err(ApiError::Unauthorized("session expired".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Splits the reading across the selected appliances and records the result.
///
/// `POST /allocate` → 200 + `AllocateResponse`
pub async fn allocate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<AllocateRequest>, JsonRejection>,
) -> Result<Json<AllocateResponse>, ApiError> {
    let user_id = authenticate(&state, &headers)?;
    let Json(body) = body?;
    let request = AllocationRequest::from(body);
    check_request(&request)?;

    for line in &request.lines {
        if !state.catalog.contains(&line.name) {
            tracing::warn!(appliance = %line.name, "appliance not in catalog, weighted as 0 W");
        }
    }

    let result = run_allocation(&state.catalog, &request);
    let rows = ConsumptionRow::from_result(&result);
    let owner = user_id.clone();
    blocking(&state, move |state| {
        state.store.append_rows(&owner, &rows).map_err(ApiError::from)
    })
    .await?;
    tracing::info!(
        user_id = %user_id,
        lines = result.len(),
        total_energy = result.total_energy,
        "allocation recorded"
    );

    let report = UsageReport::new(&result, &state.report);
    let chart = report.chart_series();
    Ok(Json(AllocateResponse { report, chart }))
}

/// `GET /history` → 200 + the caller's recorded rows in insertion order.
pub async fn history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<HistoryResponse>, ApiError> {
    let user_id = authenticate(&state, &headers)?;
    let rows = query_history(&state, &user_id).await?;
    let chart = ChartBar::from_rows(&rows);
    Ok(Json(HistoryResponse {
        user_id,
        rows,
        chart,
    }))
}

/// `GET /history.csv` → 200 + CSV attachment.
pub async fn history_csv(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = authenticate(&state, &headers)?;
    let rows = query_history(&state, &user_id).await?;
    let body = to_csv_string(&rows).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((
        [
            (CONTENT_TYPE, "text/csv".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILE_NAME}\""),
            ),
        ],
        body,
    ))
}

/// Runs store work on the blocking pool; file-backed stores do synchronous
/// I/O under a lock.
async fn blocking<T, F>(state: &Arc<AppState>, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppState) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || work(&state))
        .await
        .map_err(|e| ApiError::Internal(format!("store task failed: {e}")))?
}

async fn query_history(
    state: &Arc<AppState>,
    user_id: &str,
) -> Result<Vec<ConsumptionRow>, ApiError> {
    let user_id = user_id.to_string();
    blocking(state, move |state| {
        state.store.query_rows(&user_id).map_err(ApiError::from)
    })
    .await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn missing_token() -> ApiError {
    ApiError::Unauthorized("login required".to_string())
}

/// Resolves the caller's user id from the bearer token.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<String, ApiError> {
    let token = bearer_token(headers).ok_or_else(missing_token)?;
    state.sessions.resolve(token).ok_or_else(missing_token)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::appliances::ApplianceCatalog;
    use crate::auth::PasswordPolicy;
    use crate::report::ReportSettings;
    use crate::store::MemoryStore;

    fn make_test_state() -> Arc<AppState> {
        Arc::new(AppState::new(
            ApplianceCatalog::builtin(),
            Arc::new(MemoryStore::new()),
            ReportSettings::default(),
            PasswordPolicy::default(),
        ))
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json");
        if let Some(t) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {t}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn logged_in(state: &Arc<AppState>) -> String {
        auth::register(
            state.store.as_ref(),
            "alice",
            "longenough",
            &PasswordPolicy::default(),
        )
        .unwrap();
        state.sessions.issue("alice")
    }

    #[tokio::test]
    async fn appliances_lists_catalog() {
        let app = router(make_test_state());
        let req = Request::builder()
            .uri("/appliances")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 15);
        assert_eq!(items[0]["name"], "Air Conditioner");
        assert_eq!(items[0]["watts"], 2000);
    }

    #[tokio::test]
    async fn register_returns_201_then_409() {
        let app = router(make_test_state());
        let body = r#"{"user_id":"alice","password":"longenough"}"#;

        let resp = app
            .clone()
            .oneshot(json_request("POST", "/register", None, body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = app
            .oneshot(json_request("POST", "/register", None, body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "user already exists");
    }

    #[tokio::test]
    async fn register_short_password_returns_400() {
        let app = router(make_test_state());
        let resp = app
            .oneshot(json_request(
                "POST",
                "/register",
                None,
                r#"{"user_id":"bob","password":"short"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_with_missing_field_returns_json_400() {
        let app = router(make_test_state());
        let resp = app
            .oneshot(json_request(
                "POST",
                "/register",
                None,
                r#"{"user_id":"a"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("password"));
    }

    #[tokio::test]
    async fn allocate_with_wrong_types_returns_json_400() {
        let state = make_test_state();
        let token = logged_in(&state);
        let resp = router(state.clone())
            .oneshot(json_request(
                "POST",
                "/allocate",
                Some(&token),
                r#"{"appliances":[{"name":"TV","quantity":"one"}],"total_energy":"lots"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"].is_string());
        assert!(state.store.query_rows("alice").unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_login_revokes_first_token() {
        let state = make_test_state();
        let first = logged_in(&state);
        let app = router(state.clone());
        let creds = r#"{"user_id":"alice","password":"longenough"}"#;

        let resp = app
            .clone()
            .oneshot(json_request("POST", "/login", None, creds))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let second = body_json(resp).await["token"].as_str().unwrap().to_string();

        let resp = app
            .oneshot(json_request("GET", "/history", Some(&first), ""))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(state.sessions.resolve(&second).as_deref(), Some("alice"));
        assert_eq!(state.sessions.len(), 1);
    }

    #[tokio::test]
    async fn login_with_bad_password_returns_401() {
        let state = make_test_state();
        logged_in(&state);
        let resp = router(state)
            .oneshot(json_request(
                "POST",
                "/login",
                None,
                r#"{"user_id":"alice","password":"wrongpassword"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn allocate_requires_session() {
        let app = router(make_test_state());
        let resp = app
            .oneshot(json_request(
                "POST",
                "/allocate",
                None,
                r#"{"appliances":[{"name":"TV","quantity":1}],"total_energy":37.5}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn allocate_returns_report_and_records_rows() {
        let state = make_test_state();
        let token = logged_in(&state);
        let app = router(state.clone());

        let resp = app
            .oneshot(json_request(
                "POST",
                "/allocate",
                Some(&token),
                r#"{"appliances":[{"name":"Refrigerator","quantity":1},{"name":"Fan","quantity":2}],"total_energy":100.0}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["lines"][0]["share"], 50.0);
        assert_eq!(json["lines"][1]["share"], 50.0);
        assert_eq!(json["lines"][1]["quantity"], 2);
        assert_eq!(json["total_energy"], 100.0);
        assert!((json["monthly_cost"].as_f64().unwrap() - 1090.0).abs() < 1e-9);
        assert_eq!(json["chart"][0]["label"], "Refrigerator");
        assert!(json["tips"].as_array().unwrap().is_empty());

        let rows = state.store.query_rows("alice").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].appliance, "Refrigerator");
    }

    #[tokio::test]
    async fn allocate_rejects_empty_selection() {
        let state = make_test_state();
        let token = logged_in(&state);
        let resp = router(state)
            .oneshot(json_request(
                "POST",
                "/allocate",
                Some(&token),
                r#"{"appliances":[],"total_energy":10.0}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "select at least one appliance");
    }

    #[tokio::test]
    async fn history_csv_is_attachment() {
        let state = make_test_state();
        let token = logged_in(&state);
        state
            .store
            .append_rows(
                "alice",
                &[ConsumptionRow {
                    appliance: "TV".to_string(),
                    quantity: 1,
                    share_kwh: 37.5,
                }],
            )
            .unwrap();

        let resp = router(state)
            .oneshot(json_request("GET", "/history.csv", Some(&token), ""))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/csv");
        assert!(
            resp.headers()[CONTENT_DISPOSITION]
                .to_str()
                .unwrap()
                .contains("usage_report.csv")
        );

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(text, "Appliance,Quantity,Power (Wh)\nTV,1,37.5000\n");
    }

    #[tokio::test]
    async fn logout_invalidates_token() {
        let state = make_test_state();
        let token = logged_in(&state);
        let app = router(state);

        let resp = app
            .clone()
            .oneshot(json_request("POST", "/logout", Some(&token), ""))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = app
            .oneshot(json_request("GET", "/history", Some(&token), ""))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());
        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(bearer_token(&headers).is_none());
        headers.insert(AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }
}
