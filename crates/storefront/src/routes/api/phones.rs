//! Phone catalog proxy routes.
//!
//! Thin translation from HTTP to [`crate::repository::PhoneRepository`]:
//! query parameters in, domain JSON or an error envelope out.

use std::str::FromStr;

use axum::{Json, extract::State};
use mobile_shop_core::{PhoneDetail, PhoneListItem, PhoneQuery};
use serde::Deserialize;

use super::{ApiPath, ApiQuery};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Raw query parameters for the phone listing.
///
/// Kept as strings so that empty values (`?limit=`) read as absent and
/// malformed numbers produce an envelope instead of a plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PhonesParams {
    pub search: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PhonesParams {
    /// Convert to a domain query.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if `limit` or `offset` is not a
    /// non-negative integer.
    pub fn into_query(self) -> Result<PhoneQuery> {
        Ok(PhoneQuery {
            search: self.search.filter(|s| !s.is_empty()),
            limit: parse_param("limit", self.limit.as_deref())?,
            offset: parse_param("offset", self.offset.as_deref())?,
        })
    }
}

fn parse_param<T: FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid {name} parameter: {value}"))),
    }
}

/// List phones, optionally filtered by `search` and paged by `limit`/`offset`.
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PhonesParams>,
) -> Result<Json<Vec<PhoneListItem>>> {
    let query = params.into_query()?;
    let phones = state.phones().list_phones(&query).await?;
    Ok(Json(phones))
}

/// Fetch a single phone by ID.
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<PhoneDetail>> {
    let phone = state.phones().get_phone(&id).await?;
    Ok(Json(phone))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::time::Duration;

    use axum::{
        Router,
        body::{Body, to_bytes},
        extract::RawQuery,
        http::{Request, StatusCode},
        routing::get,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{StorefrontConfig, UpstreamConfig};
    use crate::repository::PhoneRepository;
    use crate::routes::router;
    use crate::test_support::{HitCounter, spawn};
    use crate::upstream::UpstreamClient;

    async fn mock_upstream(hits: HitCounter) -> String {
        let list_hits = hits.clone();
        let upstream = Router::new()
            .route(
                "/products",
                get(move |RawQuery(query): RawQuery| {
                    let hits = list_hits.clone();
                    async move {
                        hits.hit();
                        match query.as_deref() {
                            Some("search=slow") => {
                                tokio::time::sleep(Duration::from_secs(30)).await;
                                (StatusCode::OK, Json(json!([])))
                            }
                            Some("search=down") => (
                                StatusCode::SERVICE_UNAVAILABLE,
                                Json(json!({ "error": "maintenance" })),
                            ),
                            _ => (
                                StatusCode::OK,
                                Json(json!([
                                    { "id": "a", "brand": "Apple", "name": "iPhone 15", "basePrice": 909, "imageUrl": "a.png" },
                                    { "id": "b", "brand": "Google", "name": "Pixel 8", "basePrice": 699.5, "imageUrl": "b.png" },
                                    { "id": "a", "brand": "Apple", "name": "iPhone 15 (dup)", "basePrice": 1, "imageUrl": "" }
                                ])),
                            ),
                        }
                    }
                }),
            )
            .route(
                "/products/{id}",
                get(move |axum::extract::Path(id): axum::extract::Path<String>| {
                    let hits = hits.clone();
                    async move {
                        hits.hit();
                        if id == "missing" {
                            (StatusCode::NOT_FOUND, Json(json!({ "error": "Product not found" })))
                        } else {
                            (StatusCode::OK, Json(json!({ "id": id, "brand": "Apple", "name": "iPhone 15" })))
                        }
                    }
                }),
            );
        let addr = spawn(upstream).await;
        format!("http://{addr}/")
    }

    fn app_for(upstream: UpstreamConfig) -> Router {
        let repository = PhoneRepository::new(
            UpstreamClient::with_timeout(Duration::from_millis(200)),
            upstream.clone(),
        );
        router(AppState::from_parts(
            StorefrontConfig::with_upstream(upstream),
            repository,
        ))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_params_empty_values_are_absent() {
        let params = PhonesParams {
            search: Some(String::new()),
            limit: Some(String::new()),
            offset: Some(" ".to_string()),
        };

        assert_eq!(params.into_query().unwrap(), PhoneQuery::default());
    }

    #[test]
    fn test_params_invalid_number() {
        let params = PhonesParams {
            limit: Some("ten".to_string()),
            ..PhonesParams::default()
        };

        let err = params.into_query().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.to_string(), "Invalid limit parameter: ten");
    }

    #[tokio::test]
    async fn test_index_returns_deduplicated_array() {
        let base_url = mock_upstream(HitCounter::default()).await;
        let app = app_for(UpstreamConfig::new(base_url, "key"));

        let (status, body) = get_json(app, "/api/phones").await;

        assert_eq!(status, StatusCode::OK);
        let phones = body.as_array().unwrap();
        assert_eq!(phones.len(), 2);
        assert_eq!(phones[0]["name"], "iPhone 15");
        assert_eq!(phones[1]["basePrice"], 699.5);
    }

    #[tokio::test]
    async fn test_index_upstream_status_passes_through() {
        let base_url = mock_upstream(HitCounter::default()).await;
        let app = app_for(UpstreamConfig::new(base_url, "key"));

        let (status, body) = get_json(app, "/api/phones?search=down").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "ok": false, "message": "Upstream request failed" }));
    }

    #[tokio::test]
    async fn test_index_timeout_is_504() {
        let base_url = mock_upstream(HitCounter::default()).await;
        let app = app_for(UpstreamConfig::new(base_url, "key"));

        let (status, body) = get_json(app, "/api/phones?search=slow").await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["message"], "Upstream request timed out");
    }

    #[tokio::test]
    async fn test_index_bad_limit_is_400_without_upstream_call() {
        let hits = HitCounter::default();
        let base_url = mock_upstream(hits.clone()).await;
        let app = app_for(UpstreamConfig::new(base_url, "key"));

        let (status, body) = get_json(app, "/api/phones?limit=-1").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert_eq!(hits.count(), 0);
    }

    #[tokio::test]
    async fn test_index_rejected_query_uses_envelope() {
        let hits = HitCounter::default();
        let base_url = mock_upstream(hits.clone()).await;
        let app = app_for(UpstreamConfig::new(base_url, "key"));

        let (status, body) = get_json(app, "/api/phones?search=a&search=b").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert!(body["message"].as_str().unwrap().contains("search"));
        assert_eq!(hits.count(), 0);
    }

    #[tokio::test]
    async fn test_show_rejected_path_uses_envelope() {
        let hits = HitCounter::default();
        let base_url = mock_upstream(hits.clone()).await;
        let app = app_for(UpstreamConfig::new(base_url, "key"));

        let (status, body) = get_json(app, "/api/phones/%FF").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert_eq!(hits.count(), 0);
    }

    #[tokio::test]
    async fn test_missing_config_is_500() {
        let app = app_for(UpstreamConfig::default());

        let (status, body) = get_json(app.clone(), "/api/phones").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "ok": false, "message": "Internal server error" }));

        let (status, _) = get_json(app, "/api/phones/a").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_show_returns_detail() {
        let base_url = mock_upstream(HitCounter::default()).await;
        let app = app_for(UpstreamConfig::new(base_url, "key"));

        let (status, body) = get_json(app, "/api/phones/APL-IP15").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "APL-IP15");
        assert_eq!(body["name"], "iPhone 15");
    }

    #[tokio::test]
    async fn test_show_not_found_passes_through() {
        let base_url = mock_upstream(HitCounter::default()).await;
        let app = app_for(UpstreamConfig::new(base_url, "key"));

        let (status, body) = get_json(app, "/api/phones/missing").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Upstream request failed");
    }

    #[tokio::test]
    async fn test_show_blank_id_is_400() {
        let hits = HitCounter::default();
        let base_url = mock_upstream(hits.clone()).await;
        let app = app_for(UpstreamConfig::new(base_url, "key"));

        let (status, body) = get_json(app, "/api/phones/%20").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid phone ID");
        assert_eq!(hits.count(), 0);
    }
}
