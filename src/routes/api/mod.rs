pub mod admin_events;
pub mod categories;
pub mod events;
pub mod user_events;
pub mod users;

use axum::Router;
use axum::routing::{get, patch, post};
use serde::Deserialize;

use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub from: Option<i64>,
    pub size: Option<i64>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/events", get(events::list))
        .route("/events/{id}", get(events::get))
        .route("/categories", get(categories::list))
        .route("/categories/{cat_id}", get(categories::get))
        // Owners
        .route(
            "/users/{user_id}/events",
            get(user_events::list).post(user_events::create),
        )
        .route(
            "/users/{user_id}/events/{event_id}",
            get(user_events::get).patch(user_events::update),
        )
        // Admin
        .route("/admin/events", get(admin_events::list))
        .route("/admin/events/{event_id}", patch(admin_events::update))
        .route("/admin/users", get(users::list).post(users::create))
        .route("/admin/categories", post(categories::create))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::models::datetime::FORMAT;
    use crate::services::{EventRules, EventService};
    use crate::store::MemoryStore;
    use crate::validation::Paging;

    fn app() -> Router {
        let store = Arc::new(MemoryStore::new());
        let state = AppState {
            store: store.clone(),
            events: EventService::new(store, EventRules::default()),
            paging: Paging::default(),
        };
        router(state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn event_body(category: i64, days_ahead: i64) -> Value {
        json!({
            "title": "Board games evening",
            "annotation": "Bring your favourite board games and friends",
            "description": "Tables, snacks and a few hundred games to try out",
            "category": category,
            "eventDate": (Utc::now() + Duration::days(days_ahead)).format(FORMAT).to_string(),
            "location": { "lat": 52.52, "lon": 13.40 },
            "participantLimit": 20
        })
    }

    /// Creates a user, a category and one pending event; returns their ids.
    async fn seed(app: &Router) -> (i64, i64, i64) {
        let (status, user) = send(
            app,
            "POST",
            "/admin/users",
            Some(json!({ "name": "Alice", "email": "alice@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, category) = send(
            app,
            "POST",
            "/admin/categories",
            Some(json!({ "name": "Games" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let user_id = user["id"].as_i64().unwrap();
        let category_id = category["id"].as_i64().unwrap();
        let (status, event) = send(
            app,
            "POST",
            &format!("/users/{user_id}/events"),
            Some(event_body(category_id, 2)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        (user_id, category_id, event["id"].as_i64().unwrap())
    }

    #[tokio::test]
    async fn rejects_bad_pagination_on_every_listing() {
        let app = app();
        for uri in [
            "/events?from=-1",
            "/events?size=0",
            "/users/1/events?from=-5",
            "/admin/events?size=-1",
            "/categories?size=0",
            "/admin/users?from=-1",
        ] {
            let (status, body) = send(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].as_str().is_some(), "{uri}");
        }
    }

    #[tokio::test]
    async fn event_lifecycle_over_http() {
        let app = app();
        let (user_id, category_id, event_id) = seed(&app).await;

        let (status, event) =
            send(&app, "GET", &format!("/users/{user_id}/events/{event_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(event["state"], "PENDING");
        assert_eq!(event["initiatorId"], user_id);
        assert!(event.get("version").is_none());

        let (_, public) = send(&app, "GET", "/events", None).await;
        assert_eq!(public, json!([]));

        let (status, _) = send(&app, "GET", &format!("/events/{event_id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, published) = send(
            &app,
            "PATCH",
            &format!("/admin/events/{event_id}"),
            Some(json!({ "stateAction": "PUBLISH_EVENT" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(published["state"], "PUBLISHED");
        assert!(published["publishedOn"].is_string());

        let (status, public) = send(
            &app,
            "GET",
            &format!("/events?categories={category_id}&sort=EVENT_DATE&onlyAvailable=true"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(public.as_array().unwrap().len(), 1);

        let (status, event) = send(&app, "GET", &format!("/events/{event_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(event["views"], 1);
    }

    #[tokio::test]
    async fn owner_cannot_edit_published_event() {
        let app = app();
        let (user_id, _, event_id) = seed(&app).await;
        send(
            &app,
            "PATCH",
            &format!("/admin/events/{event_id}"),
            Some(json!({ "stateAction": "PUBLISH_EVENT" })),
        )
        .await;

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/users/{user_id}/events/{event_id}"),
            Some(json!({ "title": "A brand new title" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("pending"));
    }

    #[tokio::test]
    async fn owner_cancels_and_admin_cannot_publish_afterwards() {
        let app = app();
        let (user_id, _, event_id) = seed(&app).await;

        let (status, event) = send(
            &app,
            "PATCH",
            &format!("/users/{user_id}/events/{event_id}"),
            Some(json!({ "stateAction": "CANCEL_REVIEW" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(event["state"], "CANCELED");

        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/admin/events/{event_id}"),
            Some(json!({ "stateAction": "PUBLISH_EVENT" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn malformed_bodies_are_bad_requests() {
        let app = app();
        let (user_id, category_id, _) = seed(&app).await;

        let (status, _) = send(
            &app,
            "POST",
            &format!("/users/{user_id}/events"),
            Some(json!({ "title": "Missing everything else" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "POST",
            &format!("/users/{user_id}/events"),
            Some(event_body(category_id, -1)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "POST",
            &format!("/users/{user_id}/events"),
            Some(event_body(999, 3)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rejects_unknown_query_values() {
        let app = app();
        for uri in [
            "/events?sort=TITLE",
            "/events?categories=abc",
            "/events?rangeStart=yesterday",
            "/events?rangeStart=2030-01-02%2000:00:00&rangeEnd=2030-01-01%2000:00:00",
            "/admin/events?states=DRAFT",
        ] {
            let (status, _) = send(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn admin_search_filters_by_state_and_user() {
        let app = app();
        let (user_id, category_id, event_id) = seed(&app).await;

        let (status, events) = send(
            &app,
            "GET",
            &format!(
                "/admin/events?userIds={user_id}&states=PENDING,PUBLISHED&categories={category_id}&rangeStart=2000-01-01%2000:00:00"
            ),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<i64> = events
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![event_id]);

        let (_, events) = send(&app, "GET", "/admin/events?states=CANCELED", None).await;
        assert_eq!(events, json!([]));
    }

    #[tokio::test]
    async fn blank_category_name_is_rejected() {
        let app = app();
        for name in ["", "   ", "\t\n"] {
            let (status, body) = send(
                &app,
                "POST",
                "/admin/categories",
                Some(json!({ "name": name })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{name:?}");
            assert!(body["error"].as_str().is_some());
        }

        let (status, category) = send(
            &app,
            "POST",
            "/admin/categories",
            Some(json!({ "name": "  Theatre  " })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(category["name"], "Theatre");

        let (_, categories) = send(&app, "GET", "/categories", None).await;
        assert_eq!(categories.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn categories_and_users_are_listed() {
        let app = app();
        seed(&app).await;

        let (status, categories) = send(&app, "GET", "/categories", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(categories[0]["name"], "Games");

        let (status, _) = send(&app, "GET", "/categories/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, users) = send(&app, "GET", "/admin/users?ids=1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(users[0]["email"], "alice@example.com");

        let (status, _) = send(
            &app,
            "POST",
            "/admin/categories",
            Some(json!({ "name": "Games" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
