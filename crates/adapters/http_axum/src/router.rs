//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use toxotes_app::ports::{CommandPublisher, ThingRepository};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api` and includes a [`TraceLayer`] that logs
/// each HTTP request/response at the `DEBUG` level.
pub fn build<R, P>(state: AppState<R, P>) -> Router
where
    R: ThingRepository + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    use toxotes_app::services::relay_service::RelayService;
    use toxotes_app::status_board::InProcessStatusBoard;
    use toxotes_domain::command::{NodeConfig, Selector};
    use toxotes_domain::error::{BoxedError, ToxotesError};
    use toxotes_domain::power::PowerState;
    use toxotes_domain::qos::Qos;
    use toxotes_domain::reconcile::{ThingUpdate, TopicConvention};
    use toxotes_domain::thing::Thing;

    struct StubThingRepo {
        things: Mutex<Vec<Thing>>,
    }

    impl ThingRepository for StubThingRepo {
        async fn find_by_selector(&self, selector: &Selector) -> Result<Vec<Thing>, ToxotesError> {
            let things = self.things.lock().unwrap();
            Ok(things
                .iter()
                .filter(|t| match selector {
                    Selector::ByUniqueId(id) => &t.unique_id == id,
                    Selector::ByFriendlyName(name) => &t.friendly_name == name,
                })
                .cloned()
                .collect())
        }
        async fn apply_updates(&self, batch: Vec<ThingUpdate>) -> Result<(), ToxotesError> {
            let mut things = self.things.lock().unwrap();
            for update in batch {
                if let Some(thing) = things.iter_mut().find(|t| t.unique_id == update.unique_id) {
                    update.change.apply_to(thing);
                }
            }
            Ok(())
        }
        async fn get_all(&self) -> Result<Vec<Thing>, ToxotesError> {
            Ok(self.things.lock().unwrap().clone())
        }
        async fn upsert(&self, thing: Thing) -> Result<Thing, ToxotesError> {
            Ok(thing)
        }
    }

    struct StubPublisher {
        fail: bool,
    }

    impl CommandPublisher for StubPublisher {
        async fn publish(
            &self,
            _topic: &str,
            _payload: PowerState,
            _qos: Qos,
            _retain: bool,
        ) -> Result<(), ToxotesError> {
            if self.fail {
                let source: BoxedError = "broker unreachable".into();
                return Err(ToxotesError::Publish(source));
            }
            Ok(())
        }
    }

    fn test_app(fail_publish: bool) -> Router {
        let porch = Thing::builder()
            .unique_id("relay_1")
            .friendly_name("Porch")
            .host_id("tasmota_1")
            .current_value(PowerState::Off)
            .build()
            .unwrap();
        let board = Arc::new(InProcessStatusBoard::new());
        let service = RelayService::new(
            StubThingRepo {
                things: Mutex::new(vec![porch]),
            },
            StubPublisher { fail: fail_publish },
            Arc::clone(&board),
            NodeConfig::default(),
            TopicConvention::default(),
        );
        build(AppState::new(Arc::new(service), board))
    }

    fn post_relay(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/relay")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let response = test_app(false)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_apply_relay_command_and_return_report() {
        let response = test_app(false)
            .oneshot(post_relay(r#"{"unique_id":"relay_1","payload":"on"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["published"], serde_json::json!(["relay_1"]));
        assert_eq!(body["persisted"], true);
        assert_eq!(body["status"]["text"], "on (Porch)");
    }

    #[tokio::test]
    async fn should_return_bad_request_for_invalid_payload() {
        let response = test_app(false)
            .oneshot(post_relay(r#"{"unique_id":"relay_1","payload":"maybe"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "invalid payload, use 1, 0, on, off");
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_friendly_name() {
        let response = test_app(false)
            .oneshot(post_relay(r#"{"friendly_name":"Attic","payload":"off"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Thing Attic not found");
    }

    #[tokio::test]
    async fn should_route_numeric_unique_id_through_service_status() {
        let app = test_app(false);
        let response = app
            .clone()
            .oneshot(post_relay(r#"{"unique_id":123,"payload":"on"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Unique ID 123 not found");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["color"], "red");
        assert_eq!(body["shape"], "ring");
        assert_eq!(body["text"], "Error: Unique ID 123 not found");
    }

    #[tokio::test]
    async fn should_return_bad_request_for_non_scalar_unique_id() {
        let response = test_app(false)
            .oneshot(post_relay(r#"{"unique_id":[1],"payload":"on"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_bad_gateway_when_publish_fails() {
        let response = test_app(true)
            .oneshot(post_relay(r#"{"unique_id":"relay_1","payload":"on"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn should_list_things() {
        let response = test_app(false)
            .oneshot(
                Request::builder()
                    .uri("/api/things")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body[0]["unique_id"], "relay_1");
        assert_eq!(body[0]["host_id"], "tasmota_1");
    }

    #[tokio::test]
    async fn should_expose_latest_status_after_command() {
        let app = test_app(false);
        app.clone()
            .oneshot(post_relay(r#"{"unique_id":"relay_1","payload":"0"}"#))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["color"], "red");
        assert_eq!(body["shape"], "dot");
        assert_eq!(body["text"], "off (Porch)");
    }

    #[tokio::test]
    async fn should_stream_current_status_first() {
        let response = test_app(false)
            .oneshot(
                Request::builder()
                    .uri("/api/status/stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "text/event-stream"
        );
        let mut body = response.into_body();
        let frame = body.frame().await.unwrap().unwrap();
        let data = frame.into_data().unwrap();
        let text = String::from_utf8_lossy(&data);
        assert!(text.starts_with("data: "));
        assert!(text.contains("waiting for command"));
    }
}
