//! Request/response dispatch handler.
//!
//! This module routes [`Request`] messages to the [`EventService`] and turns
//! the results, including errors, into [`Response`] messages.

use tracing::{debug, warn};

use crate::error::ServerResult;
use crate::service::EventService;
use crate::types::{ErrorCode, ErrorResponse, Request, Response};

/// Request handler that processes requests and produces responses.
#[derive(Debug, Clone)]
pub struct RequestHandler {
    service: EventService,
}

impl RequestHandler {
    /// Creates a new request handler over the given service.
    pub fn new(service: EventService) -> Self {
        Self { service }
    }

    /// Returns the underlying service.
    pub fn service(&self) -> &EventService {
        &self.service
    }

    /// Handles a single request and returns the response.
    #[tracing::instrument(skip(self), fields(request_type, duration_ms))]
    pub async fn handle(&self, request: &Request) -> Response {
        use tracing::Span;

        let start = std::time::Instant::now();
        let request_type = request_type(request);
        Span::current().record("request_type", request_type);

        let response = match self.dispatch(request).await {
            Ok(response) => response,
            Err(error) => {
                let error = ErrorResponse::from(&error);
                if error.code == ErrorCode::InternalError {
                    warn!(message = %error.message, "Request failed");
                } else {
                    debug!(code = ?error.code, message = %error.message, "Request rejected");
                }
                Response::from_error(error)
            }
        };

        let duration = start.elapsed();
        if tracing::enabled!(tracing::Level::DEBUG) {
            Span::current().record("duration_ms", duration.as_millis());
            debug!(
                request_type,
                duration_ms = duration.as_millis(),
                "Request handled"
            );
        }

        response
    }

    async fn dispatch(&self, request: &Request) -> ServerResult<Response> {
        let response = match request {
            Request::Create { event } => {
                debug!(name = %event.name, "Handling Create request");
                Response::event(self.service.create(event.clone()).await?)
            }
            Request::Update { id, patch } => {
                debug!(id = %id, ?patch, "Handling Update request");
                Response::event(self.service.update(id, patch.clone()).await?)
            }
            Request::Delete { id, patch_index } => {
                debug!(id = %id, patch_index = *patch_index, "Handling Delete request");
                Response::deleted(self.service.delete(id, *patch_index).await?)
            }
            Request::List { page, limit } => {
                debug!(page = *page, ?limit, "Handling List request");
                Response::events(self.service.list(*page, *limit).await?)
            }
            Request::Get { id } => {
                debug!(id = %id, "Handling Get request");
                Response::event(self.service.get(id).await?)
            }
            Request::Check { event, exclude_id } => {
                debug!(name = %event.name, ?exclude_id, "Handling Check request");
                Response::check(
                    self.service
                        .check(event.clone(), exclude_id.as_deref())
                        .await?,
                )
            }
        };
        Ok(response)
    }
}

fn request_type(request: &Request) -> &'static str {
    match request {
        Request::Create { .. } => "create",
        Request::Update { .. } => "update",
        Request::Delete { .. } => "delete",
        Request::List { .. } => "list",
        Request::Get { .. } => "get",
        Request::Check { .. } => "check",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};
    use eventscheduler_core::{EventDraft, EventPatch};

    use crate::service::new_shared_store;
    use crate::types::ConflictReport;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2030, 6, 3, hour, minute, 0)
            .unwrap()
    }

    fn handler() -> RequestHandler {
        RequestHandler::new(EventService::new(new_shared_store()).with_clock(fixed_now))
    }

    async fn create(handler: &RequestHandler, name: &str, hour: u32) -> String {
        let request = Request::create(EventDraft::new(name, at(hour, 0), 60));
        match handler.handle(&request).await {
            Response::Event { event } => event.id,
            other => panic!("Expected Event response, got {other:?}"),
        }
    }

    fn error_code(response: &Response) -> ErrorCode {
        match response {
            Response::Error { error } => error.code,
            other => panic!("Expected Error response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn request_handler_create_and_get() {
        let handler = handler();
        let id = create(&handler, "Planning", 9).await;

        let response = handler.handle(&Request::get(&id)).await;
        match response {
            Response::Event { event } => {
                assert_eq!(event.id, id);
                assert_eq!(event.name, "Planning");
            }
            other => panic!("Expected Event response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn request_handler_conflict() {
        let handler = handler();
        create(&handler, "Planning", 9).await;

        let request = Request::create(EventDraft::new("Review", at(9, 30), 30));
        let response = handler.handle(&request).await;
        assert_eq!(error_code(&response), ErrorCode::Conflict);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn request_handler_validation() {
        let handler = handler();
        let request = Request::create(EventDraft::new("Planning", at(9, 0), 2000));
        let response = handler.handle(&request).await;
        assert_eq!(error_code(&response), ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn request_handler_update() {
        let handler = handler();
        let id = create(&handler, "Planning", 9).await;

        let response = handler
            .handle(&Request::update(&id, EventPatch::new().duration(90)))
            .await;
        match response {
            Response::Event { event } => {
                assert_eq!(event.duration, 90);
                assert_eq!(event.updated_at, Some(fixed_now()));
            }
            other => panic!("Expected Event response, got {other:?}"),
        }

        let response = handler
            .handle(&Request::update("missing", EventPatch::new().duration(90)))
            .await;
        assert_eq!(error_code(&response), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn request_handler_delete() {
        let handler = handler();
        let first = create(&handler, "Alpha", 8).await;
        let second = create(&handler, "Bravo", 10).await;

        let response = handler.handle(&Request::delete(&second, 1)).await;
        match response {
            Response::Deleted { outcome } => {
                assert_eq!(outcome.event_id, second);
                assert_eq!(outcome.patch_event.map(|e| e.id), Some(first));
            }
            other => panic!("Expected Deleted response, got {other:?}"),
        }

        let response = handler.handle(&Request::delete(&second, 0)).await;
        assert_eq!(error_code(&response), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn request_handler_list() {
        let handler = handler();
        create(&handler, "Alpha", 8).await;
        create(&handler, "Bravo", 10).await;

        let response = handler.handle(&Request::list(1, Some(1))).await;
        match response {
            Response::Events { page } => {
                assert_eq!(page.total, 2);
                assert_eq!(page.events.len(), 1);
                assert_eq!(page.events[0].name, "Bravo");
            }
            other => panic!("Expected Events response, got {other:?}"),
        }

        let response = handler.handle(&Request::list(0, None)).await;
        assert_eq!(error_code(&response), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn request_handler_check() {
        let handler = handler();
        let id = create(&handler, "Planning", 9).await;
        let draft = EventDraft::new("Planning", at(9, 15), 30);

        let response = handler.handle(&Request::check(draft.clone())).await;
        assert_eq!(
            response,
            Response::check(ConflictReport::conflicting(id.clone()))
        );

        let response = handler
            .handle(&Request::check_excluding(draft, id))
            .await;
        assert_eq!(response, Response::check(ConflictReport::clear()));
    }

    #[test]
    fn request_type_names() {
        assert_eq!(request_type(&Request::get("x")), "get");
        assert_eq!(request_type(&Request::list(1, None)), "list");
        assert_eq!(request_type(&Request::delete("x", 0)), "delete");
    }
}
