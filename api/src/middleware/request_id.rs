use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use mc_shared::logging::{generate_request_id, with_request_id, REQUEST_ID_HEADER};

/// Longest client-supplied request id that is accepted as-is
const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation id of the current request, stored in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Middleware that assigns every request an id
///
/// The id comes from the `X-Request-ID` header when it looks sane and is
/// generated otherwise. It is stored in request extensions, echoed on the
/// response and visible to `current_request_id()` while the handler runs.
pub struct RequestIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestIdMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestIdMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestIdMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| is_acceptable_id(v))
            .map(String::from)
            .unwrap_or_else(generate_request_id);

        req.extensions_mut().insert(RequestId(request_id.clone()));

        Box::pin(with_request_id(request_id.clone(), async move {
            let mut response = service.call(req).await?;

            if let Ok(value) = HeaderValue::from_str(&request_id) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static("x-request-id"), value);
            }

            Ok::<_, Error>(response)
        }))
    }
}

fn is_acceptable_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Extension trait to read the request id assigned by `RequestIdMiddleware`
pub trait ErrorHandlingExt {
    fn get_request_id(&self) -> Option<String>;
}

impl ErrorHandlingExt for ServiceRequest {
    fn get_request_id(&self) -> Option<String> {
        self.extensions().get::<RequestId>().map(|id| id.0.clone())
    }
}

impl ErrorHandlingExt for actix_web::HttpRequest {
    fn get_request_id(&self) -> Option<String> {
        self.extensions().get::<RequestId>().map(|id| id.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpRequest, HttpResponse};

    async fn echo(req: HttpRequest) -> HttpResponse {
        let from_extensions = req.get_request_id().unwrap_or_default();
        let from_task = mc_shared::logging::current_request_id().unwrap_or_default();
        HttpResponse::Ok().json(serde_json::json!({
            "extensions": from_extensions,
            "task": from_task,
        }))
    }

    #[actix_web::test]
    async fn test_incoming_request_id_is_propagated() {
        let app = test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .route("/echo", web::get().to(echo)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/echo")
            .insert_header(("X-Request-ID", "abc-123"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.headers().get("x-request-id").unwrap(), "abc-123");
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["extensions"], "abc-123");
        assert_eq!(body["task"], "abc-123");
    }

    #[actix_web::test]
    async fn test_missing_or_bad_request_id_is_generated() {
        let app = test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .route("/echo", web::get().to(echo)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/echo")
            .insert_header(("X-Request-ID", "has spaces <script>"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        let header = resp
            .headers()
            .get("x-request-id")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_ne!(header, "has spaces <script>");
        assert_eq!(header.len(), 36);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["task"], header);
    }

    #[::core::prelude::v1::test]
    fn test_is_acceptable_id() {
        assert!(is_acceptable_id("req_1.2-3"));
        assert!(!is_acceptable_id(""));
        assert!(!is_acceptable_id(&"a".repeat(129)));
    }
}
