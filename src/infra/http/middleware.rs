use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response.extensions_mut().insert(ctx);
    response
}

/// Post or user id named by a member route (`/posts/{id}`, `/users/{id}`).
#[derive(Debug, Default, PartialEq, Eq)]
struct ResourceIds {
    post_id: Option<i64>,
    user_id: Option<i64>,
}

fn resource_ids(path: &str) -> ResourceIds {
    let mut segments = path.trim_matches('/').split('/');
    let (Some(collection), Some(member), None) =
        (segments.next(), segments.next(), segments.next())
    else {
        return ResourceIds::default();
    };
    let Ok(id) = member.parse::<i64>() else {
        return ResourceIds::default();
    };
    match collection {
        "posts" => ResourceIds {
            post_id: Some(id),
            user_id: None,
        },
        "users" => ResourceIds {
            post_id: None,
            user_id: Some(id),
        },
        _ => ResourceIds::default(),
    }
}

/// Log every 4xx/5xx with the ids it concerns and the cause chain left by the handler.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let ids = resource_ids(uri.path());
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let latency_ms = start.elapsed().as_millis();
    let (origin, causes) = match response.extensions_mut().remove::<ErrorReport>() {
        Some(report) => (report.source, report.messages),
        None => ("router", Vec::new()),
    };
    let reason = causes.last().map(String::as_str).unwrap_or("no error report");

    if status.is_server_error() {
        error!(
            target: "postgate::http",
            request_id = %request_id,
            status = status.as_u16(),
            method = %method,
            route = %uri.path(),
            post_id = ids.post_id,
            user_id = ids.user_id,
            latency_ms,
            origin,
            reason,
            causes = ?causes,
            "upstream-backed request failed",
        );
    } else {
        warn!(
            target: "postgate::http",
            request_id = %request_id,
            status = status.as_u16(),
            method = %method,
            route = %uri.path(),
            query = uri.query().unwrap_or(""),
            post_id = ids.post_id,
            user_id = ids.user_id,
            latency_ms,
            origin,
            reason,
            "request rejected",
        );
    }

    response
}
