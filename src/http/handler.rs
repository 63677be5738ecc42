use serde_json::{json, Value};
use tokio::io::{self, AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::fixture::{model::EXIT_SERVER_PATH, Method};
use crate::lifecycle::shutdown::StopReason;

use super::request::read_http_request;
use super::server::ConnectionContext;

pub const EXIT_SERVER_MESSAGE: &str = "Shutting down the server...\n";

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        418 => "I'm a teapot",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        100..=199 => "Informational",
        200..=299 => "Success",
        300..=399 => "Redirection",
        400..=499 => "Client Error",
        _ => "Server Error",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    pub fn json(status: u16, body: &Value) -> Self {
        Response {
            status,
            content_type: "application/json; charset=utf-8",
            body: body.to_string().into_bytes(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Response {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.as_bytes().to_vec(),
        }
    }

    fn not_found(method: &str, path: &str) -> Self {
        Response::json(404, &json!({ "error": format!("no route for {method} {path}") }))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            reason_phrase(self.status),
            self.content_type,
            self.body.len()
        );
        let mut out = head.into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

/// Answers `GET /exit-server` and asks the coordinator to stop once the
/// client has had time to read the reply.
fn exit_server(ctx: &ConnectionContext) -> Response {
    info!("shutdown requested via {}", EXIT_SERVER_PATH);
    ctx.stop.request_after(StopReason::ExitEndpoint, ctx.exit_delay);
    Response::text(200, EXIT_SERVER_MESSAGE)
}

/// Routes one parsed request against the router active right now.
pub fn dispatch(method: &str, path: &str, ctx: &ConnectionContext) -> Response {
    if method == Method::Get.as_str() && path == EXIT_SERVER_PATH {
        return exit_server(ctx);
    }

    let Ok(parsed) = method.parse::<Method>() else {
        return Response::not_found(method, path);
    };

    let router = ctx.router.load();
    match router.find(parsed, path) {
        Some(handler) => {
            let (status, body) = handler.respond();
            Response::json(status, &body)
        }
        None => Response::not_found(method, path),
    }
}

pub async fn handle_client<S>(mut stream: S, ctx: ConnectionContext) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let Some(req) = read_http_request(&mut stream).await? else {
        return Ok(());
    };

    let response = dispatch(&req.method, &req.path, &ctx);
    debug!(method = %req.method, path = %req.path, status = response.status, "request served");

    stream.write_all(&response.to_bytes()).await?;
    stream.flush().await?;
    stream.shutdown().await
}
