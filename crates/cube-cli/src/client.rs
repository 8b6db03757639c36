//! Minimal HTTP/1 client for talking to the manager.
//!
//! One TCP connection per request, driven by hyper. Every request is bounded
//! by [`REQUEST_TIMEOUT`].

use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use tracing::debug;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Status and fully-read body of a manager response.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub body: Bytes,
}

pub async fn get(address: &str, path: &str) -> anyhow::Result<Response> {
    send(address, Method::GET, path, None).await
}

pub async fn post_json(address: &str, path: &str, body: Bytes) -> anyhow::Result<Response> {
    send(address, Method::POST, path, Some(body)).await
}

async fn send(
    address: &str,
    method: Method,
    path: &str,
    body: Option<Bytes>,
) -> anyhow::Result<Response> {
    let uri = format!("http://{address}{path}");
    tokio::time::timeout(REQUEST_TIMEOUT, exchange(address, method, path, &uri, body))
        .await
        .with_context(|| format!("request to {uri} timed out"))?
}

async fn exchange(
    address: &str,
    method: Method,
    path: &str,
    uri: &str,
    body: Option<Bytes>,
) -> anyhow::Result<Response> {
    let stream = tokio::net::TcpStream::connect(address)
        .await
        .with_context(|| format!("connecting to manager at {address}"))?;

    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake::<_, Full<Bytes>>(io)
        .await
        .context("http handshake with manager")?;

    // Drive the connection in the background.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            debug!(error = %e, "manager connection closed");
        }
    });

    // A raw http1 connection writes the request target verbatim, so send
    // origin-form and name the server in the host header.
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header("host", address)
        .header("user-agent", concat!("cube/", env!("CARGO_PKG_VERSION")));
    let payload = match body {
        Some(bytes) => {
            builder = builder.header("content-type", "application/json");
            bytes
        }
        None => Bytes::new(),
    };
    let req = builder.body(Full::new(payload))?;

    let resp = sender
        .send_request(req)
        .await
        .with_context(|| format!("sending request to {uri}"))?;
    let status = resp.status();
    let body = resp.into_body().collect().await?.to_bytes();
    debug!(%uri, %status, bytes = body.len(), "manager responded");

    Ok(Response { status, body })
}
