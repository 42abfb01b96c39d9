//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, route matching, and dispatching.

use crate::config::AppState;
use crate::handler::{info::ApiInfo, logo};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};
use std::borrow::Cow;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

const LOGO_PREFIX: &str = "/logo";

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
}

/// A routed response plus what was served, for access logging
pub struct Routed {
    pub response: Response<Full<Bytes>>,
    pub logo_file: Option<String>,
}

impl Routed {
    pub const fn plain(response: Response<Full<Bytes>>) -> Self {
        Self {
            response,
            logo_file: None,
        }
    }
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let uri = req.uri();

    let routed = match check_http_method(method, state.config.http.enable_cors) {
        Some(response) => Routed::plain(response),
        None => {
            let ctx = RequestContext {
                path: uri.path(),
                query: uri.query(),
                is_head: *method == Method::HEAD,
                if_none_match: req
                    .headers()
                    .get("if-none-match")
                    .and_then(|v| v.to_str().ok()),
            };
            route_request(&ctx, &state).await
        }
    };

    let Routed {
        mut response,
        logo_file,
    } = routed;
    http::apply_common_headers(
        &mut response,
        &state.config.http.server_name,
        state.config.http.enable_cors,
    );

    if state.cached_access_log.load(Ordering::Relaxed) {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            method.to_string(),
            uri.path().to_string(),
        );
        entry.query = uri.query().map(ToString::to_string);
        entry.http_version = format!("{:?}", req.version()).trim_start_matches("HTTP/").to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = content_length(&response);
        entry.referer = header_string(&req, "referer");
        entry.user_agent = header_string(&req, "user-agent");
        entry.logo_file = logo_file;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Route request based on path and configuration
pub async fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> Routed {
    let health = &state.config.health;
    if health.enabled && (ctx.path == health.liveness_path || ctx.path == health.readiness_path) {
        return Routed::plain(http::build_health_response("ok"));
    }

    if ctx.path == "/" {
        let info = ApiInfo::new(state.index.ticker_count());
        return Routed::plain(http::build_json_response(StatusCode::OK, &info, ctx.is_head));
    }

    match logo_route(ctx) {
        Some(LogoRoute::Ticker(ticker)) => logo::serve_logo(ctx, state, &ticker).await,
        Some(LogoRoute::MissingTicker) => Routed::plain(http::build_redirect_response("/")),
        Some(LogoRoute::BadEncoding) => Routed::plain(http::build_error_response(
            StatusCode::BAD_REQUEST,
            "Ticker is not valid UTF-8",
            ctx.is_head,
        )),
        None => Routed::plain(http::build_error_response(
            StatusCode::NOT_FOUND,
            "Not Found",
            ctx.is_head,
        )),
    }
}

/// Ways a request can address the logo endpoint
#[derive(Debug, PartialEq, Eq)]
enum LogoRoute<'a> {
    Ticker(Cow<'a, str>),
    MissingTicker,
    BadEncoding,
}

/// Extract the ticker from `/logo/{ticker}` or `/logo?ticker=...`
fn logo_route<'a>(ctx: &RequestContext<'a>) -> Option<LogoRoute<'a>> {
    let rest = ctx.path.strip_prefix(LOGO_PREFIX)?;

    let segment = match rest {
        "" | "/" => None,
        // `/logo/etsy/` addresses the same ticker as `/logo/etsy`
        _ => {
            let segment = rest.strip_prefix('/')?;
            Some(segment.strip_suffix('/').unwrap_or(segment))
        }
    };

    if let Some(segment) = segment {
        return Some(match urlencoding::decode(segment) {
            Ok(ticker) => LogoRoute::Ticker(ticker),
            Err(_) => LogoRoute::BadEncoding,
        });
    }

    let ticker = ctx.query.and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(name, _)| name == "ticker")
            .map(|(_, value)| Cow::Owned(value.into_owned()))
    });
    Some(ticker.map_or(LogoRoute::MissingTicker, LogoRoute::Ticker))
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn content_length(response: &Response<Full<Bytes>>) -> usize {
    response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::logos::{LogoIndex, RankPolicy};
    use http_body_util::BodyExt;
    use std::fs;
    use std::path::Path;

    fn touch(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn test_state(root: &Path) -> Arc<AppState> {
        let mut config = Config::load_from("does-not-exist/config").unwrap();
        config.logging.access_log = false;
        let index = LogoIndex::build(root, RankPolicy::default()).unwrap();
        Arc::new(AppState::new(config, index))
    }

    async fn send(state: &Arc<AppState>, method: Method, uri: &str) -> Response<Full<Bytes>> {
        let req = Request::builder().method(method).uri(uri).body(()).unwrap();
        handle_request(req, Arc::clone(state), "127.0.0.1:5000".parse().unwrap())
            .await
            .unwrap()
    }

    async fn body(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    fn ctx<'a>(path: &'a str, query: Option<&'a str>) -> RequestContext<'a> {
        RequestContext {
            path,
            query,
            is_head: false,
            if_none_match: None,
        }
    }

    #[test]
    fn test_logo_route_forms() {
        assert_eq!(
            logo_route(&ctx("/logo/etsy", None)),
            Some(LogoRoute::Ticker(Cow::Borrowed("etsy")))
        );
        assert_eq!(
            logo_route(&ctx("/logo/BRK%2EB", None)),
            Some(LogoRoute::Ticker(Cow::Borrowed("BRK.B")))
        );
        assert_eq!(
            logo_route(&ctx("/logo", Some("size=64&ticker=ETSY"))),
            Some(LogoRoute::Ticker(Cow::Borrowed("ETSY")))
        );
        assert_eq!(
            logo_route(&ctx("/logo", Some("ticker=BTC%2DUSD"))),
            Some(LogoRoute::Ticker(Cow::Borrowed("BTC-USD")))
        );
        assert_eq!(
            logo_route(&ctx("/logo/etsy/", None)),
            Some(LogoRoute::Ticker(Cow::Borrowed("etsy")))
        );
        assert_eq!(logo_route(&ctx("/logo", None)), Some(LogoRoute::MissingTicker));
        assert_eq!(logo_route(&ctx("/logo/", None)), Some(LogoRoute::MissingTicker));
        assert_eq!(logo_route(&ctx("/logos/etsy", None)), None);
        assert_eq!(logo_route(&ctx("/other", None)), None);
        assert_eq!(
            logo_route(&ctx("/logo/%FF", None)),
            Some(LogoRoute::BadEncoding)
        );
    }

    #[tokio::test]
    async fn test_path_and_query_forms_match() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "ticker_icons/ETSY.png", b"etsy-png");
        touch(dir.path(), "crypto_icons/ETSY.svg", b"<svg/>");
        let state = test_state(dir.path());

        let by_path = send(&state, Method::GET, "/logo/etsy").await;
        assert_eq!(by_path.status(), StatusCode::OK);
        assert_eq!(by_path.headers()["Content-Type"], "image/png");
        assert_eq!(by_path.headers()["Access-Control-Allow-Origin"], "*");

        let by_query = send(&state, Method::GET, "/logo?ticker=ETSY").await;
        assert_eq!(by_query.status(), StatusCode::OK);
        assert_eq!(by_query.headers()["Content-Type"], "image/png");

        assert_eq!(body(by_path).await, body(by_query).await);
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_404_json() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "ticker_icons/AAPL.png", b"aapl");
        let state = test_state(dir.path());

        let response = send(&state, Method::GET, "/logo/nope").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let value: serde_json::Value = serde_json::from_slice(&body(response).await).unwrap();
        assert_eq!(value["detail"], "Logo not found for ticker 'nope'");
    }

    #[tokio::test]
    async fn test_blank_ticker_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = send(&state, Method::GET, "/logo?ticker=%20").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: serde_json::Value = serde_json::from_slice(&body(response).await).unwrap();
        assert_eq!(value["detail"], "Ticker must not be empty");
    }

    #[tokio::test]
    async fn test_missing_query_redirects_to_info() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = send(&state, Method::GET, "/logo").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()["Location"], "/");
    }

    #[tokio::test]
    async fn test_new_file_served_without_restart() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let before = send(&state, Method::GET, "/logo/SOL").await;
        assert_eq!(before.status(), StatusCode::NOT_FOUND);

        touch(dir.path(), "crypto_icons/SOL.webp", b"sol");
        let after = send(&state, Method::GET, "/logo/sol").await;
        assert_eq!(after.status(), StatusCode::OK);
        assert_eq!(after.headers()["Content-Type"], "image/webp");
        assert_eq!(body(after).await, Bytes::from_static(b"sol"));
    }

    #[tokio::test]
    async fn test_etag_revalidation_and_head() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "forex_icons/EURUSD.svg", b"<svg/>");
        let state = test_state(dir.path());

        let first = send(&state, Method::GET, "/logo/EURUSD").await;
        let etag = first.headers()["ETag"].to_str().unwrap().to_string();

        let req = Request::builder()
            .uri("/logo/eurusd")
            .header("If-None-Match", &etag)
            .body(())
            .unwrap();
        let cached = handle_request(req, Arc::clone(&state), "127.0.0.1:5000".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(cached.status(), StatusCode::NOT_MODIFIED);

        let head = send(&state, Method::HEAD, "/logo/EURUSD").await;
        assert_eq!(head.status(), StatusCode::OK);
        assert_eq!(head.headers()["Content-Length"], "6");
        assert!(body(head).await.is_empty());
    }

    #[tokio::test]
    async fn test_deleted_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "ticker_icons/GONE.png", b"gone");
        let state = test_state(dir.path());
        fs::remove_file(dir.path().join("ticker_icons/GONE.png")).unwrap();

        let response = send(&state, Method::GET, "/logo/GONE").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_trailing_slash_serves_same_logo() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "ticker_icons/ETSY.png", b"etsy-png");
        let state = test_state(dir.path());

        let response = send(&state, Method::GET, "/logo/etsy/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, Bytes::from_static(b"etsy-png"));

        let empty = send(&state, Method::GET, "/logo//").await;
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_deleted_best_falls_back_to_runner_up() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "ticker_icons/XYZ.png", b"best");
        touch(dir.path(), "crypto_icons/XYZ.png", b"runner-up");
        let state = test_state(dir.path());
        fs::remove_file(dir.path().join("ticker_icons/XYZ.png")).unwrap();

        let response = send(&state, Method::GET, "/logo/xyz").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Content-Type"], "image/png");
        assert_eq!(body(response).await, Bytes::from_static(b"runner-up"));
    }

    #[tokio::test]
    async fn test_info_health_and_methods() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "ticker_icons/AAPL.png", b"aapl");
        let state = test_state(dir.path());

        let info = send(&state, Method::GET, "/").await;
        assert_eq!(info.status(), StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&body(info).await).unwrap();
        assert_eq!(value["name"], "Ticker Logos API");
        assert_eq!(value["indexed_tickers"], 1);
        assert_eq!(value["endpoints"]["get_logo_path_param"], "/logo/{ticker}");

        let health = send(&state, Method::GET, "/healthz").await;
        assert_eq!(health.status(), StatusCode::OK);
        assert_eq!(body(health).await, Bytes::from_static(b"ok"));

        let options = send(&state, Method::OPTIONS, "/logo/AAPL").await;
        assert_eq!(options.status(), StatusCode::NO_CONTENT);

        let post = send(&state, Method::POST, "/logo/AAPL").await;
        assert_eq!(post.status(), StatusCode::METHOD_NOT_ALLOWED);

        let unknown = send(&state, Method::GET, "/favicon.ico").await;
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    }
}
