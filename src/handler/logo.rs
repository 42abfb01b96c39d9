//! Logo serving
//!
//! Resolves a requested ticker through the index and streams the chosen file.

use hyper::body::Bytes;
use hyper::StatusCode;
use tokio::fs;

use super::router::{RequestContext, Routed};
use crate::config::AppState;
use crate::http::{self, cache, mime, LogoPayload};
use crate::logger;
use crate::logos::{LogoError, Resolution, ResolvedFrom, TickerKey};

/// Serve the logo for `raw_ticker` as given in the path or query string
pub async fn serve_logo(ctx: &RequestContext<'_>, state: &AppState, raw_ticker: &str) -> Routed {
    let key = match TickerKey::parse(raw_ticker) {
        Ok(key) => key,
        Err(e) => {
            return Routed::plain(http::build_error_response(
                StatusCode::BAD_REQUEST,
                &e.to_string(),
                ctx.is_head,
            ));
        }
    };

    let resolution = match state.index.resolve(key).await {
        Ok(resolution) => resolution,
        Err(e) => {
            if !matches!(e, LogoError::NotFound(_)) {
                logger::log_error(&format!("Lookup for '{raw_ticker}' failed: {e}"));
            }
            return not_found(ctx, raw_ticker);
        }
    };

    if resolution.source == ResolvedFrom::Rescan {
        logger::log_debug(&format!(
            "Ticker {} resolved by rescan to {}",
            resolution.key,
            resolution.candidate.path.display()
        ));
    }

    let Some((resolution, data)) = read_best(state, resolution).await else {
        return not_found(ctx, raw_ticker);
    };

    let logo_file = relative_name(state, &resolution);
    let response = build_response(ctx, state, &resolution, data);
    Routed {
        response,
        logo_file: Some(logo_file),
    }
}

/// Read the resolved file, falling back to lower-ranked candidates when it is
/// gone or unreadable
async fn read_best(state: &AppState, resolution: Resolution) -> Option<(Resolution, Vec<u8>)> {
    let best_path = resolution.candidate.path.clone();
    let fallbacks = state
        .index
        .candidates(&resolution.key)
        .into_iter()
        .filter(move |c| c.path != best_path);
    let ordered = std::iter::once(resolution.candidate.clone()).chain(fallbacks);

    for candidate in ordered {
        match fs::read(&candidate.path).await {
            Ok(data) => {
                return Some((
                    Resolution {
                        candidate,
                        ..resolution
                    },
                    data,
                ));
            }
            Err(e) => logger::log_warning(&format!(
                "Indexed logo '{}' could not be read: {e}",
                candidate.path.display()
            )),
        }
    }
    None
}

fn build_response(
    ctx: &RequestContext<'_>,
    state: &AppState,
    resolution: &Resolution,
    data: Vec<u8>,
) -> hyper::Response<http_body_util::Full<Bytes>> {
    let etag = cache::generate_etag(&data);
    let cache_control = cache::public_max_age(state.config.http.cache_max_age);

    if cache::check_etag_match(ctx.if_none_match, &etag) {
        return http::build_304_response(&etag, &cache_control);
    }

    let candidate = &resolution.candidate;
    http::build_logo_response(
        LogoPayload {
            data: Bytes::from(data),
            content_type: mime::get_content_type(candidate.extension.as_deref()),
            etag: &etag,
            file_name: candidate.file_name(),
            cache_control: &cache_control,
        },
        ctx.is_head,
    )
}

fn not_found(ctx: &RequestContext<'_>, raw_ticker: &str) -> Routed {
    Routed::plain(http::build_error_response(
        StatusCode::NOT_FOUND,
        &format!("Logo not found for ticker '{raw_ticker}'"),
        ctx.is_head,
    ))
}

/// Path of the served file relative to the logos root, for the access log
fn relative_name(state: &AppState, resolution: &Resolution) -> String {
    let path = &resolution.candidate.path;
    path.strip_prefix(state.index.root())
        .unwrap_or(path)
        .display()
        .to_string()
}
