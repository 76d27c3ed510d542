//! Layout middleware and endpoint
//!
//! The middleware runs the layout loader in front of every dashboard
//! request. Downstream handlers read the result from request extensions;
//! [`get_layout`] simply hands it back as JSON.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use url::Url;

use crate::{
    error::{ApiError, ApiResult},
    layout::{CookieAction, LayoutData, LoadRequest, DEBUG_PLAY_COOKIE, ORG_SITE_COOKIE},
    routing::is_local_host,
    state::AppState,
};

/// Run the loader, attach [`LayoutData`] to the request and apply cookie writes
pub async fn load_layout(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let url = match request_url(
        request.headers(),
        request.uri(),
        state.config.trust_forwarded_host,
    ) {
        Ok(url) => url,
        Err(e) => return e.into_response(),
    };

    let load_request = LoadRequest {
        url,
        accept_language: header_str(request.headers(), header::ACCEPT_LANGUAGE.as_str())
            .map(str::to_string),
        org_site_cookie: jar.get(ORG_SITE_COOKIE).map(|c| c.value().to_string()),
        debug_play_cookie: jar.get(DEBUG_PLAY_COOKIE).map(|c| c.value().to_string()),
        access_token: access_token(request.headers(), &jar, &state.config.session_cookie_name),
    };

    let outcome = match state.loader.load(&load_request).await {
        Ok(outcome) => outcome,
        Err(redirect) => return redirect.into_response(),
    };

    request.extensions_mut().insert(outcome.data);
    let response = next.run(request).await;

    (apply_cookie_actions(jar, &outcome.cookies), response).into_response()
}

/// Return the layout resolved by [`load_layout`]
pub async fn get_layout(layout: Option<Extension<LayoutData>>) -> ApiResult<Json<LayoutData>> {
    let Extension(data) = layout.ok_or_else(|| {
        tracing::error!("Layout handler reached without the layout middleware");
        ApiError::Internal
    })?;
    Ok(Json(data))
}

/// Rebuild the absolute URL the browser asked for.
///
/// The scheme comes from `X-Forwarded-Proto` when present. The host comes
/// from `X-Forwarded-Host` only when `trust_forwarded_host` is set, else
/// from `Host`.
pub fn request_url(headers: &HeaderMap, uri: &Uri, trust_forwarded_host: bool) -> ApiResult<Url> {
    let host = trust_forwarded_host
        .then(|| forwarded(headers, "x-forwarded-host"))
        .flatten()
        .or_else(|| header_str(headers, header::HOST.as_str()).map(str::to_string))
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .ok_or_else(|| ApiError::BadRequest("Missing Host header".to_string()))?;

    let scheme = forwarded(headers, "x-forwarded-proto").unwrap_or_else(|| {
        if is_local_host(&host) {
            "http".to_string()
        } else {
            "https".to_string()
        }
    });

    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    Url::parse(&format!("{}://{}{}", scheme, host, path_and_query))
        .map_err(|_| ApiError::BadRequest("Invalid request URL".to_string()))
}

/// Bearer token from the Authorization header, else the session cookie
fn access_token(headers: &HeaderMap, jar: &CookieJar, cookie_name: &str) -> Option<String> {
    header_str(headers, header::AUTHORIZATION.as_str())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
        .or_else(|| jar.get(cookie_name).map(|c| c.value().to_string()))
        .filter(|token| !token.is_empty())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Proxy headers may carry a comma list; the first entry is the client's
fn forwarded(headers: &HeaderMap, name: &str) -> Option<String> {
    header_str(headers, name)
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
}

fn apply_cookie_actions(mut jar: CookieJar, actions: &[CookieAction]) -> CookieJar {
    for action in actions {
        jar = match action {
            CookieAction::SetOrgSiteName(site_name) => {
                jar.add(Cookie::build((ORG_SITE_COOKIE, site_name.clone())).path("/"))
            }
            CookieAction::ClearOrgSiteName => {
                jar.remove(Cookie::build(ORG_SITE_COOKIE).path("/"))
            }
        };
    }
    jar
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_request_url_defaults_to_https() {
        let url = request_url(
            &headers(&[("host", "acme.example.com")]),
            &"/courses?tab=1".parse().unwrap(),
            false,
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://acme.example.com/courses?tab=1");
    }

    #[test]
    fn test_request_url_local_host_is_http() {
        let url = request_url(&headers(&[("host", "localhost:5173")]), &"/".parse().unwrap(), false).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5173/");
    }

    #[test]
    fn test_request_url_prefers_forwarded_headers_when_trusted() {
        let url = request_url(
            &headers(&[
                ("host", "internal:3000"),
                ("x-forwarded-host", "learn.acme.org, proxy.local"),
                ("x-forwarded-proto", "https"),
            ]),
            &"/".parse().unwrap(),
            true,
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://learn.acme.org/");
    }

    #[test]
    fn test_request_url_ignores_forwarded_host_by_default() {
        let url = request_url(
            &headers(&[
                ("host", "acme.example.com"),
                ("x-forwarded-host", "other.example.com"),
                ("x-forwarded-proto", "https"),
            ]),
            &"/".parse().unwrap(),
            false,
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://acme.example.com/");
    }

    #[test]
    fn test_request_url_requires_host() {
        let err = request_url(&HeaderMap::new(), &"/".parse().unwrap(), false).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_access_token_prefers_bearer_header() {
        let jar = CookieJar::new().add(Cookie::new("sb-access-token", "from-cookie"));

        let token = access_token(
            &headers(&[("authorization", "Bearer from-header")]),
            &jar,
            "sb-access-token",
        );
        assert_eq!(token.as_deref(), Some("from-header"));

        let token = access_token(&HeaderMap::new(), &jar, "sb-access-token");
        assert_eq!(token.as_deref(), Some("from-cookie"));

        assert!(access_token(&HeaderMap::new(), &CookieJar::new(), "sb-access-token").is_none());
    }

    #[test]
    fn test_accept_language_keeps_full_list() {
        let map = headers(&[("accept-language", "fr-FR,fr;q=0.9,en;q=0.8")]);
        assert_eq!(
            header_str(&map, header::ACCEPT_LANGUAGE.as_str()),
            Some("fr-FR,fr;q=0.9,en;q=0.8")
        );
    }
}
