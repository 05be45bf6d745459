mod config;
mod error;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use anyhow::Context;
use app_shell::{DemoId, ParamGroup, SessionId, SessionRegistry, SessionState};
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use fn_core::BaseKind;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use ui::DemoFrame;

use crate::config::Settings;
use crate::error::AppError;

const SESSION_COOKIE: &str = "mathviz_session";
const STYLESHEET: &str = "style.css";

#[derive(Clone)]
struct ServerState {
    sessions: Arc<Mutex<SessionRegistry>>,
    stylesheet: Arc<str>,
}

impl ServerState {
    fn new(session_ttl: Duration, stylesheet: impl Into<Arc<str>>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(SessionRegistry::new(session_ttl))),
            stylesheet: stylesheet.into(),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, SessionRegistry> {
        // The registry stays consistent even if a holder panicked.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, serde::Deserialize)]
struct ResetForm {
    demo: String,
}

/// Session id for this request and whether the browser must be told about it.
struct ResolvedSession {
    id: SessionId,
    fresh: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env().context("invalid configuration")?;
    let stylesheet_path = settings.assets_dir.join(STYLESHEET);
    let stylesheet = std::fs::read_to_string(&stylesheet_path)
        .with_context(|| format!("read stylesheet {}", stylesheet_path.display()))?;

    let state = ServerState::new(settings.session_ttl, stylesheet);
    let app = router(state, &settings.assets_dir);

    let listener = tokio::net::TcpListener::bind(settings.addr)
        .await
        .with_context(|| format!("bind {}", settings.addr))?;
    info!(
        addr = %settings.addr,
        assets = %settings.assets_dir.display(),
        session_ttl_secs = settings.session_ttl.as_secs(),
        "mathviz listening"
    );
    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}

fn router(state: ServerState, assets_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/reset", post(reset_handler))
        .route("/api/demos/:slug/series", get(series_handler))
        .route("/api/demos/:slug/chart.svg", get(chart_handler))
        .nest_service("/assets", ServeDir::new(assets_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// One re-run: apply the submitted widget values, then render the active demo.
async fn index_handler(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(fields): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let requested = requested_demo(&fields)?;
    let now = Instant::now();
    let (session, frame) = {
        let mut sessions = state.sessions();
        sessions.evict_idle(now);
        let session = resolve_session(&sessions, &headers, now);
        let current = sessions.session(&session.id, now);
        apply_fields(current, requested, &fields);
        let frame = DemoFrame::build(current.active_demo(), current);
        (session, frame)
    };
    debug!(demo = frame.demo.slug(), fields = fields.len(), "re-run");

    let svg = frame.render_chart()?;
    let page = ui::render_demo_page(frame, svg, &state.stylesheet);
    Ok(with_session_cookie(Html(page).into_response(), &session))
}

async fn reset_handler(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Form(form): Form<ResetForm>,
) -> Result<Response, AppError> {
    let demo = DemoId::from_slug(&form.demo).ok_or(AppError::UnknownDemo(form.demo))?;
    let now = Instant::now();
    let session = {
        let mut sessions = state.sessions();
        let session = resolve_session(&sessions, &headers, now);
        let current = sessions.session(&session.id, now);
        current.set_active_demo(demo);
        current.store_mut().reset(demo.reset_group());
        session
    };
    info!(demo = demo.slug(), "parameters reset");
    Ok(with_session_cookie(Redirect::to("/").into_response(), &session))
}

async fn series_handler(
    State(state): State<ServerState>,
    UrlPath(slug): UrlPath<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (session, frame) = session_frame(&state, &headers, &slug)?;
    Ok(with_session_cookie(Json(frame.payload()).into_response(), &session))
}

async fn chart_handler(
    State(state): State<ServerState>,
    UrlPath(slug): UrlPath<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (session, frame) = session_frame(&state, &headers, &slug)?;
    let svg = frame.render_chart()?;
    let response = ([(CONTENT_TYPE, "image/svg+xml")], svg).into_response();
    Ok(with_session_cookie(response, &session))
}

/// Frame of `slug` built from the session's current parameters, without
/// changing the active demo.
fn session_frame(
    state: &ServerState,
    headers: &HeaderMap,
    slug: &str,
) -> Result<(ResolvedSession, DemoFrame), AppError> {
    let demo = DemoId::from_slug(slug).ok_or_else(|| AppError::UnknownDemo(slug.to_string()))?;
    let now = Instant::now();
    let mut sessions = state.sessions();
    let session = resolve_session(&sessions, headers, now);
    let frame = DemoFrame::build(demo, sessions.session(&session.id, now));
    Ok((session, frame))
}

fn last_field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .rev()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Demo named by the `demo` field, if any. Checked before any session is
/// touched, so a rejected request leaves the registry unchanged.
fn requested_demo(fields: &[(String, String)]) -> Result<Option<DemoId>, AppError> {
    last_field(fields, "demo")
        .map(|slug| {
            DemoId::from_slug(slug).ok_or_else(|| AppError::UnknownDemo(slug.to_string()))
        })
        .transpose()
}

/// Applies `demo`, `kind` and every declared parameter key found in `fields`.
/// Later duplicates win; unknown keys and unparsable numbers are ignored.
fn apply_fields(session: &mut SessionState, demo: Option<DemoId>, fields: &[(String, String)]) {
    if let Some(demo) = demo {
        session.set_active_demo(demo);
    }
    if let Some(kind) = last_field(fields, "kind").and_then(|k| k.parse::<BaseKind>().ok()) {
        session.set_base_kind(kind);
    }

    let pairs: Vec<(&str, &str)> = fields
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    for group in ParamGroup::ALL {
        session.store_mut().merge_form(group, pairs.iter().copied());
    }
}

fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::parse(value.trim()))
}

/// Keeps a live session; anything else (absent, malformed, expired, or
/// unknown after a restart) gets a new random id.
fn resolve_session(sessions: &SessionRegistry, headers: &HeaderMap, now: Instant) -> ResolvedSession {
    match session_from_headers(headers) {
        Some(id) if sessions.contains(&id, now) => ResolvedSession { id, fresh: false },
        _ => ResolvedSession {
            id: SessionId::from_u128(rand::random::<u128>()),
            fresh: true,
        },
    }
}

fn session_cookie(id: &SessionId) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

fn with_session_cookie(mut response: Response, session: &ResolvedSession) -> Response {
    if session.fresh {
        if let Ok(value) = HeaderValue::from_str(&session_cookie(&session.id)) {
            response.headers_mut().insert(SET_COOKIE, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header::LOCATION, Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let state = ServerState::new(Duration::from_secs(60), ".from-stylesheet { color: red; }");
        router(state, Path::new("assets"))
    }

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    async fn body_text(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn cookie_of(resp: &Response) -> String {
        let raw = resp.headers()[SET_COOKIE].to_str().unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    #[test]
    fn session_cookie_is_parsed_from_header() {
        let id = SessionId::from_u128(42);
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}; other=1")).unwrap(),
        );
        assert_eq!(session_from_headers(&headers), Some(id));

        let mut bad = HeaderMap::new();
        bad.insert(COOKIE, HeaderValue::from_static("mathviz_session=../../etc"));
        assert_eq!(session_from_headers(&bad), None);
        assert_eq!(session_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie(&SessionId::from_u128(1));
        assert!(cookie.starts_with("mathviz_session=0000"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn unknown_or_expired_cookie_gets_fresh_id() {
        let mut sessions = SessionRegistry::new(Duration::from_secs(5));
        let now = Instant::now();
        let known = SessionId::from_u128(9);
        sessions.session(&known, now);

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={known}")).unwrap(),
        );
        let live = resolve_session(&sessions, &headers, now);
        assert!(!live.fresh);
        assert_eq!(live.id, known);

        let later = resolve_session(&sessions, &headers, now + Duration::from_secs(10));
        assert!(later.fresh);
        assert_ne!(later.id, known);
    }

    #[test]
    fn apply_fields_updates_demo_kind_and_params() {
        let mut session = SessionState::default();
        let pairs = fields(&[
            ("demo", "transformation"),
            ("kind", "Quadratic"),
            ("quad_b", "2.5"),
            ("a_trans", "nope"),
            ("d_trans", "40"),
        ]);
        let demo = requested_demo(&pairs).unwrap();
        apply_fields(&mut session, demo, &pairs);
        assert_eq!(session.active_demo(), DemoId::Transformation);
        assert_eq!(session.base_kind(), BaseKind::Quadratic);
        assert_eq!(
            session.store().base_function(BaseKind::Quadratic),
            fn_core::BaseFunction::Quadratic {
                a: 1.0,
                b: 2.5,
                c: 0.0
            }
        );
        let t = session.store().transform();
        assert_eq!(t.a, 1.0);
        assert_eq!(t.d, 10.0);

        apply_fields(&mut session, None, &fields(&[("kind", "Quartic")]));
        assert_eq!(session.base_kind(), BaseKind::Quadratic);

        assert_eq!(session.active_demo(), DemoId::Transformation);
    }

    #[test]
    fn requested_demo_rejects_unknown_slug() {
        assert_eq!(requested_demo(&fields(&[])).unwrap(), None);
        assert_eq!(
            requested_demo(&fields(&[("demo", "quadratic"), ("demo", "transformation")])).unwrap(),
            Some(DemoId::Transformation)
        );
        let err = requested_demo(&fields(&[("demo", "fourier")])).unwrap_err();
        assert!(matches!(err, AppError::UnknownDemo(ref name) if name == "fourier"));
    }

    #[tokio::test]
    async fn first_visit_issues_cookie_and_renders_quadratic() {
        let resp = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(cookie_of(&resp).starts_with("mathviz_session="));
        let html = body_text(resp).await;
        assert!(html.contains("Quadratic Function Visualization"));
        assert!(html.contains(".from-stylesheet { color: red; }"));
        assert!(html.contains("f(x) = 1.00x² + 0.00x + 0.00"));
    }

    #[tokio::test]
    async fn values_persist_until_reset() {
        let app = app();
        let resp = app
            .clone()
            .oneshot(
                Request::get("/?demo=quadratic&a=2.5&c=40")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let cookie = cookie_of(&resp);
        assert!(body_text(resp).await.contains("f(x) = 2.50x² + 0.00x + 40.00"));

        let resp = app
            .clone()
            .oneshot(
                Request::get("/api/demos/quadratic/series")
                    .header(COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(!resp.headers().contains_key(SET_COOKIE));
        let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(json["params"]["a"], 2.5);
        assert_eq!(json["params"]["c"], 40.0);

        let resp = app
            .clone()
            .oneshot(
                Request::post("/reset")
                    .header(COOKIE, &cookie)
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("demo=quadratic"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[LOCATION], "/");

        let resp = app
            .oneshot(
                Request::get("/api/demos/quadratic/series")
                    .header(COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(json["params"]["a"], 1.0);
        assert_eq!(json["params"]["b"], 0.0);
        assert_eq!(json["params"]["c"], 0.0);
    }

    #[tokio::test]
    async fn transformation_page_applies_kind_and_sliders() {
        let resp = app()
            .oneshot(
                Request::get("/?demo=transformation&kind=Cubic&a_trans=2&c_trans=-1.5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("Function Transformations Visualization"));
        assert!(html.contains("f(x) = 1.0x³ + 0.0x² + 0.0x + 0.0"));
        assert!(html.contains("g(x) = 2.0 · f(x - 1.5)"));
    }

    #[tokio::test]
    async fn unknown_demo_is_not_found() {
        let resp = app()
            .oneshot(Request::get("/?demo=fourier").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(body_text(resp).await.contains("This demo is not implemented yet."));

        let resp = app()
            .oneshot(
                Request::get("/api/demos/fourier/series")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rejected_demo_does_not_open_session() {
        let state = ServerState::new(Duration::from_secs(60), "");
        for _ in 0..5 {
            let resp = router(state.clone(), Path::new("assets"))
                .oneshot(Request::get("/?demo=fourier").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            assert!(resp.headers().get(SET_COOKIE).is_none());
        }
        assert!(state.sessions().is_empty());
    }

    #[tokio::test]
    async fn chart_endpoint_serves_svg() {
        let resp = app()
            .oneshot(
                Request::get("/api/demos/transformation/chart.svg")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "image/svg+xml");
        assert!(body_text(resp).await.contains("<svg"));
    }
}
