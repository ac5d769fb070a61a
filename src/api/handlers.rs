use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, Json, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::logic::{
    AuthError, MutationError, Rejection, RequestError, RequestOrchestrator, TagsResponse,
};
use crate::model::{MutationRequest, SearchRequest};
use crate::render::Notice;
use crate::store::traits::TagStore;

/// Cookie identifying the browser session that owns queued notices
pub const SESSION_COOKIE: &str = "tags_session";

/// Shared state behind every admin route
pub struct AdminState<S: TagStore> {
    pub orchestrator: RequestOrchestrator<S>,
    /// Public URL prefix of the client assets
    pub assets_path: String,
    /// Flash notices keyed by session id
    notices: Mutex<HashMap<String, Vec<Notice>>>,
}

impl<S: TagStore> AdminState<S> {
    pub fn new(orchestrator: RequestOrchestrator<S>, assets_path: impl Into<String>) -> Self {
        Self {
            orchestrator,
            assets_path: assets_path.into(),
            notices: Mutex::new(HashMap::new()),
        }
    }

    /// Queue a notice for the session's next full-page render
    pub fn push_notice(&self, session: &str, notice: Notice) {
        self.notices
            .lock()
            .entry(session.to_string())
            .or_default()
            .push(notice);
    }

    pub fn take_notices(&self, session: &str) -> Vec<Notice> {
        self.notices.lock().remove(session).unwrap_or_default()
    }
}

/// Session id from the request cookies, minting one when absent
fn session_id(jar: CookieJar) -> (CookieJar, String) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let id = cookie.value().to_string();
        return (jar, id);
    }

    let id = uuid::Uuid::new_v4().simple().to_string();
    let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
        .path("/admin")
        .http_only(true)
        .same_site(SameSite::Strict);
    (jar.add(cookie), id)
}

pub type AppState<S> = Arc<AdminState<S>>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Body of every AJAX answer: the localized message and the rendered tag list
#[derive(Debug, Serialize)]
pub struct AjaxResponse {
    pub message: Option<String>,
    pub data: Option<String>,
}

impl From<TagsResponse> for AjaxResponse {
    fn from(response: TagsResponse) -> Self {
        Self {
            message: response.message,
            data: Some(response.fragment),
        }
    }
}

type ErrorReply = (StatusCode, Json<AjaxResponse>);

fn error_reply(rejection: Rejection) -> ErrorReply {
    let status = match &rejection.error {
        RequestError::Auth(AuthError::DigestMismatch) => StatusCode::FORBIDDEN,
        RequestError::Mutation(MutationError::MissingCanonicalName) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(AjaxResponse {
            message: Some(rejection.message),
            data: None,
        }),
    )
}

/// Full admin page; drains the notices queued for this session
///
/// The page embeds the full term list and freshly issued credentials, so
/// the digest check on the AJAX endpoints only protects the vocabulary
/// when this route sits behind the site's own admin login.
pub async fn get_tags_page<S: TagStore + 'static>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), ErrorReply> {
    let (jar, session) = session_id(jar);
    let notices = state.take_notices(&session);
    state
        .orchestrator
        .render_page(&notices, &state.assets_path)
        .await
        .map(|html| (jar, Html(html)))
        .map_err(error_reply)
}

/// Non-AJAX form submission: apply, queue the outcome for this session, redirect back
pub async fn post_tags_page<S: TagStore + 'static>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    Form(form): Form<HashMap<String, String>>,
) -> (CookieJar, Redirect) {
    let (jar, session) = session_id(jar);
    let request = MutationRequest::from_form(&form);
    match state.orchestrator.handle_mutation(&request).await {
        Ok(TagsResponse {
            message: Some(message),
            ..
        }) => state.push_notice(&session, Notice::info(message)),
        Ok(_) => {}
        Err(rejection) => state.push_notice(&session, Notice::error(rejection.message)),
    }
    (jar, Redirect::to("/admin/tags"))
}

pub async fn search_tags<S: TagStore + 'static>(
    State(state): State<AppState<S>>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<AjaxResponse>, ErrorReply> {
    state
        .orchestrator
        .handle_search(&request)
        .await
        .map(|response| Json(response.into()))
        .map_err(error_reply)
}

pub async fn mutate_tags<S: TagStore + 'static>(
    State(state): State<AppState<S>>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<AjaxResponse>, ErrorReply> {
    let request = MutationRequest::from_form(&form);
    state
        .orchestrator
        .handle_mutation(&request)
        .await
        .map(|response| Json(response.into()))
        .map_err(error_reply)
}
