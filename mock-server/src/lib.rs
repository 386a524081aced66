//! In-memory address service used to exercise the uri-list codec over HTTP.
//!
//! Addresses are created and read as JSON. Their links, and the association
//! between a person and their addresses, travel as `text/uri-list`.

pub mod config;
pub mod error;

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, warn};
use urilist_core::{
    derive_relation, http::accepts, Carrier, CarrierKind, Headers, Link, LinkMode, Links, PostProcessors,
    RepositoryMethodResponse, ResourceMap, UriListCodec, Value, LINKS_KEY, URI_LIST,
};
use url::Url;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    pub lines: Vec<String>,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub person: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CreateAddress {
    #[serde(default)]
    pub lines: Vec<String>,
    pub city: String,
    pub province: String,
    pub postal_code: String,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Address>>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    codec: UriListCodec,
    post_processors: Arc<PostProcessors>,
}

pub fn app() -> Router {
    app_with(PostProcessors::new())
}

/// Router whose outgoing uri-lists pass through `post_processors` first.
pub fn app_with(post_processors: PostProcessors) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(HashMap::new())),
        codec: UriListCodec::new(),
        post_processors: Arc::new(post_processors),
    };
    Router::new()
        .route("/addresses", get(list_addresses).post(create_address))
        .route("/addresses/{id}", get(get_address).delete(delete_address))
        .route(
            "/people/{person}/addresses",
            get(person_addresses)
                .put(replace_person_addresses)
                .post(append_person_addresses),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn wants_uri_list(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|accept| accepts(accept, URI_LIST))
}

fn to_headers(map: &HeaderMap) -> Headers {
    map.iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
        .collect()
}

fn base_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}")
}

fn address_href(base: &str, id: Uuid) -> Result<Url, AppError> {
    Url::parse(&format!("{base}/addresses/{id}")).map_err(|e| AppError::Internal(e.to_string()))
}

/// Id of the address an href points at (`.../addresses/{id}`).
fn address_id(href: &Url) -> Option<Uuid> {
    let segments: Vec<&str> = href.path_segments()?.collect();
    match segments.as_slice() {
        [.., "addresses", id] => id.parse().ok(),
        _ => None,
    }
}

/// Links to `addresses`, sorted by id so listings are stable.
fn links_to(base: &str, rel: &str, mut addresses: Vec<&Address>) -> Result<Links, AppError> {
    addresses.sort_by_key(|a| a.id);
    addresses
        .into_iter()
        .map(|a| Ok(Link::with_rel(rel, address_href(base, a.id)?)))
        .collect()
}

fn uri_list_response(state: &AppState, mut links: Links) -> Result<Response, AppError> {
    state.post_processors.apply(&mut links);
    let carrier = Carrier::Response(RepositoryMethodResponse::new(links));
    let body = state
        .codec
        .write_to_string(&carrier)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, URI_LIST)], body).into_response())
}

async fn list_addresses(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let db = state.db.read().await;
    if wants_uri_list(&headers) {
        let links = links_to(&base_url(&headers), "addresses", db.values().collect())?;
        debug!(count = links.len(), "listing addresses as uri-list");
        return uri_list_response(&state, links);
    }
    let mut addresses: Vec<Address> = db.values().cloned().collect();
    addresses.sort_by_key(|a| a.id);
    Ok(Json(addresses).into_response())
}

async fn create_address(
    State(state): State<AppState>,
    Json(input): Json<CreateAddress>,
) -> (StatusCode, Json<Address>) {
    let address = Address {
        id: Uuid::new_v4(),
        lines: input.lines,
        city: input.city,
        province: input.province,
        postal_code: input.postal_code,
        person: None,
    };
    state.db.write().await.insert(address.id, address.clone());
    debug!(id = %address.id, "created address");
    (StatusCode::CREATED, Json(address))
}

async fn get_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Address>, AppError> {
    let db = state.db.read().await;
    db.get(&id).cloned().map(Json).ok_or(AppError::NotFound)
}

async fn delete_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut db = state.db.write().await;
    db.remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(AppError::NotFound)
}

async fn person_addresses(
    State(state): State<AppState>,
    Path(person): Path<Uuid>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, AppError> {
    let rel = derive_relation(&Headers::new(), Some(uri.path())).unwrap_or_default();
    let db = state.db.read().await;
    let owned = db.values().filter(|a| a.person == Some(person)).collect();
    let links = links_to(&base_url(&headers), &rel, owned)?;

    if wants_uri_list(&headers) {
        return uri_list_response(&state, links);
    }
    let mut resource = ResourceMap::new();
    resource.insert(
        LINKS_KEY.to_string(),
        Value::List(links.into_iter().map(Value::Link).collect()),
    );
    Ok(Json(resource).into_response())
}

async fn replace_person_addresses(
    State(state): State<AppState>,
    Path(person): Path<Uuid>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    associate(&state, person, &headers, &uri, &body, LinkMode::Replace).await
}

async fn append_person_addresses(
    State(state): State<AppState>,
    Path(person): Path<Uuid>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    associate(&state, person, &headers, &uri, &body, LinkMode::Append).await
}

async fn associate(
    state: &AppState,
    person: Uuid,
    headers: &HeaderMap,
    uri: &Uri,
    body: &[u8],
    mode: LinkMode,
) -> Result<StatusCode, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    if content_type.is_none() || !state.codec.can_read(CarrierKind::Links, content_type) {
        return Err(AppError::UnsupportedMediaType(
            content_type.unwrap_or_default().to_string(),
        ));
    }

    let links = state
        .codec
        .read(&to_headers(headers), Some(uri.path()), body, CarrierKind::Links)
        .map_err(|e| {
            warn!(%person, error = %e, "rejected uri-list");
            AppError::NotReadable(e)
        })?
        .into_links();

    let ids = links
        .iter()
        .map(|link| {
            address_id(link.href())
                .ok_or_else(|| AppError::UnknownAddress(link.href_ascii().to_string()))
        })
        .collect::<Result<Vec<Uuid>, AppError>>()?;

    let mut db = state.db.write().await;
    if let Some(missing) = ids.iter().find(|id| !db.contains_key(id)) {
        return Err(AppError::UnknownAddress(missing.to_string()));
    }
    if mode == LinkMode::Replace {
        for address in db.values_mut().filter(|a| a.person == Some(person)) {
            address.person = None;
        }
    }
    for id in &ids {
        if let Some(address) = db.get_mut(id) {
            address.person = Some(person);
        }
    }
    debug!(%person, count = ids.len(), rel = ?links.iter().next().and_then(Link::rel), "associated addresses");
    Ok(StatusCode::NO_CONTENT)
}
