//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::bridge::{Annotation, RouteSet};
use crate::catalog::SortKey;
use crate::constants::map::{CALLOUT_IMAGE_SIZE, MAX_THUMBNAIL_SIZE};
use crate::coord::Coordinates;
use crate::error::{Alert, Error};
use crate::place::{photo, PlaceFields, PlaceRecord, PlaceSummary};
use crate::server::state::AppState;

use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

/// Largest accepted request body; places carry base64 photos
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/places", get(list_handler).post(create_handler))
        .route(
            "/api/places/:id",
            get(place_handler).put(update_handler).delete(delete_handler),
        )
        .route("/api/places/:id/image", get(image_handler))
        .route("/api/places/:id/thumbnail", get(thumbnail_handler))
        .route("/api/places/:id/map", get(map_handler))
        .route("/api/places/:id/route", post(route_handler))
        .route("/api/address", get(address_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    /// Message to show the user, for location and map failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
    #[serde(skip, default = "internal_status")]
    status: StatusCode,
}

fn internal_status() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::PlaceNotFound(_) => (StatusCode::NOT_FOUND, "PLACE_NOT_FOUND"),
            Error::AddressNotFound(_) => (StatusCode::NOT_FOUND, "ADDRESS_NOT_FOUND"),
            Error::RouteUnavailable => (StatusCode::NOT_FOUND, "ROUTE_UNAVAILABLE"),
            Error::PositionUnavailable => (StatusCode::NOT_FOUND, "POSITION_UNAVAILABLE"),
            Error::InvalidPlace(_) => (StatusCode::BAD_REQUEST, "INVALID_PLACE"),
            Error::InvalidRating(_) => (StatusCode::BAD_REQUEST, "INVALID_RATING"),
            Error::InvalidCoordinates(_) => (StatusCode::BAD_REQUEST, "INVALID_COORDINATES"),
            Error::ImageDecode(_) => (StatusCode::BAD_REQUEST, "INVALID_IMAGE"),
            Error::LocationServiceDisabled
            | Error::LocationPermissionDenied
            | Error::LocationPermissionRestricted => (StatusCode::BAD_REQUEST, "LOCATION_UNAVAILABLE"),
            Error::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
            alert: err.alert(),
            status,
        }
    }
}

async fn find_place(state: &AppState, id: Uuid) -> Result<PlaceRecord, ApiError> {
    state
        .store
        .get(id)
        .await
        .ok_or_else(|| Error::PlaceNotFound(id).into())
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Places in the catalog
    pub places: usize,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        places: state.store.len().await,
        uptime_secs: state.uptime_secs(),
    })
}

/// Listing query
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// "date" or "name"; insertion order when absent
    pub sort: Option<String>,
    #[serde(default = "default_ascending")]
    pub ascending: bool,
    /// Case-insensitive substring of name or location
    #[serde(default)]
    pub search: String,
}

fn default_ascending() -> bool {
    true
}

/// Places list response
#[derive(Debug, Serialize, Deserialize)]
pub struct PlacesResponse {
    pub places: Vec<PlaceSummary>,
    pub count: usize,
}

/// List places
///
/// GET /api/places?sort=name&ascending=false&search=cafe
async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PlacesResponse>, ApiError> {
    let mut view = state.store.all();
    if let Some(sort) = &query.sort {
        let key: SortKey = sort
            .parse()
            .map_err(|e: String| ApiError::from(Error::InvalidPlace(e)))?;
        view = view.sorted_by(key, query.ascending);
    }
    let view = view.search(&query.search);

    let places: Vec<PlaceSummary> = view.records().await.iter().map(PlaceSummary::from).collect();
    let count = places.len();
    Ok(Json(PlacesResponse { places, count }))
}

/// Create a place
///
/// POST /api/places
async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(fields): Json<PlaceFields>,
) -> Result<(StatusCode, Json<PlaceSummary>), ApiError> {
    let record = state.store.add(fields).await?;
    info!("Added place {} ({})", record.name(), record.id);
    Ok((StatusCode::CREATED, Json(PlaceSummary::from(&record))))
}

/// Get a single place
///
/// GET /api/places/:id
async fn place_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlaceSummary>, ApiError> {
    let record = find_place(&state, id).await?;
    Ok(Json(PlaceSummary::from(&record)))
}

/// Body of a place update
///
/// Place responses carry no image bytes, so an omitted `image` keeps the
/// stored photo. `clear_image` removes it.
#[derive(Debug, Deserialize)]
pub struct PlaceUpdate {
    #[serde(flatten)]
    pub fields: PlaceFields,
    #[serde(default)]
    pub clear_image: bool,
}

/// Replace every field of a place
///
/// PUT /api/places/:id
async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(update): Json<PlaceUpdate>,
) -> Result<Json<PlaceSummary>, ApiError> {
    let mut fields = update.fields;
    if update.clear_image {
        fields.image = None;
    } else if fields.image.is_none() {
        fields.image = find_place(&state, id).await?.fields.image;
    }

    let record = state.store.update(id, fields).await?;
    Ok(Json(PlaceSummary::from(&record)))
}

/// Delete a place
///
/// DELETE /api/places/:id
async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let record = state.store.remove(id).await?;
    info!("Removed place {} ({})", record.name(), record.id);
    Ok(StatusCode::NO_CONTENT)
}

/// Place photo, or the placeholder when it has none
///
/// GET /api/places/:id/image
async fn image_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let record = find_place(&state, id).await?;
    let bytes = match record.fields.image {
        Some(bytes) => bytes,
        None => photo::placeholder_png()?,
    };
    let mime = photo::mime_type(&bytes);
    Ok(([(header::CONTENT_TYPE, mime)], bytes))
}

#[derive(Debug, Deserialize)]
pub struct ThumbnailQuery {
    #[serde(default = "default_thumbnail_size")]
    pub size: u32,
}

fn default_thumbnail_size() -> u32 {
    CALLOUT_IMAGE_SIZE
}

/// Square PNG thumbnail of the place photo
///
/// GET /api/places/:id/thumbnail?size=50
async fn thumbnail_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ThumbnailQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if query.size == 0 || query.size > MAX_THUMBNAIL_SIZE {
        return Err(Error::InvalidPlace(format!("Invalid thumbnail size: {}", query.size)).into());
    }

    let record = find_place(&state, id).await?;
    let source = match record.fields.image {
        Some(bytes) => bytes,
        None => photo::placeholder_png()?,
    };
    let png = photo::thumbnail(&source, query.size)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// Map pin for a place
#[derive(Debug, Serialize, Deserialize)]
pub struct MapResponse {
    pub annotation: Annotation,
    /// Link to the pin on the default map provider
    pub url: String,
}

/// Resolve a place's location to a map pin
///
/// GET /api/places/:id/map
async fn map_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MapResponse>, ApiError> {
    let record = find_place(&state, id).await?;
    let Some(location) = record.location() else {
        return Err(Error::AddressNotFound(record.name().to_string()).into());
    };

    let bridge = state.bridge(None);
    let annotation = bridge
        .setup_placemark(&record.fields)
        .await
        .ok_or_else(|| Error::AddressNotFound(location.to_string()))?;
    let url = state
        .config
        .format_url(None, annotation.coords.lat, annotation.coords.lng)?;

    Ok(Json(MapResponse { annotation, url }))
}

/// Route request body
#[derive(Debug, Default, Deserialize)]
pub struct RouteBody {
    /// Start point; the configured device position when absent
    pub from: Option<Coordinates>,
}

/// Driving routes from the device to a place
///
/// POST /api/places/:id/route
async fn route_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    body: Option<Json<RouteBody>>,
) -> Result<Json<RouteSet>, ApiError> {
    let record = find_place(&state, id).await?;
    let Some(location) = record.location() else {
        return Err(Error::AddressNotFound(record.name().to_string()).into());
    };

    let from = body.and_then(|Json(b)| b.from);
    if let Some(from) = from {
        from.validate()?;
    }

    let bridge = state.bridge(from);
    bridge.check_location_services().await?;
    bridge
        .resolve_coordinates(location)
        .await
        .ok_or_else(|| Error::AddressNotFound(location.to_string()))?;

    Ok(Json(bridge.directions().await?))
}

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    pub lat: f64,
    pub lng: f64,
}

/// Reverse geocode response
#[derive(Debug, Serialize, Deserialize)]
pub struct AddressResponse {
    pub coords: Coordinates,
    /// "street, number", "street" or empty
    pub address: String,
}

/// Short address at a point
///
/// GET /api/address?lat=..&lng=..
async fn address_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AddressQuery>,
) -> Result<Json<AddressResponse>, ApiError> {
    let coords = Coordinates::new(query.lat, query.lng);
    coords.validate()?;

    let address = state
        .bridge(None)
        .reverse_geocode(coords)
        .await
        .ok_or_else(|| Error::Geo(format!("Reverse geocoding failed for {}", coords)))?;

    Ok(Json(AddressResponse { coords, address }))
}
