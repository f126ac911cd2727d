use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use runway_catalog::SeatAvailability;
use runway_core::search::FlightSearchRequest;
use runway_core::{Flight, NewFlight};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/flights", get(list_flights))
        .route("/v1/flights/{id}", get(get_flight))
        .route("/v1/flights/number/{flight_number}", get(get_flight_by_number))
        .route("/v1/flights/{id}/seats", get(get_seats))
        .route("/v1/flights/{id}/stream", get(seat_stream))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/v1/admin/flights", post(create_flight))
}

#[derive(Debug, Default, Deserialize)]
pub struct FlightQuery {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct SeatMapResponse {
    pub flight_id: Uuid,
    pub occupied: Vec<String>,
    pub availability: SeatAvailability,
    pub sold_out: bool,
    /// Share of capacity held by active reservations, 0.0 to 1.0 (above 1.0 when overbooked)
    pub utilization: f64,
}

/// Route search when both endpoints are given, otherwise the full schedule.
async fn list_flights(
    State(state): State<AppState>,
    Query(query): Query<FlightQuery>,
) -> Result<Json<Vec<Flight>>, AppError> {
    let flights = match (query.origin, query.destination) {
        (Some(origin), Some(destination)) => {
            let request = FlightSearchRequest {
                origin,
                destination,
                date: query.date,
            };
            state.flights.search_flights(&request).await?
        }
        (None, None) => state.flights.list_flights().await?,
        _ => {
            return Err(AppError::ValidationError(
                "Both origin and destination are required to search.".to_string(),
            ))
        }
    };

    Ok(Json(flights))
}

async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Flight>, AppError> {
    state
        .flights
        .get_flight_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Flight {} not found", id)))
}

async fn get_flight_by_number(
    State(state): State<AppState>,
    Path(flight_number): Path<String>,
) -> Result<Json<Flight>, AppError> {
    state
        .flights
        .get_flight_by_number(&flight_number)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Flight {} not found", flight_number)))
}

async fn get_seats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SeatMapResponse>, AppError> {
    let occupied = state.lifecycle.occupied_seats(id, None).await?;
    let availability = state.lifecycle.seat_availability(id).await?;

    Ok(Json(SeatMapResponse {
        flight_id: id,
        occupied,
        sold_out: availability.is_sold_out(),
        utilization: availability.utilization(),
        availability,
    }))
}

/// Live seat activity for one flight. Lagged receivers skip what they missed.
async fn seat_stream(
    State(state): State<AppState>,
    Path(flight_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.sse_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) if event.flight_id() == flight_id => {
            Event::default().event(event.kind()).json_data(&event).ok().map(Ok)
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn create_flight(
    State(state): State<AppState>,
    Json(req): Json<NewFlight>,
) -> Result<(StatusCode, Json<Flight>), AppError> {
    let flight = req.validate()?;
    state.flights.create_flight(&flight).await?;

    info!("Flight {} created with {} seats", flight.flight_number, flight.seat_capacity);
    Ok((StatusCode::CREATED, Json(flight)))
}
