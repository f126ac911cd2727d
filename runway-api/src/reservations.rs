use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use runway_booking::{NewReservation, ReservationChanges};
use runway_catalog::coerce;
use runway_core::validation::PassengerDetails;
use runway_core::{Baggage, Bill, Meal, Reservation, ReservationStatus, Seat};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::Requester;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/reservations", post(create_reservation).get(list_reservations))
        .route("/v1/reservations/{id}", get(get_reservation).put(update_reservation))
        .route("/v1/reservations/{id}/cancel", post(cancel_reservation))
}

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub flight_id: Uuid,
    pub passenger: PassengerDetails,
    pub seat_code: String,
    #[serde(default)]
    pub meal: Option<String>,
    /// Minor units; numbers or numeric strings, anything else counts as 0
    #[serde(default)]
    pub meal_price: Value,
    #[serde(default)]
    pub baggage_kg: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReservationRequest {
    #[serde(default)]
    pub seat_code: Option<String>,
    #[serde(default)]
    pub meal: Option<String>,
    #[serde(default)]
    pub meal_price: Option<Value>,
    #[serde(default)]
    pub baggage_kg: Option<Value>,
}

impl UpdateReservationRequest {
    fn into_changes(self) -> ReservationChanges {
        let meal = match (self.meal, self.meal_price) {
            (None, None) => None,
            (label, price) => Some(Meal::new(
                label,
                coerce::amount_cents(&price.unwrap_or(Value::Null)),
            )),
        };

        ReservationChanges {
            seat_code: self.seat_code,
            meal,
            baggage_kg: self.baggage_kg.as_ref().map(coerce::kilograms),
        }
    }
}

/// Client view of a reservation. Contact and travel documents are only hinted at.
#[derive(Debug, Serialize)]
pub struct ReservationView {
    pub id: Uuid,
    pub flight_id: Uuid,
    pub pnr: String,
    pub status: ReservationStatus,
    pub passenger_name: String,
    pub email_hint: String,
    pub passport_hint: String,
    pub seat: Seat,
    pub meal: Meal,
    pub baggage: Baggage,
    pub bill: Bill,
    pub checked_in: bool,
    pub boarding_pass_no: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationView {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            flight_id: r.flight_id,
            passenger_name: r.passenger.full_name(),
            email_hint: r.passenger.email.hint(),
            passport_hint: r.passenger.passport.hint(),
            pnr: r.pnr,
            status: r.status,
            seat: r.seat,
            meal: r.meal,
            baggage: r.baggage,
            bill: r.bill,
            checked_in: r.checked_in,
            boarding_pass_no: r.boarding_pass_no,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateReservationResponse {
    pub reservation: ReservationView,
    pub amount_due_cents: i64,
}

async fn create_reservation(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationView>), AppError> {
    let request = NewReservation {
        flight_id: req.flight_id,
        passenger: req.passenger,
        seat_code: req.seat_code,
        meal: Meal::new(req.meal, coerce::amount_cents(&req.meal_price)),
        baggage_kg: coerce::kilograms(&req.baggage_kg),
    };

    let reservation = state.lifecycle.create(request, requester.user_id).await?;
    Ok((StatusCode::CREATED, Json(reservation.into())))
}

async fn list_reservations(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> Result<Json<Vec<ReservationView>>, AppError> {
    let user_id = requester.user_id.ok_or_else(|| {
        AppError::AuthenticationError("Sign in to see your reservations.".to_string())
    })?;

    let reservations = state.lifecycle.list_for_user(user_id).await?;
    Ok(Json(reservations.into_iter().map(ReservationView::from).collect()))
}

async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationView>, AppError> {
    let reservation = state.lifecycle.get(id).await?;
    Ok(Json(reservation.into()))
}

async fn update_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateReservationRequest>,
) -> Result<Json<UpdateReservationResponse>, AppError> {
    let outcome = state.lifecycle.update(id, req.into_changes()).await?;

    Ok(Json(UpdateReservationResponse {
        reservation: outcome.reservation.into(),
        amount_due_cents: outcome.amount_due_cents,
    }))
}

async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationView>, AppError> {
    let cancelled = state
        .lifecycle
        .cancel(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Reservation {} not found", id)))?;

    Ok(Json(cancelled.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_request_coercion() {
        let req: UpdateReservationRequest =
            serde_json::from_value(json!({"baggage_kg": "15", "meal_price": "abc"})).unwrap();
        let changes = req.into_changes();

        assert_eq!(changes.baggage_kg, Some(15));
        assert_eq!(changes.meal, Some(Meal::new(None, 0)));
        assert!(changes.seat_code.is_none());
    }

    #[test]
    fn test_empty_update_changes_nothing() {
        let changes = UpdateReservationRequest::default().into_changes();
        assert!(changes.meal.is_none());
        assert!(changes.baggage_kg.is_none());
    }
}
