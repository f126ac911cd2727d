use async_trait::async_trait;
use chrono::{DateTime, Utc};
use runway_core::{
    Baggage, Bill, Meal, Passenger, Reservation, ReservationRepository, ReservationStatus, Seat,
    StoreError, StoreResult,
};
use runway_shared::Masked;
use uuid::Uuid;

use crate::database::{int4, store_error, uint4};

pub struct PgReservationRepository {
    pub pool: sqlx::PgPool,
}

impl PgReservationRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    flight_id: Uuid,
    user_id: Option<Uuid>,
    first_name: String,
    last_name: String,
    email: String,
    passport: String,
    seat_code: String,
    seat_is_premium: bool,
    meal_label: String,
    meal_price_cents: i64,
    baggage_kg: i32,
    base_fare_cents: i64,
    seat_fee_cents: i64,
    meal_fee_cents: i64,
    baggage_fee_cents: i64,
    subtotal_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    status: String,
    pnr: String,
    checked_in: bool,
    boarding_pass_no: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = StoreError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<ReservationStatus>().map_err(StoreError::Backend)?;

        Ok(Reservation {
            id: row.id,
            flight_id: row.flight_id,
            user_id: row.user_id,
            passenger: Passenger {
                first_name: row.first_name,
                last_name: row.last_name,
                email: Masked(row.email),
                passport: Masked(row.passport),
            },
            seat: Seat {
                code: row.seat_code,
                is_premium: row.seat_is_premium,
            },
            meal: Meal {
                label: row.meal_label,
                price_cents: row.meal_price_cents,
            },
            baggage: Baggage {
                kg: uint4(row.baggage_kg, "baggage_kg")?,
            },
            bill: Bill {
                base_fare_cents: row.base_fare_cents,
                seat_fee_cents: row.seat_fee_cents,
                meal_fee_cents: row.meal_fee_cents,
                baggage_fee_cents: row.baggage_fee_cents,
                subtotal_cents: row.subtotal_cents,
                tax_cents: row.tax_cents,
                total_cents: row.total_cents,
            },
            status,
            pnr: row.pnr,
            checked_in: row.checked_in,
            boarding_pass_no: row.boarding_pass_no,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_reservation(row: Option<ReservationRow>) -> StoreResult<Option<Reservation>> {
    row.map(Reservation::try_from).transpose()
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    async fn find_active_by_seat(
        &self,
        flight_id: Uuid,
        seat_code: &str,
        exclude_id: Option<Uuid>,
    ) -> StoreResult<Option<Reservation>> {
        let row: Option<ReservationRow> = sqlx::query_as(
            r#"
            SELECT * FROM reservations
            WHERE flight_id = $1 AND seat_code = $2 AND status <> 'cancelled'
              AND ($3::uuid IS NULL OR id <> $3)
            LIMIT 1
            "#,
        )
        .bind(flight_id)
        .bind(seat_code)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        into_reservation(row)
    }

    async fn active_seat_codes(
        &self,
        flight_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> StoreResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT seat_code FROM reservations
            WHERE flight_id = $1 AND status <> 'cancelled'
              AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(flight_id)
        .bind(exclude_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(|(code,)| code).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Reservation>> {
        let row: Option<ReservationRow> = sqlx::query_as("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        into_reservation(row)
    }

    async fn find_by_pnr(&self, pnr: &str) -> StoreResult<Option<Reservation>> {
        let row: Option<ReservationRow> = sqlx::query_as("SELECT * FROM reservations WHERE pnr = $1")
            .bind(pnr)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        into_reservation(row)
    }

    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Reservation>> {
        let rows: Vec<ReservationRow> = sqlx::query_as(
            "SELECT * FROM reservations WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn exists(&self, pnr: &str) -> StoreResult<bool> {
        let (found,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM reservations WHERE pnr = $1)")
                .bind(pnr)
                .fetch_one(&self.pool)
                .await
                .map_err(store_error)?;

        Ok(found)
    }

    async fn exists_boarding_pass(&self, code: &str) -> StoreResult<bool> {
        let (found,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM reservations WHERE boarding_pass_no = $1)")
                .bind(code)
                .fetch_one(&self.pool)
                .await
                .map_err(store_error)?;

        Ok(found)
    }

    async fn insert(&self, r: &Reservation) -> StoreResult<Reservation> {
        let row: ReservationRow = sqlx::query_as(
            r#"
            INSERT INTO reservations (
                id, flight_id, user_id, first_name, last_name, email, passport,
                seat_code, seat_is_premium, meal_label, meal_price_cents, baggage_kg,
                base_fare_cents, seat_fee_cents, meal_fee_cents, baggage_fee_cents,
                subtotal_cents, tax_cents, total_cents, status, pnr, checked_in,
                boarding_pass_no, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23, $24, $25)
            RETURNING *
            "#,
        )
        .bind(r.id)
        .bind(r.flight_id)
        .bind(r.user_id)
        .bind(&r.passenger.first_name)
        .bind(&r.passenger.last_name)
        .bind(r.passenger.email.expose())
        .bind(r.passenger.passport.expose())
        .bind(&r.seat.code)
        .bind(r.seat.is_premium)
        .bind(&r.meal.label)
        .bind(r.meal.price_cents)
        .bind(int4(r.baggage.kg, "baggage_kg")?)
        .bind(r.bill.base_fare_cents)
        .bind(r.bill.seat_fee_cents)
        .bind(r.bill.meal_fee_cents)
        .bind(r.bill.baggage_fee_cents)
        .bind(r.bill.subtotal_cents)
        .bind(r.bill.tax_cents)
        .bind(r.bill.total_cents)
        .bind(r.status.as_str())
        .bind(&r.pnr)
        .bind(r.checked_in)
        .bind(&r.boarding_pass_no)
        .bind(r.created_at)
        .bind(r.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Reservation::try_from(row)
    }

    async fn update_selection(&self, r: &Reservation) -> StoreResult<Option<Reservation>> {
        let row: Option<ReservationRow> = sqlx::query_as(
            r#"
            UPDATE reservations
            SET seat_code = $2, seat_is_premium = $3, meal_label = $4, meal_price_cents = $5,
                baggage_kg = $6, base_fare_cents = $7, seat_fee_cents = $8, meal_fee_cents = $9,
                baggage_fee_cents = $10, subtotal_cents = $11, tax_cents = $12,
                total_cents = $13, updated_at = $14
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(r.id)
        .bind(&r.seat.code)
        .bind(r.seat.is_premium)
        .bind(&r.meal.label)
        .bind(r.meal.price_cents)
        .bind(int4(r.baggage.kg, "baggage_kg")?)
        .bind(r.bill.base_fare_cents)
        .bind(r.bill.seat_fee_cents)
        .bind(r.bill.meal_fee_cents)
        .bind(r.bill.baggage_fee_cents)
        .bind(r.bill.subtotal_cents)
        .bind(r.bill.tax_cents)
        .bind(r.bill.total_cents)
        .bind(r.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        into_reservation(row)
    }

    async fn mark_cancelled(&self, id: Uuid) -> StoreResult<Option<Reservation>> {
        let row: Option<ReservationRow> = sqlx::query_as(
            r#"
            UPDATE reservations
            SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        into_reservation(row)
    }

    async fn record_check_in(
        &self,
        id: Uuid,
        boarding_pass_no: &str,
    ) -> StoreResult<Option<Reservation>> {
        let row: Option<ReservationRow> = sqlx::query_as(
            r#"
            UPDATE reservations
            SET checked_in = TRUE, boarding_pass_no = $2, updated_at = NOW()
            WHERE id = $1 AND checked_in = FALSE AND status <> 'cancelled'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(boarding_pass_no)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        into_reservation(row)
    }
}
