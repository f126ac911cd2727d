use async_trait::async_trait;
use chrono::{DateTime, Utc};
use runway_core::flight::normalize_flight_number;
use runway_core::search::FlightSearchRequest;
use runway_core::{Flight, FlightRepository, StoreResult};
use uuid::Uuid;

use crate::database::{int4, store_error};

pub struct PgFlightRepository {
    pub pool: sqlx::PgPool,
}

impl PgFlightRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    flight_number: String,
    airline: String,
    aircraft_type: String,
    origin: String,
    destination: String,
    schedule: DateTime<Utc>,
    price_cents: i64,
    seat_capacity: i32,
    seats_available: i32,
    created_at: DateTime<Utc>,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            id: row.id,
            flight_number: row.flight_number,
            airline: row.airline,
            aircraft_type: row.aircraft_type,
            origin: row.origin,
            destination: row.destination,
            schedule: row.schedule,
            price_cents: row.price_cents,
            seat_capacity: row.seat_capacity.max(0) as u32,
            seats_available: row.seats_available.max(0) as u32,
            created_at: row.created_at,
        }
    }
}

const FLIGHT_COLUMNS: &str = "id, flight_number, airline, aircraft_type, origin, destination, \
     schedule, price_cents, seat_capacity, seats_available, created_at";

#[async_trait]
impl FlightRepository for PgFlightRepository {
    async fn create_flight(&self, flight: &Flight) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO flights (id, flight_number, airline, aircraft_type, origin, destination,
                                 schedule, price_cents, seat_capacity, seats_available, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(flight.id)
        .bind(&flight.flight_number)
        .bind(&flight.airline)
        .bind(&flight.aircraft_type)
        .bind(&flight.origin)
        .bind(&flight.destination)
        .bind(flight.schedule)
        .bind(flight.price_cents)
        .bind(int4(flight.seat_capacity, "seat_capacity")?)
        .bind(int4(flight.seats_available, "seats_available")?)
        .bind(flight.created_at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(())
    }

    async fn get_flight_by_id(&self, id: Uuid) -> StoreResult<Option<Flight>> {
        let row: Option<FlightRow> =
            sqlx::query_as(&format!("SELECT {} FROM flights WHERE id = $1", FLIGHT_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(store_error)?;

        Ok(row.map(Flight::from))
    }

    async fn get_flight_by_number(&self, flight_number: &str) -> StoreResult<Option<Flight>> {
        let row: Option<FlightRow> = sqlx::query_as(&format!(
            "SELECT {} FROM flights WHERE flight_number = $1",
            FLIGHT_COLUMNS
        ))
        .bind(normalize_flight_number(flight_number))
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Flight::from))
    }

    async fn list_flights(&self) -> StoreResult<Vec<Flight>> {
        let rows: Vec<FlightRow> =
            sqlx::query_as(&format!("SELECT {} FROM flights ORDER BY schedule ASC", FLIGHT_COLUMNS))
                .fetch_all(&self.pool)
                .await
                .map_err(store_error)?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }

    async fn search_flights(&self, request: &FlightSearchRequest) -> StoreResult<Vec<Flight>> {
        let rows: Vec<FlightRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM flights
            WHERE UPPER(origin) = UPPER($1)
              AND UPPER(destination) = UPPER($2)
              AND ($3::date IS NULL OR (schedule AT TIME ZONE 'UTC')::date = $3)
            ORDER BY schedule ASC
            "#,
            FLIGHT_COLUMNS
        ))
        .bind(request.origin.trim())
        .bind(request.destination.trim())
        .bind(request.date)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }
}
