//! Database repository for ride, location and subscription operations.
//!
//! Uses prepared statements and conditional updates for data integrity.

use std::time::Duration;

use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    CreateRideRequest, LocationReport, ReportLocationRequest, Ride, RideStatus, Subscription,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== RIDE OPERATIONS ====================

    /// Create a new ride with status `Waiting` and a content-derived hash.
    pub async fn create_ride(&self, request: &CreateRideRequest) -> Result<Ride, AppError> {
        for (field, value) in [
            ("departureLocation", &request.departure_location),
            ("finalLocation", &request.final_location),
            ("driverName", &request.driver_name),
            ("rideId", &request.corrida_number),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{} is required", field)));
            }
        }

        let now = Utc::now().to_rfc3339();
        let hash = ride_hash(&now, &request.corrida_number, &request.driver_name);

        sqlx::query(
            "INSERT INTO rides (hash, corrida_number, driver_name, phone, plate, departure_location, final_location, status, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, 'Waiting', ?)"
        )
        .bind(&hash)
        .bind(&request.corrida_number)
        .bind(&request.driver_name)
        .bind(&request.phone)
        .bind(&request.plate)
        .bind(&request.departure_location)
        .bind(&request.final_location)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Ride {
            hash,
            corrida_number: request.corrida_number.clone(),
            driver_name: request.driver_name.clone(),
            phone: request.phone.clone(),
            plate: request.plate.clone(),
            departure_location: request.departure_location.clone(),
            final_location: request.final_location.clone(),
            status: RideStatus::Waiting,
            created_at: now,
        })
    }

    /// Get a ride by its unique hash.
    pub async fn get_ride(&self, hash: &str) -> Result<Option<Ride>, AppError> {
        let row = sqlx::query(
            "SELECT hash, corrida_number, driver_name, phone, plate, departure_location, final_location, status, created_at FROM rides WHERE hash = ?"
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(ride_from_row).transpose()
    }

    /// Get a ride by its correlation key. Corrida numbers are reused across
    /// regenerated rides; the most recently created record wins.
    pub async fn get_ride_by_corrida(
        &self,
        corrida_number: &str,
    ) -> Result<Option<Ride>, AppError> {
        let row = sqlx::query(
            "SELECT hash, corrida_number, driver_name, phone, plate, departure_location, final_location, status, created_at FROM rides WHERE corrida_number = ? ORDER BY created_at DESC LIMIT 1"
        )
        .bind(corrida_number)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(ride_from_row).transpose()
    }

    /// Transition a ride's status, enforcing the state machine.
    pub async fn set_status(&self, hash: &str, new_status: RideStatus) -> Result<Ride, AppError> {
        let existing = self
            .get_ride(hash)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ride {} not found", hash)))?;

        if !existing.status.can_transition_to(new_status) {
            return Err(AppError::IllegalTransition {
                from: existing.status.as_str(),
                to: new_status.as_str(),
            });
        }

        // Guard on the current status so a racing transition cannot bypass
        // the state machine between the read and the write.
        let result = sqlx::query("UPDATE rides SET status = ? WHERE hash = ? AND status = ?")
            .bind(new_status.as_str())
            .bind(hash)
            .bind(existing.status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            let current = self.get_ride(hash).await?;
            return Err(AppError::IllegalTransition {
                from: current.map(|r| r.status.as_str()).unwrap_or("unknown"),
                to: new_status.as_str(),
            });
        }

        Ok(Ride {
            status: new_status,
            ..existing
        })
    }

    /// List all rides, newest first.
    pub async fn list_rides(&self) -> Result<Vec<Ride>, AppError> {
        let rows = sqlx::query(
            "SELECT hash, corrida_number, driver_name, phone, plate, departure_location, final_location, status, created_at FROM rides ORDER BY created_at DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(ride_from_row).collect()
    }

    // ==================== LOCATION OPERATIONS ====================

    /// Append a location report. Reports are never upserted; duplicates and
    /// multiple drivers per corrida are all retained.
    pub async fn insert_location(
        &self,
        request: &ReportLocationRequest,
    ) -> Result<i64, AppError> {
        if !request.coordinates_valid() {
            return Err(AppError::Validation(
                "Invalid latitude or longitude".to_string(),
            ));
        }

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO locations (corrida_number, driver_name, latitude, longitude, precise, reported_at) VALUES (?, ?, ?, ?, ?, ?)"
        )
        .bind(&request.corrida_number)
        .bind(&request.driver_name)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(request.precise as i32)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// List all location reports in insertion order.
    pub async fn list_locations(&self) -> Result<Vec<LocationReport>, AppError> {
        let rows = sqlx::query(
            "SELECT id, corrida_number, driver_name, latitude, longitude, precise, reported_at FROM locations ORDER BY id"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(location_from_row).collect())
    }

    /// The most recent report per corrida, compared by `reported_at` rather
    /// than insertion order so out-of-order arrival is tolerated.
    pub async fn most_recent_per_ride(&self) -> Result<Vec<LocationReport>, AppError> {
        let rows = sqlx::query(
            r#"SELECT l.id, l.corrida_number, l.driver_name, l.latitude, l.longitude, l.precise, l.reported_at
               FROM locations l
               JOIN (
                   SELECT corrida_number, MAX(reported_at) AS max_reported
                   FROM locations
                   GROUP BY corrida_number
               ) latest
                 ON l.corrida_number = latest.corrida_number
                AND l.reported_at = latest.max_reported
               GROUP BY l.corrida_number
               ORDER BY l.corrida_number"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(location_from_row).collect())
    }

    /// Liveness check: has this corrida reported within the staleness window?
    pub async fn has_recent_location(
        &self,
        corrida_number: &str,
        window: Duration,
    ) -> Result<bool, AppError> {
        let window = chrono::Duration::from_std(window).unwrap_or_else(|_| chrono::Duration::zero());
        let cutoff = (Utc::now() - window).to_rfc3339();
        let row = sqlx::query(
            "SELECT COUNT(*) AS cnt FROM locations WHERE corrida_number = ? AND reported_at >= ?",
        )
        .bind(corrida_number)
        .bind(&cutoff)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.get("cnt");
        Ok(count > 0)
    }

    // ==================== SUBSCRIPTION OPERATIONS ====================

    /// Register or replace the push endpoint for a corrida. Row-level upsert:
    /// the registry only ever tracks the latest known endpoint per ride.
    pub async fn upsert_subscription(
        &self,
        corrida_number: &str,
        endpoint: &str,
        keys: Option<&serde_json::Value>,
    ) -> Result<Subscription, AppError> {
        let now = Utc::now().to_rfc3339();
        let keys_json = keys.map(|k| k.to_string());

        sqlx::query(
            r#"INSERT INTO subscriptions (corrida_number, endpoint, keys_json, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(corrida_number)
               DO UPDATE SET endpoint = excluded.endpoint,
                             keys_json = excluded.keys_json,
                             updated_at = excluded.updated_at"#,
        )
        .bind(corrida_number)
        .bind(endpoint)
        .bind(&keys_json)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Subscription {
            corrida_number: corrida_number.to_string(),
            endpoint: endpoint.to_string(),
            keys: keys.cloned(),
            updated_at: now,
        })
    }

    /// Remove the subscription for a corrida. Returns whether a row existed.
    pub async fn remove_subscription(&self, corrida_number: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE corrida_number = ?")
            .bind(corrida_number)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every subscription carrying an endpoint the push transport
    /// reported permanently gone.
    pub async fn prune_endpoint(&self, endpoint: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE endpoint = ?")
            .bind(endpoint)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// List all subscriptions.
    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>, AppError> {
        let rows = sqlx::query(
            "SELECT corrida_number, endpoint, keys_json, updated_at FROM subscriptions ORDER BY corrida_number"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(subscription_from_row).collect())
    }
}

/// Content-derived ride token: creation time, correlation key and driver
/// name, salted with a fresh UUID against same-instant collisions.
fn ride_hash(created_at: &str, corrida_number: &str, driver_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(created_at.as_bytes());
    hasher.update(corrida_number.as_bytes());
    hasher.update(driver_name.as_bytes());
    hasher.update(uuid::Uuid::new_v4().as_bytes());
    let digest = hasher.finalize();
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

// Helper functions for row conversion

fn ride_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Ride, AppError> {
    let status_str: String = row.get("status");
    let status = RideStatus::from_str(&status_str).ok_or_else(|| {
        AppError::Internal(format!("Unknown ride status in database: {}", status_str))
    })?;

    Ok(Ride {
        hash: row.get("hash"),
        corrida_number: row.get("corrida_number"),
        driver_name: row.get("driver_name"),
        phone: row.get("phone"),
        plate: row.get("plate"),
        departure_location: row.get("departure_location"),
        final_location: row.get("final_location"),
        status,
        created_at: row.get("created_at"),
    })
}

fn location_from_row(row: &sqlx::sqlite::SqliteRow) -> LocationReport {
    let precise: i32 = row.get("precise");
    LocationReport {
        id: row.get("id"),
        corrida_number: row.get("corrida_number"),
        driver_name: row.get("driver_name"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        precise: precise != 0,
        reported_at: row.get("reported_at"),
    }
}

fn subscription_from_row(row: &sqlx::sqlite::SqliteRow) -> Subscription {
    let keys_json: Option<String> = row.get("keys_json");
    Subscription {
        corrida_number: row.get("corrida_number"),
        endpoint: row.get("endpoint"),
        keys: keys_json.and_then(|s| serde_json::from_str(&s).ok()),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ride_hash_shape_and_uniqueness() {
        let a = ride_hash("2025-01-01T00:00:00+00:00", "CTE1", "Joe");
        let b = ride_hash("2025-01-01T00:00:00+00:00", "CTE1", "Joe");
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        // UUID salt keeps identical inputs from colliding
        assert_ne!(a, b);
    }
}
