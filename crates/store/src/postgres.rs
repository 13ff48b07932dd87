//! Postgres-backed rental store.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `ToolError` as follows:
//!
//! | SQLx Error | PostgreSQL SQLSTATE | ToolError | Scenario |
//! |------------|--------------------|-----------|----------|
//! | Database (foreign key violation) | `23503` | `NotFound` | rent referenced a missing customer/staff row |
//! | Database (syntax error or access rule class) | `42xxx` | `InvalidQuery` | guarded free-form query was well-guarded but not valid SQL |
//! | Io / PoolTimedOut / PoolClosed | N/A | `StoreUnavailable` | connection or pool failure |
//! | Other | Any other | `StoreUnavailable` | decode failures, unexpected database errors |
//!
//! ## Concurrency
//!
//! The two mutating operations take a row-level lock (`SELECT ... FOR
//! UPDATE`) on the row that scopes the race — the inventory row for rents,
//! the rental row for returns — then re-check state and write inside the
//! same transaction. Racing calls on the same row serialize on the lock;
//! exactly one observes the valid precondition. Calls on different rows do
//! not contend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use rentaldesk_core::{
    AvailableUnit, ColumnInfo, CustomerId, CustomerRecord, FilmId, FilmRecord, HistoryEntry,
    InventoryId, RentalId, RentalReceipt, ReturnReceipt, RevenueRow, StaffId, ToolError,
    ToolResult,
};

use crate::r#trait::{FilmFilter, RentalStore, RevenueGrouping};

/// Production store over a pooled Postgres connection.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(op: &'static str, err: sqlx::Error) -> ToolError {
    match &err {
        sqlx::Error::Database(db) => match db.code().as_deref() {
            // Syntax error / access rule class: the statement itself is bad.
            Some(code) if code.starts_with("42") => {
                ToolError::invalid_query(format!("{op}: {}", db.message()))
            }
            _ => ToolError::store_unavailable(format!("{op}: {}", db.message())),
        },
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            ToolError::store_unavailable(format!("{op}: {err}"))
        }
        _ => ToolError::store_unavailable(format!("{op}: {err}")),
    }
}

/// Map a foreign-key violation on the rental insert to the entity whose id
/// was missing; anything else falls through to the generic mapping.
fn map_rental_insert_error(
    err: sqlx::Error,
    customer_id: CustomerId,
    staff_id: StaffId,
) -> ToolError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23503") {
            return match db.constraint() {
                Some(c) if c.contains("customer") => {
                    ToolError::not_found("customer", customer_id.as_i32())
                }
                Some(c) if c.contains("staff") => {
                    ToolError::not_found("staff", staff_id.as_i32())
                }
                _ => ToolError::store_unavailable(format!("attempt_rent: {}", db.message())),
            };
        }
    }
    map_sqlx_error("attempt_rent", err)
}

fn decode<T>(result: Result<T, sqlx::Error>, column: &'static str) -> ToolResult<T> {
    result.map_err(|e| ToolError::store_unavailable(format!("failed to decode {column}: {e}")))
}

fn film_from_row(row: &PgRow) -> ToolResult<FilmRecord> {
    Ok(FilmRecord {
        film_id: FilmId::new(decode(row.try_get("film_id"), "film_id")?),
        title: decode(row.try_get("title"), "title")?,
        genre: decode(row.try_get("genre"), "genre")?,
        release_year: decode(row.try_get("release_year"), "release_year")?,
        rental_rate: decode(row.try_get("rental_rate"), "rental_rate")?,
        rating: decode(row.try_get("rating"), "rating")?,
        description: decode(row.try_get("description"), "description")?,
    })
}

#[async_trait]
impl RentalStore for PostgresStore {
    #[instrument(skip(self), fields(limit = filter.limit))]
    async fn search_films(&self, filter: &FilmFilter) -> ToolResult<Vec<FilmRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT
                f.film_id,
                f.title,
                c.name AS genre,
                f.release_year::int AS release_year,
                f.rental_rate,
                f.rating::text AS rating,
                f.description
            FROM film f
            JOIN film_category fc ON f.film_id = fc.film_id
            JOIN category c ON fc.category_id = c.category_id
            WHERE ($1::text IS NULL
                   OR f.title ILIKE '%' || $1 || '%'
                   OR f.description ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR c.name ILIKE '%' || $2 || '%')
              AND ($3::int IS NULL OR f.release_year::int = $3)
            ORDER BY f.title
            LIMIT $4
            "#,
        )
        .bind(filter.search_term.as_deref())
        .bind(filter.genre.as_deref())
        .bind(filter.year)
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("search_films", e))?;

        rows.iter().map(film_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn search_customers(&self, term: &str, limit: i64) -> ToolResult<Vec<CustomerRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT customer_id, first_name, last_name, email, activebool AS active
            FROM customer
            WHERE first_name ILIKE '%' || $1 || '%'
               OR last_name ILIKE '%' || $1 || '%'
               OR email ILIKE '%' || $1 || '%'
            ORDER BY last_name, first_name
            LIMIT $2
            "#,
        )
        .bind(term)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("search_customers", e))?;

        rows.iter()
            .map(|row| {
                Ok(CustomerRecord {
                    customer_id: CustomerId::new(decode(row.try_get("customer_id"), "customer_id")?),
                    first_name: decode(row.try_get("first_name"), "first_name")?,
                    last_name: decode(row.try_get("last_name"), "last_name")?,
                    email: decode(row.try_get("email"), "email")?,
                    active: decode(row.try_get("active"), "active")?,
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(customer_id = %customer_id))]
    async fn customer_history(
        &self,
        customer_id: CustomerId,
        limit: i64,
    ) -> ToolResult<Vec<HistoryEntry>> {
        let exists = sqlx::query("SELECT 1 FROM customer WHERE customer_id = $1")
            .bind(customer_id.as_i32())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("customer_history", e))?;
        if exists.is_none() {
            return Err(ToolError::not_found("customer", customer_id.as_i32()));
        }

        let rows = sqlx::query(
            r#"
            SELECT
                r.rental_id,
                r.rental_date::timestamptz AS rental_date,
                r.return_date::timestamptz AS return_date,
                f.title,
                p.amount
            FROM rental r
            JOIN inventory i ON r.inventory_id = i.inventory_id
            JOIN film f ON i.film_id = f.film_id
            LEFT JOIN payment p ON r.rental_id = p.rental_id
            WHERE r.customer_id = $1
            ORDER BY r.rental_date DESC
            LIMIT $2
            "#,
        )
        .bind(customer_id.as_i32())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("customer_history", e))?;

        rows.iter()
            .map(|row| {
                Ok(HistoryEntry {
                    rental_id: RentalId::new(decode(row.try_get("rental_id"), "rental_id")?),
                    rental_date: decode(row.try_get("rental_date"), "rental_date")?,
                    return_date: decode(row.try_get("return_date"), "return_date")?,
                    title: decode(row.try_get("title"), "title")?,
                    amount: decode(row.try_get("amount"), "amount")?,
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(film_id = %film_id))]
    async fn available_inventory(&self, film_id: FilmId) -> ToolResult<Vec<AvailableUnit>> {
        let exists = sqlx::query("SELECT 1 FROM film WHERE film_id = $1")
            .bind(film_id.as_i32())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("available_inventory", e))?;
        if exists.is_none() {
            return Err(ToolError::not_found("film", film_id.as_i32()));
        }

        // Availability is derived from open rentals at read time; nothing is
        // cached between this read and any later rent attempt.
        let rows = sqlx::query(
            r#"
            SELECT i.inventory_id, i.store_id::int AS store_id
            FROM inventory i
            WHERE i.film_id = $1
              AND NOT EXISTS (
                  SELECT 1 FROM rental r
                  WHERE r.inventory_id = i.inventory_id AND r.return_date IS NULL
              )
            ORDER BY i.inventory_id
            "#,
        )
        .bind(film_id.as_i32())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("available_inventory", e))?;

        rows.iter()
            .map(|row| {
                Ok(AvailableUnit {
                    inventory_id: InventoryId::new(decode(
                        row.try_get("inventory_id"),
                        "inventory_id",
                    )?),
                    store_id: decode(row.try_get("store_id"), "store_id")?,
                })
            })
            .collect()
    }

    #[instrument(
        skip(self),
        fields(customer_id = %customer_id, inventory_id = %inventory_id, staff_id = %staff_id)
    )]
    async fn attempt_rent(
        &self,
        customer_id: CustomerId,
        inventory_id: InventoryId,
        staff_id: StaffId,
    ) -> ToolResult<RentalReceipt> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("attempt_rent", e))?;

        // Lock the inventory row first: every rent attempt for this unit
        // serializes here, making the open-rental re-check below race-free.
        let unit = sqlx::query("SELECT inventory_id FROM inventory WHERE inventory_id = $1 FOR UPDATE")
            .bind(inventory_id.as_i32())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("attempt_rent", e))?;
        if unit.is_none() {
            return Err(ToolError::not_found("inventory", inventory_id.as_i32()));
        }

        let open = sqlx::query(
            "SELECT rental_id FROM rental WHERE inventory_id = $1 AND return_date IS NULL",
        )
        .bind(inventory_id.as_i32())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("attempt_rent", e))?;
        if open.is_some() {
            return Err(ToolError::already_rented(inventory_id));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO rental (rental_date, inventory_id, customer_id, staff_id)
            VALUES (NOW(), $1, $2, $3)
            RETURNING rental_id, rental_date::timestamptz AS rental_date
            "#,
        )
        .bind(inventory_id.as_i32())
        .bind(customer_id.as_i32())
        .bind(staff_id.as_i32())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_rental_insert_error(e, customer_id, staff_id))?;

        let rental_id = RentalId::new(decode(row.try_get("rental_id"), "rental_id")?);
        let rental_date: DateTime<Utc> = decode(row.try_get("rental_date"), "rental_date")?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("attempt_rent", e))?;

        tracing::info!(%rental_id, "rental created");

        Ok(RentalReceipt {
            rental_id,
            customer_id,
            inventory_id,
            staff_id,
            rental_date,
        })
    }

    #[instrument(skip(self), fields(rental_id = %rental_id))]
    async fn attempt_return(&self, rental_id: RentalId) -> ToolResult<ReturnReceipt> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("attempt_return", e))?;

        let row = sqlx::query(
            "SELECT return_date::timestamptz AS return_date FROM rental WHERE rental_id = $1 FOR UPDATE",
        )
        .bind(rental_id.as_i32())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("attempt_return", e))?;

        let row = match row {
            Some(row) => row,
            None => return Err(ToolError::not_found("rental", rental_id.as_i32())),
        };
        let already: Option<DateTime<Utc>> = decode(row.try_get("return_date"), "return_date")?;
        if already.is_some() {
            return Err(ToolError::already_returned(rental_id));
        }

        let updated = sqlx::query(
            r#"
            UPDATE rental SET return_date = NOW()
            WHERE rental_id = $1
            RETURNING return_date::timestamptz AS return_date
            "#,
        )
        .bind(rental_id.as_i32())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("attempt_return", e))?;

        let return_date: DateTime<Utc> = decode(updated.try_get("return_date"), "return_date")?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("attempt_return", e))?;

        tracing::info!(%rental_id, "rental closed");

        Ok(ReturnReceipt {
            rental_id,
            return_date,
        })
    }

    #[instrument(skip(self))]
    async fn revenue(&self, grouping: RevenueGrouping) -> ToolResult<Vec<RevenueRow>> {
        let sql = match grouping {
            RevenueGrouping::Category => {
                r#"
                SELECT c.name AS "group", SUM(p.amount) AS revenue
                FROM payment p
                JOIN rental r ON p.rental_id = r.rental_id
                JOIN inventory i ON r.inventory_id = i.inventory_id
                JOIN film_category fc ON i.film_id = fc.film_id
                JOIN category c ON fc.category_id = c.category_id
                GROUP BY c.name
                ORDER BY revenue DESC
                "#
            }
            RevenueGrouping::Store => {
                r#"
                SELECT s.store_id::text AS "group", SUM(p.amount) AS revenue
                FROM payment p
                JOIN staff s ON p.staff_id = s.staff_id
                GROUP BY s.store_id
                ORDER BY revenue DESC
                "#
            }
        };

        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("revenue", e))?;

        rows.iter()
            .map(|row| {
                Ok(RevenueRow {
                    group: decode(row.try_get("group"), "group")?,
                    revenue: decode(row.try_get("revenue"), "revenue")?,
                })
            })
            .collect()
    }

    #[instrument(skip(self, query))]
    async fn run_select(&self, query: &str, limit: i64) -> ToolResult<Vec<serde_json::Value>> {
        let stmt = crate::guard::admit(query)?;

        // Wrapping instead of suffixing keeps statements that already carry
        // their own LIMIT valid.
        let sql = format!(
            "SELECT coalesce(json_agg(row_to_json(q)), '[]'::json) AS rows \
             FROM (SELECT * FROM ({stmt}) raw LIMIT $1) q"
        );

        let row = sqlx::query(&sql)
            .bind(limit)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("run_select", e))?;

        let value: serde_json::Value = decode(row.try_get("rows"), "rows")?;
        match value {
            serde_json::Value::Array(rows) => Ok(rows),
            other => Err(ToolError::store_unavailable(format!(
                "run_select: expected a JSON array, got {other}"
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn list_tables(&self, schema: &str) -> ToolResult<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT table_name::text AS table_name
            FROM information_schema.tables
            WHERE table_schema = $1
            ORDER BY table_name
            "#,
        )
        .bind(schema)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_tables", e))?;

        rows.iter()
            .map(|row| decode(row.try_get("table_name"), "table_name"))
            .collect()
    }

    #[instrument(skip(self))]
    async fn describe_table(&self, table: &str, schema: &str) -> ToolResult<Vec<ColumnInfo>> {
        let rows = sqlx::query(
            r#"
            SELECT
                column_name::text AS column_name,
                data_type::text AS data_type,
                (is_nullable = 'YES') AS is_nullable
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
            "#,
        )
        .bind(schema)
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("describe_table", e))?;

        rows.iter()
            .map(|row| {
                Ok(ColumnInfo {
                    column_name: decode(row.try_get("column_name"), "column_name")?,
                    data_type: decode(row.try_get("data_type"), "data_type")?,
                    is_nullable: decode(row.try_get("is_nullable"), "is_nullable")?,
                })
            })
            .collect()
    }
}
