//! In-memory rental store.
//!
//! Tests/dev twin of the Postgres store. All tables live behind one mutex,
//! so every read-check-write sequence is serialized exactly as the row
//! locks serialize it in production, and the same failure taxonomy applies.
//! Not optimized for performance.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use rentaldesk_core::{
    AvailableUnit, ColumnInfo, CustomerId, CustomerRecord, FilmId, FilmRecord, HistoryEntry,
    InventoryId, RentalId, RentalReceipt, ReturnReceipt, RevenueRow, StaffId, ToolError,
    ToolResult,
};

use crate::r#trait::{FilmFilter, RentalStore, RevenueGrouping};

#[derive(Debug, Clone)]
struct FilmSeed {
    title: String,
    genre: String,
    release_year: Option<i32>,
    description: Option<String>,
}

#[derive(Debug, Clone)]
struct CustomerSeed {
    first_name: String,
    last_name: String,
    email: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct StaffSeed {
    store_id: i32,
}

#[derive(Debug, Clone, Copy)]
struct UnitSeed {
    film_id: i32,
    store_id: i32,
}

#[derive(Debug, Clone, Copy)]
struct RentalRow {
    inventory_id: i32,
    customer_id: i32,
    staff_id: i32,
    rental_date: DateTime<Utc>,
    return_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy)]
struct PaymentSeed {
    rental_id: i32,
    staff_id: i32,
    amount: Decimal,
}

#[derive(Debug, Default)]
struct State {
    films: BTreeMap<i32, FilmSeed>,
    customers: BTreeMap<i32, CustomerSeed>,
    staff: BTreeMap<i32, StaffSeed>,
    inventory: BTreeMap<i32, UnitSeed>,
    rentals: BTreeMap<i32, RentalRow>,
    payments: Vec<PaymentSeed>,
    next_rental_id: i32,
}

impl State {
    fn open_rental_for(&self, inventory_id: i32) -> Option<i32> {
        self.rentals
            .iter()
            .find(|(_, r)| r.inventory_id == inventory_id && r.return_date.is_none())
            .map(|(id, _)| *id)
    }
}

/// Mutex-guarded store holding the whole schema in process memory.
#[derive(Debug)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_rental_id: 1,
                ..State::default()
            }),
        }
    }

    pub fn add_film(&self, id: i32, title: &str, genre: &str, release_year: Option<i32>) {
        self.state.lock().unwrap().films.insert(
            id,
            FilmSeed {
                title: title.to_string(),
                genre: genre.to_string(),
                release_year,
                description: None,
            },
        );
    }

    pub fn add_customer(&self, id: i32, first_name: &str, last_name: &str, email: &str) {
        self.state.lock().unwrap().customers.insert(
            id,
            CustomerSeed {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: Some(email.to_string()),
            },
        );
    }

    pub fn add_staff(&self, id: i32, store_id: i32) {
        self.state
            .lock()
            .unwrap()
            .staff
            .insert(id, StaffSeed { store_id });
    }

    pub fn add_inventory(&self, id: i32, film_id: i32, store_id: i32) {
        self.state
            .lock()
            .unwrap()
            .inventory
            .insert(id, UnitSeed { film_id, store_id });
    }

    pub fn add_payment(&self, rental_id: i32, staff_id: i32, amount: Decimal) {
        self.state.lock().unwrap().payments.push(PaymentSeed {
            rental_id,
            staff_id,
            amount,
        });
    }

    /// Number of open rentals for one unit. Test helper for the invariant
    /// that this never exceeds one.
    pub fn open_rentals(&self, inventory_id: InventoryId) -> usize {
        self.state
            .lock()
            .unwrap()
            .rentals
            .values()
            .filter(|r| r.inventory_id == inventory_id.as_i32() && r.return_date.is_none())
            .count()
    }

    fn lock(&self) -> ToolResult<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| ToolError::store_unavailable("state lock poisoned"))
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl RentalStore for InMemoryStore {
    async fn search_films(&self, filter: &FilmFilter) -> ToolResult<Vec<FilmRecord>> {
        let state = self.lock()?;
        let mut hits: Vec<FilmRecord> = state
            .films
            .iter()
            .filter(|(_, f)| {
                filter.search_term.as_deref().is_none_or(|t| {
                    contains_ci(&f.title, t)
                        || f.description.as_deref().is_some_and(|d| contains_ci(d, t))
                })
            })
            .filter(|(_, f)| {
                filter
                    .genre
                    .as_deref()
                    .is_none_or(|g| contains_ci(&f.genre, g))
            })
            .filter(|(_, f)| filter.year.is_none_or(|y| f.release_year == Some(y)))
            .map(|(id, f)| FilmRecord {
                film_id: FilmId::new(*id),
                title: f.title.clone(),
                genre: Some(f.genre.clone()),
                release_year: f.release_year,
                rental_rate: None,
                rating: None,
                description: f.description.clone(),
            })
            .collect();

        hits.sort_by(|a, b| a.title.cmp(&b.title));
        hits.truncate(filter.limit.max(0) as usize);
        Ok(hits)
    }

    async fn search_customers(&self, term: &str, limit: i64) -> ToolResult<Vec<CustomerRecord>> {
        let state = self.lock()?;
        let mut hits: Vec<CustomerRecord> = state
            .customers
            .iter()
            .filter(|(_, c)| {
                contains_ci(&c.first_name, term)
                    || contains_ci(&c.last_name, term)
                    || c.email.as_deref().is_some_and(|e| contains_ci(e, term))
            })
            .map(|(id, c)| CustomerRecord {
                customer_id: CustomerId::new(*id),
                first_name: c.first_name.clone(),
                last_name: c.last_name.clone(),
                email: c.email.clone(),
                active: true,
            })
            .collect();

        hits.sort_by(|a, b| {
            (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name))
        });
        hits.truncate(limit.max(0) as usize);
        Ok(hits)
    }

    async fn customer_history(
        &self,
        customer_id: CustomerId,
        limit: i64,
    ) -> ToolResult<Vec<HistoryEntry>> {
        let state = self.lock()?;
        if !state.customers.contains_key(&customer_id.as_i32()) {
            return Err(ToolError::not_found("customer", customer_id.as_i32()));
        }

        let mut entries: Vec<HistoryEntry> = state
            .rentals
            .iter()
            .filter(|(_, r)| r.customer_id == customer_id.as_i32())
            .map(|(id, r)| {
                let title = state
                    .inventory
                    .get(&r.inventory_id)
                    .and_then(|u| state.films.get(&u.film_id))
                    .map(|f| f.title.clone())
                    .unwrap_or_default();
                let amount = state
                    .payments
                    .iter()
                    .find(|p| p.rental_id == *id)
                    .map(|p| p.amount);
                HistoryEntry {
                    rental_id: RentalId::new(*id),
                    rental_date: r.rental_date,
                    return_date: r.return_date,
                    title,
                    amount,
                }
            })
            .collect();

        entries.sort_by(|a, b| b.rental_date.cmp(&a.rental_date));
        entries.truncate(limit.max(0) as usize);
        Ok(entries)
    }

    async fn available_inventory(&self, film_id: FilmId) -> ToolResult<Vec<AvailableUnit>> {
        let state = self.lock()?;
        if !state.films.contains_key(&film_id.as_i32()) {
            return Err(ToolError::not_found("film", film_id.as_i32()));
        }

        Ok(state
            .inventory
            .iter()
            .filter(|(id, u)| {
                u.film_id == film_id.as_i32() && state.open_rental_for(**id).is_none()
            })
            .map(|(id, u)| AvailableUnit {
                inventory_id: InventoryId::new(*id),
                store_id: u.store_id,
            })
            .collect())
    }

    async fn attempt_rent(
        &self,
        customer_id: CustomerId,
        inventory_id: InventoryId,
        staff_id: StaffId,
    ) -> ToolResult<RentalReceipt> {
        // The lock spans check and insert, the in-memory equivalent of the
        // inventory row lock in the Postgres store.
        let mut state = self.lock()?;

        if !state.inventory.contains_key(&inventory_id.as_i32()) {
            return Err(ToolError::not_found("inventory", inventory_id.as_i32()));
        }
        if !state.customers.contains_key(&customer_id.as_i32()) {
            return Err(ToolError::not_found("customer", customer_id.as_i32()));
        }
        if !state.staff.contains_key(&staff_id.as_i32()) {
            return Err(ToolError::not_found("staff", staff_id.as_i32()));
        }
        if state.open_rental_for(inventory_id.as_i32()).is_some() {
            return Err(ToolError::already_rented(inventory_id));
        }

        let rental_id = state.next_rental_id;
        state.next_rental_id += 1;
        let rental_date = Utc::now();
        state.rentals.insert(
            rental_id,
            RentalRow {
                inventory_id: inventory_id.as_i32(),
                customer_id: customer_id.as_i32(),
                staff_id: staff_id.as_i32(),
                rental_date,
                return_date: None,
            },
        );

        Ok(RentalReceipt {
            rental_id: RentalId::new(rental_id),
            customer_id,
            inventory_id,
            staff_id,
            rental_date,
        })
    }

    async fn attempt_return(&self, rental_id: RentalId) -> ToolResult<ReturnReceipt> {
        let mut state = self.lock()?;

        let row = state
            .rentals
            .get_mut(&rental_id.as_i32())
            .ok_or_else(|| ToolError::not_found("rental", rental_id.as_i32()))?;

        if row.return_date.is_some() {
            return Err(ToolError::already_returned(rental_id));
        }

        let return_date = Utc::now();
        row.return_date = Some(return_date);

        Ok(ReturnReceipt {
            rental_id,
            return_date,
        })
    }

    async fn revenue(&self, grouping: RevenueGrouping) -> ToolResult<Vec<RevenueRow>> {
        let state = self.lock()?;
        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();

        for payment in &state.payments {
            let group = match grouping {
                RevenueGrouping::Category => state
                    .rentals
                    .get(&payment.rental_id)
                    .and_then(|r| state.inventory.get(&r.inventory_id))
                    .and_then(|u| state.films.get(&u.film_id))
                    .map(|f| f.genre.clone()),
                RevenueGrouping::Store => state
                    .staff
                    .get(&payment.staff_id)
                    .map(|s| s.store_id.to_string()),
            };
            let Some(group) = group else { continue };
            *totals.entry(group).or_default() += payment.amount;
        }

        let mut rows: Vec<RevenueRow> = totals
            .into_iter()
            .map(|(group, revenue)| RevenueRow { group, revenue })
            .collect();
        rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
        Ok(rows)
    }

    async fn run_select(&self, query: &str, _limit: i64) -> ToolResult<Vec<serde_json::Value>> {
        // No SQL engine here: the guard contract is enforced, admitted
        // statements return no rows.
        crate::guard::admit(query)?;
        Ok(Vec::new())
    }

    async fn list_tables(&self, _schema: &str) -> ToolResult<Vec<String>> {
        Ok(vec![
            "category".to_string(),
            "customer".to_string(),
            "film".to_string(),
            "film_category".to_string(),
            "inventory".to_string(),
            "payment".to_string(),
            "rental".to_string(),
            "staff".to_string(),
        ])
    }

    async fn describe_table(&self, table: &str, _schema: &str) -> ToolResult<Vec<ColumnInfo>> {
        let columns: &[(&str, &str, bool)] = match table {
            "rental" => &[
                ("rental_id", "integer", false),
                ("rental_date", "timestamp with time zone", false),
                ("inventory_id", "integer", false),
                ("customer_id", "integer", false),
                ("return_date", "timestamp with time zone", true),
                ("staff_id", "integer", false),
            ],
            "inventory" => &[
                ("inventory_id", "integer", false),
                ("film_id", "integer", false),
                ("store_id", "integer", false),
            ],
            _ => &[],
        };

        Ok(columns
            .iter()
            .map(|(name, ty, nullable)| ColumnInfo {
                column_name: name.to_string(),
                data_type: ty.to_string(),
                is_nullable: *nullable,
            })
            .collect())
    }
}
