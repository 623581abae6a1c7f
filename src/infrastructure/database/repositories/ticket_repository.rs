//! SeaORM implementation of TicketStore

use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};

use super::parking_spot_repository::model_to_domain as spot_to_domain;
use crate::domain::{StorageError, StorageResult, Ticket, TicketStore};
use crate::infrastructure::database::entities::{parking_spot, ticket};

pub struct SeaOrmTicketStore {
    db: DatabaseConnection,
}

impl SeaOrmTicketStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

// Prices are stored as decimal text so no binary float rounding creeps in
fn price_to_db(price: Decimal) -> String {
    price.normalize().to_string()
}

fn price_from_db(price: &str) -> StorageResult<Decimal> {
    price
        .parse::<Decimal>()
        .map_err(|e| StorageError::Integrity(format!("stored price {:?} is invalid: {}", price, e)))
}

// The open-ticket unique index is the only unique rule a create can break
fn insert_error(tk: &Ticket, err: DbErr) -> StorageError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => StorageError::Conflict(format!(
            "vehicle {} already has an open ticket ({})",
            tk.vehicle_registration, detail
        )),
        _ => StorageError::Database(err),
    }
}

fn model_to_domain(
    t: ticket::Model,
    spot: Option<parking_spot::Model>,
) -> StorageResult<Ticket> {
    let spot = spot.ok_or_else(|| {
        StorageError::Integrity(format!("ticket {} references missing spot {}", t.id, t.spot_id))
    })?;

    Ok(Ticket {
        id: t.id,
        vehicle_registration: t.vehicle_registration,
        spot: spot_to_domain(spot),
        entry_time: t.entry_time,
        exit_time: t.exit_time,
        price: price_from_db(&t.price)?,
    })
}

// ── TicketStore impl ────────────────────────────────────────────

#[async_trait]
impl TicketStore for SeaOrmTicketStore {
    async fn create(&self, tk: &Ticket) -> StorageResult<()> {
        debug!("Saving ticket {} for {}", tk.id, tk.vehicle_registration);

        let model = ticket::ActiveModel {
            id: Set(tk.id),
            vehicle_registration: Set(tk.vehicle_registration.clone()),
            spot_id: Set(tk.spot.id),
            entry_time: Set(tk.entry_time),
            exit_time: Set(tk.exit_time),
            price: Set(price_to_db(tk.price)),
        };
        let inserted = ticket::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| insert_error(tk, e))?;

        if inserted != 1 {
            return Err(StorageError::Integrity(format!(
                "insert of ticket {} affected {} rows",
                tk.id, inserted
            )));
        }
        Ok(())
    }

    async fn find_open_by_vehicle(
        &self,
        vehicle_registration: &str,
    ) -> StorageResult<Option<Ticket>> {
        let found = ticket::Entity::find()
            .filter(ticket::Column::VehicleRegistration.eq(vehicle_registration))
            .filter(ticket::Column::ExitTime.is_null())
            .order_by_desc(ticket::Column::EntryTime)
            .find_also_related(parking_spot::Entity)
            .one(&self.db)
            .await?;

        found.map(|(t, spot)| model_to_domain(t, spot)).transpose()
    }

    async fn update(&self, tk: &Ticket) -> StorageResult<bool> {
        debug!("Updating ticket {}", tk.id);

        // Closing a ticket only ever writes the exit time and the price
        let result = ticket::Entity::update_many()
            .col_expr(ticket::Column::ExitTime, Expr::value(tk.exit_time))
            .col_expr(ticket::Column::Price, Expr::value(price_to_db(tk.price)))
            .filter(ticket::Column::Id.eq(tk.id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn count_completed_by_vehicle(&self, vehicle_registration: &str) -> StorageResult<u64> {
        let count = ticket::Entity::find()
            .filter(ticket::Column::VehicleRegistration.eq(vehicle_registration))
            .filter(ticket::Column::ExitTime.is_not_null())
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
