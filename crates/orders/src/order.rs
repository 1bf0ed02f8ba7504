use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use restaurant_core::{DomainError, DomainResult, Entity, MenuItemId, OrderId};

/// Seconds between 0001-01-01T00:00:00Z and the Unix epoch.
const ZERO_TIMESTAMP_SECS: i64 = -62_135_596_800;

/// The "unset" timestamp (0001-01-01T00:00:00Z). Orders may not carry it.
pub fn zero_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(ZERO_TIMESTAMP_SECS, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Order fields as submitted on placement and update.
///
/// Both fields are optional so a request missing them is reported through the
/// same violation list as every other rule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderDraft {
    pub date_time: Option<DateTime<Utc>>,
    /// Ordered dishes. The same id may appear several times.
    pub menu_item_ids: Option<Vec<MenuItemId>>,
}

impl OrderDraft {
    pub fn validate(&self) -> DomainResult<()> {
        let mut violations = Vec::new();
        match self.date_time {
            None => violations.push("dateTime is required".to_string()),
            Some(dt) if dt == zero_timestamp() => violations.push(
                "dateTime must be a valid date and cannot be the zero timestamp".to_string(),
            ),
            Some(_) => {}
        }
        if self.menu_item_ids.is_none() {
            violations.push("menuItemIds is required".to_string());
        }
        DomainError::check(violations)
    }

    // Only called after `validate`.
    fn into_parts(self) -> (DateTime<Utc>, Vec<MenuItemId>) {
        (
            self.date_time.unwrap_or_else(zero_timestamp),
            self.menu_item_ids.unwrap_or_default(),
        )
    }
}

/// Entity: Order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    date_time: DateTime<Utc>,
    menu_item_ids: Vec<MenuItemId>,
}

impl Order {
    /// Build a new order from validated input. Stock is not touched here;
    /// see [`crate::StockLedger`].
    pub fn place(id: OrderId, draft: OrderDraft) -> DomainResult<Self> {
        draft.validate()?;
        let (date_time, menu_item_ids) = draft.into_parts();
        Ok(Self::restore(id, date_time, menu_item_ids))
    }

    /// Rebuild an order from storage.
    pub fn restore(id: OrderId, date_time: DateTime<Utc>, menu_item_ids: Vec<MenuItemId>) -> Self {
        Self {
            id,
            date_time,
            menu_item_ids,
        }
    }

    /// Replace the timestamp and all lines (whole-row update).
    pub fn replace(&mut self, draft: OrderDraft) -> DomainResult<()> {
        draft.validate()?;
        let (date_time, menu_item_ids) = draft.into_parts();
        self.date_time = date_time;
        self.menu_item_ids = menu_item_ids;
        Ok(())
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn date_time(&self) -> DateTime<Utc> {
        self.date_time
    }

    /// Order lines in submission order, duplicates included.
    pub fn menu_item_ids(&self) -> &[MenuItemId] {
        &self.menu_item_ids
    }
}

impl Entity for Order {
    type Id = OrderId;

    const KIND: &'static str = "order";

    fn id(&self) -> OrderId {
        self.id
    }
}
