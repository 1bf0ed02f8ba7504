use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use restaurant_core::{MenuItemId, OrderId, ProductId};
use restaurant_menu::{MenuItem, MenuItemDraft};
use restaurant_orders::{Order, OrderDraft, zero_timestamp};
use restaurant_products::{Product, ProductDraft};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /api/products` and `PUT /api/products/:id`.
///
/// Missing fields deserialize to empty values and are reported by validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductRequest {
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub portion_count: Decimal,
    pub unit: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub portion_size: Decimal,
}

impl ProductRequest {
    pub fn into_draft(self) -> ProductDraft {
        ProductDraft {
            name: self.name,
            portion_count: self.portion_count,
            unit: self.unit,
            portion_size: self.portion_size,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MenuItemRequest {
    pub id: Option<MenuItemId>,
    pub name: String,
    pub product_ids: Vec<ProductId>,
}

impl MenuItemRequest {
    pub fn into_draft(self) -> MenuItemDraft {
        MenuItemDraft {
            name: self.name,
            product_ids: self.product_ids,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderRequest {
    pub id: Option<OrderId>,
    /// RFC 3339, a date-time without offset (seconds optional, read as UTC),
    /// or a bare date (midnight UTC).
    pub date_time: Option<String>,
    pub menu_item_ids: Option<Vec<MenuItemId>>,
}

impl OrderRequest {
    pub fn into_draft(self) -> OrderDraft {
        // An unreadable date is handed on as the zero timestamp, which
        // validation rejects as "not a valid date".
        let date_time = self
            .date_time
            .map(|raw| parse_date_time(&raw).unwrap_or_else(zero_timestamp));
        OrderDraft {
            date_time,
            menu_item_ids: self.menu_item_ids,
        }
    }
}

fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
    if let Some(naive) = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub portion_count: Decimal,
    pub unit: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub portion_size: Decimal,
}

impl From<&Product> for ProductResponse {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id_typed(),
            name: p.name().to_string(),
            portion_count: p.portion_count(),
            unit: p.unit().to_string(),
            portion_size: p.portion_size(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemResponse {
    pub id: MenuItemId,
    pub name: String,
    pub product_ids: Vec<ProductId>,
}

impl From<&MenuItem> for MenuItemResponse {
    fn from(m: &MenuItem) -> Self {
        Self {
            id: m.id_typed(),
            name: m.name().to_string(),
            product_ids: m.product_ids().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    pub date_time: DateTime<Utc>,
    pub menu_item_ids: Vec<MenuItemId>,
}

impl From<&Order> for OrderResponse {
    fn from(o: &Order) -> Self {
        Self {
            id: o.id_typed(),
            date_time: o.date_time(),
            menu_item_ids: o.menu_item_ids().to_vec(),
        }
    }
}
