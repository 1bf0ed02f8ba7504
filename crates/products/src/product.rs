use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use restaurant_core::validation::{require_name, require_present};
use restaurant_core::{DomainError, DomainResult, Entity, ProductId};

/// Smallest accepted portion count / portion size on create and update (0.1).
pub const MIN_QUANTITY: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Writable product fields, as submitted on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    /// Portions currently in stock (e.g. 10 for "10 kg" with 1 kg portions).
    pub portion_count: Decimal,
    /// Unit the product is measured in ("kg", "units", ...).
    pub unit: String,
    /// Size of one portion, in `unit`.
    pub portion_size: Decimal,
}

impl ProductDraft {
    /// Check every field rule and report all violations at once.
    pub fn validate(&self) -> DomainResult<()> {
        let mut violations = Vec::new();
        require_name("name", &self.name, &mut violations);
        if self.portion_count < MIN_QUANTITY {
            violations.push(format!("portionCount must be at least {MIN_QUANTITY}"));
        }
        require_present("unit", &self.unit, &mut violations);
        if self.portion_size < MIN_QUANTITY {
            violations.push(format!("portionSize must be at least {MIN_QUANTITY}"));
        }
        DomainError::check(violations)
    }
}

/// Entity: Product (a stock item).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    portion_count: Decimal,
    unit: String,
    portion_size: Decimal,
}

impl Product {
    /// Create a new product from validated input.
    pub fn create(id: ProductId, draft: ProductDraft) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self::restore(id, draft))
    }

    /// Rebuild a product from storage. No rules are checked: stored stock may
    /// legitimately sit below `MIN_QUANTITY` after orders consumed it.
    pub fn restore(id: ProductId, fields: ProductDraft) -> Self {
        Self {
            id,
            name: fields.name,
            portion_count: fields.portion_count,
            unit: fields.unit,
            portion_size: fields.portion_size,
        }
    }

    /// Replace all writable fields (full update).
    pub fn update(&mut self, draft: ProductDraft) -> DomainResult<()> {
        draft.validate()?;
        self.name = draft.name;
        self.portion_count = draft.portion_count;
        self.unit = draft.unit;
        self.portion_size = draft.portion_size;
        Ok(())
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn portion_count(&self) -> Decimal {
        self.portion_count
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn portion_size(&self) -> Decimal {
        self.portion_size
    }

    /// True when at least one whole portion is left.
    pub fn has_portion(&self) -> bool {
        self.portion_count >= Decimal::ONE
    }

    /// Take one portion out of stock.
    ///
    /// Fails with `Conflict("insufficient stock", name)` when less than one
    /// portion is left; stock is untouched in that case.
    pub fn consume_portion(&mut self) -> DomainResult<()> {
        if !self.has_portion() {
            return Err(DomainError::conflict("insufficient stock", self.name.clone()));
        }
        self.portion_count -= Decimal::ONE;
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    const KIND: &'static str = "product";

    fn id(&self) -> ProductId {
        self.id
    }
}
