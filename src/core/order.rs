//! Order aggregate, its items, and the payloads used to create and patch them

use crate::core::error::{FieldValidationError, ValidationError};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// Identifier of a persisted order
pub type OrderId = i64;

/// Identifier of a persisted item
pub type ItemId = i64;

/// An order and the items it owns
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub ordered_at: DateTime<Utc>,
    pub items: Vec<Item>,
}

/// A line of an order. Items only exist through their owning order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub item_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub quantity: u32,
    pub order_id: OrderId,
}

/// Payload for creating an order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub customer_name: String,

    /// `None` means "now" at creation time
    #[serde(default)]
    pub ordered_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub items: Vec<NewItem>,
}

/// Payload for one item of a new or replaced item collection
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub item_code: String,

    #[serde(default)]
    pub description: Option<String>,

    pub quantity: u32,
}

/// Partial update of an order
///
/// Empty or absent top-level fields leave the stored value alone. A present
/// `items` list, even an empty one, replaces the whole item collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    #[serde(default)]
    pub customer_name: Option<String>,

    #[serde(default)]
    pub ordered_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub items: Option<Vec<NewItem>>,
}

impl NewOrder {
    pub fn new(customer_name: impl Into<String>) -> Self {
        Self {
            customer_name: customer_name.into(),
            ordered_at: None,
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: NewItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn ordered_at(mut self, at: DateTime<Utc>) -> Self {
        self.ordered_at = Some(at);
        self
    }

    /// The timestamp to persist: the given one, or the current time
    pub fn resolved_ordered_at(&self) -> DateTime<Utc> {
        storage_timestamp(set_timestamp(self.ordered_at).unwrap_or_else(Utc::now))
    }
}

impl NewItem {
    pub fn new(item_code: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_code: item_code.into(),
            description: None,
            quantity,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl OrderPatch {
    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    pub fn ordered_at(mut self, at: DateTime<Utc>) -> Self {
        self.ordered_at = Some(at);
        self
    }

    pub fn items(mut self, items: Vec<NewItem>) -> Self {
        self.items = Some(items);
        self
    }
}

impl Order {
    /// Merge the top-level fields of a patch into this order
    ///
    /// Items are not touched here; replacing them is the store's job since it
    /// needs fresh identifiers.
    pub fn apply_patch(&mut self, patch: &OrderPatch) {
        if let Some(name) = patch.customer_name.as_deref().filter(|n| !n.is_empty()) {
            self.customer_name = name.to_string();
        }
        if let Some(at) = set_timestamp(patch.ordered_at) {
            self.ordered_at = storage_timestamp(at);
        }
    }
}

/// Seconds since the Unix epoch of `0001-01-01T00:00:00Z`, the zero time
/// clients of the previous service send for "not set"
const ZERO_TIME_SECS: i64 = -62_135_596_800;

/// Drop timestamps that stand for "not set": the zero time and the minimum
/// representable instant
pub fn set_timestamp(at: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    at.filter(|at| {
        *at != DateTime::<Utc>::MIN_UTC
            && !(at.timestamp() == ZERO_TIME_SECS && at.timestamp_subsec_nanos() == 0)
    })
}

/// Truncate to the microsecond precision every backend can round-trip
pub fn storage_timestamp(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(6)
}

/// Validate a create payload: customer name and every item code must be set
pub fn validate_new_order(order: &NewOrder) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    if let Err(e) = order.validate() {
        collect_field_errors("", &e, &mut errors);
    }
    collect_item_errors(&order.items, &mut errors);
    finish(errors)
}

/// Validate a replacement item collection
pub fn validate_items(items: &[NewItem]) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    collect_item_errors(items, &mut errors);
    finish(errors)
}

fn collect_item_errors(items: &[NewItem], out: &mut Vec<FieldValidationError>) {
    for (index, item) in items.iter().enumerate() {
        if let Err(e) = item.validate() {
            collect_field_errors(&format!("items[{}].", index), &e, out);
        }
    }
}

fn collect_field_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldValidationError>) {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    for (field, field_errors) in fields {
        for error in field_errors.iter() {
            out.push(FieldValidationError {
                field: format!("{}{}", prefix, field),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string()),
            });
        }
    }
}

fn finish(errors: Vec<FieldValidationError>) -> Result<(), ValidationError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::FieldErrors(errors))
    }
}
