//! Order validation.
//!
//! A message that fails validation is a permanent failure: it is
//! acknowledged and dead-lettered, never retried. Rules stop at the first
//! violation and report its field path.

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::model::{Delivery, Item, Order, Payment};

type Check = Result<(), ValidationError>;

/// Validates an order against the current time.
///
/// # Example
///
/// ```no_run
/// # fn load() -> orderflow_core::Order { unimplemented!() }
/// use orderflow_core::validate_order;
///
/// let order = load();
/// if let Err(e) = validate_order(&order) {
///     eprintln!("rejected {}: {}", order.order_uid, e);
/// }
/// ```
pub fn validate_order(order: &Order) -> Check {
    validate_order_at(order, Utc::now())
}

/// Validates an order, treating `now` as the current time.
pub fn validate_order_at(order: &Order, now: DateTime<Utc>) -> Check {
    validate_header(order, now)?;
    validate_delivery(&order.delivery).map_err(|e| e.within("delivery"))?;
    validate_payment(&order.payment).map_err(|e| e.within("payment"))?;
    validate_items(&order.items)
}

fn validate_header(order: &Order, now: DateTime<Utc>) -> Check {
    // order_uid is the cache/storage key, so whitespace is significant
    if order.order_uid.is_empty() {
        return Err(ValidationError::new("order_uid", "is required"));
    }
    required("track_number", &order.track_number)?;
    required("entry", &order.entry)?;
    required("locale", &order.locale)?;
    required("customer_id", &order.customer_id)?;
    required("delivery_service", &order.delivery_service)?;
    required("shardkey", &order.shardkey)?;
    non_negative("sm_id", order.sm_id)?;
    if order.date_created > now {
        return Err(ValidationError::new(
            "date_created",
            "cannot be in the future",
        ));
    }
    required("oof_shard", &order.oof_shard)
}

fn validate_delivery(delivery: &Delivery) -> Check {
    required("name", &delivery.name)?;
    required("phone", &delivery.phone)?;
    required("zip", &delivery.zip)?;
    required("city", &delivery.city)?;
    required("address", &delivery.address)?;
    required("region", &delivery.region)?;
    required("email", &delivery.email)?;
    if !is_valid_email(delivery.email.trim()) {
        return Err(ValidationError::new("email", "has invalid format"));
    }
    Ok(())
}

fn validate_payment(payment: &Payment) -> Check {
    required("transaction", &payment.transaction)?;
    required("currency", &payment.currency)?;
    required("provider", &payment.provider)?;
    non_negative("amount", payment.amount)?;
    if payment.payment_dt <= 0 {
        return Err(ValidationError::new("payment_dt", "must be positive"));
    }
    required("bank", &payment.bank)?;
    non_negative("delivery_cost", payment.delivery_cost)?;
    non_negative("goods_total", payment.goods_total)?;
    non_negative("custom_fee", payment.custom_fee)
}

fn validate_items(items: &[Item]) -> Check {
    if items.is_empty() {
        return Err(ValidationError::new("items", "at least one item is required"));
    }

    for (i, item) in items.iter().enumerate() {
        validate_item(item).map_err(|e| e.within(&format!("items[{}]", i)))?;
    }
    Ok(())
}

fn validate_item(item: &Item) -> Check {
    positive("chrt_id", item.chrt_id)?;
    required("track_number", &item.track_number)?;
    non_negative("price", item.price)?;
    required("rid", &item.rid)?;
    required("name", &item.name)?;
    if !(0..=100).contains(&item.sale) {
        return Err(ValidationError::new("sale", "must be between 0 and 100"));
    }
    required("size", &item.size)?;
    non_negative("total_price", item.total_price)?;
    positive("nm_id", item.nm_id)?;
    required("brand", &item.brand)?;
    non_negative("status", item.status)
}

fn required(field: &str, value: &str) -> Check {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(())
}

fn non_negative(field: &str, value: i64) -> Check {
    if value < 0 {
        return Err(ValidationError::new(field, "must be non-negative"));
    }
    Ok(())
}

fn positive(field: &str, value: i64) -> Check {
    if value <= 0 {
        return Err(ValidationError::new(field, "must be positive"));
    }
    Ok(())
}

/// Structural address check: one `@`, a non-empty local part and a dotted
/// domain without empty labels.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}
