//! Payment order models
//!
//! [`PaymentOrderRecord`] is the raw shape stored in the source collection;
//! [`PaymentOrderRow`] is the normalized, flat shape written to the CSV sink.

use bson::{Bson, Document};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Source field names, in output column order
pub mod fields {
    pub const CREATED_AT: &str = "createdAt";
    pub const TRACKING_NUMBER: &str = "trackingnumber";
    pub const PROVIDER: &str = "provider";
    pub const ITEMS_TYPE: &str = "itemsType";
    pub const STATUS: &str = "status";
    pub const NO_OF_ITEMS: &str = "noOfItems";
    pub const AMOUNT_IN_CENTS: &str = "amountInCents";
    pub const PAYMENT_LINK: &str = "paymentLink";
    pub const PAYMENT_LINK_EXPIRE_AT: &str = "paymentLinkExpireAt";

    /// All projected fields
    pub const ALL: [&str; 9] = [
        CREATED_AT,
        TRACKING_NUMBER,
        PROVIDER,
        ITEMS_TYPE,
        STATUS,
        NO_OF_ITEMS,
        AMOUNT_IN_CENTS,
        PAYMENT_LINK,
        PAYMENT_LINK_EXPIRE_AT,
    ];
}

/// Sentinel written for missing payment link fields
pub const UNKNOWN: &str = "unknown";

/// Raw payment order as stored in the source collection
///
/// Values are kept as BSON because the source is schemaless: numeric
/// fields may be integers, doubles, or something uncoercible, and that
/// decision belongs to the transformer. `null` and absent are both `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentOrderRecord {
    pub created_at: Option<Bson>,
    pub trackingnumber: Option<Bson>,
    pub provider: Option<Bson>,
    pub items_type: Option<Bson>,
    pub status: Option<Bson>,
    pub no_of_items: Option<Bson>,
    pub amount_in_cents: Option<Bson>,
    pub payment_link: Option<Bson>,
    pub payment_link_expire_at: Option<Bson>,
}

impl PaymentOrderRecord {
    /// Picks the projected fields out of a raw document
    ///
    /// Fields outside the projection are ignored.
    pub fn from_document(doc: &Document) -> Self {
        let pick = |name: &str| match doc.get(name) {
            None | Some(Bson::Null) => None,
            Some(value) => Some(value.clone()),
        };

        Self {
            created_at: pick(fields::CREATED_AT),
            trackingnumber: pick(fields::TRACKING_NUMBER),
            provider: pick(fields::PROVIDER),
            items_type: pick(fields::ITEMS_TYPE),
            status: pick(fields::STATUS),
            no_of_items: pick(fields::NO_OF_ITEMS),
            amount_in_cents: pick(fields::AMOUNT_IN_CENTS),
            payment_link: pick(fields::PAYMENT_LINK),
            payment_link_expire_at: pick(fields::PAYMENT_LINK_EXPIRE_AT),
        }
    }
}

/// A timestamp column value
///
/// Timestamps render as RFC 3339 UTC with millisecond precision. Columns
/// that may hold a non-timestamp (the `unknown` sentinel, or a string the
/// source stored instead of a date) carry it as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampField {
    At(DateTime<Utc>),
    Text(String),
}

impl TimestampField {
    /// The `unknown` sentinel
    pub fn unknown() -> Self {
        TimestampField::Text(UNKNOWN.to_string())
    }
}

impl fmt::Display for TimestampField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampField::At(at) => f.write_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            TimestampField::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for TimestampField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Normalized payment order, one CSV line
///
/// Field declaration order is the output column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentOrderRow {
    pub created_at: Option<TimestampField>,
    pub tracking_number: String,
    pub provider: String,
    pub items_type: String,
    pub status: String,
    pub no_of_items: i64,
    pub amount_in_cents: i64,
    pub payment_link: String,
    pub payment_link_expire_at: TimestampField,
}

impl PaymentOrderRow {
    /// Output header, in column order
    pub const COLUMNS: [&'static str; 9] = [
        "created_at",
        "tracking_number",
        "provider",
        "items_type",
        "status",
        "no_of_items",
        "amount_in_cents",
        "payment_link",
        "payment_link_expire_at",
    ];
}
