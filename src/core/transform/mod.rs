//! Data transformation logic
//!
//! Converts raw payment order documents into CSV rows: renames source
//! fields to output columns, floors the numeric columns and fills missing
//! payment link fields with `unknown`.

pub mod coerce;

use crate::domain::order::fields;
use crate::domain::{PaymentOrderRecord, PaymentOrderRow, TransformError};
use bson::Document;

/// Transform a batch of documents, preserving input order
///
/// Any uncoercible value fails the whole batch; no row is skipped.
///
/// # Examples
///
/// ```
/// use bson::doc;
/// use payorders_etl::core::transform::transform_batch;
///
/// let rows = transform_batch(&[doc! {
///     "trackingnumber": "TRK-1",
///     "amountInCents": 150.7,
///     "noOfItems": null,
///     "paymentLink": null,
/// }])
/// .unwrap();
///
/// assert_eq!(rows[0].amount_in_cents, 150);
/// assert_eq!(rows[0].no_of_items, 0);
/// assert_eq!(rows[0].payment_link, "unknown");
/// ```
pub fn transform_batch(documents: &[Document]) -> Result<Vec<PaymentOrderRow>, TransformError> {
    documents
        .iter()
        .enumerate()
        .map(|(index, document)| {
            transform_record(index, &PaymentOrderRecord::from_document(document))
        })
        .collect()
}

/// Transform one record
///
/// `index` is the record's position in its batch, used in error messages.
pub fn transform_record(
    index: usize,
    record: &PaymentOrderRecord,
) -> Result<PaymentOrderRow, TransformError> {
    Ok(PaymentOrderRow {
        created_at: coerce::timestamp(record.created_at.as_ref()),
        tracking_number: coerce::text(record.trackingnumber.as_ref()),
        provider: coerce::text(record.provider.as_ref()),
        items_type: coerce::text(record.items_type.as_ref()),
        status: coerce::text(record.status.as_ref()),
        no_of_items: coerce::floor_integer(
            record.no_of_items.as_ref(),
            index,
            fields::NO_OF_ITEMS,
        )?,
        amount_in_cents: coerce::floor_integer(
            record.amount_in_cents.as_ref(),
            index,
            fields::AMOUNT_IN_CENTS,
        )?,
        payment_link: coerce::text_or_unknown(record.payment_link.as_ref()),
        payment_link_expire_at: coerce::timestamp_or_unknown(
            record.payment_link_expire_at.as_ref(),
        ),
    })
}
