use crate::amount::{amount_from_number, is_missing_marker, parse_amount};
use billbear_application::{
    ReceiptDocument, ReceiptMetadata, ReceiptReadError, ReceiptReader, ReceiptSource,
};
use billbear_domain::{Item, Money, Receipt, ReceiptError};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Deserialize;
use std::str::FromStr;

pub const DEFAULT_CURRENCY_SCALE: u32 = 2;

/// Reads the JSON document produced by the receipt OCR service.
#[derive(Debug, Clone, Copy)]
pub struct JsonReceiptReader {
    scale: u32,
}

impl Default for JsonReceiptReader {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SCALE)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    #[serde(default)]
    error: Option<serde_json::Value>,
    restaurant: Option<String>,
    date: Option<String>,
    time: Option<String>,
    #[serde(default)]
    items: Vec<RawItem>,
    subtotal: Option<RawAmount>,
    service_charge: Option<RawAmount>,
    discount: Option<RawAmount>,
    cgst: Option<RawAmount>,
    sgst: Option<RawAmount>,
    tax: Option<RawAmount>,
    total: Option<RawAmount>,
}

#[derive(Deserialize)]
struct RawItem {
    name: String,
    price: Option<RawAmount>,
    quantity: Option<RawQuantity>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(serde_json::Number),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Number(serde_json::Number),
    Text(String),
}

impl JsonReceiptReader {
    pub fn new(scale: u32) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    fn amount(&self, field: &str, raw: Option<&RawAmount>) -> Result<Money, ReceiptReadError> {
        let parsed = match raw {
            None => Ok(Money::ZERO),
            Some(RawAmount::Number(number)) => amount_from_number(number, self.scale),
            Some(RawAmount::Text(text)) => parse_amount(text, self.scale),
        };
        parsed.map_err(|err| {
            let value = match raw {
                Some(RawAmount::Number(number)) => number.to_string(),
                Some(RawAmount::Text(text)) => text.clone(),
                None => String::new(),
            };
            tracing::debug!(field, value = %value, error = %err, "Amount rejected");
            ReceiptReadError::InvalidAmount {
                field: field.to_owned(),
                value,
            }
        })
    }

    fn stated(
        &self,
        field: &str,
        raw: Option<&RawAmount>,
    ) -> Result<Option<Money>, ReceiptReadError> {
        match raw {
            Some(RawAmount::Text(text)) if is_missing_marker(text) => Ok(None),
            Some(_) => self.amount(field, raw).map(Some),
            None => Ok(None),
        }
    }

    fn item(&self, index: usize, raw: &RawItem) -> Result<Item, ReceiptReadError> {
        let name = raw.name.trim();
        let unit_price = self.amount(&format!("items[{index}].price"), raw.price.as_ref())?;
        let quantity = match &raw.quantity {
            None => 1,
            Some(RawQuantity::Number(number)) => {
                whole_quantity(&number.to_string()).unwrap_or(0)
            }
            Some(RawQuantity::Text(text)) if is_missing_marker(text) => 1,
            Some(RawQuantity::Text(text)) => whole_quantity(text).unwrap_or(0),
        };
        if quantity == 0 {
            return Err(ReceiptReadError::InvalidQuantity { index });
        }
        Ok(Item::new(name, unit_price, quantity))
    }

    fn parse_document(&self, raw: RawReceipt) -> Result<ReceiptDocument, ReceiptReadError> {
        if let Some(error) = raw.error {
            let message = match error {
                serde_json::Value::String(message) => message,
                other => other.to_string(),
            };
            return Err(ReceiptReadError::Upstream { message });
        }

        let items = raw
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| self.item(index, item))
            .collect::<Result<Vec<_>, _>>()?;

        let tax = [
            ("cgst", raw.cgst.as_ref()),
            ("sgst", raw.sgst.as_ref()),
            ("tax", raw.tax.as_ref()),
        ]
        .into_iter()
        .try_fold(Money::ZERO, |acc, (field, amount)| {
            let amount = self.amount(field, amount)?;
            acc.checked_add(amount)
                .ok_or(ReceiptReadError::Receipt(ReceiptError::Overflow))
        })?;
        let service_charge = self.amount("serviceCharge", raw.service_charge.as_ref())?;
        // Receipts print discounts either as a deduction or as a plain figure.
        let discount = self.amount("discount", raw.discount.as_ref())?.abs();

        let receipt = Receipt::try_new(items, tax, service_charge, discount)?;

        Ok(ReceiptDocument {
            receipt,
            metadata: ReceiptMetadata {
                restaurant: metadata_field(raw.restaurant),
                date: metadata_field(raw.date),
                time: metadata_field(raw.time),
            },
            stated_subtotal: self.stated("subtotal", raw.subtotal.as_ref())?,
            stated_total: self.stated("total", raw.total.as_ref())?,
        })
    }
}

impl ReceiptReader for JsonReceiptReader {
    fn read(&self, source: &ReceiptSource<'_>) -> Result<ReceiptDocument, ReceiptReadError> {
        let text = std::str::from_utf8(source.bytes).map_err(|err| ReceiptReadError::Malformed {
            detail: err.to_string(),
        })?;
        let raw: RawReceipt =
            serde_json::from_str(strip_code_fence(text)).map_err(|err| {
                ReceiptReadError::Malformed {
                    detail: err.to_string(),
                }
            })?;

        let document = self.parse_document(raw)?;
        tracing::debug!(
            filename = source.filename.unwrap_or("-"),
            item_count = document.receipt.items().len(),
            subtotal = %document.receipt.subtotal(),
            grand_total = %document.receipt.grand_total(),
            "Receipt read"
        );
        Ok(document)
    }
}

/// OCR models like to wrap their JSON answer in a markdown code fence.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Accepts `2`, `"2"` and the `2.0` OCR models like to emit.
fn whole_quantity(text: &str) -> Option<u32> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
        .filter(|quantity| quantity.fract().is_zero())
        .and_then(|quantity| quantity.to_u32())
}

fn metadata_field(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !is_missing_marker(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ROTIGHAR: &str = r#"{
      "restaurant": "UD ROTIGHAR",
      "date": "28/01/2023",
      "time": "02:50:28 PM",
      "items": [
        { "name": "Baby Corn Chilly", "price": "₹200.00" },
        { "name": "Dal Tadka", "price": "₹155.00" },
        { "name": "Garlic Nan", "price": "₹65.00", "quantity": 7 },
        { "name": "Gobi Manchoorian", "price": "₹160.00" },
        { "name": "Kaju Paneer (A)", "price": "₹220.00" },
        { "name": "Minaral Water (A)", "price": "₹19.00" },
        { "name": "Paneer Tikka Manchoorian", "price": "₹220.00" }
      ],
      "subtotal": "₹1,429.00",
      "serviceCharge": "N/A",
      "discount": "N/A",
      "cgst": "₹35.00",
      "sgst": "₹35.00",
      "total": "₹1,501.00"
    }"#;

    fn read(json: &str) -> Result<ReceiptDocument, ReceiptReadError> {
        JsonReceiptReader::default().read(&ReceiptSource::from_bytes(json.as_bytes()))
    }

    #[test]
    fn reads_ocr_document() {
        let document = read(ROTIGHAR).expect("receipt reads");

        assert_eq!(document.receipt.items().len(), 7);
        assert_eq!(document.receipt.items()[2].quantity, 7);
        assert_eq!(document.receipt.subtotal(), Money::from_minor(142_900));
        assert_eq!(document.receipt.tax(), Money::from_minor(7000));
        assert_eq!(document.receipt.service_charge(), Money::ZERO);
        assert_eq!(document.receipt.grand_total(), Money::from_minor(149_900));
        assert_eq!(document.stated_subtotal, Some(Money::from_minor(142_900)));
        assert_eq!(document.stated_total, Some(Money::from_minor(150_100)));
        assert_eq!(document.metadata.restaurant.as_deref(), Some("UD ROTIGHAR"));
        assert_eq!(document.discrepancies().len(), 1);
    }

    #[test]
    fn accepts_fenced_json_and_numbers() {
        let document = read(
            "```json\n{\"items\":[{\"name\":\"Pizza\",\"price\":20}],\"tax\":2,\"serviceCharge\":1.0}\n```",
        )
        .expect("receipt reads");

        assert_eq!(document.receipt.grand_total(), Money::from_minor(2300));
        assert_eq!(document.stated_total, None);
        assert_eq!(document.metadata, ReceiptMetadata::default());
    }

    #[test]
    fn negative_discount_reads_as_deduction() {
        let document = read(r#"{"items":[{"name":"Thali","price":"₹300"}],"discount":"-₹30.00"}"#)
            .expect("receipt reads");
        assert_eq!(document.receipt.discount(), Money::from_minor(3000));
        assert_eq!(document.receipt.grand_total(), Money::from_minor(27_000));
    }

    #[rstest]
    #[case::upstream(
        r#"{"error": "Failed to parse response: timeout"}"#,
        ReceiptReadError::Upstream { message: "Failed to parse response: timeout".into() }
    )]
    #[case::bad_price(
        r#"{"items":[{"name":"Lassi","price":"about 90"}]}"#,
        ReceiptReadError::InvalidAmount { field: "items[0].price".into(), value: "about 90".into() }
    )]
    #[case::too_precise(
        r#"{"items":[],"cgst":"₹1.005"}"#,
        ReceiptReadError::InvalidAmount { field: "cgst".into(), value: "₹1.005".into() }
    )]
    #[case::zero_quantity(
        r#"{"items":[{"name":"Lassi","price":"90","quantity":0}]}"#,
        ReceiptReadError::InvalidQuantity { index: 0 }
    )]
    #[case::negative_price(
        r#"{"items":[{"name":"Refund","price":"-90"}]}"#,
        ReceiptReadError::Receipt(ReceiptError::NegativePrice { index: 0, price: Money::from_minor(-9000) })
    )]
    fn rejects_bad_documents(#[case] json: &str, #[case] expected: ReceiptReadError) {
        assert_eq!(read(json), Err(expected));
    }

    #[rstest]
    #[case::dash_and_nil(r#""total":"-","subtotal":"nil""#)]
    #[case::na_and_blank(r#""total":"NA","subtotal":"  ""#)]
    #[case::absent("\"tax\":\"0\"")]
    fn missing_markers_are_not_stated_totals(#[case] totals: &str) {
        let json = format!(r#"{{"items":[{{"name":"Thali","price":"300"}}],{totals}}}"#);
        let document = read(&json).expect("receipt reads");

        assert_eq!(document.stated_total, None);
        assert_eq!(document.stated_subtotal, None);
        assert!(document.discrepancies().is_empty());
    }

    #[rstest]
    #[case::float_number(r#"2.0"#, Ok(2))]
    #[case::float_text(r#""3.0""#, Ok(3))]
    #[case::integer(r#"4"#, Ok(4))]
    #[case::fractional(r#"1.5"#, Err(ReceiptReadError::InvalidQuantity { index: 0 }))]
    #[case::negative(r#"-1"#, Err(ReceiptReadError::InvalidQuantity { index: 0 }))]
    fn reads_whole_quantities(
        #[case] quantity: &str,
        #[case] expected: Result<u32, ReceiptReadError>,
    ) {
        let json = format!(
            r#"{{"items":[{{"name":"Roti","price":"20","quantity":{quantity}}}]}}"#
        );
        let quantity = read(&json).map(|document| document.receipt.items()[0].quantity);
        assert_eq!(quantity, expected);
    }

    #[test]
    fn out_of_range_scale_is_an_error_not_a_panic() {
        let reader = JsonReceiptReader::new(30);
        let result = reader.read(&ReceiptSource::from_bytes(
            br#"{"items":[{"name":"Thali","price":"300"}]}"#,
        ));
        assert!(matches!(result, Err(ReceiptReadError::InvalidAmount { .. })));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            read("{not json"),
            Err(ReceiptReadError::Malformed { .. })
        ));
    }
}
