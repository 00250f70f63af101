use std::collections::HashMap;

use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};

use crate::adapters::counter_store::{CounterStore, StoreError};
use crate::config::LedgerConfig;
use crate::runtime::record::{
    StampKey, StampRecord, UpdateSpec, CUSTOMER_ID_ATTRIBUTE, STAMPS_ATTRIBUTE,
    STORE_ID_ATTRIBUTE, UPDATE_VALUE_PLACEHOLDER,
};

pub type Item = HashMap<String, AttributeValue>;

/// [`CounterStore`] backed by a DynamoDB table keyed on `StoreId` + `CustomerId`.
///
/// Calls bridge into the async SDK with `block_in_place`, so the store must be
/// used from a multi-threaded Tokio runtime.
#[derive(Debug, Clone)]
pub struct DynamoCounterStore {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoCounterStore {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Builds the SDK client once from `config`; retry and timeout settings
    /// are applied here and nowhere else.
    pub async fn connect(config: &LedgerConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(max_attempts) = config.max_attempts {
            loader = loader.retry_config(RetryConfig::standard().with_max_attempts(max_attempts));
        }
        if let Some(timeout) = config.operation_timeout {
            loader =
                loader.timeout_config(TimeoutConfig::builder().operation_timeout(timeout).build());
        }
        let sdk_config = loader.load().await;
        Self::new(
            aws_sdk_dynamodb::Client::new(&sdk_config),
            config.table_name.clone(),
        )
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

impl CounterStore for DynamoCounterStore {
    fn get_item(&self, key: &StampKey) -> Result<Option<StampRecord>, StoreError> {
        let client = self.client.clone();
        let table_name = self.table_name.clone();
        let request_key = key.clone();

        let item = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .get_item()
                    .table_name(table_name)
                    .set_key(Some(key_attributes(&request_key)))
                    .send()
                    .await
                    .map(|output| output.item)
                    .map_err(|error| classify_sdk_error("GetItem", error))
            })
        })?;

        item.map(|item| record_from_item(key, &item)).transpose()
    }

    fn put_item(&self, record: &StampRecord) -> Result<(), StoreError> {
        let client = self.client.clone();
        let table_name = self.table_name.clone();
        let item = item_from_record(record);

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_item()
                    .table_name(table_name)
                    .set_item(Some(item))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| classify_sdk_error("PutItem", error))
            })
        })
    }

    fn update_item(&self, key: &StampKey, update: UpdateSpec) -> Result<StampRecord, StoreError> {
        let client = self.client.clone();
        let table_name = self.table_name.clone();
        let request_key = key.clone();

        let attributes = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .update_item()
                    .table_name(table_name)
                    .set_key(Some(key_attributes(&request_key)))
                    .update_expression(update.expression())
                    .expression_attribute_values(
                        UPDATE_VALUE_PLACEHOLDER,
                        AttributeValue::N(update.value().to_string()),
                    )
                    .return_values(ReturnValue::UpdatedNew)
                    .send()
                    .await
                    .map(|output| output.attributes.unwrap_or_default())
                    .map_err(|error| classify_sdk_error("UpdateItem", error))
            })
        })?;

        record_from_item(key, &attributes)
    }
}

pub fn key_attributes(key: &StampKey) -> Item {
    HashMap::from([
        (
            STORE_ID_ATTRIBUTE.to_string(),
            AttributeValue::S(key.store_id.clone()),
        ),
        (
            CUSTOMER_ID_ATTRIBUTE.to_string(),
            AttributeValue::S(key.customer_id.clone()),
        ),
    ])
}

pub fn item_from_record(record: &StampRecord) -> Item {
    let mut item = key_attributes(&record.key);
    item.insert(
        STAMPS_ATTRIBUTE.to_string(),
        AttributeValue::N(record.stamps.to_string()),
    );
    item
}

/// Reads `Stamps` out of a full item or an `UPDATED_NEW` attribute map. The
/// key is taken from the request, since `UPDATED_NEW` omits key attributes.
pub fn record_from_item(key: &StampKey, item: &Item) -> Result<StampRecord, StoreError> {
    let malformed = |reason: String| StoreError::MalformedItem {
        key: key.clone(),
        reason,
    };

    let raw = item
        .get(STAMPS_ATTRIBUTE)
        .ok_or_else(|| malformed(format!("missing {STAMPS_ATTRIBUTE} attribute")))?
        .as_n()
        .map_err(|_| malformed(format!("{STAMPS_ATTRIBUTE} is not a number")))?;

    // DynamoDB numbers may carry a fractional zero, e.g. "3.0".
    let stamps = raw
        .parse::<i64>()
        .ok()
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|value| value.fract() == 0.0 && value.abs() < i64::MAX as f64)
                .map(|value| value as i64)
        })
        .ok_or_else(|| malformed(format!("{STAMPS_ATTRIBUTE}={raw} is not an integer")))?;

    if stamps < 0 {
        return Err(malformed(format!("{STAMPS_ATTRIBUTE}={stamps} is negative")));
    }

    Ok(StampRecord::new(key.clone(), stamps))
}

fn classify_sdk_error<E, R>(operation: &'static str, error: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    match error {
        SdkError::ServiceError(service) => StoreError::Rejected {
            operation,
            message: DisplayErrorContext(service.into_err()).to_string(),
        },
        other => StoreError::Unavailable(format!(
            "{operation} failed: {}",
            DisplayErrorContext(&other)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_key() -> StampKey {
        StampKey::new("12345", "54312")
    }

    #[test]
    fn item_uses_table_attribute_names() {
        let item = item_from_record(&StampRecord::new(sample_key(), 1));

        assert_eq!(
            item.get("StoreId"),
            Some(&AttributeValue::S("12345".to_string()))
        );
        assert_eq!(
            item.get("CustomerId"),
            Some(&AttributeValue::S("54312".to_string()))
        );
        assert_eq!(item.get("Stamps"), Some(&AttributeValue::N("1".to_string())));
        assert_eq!(key_attributes(&sample_key()).len(), 2);
    }

    #[test]
    fn reads_updated_new_attributes_without_key() {
        let attributes =
            HashMap::from([("Stamps".to_string(), AttributeValue::N("2".to_string()))]);

        let record = record_from_item(&sample_key(), &attributes).expect("record should parse");
        assert_eq!(record, StampRecord::new(sample_key(), 2));
    }

    #[test]
    fn accepts_integral_decimal_numbers() {
        let attributes =
            HashMap::from([("Stamps".to_string(), AttributeValue::N("3.0".to_string()))]);

        let record = record_from_item(&sample_key(), &attributes).expect("record should parse");
        assert_eq!(record.stamps, 3);
    }

    #[test]
    fn rejects_missing_or_non_numeric_stamps() {
        let missing = record_from_item(&sample_key(), &HashMap::new())
            .expect_err("missing attribute should fail");
        assert!(matches!(missing, StoreError::MalformedItem { .. }));

        let text = HashMap::from([("Stamps".to_string(), AttributeValue::S("three".to_string()))]);
        let error = record_from_item(&sample_key(), &text).expect_err("string should fail");
        assert!(error.to_string().contains("is not a number"));
    }

    #[test]
    fn rejects_negative_or_fractional_stamps() {
        for raw in ["-1", "2.5"] {
            let attributes =
                HashMap::from([("Stamps".to_string(), AttributeValue::N(raw.to_string()))]);
            let error =
                record_from_item(&sample_key(), &attributes).expect_err("value should fail");
            assert!(matches!(error, StoreError::MalformedItem { .. }));
        }
    }
}
