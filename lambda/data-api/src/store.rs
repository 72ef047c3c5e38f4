use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_json::{Map, Value};

use crate::attr;
use crate::error::StoreError;

/// A schemaless record: `id` and `timestamp` plus opaque passthrough fields.
pub(crate) type Item = Map<String, Value>;

const CATEGORY_INDEX: &str = "CategoryIndex";

/// One page of a bounded table scan.
pub(crate) struct ScanPage {
    pub items: Vec<Item>,
    pub scanned_count: i32,
    /// Present iff the backend stopped before the end of the table.
    pub last_key: Option<Item>,
}

/// The storage operations the routes need: DynamoDB in production, an
/// in-memory table with the same observable semantics in tests. Every route
/// makes at most one of these calls; there is no retrying or batching here.
pub(crate) trait Store {
    async fn scan(&self, limit: i32, start_key: Option<Item>) -> Result<ScanPage, StoreError>;
    async fn get(&self, id: &str) -> Result<Option<Item>, StoreError>;
    async fn put(&self, item: Item) -> Result<(), StoreError>;
    async fn query_by_category(&self, category: &str, limit: i32)
        -> Result<Vec<Item>, StoreError>;
    async fn search(&self, term: &str, limit: i32) -> Result<Vec<Item>, StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

pub(crate) struct DynamoStore {
    client: Client,
    table_name: String,
}

impl DynamoStore {
    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    fn key(id: &str) -> HashMap<String, AttributeValue> {
        HashMap::from([("id".to_string(), AttributeValue::S(id.to_string()))])
    }
}

impl Store for DynamoStore {
    async fn scan(&self, limit: i32, start_key: Option<Item>) -> Result<ScanPage, StoreError> {
        let output = self
            .client
            .scan()
            .table_name(&self.table_name)
            .limit(limit)
            .set_exclusive_start_key(start_key.as_ref().map(attr::json_to_item))
            .send()
            .await?;

        Ok(ScanPage {
            items: output.items().iter().map(attr::item_to_json).collect(),
            scanned_count: output.scanned_count(),
            last_key: output.last_evaluated_key().map(attr::item_to_json),
        })
    }

    async fn get(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(id)))
            .send()
            .await?;

        Ok(output.item().map(attr::item_to_json))
    }

    async fn put(&self, item: Item) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(attr::json_to_item(&item)))
            .send()
            .await?;

        Ok(())
    }

    async fn query_by_category(
        &self,
        category: &str,
        limit: i32,
    ) -> Result<Vec<Item>, StoreError> {
        let output = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(CATEGORY_INDEX)
            .key_condition_expression("category = :category")
            .expression_attribute_values(":category", AttributeValue::S(category.to_string()))
            .limit(limit)
            .send()
            .await?;

        Ok(output.items().iter().map(attr::item_to_json).collect())
    }

    async fn search(&self, term: &str, limit: i32) -> Result<Vec<Item>, StoreError> {
        // The limit bounds rows examined, not rows matched; DynamoDB applies
        // the filter expression after the scan window is cut.
        let output = self
            .client
            .scan()
            .table_name(&self.table_name)
            .filter_expression("contains(#name, :term) OR contains(#desc, :term)")
            .expression_attribute_names("#name", "name")
            .expression_attribute_names("#desc", "description")
            .expression_attribute_values(":term", AttributeValue::S(term.to_string()))
            .limit(limit)
            .send()
            .await?;

        Ok(output.items().iter().map(attr::item_to_json).collect())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(id)))
            .send()
            .await?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use serde_json::Value;

    use super::{Item, ScanPage, Store};
    use crate::error::StoreError;

    /// In-memory stand-in for the table. The BTreeMap gives a stable
    /// iteration order, which makes the pagination tests deterministic.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        items: Mutex<BTreeMap<String, Item>>,
    }

    impl MemoryStore {
        pub fn seed(values: impl IntoIterator<Item = Value>) -> Self {
            let store = Self::default();
            {
                let mut map = store.items.lock().unwrap();
                for value in values {
                    let item = value.as_object().expect("seed values must be objects").clone();
                    let id = item["id"].as_str().expect("seed values need an id").to_string();
                    map.insert(id, item);
                }
            }
            store
        }

        fn matches(item: &Item, term: &str) -> bool {
            ["name", "description"].iter().any(|field| {
                item.get(*field)
                    .and_then(Value::as_str)
                    .is_some_and(|text| text.contains(term))
            })
        }
    }

    impl Store for MemoryStore {
        async fn scan(&self, limit: i32, start_key: Option<Item>) -> Result<ScanPage, StoreError> {
            let map = self.items.lock().unwrap();
            let after = start_key
                .as_ref()
                .and_then(|key| key.get("id"))
                .and_then(Value::as_str)
                .map(str::to_string);

            let mut items = Vec::new();
            let mut truncated = false;
            for (id, item) in map.iter() {
                if after.as_deref().is_some_and(|a| id.as_str() <= a) {
                    continue;
                }
                if items.len() == limit as usize {
                    truncated = true;
                    break;
                }
                items.push(item.clone());
            }

            let last_key = if truncated {
                items.last().map(|item| {
                    let mut key = Item::new();
                    key.insert("id".to_string(), item["id"].clone());
                    key
                })
            } else {
                None
            };

            Ok(ScanPage {
                scanned_count: items.len() as i32,
                items,
                last_key,
            })
        }

        async fn get(&self, id: &str) -> Result<Option<Item>, StoreError> {
            Ok(self.items.lock().unwrap().get(id).cloned())
        }

        async fn put(&self, item: Item) -> Result<(), StoreError> {
            let id = item["id"].as_str().expect("items need a string id").to_string();
            self.items.lock().unwrap().insert(id, item);
            Ok(())
        }

        async fn query_by_category(
            &self,
            category: &str,
            limit: i32,
        ) -> Result<Vec<Item>, StoreError> {
            Ok(self
                .items
                .lock()
                .unwrap()
                .values()
                .filter(|item| item.get("category").and_then(Value::as_str) == Some(category))
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn search(&self, term: &str, limit: i32) -> Result<Vec<Item>, StoreError> {
            // Examine at most `limit` rows, then filter, mirroring a filtered
            // DynamoDB scan.
            Ok(self
                .items
                .lock()
                .unwrap()
                .values()
                .take(limit as usize)
                .filter(|item| Self::matches(item, term))
                .cloned()
                .collect())
        }

        async fn delete(&self, id: &str) -> Result<(), StoreError> {
            self.items.lock().unwrap().remove(id);
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use serde_json::json;

        use super::{MemoryStore, Store};

        #[tokio::test]
        async fn scan_resumes_strictly_after_the_cursor() {
            let store = MemoryStore::seed([
                json!({"id": "a", "timestamp": 1}),
                json!({"id": "b", "timestamp": 2}),
                json!({"id": "c", "timestamp": 3}),
            ]);

            let first = store.scan(2, None).await.unwrap();
            assert_eq!(first.items.len(), 2);
            let cursor = first.last_key.expect("more data remains");

            let second = store.scan(2, Some(cursor)).await.unwrap();
            assert_eq!(second.items.len(), 1);
            assert_eq!(second.items[0]["id"], "c");
            assert!(second.last_key.is_none());
        }

        #[tokio::test]
        async fn exhausted_scan_has_no_cursor() {
            let store = MemoryStore::seed([json!({"id": "a", "timestamp": 1})]);
            let page = store.scan(50, None).await.unwrap();
            assert_eq!(page.items.len(), 1);
            assert!(page.last_key.is_none());
        }
    }
}
