use tracing::debug;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Object, Value};
use crate::query::ast::TableRef;
use crate::query::validator::validate_name;
use crate::storage::key::InternalKey;
use crate::storage::store::{Store, TableOptions};

/// Table operations addressed through a `TableRef`.
/// Names are validated before the store is consulted.
impl TableRef {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.db_name)?;
        validate_name(&self.table_name)
    }

    pub fn create(&self, store: &mut Store, options: TableOptions) -> Result<()> {
        self.validate()?;
        store.create_table(&self.db_name, &self.table_name, options)
    }

    pub fn remove(&self, store: &mut Store) -> Result<()> {
        self.validate()?;
        store.drop_table(&self.db_name, &self.table_name)?;
        Ok(())
    }

    /// All documents of the table, in key order: numeric keys by value,
    /// then string keys
    pub fn scan(&self, store: &Store) -> Result<Vec<Value>> {
        self.validate()?;
        let table = store.table(&self.db_name, &self.table_name)?;
        Ok(table.documents().cloned().map(Value::Object).collect())
    }

    pub fn get_by_key(&self, store: &Store, key: &Value) -> Result<Option<Object>> {
        self.validate()?;
        let table = store.table(&self.db_name, &self.table_name)?;
        let key = lookup_key(key)?;
        Ok(table.get(&key).cloned())
    }

    pub fn primary_key(&self, store: &Store) -> Result<String> {
        self.validate()?;
        let table = store.table(&self.db_name, &self.table_name)?;
        Ok(table.primary_key().to_string())
    }

    /// Delete the document stored under `key`.
    ///
    /// A missing document still reports `deleted: 1` unless `strict` is set.
    pub fn point_delete(&self, store: &mut Store, key: &Value, strict: bool) -> Result<Value> {
        self.validate()?;
        let table = store.table_mut(&self.db_name, &self.table_name)?;
        let key = lookup_key(key)?;

        let removed = table.remove(&key).is_some();
        debug!(table = %self.table_name, %key, removed, "point delete");
        let deleted = if removed || !strict { 1.0 } else { 0.0 };
        Ok(summary(&[("deleted", deleted)]))
    }

    /// Shallow-merge `patch` into the document stored under `key`.
    ///
    /// A missing document still reports `updated: 1` unless `strict` is set.
    pub fn point_update(
        &self,
        store: &mut Store,
        key: &Value,
        patch: &Object,
        strict: bool,
    ) -> Result<Value> {
        self.validate()?;
        let table = store.table_mut(&self.db_name, &self.table_name)?;
        let key = lookup_key(key)?;
        let primary_key = table.primary_key().to_string();

        if let Some(new_pk) = patch.get(&primary_key) {
            if InternalKey::from_value(new_pk)? != key {
                return Err(Error::runtime(format!(
                    "Point update cannot change primary key `{}` (from {} to {})",
                    primary_key,
                    key,
                    new_pk
                )));
            }
        }

        let found = match table.get_mut(&key) {
            Some(doc) => {
                for (field, value) in patch {
                    doc.insert(field.clone(), value.clone());
                }
                true
            }
            None => false,
        };
        debug!(table = %self.table_name, %key, found, "point update");

        if found || !strict {
            Ok(summary(&[("updated", 1.0), ("skipped", 0.0), ("errors", 0.0)]))
        } else {
            Ok(summary(&[("updated", 0.0), ("skipped", 1.0), ("errors", 0.0)]))
        }
    }
}

fn lookup_key(key: &Value) -> Result<InternalKey> {
    InternalKey::from_value(key).map_err(|_| {
        Error::new(
            ErrorKind::TypeMismatch,
            format!(
                "Bad key type: {} {} (expected finite number or string)",
                key.type_name(),
                key
            ),
        )
    })
}

fn summary(counts: &[(&str, f64)]) -> Value {
    Value::Object(
        counts
            .iter()
            .map(|(name, count)| (name.to_string(), Value::Number(*count)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Store, TableRef) {
        let mut store = Store::new();
        store.create_database("app").unwrap();
        let table_ref = TableRef::new("app", "users");
        let options = TableOptions {
            primary_key: "id".to_string(),
            datacenter: None,
            cache_size: 1024,
        };
        table_ref.create(&mut store, options).unwrap();
        let doc: Object = [
            ("id".to_string(), Value::Number(1.0)),
            ("name".to_string(), Value::from("ada")),
        ]
        .into_iter()
        .collect();
        store
            .table_mut("app", "users")
            .unwrap()
            .insert(InternalKey::from_value(&Value::Number(1.0)).unwrap(), doc)
            .unwrap();
        (store, table_ref)
    }

    fn count(result: &Value, field: &str) -> f64 {
        result.as_object().unwrap()[field].as_number().unwrap()
    }

    #[test]
    fn test_invalid_names_rejected_before_lookup() {
        let store = Store::new();
        let err = TableRef::new("bad-name!", "t").scan(&store).unwrap_err();
        assert_eq!(err.status(), 102);
        let err = TableRef::new("db", "bad-name!").scan(&store).unwrap_err();
        assert_eq!(err.status(), 102);
        let err = TableRef::new("db", "t").scan(&store).unwrap_err();
        assert_eq!(err.status(), 103);
    }

    #[test]
    fn test_get_by_key_distinguishes_number_and_string() {
        let (store, table_ref) = setup();
        assert!(table_ref.get_by_key(&store, &Value::Number(1.0)).unwrap().is_some());
        assert!(table_ref.get_by_key(&store, &Value::from("1")).unwrap().is_none());
    }

    #[test]
    fn test_scan_orders_numeric_keys_by_value() {
        let (mut store, table_ref) = setup();
        let table = store.table_mut("app", "users").unwrap();
        for id in [10.0, 2.0, -3.0] {
            let doc: Object = [("id".to_string(), Value::Number(id))].into_iter().collect();
            table.insert(InternalKey::from_value(&Value::Number(id)).unwrap(), doc).unwrap();
        }
        let ids: Vec<f64> = table_ref
            .scan(&store)
            .unwrap()
            .iter()
            .map(|row| row.as_object().unwrap()["id"].as_number().unwrap())
            .collect();
        assert_eq!(ids, vec![-3.0, 1.0, 2.0, 10.0]);
    }

    #[test]
    fn test_get_by_key_bad_key_type() {
        let (store, table_ref) = setup();
        let err = table_ref.get_by_key(&store, &Value::Bool(true)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert!(err.context.starts_with("Bad key type"));

        let err = table_ref.get_by_key(&store, &Value::Number(f64::INFINITY)).unwrap_err();
        assert_eq!(err.status(), 103);
    }

    #[test]
    fn test_point_delete_always_reports_one() {
        let (mut store, table_ref) = setup();
        let missing = Value::Number(99.0);
        for _ in 0..2 {
            let result = table_ref.point_delete(&mut store, &missing, false).unwrap();
            assert_eq!(count(&result, "deleted"), 1.0);
        }
        let result = table_ref.point_delete(&mut store, &missing, true).unwrap();
        assert_eq!(count(&result, "deleted"), 0.0);

        let result = table_ref.point_delete(&mut store, &Value::Number(1.0), true).unwrap();
        assert_eq!(count(&result, "deleted"), 1.0);
        assert_eq!(table_ref.scan(&store).unwrap().len(), 0);
    }

    #[test]
    fn test_point_update_merges_shallowly() {
        let (mut store, table_ref) = setup();
        let patch: Object = [("age".to_string(), Value::Number(36.0))].into_iter().collect();
        let result = table_ref
            .point_update(&mut store, &Value::Number(1.0), &patch, false)
            .unwrap();
        assert_eq!(count(&result, "updated"), 1.0);

        let doc = table_ref.get_by_key(&store, &Value::Number(1.0)).unwrap().unwrap();
        assert_eq!(doc["name"], Value::from("ada"));
        assert_eq!(doc["age"], Value::Number(36.0));
    }

    #[test]
    fn test_point_update_missing_key() {
        let (mut store, table_ref) = setup();
        let patch = Object::new();
        let lenient = table_ref
            .point_update(&mut store, &Value::Number(7.0), &patch, false)
            .unwrap();
        assert_eq!(count(&lenient, "updated"), 1.0);
        let strict = table_ref
            .point_update(&mut store, &Value::Number(7.0), &patch, true)
            .unwrap();
        assert_eq!(count(&strict, "updated"), 0.0);
        assert_eq!(count(&strict, "skipped"), 1.0);
        assert_eq!(table_ref.scan(&store).unwrap().len(), 1);
    }

    #[test]
    fn test_point_update_cannot_change_primary_key() {
        let (mut store, table_ref) = setup();
        let patch: Object = [("id".to_string(), Value::Number(2.0))].into_iter().collect();
        let err = table_ref
            .point_update(&mut store, &Value::Number(1.0), &patch, false)
            .unwrap_err();
        assert_eq!(err.status(), 103);

        let same: Object = [("id".to_string(), Value::Number(1.0))].into_iter().collect();
        assert!(table_ref.point_update(&mut store, &Value::Number(1.0), &same, false).is_ok());
    }
}
