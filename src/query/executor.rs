use tracing::{debug, info, warn};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Object, Value};
use crate::core::utils::generate_uuid;
use crate::query::ast::{
    CreateTable, Insert, MetaQuery, PointDelete, PointUpdate, Query, QueryKind, ReadQuery, Term,
    TableRef, WriteQuery,
};
use crate::query::evaluator::Evaluator;
use crate::query::response::Response;
use crate::query::validator::{validate_name, QueryValidator};
use crate::storage::key::InternalKey;
use crate::storage::store::{Store, TableOptions};

/// What a successful query produced, before it is framed as a response
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Empty,
    Single(Value),
    Stream(Vec<Value>),
}

/// Top-level query dispatch: Read, Write and Meta queries.
///
/// Every call is one synchronous pass over the store. Errors are turned
/// into a `Response` here and nowhere else.
pub struct QueryExecutor {
    config: Config,
    validator: QueryValidator,
    key_generator: fn() -> String,
}

impl QueryExecutor {
    pub fn new(config: Config) -> Self {
        let validator = QueryValidator::new(config.max_term_depth);
        QueryExecutor {
            config,
            validator,
            key_generator: generate_uuid,
        }
    }

    /// Replace the primary key generator used by inserts
    pub fn with_key_generator(mut self, key_generator: fn() -> String) -> Self {
        self.key_generator = key_generator;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute any query against a store held exclusively
    pub fn execute(&self, store: &mut Store, query: &Query) -> Response {
        debug!(token = query.token, kind = kind_name(&query.kind), "executing query");
        let result = self.validator.validate(query).and_then(|_| match &query.kind {
            QueryKind::Read(read) => self.run_read(store, read),
            QueryKind::Write(write) => self.run_write(store, write),
            QueryKind::Meta(meta) => self.run_meta(store, meta),
        });
        respond(query.token, result)
    }

    /// Execute a read query against a shared view of the store
    pub fn execute_read(&self, store: &Store, query: &Query) -> Response {
        debug!(token = query.token, kind = kind_name(&query.kind), "executing query");
        let result = self.validator.validate(query).and_then(|_| match &query.kind {
            QueryKind::Read(read) => self.run_read(store, read),
            other => Err(Error::new(
                ErrorKind::Internal,
                format!("{} query routed to the read path", kind_name(other)),
            )),
        });
        respond(query.token, result)
    }

    fn run_read(&self, store: &Store, read: &ReadQuery) -> Result<Outcome> {
        let value = Evaluator::new(store).evaluate(&read.term)?;
        match (value, &read.term) {
            (Value::Error(message), _) => Err(Error::runtime(message)),
            // table scans stream one fragment per row
            (Value::Array(rows), Term::Table(_)) => Ok(Outcome::Stream(rows)),
            (value, _) => Ok(Outcome::Single(value)),
        }
    }

    fn run_write(&self, store: &mut Store, write: &WriteQuery) -> Result<Outcome> {
        let result = match write {
            WriteQuery::Insert(insert) => self.insert(store, insert)?,
            WriteQuery::PointUpdate(update) => self.point_update(store, update)?,
            WriteQuery::PointDelete(delete) => self.point_delete(store, delete)?,
        };
        Ok(Outcome::Single(result))
    }

    fn run_meta(&self, store: &mut Store, meta: &MetaQuery) -> Result<Outcome> {
        match meta {
            MetaQuery::CreateDb(name) => {
                validate_name(name)?;
                store.create_database(name)?;
                info!(db = %name, "created database");
                Ok(Outcome::Empty)
            }
            MetaQuery::DropDb(name) => {
                validate_name(name)?;
                store.drop_database(name)?;
                info!(db = %name, "dropped database");
                Ok(Outcome::Empty)
            }
            MetaQuery::ListDbs => Ok(Outcome::Stream(
                store.database_names().into_iter().map(Value::String).collect(),
            )),
            MetaQuery::CreateTable(create) => {
                self.create_table(store, create)?;
                Ok(Outcome::Empty)
            }
            MetaQuery::DropTable(table_ref) => {
                table_ref.remove(store)?;
                info!(db = %table_ref.db_name, table = %table_ref.table_name, "dropped table");
                Ok(Outcome::Empty)
            }
            MetaQuery::ListTables(db) => {
                validate_name(db)?;
                Ok(Outcome::Stream(
                    store.table_names(db)?.into_iter().map(Value::String).collect(),
                ))
            }
        }
    }

    fn create_table(&self, store: &mut Store, create: &CreateTable) -> Result<()> {
        let options = TableOptions {
            primary_key: create
                .primary_key
                .clone()
                .unwrap_or_else(|| self.config.default_primary_key.clone()),
            datacenter: create.datacenter.clone(),
            cache_size: create.cache_size.unwrap_or(self.config.default_cache_size),
        };
        create.table_ref.create(store, options)?;
        info!(
            db = %create.table_ref.db_name,
            table = %create.table_ref.table_name,
            "created table"
        );
        Ok(())
    }

    /// Insert a batch document by document.
    ///
    /// A failing document is counted in `errors` and the batch continues;
    /// `first_error` keeps the message of the first failure only.
    fn insert(&self, store: &mut Store, insert: &Insert) -> Result<Value> {
        let primary_key = insert.table_ref.primary_key(store)?;
        let mut summary = InsertSummary::default();

        for term in &insert.terms {
            let evaluated = Evaluator::new(store).evaluate(term);
            let outcome =
                evaluated.and_then(|doc| self.insert_one(store, &insert.table_ref, &primary_key, doc));
            match outcome {
                Ok(generated) => summary.record_insert(generated),
                Err(err) => summary.record_error(err.context),
            }
        }

        debug!(
            table = %insert.table_ref.table_name,
            inserted = summary.inserted,
            errors = summary.errors,
            "insert batch done"
        );
        Ok(summary.into_value())
    }

    // Returns the generated key when the document had no primary key
    fn insert_one(
        &self,
        store: &mut Store,
        table_ref: &TableRef,
        primary_key: &str,
        doc: Value,
    ) -> Result<Option<String>> {
        let mut doc = match doc {
            Value::Object(doc) => doc,
            other => {
                return Err(Error::type_mismatch(format!(
                    "Cannot insert non-object value {}",
                    other
                )));
            }
        };
        let table = store.table_mut(&table_ref.db_name, &table_ref.table_name)?;

        let explicit_key = match doc.get(primary_key) {
            Some(value) => Some(InternalKey::from_value(value).map_err(|_| {
                Error::type_mismatch(format!(
                    "Cannot insert row {} with primary key {} of non-string, non-number type.",
                    Value::Object(doc.clone()),
                    value
                ))
            })?),
            None => None,
        };

        match explicit_key {
            Some(key) => {
                if table.contains(&key) {
                    return Err(Error::new(
                        ErrorKind::Duplicate,
                        format!(
                            "Duplicate primary key `{}` in row {}",
                            primary_key,
                            Value::Object(doc)
                        ),
                    ));
                }
                table.insert(key, doc)?;
                Ok(None)
            }
            None => {
                let id = (self.key_generator)();
                let key = InternalKey::String(id.clone());
                if table.contains(&key) {
                    warn!(table = %table_ref.table_name, key = %id, "generated key collision");
                    return Err(Error::new(
                        ErrorKind::Duplicate,
                        format!("Generated primary key `{}` collides with an existing row", id),
                    ));
                }
                doc.insert(primary_key.to_string(), Value::String(id.clone()));
                table.insert(key, doc)?;
                Ok(Some(id))
            }
        }
    }

    fn point_update(&self, store: &mut Store, update: &PointUpdate) -> Result<Value> {
        let (key, patch) = {
            let mut evaluator = Evaluator::new(store);
            (evaluator.evaluate(&update.key)?, evaluator.evaluate(&update.patch)?)
        };
        let patch: Object = match patch {
            Value::Object(patch) => patch,
            other => {
                return Err(Error::type_mismatch(format!(
                    "Point update patch must be an object, got {}",
                    other.type_name()
                )));
            }
        };
        update
            .table_ref
            .point_update(store, &key, &patch, self.config.strict_point_writes)
    }

    fn point_delete(&self, store: &mut Store, delete: &PointDelete) -> Result<Value> {
        let key = Evaluator::new(store).evaluate(&delete.key)?;
        delete
            .table_ref
            .point_delete(store, &key, self.config.strict_point_writes)
    }
}

#[derive(Debug, Default)]
struct InsertSummary {
    inserted: usize,
    errors: usize,
    first_error: Option<String>,
    generated_keys: Vec<String>,
}

impl InsertSummary {
    fn record_insert(&mut self, generated: Option<String>) {
        self.inserted += 1;
        if let Some(key) = generated {
            self.generated_keys.push(key);
        }
    }

    fn record_error(&mut self, message: String) {
        self.errors += 1;
        if self.first_error.is_none() {
            self.first_error = Some(message);
        }
    }

    fn into_value(self) -> Value {
        let mut obj = Object::new();
        obj.insert("inserted".to_string(), Value::Number(self.inserted as f64));
        obj.insert("errors".to_string(), Value::Number(self.errors as f64));
        if let Some(message) = self.first_error {
            obj.insert("first_error".to_string(), Value::String(message));
        }
        if !self.generated_keys.is_empty() {
            let keys = self.generated_keys.into_iter().map(Value::String).collect();
            obj.insert("generated_keys".to_string(), Value::Array(keys));
        }
        Value::Object(obj)
    }
}

fn respond(token: i64, result: Result<Outcome>) -> Response {
    match result {
        Ok(Outcome::Empty) => Response::empty(token),
        Ok(Outcome::Single(value)) => Response::single(token, &value),
        Ok(Outcome::Stream(values)) => Response::stream(token, &values),
        Err(err) => {
            warn!(token, status = err.status(), error = %err.context, "query failed");
            Response::error(token, &err)
        }
    }
}

fn kind_name(kind: &QueryKind) -> &'static str {
    match kind {
        QueryKind::Read(_) => "read",
        QueryKind::Write(WriteQuery::Insert(_)) => "insert",
        QueryKind::Write(WriteQuery::PointUpdate(_)) => "point_update",
        QueryKind::Write(WriteQuery::PointDelete(_)) => "point_delete",
        QueryKind::Meta(_) => "meta",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::response::StatusCode;

    fn executor() -> QueryExecutor {
        QueryExecutor::new(Config::default())
    }

    fn setup(executor: &QueryExecutor) -> Store {
        let mut store = Store::new();
        let create_db = Query::meta(1, MetaQuery::CreateDb("app".into()));
        assert!(executor.execute(&mut store, &create_db).is_success());
        let create_table = Query::meta(
            2,
            MetaQuery::CreateTable(CreateTable::new(TableRef::new("app", "users"))),
        );
        assert!(executor.execute(&mut store, &create_table).is_success());
        store
    }

    fn insert(terms: Vec<Term>) -> Query {
        Query::write(
            3,
            WriteQuery::Insert(Insert {
                table_ref: TableRef::new("app", "users"),
                terms,
            }),
        )
    }

    fn single(response: &Response) -> Object {
        assert_eq!(response.status, StatusCode::SuccessJson, "{:?}", response);
        let mut values = response.values().unwrap();
        match values.remove(0) {
            Value::Object(obj) => obj,
            other => panic!("expected object, got {}", other),
        }
    }

    fn fixed_key() -> String {
        "00000000-0000-0000-0000-000000000000".to_string()
    }

    #[test]
    fn test_create_table_defaults() {
        let executor = executor();
        let store = setup(&executor);
        let table = store.table("app", "users").unwrap();
        assert_eq!(table.options.primary_key, "id");
        assert_eq!(table.options.cache_size, 1024 * 1024 * 1024);
        assert_eq!(table.options.datacenter, None);
    }

    #[test]
    fn test_insert_mixed_batch_accumulates_errors() {
        let executor = executor();
        let mut store = setup(&executor);
        let response = executor.execute(
            &mut store,
            &insert(vec![
                Term::object([("id", Term::Number(1.0))]),
                Term::Number(5.0),
                Term::object([("id", Term::Number(1.0))]),
                Term::object([("name", Term::string("ada"))]),
            ]),
        );
        let summary = single(&response);
        assert_eq!(summary["inserted"], Value::Number(2.0));
        assert_eq!(summary["errors"], Value::Number(2.0));
        assert_eq!(
            summary["first_error"],
            Value::from("Cannot insert non-object value 5")
        );
        let Value::Array(keys) = &summary["generated_keys"] else {
            panic!("expected generated keys")
        };
        assert_eq!(keys.len(), 1);
        assert_eq!(store.table("app", "users").unwrap().len(), 2);
    }

    #[test]
    fn test_insert_without_generated_keys_omits_field() {
        let executor = executor();
        let mut store = setup(&executor);
        let response = executor.execute(
            &mut store,
            &insert(vec![Term::object([("id", Term::string("a"))])]),
        );
        let summary = single(&response);
        assert!(!summary.contains_key("generated_keys"));
        assert!(!summary.contains_key("first_error"));
    }

    #[test]
    fn test_generated_key_collision_is_reported() {
        let executor = executor().with_key_generator(fixed_key);
        let mut store = setup(&executor);
        let response = executor.execute(
            &mut store,
            &insert(vec![
                Term::object([("n", Term::Number(1.0))]),
                Term::object([("n", Term::Number(2.0))]),
            ]),
        );
        let summary = single(&response);
        assert_eq!(summary["inserted"], Value::Number(1.0));
        assert_eq!(summary["errors"], Value::Number(1.0));
        let first_error = summary["first_error"].as_str().unwrap();
        assert!(first_error.contains("collides"), "{}", first_error);
    }

    #[test]
    fn test_insert_into_missing_table_fails_whole_query() {
        let executor = executor();
        let mut store = setup(&executor);
        let query = Query::write(
            4,
            WriteQuery::Insert(Insert {
                table_ref: TableRef::new("app", "nope"),
                terms: vec![Term::Object(vec![])],
            }),
        );
        let response = executor.execute(&mut store, &query);
        assert_eq!(response.status_code(), 103);
        assert_eq!(response.token, 4);
    }

    #[test]
    fn test_javascript_rejected_before_insert() {
        let executor = executor();
        let mut store = setup(&executor);
        let response = executor.execute(
            &mut store,
            &insert(vec![
                Term::object([("id", Term::Number(1.0))]),
                Term::Javascript("{}".into()),
            ]),
        );
        assert_eq!(response.status_code(), 102);
        assert!(store.table("app", "users").unwrap().is_empty());
    }

    #[test]
    fn test_point_update_requires_object_patch() {
        let executor = executor();
        let mut store = setup(&executor);
        let query = Query::write(
            5,
            WriteQuery::PointUpdate(PointUpdate {
                table_ref: TableRef::new("app", "users"),
                key: Term::Number(1.0),
                patch: Term::Number(2.0),
            }),
        );
        let response = executor.execute(&mut store, &query);
        assert_eq!(response.status_code(), 103);
    }

    #[test]
    fn test_error_term_fails_read() {
        let executor = executor();
        let store = setup(&executor);
        let response = executor.execute_read(&store, &Query::read(6, Term::Error("nope".into())));
        assert_eq!(response.status_code(), 103);
        assert_eq!(response.error_message.as_deref(), Some("nope"));
    }

    #[test]
    fn test_write_on_read_path_is_rejected() {
        let executor = executor();
        let store = setup(&executor);
        let query = Query::meta(7, MetaQuery::ListDbs);
        let response = executor.execute_read(&store, &query);
        assert_eq!(response.status_code(), 103);
    }

    #[test]
    fn test_list_tables() {
        let executor = executor();
        let mut store = setup(&executor);
        let response = executor.execute(&mut store, &Query::meta(8, MetaQuery::ListTables("app".into())));
        assert_eq!(response.status, StatusCode::SuccessStream);
        assert_eq!(response.payload, vec!["\"users\"".to_string()]);

        let response = executor.execute(&mut store, &Query::meta(9, MetaQuery::ListTables("b-d".into())));
        assert_eq!(response.status_code(), 102);
        let response = executor.execute(&mut store, &Query::meta(9, MetaQuery::ListTables("none".into())));
        assert_eq!(response.status_code(), 103);
    }
}
