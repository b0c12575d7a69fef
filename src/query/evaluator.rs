use crate::core::error::{Error, Result};
use crate::core::types::{Object, Value};
use crate::query::ast::Term;
use crate::query::builtins;
use crate::storage::store::Store;

/// Recursive term evaluator over a read-only view of the store.
///
/// Holds the lexical scope for `Let`/`Var` and the stack of rows bound by
/// FILTER predicates.
pub struct Evaluator<'a> {
    store: &'a Store,
    scope: Vec<(String, Value)>,
    rows: Vec<Value>,
}

impl<'a> Evaluator<'a> {
    pub fn new(store: &'a Store) -> Self {
        Evaluator {
            store,
            scope: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn evaluate(&mut self, term: &Term) -> Result<Value> {
        match term {
            Term::Null => Ok(Value::Null),
            Term::Number(n) => Ok(Value::Number(*n)),
            Term::String(s) => Ok(Value::String(s.clone())),
            Term::Bool(b) => Ok(Value::Bool(*b)),

            Term::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.evaluate(item)?);
                }
                Ok(Value::Array(values))
            }

            Term::Object(fields) => {
                let mut obj = Object::new();
                for (name, value) in fields {
                    let value = self.evaluate(value)?;
                    obj.insert(name.clone(), value);
                }
                Ok(Value::Object(obj))
            }

            Term::Var(name) => self.lookup(name),

            Term::Let { bindings, body } => {
                let mark = self.scope.len();
                let result = self.evaluate_let(bindings, body);
                self.scope.truncate(mark);
                result
            }

            Term::ImplicitVar => self.rows.last().cloned().ok_or_else(|| {
                Error::runtime("Implicit variable used outside of a predicate")
            }),

            Term::Call(call) => builtins::dispatch(self, &call.builtin, &call.args),

            Term::GetByKey { table_ref, key } => {
                let key = self.evaluate(key)?;
                let found = table_ref.get_by_key(self.store, &key)?;
                Ok(Value::Array(found.into_iter().map(Value::Object).collect()))
            }

            Term::Table(table_ref) => Ok(Value::Array(table_ref.scan(self.store)?)),

            Term::Javascript(_) => Err(Error::unsupported("Javascript terms are not supported.")),

            Term::Error(message) => Ok(Value::Error(message.clone())),
        }
    }

    /// Evaluate `body` with `name` bound to `row`, which is also the
    /// implicit variable for the duration of the call.
    pub fn evaluate_with_row(&mut self, name: &str, row: Value, body: &Term) -> Result<Value> {
        let mark = self.scope.len();
        self.scope.push((name.to_string(), row.clone()));
        self.rows.push(row);
        let result = self.evaluate(body);
        self.rows.pop();
        self.scope.truncate(mark);
        result
    }

    fn evaluate_let(&mut self, bindings: &[(String, Term)], body: &Term) -> Result<Value> {
        for (name, term) in bindings {
            let value = self.evaluate(term)?;
            self.scope.push((name.clone(), value));
        }
        self.evaluate(body)
    }

    fn lookup(&self, name: &str) -> Result<Value> {
        self.scope
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| Error::runtime(format!("Unbound variable `{}`", name)))
    }
}
