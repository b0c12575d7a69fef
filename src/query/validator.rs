use std::sync::LazyLock;
use regex::Regex;
use tracing::debug;
use crate::core::error::{Error, Result};
use crate::query::ast::{Builtin, Query, QueryKind, Term, WriteQuery};

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("name pattern compiles"));

/// Database and table names are restricted to `A-Za-z0-9_`
pub fn validate_name(name: &str) -> Result<()> {
    if NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        debug!(name, "rejected name");
        Err(Error::invalid_name(name))
    }
}

/// Structural checks run before a query touches the store
pub struct QueryValidator {
    max_term_depth: usize,
}

impl QueryValidator {
    pub fn new(max_term_depth: usize) -> Self {
        QueryValidator { max_term_depth }
    }

    pub fn validate(&self, query: &Query) -> Result<()> {
        match &query.kind {
            QueryKind::Read(read) => self.validate_term(&read.term, 0),
            QueryKind::Write(WriteQuery::Insert(insert)) => insert
                .terms
                .iter()
                .try_for_each(|term| self.validate_term(term, 0)),
            QueryKind::Write(WriteQuery::PointUpdate(update)) => {
                self.validate_term(&update.key, 0)?;
                self.validate_term(&update.patch, 0)
            }
            QueryKind::Write(WriteQuery::PointDelete(delete)) => self.validate_term(&delete.key, 0),
            QueryKind::Meta(_) => Ok(()),
        }
    }

    fn validate_term(&self, term: &Term, depth: usize) -> Result<()> {
        if depth > self.max_term_depth {
            return Err(Error::bad_query(format!(
                "Term depth exceeds maximum {}",
                self.max_term_depth
            )));
        }

        let next = depth + 1;
        match term {
            Term::Array(items) => items.iter().try_for_each(|item| self.validate_term(item, next)),
            Term::Object(fields) => fields
                .iter()
                .try_for_each(|(_, value)| self.validate_term(value, next)),
            Term::Let { bindings, body } => {
                for (_, value) in bindings {
                    self.validate_term(value, next)?;
                }
                self.validate_term(body, next)
            }
            Term::Call(call) => {
                validate_arity(&call.builtin, call.args.len())?;
                if let Builtin::Filter(predicate) = &call.builtin {
                    self.validate_term(&predicate.body, next)?;
                }
                call.args.iter().try_for_each(|arg| self.validate_term(arg, next))
            }
            Term::GetByKey { key, .. } => self.validate_term(key, next),
            Term::Javascript(_) => Err(Error::unsupported("Javascript terms are not supported.")),
            _ => Ok(()),
        }
    }
}

/// Argument count check shared with the builtin dispatcher
pub fn validate_arity(builtin: &Builtin, count: usize) -> Result<()> {
    let ok = match builtin {
        Builtin::Not => count == 1,
        Builtin::Filter(_) => count >= 1,
        _ => count == 2,
    };
    if ok {
        Ok(())
    } else {
        Err(Error::bad_query(format!(
            "{} called with {} argument(s)",
            builtin.name(),
            count
        )))
    }
}
