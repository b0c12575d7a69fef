use std::cmp::Ordering;
use serde::{Serialize, Deserialize};
use crate::core::types::Value;

/// Top-level request handed over by the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub token: i64,
    pub kind: QueryKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryKind {
    Read(ReadQuery),
    Write(WriteQuery),
    Meta(MetaQuery),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadQuery {
    pub term: Term,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WriteQuery {
    Insert(Insert),
    PointUpdate(PointUpdate),
    PointDelete(PointDelete),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    pub table_ref: TableRef,
    pub terms: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointUpdate {
    pub table_ref: TableRef,
    pub key: Term,
    pub patch: Term,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointDelete {
    pub table_ref: TableRef,
    pub key: Term,
}

/// Data definition: databases and tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetaQuery {
    CreateDb(String),
    DropDb(String),
    ListDbs,
    CreateTable(CreateTable),
    DropTable(TableRef),
    ListTables(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTable {
    pub table_ref: TableRef,
    pub datacenter: Option<String>,
    pub primary_key: Option<String>,
    pub cache_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRef {
    pub db_name: String,
    pub table_name: String,
    pub use_outdated: bool,
}

/// Expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Term {
    Null,
    Number(f64),
    String(String),
    Bool(bool),
    Array(Vec<Term>),
    Object(Vec<(String, Term)>),
    Var(String),
    Let {
        bindings: Vec<(String, Term)>,
        body: Box<Term>,
    },
    /// Row bound by the innermost FILTER predicate
    ImplicitVar,
    Call(Call),
    GetByKey {
        table_ref: TableRef,
        key: Box<Term>,
    },
    Table(TableRef),
    Javascript(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub builtin: Builtin,
    pub args: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Builtin {
    Not,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Compare(Comparison),
    Or,
    And,
    Filter(Predicate),
    GetAttr,
    HasAttr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Single-argument function used by FILTER
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub arg: String,
    pub body: Box<Term>,
}

impl Query {
    pub fn read(token: i64, term: Term) -> Self {
        Query {
            token,
            kind: QueryKind::Read(ReadQuery { term }),
        }
    }

    pub fn write(token: i64, write: WriteQuery) -> Self {
        Query {
            token,
            kind: QueryKind::Write(write),
        }
    }

    pub fn meta(token: i64, meta: MetaQuery) -> Self {
        Query {
            token,
            kind: QueryKind::Meta(meta),
        }
    }
}

impl TableRef {
    pub fn new(db_name: &str, table_name: &str) -> Self {
        TableRef {
            db_name: db_name.to_string(),
            table_name: table_name.to_string(),
            use_outdated: false,
        }
    }
}

impl CreateTable {
    pub fn new(table_ref: TableRef) -> Self {
        CreateTable {
            table_ref,
            datacenter: None,
            primary_key: None,
            cache_size: None,
        }
    }

    pub fn with_primary_key(mut self, primary_key: &str) -> Self {
        self.primary_key = Some(primary_key.to_string());
        self
    }

    pub fn with_datacenter(mut self, datacenter: &str) -> Self {
        self.datacenter = Some(datacenter.to_string());
        self
    }

    pub fn with_cache_size(mut self, cache_size: u64) -> Self {
        self.cache_size = Some(cache_size);
        self
    }
}

impl Term {
    pub fn string(s: &str) -> Self {
        Term::String(s.to_string())
    }

    pub fn object<'a>(fields: impl IntoIterator<Item = (&'a str, Term)>) -> Self {
        Term::Object(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    pub fn call(builtin: Builtin, args: Vec<Term>) -> Self {
        Term::Call(Call { builtin, args })
    }

    pub fn compare(comparison: Comparison, left: Term, right: Term) -> Self {
        Term::call(Builtin::Compare(comparison), vec![left, right])
    }

    pub fn get_by_key(table_ref: TableRef, key: Term) -> Self {
        Term::GetByKey {
            table_ref,
            key: Box::new(key),
        }
    }
}

/// Literal term that evaluates back to `value`
impl From<Value> for Term {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Term::Null,
            Value::Number(n) => Term::Number(n),
            Value::String(s) => Term::String(s),
            Value::Bool(b) => Term::Bool(b),
            Value::Array(items) => Term::Array(items.into_iter().map(Term::from).collect()),
            Value::Object(obj) => {
                Term::Object(obj.into_iter().map(|(k, v)| (k, Term::from(v))).collect())
            }
            Value::Error(message) => Term::Error(message),
        }
    }
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Not => "NOT",
            Builtin::Add => "ADD",
            Builtin::Sub => "SUB",
            Builtin::Mul => "MUL",
            Builtin::Div => "DIV",
            Builtin::Mod => "MOD",
            Builtin::Compare(comparison) => comparison.name(),
            Builtin::Or => "OR",
            Builtin::And => "AND",
            Builtin::Filter(_) => "FILTER",
            Builtin::GetAttr => "GETATTR",
            Builtin::HasAttr => "HASATTR",
        }
    }
}

impl Comparison {
    pub fn name(&self) -> &'static str {
        match self {
            Comparison::Eq => "EQ",
            Comparison::Ne => "NE",
            Comparison::Lt => "LT",
            Comparison::Le => "LE",
            Comparison::Gt => "GT",
            Comparison::Ge => "GE",
        }
    }

    /// Whether `ordering` (left relative to right) satisfies this comparison
    pub fn matches(&self, ordering: Ordering) -> bool {
        match self {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Ne => ordering != Ordering::Equal,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Le => ordering != Ordering::Greater,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Ge => ordering != Ordering::Less,
        }
    }
}
