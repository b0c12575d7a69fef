pub mod core;
pub mod storage;
pub mod query;

/*
┌──────────────────────────────────────────────────────────────────────────────┐
│                           MEMDOC STRUCT ARCHITECTURE                          │
└──────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── CORE LAYER ──────────────────────────────────┐
│  ┌────────────────────────────────────────────────────────────────────────┐  │
│  │                            struct Database                             │  │
│  │  store: Arc<RwLock<Store>>        // readers share, writers exclusive  │  │
│  │  executor: Arc<QueryExecutor>     // stateless query dispatch          │  │
│  │  queries_executed / queries_failed: Arc<AtomicU64>                     │  │
│  │  started_at: DateTime<Utc>                                             │  │
│  └────────────────────────────────────────────────────────────────────────┘  │
│  Config · Error{kind, context} · Value · DatabaseStats · generate_uuid       │
└──────────────────────────────────────────────────────────────────────────────┘
                                       │
                                       ▼
┌──────────────────────────────── QUERY LAYER ─────────────────────────────────┐
│  Query{token, kind} ──► QueryValidator ──► QueryExecutor                      │
│                                              │                               │
│            Read ──► Evaluator ──► builtins::dispatch                         │
│            Write ─► insert / point_update / point_delete (TableRef)          │
│            Meta ──► create/drop/list databases and tables                    │
│                                              │                               │
│                                              ▼                               │
│  Response{status: 0|1|3|102|103, payload: Vec<JSON>, error_message, token}   │
└──────────────────────────────────────────────────────────────────────────────┘
                                       │
                                       ▼
┌─────────────────────────────── STORAGE LAYER ────────────────────────────────┐
│  Store: db name ─► table name ─► Table{options, BTreeMap<InternalKey, Object>}│
│  InternalKey: N<number> | S<string>                                          │
└──────────────────────────────────────────────────────────────────────────────┘
*/
