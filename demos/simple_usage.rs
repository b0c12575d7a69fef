/// memdoc API Demo
///
/// Walks through the query surface end to end:
/// - Databases and tables
/// - Inserts with explicit and generated keys
/// - Point reads, updates and deletes
/// - Expressions and error responses
/// - Statistics

use memdoc::core::database::Database;
use memdoc::core::types::Value;
use memdoc::query::ast::{
    Builtin, CreateTable, Insert, MetaQuery, PointDelete, PointUpdate, Query, TableRef, Term,
    WriteQuery,
};
use memdoc::query::response::Response;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n╔═══════════════════════════════════════════════╗");
    println!("║        memdoc - Query API Demo               ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    let db = Database::new();
    let books = TableRef::new("library", "books");

    // Step 1: DDL
    println!("Step 1: Creating database and table...");
    db.execute(&Query::meta(1, MetaQuery::CreateDb("library".into())));
    let create = CreateTable::new(books.clone()).with_primary_key("isbn");
    show("create table", &db.execute(&Query::meta(2, MetaQuery::CreateTable(create))));
    show("list dbs", &db.execute(&Query::meta(3, MetaQuery::ListDbs)));
    println!();

    // Step 2: INSERT
    println!("Step 2: INSERT - Adding documents...");
    let docs = vec![
        book(Some("978-1"), "Rust Programming", 2018.0),
        book(Some("978-2"), "Database Systems", 2011.0),
        book(None, "Web Development", 2020.0),
        book(Some("978-1"), "Duplicate Rust Programming", 2019.0),
    ];
    show(
        "insert",
        &db.execute(&Query::write(
            4,
            WriteQuery::Insert(Insert {
                table_ref: books.clone(),
                terms: docs,
            }),
        )),
    );
    println!();

    // Step 3: READ
    println!("Step 3: READ - Point lookup and scan...");
    show(
        "get 978-1",
        &db.execute(&Query::read(5, Term::get_by_key(books.clone(), Term::string("978-1")))),
    );
    let scan = db.execute(&Query::read(6, Term::Table(books.clone())));
    println!("  scan: {} rows", scan.payload.len());
    println!();

    // Step 4: UPDATE and DELETE
    println!("Step 4: UPDATE / DELETE...");
    let update = PointUpdate {
        table_ref: books.clone(),
        key: Term::string("978-2"),
        patch: Term::object([("year", Term::Number(2012.0))]),
    };
    show("update 978-2", &db.execute(&Query::write(7, WriteQuery::PointUpdate(update))));
    let delete = PointDelete {
        table_ref: books.clone(),
        key: Term::string("978-1"),
    };
    show("delete 978-1", &db.execute(&Query::write(8, WriteQuery::PointDelete(delete))));
    println!();

    // Step 5: Expressions
    println!("Step 5: Expressions...");
    let div = Term::call(Builtin::Div, vec![Term::Number(1.0), Term::Number(3.0)]);
    show("1 / 3", &db.execute(&Query::read(9, div)));
    let bad = Term::call(Builtin::Add, vec![Term::Number(1.0), Term::string("a")]);
    show("1 + \"a\"", &db.execute(&Query::read(10, bad)));
    let bad_name = CreateTable::new(TableRef::new("library", "bad-name!"));
    show("bad table name", &db.execute(&Query::meta(11, MetaQuery::CreateTable(bad_name))));
    println!();

    // Step 6: Statistics
    println!("Step 6: Statistics...");
    let stats = db.stats();
    println!("  Databases: {}", stats.database_count);
    println!("  Tables: {}", stats.table_count);
    println!("  Documents: {}", stats.document_count);
    println!("  Queries: {} ({} failed)", stats.queries_executed, stats.queries_failed);
    println!("  Error rate: {:.1}%", stats.error_rate() * 100.0);

    println!("\nDemo complete!");
    Ok(())
}

fn book(isbn: Option<&str>, title: &str, year: f64) -> Term {
    let mut fields = vec![
        ("title".to_string(), Term::string(title)),
        ("year".to_string(), Term::Number(year)),
    ];
    if let Some(isbn) = isbn {
        fields.push(("isbn".to_string(), Term::string(isbn)));
    }
    Term::Object(fields)
}

fn show(label: &str, response: &Response) {
    match &response.error_message {
        Some(message) => println!("  {}: error {} - {}", label, response.status_code(), message),
        None => {
            let values: Vec<String> = response
                .values()
                .unwrap_or_default()
                .iter()
                .map(Value::to_json_string)
                .collect();
            println!("  {}: status {} {}", label, response.status_code(), values.join(", "));
        }
    }
}
