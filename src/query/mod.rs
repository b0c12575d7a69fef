pub mod ast;
pub mod evaluator;
pub mod builtins;
pub mod table_ref;
pub mod executor;
pub mod response;
pub mod validator;
