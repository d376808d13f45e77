mod schema;
mod validate;

pub use schema::run_schema;
pub use validate::run_validate;
