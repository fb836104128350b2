pub mod export;
pub mod extract;
pub mod schema;
pub mod validate;
