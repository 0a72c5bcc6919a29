pub mod errors;
pub mod intent;
pub mod schema;
pub mod transform;
