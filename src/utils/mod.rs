pub mod validation;

pub use validation::{parse_port, validate_count};
