pub mod store;
pub mod test_case;

pub use store::*;
pub use test_case::*;
