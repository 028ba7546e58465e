pub mod card;
pub mod query;
pub mod result;

pub use card::*;
pub use query::*;
pub use result::*;
