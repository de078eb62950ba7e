pub mod assortment;
pub mod common;
pub mod error;
pub mod path;
pub mod product;
pub mod variation;

pub use assortment::*;
pub use common::*;
pub use error::*;
pub use path::*;
pub use product::*;
pub use variation::*;
