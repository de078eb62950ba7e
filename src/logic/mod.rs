pub mod assortment_graph;
pub mod engine;
pub mod locks;
pub mod ordering;
pub mod paths;
pub mod variant_matrix;
pub mod vector;

pub use assortment_graph::*;
pub use engine::*;
pub use locks::*;
pub use ordering::*;
pub use paths::*;
pub use variant_matrix::*;
pub use vector::*;
