mod bbox;
mod geom;

pub use bbox::BoundingBox;
pub(crate) use bbox::IndexedBox;
pub(crate) use geom::FeatureIndex;
pub use geom::{centered_at, merge, square_around};
