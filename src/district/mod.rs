mod reference;
mod shape;

pub use reference::{Feature, ReferenceDistrict, ReferenceOrigin, FALLBACK_HALF_SPAN};
pub use shape::{ShapeId, UserShape};
