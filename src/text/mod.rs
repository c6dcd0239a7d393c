pub mod face;
pub mod fonts;
pub mod wrap;
