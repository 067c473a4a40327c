pub mod baseline;
pub mod geometry;
pub mod ids;
pub mod model;
pub mod sanitize;
pub mod segment;
pub mod title;
pub mod warn;
