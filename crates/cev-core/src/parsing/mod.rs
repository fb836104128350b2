pub mod grade;
pub mod normalize;
pub mod values;

pub use normalize::{normalize, normalize_with};
