pub mod range;
pub mod years;

pub use range::YearRange;
pub use years::{filter_by_years, filter_indexed};
