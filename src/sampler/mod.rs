pub mod lowdiscrepancy;

pub use self::lowdiscrepancy::{halton_2d, radical_inverse};
