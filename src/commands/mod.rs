pub mod suites;
pub mod transform;
