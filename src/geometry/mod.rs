pub mod hit_testing;
pub mod transform;

pub use hit_testing::hit_test;
pub use transform::ObjectTransform;
