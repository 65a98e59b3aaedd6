pub mod hit_testing;

pub use hit_testing::{hit_test, HIT_TOLERANCE};
