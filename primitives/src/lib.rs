pub mod interpolator;
pub mod prng;
pub mod value;

#[cfg(test)]
mod value_tests;

pub use interpolator::{easing, Easing, Interpolator};
pub use prng::Prng;
pub use value::Value;
