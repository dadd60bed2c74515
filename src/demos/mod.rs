//! Demo views: a numeric counter and a text-input greeter.

pub mod counter;
pub mod greeter;

pub use counter::Counter;
pub use greeter::Greeter;
