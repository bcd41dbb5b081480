pub mod airequest;

pub use airequest::*;
