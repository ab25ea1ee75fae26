pub mod fix;

pub use fix::FixArgs;
