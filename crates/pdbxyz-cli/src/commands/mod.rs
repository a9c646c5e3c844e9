pub mod convert;
pub mod merge;
