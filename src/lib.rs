pub mod captions;
pub mod config;
pub mod convert;
pub mod output;
pub mod srt;
pub mod walk;
