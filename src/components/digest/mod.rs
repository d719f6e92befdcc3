pub mod formatter;
pub mod runner;

pub use formatter::format_digest;
pub use runner::run_once;
