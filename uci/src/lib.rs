mod engine_process;
mod info_parser;
mod locate;
mod options;
mod oracle;

pub use engine_process::*;
pub use info_parser::*;
pub use locate::*;
pub use options::*;
pub use oracle::*;
