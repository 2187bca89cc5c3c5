pub mod command_line;
pub mod process;

pub use command_line::{build_command_line, quote_arg, split_command_line};
pub use process::{launch, LaunchMode, LaunchRequest, ProcessStarter, SystemStarter};
