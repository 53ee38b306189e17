mod checks;
mod commands;
mod config_cmd;
mod inspect;
mod run;
mod utils;

pub use checks::run_checks;
pub use commands::{Cli, Commands, ConfigAction};
pub use config_cmd::handle_config;
pub use inspect::inspect_transaction;
pub use run::{run_enroll, run_sync};
pub use utils::{init_logging, show_version};
