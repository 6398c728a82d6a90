//! Logger setup for the `dx` binary.

use std::io::Write;

use log::LevelFilter;

/// Level applied to dexa's own modules.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initializes the global logger.
///
/// Dependencies only report warnings; `RUST_LOG` is applied last and can
/// override both.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("dexa", level_for(verbose))
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}
