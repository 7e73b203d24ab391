//! Console logging setup.
//!
//! The numerical loops report through the `log` facade (`debug!` for
//! per-evaluation traces, `warn!` for recoverable solver trouble); this
//! module wires the facade to a simplelog terminal backend. Initialization
//! is idempotent so tests and examples can call it freely.

use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

/// Initializes a terminal logger at the given level. Repeated calls are
/// no-ops.
pub fn init_console_logger(level: LevelFilter) {
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
}
