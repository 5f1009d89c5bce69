/// Application name, used for environment variable prefixes and CLI output.
pub const APP_NAME: &str = "bootreg";

/// Environment variable selecting what shutdown does with teardown failures.
pub const TEARDOWN_ENV: &str = "BOOTREG_TEARDOWN";

/// Environment variable selecting how a second `boot()` is handled.
pub const REBOOT_ENV: &str = "BOOTREG_REBOOT";

/// Environment variable holding the log filter (falls back to `RUST_LOG`).
pub const LOG_ENV: &str = "BOOTREG_LOG";
