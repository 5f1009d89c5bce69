use anyhow::{Context, Result};

use bootreg_lib::RegistryConfig;
use bootreg_lib::consts::{APP_NAME, LOG_ENV, REBOOT_ENV, TEARDOWN_ENV};

use crate::output::print_stat;

pub fn cmd_info() -> Result<()> {
  let config = RegistryConfig::from_env().context("Invalid registry configuration")?;

  println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
  print_stat("teardown", &format!("{} ({})", config.teardown, TEARDOWN_ENV));
  print_stat("reboot", &format!("{} ({})", config.reboot, REBOOT_ENV));
  print_stat("log filter", LOG_ENV);
  Ok(())
}
