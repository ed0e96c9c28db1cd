use anyhow::Result;

use crate::{
    config::{Config, ConfigSource},
    workbook::init::create_workbook,
};

/// Command to process `init`. Builds a new workbook from the loaded settings.
pub fn process_init_command(source: &impl ConfigSource, force: bool) -> Result<()> {
    let config = Config::load(source)?;
    create_workbook(&config, force)?;
    println!("Created workbook: {}", config.output_path.display());
    Ok(())
}
