use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory along with:
/// - an initial `config.json` file with default settings
/// - the SQLite database, with its schema and the shared default categories
///
/// # Arguments
/// - `finance_home` - The directory that will be the root of data directory, e.g. `$HOME/finance`
///
/// # Errors
/// - Returns an error if any file operations fail or if the directory was already initialized.
pub async fn init(finance_home: &Path) -> Result<Out<()>> {
    let config = Config::create(finance_home)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the finance directory at {}",
        config.root().display()
    )
    .into())
}
