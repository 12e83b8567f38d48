//! One-time project setup: working directories and a config file with a
//! freshly generated API key.

use std::path::{Path, PathBuf};

use eyre::WrapErr;
use rand::Rng;
use tracing::{debug, info};

use crate::config::{
    DEFAULT_ENVIRONMENT, DEFAULT_HOST, DEFAULT_MAX_LENGTH, DEFAULT_MODEL, DEFAULT_PORT,
    DEFAULT_TIMEOUT_SECS,
};
use crate::redact;
use crate::Result;

pub const API_KEY_LEN: usize = 32;
const KEY_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";
const DIRECTORIES: &[&str] = &["model_cache", "logs"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    Created { key_preview: String },
    AlreadyExists,
}

/// Random key drawn from letters, digits and `!@#$%^&*`.
#[must_use]
pub fn generate_api_key(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(KEY_ALPHABET[rng.gen_range(0..KEY_ALPHABET.len())]))
        .collect()
}

fn render_config(api_key: &str) -> String {
    format!(
        "# API configuration\n\
         api_key = \"{api_key}\"\n\
         \n\
         # Backend settings\n\
         backend_host = \"{DEFAULT_HOST}\"\n\
         backend_port = {DEFAULT_PORT}\n\
         request_timeout_secs = {DEFAULT_TIMEOUT_SECS}\n\
         \n\
         # Model settings\n\
         model_name = \"{DEFAULT_MODEL}\"\n\
         max_length = {DEFAULT_MAX_LENGTH}\n\
         \n\
         # Environment (development/production)\n\
         environment = \"{DEFAULT_ENVIRONMENT}\"\n\
         debug = true\n"
    )
}

/// Write a config file with a new key. An existing file is left untouched.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_config_file(path: &Path) -> Result<SetupOutcome> {
    if path.exists() {
        debug!(path = %path.display(), "config file already exists");
        return Ok(SetupOutcome::AlreadyExists);
    }

    let api_key = generate_api_key(API_KEY_LEN);
    std::fs::write(path, render_config(&api_key))
        .wrap_err_with(|| format!("failed to write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .wrap_err("failed to restrict config file permissions")?;
    }

    info!(path = %path.display(), "config file created");
    Ok(SetupOutcome::Created {
        key_preview: redact::secret_preview(&api_key),
    })
}

/// Create the working directories under `root`. Existing ones are kept.
///
/// # Errors
///
/// Returns an error if a directory cannot be created.
pub fn create_directories(root: &Path) -> Result<Vec<PathBuf>> {
    DIRECTORIES
        .iter()
        .map(|name| {
            let dir = root.join(name);
            std::fs::create_dir_all(&dir)
                .wrap_err_with(|| format!("failed to create {}", dir.display()))?;
            Ok(dir)
        })
        .collect()
}
