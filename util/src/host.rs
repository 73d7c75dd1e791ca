//! Host platform (linux for example) utility functions

use std::path::PathBuf;

use uname;

/// Name of the environment variable pointing at the software root directory.
pub const SW_ROOT_ENV_VAR: &str = "ROV_TELEOP_SW_ROOT";

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the software root directory from the environment.
///
/// The root is the directory containing the `params` and `sessions`
/// directories, and is set by the `ROV_TELEOP_SW_ROOT` environment variable.
pub fn get_sw_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var(SW_ROOT_ENV_VAR)?))
}
