pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
mod cli_args;

#[cfg(feature = "cli")]
pub use cli_args::CliConfig;
