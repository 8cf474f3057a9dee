use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use config::Source;

use crate::config::{get_config_dir, get_data_dir};

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Tick rate, i.e. number of ticks per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 4.0)]
    pub tick_rate: f64,

    /// Frame rate, i.e. number of frames per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 60.0)]
    pub frame_rate: f64,

    /// Path to the data directory (holds the log file)
    #[arg(short, long, value_name = "PATH")]
    pub data_dir: Option<String>,

    /// Config file to read instead of the one in the config directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

const VERSION_MESSAGE: &str = concat!(env!("CARGO_PKG_VERSION"));

pub fn version() -> String {
    let author = clap::crate_authors!();

    let data_dir_path = get_data_dir().display().to_string();
    let config_dir_path = get_config_dir().display().to_string();

    format!(
        "\
{VERSION_MESSAGE}

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}"
    )
}

#[derive(Debug)]
pub(crate) struct ClapSource {
    pub data_dir: Option<String>,
    /// Not a config value: picks the file source in [`crate::config::Config::new`]
    pub config_file: Option<PathBuf>,
}

impl ClapSource {
    pub fn new(cli: &Cli) -> Self {
        Self {
            data_dir: cli.data_dir.clone(),
            config_file: cli.config.clone(),
        }
    }
}

impl Source for ClapSource {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(Self {
            data_dir: self.data_dir.clone(),
            config_file: self.config_file.clone(),
        })
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut map = config::Map::new();
        if self.data_dir.is_some() {
            map.insert(
                "data_dir".to_string(),
                config::Value::new(None, self.data_dir.clone()),
            );
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["tui_select_input"]);
        assert_eq!(cli.tick_rate, 4.0);
        assert_eq!(cli.frame_rate, 60.0);
        assert!(cli.data_dir.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_clap_source_only_collects_given_values() {
        let cli = Cli::parse_from(["tui_select_input", "-c", "form.toml"]);
        let source = ClapSource::new(&cli);
        assert_eq!(source.config_file, Some(PathBuf::from("form.toml")));
        assert!(source.collect().unwrap().is_empty());

        let cli = Cli::parse_from(["tui_select_input", "-d", "/tmp/x"]);
        let map = ClapSource::new(&cli).collect().unwrap();
        assert_eq!(map["data_dir"].clone().into_string().unwrap(), "/tmp/x");
    }
}
