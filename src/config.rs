use std::{env, path::PathBuf};

use color_eyre::{Result, eyre::Context};
use directories::ProjectDirs;
use lazy_static::lazy_static;
use serde::Deserialize;

use crate::component::select::{SelectOption, styles::ClassStyles};

/// Config file names looked up in the config directory, in this order.
const CONFIG_FILES: [(&str, config::FileFormat); 4] = [
    ("config.json5", config::FileFormat::Json5),
    ("config.json", config::FileFormat::Json),
    ("config.yaml", config::FileFormat::Yaml),
    ("config.toml", config::FileFormat::Toml),
];

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

/// One select input on the form page.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct FieldConfig {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub options: Vec<SelectOption<String>>,
    /// Initially selected value
    #[serde(default)]
    pub value: Option<String>,
    /// Submitting the form without a value shows an error under the field
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_width")]
    pub width: String,
    /// Name of an entry in `classes`
    #[serde(default)]
    pub class: String,
    /// Text shown while nothing is selected; the dropdown's own when absent
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Whether backspace/delete may clear the selection
    #[serde(default = "default_clearable")]
    pub clearable: bool,
}

fn default_width() -> String {
    "200".into()
}

fn default_clearable() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default = "default_fields")]
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub classes: ClassStyles,
}

fn default_fields() -> Vec<FieldConfig> {
    let options = |pairs: &[(&str, &str)]| {
        pairs
            .iter()
            .map(|(label, value)| SelectOption::new(*label, value.to_string()))
            .collect::<Vec<_>>()
    };
    vec![
        FieldConfig {
            label: "Fruit".into(),
            options: options(&[("Apple", "apple"), ("Banana", "banana"), ("Cherry", "cherry")]),
            value: None,
            required: true,
            width: "40".into(),
            class: String::new(),
            placeholder: Some("Pick a fruit".into()),
            clearable: true,
        },
        FieldConfig {
            label: "Size".into(),
            options: options(&[("Small", "s"), ("Medium", "m"), ("Large", "l")]),
            value: Some("m".into()),
            required: false,
            width: "40".into(),
            class: String::new(),
            placeholder: None,
            clearable: false,
        },
        FieldConfig {
            label: "Delivery".into(),
            options: options(&[("Pick up", "pickup"), ("Courier", "courier")]),
            value: None,
            required: true,
            width: "50%".into(),
            class: String::new(),
            placeholder: None,
            clearable: true,
        },
    ]
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
}

impl Config {
    pub fn new(cli_source: Option<crate::cli::ClapSource>) -> Result<Self> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?;

        let explicit_file = cli_source.as_ref().and_then(|c| c.config_file.clone());
        match explicit_file {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                for (file, format) in CONFIG_FILES.iter() {
                    builder = builder.add_source(
                        config::File::from(config_dir.join(file))
                            .format(*format)
                            .required(false),
                    );
                }
            }
        }

        // Add CLI source last (highest priority)
        if let Some(cli_source) = cli_source {
            builder = builder.add_source(cli_source);
        }

        let cfg: Self = builder
            .build()
            .context("Error building config")?
            .try_deserialize()
            .context("Error deserialize config")?;

        Ok(cfg)
    }
}

pub fn get_data_dir() -> PathBuf {
    if let Ok(s) = env::var(format!("{}_DATA", PROJECT_NAME.clone())) {
        PathBuf::from(s)
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Ok(s) = env::var(format!("{}_CONFIG", PROJECT_NAME.clone())) {
        PathBuf::from(s)
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "yyang", env!("CARGO_PKG_NAME"))
}
