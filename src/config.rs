use std::{env, path::PathBuf, time::Duration};

use color_eyre::Result;
use directories::{BaseDirs, ProjectDirs};
use lazy_static::lazy_static;
use reqwest::Url;
use serde::Deserialize;

use crate::matrix::{DotSize, MatrixSettings, PlotContext, PlotMethod, Rotation};

const CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, Deserialize)]
pub struct MatrixConfig {
    pub plot_method: PlotMethod,
    pub rotation: Rotation,
    pub dot_size: DotSize,
    pub max_matrix_px: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub server: String,
    #[serde(default)]
    pub project: Option<String>,
    /// Browsing engine state as a JSON string.
    pub engine: String,
    pub batch_size: usize,
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
    pub output_dir: PathBuf,
    pub matrix: MatrixConfig,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Embedded defaults only.
    pub fn defaults() -> Result<Self> {
        Ok(json5::from_str(CONFIG)?)
    }

    /// Layer the embedded defaults, the user config file and `SCATTERGRID_*`
    /// environment variables, in that order.
    ///
    /// An explicit `config_path` must exist; the default location is optional.
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self, config::ConfigError> {
        let (user_path, required) = match config_path {
            Some(p) => (expand_tilde(p), true),
            None => (get_config_dir().join("config.json5"), false),
        };

        let builder = config::Config::builder()
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5))
            .add_source(
                config::File::from(user_path)
                    .format(config::FileFormat::Json5)
                    .required(required),
            )
            .add_source(
                config::Environment::with_prefix(&PROJECT_NAME)
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    pub fn matrix_settings(&self) -> MatrixSettings {
        MatrixSettings {
            plot_method: self.matrix.plot_method,
            rotation: self.matrix.rotation,
            dot_size: self.matrix.dot_size,
            plot_size: None,
            max_matrix_px: self.matrix.max_matrix_px,
        }
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }

    pub fn plot_context(&self, project: &str) -> Result<PlotContext> {
        Ok(PlotContext {
            server: Url::parse(&self.server)?,
            project: project.to_string(),
            engine: serde_json::from_str(&self.engine)?,
        })
    }
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Some(s) = path.to_str() {
        if s.starts_with('~') {
            if let Some(base) = BaseDirs::new() {
                return PathBuf::from(s.replacen('~', base.home_dir().to_str().unwrap_or(""), 1));
            }
        }
    }
    path.clone()
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(dirs) = ProjectDirs::from("", "", env!("CARGO_PKG_NAME")) {
        dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}
