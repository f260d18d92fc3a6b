use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::config::ProjectConfig;
use crate::error::{Result, SwError};
use crate::matrix::{self, LoadWarning, Matrix, MatrixLayers};

/// Shared state for one CLI invocation: the project location, its config,
/// and the resolved source root. The matrix itself is loaded on demand so
/// commands that never touch skills stay cheap.
pub struct AppContext {
    /// Directory containing `.sw`.
    pub project_root: PathBuf,
    /// The `.sw` directory itself.
    pub sw_dir: PathBuf,
    pub config_path: PathBuf,
    pub config: ProjectConfig,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let sw_dir = Self::find_sw_dir()?;
        let project_root = sw_dir
            .parent()
            .map_or_else(|| sw_dir.clone(), Path::to_path_buf);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| sw_dir.join("project.toml"));
        let config = if config_path.exists() {
            ProjectConfig::load(&config_path)?
        } else {
            ProjectConfig::default()
        };

        Ok(Self {
            project_root,
            sw_dir,
            config_path,
            config,
            output_format: cli.output_format(),
            verbosity: cli.verbose,
        })
    }

    fn find_sw_dir() -> Result<PathBuf> {
        if let Ok(root) = std::env::var("SW_PROJECT") {
            let dir = PathBuf::from(root).join(".sw");
            if dir.is_dir() {
                return Ok(dir);
            }
            return Err(SwError::MissingConfig(format!(
                "SW_PROJECT set but {} does not exist",
                dir.display()
            )));
        }
        let cwd = std::env::current_dir()?;
        crate::utils::fs::find_upwards(&cwd, ".sw").ok_or_else(|| {
            SwError::MissingConfig(
                "no .sw directory found here or above; run `sw init` first".to_string(),
            )
        })
    }

    /// Resolve the shared source root for this project.
    pub fn source_root(&self) -> Result<PathBuf> {
        matrix::resolve_source_root(self.config.source.as_deref())
    }

    /// Load both matrix layers: shared source plus this project's `.sw`
    /// overrides.
    pub fn load_layers(&self) -> Result<MatrixLayers> {
        let source_root = self.source_root()?;
        matrix::load_layers(&source_root, Some(&self.sw_dir))
    }

    /// Load and merge the full matrix for one resolution pass.
    pub fn load_matrix(&self) -> Result<(Matrix, Vec<LoadWarning>)> {
        Ok(self.load_layers()?.merge())
    }
}
