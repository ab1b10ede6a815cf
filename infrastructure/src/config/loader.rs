//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["reasoning.toml", ".reasoning.toml"];
const ENV_PREFIX: &str = "TUTOR_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `TUTOR_*` environment variables (`TUTOR_ORCHESTRATION__MAX_TURNS=5`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./reasoning.toml` or `./.reasoning.toml`
    /// 4. Global: `~/.config/tutor-reasoning/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path.map(|p| p.as_path()),
        )
        .extract()
        .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(path) = global.filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = project {
            figment = figment.merge(Toml::file(path));
        }
        // An explicit path that does not exist is an error, not a silent skip
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file_exact(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tutor-reasoning").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(explicit: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");

        println!("  [ENV  ] Environment: {}* (use __ for nesting)", ENV_PREFIX);

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            println!("  [{}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./reasoning.toml or ./.reasoning.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // figment::Jail serializes tests that touch env vars and the cwd

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.orchestration.max_turns, 3);
        assert_eq!(config.providers.baseline, "gemini/gemini-2.5-flash");
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("tutor-reasoning"));
    }

    #[test]
    fn test_later_sources_override_earlier() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "global.toml",
                "[orchestration]\nmax_turns = 4\nreflection_threshold = 0.6\n",
            )?;
            jail.create_file("reasoning.toml", "[orchestration]\nmax_turns = 5\n")?;
            jail.create_file("explicit.toml", "[orchestration]\nmax_turns = 6\n")?;

            let config: FileConfig = ConfigLoader::figment(
                Some(Path::new("global.toml")),
                Some(Path::new("reasoning.toml")),
                Some(Path::new("explicit.toml")),
            )
            .extract()?;

            assert_eq!(config.orchestration.max_turns, 6);
            assert_eq!(config.orchestration.reflection_threshold, 0.6);
            // untouched sections keep their defaults
            assert_eq!(config.orchestration.complexity_threshold, 40);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        figment::Jail::expect_with(|_jail| {
            let result: Result<FileConfig, _> =
                ConfigLoader::figment(None, None, Some(Path::new("nope.toml"))).extract();
            assert!(result.is_err());
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_files() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TUTOR_ORCHESTRATION__MAX_TURNS", "7");
            jail.create_file("explicit.toml", "[orchestration]\nmax_turns = 2\n")?;

            let config: FileConfig =
                ConfigLoader::figment(None, None, Some(Path::new("explicit.toml"))).extract()?;

            assert_eq!(config.orchestration.max_turns, 7);
            Ok(())
        });
    }
}
