// Copyright The Grid Scaffold Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fs::File;
use std::io::Read;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::SizeSet;

pub fn config_path_default() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".grid-scaffold.toml"))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub grid: GridSettings,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GridSettings {
    /// Widths a column may take, largest first.
    pub valid_sizes: SizeSet,
    /// Width of the root column; must be one of `valid_sizes`.
    pub width: u32,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
#[serde(default)]
struct ConfigPartial {
    grid: GridSettingsPartial,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
#[serde(default)]
struct GridSettingsPartial {
    valid_sizes: Option<SizeSet>,
    width: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
#[error("Missing fields {fields:?} at path {path}")]
struct ValidationError {
    fields: Vec<&'static str>,
    path: &'static str,
}

impl ConfigPartial {
    fn default() -> Self {
        toml::from_str(include_str!("../grid.default.toml")).unwrap()
    }

    fn merge(low: Self, high: Self) -> Self {
        Self {
            grid: GridSettingsPartial {
                valid_sizes: high.grid.valid_sizes.or(low.grid.valid_sizes),
                width: high.grid.width.or(low.grid.width),
            },
        }
    }

    fn validate(self) -> Result<Config, SpannedError> {
        let (valid_sizes, width) = match (self.grid.valid_sizes, self.grid.width) {
            (Some(valid_sizes), Some(width)) => (valid_sizes, width),
            (valid_sizes, width) => {
                let mut fields = vec![];
                if valid_sizes.is_none() {
                    fields.push("valid_sizes");
                }
                if width.is_none() {
                    fields.push("width");
                }
                return Err(ValidationError { fields, path: "grid" }.into());
            }
        };
        if !valid_sizes.is_valid(width) {
            return Err(SpannedError {
                message: format!("grid width {width} is not one of the valid sizes"),
                span: None,
            });
        }
        Ok(Config {
            grid: GridSettings { valid_sizes, width },
        })
    }
}

impl Config {
    pub fn load(custom_path: Option<&Path>) -> anyhow::Result<Config> {
        let mut buf = String::new();
        let default = config_path_default();
        let (mut file, path) = match (custom_path, default.as_deref()) {
            (Some(path), _) => (File::open(path)?, path),
            (None, None) => return Ok(Config::default()),
            (None, Some(default)) => match File::open(default) {
                Ok(file) => (file, default),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
                Err(e) => return Err(e.into()),
            },
        };
        file.read_to_string(&mut buf)?;
        Self::parse(&buf).map_err(|e| anyhow::anyhow!("{}", format_toml_error(e, &buf, path)))
    }

    pub fn default() -> Config {
        ConfigPartial::default().validate().unwrap()
    }

    pub fn size_set(&self) -> SizeSet {
        self.grid.valid_sizes.clone()
    }

    fn parse(buf: &str) -> Result<Self, SpannedError> {
        let c: ConfigPartial = toml::from_str(buf)?;
        let defaults = ConfigPartial::default();
        ConfigPartial::merge(defaults, c).validate()
    }
}

fn format_toml_error(error: SpannedError, input: &str, path: &Path) -> String {
    use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

    let message = error.message;
    let Some(span) = error.span else {
        return format!("could not parse config: {}", message);
    };

    let snippet = Snippet::source(input)
        .path(path.to_string_lossy())
        .annotation(AnnotationKind::Primary.span(span.start..span.end).label(message));

    let report = Level::ERROR.primary_title("could not parse config").element(snippet);

    let renderer = Renderer::styled();
    format!("{}", renderer.render(&[report]))
}

#[derive(Debug)]
struct SpannedError {
    message: String,
    span: Option<Range<usize>>,
}

impl From<toml::de::Error> for SpannedError {
    fn from(e: toml::de::Error) -> Self {
        Self {
            message: e.message().to_owned(),
            span: e.span(),
        }
    }
}

impl From<ValidationError> for SpannedError {
    fn from(e: ValidationError) -> Self {
        Self {
            message: format!("{e}"),
            span: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::LayoutRegistry;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.grid.valid_sizes, SizeSet::standard());
        assert_eq!(config.grid.width, 12);
    }

    #[test]
    fn default_settings_match_unspecified_setting_values() {
        assert_eq!(Config::default(), Config::parse("").unwrap());
    }

    #[test]
    fn user_values_override_defaults() {
        let config = Config::parse("[grid]\nwidth = 8\n").unwrap();
        assert_eq!(config.grid.width, 8);
        assert_eq!(config.grid.valid_sizes, SizeSet::standard());

        let config = Config::parse("[grid]\nvalid_sizes = [10, 5]\nwidth = 10\n").unwrap();
        assert_eq!(config.grid.valid_sizes.sizes(), &[10, 5]);
    }

    #[test]
    fn malformed_size_sets_are_rejected() {
        let err = Config::parse("[grid]\nvalid_sizes = [4, 8]\n").unwrap_err();
        assert!(err.message.contains("strictly descending"), "{}", err.message);

        let err = Config::parse("[grid]\nvalid_sizes = []\n").unwrap_err();
        assert!(err.message.contains("at least one width"), "{}", err.message);
    }

    #[test]
    fn validation_names_every_missing_field() {
        let partial = ConfigPartial {
            grid: GridSettingsPartial { valid_sizes: None, width: None },
        };
        let err = partial.validate().unwrap_err();
        assert_eq!(err.message, r#"Missing fields ["valid_sizes", "width"] at path grid"#);

        let partial = ConfigPartial {
            grid: GridSettingsPartial {
                valid_sizes: Some(SizeSet::standard()),
                width: None,
            },
        };
        let err = partial.validate().unwrap_err();
        assert_eq!(err.message, r#"Missing fields ["width"] at path grid"#);
    }

    #[test]
    fn width_must_be_a_valid_size() {
        let err = Config::parse("[grid]\nwidth = 10\n").unwrap_err();
        assert!(err.message.contains("not one of the valid sizes"), "{}", err.message);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Config::parse("[grid]\ncolumns = 3\n").is_err());
        assert!(Config::parse("[layout]\n").is_err());
    }

    #[test]
    fn it_loads_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[grid]\nwidth = 8").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.grid.width, 8);

        let reg = LayoutRegistry::<String>::from_config(&config).unwrap();
        assert_eq!(reg.column(reg.root()).unwrap().width(), 8);
    }

    #[test]
    fn load_errors_mention_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[grid]\nwidth = \"wide\"").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err().to_string();
        assert!(err.contains("could not parse config"), "{err}");
    }
}
