use std::path::Path;

use serde::Deserialize;

use crate::predicate::Predicate;
use crate::types::{Alignment, Background, Direction};

#[derive(Deserialize, Debug, Default)]
pub struct ConfigFile {
    /// Monitor to fall back to when no setup applies or a layout fails.
    #[serde(default)]
    pub fallback: Option<Predicate>,
    #[serde(default, rename = "setup")]
    pub setups: Vec<SetupConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SetupConfig {
    pub name: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub align: Alignment,
    #[serde(default)]
    pub background: Option<Background>,
    pub monitors: Vec<Predicate>,
}

impl ConfigFile {
    pub fn setup(&self, name: &str) -> Option<&SetupConfig> {
        self.setups.iter().find(|setup| setup.name == name)
    }
}

/// Reads `path`, or `$XDG_CONFIG_HOME/swaymon.toml` if none is given. Only a
/// missing default file is treated as an empty configuration.
pub fn read_config_file(path: Option<&Path>) -> anyhow::Result<ConfigFile> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let base_directories = xdg::BaseDirectories::new()?;
            let path = base_directories.get_config_file("swaymon.toml");
            if !path.exists() {
                return Ok(Default::default());
            }
            path
        }
    };

    let contents = std::fs::read(&path)?;
    parse_config(&path, std::str::from_utf8(&contents)?)
}

fn parse_config(path: &Path, contents: &str) -> anyhow::Result<ConfigFile> {
    if path.extension().is_some_and(|ext| ext == "json") {
        Ok(serde_json::from_str(contents)?)
    } else {
        Ok(toml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::types::BackgroundSizing;

    const TOML: &str = r#"
fallback = { name = "eDP-1" }

[[setup]]
name = "home"
monitors = [
    { model = "DELL U2414H" },
    { model = "DELL U2913WM", serial = "HFDVR4Z0NIRM" },
]

[[setup]]
name = "work"
direction = "up"
align = "end"
background = { path = "/usr/share/backgrounds/default.png", sizing = "center" }
monitors = [{ name = "eDP-1" }, { make = "Goldstar Company Ltd", model = "LG HDR 4K" }]
"#;

    #[test]
    fn parses_toml() {
        let config = parse_config(Path::new("swaymon.toml"), TOML).unwrap();
        assert_eq!(config.fallback, Some(Predicate::new().with("name", "eDP-1")));
        assert_eq!(config.setups.len(), 2);

        let home = config.setup("home").unwrap();
        assert_eq!(home.direction, Direction::Right);
        assert_eq!(home.align, Alignment::Start);
        assert_eq!(home.background, None);
        assert_eq!(
            home.monitors[1],
            Predicate::new()
                .with("model", "DELL U2913WM")
                .with("serial", "HFDVR4Z0NIRM")
        );

        let work = config.setup("work").unwrap();
        assert_eq!(work.direction, Direction::Up);
        assert_eq!(work.align, Alignment::End);
        assert_eq!(
            work.background,
            Some(Background::new(
                "/usr/share/backgrounds/default.png",
                BackgroundSizing::Center
            ))
        );
        assert!(config.setup("office").is_none());
    }

    #[test]
    fn parses_json_by_extension() {
        let json = r#"{
            "setup": [
                {"name": "home", "direction": "left", "monitors": [{"model": "DELL U2414H"}]}
            ]
        }"#;
        let config = parse_config(Path::new("setups.json"), json).unwrap();
        assert_eq!(config.fallback, None);
        assert_eq!(config.setups[0].direction, Direction::Left);
    }

    #[test]
    fn rejects_unknown_direction() {
        let toml = "[[setup]]\nname = \"x\"\ndirection = \"diagonal\"\nmonitors = []\n";
        assert!(parse_config(Path::new("swaymon.toml"), toml).is_err());
    }

    #[test]
    fn reads_explicit_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(TOML.as_bytes()).unwrap();
        let config = read_config_file(Some(file.path())).unwrap();
        assert_eq!(config.setups.len(), 2);

        assert!(read_config_file(Some(Path::new("/nonexistent/swaymon.toml"))).is_err());
    }
}
