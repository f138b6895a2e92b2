//! Choosing and applying a configured setup, with the fallback output as the
//! last resort.

use log::{debug, error, info, warn};

use crate::config::{ConfigFile, SetupConfig};
use crate::predicate::Predicate;
use crate::registry::MonitorRegistry;
use crate::types::Position;

#[derive(Debug, Default)]
pub struct ApplyOptions<'a> {
    /// Setup to apply instead of the first connected one.
    pub setup: Option<&'a str>,
    pub no_fallback: bool,
}

/// Applies the requested setup, or the first connected one in file order.
///
/// The fallback monitor is enabled at the origin when no setup is connected
/// or when laying out the chosen setup fails; in the latter case the layout
/// error is still returned. A missing background is reported before any
/// command is sent and never triggers the fallback.
pub fn apply(
    registry: &MonitorRegistry,
    config: &ConfigFile,
    opt: &ApplyOptions<'_>,
) -> anyhow::Result<()> {
    let setup = match opt.setup {
        Some(name) => Some(
            config
                .setup(name)
                .ok_or_else(|| anyhow::anyhow!("No setup named {name} in the configuration"))?,
        ),
        None => first_connected_setup(registry, config),
    };
    let fallback = if opt.no_fallback {
        None
    } else {
        config.fallback.as_ref()
    };

    match (setup, fallback) {
        (Some(setup), fallback) => {
            info!("Applying setup {}", setup.name);
            let background = setup
                .background
                .as_ref()
                .map(|background| background.resolve())
                .transpose()?;

            if let Err(err) = registry.enable_setup(&setup.monitors, setup.direction, setup.align)
            {
                if let Some(fallback) = fallback {
                    error!("{}", err);
                    enable_fallback(registry, fallback)?;
                }
                return Err(err.into());
            }

            if let Some(background) = background {
                for monitor in registry.find_monitors(&setup.monitors)? {
                    monitor.background(&background.path, background.sizing)?;
                }
            }
        }
        (None, Some(fallback)) => {
            info!("No configured setup is connected");
            enable_fallback(registry, fallback)?;
        }
        (None, None) => {
            return Err(anyhow::anyhow!(
                "No configured setup is connected and no fallback is configured"
            ));
        }
    }

    Ok(())
}

/// A setup whose check fails (e.g. an ambiguous predicate) is skipped like
/// one that is not connected.
fn first_connected_setup<'a>(
    registry: &MonitorRegistry,
    config: &'a ConfigFile,
) -> Option<&'a SetupConfig> {
    for setup in config.setups.iter() {
        match registry.check_setup(&setup.monitors) {
            Ok(true) => return Some(setup),
            Ok(false) => debug!("Setup {} is not connected", setup.name),
            Err(err) => warn!("Skipping setup {}: {}", setup.name, err),
        }
    }
    None
}

fn enable_fallback(registry: &MonitorRegistry, fallback: &Predicate) -> crate::Result<()> {
    let monitor = registry.find_monitor(fallback)?;
    info!("Enabling fallback monitor {}", monitor.name());
    monitor.enable(Some(Position::new(0, 0)), None, None)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::error::Error;
    use crate::testing::FakeConnection;
    use crate::types::{Background, BackgroundSizing};

    fn config(toml: &str) -> ConfigFile {
        toml::from_str(toml).unwrap()
    }

    fn setup(connection: FakeConnection) -> (Rc<FakeConnection>, MonitorRegistry) {
        let connection = Rc::new(connection);
        let registry = MonitorRegistry::new(connection.clone()).unwrap();
        (connection, registry)
    }

    const HOME: &str = r#"
fallback = { name = "HDMI-A-1" }

[[setup]]
name = "home"
monitors = [{ model = "DELL U2414H" }, { serial = "HFDVR4Z0NIRM" }]
"#;

    #[test]
    fn applies_first_connected_setup() {
        let (connection, registry) = setup(FakeConnection::new());
        apply(&registry, &config(HOME), &ApplyOptions::default()).unwrap();
        assert_eq!(
            connection.commands(),
            vec![
                "output DP-3 position 0 0 resolution 1920x1080",
                "output DP-4 position 1920 0 resolution 2560x1080",
            ]
        );
    }

    #[test]
    fn ambiguous_setup_is_skipped() {
        let toml = format!(
            "{HOME}\n[[setup]]\nname = \"any dell\"\nmonitors = [{{ make = \"Dell Inc.\" }}]\n"
        );
        let mut config = config(&toml);
        config.setups.reverse();

        let (connection, registry) = setup(FakeConnection::new());
        apply(&registry, &config, &ApplyOptions::default()).unwrap();
        assert_eq!(connection.commands().len(), 2);
    }

    #[test]
    fn fallback_when_only_ambiguous_setups() {
        let toml = r#"
fallback = { name = "HDMI-A-1" }

[[setup]]
name = "any dell"
monitors = [{ make = "Dell Inc." }]
"#;
        let (connection, registry) = setup(FakeConnection::new());
        apply(&registry, &config(toml), &ApplyOptions::default()).unwrap();
        assert_eq!(
            connection.commands(),
            vec![
                "output HDMI-A-1 enable",
                "output HDMI-A-1 position 0 0 resolution 1920x1200",
            ]
        );
    }

    #[test]
    fn no_setup_and_no_fallback_is_an_error() {
        let toml = "[[setup]]\nname = \"work\"\nmonitors = [{ model = \"LG HDR 4K\" }]\n";
        let (connection, registry) = setup(FakeConnection::new());
        assert!(apply(&registry, &config(toml), &ApplyOptions::default()).is_err());

        let opt = ApplyOptions {
            setup: None,
            no_fallback: true,
        };
        assert!(apply(&registry, &config(HOME.replace("DELL U2414H", "LG").as_str()), &opt).is_err());
        assert!(connection.commands().is_empty());
    }

    #[test]
    fn failed_layout_enables_fallback_and_reports() {
        let (connection, registry) = setup(
            FakeConnection::new().failing_on("output DP-4 position 1920 0 resolution 2560x1080"),
        );
        let err = apply(&registry, &config(HOME), &ApplyOptions::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Command { .. })));
        assert_eq!(
            connection.commands(),
            vec![
                "output DP-3 position 0 0 resolution 1920x1080",
                "output DP-4 position 1920 0 resolution 2560x1080",
                "output HDMI-A-1 enable",
                "output HDMI-A-1 position 0 0 resolution 1920x1200",
            ]
        );
    }

    #[test]
    fn missing_background_stops_before_layout() {
        let mut config = config(HOME);
        config.setups[0].background = Some(Background::new(
            "NonExistingWallpaper.jpg",
            BackgroundSizing::Fill,
        ));

        let (connection, registry) = setup(FakeConnection::new());
        let err = apply(&registry, &config, &ApplyOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::BackgroundNotFound(_))
        ));
        assert!(connection.commands().is_empty());
    }

    #[test]
    fn failed_background_does_not_enable_fallback() {
        let wallpaper = tempfile::NamedTempFile::new().unwrap();
        let bg_dp3 = format!("output DP-3 bg {} center", wallpaper.path().display());
        let mut config = config(HOME);
        config.setups[0].background = Some(Background::new(
            wallpaper.path(),
            BackgroundSizing::Center,
        ));

        let (connection, registry) = setup(FakeConnection::new().failing_on(&bg_dp3));
        assert!(apply(&registry, &config, &ApplyOptions::default()).is_err());
        assert_eq!(
            connection.commands(),
            vec![
                "output DP-3 position 0 0 resolution 1920x1080".to_string(),
                "output DP-4 position 1920 0 resolution 2560x1080".to_string(),
                bg_dp3,
            ]
        );
    }

    #[test]
    fn background_applied_after_layout() {
        let wallpaper = tempfile::NamedTempFile::new().unwrap();
        let mut config = config(HOME);
        config.setups[0].background = Some(Background::new(
            wallpaper.path(),
            BackgroundSizing::Fill,
        ));

        let (connection, registry) = setup(FakeConnection::new());
        apply(&registry, &config, &ApplyOptions::default()).unwrap();
        let commands = connection.commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(
            commands[2],
            format!("output DP-3 bg {} fill", wallpaper.path().display())
        );
        assert_eq!(
            commands[3],
            format!("output DP-4 bg {} fill", wallpaper.path().display())
        );
    }

    #[test]
    fn named_setup_must_exist() {
        let (connection, registry) = setup(FakeConnection::new());
        let opt = ApplyOptions {
            setup: Some("office"),
            no_fallback: false,
        };
        assert!(apply(&registry, &config(HOME), &opt).is_err());
        assert!(connection.commands().is_empty());
    }
}
