use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One output as reported by the window manager's `get_outputs`.
///
/// Everything besides the fields the engine interprets is kept verbatim in
/// `meta` (make, model, serial, rect, scale, ...), which is what predicates
/// are matched against.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub name: String,
    pub active: bool,
    #[serde(default)]
    pub modes: Vec<ModeRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub current_mode: Option<ModeRecord>,
    #[serde(flatten)]
    pub meta: serde_json::Map<String, serde_json::Value>,
}

/// A raw mode entry. All fields are optional on the wire so that a missing
/// key surfaces as [`Error::InvalidMode`] rather than a parse failure.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ModeRecord {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub refresh: Option<i32>,
}

/// A supported resolution/refresh combination of an output. `refresh` is in
/// mHz, as sway reports it.
///
/// Modes are ordered by pixel count, then refresh rate. Width and height
/// break any remaining tie so that the order agrees with equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayMode {
    width: i32,
    height: i32,
    refresh: i32,
}

impl DisplayMode {
    pub fn new(width: i32, height: i32, refresh: i32) -> Result<Self> {
        for (key, value) in [("width", width), ("height", height), ("refresh", refresh)] {
            if value <= 0 {
                return Err(Error::InvalidMode(format!("{key} must be positive, got {value}")));
            }
        }
        Ok(Self {
            width,
            height,
            refresh,
        })
    }

    pub fn from_record(record: &ModeRecord) -> Result<Self> {
        let missing: Vec<&str> = [
            ("width", record.width),
            ("height", record.height),
            ("refresh", record.refresh),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.is_none().then_some(key))
        .collect();

        match (record.width, record.height, record.refresh) {
            (Some(width), Some(height), Some(refresh)) => Self::new(width, height, refresh),
            _ => Err(Error::InvalidMode(format!("missing {}", missing.join(", ")))),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn refresh(&self) -> i32 {
        self.refresh
    }

    pub fn dimensions(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Refresh rate is ignored.
    pub fn has_dimensions(&self, (width, height): (i32, i32)) -> bool {
        self.width == width && self.height == height
    }

    fn total_pixels(&self) -> i64 {
        i64::from(self.width) * i64::from(self.height)
    }
}

impl Ord for DisplayMode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_pixels()
            .cmp(&other.total_pixels())
            .then_with(|| self.refresh.cmp(&other.refresh))
            .then_with(|| self.width.cmp(&other.width))
            .then_with(|| self.height.cmp(&other.height))
    }
}

impl PartialOrd for DisplayMode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}@{}.{:03}Hz",
            self.width,
            self.height,
            self.refresh / 1000,
            self.refresh % 1000
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The way successive monitors of a setup are placed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Right,
    Left,
    Down,
    Up,
}

impl Direction {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Right | Direction::Left)
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Direction::Right | Direction::Down)
    }

    /// Size of `mode` along the placement axis.
    pub fn extent(self, mode: &DisplayMode) -> i32 {
        if self.is_horizontal() {
            mode.width()
        } else {
            mode.height()
        }
    }

    /// Size of `mode` across the placement axis.
    pub fn cross_extent(self, mode: &DisplayMode) -> i32 {
        if self.is_horizontal() {
            mode.height()
        } else {
            mode.width()
        }
    }

    pub fn position(self, along: i32, across: i32) -> Position {
        if self.is_horizontal() {
            Position::new(along, across)
        } else {
            Position::new(across, along)
        }
    }
}

/// Cross-axis alignment: `Start` lines up top (or left) edges, `End` lines
/// up bottom (or right) edges.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Start,
    End,
}

impl Alignment {
    pub fn offset(self, cross_extent: i32) -> i32 {
        match self {
            Alignment::Start => 0,
            Alignment::End => -cross_extent,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundSizing {
    Stretch,
    #[default]
    Fill,
    Fit,
    Center,
    Tile,
}

impl fmt::Display for BackgroundSizing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackgroundSizing::Stretch => "stretch",
            BackgroundSizing::Fill => "fill",
            BackgroundSizing::Fit => "fit",
            BackgroundSizing::Center => "center",
            BackgroundSizing::Tile => "tile",
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Background {
    pub path: PathBuf,
    #[serde(default)]
    pub sizing: BackgroundSizing,
}

impl Background {
    pub fn new(path: impl Into<PathBuf>, sizing: BackgroundSizing) -> Self {
        Self {
            path: path.into(),
            sizing,
        }
    }

    /// Makes the path absolute and checks that it exists.
    pub fn resolve(&self) -> Result<Self> {
        let path = std::path::absolute(&self.path)?;
        if !path.exists() {
            return Err(Error::BackgroundNotFound(path));
        }
        Ok(Self {
            path,
            sizing: self.sizing,
        })
    }

    /// Sway splits command arguments on whitespace, so such paths are
    /// quoted.
    pub(crate) fn action(&self) -> String {
        let path = self.path.display().to_string();
        if path.contains(char::is_whitespace) || path.contains('"') {
            format!("bg \"{}\" {}", path.replace('"', "\\\""), self.sizing)
        } else {
            format!("bg {} {}", path, self.sizing)
        }
    }
}
