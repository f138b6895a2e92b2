use std::cell::{Cell, RefCell};
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::backend::Connection;
use crate::error::{Error, Result};
use crate::predicate::{Predicate, PropertyValue};
use crate::types::{Background, BackgroundSizing, DisplayMode, ModeRecord, OutputRecord, Position};

#[derive(Debug, Default)]
struct Modes {
    list: Vec<DisplayMode>,
    current: Option<usize>,
}

impl Modes {
    fn from_records(records: &[ModeRecord], current: Option<&ModeRecord>) -> Result<Self> {
        let list = records
            .iter()
            .map(DisplayMode::from_record)
            .collect::<Result<Vec<_>>>()?;
        let current = match current {
            Some(record) => {
                let current = DisplayMode::from_record(record)?;
                let idx = list.iter().position(|mode| *mode == current);
                if idx.is_none() {
                    debug!("Current mode {current} is not among the reported modes");
                }
                idx
            }
            None => None,
        };
        Ok(Self { list, current })
    }
}

/// One output of the window manager.
///
/// The active flag and the mode list are a snapshot: they are updated after
/// our own commands and by [`Monitor::refresh_modes`], but nothing keeps them
/// in sync with changes made elsewhere.
pub struct Monitor {
    name: String,
    meta: Map<String, Value>,
    active: Cell<bool>,
    modes: RefCell<Modes>,
    connection: Rc<dyn Connection>,
}

impl Monitor {
    pub fn new(record: OutputRecord, connection: Rc<dyn Connection>) -> Result<Self> {
        let modes = Modes::from_records(&record.modes, record.current_mode.as_ref())?;
        let mut meta = record.meta;
        meta.insert("name".to_string(), Value::String(record.name.clone()));
        Ok(Self {
            name: record.name,
            meta,
            active: Cell::new(record.active),
            modes: RefCell::new(modes),
            connection,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifying metadata, including `name`.
    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn modes(&self) -> Vec<DisplayMode> {
        self.modes.borrow().list.clone()
    }

    pub fn active_mode(&self) -> Option<DisplayMode> {
        let modes = self.modes.borrow();
        modes.current.and_then(|idx| modes.list.get(idx).copied())
    }

    /// Turns the output on. Without a position this is a bare `enable`
    /// that keeps whatever configuration the output had; otherwise the
    /// output is placed at `position` using `mode`, defaulting to the
    /// highest mode.
    pub fn enable(
        &self,
        position: Option<Position>,
        mode: Option<DisplayMode>,
        background: Option<&Background>,
    ) -> Result<()> {
        let Some(position) = position else {
            self.perform(&["enable".to_string()])?;
            self.active.set(true);
            return Ok(());
        };

        let background = background.map(Background::resolve).transpose()?;
        let mode = match mode {
            Some(mode) => mode,
            None => {
                self.ensure_active()?;
                self.highest_mode()?
            }
        };

        let mut actions = vec![
            format!("position {} {}", position.x, position.y),
            format!("resolution {}x{}", mode.width(), mode.height()),
        ];
        if let Some(background) = background {
            actions.push(background.action());
        }

        self.perform(&actions)?;
        self.active.set(true);
        Ok(())
    }

    pub fn disable(&self) -> Result<()> {
        self.perform(&["disable".to_string()])?;
        self.active.set(false);
        Ok(())
    }

    pub fn background(&self, path: impl AsRef<Path>, sizing: BackgroundSizing) -> Result<()> {
        let background = Background::new(path.as_ref(), sizing).resolve()?;
        self.perform(&[background.action()])
    }

    pub fn set_mode(&self, mode: &DisplayMode) -> Result<()> {
        self.perform(&[format!("resolution {}x{}", mode.width(), mode.height())])
    }

    /// An inactive output may not report its modes. Enable it and re-read
    /// them so that [`Monitor::highest_mode`] has something to choose from.
    ///
    /// This races with the window manager applying the enable; the re-read
    /// may still see the old state.
    pub fn ensure_active(&self) -> Result<()> {
        if !self.is_active() {
            debug!("Enabling inactive monitor {} to discover its modes", self.name);
            self.enable(None, None, None)?;
            self.refresh_modes("name")?;
        }
        Ok(())
    }

    pub fn highest_mode(&self) -> Result<DisplayMode> {
        self.modes
            .borrow()
            .list
            .iter()
            .max()
            .copied()
            .ok_or_else(|| Error::NoModes(self.name.clone()))
    }

    /// The single mode with the given dimensions, whatever its refresh rate.
    pub fn find_mode(&self, size: (i32, i32)) -> Result<DisplayMode> {
        let modes = self.modes.borrow();
        let matching: Vec<&DisplayMode> = modes
            .list
            .iter()
            .filter(|mode| mode.has_dimensions(size))
            .collect();

        match matching.as_slice() {
            [mode] => Ok(**mode),
            [] => Err(Error::MonitorModeNotFound {
                monitor: self.name.clone(),
                width: size.0,
                height: size.1,
            }),
            _ => Err(Error::AmbiguousMonitorMode {
                monitor: self.name.clone(),
                width: size.0,
                height: size.1,
            }),
        }
    }

    /// Re-reads the outputs and takes over the modes of the record whose
    /// `identifier` property equals ours.
    pub fn refresh_modes(&self, identifier: &str) -> Result<()> {
        let Some(expected) = self.meta.get(identifier) else {
            warn!("Monitor {} has no property {identifier}", self.name);
            return Ok(());
        };

        let outputs = self.connection.get_outputs()?;
        let record = outputs.iter().find(|record| {
            if identifier == "name" {
                Value::String(record.name.clone()) == *expected
            } else {
                record.meta.get(identifier) == Some(expected)
            }
        });

        match record {
            Some(record) => {
                let modes = Modes::from_records(&record.modes, record.current_mode.as_ref())?;
                *self.modes.borrow_mut() = modes;
            }
            None => warn!("Monitor {} is no longer reported", self.name),
        }
        Ok(())
    }

    /// A property missing from the metadata never matches.
    pub fn has_property(&self, key: &str, value: &PropertyValue) -> bool {
        self.meta
            .get(key)
            .map(|actual| value.matches(actual))
            .unwrap_or(false)
    }

    pub fn has_properties(&self, predicate: &Predicate) -> bool {
        debug!("Checking {} for properties {}", self.name, predicate);
        predicate
            .iter()
            .all(|(key, value)| self.has_property(key, value))
    }

    fn perform(&self, actions: &[String]) -> Result<()> {
        let command = format!("output {} {}", self.name, actions.join(" "));
        debug!("Sending {command:?}");
        self.connection.command(&command)
    }
}

impl fmt::Debug for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("name", &self.name)
            .field("active", &self.active.get())
            .field("modes", &self.modes.borrow())
            .finish_non_exhaustive()
    }
}
