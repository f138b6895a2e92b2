use std::rc::Rc;

use log::{info, warn};

use crate::backend::Connection;
use crate::error::{Error, Result};
use crate::monitor::Monitor;
use crate::predicate::Predicate;
use crate::types::{Alignment, Direction, OutputRecord};

/// All monitors of one session, as read from a single `get_outputs`.
pub struct MonitorRegistry {
    monitors: Vec<Monitor>,
    connection: Rc<dyn Connection>,
}

impl MonitorRegistry {
    /// Builds the registry from a live fetch.
    pub fn new(connection: Rc<dyn Connection>) -> Result<Self> {
        let mut registry = Self::empty(connection);
        registry.fetch_monitors()?;
        Ok(registry)
    }

    /// Builds the registry from already known output records.
    pub fn with_outputs(connection: Rc<dyn Connection>, outputs: Vec<OutputRecord>) -> Result<Self> {
        let mut registry = Self::empty(connection);
        registry.load_monitors(outputs)?;
        Ok(registry)
    }

    fn empty(connection: Rc<dyn Connection>) -> Self {
        Self {
            monitors: Vec::new(),
            connection,
        }
    }

    pub fn fetch_monitors(&mut self) -> Result<()> {
        let outputs = self.connection.get_outputs()?;
        self.load_monitors(outputs)
    }

    pub fn load_monitors(&mut self, outputs: Vec<OutputRecord>) -> Result<()> {
        self.monitors = outputs
            .into_iter()
            .map(|record| Monitor::new(record, self.connection.clone()))
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub fn active_monitors(&self) -> impl Iterator<Item = &Monitor> {
        self.monitors.iter().filter(|monitor| monitor.is_active())
    }

    pub fn find_monitor(&self, predicate: &Predicate) -> Result<&Monitor> {
        let mut matching = self
            .monitors
            .iter()
            .filter(|monitor| monitor.has_properties(predicate));

        match (matching.next(), matching.count()) {
            (Some(monitor), 0) => Ok(monitor),
            (None, _) => Err(Error::MonitorNotFound {
                predicate: predicate.to_string(),
            }),
            (Some(_), others) => Err(Error::AmbiguousMonitor {
                predicate: predicate.to_string(),
                matches: others + 1,
            }),
        }
    }

    pub fn monitor_by_name(&self, name: &str) -> Result<&Monitor> {
        self.find_monitor(&Predicate::new().with("name", name))
    }

    /// Resolves every predicate, keeping the caller's order.
    pub fn find_monitors(&self, predicates: &[Predicate]) -> Result<Vec<&Monitor>> {
        predicates
            .iter()
            .map(|predicate| self.find_monitor(predicate))
            .collect()
    }

    /// Only a missing monitor counts as not connected; an ambiguous
    /// predicate is still an error.
    pub fn is_connected(&self, predicate: &Predicate) -> Result<bool> {
        match self.find_monitor(predicate) {
            Ok(_) => Ok(true),
            Err(Error::MonitorNotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub fn check_setup(&self, predicates: &[Predicate]) -> Result<bool> {
        for predicate in predicates {
            if !self.is_connected(predicate)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Lays out `monitors` in a single line, disabling every other active
    /// monitor first.
    ///
    /// Commands are sent one monitor at a time and never revised: if a
    /// monitor fails, the ones before it stay as placed and the ones after it
    /// are not touched.
    pub fn enable_in_line(
        &self,
        monitors: &[&Monitor],
        direction: Direction,
        align: Alignment,
    ) -> Result<()> {
        for monitor in self.active_monitors() {
            if !monitors.iter().any(|m| std::ptr::eq(*m, monitor)) {
                info!("Disabling monitor {}", monitor.name());
                monitor.disable()?;
            }
        }

        info!("Enabling {} monitors", monitors.len());

        let mut offset: i32 = 0;
        for (idx, monitor) in monitors.iter().enumerate() {
            info!("Enabling monitor {}", monitor.name());
            monitor.ensure_active()?;
            let mode = monitor.highest_mode()?;

            let extent = direction.extent(&mode);
            let overflow = || Error::LayoutOverflow(monitor.name().to_string());
            let along = if direction.is_positive() {
                let along = offset;
                offset = offset.checked_add(extent).ok_or_else(overflow)?;
                along
            } else {
                if idx > 0 {
                    offset = offset.checked_sub(extent).ok_or_else(overflow)?;
                }
                offset
            };
            let across = align.offset(direction.cross_extent(&mode));

            monitor.enable(Some(direction.position(along, across)), Some(mode), None)?;
        }

        Ok(())
    }

    pub fn enable_left_to_right(&self, monitors: &[&Monitor], align: Alignment) -> Result<()> {
        self.enable_in_line(monitors, Direction::Right, align)
    }

    /// Resolves and lays out a setup without checking it first.
    pub fn enable_setup(
        &self,
        predicates: &[Predicate],
        direction: Direction,
        align: Alignment,
    ) -> Result<()> {
        let monitors = self.find_monitors(predicates)?;
        self.enable_in_line(&monitors, direction, align)
    }

    pub fn check_and_enable_setup(&self, predicates: &[Predicate]) -> Result<bool> {
        if self.check_setup(predicates)? {
            info!("Found setup");
            let monitors = self.find_monitors(predicates)?;
            self.enable_left_to_right(&monitors, Alignment::Start)?;
            Ok(true)
        } else {
            info!("Setup not found");
            Ok(false)
        }
    }

    /// Sway misbehaves without any enabled output; avoiding that is up to
    /// the caller.
    pub fn disable_all_monitors(&self) -> Result<()> {
        warn!("Disabling all monitors");
        for monitor in self.active_monitors() {
            monitor.disable()?;
        }
        Ok(())
    }
}
