//! A path argument bound to its selector and (once known) its on-disk format.

use anyhow::Result;
use tracing::debug;

use crate::core::archive::{self, WriteOptions};
use crate::core::detect::{self, Location, SaveFormat};
use crate::core::native;
use crate::core::record::SaveRecord;
use crate::core::selector::{IdFilter, IdGenerator, Selector};
use crate::infra::config::Settings;

/// Which records a read returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only ids the collection's selector yields
    Selected,
    /// Everything at rest, selector ignored
    All,
}

/// How much of each record a read loads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Metadata only; native bodies are not opened
    IndexOnly,
    Full,
}

/// Handle for one collection; format is detected once and cached.
#[derive(Debug, Clone)]
pub struct Collection {
    selector: Selector,
    ids: IdGenerator,
    location: Option<Location>,
}

impl Collection {
    pub fn new(selector: Selector) -> Self {
        let ids = selector.generator();
        Self { selector, ids, location: None }
    }

    /// Parse a "path#ids" argument
    pub fn parse(arg: &str) -> Result<Self> {
        Ok(Self::new(Selector::parse(arg)?))
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// The collection's own id cursor, shared across passes of one operation
    pub fn ids(&mut self) -> &mut IdGenerator {
        &mut self.ids
    }

    /// Resolve the format on first use; later calls reuse the answer.
    pub fn location(&mut self, settings: &Settings) -> Result<&Location> {
        let loc = match self.location.take() {
            Some(loc) => loc,
            None => {
                let loc = detect::detect(&self.selector.path, settings.default_ext)?;
                debug!(path = %loc, format = ?loc.format, "detected save format");
                loc
            }
        };
        Ok(self.location.insert(loc))
    }

    /// Display name: resolved path if known, else the path as typed
    pub fn name(&self) -> String {
        match &self.location {
            Some(loc) => loc.to_string(),
            None => self.selector.path.clone(),
        }
    }

    pub fn read(
        &mut self,
        scope: Scope,
        payload: Payload,
        settings: &Settings,
    ) -> Result<Vec<SaveRecord>> {
        let ids = match scope {
            Scope::Selected => self.selector.generator(),
            Scope::All => IdGenerator::all(),
        };
        let mut filter = IdFilter::new(ids);
        let loc = self.location(settings)?;

        match loc.format {
            SaveFormat::Native => native::read(&loc.path, &mut filter, payload == Payload::IndexOnly),
            SaveFormat::Archive => archive::read(&loc.path, &mut filter),
        }
    }

    /// Persist `records`, which must already be in ascending id order.
    pub fn write(&mut self, records: &[SaveRecord], settings: &Settings) -> Result<()> {
        let opts = WriteOptions { raw_json: settings.raw_json, pretty: settings.pretty_json };
        let loc = self.location(settings)?;
        debug!(path = %loc, count = records.len(), "writing collection");

        match loc.format {
            SaveFormat::Native => native::write(&loc.path, records),
            SaveFormat::Archive => archive::write(&loc.path, records, opts),
        }
    }
}
