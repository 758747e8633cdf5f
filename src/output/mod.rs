//! Where matched items go once the scanner finds them.

mod formatters;

pub use formatters::{OutputFormat, RecordWriter};

use crate::item::ItemRecord;
use anyhow::Result;

pub trait RecordSink {
    fn emit(&mut self, record: &ItemRecord) -> Result<()>;

    /// Called once after the scan, successful or not.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl RecordSink for Vec<ItemRecord> {
    fn emit(&mut self, record: &ItemRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}
