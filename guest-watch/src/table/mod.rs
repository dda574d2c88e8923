//! Parser for the `pvesh get /cluster/resources` text table
//!
//! Handles:
//! - Skipping banners and box-drawing separators
//! - Column discovery from the header row (column order is not fixed)
//! - Filtering to guests in the running state
//! - Typed errors for truncated rows instead of silently shifted fields

mod layout;

pub use layout::ColumnLayout;

use crate::error::TableError;
use crate::models::GuestReading;
use crate::units::{cpu_percent, usage_percent};
use std::iter::Enumerate;
use std::str::Lines;
use tracing::debug;

/// Table content lines start with a box-drawing vertical bar
pub const ROW_PREFIX: &str = "│ ";
pub const COLUMN_DELIMITER: char = '│';
const RUNNING_MARKER: &str = " running ";

/// Raw cells of a running guest row, before unit conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGuestRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub cpu: &'a str,
    pub mem: &'a str,
    pub maxmem: &'a str,
    pub disk: &'a str,
    pub maxdisk: &'a str,
}

impl RawGuestRow<'_> {
    pub fn to_reading(&self) -> GuestReading {
        GuestReading {
            id: self.id.to_string(),
            name: self.name.to_string(),
            cpu: cpu_percent(self.cpu),
            ram: usage_percent(self.maxmem, self.mem),
            disk: usage_percent(self.maxdisk, self.disk),
        }
    }
}

/// Lazy iterator over the running guest rows of a table
pub struct Rows<'a> {
    lines: Enumerate<Lines<'a>>,
    layout: Option<ColumnLayout>,
}

/// Parse `text` lazily; errors are yielded in place of the offending row
pub fn parse(text: &str) -> Rows<'_> {
    Rows {
        lines: text.lines().enumerate(),
        layout: None,
    }
}

fn split_cells(line: &str) -> Vec<&str> {
    line.split(COLUMN_DELIMITER).skip(1).map(str::trim).collect()
}

impl<'a> Iterator for Rows<'a> {
    type Item = Result<RawGuestRow<'a>, TableError>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, line) in self.lines.by_ref() {
            if !line.starts_with(ROW_PREFIX) {
                continue;
            }

            let cells = split_cells(line);

            if cells.first() == Some(&"id") {
                match ColumnLayout::from_header(&cells) {
                    Ok(layout) => {
                        debug!("table header at line {}: {:?}", index + 1, layout);
                        self.layout = Some(layout);
                        continue;
                    }
                    Err(e) => return Some(Err(e)),
                }
            }

            let Some(layout) = &self.layout else {
                continue;
            };

            if !line.contains(RUNNING_MARKER) {
                continue;
            }

            if cells.len() < layout.width {
                return Some(Err(TableError::MalformedRow {
                    line: index + 1,
                    expected: layout.width,
                    found: cells.len(),
                }));
            }

            return Some(Ok(RawGuestRow {
                id: cells[layout.id],
                name: cells[layout.name],
                cpu: cells[layout.cpu],
                mem: cells[layout.mem],
                maxmem: cells[layout.maxmem],
                disk: cells[layout.disk],
                maxdisk: cells[layout.maxdisk],
            }));
        }
        None
    }
}

/// Parse the whole table into readings, failing on the first layout error
pub fn read_guests(text: &str) -> Result<Vec<GuestReading>, TableError> {
    parse(text).map(|row| row.map(|r| r.to_reading())).collect()
}
