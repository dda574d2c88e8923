//! Column discovery from the table header row

use crate::error::TableError;
use std::collections::HashMap;

/// Positions of the columns the watcher reads, resolved by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub id: usize,
    pub name: usize,
    pub cpu: usize,
    pub mem: usize,
    pub maxmem: usize,
    pub disk: usize,
    pub maxdisk: usize,
    /// Number of cells in the header row
    pub width: usize,
}

impl ColumnLayout {
    pub fn from_header(cells: &[&str]) -> Result<Self, TableError> {
        // first occurrence wins on duplicate names
        let mut positions: HashMap<&str, usize> = HashMap::with_capacity(cells.len());
        for (index, cell) in cells.iter().enumerate() {
            positions.entry(*cell).or_insert(index);
        }

        let find = |column: &'static str| {
            positions
                .get(column)
                .copied()
                .ok_or(TableError::MissingColumn(column))
        };

        Ok(Self {
            id: find("id")?,
            name: find("name")?,
            cpu: find("cpu")?,
            mem: find("mem")?,
            maxmem: find("maxmem")?,
            disk: find("disk")?,
            maxdisk: find("maxdisk")?,
            width: cells.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_by_name() {
        let header = ["id", "maxmem", "name", "cpu", "disk", "mem", "status", "maxdisk", ""];
        let layout = ColumnLayout::from_header(&header).unwrap();
        assert_eq!(layout.id, 0);
        assert_eq!(layout.maxmem, 1);
        assert_eq!(layout.name, 2);
        assert_eq!(layout.cpu, 3);
        assert_eq!(layout.disk, 4);
        assert_eq!(layout.mem, 5);
        assert_eq!(layout.maxdisk, 7);
        assert_eq!(layout.width, 9);
    }

    #[test]
    fn test_missing_column() {
        let header = ["id", "name", "cpu", "mem", "maxmem", "disk"];
        let err = ColumnLayout::from_header(&header).unwrap_err();
        assert!(matches!(err, TableError::MissingColumn("maxdisk")));
    }
}
