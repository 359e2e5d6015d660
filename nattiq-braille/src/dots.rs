//! Braille dot layouts and cell translation
//!
//! Logical cells use ISO 11548-1 numbering: dot N is bit N-1. A device's
//! [`DotTable`] says which bit of its own cell byte each logical dot drives;
//! an [`OutputTable`] expands that into a 256-entry lookup.

use serde::{Deserialize, Serialize};

use crate::error::BrailleError;

/// Number of dots in a cell
pub const DOT_COUNT: usize = 8;

/// Device bit for each logical dot, dot 1 first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DotTable(pub [u8; DOT_COUNT]);

/// ISO 11548-1 order: dot N drives bit N-1
pub const ISO_11548_1: DotTable = DotTable([0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80]);

impl Default for DotTable {
    fn default() -> Self {
        ISO_11548_1
    }
}

impl DotTable {
    /// Each dot maps to exactly one bit and no two dots share a bit
    pub fn is_permutation(&self) -> bool {
        let mut seen = 0u8;
        for &bit in &self.0 {
            if bit.count_ones() != 1 || seen & bit != 0 {
                return false;
            }
            seen |= bit;
        }
        true
    }
}

/// Logical cell to device cell lookup
#[derive(Debug, Clone)]
pub struct OutputTable {
    cells: [u8; 256],
}

impl OutputTable {
    pub fn new(dots: &DotTable) -> Self {
        let mut cells = [0u8; 256];
        for (logical, cell) in cells.iter_mut().enumerate() {
            *cell = dots
                .0
                .iter()
                .enumerate()
                .filter(|(dot, _)| logical & (1 << dot) != 0)
                .fold(0, |acc, (_, bit)| acc | bit);
        }
        Self { cells }
    }

    pub fn translate_cell(&self, cell: u8) -> u8 {
        self.cells[cell as usize]
    }

    pub fn translate(&self, cells: &[u8]) -> Vec<u8> {
        cells.iter().map(|&c| self.translate_cell(c)).collect()
    }
}

/// Parse a cell written as dot numbers, e.g. `"1245"`; `"0"` is blank
pub fn parse_cell(text: &str) -> Result<u8, BrailleError> {
    if text == "0" {
        return Ok(0);
    }
    if text.is_empty() {
        return Err(BrailleError::InvalidCell("empty cell".into()));
    }
    text.chars().try_fold(0u8, |cell, c| match c.to_digit(10) {
        Some(dot @ 1..=8) => Ok(cell | 1 << (dot - 1)),
        _ => Err(BrailleError::InvalidCell(format!(
            "'{text}': '{c}' is not a dot number (1-8)"
        ))),
    })
}

/// Format a cell as dot numbers, the inverse of [`parse_cell`]
pub fn format_cell(cell: u8) -> String {
    if cell == 0 {
        return "0".into();
    }
    (0..DOT_COUNT)
        .filter(|dot| cell & (1 << dot) != 0)
        .map(|dot| char::from(b'1' + dot as u8))
        .collect()
}
