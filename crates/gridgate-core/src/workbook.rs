//! The workbook: ordered sheets plus document-wide settings

use crate::date::DateSystem;
use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

const RESERVED_NAME_CHARS: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

/// An in-memory spreadsheet document
///
/// Sheets keep the order they were added in, which is their order in the
/// saved file. Name lookups here are exact; case-insensitive matching is a
/// caller concern.
#[derive(Debug, Default)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
    settings: WorkbookSettings,
}

/// Settings stored in the workbook part
#[derive(Debug, Clone, Default)]
pub struct WorkbookSettings {
    /// Serials count from 1904-01-01 instead of 1899-12-31
    pub date_1904: bool,
}

impl Workbook {
    /// No sheets, 1900 date system
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get(index)
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.sheets.get_mut(index)
    }

    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheet_index(name).map(|i| &self.sheets[i])
    }

    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|ws| ws.name() == name)
    }

    /// Sheets in document order
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.sheets.iter()
    }

    /// Append an empty sheet, returning its index
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.add_existing_worksheet(Worksheet::new(name))
    }

    /// Append a sheet built elsewhere, returning its index
    ///
    /// Fails on an invalid name or one that matches an existing sheet
    /// ignoring case.
    pub fn add_existing_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        let name = worksheet.name();
        check_sheet_name(name)?;
        let lowered = name.to_lowercase();
        if self.sheets.iter().any(|ws| ws.name().to_lowercase() == lowered) {
            return Err(Error::DuplicateSheetName(name.to_owned()));
        }

        self.sheets.push(worksheet);
        Ok(self.sheets.len() - 1)
    }

    pub fn settings(&self) -> &WorkbookSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut WorkbookSettings {
        &mut self.settings
    }

    /// Epoch the date serials of this workbook count from
    pub fn date_system(&self) -> DateSystem {
        DateSystem::from_1904_flag(self.settings.date_1904)
    }
}

fn check_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidSheetName("name is empty".into()));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(Error::InvalidSheetName(format!(
            "'{}' is longer than {} characters",
            name, MAX_SHEET_NAME_LEN
        )));
    }
    if let Some(c) = name.chars().find(|c| RESERVED_NAME_CHARS.contains(c)) {
        return Err(Error::InvalidSheetName(format!(
            "'{}' contains '{}'",
            name, c
        )));
    }
    Ok(())
}
