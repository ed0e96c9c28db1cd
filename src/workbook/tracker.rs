use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};
use umya_spreadsheet::{Spreadsheet, Worksheet};

use crate::{
    config::Config,
    error::WorkbookError,
    fs::operations::save_atomically,
    metrics::DailyMetrics,
    utils::time::{
        date_to_excel_serial, excel_serial_to_date, last_updated_stamp, parse_date_arg,
    },
};

use super::{
    DATE_COLUMN, DATE_FORMAT, FIRST_METRIC_COLUMN, HEADER_ROW, LAST_UPDATED_SETTING,
    SETTINGS_SHEET,
};

/// Where the metrics of a run ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowUpdate {
    pub row: u32,
    pub created: bool,
}

pub fn open_workbook(path: &Path) -> Result<Spreadsheet, WorkbookError> {
    if !path.exists() {
        return Err(WorkbookError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(WorkbookError::Unreadable {
            path: path.to_path_buf(),
            reason: "path is not a file".into(),
        });
    }
    umya_spreadsheet::reader::xlsx::read(path).map_err(|e| WorkbookError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// A tracker workbook loaded in memory. Changes only reach the disk through [TrackerWorkbook::save].
pub struct TrackerWorkbook {
    path: PathBuf,
    sheet_name: String,
    book: Spreadsheet,
}

impl TrackerWorkbook {
    /// Loads the workbook and makes sure both the data sheet and the settings sheet are there, so
    /// that a broken file is reported before any GitHub request is made.
    pub fn open(config: &Config) -> Result<Self, WorkbookError> {
        info!("Opening workbook {:?}", config.output_path);
        let book = open_workbook(&config.output_path)?;
        for name in [config.sheet_name.as_str(), SETTINGS_SHEET] {
            if book.get_sheet_by_name(name).is_none() {
                return Err(WorkbookError::MissingSheet(name.to_string()));
            }
        }
        Ok(Self {
            path: config.output_path.clone(),
            sheet_name: config.sheet_name.clone(),
            book,
        })
    }

    /// Writes `metrics` into the row of `date` and stamps the settings sheet with `now`.
    pub fn record(
        &mut self,
        date: NaiveDate,
        metrics: &DailyMetrics,
        now: DateTime<Utc>,
    ) -> Result<RowUpdate, WorkbookError> {
        let sheet = self
            .book
            .get_sheet_by_name_mut(&self.sheet_name)
            .ok_or_else(|| WorkbookError::MissingSheet(self.sheet_name.clone()))?;
        let update = upsert_row(sheet, date, metrics);
        info!(
            "{} row {} for {date}",
            if update.created { "Appended" } else { "Updated" },
            update.row
        );

        let settings = self
            .book
            .get_sheet_by_name_mut(SETTINGS_SHEET)
            .ok_or_else(|| WorkbookError::MissingSheet(SETTINGS_SHEET.to_string()))?;
        set_setting(settings, LAST_UPDATED_SETTING, &last_updated_stamp(now));
        Ok(update)
    }

    pub fn save(&self) -> Result<(), WorkbookError> {
        info!("Saving workbook...");
        save_atomically(&self.book, &self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Finds the row of `date` or appends one, then overwrites the automatic columns. Columns past the
/// metrics are never touched.
pub fn upsert_row(sheet: &mut Worksheet, date: NaiveDate, metrics: &DailyMetrics) -> RowUpdate {
    let update = match find_date_row(sheet, date) {
        Some(row) => RowUpdate {
            row,
            created: false,
        },
        None => {
            let row = sheet.get_highest_row().max(HEADER_ROW) + 1;
            let cell = sheet.get_cell_mut((DATE_COLUMN, row));
            cell.set_value_number(date_to_excel_serial(date));
            cell.get_style_mut()
                .get_number_format_mut()
                .set_format_code(DATE_FORMAT);
            RowUpdate { row, created: true }
        }
    };

    for (offset, value) in metrics.columns().into_iter().enumerate() {
        sheet
            .get_cell_mut((FIRST_METRIC_COLUMN + offset as u32, update.row))
            .set_value_number(value as f64);
    }
    update
}

/// Linear scan of the date column below the header.
pub fn find_date_row(sheet: &Worksheet, date: NaiveDate) -> Option<u32> {
    ((HEADER_ROW + 1)..=sheet.get_highest_row()).find(|row| {
        sheet
            .get_cell((DATE_COLUMN, *row))
            .and_then(|cell| cell_date(&cell.get_value()))
            == Some(date)
    })
}

/// A date cell holds either an Excel serial number or text typed by hand.
fn cell_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<f64>() {
        Ok(serial) => excel_serial_to_date(serial),
        Err(_) => {
            let parsed = parse_date_arg(value).ok();
            if parsed.is_none() {
                debug!("Ignoring non-date value {value:?} in the date column");
            }
            parsed
        }
    }
}

/// Writes `value` next to `key` in the settings sheet, appending the pair when the key is absent.
pub fn set_setting(sheet: &mut Worksheet, key: &str, value: &str) {
    let existing = (1..=sheet.get_highest_row()).find(|row| {
        sheet
            .get_cell((1, *row))
            .is_some_and(|cell| cell.get_value().trim() == key)
    });
    let row = existing.unwrap_or_else(|| {
        let row = sheet.get_highest_row() + 1;
        warn!("Settings sheet has no {key:?} entry, adding it at row {row}");
        let cell = sheet.get_cell_mut((1, row));
        cell.set_value_string(key);
        cell.get_style_mut().get_font_mut().set_bold(true);
        row
    });
    sheet.get_cell_mut((2, row)).set_value_string(value);
}

#[cfg(test)]
pub(crate) fn get_setting(sheet: &Worksheet, key: &str) -> Option<String> {
    (1..=sheet.get_highest_row())
        .find(|row| {
            sheet
                .get_cell((1, *row))
                .is_some_and(|cell| cell.get_value().trim() == key)
        })
        .and_then(|row| sheet.get_cell((2, row)))
        .map(|cell| cell.get_value().to_string())
}
