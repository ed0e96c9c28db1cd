use tracing::{info, warn};
use umya_spreadsheet::{HorizontalAlignmentValues, Spreadsheet, VerticalAlignmentValues, Worksheet};

use crate::{
    config::Config,
    error::WorkbookError,
    fs::operations::save_atomically,
};

use super::{
    column_letter, COLUMNS, HEADER_ROW, LAST_UPDATED_SETTING, OWNER_SETTING, REPO_SETTING,
    SETTINGS_SHEET, TIMEZONE_SETTING, USERNAME_SETTING,
};

const DEFAULT_SHEET: &str = "Sheet1";
const HEADER_FILL: &str = "FF305496";
const HEADER_FONT_COLOR: &str = "FFFFFFFF";

/// Creates a fresh tracker workbook at `config.output_path`. An existing file is only replaced
/// when `force` is set.
pub fn create_workbook(config: &Config, force: bool) -> Result<(), WorkbookError> {
    let path = &config.output_path;
    if path.exists() {
        if !force {
            return Err(WorkbookError::AlreadyExists(path.clone()));
        }
        warn!("Overwriting existing workbook {path:?}");
    }

    let book = build_workbook(config)?;
    save_atomically(&book, path)?;
    info!("Created workbook {path:?}");
    Ok(())
}

pub fn build_workbook(config: &Config) -> Result<Spreadsheet, WorkbookError> {
    let mut book = umya_spreadsheet::new_file();

    let data = book
        .get_sheet_by_name_mut(DEFAULT_SHEET)
        .ok_or_else(|| WorkbookError::MissingSheet(DEFAULT_SHEET.to_string()))?;
    data.set_name(config.sheet_name.clone());
    write_header(data);

    let settings = book
        .new_sheet(SETTINGS_SHEET)
        .map_err(|e| WorkbookError::Save {
            path: config.output_path.clone(),
            reason: e.to_string(),
        })?;
    write_settings(settings, config);

    Ok(book)
}

fn write_header(sheet: &mut Worksheet) {
    for (index, (name, width)) in COLUMNS.iter().enumerate() {
        let column = index as u32 + 1;
        let cell = sheet.get_cell_mut((column, HEADER_ROW));
        cell.set_value_string(*name);

        let style = cell.get_style_mut();
        style.set_background_color(HEADER_FILL);
        let font = style.get_font_mut();
        font.set_bold(true);
        font.get_color_mut().set_argb(HEADER_FONT_COLOR);
        let alignment = style.get_alignment_mut();
        alignment.set_horizontal(HorizontalAlignmentValues::Center);
        alignment.set_vertical(VerticalAlignmentValues::Center);

        sheet
            .get_column_dimension_mut(&column_letter(column))
            .set_width(*width);
    }
}

fn write_settings(sheet: &mut Worksheet, config: &Config) {
    let rows = [
        (OWNER_SETTING, config.owner.as_str()),
        (REPO_SETTING, config.repo.as_str()),
        (USERNAME_SETTING, config.username.as_str()),
        (TIMEZONE_SETTING, config.timezone.as_str()),
        (LAST_UPDATED_SETTING, ""),
    ];
    for (row, (key, value)) in (1u32..).zip(rows) {
        let key_cell = sheet.get_cell_mut((1, row));
        key_cell.set_value_string(key);
        key_cell.get_style_mut().get_font_mut().set_bold(true);
        sheet.get_cell_mut((2, row)).set_value_string(value);
    }
    sheet.get_column_dimension_mut("A").set_width(22.0);
    sheet.get_column_dimension_mut("B").set_width(28.0);
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use anyhow::Result;
    use tempfile::tempdir;

    use crate::{
        config::{tests::full_source, Config, OUTPUT_KEY},
        error::WorkbookError,
        workbook::{
            tracker::{get_setting, open_workbook},
            COLUMNS, SETTINGS_SHEET,
        },
    };

    use super::*;

    fn config_in(dir: &Path) -> Config {
        let mut source = full_source();
        source.insert(
            OUTPUT_KEY.to_string(),
            dir.join("tracker.xlsx").to_string_lossy().to_string(),
        );
        Config::load(&source).unwrap()
    }

    #[test]
    fn test_create_layout() -> Result<()> {
        let dir = tempdir()?;
        let config = config_in(dir.path());
        create_workbook(&config, false)?;

        let book = open_workbook(&config.output_path)?;
        let data = book.get_sheet_by_name("Ansible.Azcollection").unwrap();
        for (index, (name, _)) in COLUMNS.iter().enumerate() {
            assert_eq!(data.get_cell((index as u32 + 1, 1)).unwrap().get_value(), *name);
        }
        assert_eq!(data.get_highest_row(), 1);

        let settings = book.get_sheet_by_name(SETTINGS_SHEET).unwrap();
        assert_eq!(get_setting(settings, OWNER_SETTING).as_deref(), Some("ansible-collections"));
        assert_eq!(get_setting(settings, REPO_SETTING).as_deref(), Some("azure"));
        assert_eq!(get_setting(settings, USERNAME_SETTING).as_deref(), Some("octocat"));
        assert_eq!(get_setting(settings, TIMEZONE_SETTING).as_deref(), Some("Asia/Kuala_Lumpur"));
        assert!(get_setting(settings, LAST_UPDATED_SETTING)
            .unwrap_or_default()
            .is_empty());
        Ok(())
    }

    #[test]
    fn test_refuses_to_overwrite() -> Result<()> {
        let dir = tempdir()?;
        let config = config_in(dir.path());
        fs::write(&config.output_path, b"keep me")?;

        let result = create_workbook(&config, false);
        assert!(matches!(result, Err(WorkbookError::AlreadyExists(_))));
        assert_eq!(fs::read(&config.output_path)?, b"keep me");

        create_workbook(&config, true)?;
        assert!(open_workbook(&config.output_path).is_ok());
        Ok(())
    }
}
