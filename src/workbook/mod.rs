//! Layout of the tracker workbook and the operations on it.
//!
//! The data sheet has one row per day. Column A is the date, B..=H are filled automatically and
//! I..=K belong to the user. The `Config` sheet keeps key/value settings in columns A and B.

pub mod init;
pub mod tracker;

pub const SETTINGS_SHEET: &str = "Config";

/// Header row of the data sheet with column widths.
pub const COLUMNS: [(&str, f64); 11] = [
    ("Date", 12.0),
    ("Issues Triaged", 14.0),
    ("Issues Resolved", 15.0),
    ("PRs Created", 12.0),
    ("PRs Merged", 12.0),
    ("Commits", 10.0),
    ("Open Issues", 12.0),
    ("Open PRs", 10.0),
    ("ADO Tests", 14.0),
    ("Release", 12.0),
    ("Notes", 60.0),
];

pub const DATE_COLUMN: u32 = 1;
/// First automatic column; the metrics occupy this and the following six.
pub const FIRST_METRIC_COLUMN: u32 = 2;
pub const HEADER_ROW: u32 = 1;
pub const DATE_FORMAT: &str = "DD/MM/YYYY";

pub const OWNER_SETTING: &str = "GitHub Owner";
pub const REPO_SETTING: &str = "GitHub Repo";
pub const USERNAME_SETTING: &str = "GitHub Username";
pub const TIMEZONE_SETTING: &str = "Timezone";
pub const LAST_UPDATED_SETTING: &str = "Last Updated (UTC)";

/// Spreadsheet letter of a 1-based column index. Only single letters are needed here.
pub(crate) fn column_letter(index: u32) -> String {
    debug_assert!((1..=26).contains(&index));
    char::from(b'A' + (index - 1) as u8).to_string()
}
