/// Extensions accepted for uploads, compared case-insensitively.
pub const TABULAR_EXTENSIONS: &[&str] = &["csv"];

/// Reduces a server storage path to its final component.
///
/// Both `/` and `\` count as separators, so `C:\data\jobs\report-42.csv` and
/// `uploads/report-42.csv` both yield `report-42.csv`.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

pub fn has_tabular_extension(file_name: &str) -> bool {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => TABULAR_EXTENSIONS
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
        _ => false,
    }
}

/// Row title: the file name without a trailing `.csv`.
pub fn display_title(file_name: &str) -> &str {
    let len = file_name.len();
    if len >= 4 && file_name.is_char_boundary(len - 4) {
        let (stem, ext) = file_name.split_at(len - 4);
        if ext.eq_ignore_ascii_case(".csv") {
            return stem;
        }
    }
    file_name
}
