//! Derived identifiers and label strings.
//!
//! Segments must not contain the delimiters themselves (`/` for ids, `-` for
//! label strings), otherwise the derived keys stop being reversible. This is
//! not checked here.

pub const LABEL_DELIMITER: &str = "-";
pub const ID_DELIMITER: &str = "/";

/// `version/label_string`
pub fn regulation_id(version: &str, label_string: &str) -> String {
    format!("{version}{ID_DELIMITER}{label_string}")
}

/// `version/name/label`
pub fn layer_id(version: &str, name: &str, label: &str) -> String {
    format!("{version}{ID_DELIMITER}{name}{ID_DELIMITER}{label}")
}

/// `label/old_version/new_version`
pub fn diff_id(label: &str, old_version: &str, new_version: &str) -> String {
    format!("{label}{ID_DELIMITER}{old_version}{ID_DELIMITER}{new_version}")
}

pub fn label_string<S: AsRef<str>>(label: &[S]) -> String {
    label
        .iter()
        .map(|segment| segment.as_ref())
        .collect::<Vec<_>>()
        .join(LABEL_DELIMITER)
}
