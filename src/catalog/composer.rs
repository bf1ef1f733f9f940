//! Composer names and piece titles as they appear on catalog pages.

use std::fmt;

/// A composer name split into surname and first name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComposerName {
    pub surname: String,
    pub firstname: String,
}

impl ComposerName {
    /// Parse a catalog name of the form `"Surname, Firstname"`.
    ///
    /// Only the first `", "` separates the two parts. A name without a separator
    /// is a surname with an empty first name (e.g. `"Anonymous"`).
    pub fn parse(name: &str) -> Self {
        let name = sanitize_cell(name);
        match name.split_once(", ") {
            Some((surname, firstname)) => Self {
                surname: surname.trim().to_string(),
                firstname: firstname.trim().to_string(),
            },
            None => Self {
                surname: name.trim().to_string(),
                firstname: String::new(),
            },
        }
    }
}

impl fmt::Display for ComposerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.firstname.is_empty() {
            write!(f, "{}", self.surname)
        } else {
            write!(f, "{}, {}", self.surname, self.firstname)
        }
    }
}

/// Strip the `" (Surname, Firstname)"` attribution catalog pages append to titles.
pub fn remove_composer_suffix(title: &str, composer: &ComposerName) -> String {
    let suffix = format!(" ({})", composer);
    match title.find(&suffix) {
        Some(idx) => title[..idx].to_string(),
        None => title.to_string(),
    }
}

/// Replace characters the tab-delimited snapshots cannot hold.
pub fn sanitize_cell(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == '\t' || c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}
