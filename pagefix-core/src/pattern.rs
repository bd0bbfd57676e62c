use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Image extensions recognized when no other list is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Characters accepted between the two page numbers.
pub const SEPARATORS: &[char] = &['-', '_', '+', '&', ' '];

/// The dash that joins the two pages in a canonical name.
pub const CANONICAL_SEPARATOR: char = '-';

// Two runs of 1-3 digits joined by a separator, right before the extension.
// The prefix has to end in a non-digit so the first run is complete.
static SEPARATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<prefix>(?:.*[^0-9])?)(?P<first>[0-9]{1,3})(?P<sep>[-_+& ])(?P<second>[0-9]{1,3})(?P<ext>\.[A-Za-z0-9]+)$",
    )
    .expect("separated page pattern is valid")
});

// A single 4 or 6 digit run holding both pages, e.g. `023-1213.jpg`.
static CONCATENATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>(?:.*[-_+& ])?)(?P<digits>[0-9]{4}|[0-9]{6})(?P<ext>\.[A-Za-z0-9]+)$")
        .expect("concatenated page pattern is valid")
});

/// How the two page numbers were written in the original name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Convention {
    /// `012_013`, `012+013`, `012&013`, `012 013` (or the canonical `012-013`)
    Separated,
    /// `012013` or `1213`, both halves glued together
    Concatenated,
}

impl std::fmt::Display for Convention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Separated => write!(f, "separated"),
            Self::Concatenated => write!(f, "concatenated"),
        }
    }
}

/// A file name recognized as holding a two-page spread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoublePage {
    pub prefix: String,
    pub first: String,
    pub second: String,
    /// `None` for concatenated names
    pub separator: Option<char>,
    pub extension: String,
    pub convention: Convention,
}

impl DoublePage {
    pub fn first_page(&self) -> u16 {
        self.first.parse().unwrap_or_default()
    }

    pub fn second_page(&self) -> u16 {
        self.second.parse().unwrap_or_default()
    }

    /// Prefix, both page numbers joined by a dash, then the extension.
    /// Zero padding and extension case are kept as they were.
    pub fn canonical_name(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.prefix, self.first, CANONICAL_SEPARATOR, self.second, self.extension
        )
    }

    pub fn is_canonical(&self) -> bool {
        self.separator == Some(CANONICAL_SEPARATOR)
    }
}

/// Recognizes double-page names for a set of image extensions.
#[derive(Debug, Clone)]
pub struct DoublePageMatcher {
    extensions: Vec<String>,
}

impl Default for DoublePageMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

impl DoublePageMatcher {
    /// Extensions are compared case-insensitively; a leading dot is ignored.
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        let extensions = extensions
            .iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether `name` ends in one of the configured image extensions.
    pub fn is_image(&self, name: &str) -> bool {
        name.rsplit_once('.').is_some_and(|(stem, ext)| {
            !stem.is_empty() && self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
        })
    }

    /// Find the page pair in a bare file name (no directory components).
    ///
    /// Canonical names are recognized too; use [`Self::propose`] to get only
    /// names that need changing.
    pub fn detect(&self, name: &str) -> Option<DoublePage> {
        if !self.is_image(name) {
            return None;
        }
        detect_separated(name).or_else(|| detect_concatenated(name))
    }

    /// The canonical replacement for `name`, if it is a double page that is
    /// not already canonical.
    pub fn propose(&self, name: &str) -> Option<(String, Convention)> {
        let page = self.detect(name)?;
        if page.is_canonical() {
            return None;
        }
        let proposed = page.canonical_name();
        (proposed != name).then_some((proposed, page.convention))
    }
}

fn detect_separated(name: &str) -> Option<DoublePage> {
    let caps = SEPARATED.captures(name)?;
    let first = &caps["first"];
    let second = &caps["second"];

    let prefix = &caps["prefix"];
    let width = first.len();

    // `ch1_05` is more likely a chapter and a page than a spread
    if width != second.len() {
        return None;
    }
    let (first_page, second_page) = (first.parse::<u16>().ok()?, second.parse::<u16>().ok()?);
    if second_page <= first_page {
        return None;
    }

    // `012_013_014` is a run of pages, not a single spread
    let before_sep = prefix.strip_suffix(|c: char| SEPARATORS.contains(&c)).unwrap_or(prefix);
    let trailing_digits = before_sep.chars().rev().take_while(char::is_ascii_digit).count();
    if trailing_digits == width {
        return None;
    }

    // Short numbers like `ch01 02` or `Chapter 5_6` are usually chapter and
    // page. Only accept them as consecutive pages set off by a separator.
    if width < 3 {
        let set_off = prefix.is_empty()
            || prefix.ends_with(|c: char| SEPARATORS.contains(&c) && c != ' ');
        if !set_off || second_page != first_page + 1 {
            return None;
        }
    }

    Some(DoublePage {
        prefix: prefix.to_string(),
        first: first.to_string(),
        second: second.to_string(),
        separator: caps["sep"].chars().next(),
        extension: caps["ext"].to_string(),
        convention: Convention::Separated,
    })
}

fn detect_concatenated(name: &str) -> Option<DoublePage> {
    let caps = CONCATENATED.captures(name)?;
    let digits = &caps["digits"];
    let (first, second) = digits.split_at(digits.len() / 2);

    // Without a separator only consecutive pages are unambiguous
    if second.parse::<u16>().ok()? != first.parse::<u16>().ok()? + 1 {
        return None;
    }

    Some(DoublePage {
        prefix: caps["prefix"].to_string(),
        first: first.to_string(),
        second: second.to_string(),
        separator: None,
        extension: caps["ext"].to_string(),
        convention: Convention::Concatenated,
    })
}
