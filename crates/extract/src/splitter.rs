use regex::Regex;

/// Splits schema description text into one record per line.
///
/// Both a literal newline and the two-character escape `\n` count as record
/// boundaries, so text that survived JSON or shell quoting still splits.
pub struct LineSplitter {
    boundary: Regex,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self {
            boundary: Regex::new(r"(?i)\n|\\n").unwrap(),
        }
    }

    /// Segments are returned untrimmed; adjacent boundaries yield empty
    /// segments. Empty input yields no segments at all.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        self.boundary.split(text).map(str::to_string).collect()
    }
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new()
    }
}
