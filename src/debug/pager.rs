use super::capture::LineSource;

/// lines in the log pane
pub const LOG_ROWS: usize = 16;

/// lines this long or longer get cut short
const TRUNCATE_AT: usize = 45;
/// characters kept from a cut line, before the ellipsis
const TRUNCATE_KEEP: usize = 42;
const ELLIPSIS: &str = "...";

/// The captured log plus a cursor naming the line at the bottom of the view.
///
/// Lines are only ever appended, so an index refers to the same line for the
/// whole session. The cursor stays within `0..=len-1` (0 when empty).
#[derive(Debug, Default)]
pub struct LogPager {
    lines: Vec<String>,
    cursor: usize,
}

impl LogPager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// the line stored at `index`, exactly as captured
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    fn last_index(&self) -> Option<usize> {
        self.lines.len().checked_sub(1)
    }

    /// Take at most one waiting line from `source` and append it. A view that
    /// was following the tail follows the new line; one scrolled back into
    /// history stays put.
    pub fn drain_pending(&mut self, source: &impl LineSource) {
        if let Some(line) = source.try_next() {
            self.push(line);
        }
    }

    /// append one line, with the same follow-the-tail rule as `drain_pending`
    pub fn push(&mut self, line: String) {
        let following = self.last_index() == Some(self.cursor);
        self.lines.push(line);
        if following {
            self.cursor += 1;
        }
    }

    /// Up to `LOG_ROWS` lines ending at the cursor, oldest first, with long
    /// lines cut down for display.
    pub fn visible_window(&self) -> Vec<String> {
        let start = self.cursor.saturating_sub(LOG_ROWS - 1);
        self.lines
            .iter()
            .skip(start)
            .take(LOG_ROWS)
            .map(|line| truncate(line))
            .collect()
    }

    /// Move the cursor by `delta` lines and clamp. A forward scroll never
    /// leaves the cursor inside the first screen.
    pub fn scroll(&mut self, delta: isize) {
        let mut pos = self.cursor as isize + delta;

        if pos < 0 {
            self.home();
            pos = 0;
        }
        if delta > 0 && pos < LOG_ROWS as isize {
            pos = LOG_ROWS as isize;
        }
        self.cursor = pos as usize;

        if self.last_index().map_or(true, |last| self.cursor > last) {
            self.end();
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.last_index().unwrap_or(0);
    }
}

fn truncate(line: &str) -> String {
    if line.chars().count() >= TRUNCATE_AT {
        let mut cut: String = line.chars().take(TRUNCATE_KEEP).collect();
        cut.push_str(ELLIPSIS);
        cut
    } else {
        line.to_string()
    }
}
