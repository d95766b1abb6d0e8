//! Indented output stream for declaration text

/// Indentation unit: four spaces per nesting level
pub const INDENT: &str = "    ";

/// Line-oriented writer that tracks the current nesting level
///
/// Declaration nodes render at whatever level the writer is at; level 0 is
/// global scope.
#[derive(Debug, Default)]
pub struct DtsWriter {
    buf: String,
    level: usize,
}

impl DtsWriter {
    /// Create an empty writer at global scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Increase nesting by one level
    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// Decrease nesting by one level
    pub fn unindent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Current nesting level
    pub fn level(&self) -> usize {
        self.level
    }

    /// Whether output currently lands at global scope
    pub fn is_top_level(&self) -> bool {
        self.level == 0
    }

    /// Write one line at the current indentation; empty lines stay empty
    pub fn writeln(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if !line.is_empty() {
            for _ in 0..self.level {
                self.buf.push_str(INDENT);
            }
            self.buf.push_str(line);
        }
        self.buf.push('\n');
    }

    /// Write multi-line text, indenting every line
    pub fn write_lines(&mut self, text: &str) {
        for line in text.lines() {
            self.writeln(line.trim_end());
        }
    }

    /// Write a `/** ... */` block; nothing is written for no lines
    pub fn doc_comment(&mut self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        self.writeln("/**");
        for line in lines {
            // A stray terminator would close the comment early
            let line = line.replace("*/", "*\\/");
            if line.is_empty() {
                self.writeln(" *");
            } else {
                self.writeln(format!(" * {}", line));
            }
        }
        self.writeln(" */");
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Text written so far
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consume the writer, returning the text
    pub fn finish(self) -> String {
        self.buf
    }
}
