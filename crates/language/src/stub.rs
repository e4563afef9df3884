//! Text helpers for writing test stubs

/// Line-oriented writer with indentation tracking
#[derive(Debug, Clone)]
pub struct StubWriter {
    buffer: String,
    indent: usize,
    unit: &'static str,
}

impl Default for StubWriter {
    fn default() -> Self {
        Self::new("    ")
    }
}

impl StubWriter {
    /// Create a writer that indents with `unit`
    pub fn new(unit: &'static str) -> Self {
        Self {
            buffer: String::new(),
            indent: 0,
            unit,
        }
    }

    /// Write one line at the current indentation
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if text.is_empty() {
            self.buffer.push('\n');
            return self;
        }
        for _ in 0..self.indent {
            self.buffer.push_str(self.unit);
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
        self
    }

    /// Write an empty line
    pub fn blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    /// Write an empty line unless the buffer is empty or already ends with one
    pub fn separate(&mut self) -> &mut Self {
        if !self.buffer.is_empty() && !self.buffer.ends_with("\n\n") {
            self.buffer.push('\n');
        }
        self
    }

    pub fn indent(&mut self) -> &mut Self {
        self.indent += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        self
    }

    /// Write `open`, run `body` one level deeper, then write `close`
    pub fn block<F>(&mut self, open: impl AsRef<str>, close: impl AsRef<str>, body: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        self.line(open);
        self.indent();
        body(self);
        self.dedent();
        self.line(close)
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

/// Convert an identifier to snake_case
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.map(|n| n.is_lowercase()).unwrap_or(false),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if c == '-' || c == ' ' {
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert an identifier to PascalCase
pub fn pascal_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c == ' ')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_indentation() {
        let mut writer = StubWriter::new("  ");
        writer.block("describe('x', () => {", "});", |w| {
            w.line("test('y', () => {});");
            w.blank();
            w.line("");
        });
        assert_eq!(
            writer.finish(),
            "describe('x', () => {\n  test('y', () => {});\n\n\n});\n"
        );
    }

    #[test]
    fn test_writer_separate() {
        let mut writer = StubWriter::default();
        writer.separate();
        writer.line("a");
        writer.separate();
        writer.separate();
        writer.line("b");
        assert_eq!(writer.finish(), "a\n\nb\n");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("parseHTTPRequest"), "parse_http_request");
        assert_eq!(snake_case("Calculator"), "calculator");
        assert_eq!(snake_case("already_snake"), "already_snake");
        assert_eq!(snake_case("add2Numbers"), "add2_numbers");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("get_user"), "GetUser");
        assert_eq!(pascal_case("add"), "Add");
        assert_eq!(pascal_case("camelCase"), "CamelCase");
    }
}
