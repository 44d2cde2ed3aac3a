//! Swappable response stream.

use std::fmt;

/// Text sink all rendering writes to.
///
/// The active sink can be swapped for another one, which is how isolated
/// rendering captures a single fragment without touching the primary output.
#[derive(Debug, Default)]
pub struct ResponseStream {
    sink: String,
}

impl ResponseStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text to the active sink.
    #[inline]
    pub fn write(&mut self, text: &str) {
        self.sink.push_str(text);
    }

    /// Contents of the active sink.
    pub fn current(&self) -> &str {
        &self.sink
    }

    /// Install `sink` as the active sink, returning the previous one.
    pub fn set_sink(&mut self, sink: String) -> String {
        std::mem::replace(&mut self.sink, sink)
    }

    pub fn into_inner(self) -> String {
        self.sink
    }
}

impl fmt::Write for ResponseStream {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn test_swap_sink() {
        let mut stream = ResponseStream::new();
        stream.write("<html>");

        let primary = stream.set_sink(String::new());
        write!(stream, "<div id=\"{}\"></div>", "a").unwrap();
        let fragment = stream.set_sink(primary);

        assert_eq!(fragment, "<div id=\"a\"></div>");
        assert_eq!(stream.current(), "<html>");
    }
}
