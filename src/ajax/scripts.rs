//! Script queue for one partial response.
//!
//! Three ordered lists, serialized as:
//!
//! ```text
//! prependJavascript = prepend
//! appendJavascript  = dom_ready ++ append
//! ```
//!
//! Nothing is deduplicated here. Script content dedup happens in the
//! contribution registry when scripts arrive through a header response.

use super::JavascriptEntry;

#[derive(Debug, Default)]
pub struct ScriptQueue {
    prepend: Vec<JavascriptEntry>,
    dom_ready: Vec<JavascriptEntry>,
    append: Vec<JavascriptEntry>,
}

impl ScriptQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a script evaluated before any region is replaced.
    pub fn prepend(&mut self, code: impl Into<String>, is_async: bool) {
        self.prepend.push(entry(code, is_async));
    }

    /// Queue a script evaluated after regions are replaced.
    pub fn append(&mut self, code: impl Into<String>, is_async: bool) {
        self.append.push(entry(code, is_async));
    }

    /// Queue a dom-ready script. Always sync, and always ahead of `append`.
    pub fn dom_ready(&mut self, code: impl Into<String>) {
        self.dom_ready.push(JavascriptEntry::sync(code));
    }

    pub fn prepend_entries(&self) -> &[JavascriptEntry] {
        &self.prepend
    }

    /// Dom-ready entries followed by appended entries, each in insertion order.
    pub fn append_entries(&self) -> impl Iterator<Item = &JavascriptEntry> {
        self.dom_ready.iter().chain(&self.append)
    }

    pub fn len(&self) -> usize {
        self.prepend.len() + self.dom_ready.len() + self.append.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn entry(code: impl Into<String>, is_async: bool) -> JavascriptEntry {
    if is_async {
        JavascriptEntry::with_async(code)
    } else {
        JavascriptEntry::sync(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes<'a>(entries: impl IntoIterator<Item = &'a JavascriptEntry>) -> Vec<&'a str> {
        entries.into_iter().map(JavascriptEntry::javascript).collect()
    }

    #[test]
    fn test_script_ordering() {
        let mut queue = ScriptQueue::new();
        queue.append("A1", false);
        queue.prepend("P1", false);
        queue.dom_ready("R1");
        queue.prepend("P2", true);

        assert_eq!(codes(queue.prepend_entries()), ["P1", "P2"]);
        assert_eq!(codes(queue.append_entries()), ["R1", "A1"]);
        assert!(queue.prepend_entries()[1].is_async());
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn test_no_dedup_in_queue() {
        let mut queue = ScriptQueue::new();
        queue.append("init()", false);
        queue.append("init()", false);
        queue.dom_ready("ready()");
        queue.dom_ready("ready()");

        assert_eq!(codes(queue.append_entries()), ["ready()", "ready()", "init()", "init()"]);
    }

    #[test]
    fn test_dom_ready_is_never_async() {
        let mut queue = ScriptQueue::new();
        queue.dom_ready("x()");
        assert!(queue.append_entries().all(|e| !e.is_async()));
    }
}
