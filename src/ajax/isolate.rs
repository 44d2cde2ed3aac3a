//! Isolated rendering into a private buffer.

use crate::core::ResponseStream;

/// Render into a fresh buffer and return its contents.
///
/// The stream's active sink is swapped for an empty buffer while `render`
/// runs and put back afterwards, on every exit path: normal return, an
/// error from `render`, or a panic unwinding through it.
pub fn render_to_buffer<F, E>(stream: &mut ResponseStream, render: F) -> Result<String, E>
where
    F: FnOnce(&mut ResponseStream) -> Result<(), E>,
{
    let guard = SinkGuard::swap(stream);
    render(&mut *guard.stream)?;
    Ok(guard.finish())
}

/// Restores the original sink when dropped.
struct SinkGuard<'a> {
    stream: &'a mut ResponseStream,
    original: Option<String>,
}

impl<'a> SinkGuard<'a> {
    fn swap(stream: &'a mut ResponseStream) -> Self {
        let original = stream.set_sink(String::new());
        Self {
            stream,
            original: Some(original),
        }
    }

    /// Restore the original sink and hand back the captured buffer.
    fn finish(mut self) -> String {
        match self.original.take() {
            Some(original) => self.stream.set_sink(original),
            None => String::new(),
        }
    }
}

impl Drop for SinkGuard<'_> {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            self.stream.set_sink(original);
        }
    }
}
