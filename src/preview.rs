//! Live HTML preview of a Markdown response that is still streaming in
//!
//! [`StreamingPreview`] accumulates chunks and re-renders the whole buffer
//! with [`MarkdownGenerator`], at most once per
//! [`PreviewOptions::min_interval`]. The generator accepts truncated
//! Markdown, so every intermediate render is valid HTML. [`finish`] always
//! renders the final buffer.
//!
//! [`finish`]: StreamingPreview::finish

use std::time::{Duration, Instant};

use crate::generator::{GeneratorOptions, MarkdownGenerator};

/// Preview throttling
#[derive(Debug, Clone)]
pub struct PreviewOptions {
    /// Minimum time between two renders
    pub min_interval: Duration,
    pub generator: GeneratorOptions,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(50),
            generator: GeneratorOptions::default(),
        }
    }
}

#[derive(Debug)]
pub struct StreamingPreview {
    generator: MarkdownGenerator,
    min_interval: Duration,
    buffer: String,
    last_render: Option<Instant>,
    renders: usize,
}

impl StreamingPreview {
    pub fn new(options: PreviewOptions) -> Self {
        Self {
            generator: MarkdownGenerator::new(options.generator),
            min_interval: options.min_interval,
            buffer: String::new(),
            last_render: None,
            renders: 0,
        }
    }

    /// Append a chunk, rendering when the interval has elapsed
    pub fn push(&mut self, chunk: &str) -> Option<String> {
        self.push_at(chunk, Instant::now())
    }

    /// [`push`](Self::push) with an explicit clock reading
    pub fn push_at(&mut self, chunk: &str, now: Instant) -> Option<String> {
        self.buffer.push_str(chunk);

        let due = self
            .last_render
            .is_none_or(|last| now.saturating_duration_since(last) >= self.min_interval);
        if !due {
            return None;
        }

        self.last_render = Some(now);
        self.renders += 1;
        Some(self.render())
    }

    /// Render the current buffer without touching the throttle
    pub fn render(&self) -> String {
        self.generator.generate(&self.buffer)
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Number of throttled renders so far
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Render the complete buffer, for persisting
    pub fn finish(self) -> String {
        tracing::debug!(
            len = self.buffer.len(),
            renders = self.renders,
            "streaming preview finished"
        );
        self.generator.generate(&self.buffer)
    }
}

impl Default for StreamingPreview {
    fn default() -> Self {
        Self::new(PreviewOptions::default())
    }
}
