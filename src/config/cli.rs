use crate::domain::ports::OutputSink;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::io::Write;

/// Prints each emitted body to stdout as JSON.
#[derive(Debug, Clone, Default)]
pub struct StdoutSink {
    pretty: bool,
}

impl StdoutSink {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

#[async_trait]
impl OutputSink for StdoutSink {
    async fn emit(&self, label: &str, body: &serde_json::Value) -> Result<()> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(body)?
        } else {
            serde_json::to_string(body)?
        };

        tracing::debug!("🖨️ printing body of {} ({} bytes)", label, rendered.len());

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", rendered)?;
        handle.flush()?;
        Ok(())
    }
}
