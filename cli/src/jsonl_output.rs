use anttask_core::EventSink;
use anttask_core::TaskEvent;
use tracing::error;

/// Writes one JSON object per event to stdout.
#[derive(Debug, Default)]
pub struct JsonlOutput;

impl JsonlOutput {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for JsonlOutput {
    #[allow(clippy::print_stdout)]
    fn on_event(&mut self, event: TaskEvent) {
        match serde_json::to_string(&event) {
            Ok(line) => {
                println!("{line}");
            }
            Err(e) => {
                error!("Failed to serialize event: {e:?}");
            }
        }
    }
}
