use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use model::GridCoord;

/// Write-only display for the per-update usage line.
pub trait DebugSink {
    fn log(&mut self, line: &str);
}

/// Forwards usage lines to `tracing` under the `tiles::debug` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDebugSink;

impl DebugSink for TracingDebugSink {
    fn log(&mut self, line: &str) {
        tracing::debug!(target: "tiles::debug", "{line}");
    }
}

/// Keeps every line in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryDebugSink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl MemoryDebugSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.lines.borrow().last().cloned()
    }
}

impl DebugSink for MemoryDebugSink {
    fn log(&mut self, line: &str) {
        self.lines.borrow_mut().push(line.to_owned());
    }
}

/// One window cell as seen by the last update pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellDump {
    pub column: usize,
    pub row: usize,
    pub grid: GridCoord,
    pub position: (f32, f32),
    pub visible: bool,
}

impl fmt::Display for CellDump {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{},{} ({}, {}) visible={}",
            self.column, self.row, self.position.0, self.position.1, self.visible
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing::Level;

    use super::*;

    #[derive(Clone, Default)]
    struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedOutput {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("output lock").extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn log_with_max_level(level: Level, line: &str) -> String {
        let output = CapturedOutput::default();
        let writer = output.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || TracingDebugSink.log(line));
        let bytes = output.0.lock().expect("output lock").clone();
        String::from_utf8(bytes).expect("utf-8 log output")
    }

    #[test]
    fn tracing_sink_emits_debug_events_under_its_target() {
        let output = log_with_max_level(Level::DEBUG, "3 tiles with 18 empty using 12 slots");
        assert!(output.contains("DEBUG"), "{output}");
        assert!(output.contains("tiles::debug"), "{output}");
        assert!(output.contains("3 tiles with 18 empty using 12 slots"), "{output}");
    }

    #[test]
    fn tracing_sink_is_silent_at_info() {
        assert_eq!(log_with_max_level(Level::INFO, "12 tiles with 0 empty using 12 slots"), "");
    }

    #[test]
    fn memory_sink_clones_share_lines() {
        let sink = MemoryDebugSink::new();
        let mut writer = sink.clone();
        writer.log("first");
        writer.log("second");

        assert_eq!(sink.lines(), vec!["first", "second"]);
        assert_eq!(sink.last().as_deref(), Some("second"));
    }

    #[test]
    fn cell_dump_formats_column_row_position_and_visibility() {
        let cell = CellDump {
            column: 1,
            row: 2,
            grid: GridCoord::new(10, 4),
            position: (320.0, 128.0),
            visible: true,
        };
        assert_eq!(cell.to_string(), "1,2 (320, 128) visible=true");
    }
}
