//! Log output: drains the RT and background streams into a text sink.
//!
//! Runs in the foreground, between controller ticks. The sink is the same
//! serial console the status line goes to.
//!
//! ```text
//! RT_LOG_STREAM ─┐
//!                ├─▶ LogDrain ─▶ TextSink (UART)
//! BG_LOG_STREAM ─┘
//! ```

use core::fmt::Write;

use crate::hal::TextSink;
use crate::logging::{BufWriter, LogEntry, LogStream, MAX_MSG_LEN};

/// Formatted line size: prefix + message + CRLF.
const LINE_LEN: usize = MAX_MSG_LEN + 32;

/// Format log entry to string.
///
/// Format: `[timestamp_us] LEVEL: message\r\n`
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    let mut writer = BufWriter { buf, pos: 0 };
    let _ = write!(
        writer,
        "[{:10}] {}: {}\r\n",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.text()
    );
    writer.pos
}

/// Drain state: when drops were last reported.
pub struct LogDrain {
    report_interval_us: i64,
    last_report_us: i64,
}

impl LogDrain {
    /// `report_interval_us`: minimum spacing of "Dropped" reports.
    pub const fn new(report_interval_us: i64) -> Self {
        Self {
            report_interval_us,
            last_report_us: 0,
        }
    }

    /// Drain both streams, RT first. Returns the number of entries written.
    pub fn drain<W: TextSink, const N: usize>(
        &mut self,
        rt: &LogStream<N>,
        bg: &LogStream<N>,
        sink: &mut W,
        now_us: i64,
    ) -> usize {
        let mut written = 0;
        let mut line = [0u8; LINE_LEN];

        for stream in [rt, bg] {
            while let Some(entry) = stream.drain() {
                let len = format_log_entry(&entry, &mut line);
                if let Ok(text) = core::str::from_utf8(&line[..len]) {
                    sink.write_line(text);
                }
                written += 1;
            }
        }

        if now_us - self.last_report_us >= self.report_interval_us {
            let rt_dropped = rt.take_dropped();
            let bg_dropped = bg.take_dropped();

            if rt_dropped > 0 || bg_dropped > 0 {
                let mut writer = BufWriter { buf: &mut line, pos: 0 };
                let _ = write!(writer, "[WARN] Dropped: RT={}, BG={}\r\n", rt_dropped, bg_dropped);
                let len = writer.pos;
                if let Ok(text) = core::str::from_utf8(&line[..len]) {
                    sink.write_line(text);
                }
            }

            self.last_report_us = now_us;
        }

        written
    }
}

impl Default for LogDrain {
    fn default() -> Self {
        // Report drops at most every 10 seconds
        Self::new(10_000_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    struct Lines(Vec<String>);

    impl TextSink for Lines {
        fn write_line(&mut self, line: &str) {
            self.0.push(line.to_string());
        }
    }

    #[test]
    fn test_format_log_entry() {
        let mut msg = [0u8; MAX_MSG_LEN];
        msg[..14].copy_from_slice(b"parked: 0.0 Hz");
        let entry = LogEntry {
            timestamp_us: 1234567,
            level: LogLevel::Info,
            len: 14,
            msg,
        };

        let mut buf = [0u8; LINE_LEN];
        let len = format_log_entry(&entry, &mut buf);

        let formatted = core::str::from_utf8(&buf[..len]).unwrap();
        assert_eq!(formatted, "[   1234567] INFO: parked: 0.0 Hz\r\n");
    }

    #[test]
    fn test_drain_rt_before_bg() {
        let rt = LogStream::<8>::new();
        let bg = LogStream::<8>::new();
        bg.push(1, LogLevel::Info, b"bg");
        rt.push(2, LogLevel::Warn, b"rt");

        let mut sink = Lines(Vec::new());
        let mut drain = LogDrain::new(i64::MAX);
        assert_eq!(drain.drain(&rt, &bg, &mut sink, 0), 2);

        assert!(sink.0[0].contains("WARN: rt"));
        assert!(sink.0[1].contains("INFO: bg"));
    }

    #[test]
    fn test_dropped_report() {
        let rt = LogStream::<2>::new();
        let bg = LogStream::<2>::new();
        for i in 0..3 {
            rt.push(i, LogLevel::Error, b"e");
        }

        let mut sink = Lines(Vec::new());
        let mut drain = LogDrain::new(1000);
        drain.drain(&rt, &bg, &mut sink, 5000);

        assert_eq!(sink.0.len(), 3);
        assert_eq!(sink.0[2], "[WARN] Dropped: RT=1, BG=0\r\n");
        assert_eq!(rt.dropped(), 0);
    }
}
