//! provides logging helpers

use std::fmt::{self};

use chrono::DateTime;
use chrono::Utc;
use chrono_tz::Tz;
use tracing::field::Field;
use tracing::field::Visit;
use tracing::Event;
use tracing::Subscriber;
use tracing_subscriber::fmt::format;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::FormatFields;
use tracing_subscriber::registry::LookupSpan;

/// `asctime`-style layout, e.g. `2024-05-01 14:03:07,512`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Renders `instant` as wall-clock time in `zone`.
pub fn format_timestamp(instant: DateTime<Utc>, zone: Tz) -> String {
    instant
        .with_timezone(&zone)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Event formatter producing `timestamp - LEVEL - message` lines with the
/// timestamp rendered in a fixed zone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedFormatter {
    zone: Tz,
}

impl ZonedFormatter {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }
}

#[derive(Default)]
struct FieldVisitor {
    msg: String,
    fields: String,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        if field.name() == "message" {
            self.msg.push_str(&value.to_string());
        } else {
            self.fields.push_str(&format!(" {}={}", field.name(), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, format_args!("{value}"));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format_args!("{value:?}"));
    }
}

impl<S, N> FormatEvent<S, N> for ZonedFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        writeln!(
            writer,
            "{} - {} - {}{}",
            format_timestamp(Utc::now(), self.zone),
            event.metadata().level(),
            visitor.msg,
            visitor.fields
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::sync::Mutex;

    use chrono::TimeZone;
    use similar_asserts::assert_eq;
    use tracing_subscriber::fmt;

    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn timestamp_is_rendered_in_configured_zone() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(
            format_timestamp(instant, chrono_tz::Asia::Taipei),
            "2024-01-01 08:00:00,000"
        );
        assert_eq!(
            format_timestamp(instant, chrono_tz::UTC),
            "2024-01-01 00:00:00,000"
        );
        assert_eq!(
            format_timestamp(instant, chrono_tz::America::New_York),
            "2023-12-31 19:00:00,000"
        );
    }

    #[test]
    fn timestamp_keeps_milliseconds() {
        let instant = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();

        assert_eq!(
            format_timestamp(instant, chrono_tz::UTC),
            "2023-11-14 22:13:20,123"
        );
    }

    #[test]
    fn formatter_writes_level_message_and_fields() {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = fmt()
            .event_format(ZonedFormatter::new(chrono_tz::UTC))
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("GPU 0: 25000 MiB free memory.");
            tracing::error!(attempt = 2, "Failed to fetch GPU data.");
        });

        let output = buffer.contents();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" - INFO - GPU 0: 25000 MiB free memory."));
        assert!(lines[1].ends_with(" - ERROR - Failed to fetch GPU data. attempt=2"));

        let timestamp = lines[0].split(" - ").next().unwrap();
        assert_eq!(timestamp.len(), "2024-01-01 00:00:00,000".len());
        assert_eq!(&timestamp[19..20], ",");
    }
}
