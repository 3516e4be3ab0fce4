use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields, FormattedFields},
    prelude::*,
    registry::LookupSpan,
    EnvFilter, Layer,
};

/// Log target for per-account session outcomes and the account span.
/// Always shown on the console.
pub const SESSION_TARGET: &str = "session_result";

/// Console filter used when `RUST_LOG` is unset.
pub const DEFAULT_CONSOLE_FILTER: &str = "warn,session_result=info";

/// Installs the global subscriber: colored console output plus an hourly
/// rolling file under `logs/`.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the lifetime of the process.
pub fn setup_logger() -> Option<WorkerGuard> {
    // Create logs directory
    std::fs::create_dir_all("logs").ok();

    let file_appender = tracing_appender::rolling::hourly("logs", "moonbix");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // File layer keeps everything from INFO up
    let file_filter = tracing_subscriber::filter::Targets::new().with_default(Level::INFO);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(file_filter);

    // Console: session results at INFO, everything else at WARN unless RUST_LOG says otherwise
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(console_filter);

    let installed = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init();

    if let Err(e) = installed {
        eprintln!("Logger already initialized: {}", e);
        return None;
    }

    // Return guard - MUST be kept alive by caller
    Some(guard)
}

/// Errors-only console logger used in quiet mode.
pub fn setup_quiet_logger() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::ERROR)
        .try_init();
}

// --- Formatters ---

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

fn event_message(event: &Event<'_>) -> String {
    let mut visitor = MessageVisitor {
        message: String::new(),
    };
    event.record(&mut visitor);
    visitor.message
}

/// Writes `[account{idx=3}]`-style prefixes for every span the event sits in.
fn write_scope<S, N>(ctx: &FmtContext<'_, S, N>, writer: &mut Writer<'_>) -> fmt::Result
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    if let Some(scope) = ctx.event_scope() {
        for span in scope.from_root() {
            let ext = span.extensions();
            match ext.get::<FormattedFields<N>>() {
                Some(fields) if !fields.is_empty() => {
                    write!(writer, "[{}{{{}}}] ", span.name(), fields)?
                }
                _ => write!(writer, "[{}] ", span.name())?,
            }
        }
    }
    Ok(())
}

pub struct TerminalFormatter;

impl<S, N> FormatEvent<S, N> for TerminalFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let level = *event.metadata().level();
        let level_style = match level {
            Level::ERROR => Style::new().fg(Color::LightRed).bold(),
            Level::WARN => Style::new().fg(Color::Yellow).bold(),
            Level::INFO => Style::new().fg(Color::LightGreen),
            _ => Style::new().fg(Color::DarkGray),
        };

        let timestamp = Local::now().format("%H:%M:%S");
        write!(
            writer,
            "{} | {} | ",
            Style::new().dimmed().paint(timestamp.to_string()),
            level_style.paint(level.as_str())
        )?;
        write_scope(ctx, &mut writer)?;

        let msg = event_message(event);
        let green_text = Style::new().fg(Color::LightGreen).bold();
        let red_text = Style::new().fg(Color::LightRed).bold();
        let colored_msg = if msg.contains("successfully") {
            msg.replace("successfully", &green_text.paint("successfully").to_string())
        } else if msg.contains("failed") || msg.contains("Failed") {
            msg.replace("failed", &red_text.paint("failed").to_string())
                .replace("Failed", &red_text.paint("Failed").to_string())
        } else {
            msg
        };

        writeln!(writer, "{}", colored_msg)
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
        let level = event.metadata().level();

        write!(writer, "{} | {} | ", timestamp, level)?;
        write_scope(ctx, &mut writer)?;
        writeln!(writer, "{}", event_message(event))
    }
}
