use std::fmt::Write as _;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use wasm_bindgen::JsValue;

/// Forwards `tracing` events to the browser console.
pub struct ConsoleLayer;

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut line = EventLine::default();
        event.record(&mut line);
        let text = line.finish(metadata.target());
        let value = JsValue::from(text);
        match *metadata.level() {
            Level::ERROR => web_sys::console::error_1(&value),
            Level::WARN => web_sys::console::warn_1(&value),
            Level::INFO => web_sys::console::info_1(&value),
            _ => web_sys::console::debug_1(&value),
        }
    }
}

/// Install the console layer as the global subscriber. Later calls are
/// ignored.
pub fn init() {
    let subscriber = Registry::default().with(ConsoleLayer);
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// `target: message key=value ...`
#[derive(Default)]
struct EventLine {
    message: String,
    fields: String,
}

impl EventLine {
    fn finish(self, target: &str) -> String {
        format!("{target}: {}{}", self.message, self.fields)
    }
}

impl Visit for EventLine {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EventLine;

    #[test]
    fn line_puts_message_before_fields() {
        let line = EventLine {
            message: "dropping region transform row".to_string(),
            fields: " line=4".to_string(),
        };
        assert_eq!(
            line.finish("nrftw_map_shared::converter"),
            "nrftw_map_shared::converter: dropping region transform row line=4"
        );
    }
}
