use std::{path::Path, time::Duration};

pub mod api;
pub mod config;
pub mod error;
pub mod logos;
pub mod record;
pub mod tenant;

///
/// Provide a consistent formatting for durations and rates.
///
/// The format_duration will show micro and nano seconds but we typically only need to see ms.
///
pub fn formatted_duration_rate(amount: usize, elapsed: Duration) -> (String, String) {
    let duration = Duration::new(elapsed.as_secs(), elapsed.subsec_millis() * 1000000); // Keep precision to ms.
    let rate = match amount {
        0 => 0.0,
        _ => elapsed.as_millis() as f64 / amount as f64,
    };
    (
        humantime::format_duration(duration).to_string(),
        format!("{:.3}ms", rate)
    )
}

///
/// Returns a canonicalised path if possible, otherwise the path as given.
///
pub trait ToCanonicalString {
    fn to_canonical_string(&self) -> String;
}

impl ToCanonicalString for Path {
    fn to_canonical_string(&self) -> String {
        match self.canonicalize() {
            Ok(path) => path.to_string_lossy().into(),
            Err(_) => self.to_string_lossy().into(),
        }
    }
}

///
/// Highlight some log output with ansi colour codes.
///
pub fn blue(msg: &str) -> ansi_term::ANSIGenericString<'_, str> {
    ansi_term::Colour::RGB(70, 130, 180).paint(msg)
}
