use anstyle::{AnsiColor, Style};
use http::{HeaderMap, StatusCode};
use tracing::info;

const OK_STYLE: Style = AnsiColor::Green.on_default().bold();
const ERROR_STYLE: Style = AnsiColor::Red.on_default().bold();

/// Logs every header, one event per value.
pub(crate) fn print_headers(headers: &HeaderMap) {
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        info!("{name}: {value}");
    }
}

/// Logs the response status line, green for `200 OK`, red otherwise.
pub(crate) fn print_status(status: StatusCode) {
    info!("Response");
    info!("{}", status_line(status));
}

pub(crate) fn status_line(status: StatusCode) -> String {
    let style = if status == StatusCode::OK {
        OK_STYLE
    } else {
        ERROR_STYLE
    };
    format!("{style}Status: {}{style:#}", status.as_u16())
}
