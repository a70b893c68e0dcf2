//! Wire messages of the log.io line protocol.
//!
//! Fields are joined with `|` and stream lists with `,`. Neither delimiter is
//! escaped: identities or text containing them produce ambiguous frames, and
//! the receiving server's parser depends on the format staying as it is.

use crate::layout::LINE_SEPARATOR;

/// `+node|<node>|<stream1>,<stream2>,...` terminated by the line separator.
pub fn encode_register<S: AsRef<str>>(node: &str, streams: &[S]) -> String {
    let mut message = format!("+node|{node}|");
    for (i, stream) in streams.iter().enumerate() {
        if i > 0 {
            message.push(',');
        }
        message.push_str(stream.as_ref());
    }
    message.push_str(LINE_SEPARATOR);
    message
}

/// `-node|<node>` terminated by the line separator.
pub fn encode_deregister(node: &str) -> String {
    format!("-node|{node}{LINE_SEPARATOR}")
}

/// `+log|<stream>|<node>|<severity>|<text>`.
///
/// No terminator is added; `text` is expected to carry its own.
pub fn encode_log_entry(node: &str, stream: &str, severity: &str, text: &str) -> String {
    format!(
        "+log|{stream}|{node}|{}|{text}",
        severity.to_lowercase()
    )
}
