pub mod config;
pub mod plan;
pub mod session;

use serde::Serialize;
use std::io::{self, Write};

/// Write one JSON document per line (or pretty-printed) to `out`.
///
/// Write failures such as a closed pipe come back as errors instead of
/// panicking the way `println!` does.
pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T, pretty: bool) -> io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    out.flush()
}

/// [`write_json`] to stdout.
pub fn emit<T: Serialize>(value: &T, pretty: bool) -> io::Result<()> {
    write_json(&mut io::stdout().lock(), value, pretty)
}
