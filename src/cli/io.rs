//! JSON I/O handling for CLI
//!
//! - Input: one JSON object per stdin line
//! - Output: one JSON object per stdout line
//! - UTF-8 only

use std::io::{BufRead, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read JSON requests, one per non-blank line.
///
/// Each item is either the parsed value or the reason the line was rejected;
/// a bad line does not end the stream.
pub fn read_requests<R: BufRead>(reader: R) -> impl Iterator<Item = CliResult<Value>> {
    reader
        .lines()
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|line| {
            let line = line.map_err(CliError::from)?;
            serde_json::from_str(&line)
                .map_err(|e| CliError::invalid_request(format!("Invalid JSON: {}", e)))
        })
}

/// Write a success response
pub fn write_response<W: Write>(writer: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *writer, &response)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

/// Write an error response
pub fn write_error<W: Write>(writer: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    serde_json::to_writer(&mut *writer, &response)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_requests_skips_blank_lines() {
        let input = Cursor::new("{\"name\":\"findUser\"}\n\n   \n{bad\n");
        let items: Vec<_> = read_requests(input).collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap()["name"], "findUser");
        assert_eq!(
            items[1].as_ref().unwrap_err().code_str(),
            "RWSPLIT_CLI_INVALID_REQUEST"
        );
    }

    #[test]
    fn test_write_response_and_error() {
        let mut out = Vec::new();
        write_response(&mut out, serde_json::json!({"endpoint": "primary"})).unwrap();
        write_error(&mut out, "RWSPLIT_CLI_INVALID_REQUEST", "bad").unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["status"], "ok");
        assert_eq!(lines[0]["data"]["endpoint"], "primary");
        assert_eq!(lines[1]["status"], "error");
        assert_eq!(lines[1]["code"], "RWSPLIT_CLI_INVALID_REQUEST");
    }
}
