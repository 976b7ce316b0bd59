//! Log sanitization for patient identifiers.
//!
//! Formatted log lines pass through [`SanitizingMakeWriter`], which redacts:
//! - Patient identifiers given as `patient_id=...` or `patient: ...`
//! - UUIDs
//! - Medical record numbers (MRNs)
//! - E-mail addresses and phone numbers
//! - Dates of birth given as `dob=...`
//!
//! The engine never logs identifiers itself; this catches values that reach a
//! log line through callers or error messages.
//!
//! Input is capped at `NEPHRA_SANITIZE_MAX_BYTES` per call (default 16 KiB).

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<Option<RedactionPatterns>> = OnceLock::new();

const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

const RULES: [(&str, &str); 6] = [
    (
        r"(?i)\bpatient(?:[_-]?id)?\s*[:=]\s*[A-Za-z0-9._-]+",
        "patient_id=[REDACTED-PATIENT]",
    ),
    (
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        "[REDACTED-UUID]",
    ),
    (r"(?i)\bMRN[:\s]?\d{6,10}\b", "[REDACTED-MRN]"),
    (
        r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
        "[REDACTED-EMAIL]",
    ),
    (
        r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s][0-9]{3}[-.\s][0-9]{4}\b",
        "[REDACTED-PHONE]",
    ),
    (
        r"(?i)\b(?:dob|date[_ ]of[_ ]birth)\s*[:=]\s*\d{4}-\d{2}-\d{2}",
        "dob=[REDACTED-DOB]",
    ),
];

struct RedactionPatterns {
    set: RegexSet,
    rules: Vec<(Regex, &'static str)>,
}

fn compile() -> Option<RedactionPatterns> {
    let set = RegexSet::new(RULES.iter().map(|(p, _)| *p)).ok()?;
    let rules = RULES
        .iter()
        .map(|(p, r)| Regex::new(p).map(|re| (re, *r)))
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    Some(RedactionPatterns { set, rules })
}

fn patterns() -> Option<&'static RedactionPatterns> {
    PATTERNS.get_or_init(compile).as_ref()
}

fn max_sanitize_bytes() -> usize {
    std::env::var("NEPHRA_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Redact patient identifiers from a string.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = match patterns() {
        Some(patterns) => {
            let mut out = prefix.to_string();
            for idx in patterns.set.matches(prefix).into_iter() {
                let (regex, replacement) = &patterns.rules[idx];
                out = regex.replace_all(&out, *replacement).into_owned();
            }
            out
        }
        // Without patterns nothing can be vetted; drop the text.
        None => "[REDACTED-UNVERIFIED]".to_string(),
    };

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// A `tracing_subscriber` writer wrapper that sanitizes each formatted line
/// before it reaches the underlying sink.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct SanitizingWriter<W: std::io::Write> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let sanitized = sanitize(&String::from_utf8_lossy(&line));
            self.inner.write_all(sanitized.as_bytes())?;
        }
        Ok(())
    }

    fn flush_remainder(&mut self) -> std::io::Result<()> {
        if !self.buffer.is_empty() {
            let sanitized = sanitize(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(sanitized.as_bytes())?;
            self.buffer.clear();
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // Bound buffering when a formatter writes a huge line with no newline.
        if self.buffer.len() > max_sanitize_bytes().saturating_mul(2) {
            self.flush_remainder()?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        self.flush_remainder()?;
        self.inner.flush()
    }
}

impl<W: std::io::Write> Drop for SanitizingWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush_remainder();
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sanitize_patient_id() {
        let sanitized = sanitize("Loaded history for patient_id=abc-123 (5 entries)");
        assert!(sanitized.contains("[REDACTED-PATIENT]"));
        assert!(!sanitized.contains("abc-123"));
        assert!(sanitized.contains("(5 entries)"));
    }

    #[test]
    fn test_sanitize_uuid() {
        let sanitized = sanitize("Record 550e8400-e29b-41d4-a716-446655440000 stored");
        assert!(sanitized.contains("[REDACTED-UUID]"));
        assert!(!sanitized.contains("550e8400"));
    }

    #[test]
    fn test_sanitize_mrn_email_phone_dob() {
        assert!(sanitize("MRN:12345678 found").contains("[REDACTED-MRN]"));
        assert!(sanitize("Contact: patient@hospital.com").contains("[REDACTED-EMAIL]"));
        assert!(sanitize("Call 555-123-4567").contains("[REDACTED-PHONE]"));
        assert!(sanitize("dob=1967-03-14").contains("[REDACTED-DOB]"));
    }

    #[test]
    fn test_clinical_values_untouched() {
        let line = "Estimated GFR 58.75 via symptom_vital_based (confidence moderate), stage G3a";
        assert_eq!(sanitize(line), line);
        assert!(sanitize("patient: abc").contains("[REDACTED-PATIENT]"));
    }

    #[test]
    fn test_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("prefix patient_id=abcdef suffix", 10);
        assert!(sanitized.ends_with("[TRUNCATED]"));
    }

    #[test]
    fn test_writer_sanitizes_lines() {
        let mut sink = Vec::new();
        {
            let mut writer = SanitizingWriter::new(&mut sink);
            writer
                .write_all(b"first line patient_id=p-42\nsecond ")
                .expect("Should write");
            writer.write_all(b"line\n").expect("Should write");
            writer.flush().expect("Should flush");
        }
        let out = String::from_utf8(sink).expect("Should be UTF-8");
        assert_eq!(
            out,
            "first line patient_id=[REDACTED-PATIENT]\nsecond line\n"
        );
    }
}
