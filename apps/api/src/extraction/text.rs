use std::sync::OnceLock;

use regex::Regex;

/// Extracts plain text from an uploaded resume artifact based on its
/// filename extension. `.pdf` goes through pdf-extract, `.txt` is read
/// directly; anything else gets a lossy decode with binary noise scrubbed.
/// Unparseable content yields an empty string, never an error.
pub fn extract_text(filename: &str, bytes: &[u8]) -> String {
    let ext = filename
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => pdf_extract::extract_text_from_mem(bytes)
            .map(|t| t.trim().to_string())
            .unwrap_or_default(),
        "txt" => String::from_utf8_lossy(bytes).into_owned(),
        _ => scrub_binary(&String::from_utf8_lossy(bytes)),
    }
}

fn non_printable() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\x20-\x7E\n\r\t]").expect("non-printable pattern"))
}

/// Replaces non-printable bytes left over from a lossy decode with spaces.
fn scrub_binary(text: &str) -> String {
    non_printable().replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_passthrough() {
        let text = extract_text("resume.txt", b"Skills: Python, SQL\n");
        assert_eq!(text, "Skills: Python, SQL\n");
    }

    #[test]
    fn test_invalid_pdf_yields_empty() {
        assert_eq!(extract_text("resume.pdf", b"not actually a pdf"), "");
    }

    #[test]
    fn test_unknown_extension_scrubs_binary_noise() {
        let bytes = b"\x01\x02Java developer\x00 with React\x7f";
        let text = extract_text("resume.docx", bytes);
        assert!(text.contains("Java developer"));
        assert!(text.contains("with React"));
        assert!(!text.contains('\u{0}'));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let text = extract_text("RESUME.TXT", b"plain text");
        assert_eq!(text, "plain text");
    }
}
