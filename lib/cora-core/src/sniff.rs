//! Content-type sniffing.
//!
//! Implements the byte-pattern part of the WHATWG MIME sniffing algorithm:
//! at most the first [`SNIFF_LEN`] bytes are inspected and the first matching
//! signature wins. Data that matches nothing is reported as UTF-8 text when it
//! contains no binary control bytes, and as `application/octet-stream`
//! otherwise.

/// Number of leading bytes considered by [`detect_content_type`].
pub const SNIFF_LEN: usize = 512;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";

const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

const PREFIXES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"\xFE\xFF", "text/plain; charset=utf-16be"),
    (b"\xFF\xFE", "text/plain; charset=utf-16le"),
    (b"\xEF\xBB\xBF", TEXT_PLAIN),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"\x00\x00\x02\x00", "image/x-icon"),
    (b"BM", "image/bmp"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b".snd", "audio/basic"),
    (b"FORM", "audio/aiff"),
    (b"ID3", "audio/mpeg"),
    (b"OggS\x00", "application/ogg"),
    (b"MThd\x00\x00\x00\x06", "audio/midi"),
    (b"\x1A\x45\xDF\xA3", "video/webm"),
    (b"\x1F\x8B\x08", "application/x-gzip"),
    (b"PK\x03\x04", "application/zip"),
    (b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    (b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    (b"7z\xBC\xAF\x27\x1C", "application/x-7z-compressed"),
    (b"\x00asm", "application/wasm"),
    (b"wOFF", "font/woff"),
    (b"wOF2", "font/woff2"),
];

/// RIFF containers: the form type sits at offset 8.
const RIFF_FORMS: &[(&[u8], &str)] = &[
    (b"WEBPVP", "image/webp"),
    (b"WAVE", "audio/wave"),
    (b"AVI ", "video/avi"),
];

/// Detects the MIME type of `data`.
///
/// Always returns a valid MIME type, falling back to
/// `application/octet-stream`.
///
/// # Example
///
/// ```
/// use cora_core::detect_content_type;
///
/// assert_eq!(detect_content_type(b"\x89PNG\r\n\x1a\n...."), "image/png");
/// assert_eq!(detect_content_type(b"  <html><body>"), "text/html; charset=utf-8");
/// assert_eq!(detect_content_type(b"hello"), "text/plain; charset=utf-8");
/// assert_eq!(detect_content_type(&[0, 1, 2, 3]), "application/octet-stream");
/// ```
#[must_use]
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = data.get(..SNIFF_LEN).unwrap_or(data);

    let start = data
        .iter()
        .position(|b| !is_whitespace(*b))
        .unwrap_or(data.len());
    let trimmed = data.get(start..).unwrap_or_default();

    if HTML_TAGS.iter().any(|tag| matches_html_tag(trimmed, tag)) {
        return "text/html; charset=utf-8";
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }

    if let Some((_, mime)) = PREFIXES.iter().find(|(prefix, _)| data.starts_with(prefix)) {
        return *mime;
    }

    if let Some(mime) = riff_form(data) {
        return mime;
    }
    if is_mp4(data) {
        return "video/mp4";
    }

    if data.iter().any(|b| is_binary(*b)) {
        OCTET_STREAM
    } else {
        TEXT_PLAIN
    }
}

const fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | 0x0C | b'\r' | b' ')
}

const fn is_binary(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

/// Case-insensitive tag match, followed by a tag-terminating byte.
fn matches_html_tag(data: &[u8], tag: &[u8]) -> bool {
    let Some(head) = data.get(..tag.len()) else {
        return false;
    };
    head.eq_ignore_ascii_case(tag) && matches!(data.get(tag.len()), Some(b' ' | b'>'))
}

fn riff_form(data: &[u8]) -> Option<&'static str> {
    if !data.starts_with(b"RIFF") {
        return None;
    }
    let form = data.get(8..)?;
    RIFF_FORMS
        .iter()
        .find(|(tag, _)| form.starts_with(tag))
        .map(|(_, mime)| *mime)
}

/// ISO base media file with an `mp4` major or compatible brand.
fn is_mp4(data: &[u8]) -> bool {
    let Some(&[a, b, c, d]) = data.get(..4) else {
        return false;
    };
    let box_size = usize::try_from(u32::from_be_bytes([a, b, c, d])).unwrap_or(usize::MAX);
    if data.len() < 12 || data.len() < box_size || box_size % 4 != 0 {
        return false;
    }
    if data.get(4..8) != Some(&b"ftyp"[..]) {
        return false;
    }
    (8..box_size)
        .step_by(4)
        .filter(|offset| *offset != 12)
        .any(|offset| data.get(offset..offset + 3) == Some(&b"mp4"[..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_text() {
        assert_eq!(detect_content_type(b""), TEXT_PLAIN);
    }

    #[test]
    fn html_tags_are_case_insensitive() {
        assert_eq!(
            detect_content_type(b"<!doctype html><p>hi</p>"),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            detect_content_type(b"\n\t<BODY onload=x>"),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            detect_content_type(b"<!-- comment -->"),
            "text/html; charset=utf-8"
        );
    }

    #[test]
    fn html_tag_needs_terminator() {
        // `<br` must be followed by space or `>`
        assert_eq!(detect_content_type(b"<brand>"), TEXT_PLAIN);
    }

    #[test]
    fn xml_declaration() {
        assert_eq!(
            detect_content_type(b"<?xml version=\"1.0\"?><a/>"),
            "text/xml; charset=utf-8"
        );
    }

    #[test]
    fn magic_numbers() {
        assert_eq!(detect_content_type(b"%PDF-1.7"), "application/pdf");
        assert_eq!(detect_content_type(b"GIF89a\x01\x00"), "image/gif");
        assert_eq!(detect_content_type(b"\xFF\xD8\xFF\xE0"), "image/jpeg");
        assert_eq!(detect_content_type(b"PK\x03\x04rest"), "application/zip");
        assert_eq!(
            detect_content_type(b"\x1F\x8B\x08\x00\x00"),
            "application/x-gzip"
        );
        assert_eq!(detect_content_type(b"\x00asm\x01\x00\x00\x00"), "application/wasm");
        assert_eq!(detect_content_type(b"wOF2...."), "font/woff2");
    }

    #[test]
    fn byte_order_marks() {
        assert_eq!(
            detect_content_type(b"\xFE\xFF\x00h"),
            "text/plain; charset=utf-16be"
        );
        assert_eq!(detect_content_type(b"\xEF\xBB\xBFhello"), TEXT_PLAIN);
    }

    #[test]
    fn riff_containers() {
        assert_eq!(detect_content_type(b"RIFF\x00\x00\x00\x00WEBPVP8 "), "image/webp");
        assert_eq!(detect_content_type(b"RIFF\x24\x00\x00\x00WAVEfmt "), "audio/wave");
        assert_eq!(detect_content_type(b"RIFF\x00\x00"), OCTET_STREAM);
    }

    #[test]
    fn mp4_brand() {
        let data = b"\x00\x00\x00\x18ftypmp42\x00\x00\x00\x00isommp42";
        assert_eq!(detect_content_type(data), "video/mp4");

        let not_mp4 = b"\x00\x00\x00\x10ftypqt  \x00\x00\x00\x00";
        assert_eq!(detect_content_type(not_mp4), OCTET_STREAM);
    }

    #[test]
    fn text_versus_binary() {
        assert_eq!(detect_content_type(b"plain words\r\n"), TEXT_PLAIN);
        assert_eq!(detect_content_type(b"abc\x00def"), OCTET_STREAM);
    }

    #[test]
    fn only_leading_bytes_count() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0);
        assert_eq!(detect_content_type(&data), TEXT_PLAIN);
    }
}
