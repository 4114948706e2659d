//! Content-type detection for response bodies that do not declare one.
//!
//! Follows the WHATWG MIME sniffing signatures: at most the first 512 bytes
//! are considered and the first matching signature wins.

const SNIFF_LEN: usize = 512;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";

/// Tags that mark an HTML document when followed by a space or `>`.
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

struct Signature {
    pattern: &'static [u8],
    /// Bytes of `pattern` to compare; `0x00` entries are wildcards.
    mask: Option<&'static [u8]>,
    skip_whitespace: bool,
    mime: &'static str,
}

const fn exact(pattern: &'static [u8], mime: &'static str) -> Signature {
    Signature {
        pattern,
        mask: None,
        skip_whitespace: false,
        mime,
    }
}

const fn masked(pattern: &'static [u8], mask: &'static [u8], mime: &'static str) -> Signature {
    Signature {
        pattern,
        mask: Some(mask),
        skip_whitespace: false,
        mime,
    }
}

const SIGNATURES: &[Signature] = &[
    Signature {
        pattern: b"<?xml",
        mask: None,
        skip_whitespace: true,
        mime: "text/xml; charset=utf-8",
    },
    exact(b"%PDF-", "application/pdf"),
    exact(b"%!PS-Adobe-", "application/postscript"),
    exact(b"\xFE\xFF", "text/plain; charset=utf-16be"),
    exact(b"\xFF\xFE", "text/plain; charset=utf-16le"),
    exact(b"\xEF\xBB\xBF", TEXT_PLAIN),
    exact(b"\x00\x00\x01\x00", "image/x-icon"),
    exact(b"\x00\x00\x02\x00", "image/x-icon"),
    exact(b"BM", "image/bmp"),
    exact(b"GIF87a", "image/gif"),
    exact(b"GIF89a", "image/gif"),
    masked(
        b"RIFF\x00\x00\x00\x00WEBPVP",
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
        "image/webp",
    ),
    exact(b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    exact(b"\xFF\xD8\xFF", "image/jpeg"),
    masked(
        b"FORM\x00\x00\x00\x00AIFF",
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        "audio/aiff",
    ),
    exact(b"ID3", "audio/mpeg"),
    exact(b"OggS\x00", "application/ogg"),
    exact(b"MThd\x00\x00\x00\x06", "audio/midi"),
    masked(
        b"RIFF\x00\x00\x00\x00AVI ",
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        "video/avi",
    ),
    masked(
        b"RIFF\x00\x00\x00\x00WAVE",
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        "audio/wave",
    ),
    exact(b"\x1A\x45\xDF\xA3", "video/webm"),
    exact(b"\x00\x01\x00\x00", "font/ttf"),
    exact(b"OTTO", "font/otf"),
    exact(b"ttcf", "font/collection"),
    exact(b"wOFF", "font/woff"),
    exact(b"wOF2", "font/woff2"),
    exact(b"\x1F\x8B\x08", "application/x-gzip"),
    exact(b"PK\x03\x04", "application/zip"),
    exact(b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    exact(b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    exact(b"7z\xBC\xAF\x27\x1C", "application/x-7z-compressed"),
    exact(b"\x00\x61\x73\x6D", "application/wasm"),
];

/// Returns the MIME type of `data`, defaulting to
/// `application/octet-stream` for unrecognized binary content.
#[must_use]
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = data.get(..SNIFF_LEN).unwrap_or(data);
    let trimmed = skip_whitespace(data);

    if is_html(trimmed) {
        return "text/html; charset=utf-8";
    }

    if let Some(signature) = SIGNATURES.iter().find(|sig| {
        let candidate = if sig.skip_whitespace { trimmed } else { data };
        matches_signature(sig, candidate)
    }) {
        return signature.mime;
    }

    if is_mp4(data) {
        return "video/mp4";
    }

    if data.iter().copied().any(is_binary_byte) {
        OCTET_STREAM
    } else {
        TEXT_PLAIN
    }
}

fn skip_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' '))
        .unwrap_or(data.len());
    data.get(start..).unwrap_or_default()
}

fn is_html(data: &[u8]) -> bool {
    HTML_TAGS.iter().any(|tag| {
        data.len() > tag.len()
            && data
                .iter()
                .zip(tag.iter())
                .all(|(d, t)| d.to_ascii_uppercase() == *t)
            && matches!(data.get(tag.len()), Some(b' ' | b'>'))
    })
}

fn matches_signature(sig: &Signature, data: &[u8]) -> bool {
    if data.len() < sig.pattern.len() {
        return false;
    }
    match sig.mask {
        None => data.starts_with(sig.pattern),
        Some(mask) => data
            .iter()
            .zip(sig.pattern.iter().zip(mask.iter()))
            .all(|(d, (p, m))| d & m == p & m),
    }
}

/// ISO base media file with an `mp4` brand in its `ftyp` box.
fn is_mp4(data: &[u8]) -> bool {
    let Some(size) = data.get(..4).and_then(|b| <[u8; 4]>::try_from(b).ok()) else {
        return false;
    };
    let box_size = u32::from_be_bytes(size) as usize;
    if data.len() < 12 || data.len() < box_size || box_size % 4 != 0 {
        return false;
    }
    if data.get(4..8) != Some(b"ftyp".as_slice()) {
        return false;
    }

    (8..box_size)
        .step_by(4)
        .filter(|&offset| offset != 12)
        .any(|offset| data.get(offset..offset + 3) == Some(b"mp4".as_slice()))
}

const fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
