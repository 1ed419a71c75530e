//! Screenshot type detection from leading magic bytes.

/// Each entry lists `(offset, bytes)` markers that must all match.
const SIGNATURES: &[(&str, &[(usize, &[u8])])] = &[
    ("image/png", &[(0, b"\x89PNG\r\n\x1a\n")]),
    ("image/jpeg", &[(0, b"\xFF\xD8\xFF")]),
    ("image/gif", &[(0, b"GIF87a")]),
    ("image/gif", &[(0, b"GIF89a")]),
    ("image/webp", &[(0, b"RIFF"), (8, b"WEBP")]),
    ("image/bmp", &[(0, b"BM")]),
    ("image/heic", &[(4, b"ftypheic")]),
    ("image/heic", &[(4, b"ftypheix")]),
];

/// Identify a screenshot's MIME type, or `None` when the bytes are not a
/// recognised image format.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    let found = SIGNATURES
        .iter()
        .find(|(_, markers)| {
            markers.iter().all(|(offset, magic)| {
                bytes
                    .get(*offset..*offset + magic.len())
                    .is_some_and(|window| window == *magic)
            })
        })
        .map(|(mime, _)| *mime);

    if found.is_none() {
        tracing::debug!(
            "No image signature matched (leading bytes: {:02X?})",
            &bytes[..bytes.len().min(8)]
        );
    }
    found
}
