//! Plain-text decoding: UTF-8, UTF-16 (BOM-marked), then Latin-1 as a total fallback.

use super::IngestError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub fn extract(bytes: &[u8]) -> Result<String, IngestError> {
    let decoded = decode(bytes);
    let text = decoded.trim();
    if text.is_empty() {
        return Err(IngestError::ExtractionFailed(
            "no text found in the uploaded document".to_string(),
        ));
    }
    Ok(text.to_string())
}

fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }
    if let Some(text) = decode_utf16_with_bom(bytes) {
        return text;
    }
    // Every byte maps to the code point of the same value.
    bytes.iter().map(|&b| b as char).collect()
}

fn decode_utf16_with_bom(bytes: &[u8]) -> Option<String> {
    let (body, little_endian) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (rest, true),
        [0xFE, 0xFF, rest @ ..] => (rest, false),
        _ => return None,
    };
    if body.len() % 2 != 0 {
        return None;
    }
    let units = body.chunks_exact(2).map(|pair| {
        if little_endian {
            u16::from_le_bytes([pair[0], pair[1]])
        } else {
            u16::from_be_bytes([pair[0], pair[1]])
        }
    });
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_with_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("Zoë Müller".as_bytes());
        assert_eq!(extract(&bytes).unwrap(), "Zoë Müller");
    }

    #[test]
    fn test_utf16_little_endian() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Résumé".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(extract(&bytes).unwrap(), "Résumé");
    }

    #[test]
    fn test_utf16_big_endian() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "SQL".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(extract(&bytes).unwrap(), "SQL");
    }

    #[test]
    fn test_latin1_fallback() {
        // "café" in Latin-1 is not valid UTF-8.
        let bytes = [b'c', b'a', b'f', 0xE9];
        assert_eq!(extract(&bytes).unwrap(), "café");
    }

    #[test]
    fn test_whitespace_only_is_extraction_failure() {
        let err = extract(b" \n\t ").unwrap_err();
        assert!(matches!(err, IngestError::ExtractionFailed(_)));
    }
}
