//! Character encoding utilities for text-based tabular sources.
//!
//! Delimited files exported by spreadsheet tools are frequently written in a
//! Windows codepage rather than UTF-8. These helpers resolve an
//! `encoding_rs::Encoding` from a codepage number or a WHATWG label so the
//! reader can decode the byte stream into characters.

use crate::common::{Error, Result};
use encoding_rs::Encoding;

/// Map a Windows codepage identifier to an `encoding_rs` encoding.
///
/// # Examples
/// ```
/// use tabcursor::common::encoding::codepage_to_encoding;
///
/// let encoding = codepage_to_encoding(1252).unwrap();
/// assert_eq!(encoding.name(), "windows-1252");
/// ```
#[inline]
pub fn codepage_to_encoding(codepage: u32) -> Option<&'static Encoding> {
    match codepage {
        437 | 850 => Some(encoding_rs::IBM866), // DOS codepages (approximation)

        874 => Some(encoding_rs::WINDOWS_874),
        1250 => Some(encoding_rs::WINDOWS_1250),
        1251 => Some(encoding_rs::WINDOWS_1251),
        1252 | 28591 => Some(encoding_rs::WINDOWS_1252),
        1253 => Some(encoding_rs::WINDOWS_1253),
        1254 => Some(encoding_rs::WINDOWS_1254),
        1255 => Some(encoding_rs::WINDOWS_1255),
        1256 => Some(encoding_rs::WINDOWS_1256),
        1257 => Some(encoding_rs::WINDOWS_1257),
        1258 => Some(encoding_rs::WINDOWS_1258),

        932 => Some(encoding_rs::SHIFT_JIS),
        936 | 20936 => Some(encoding_rs::GBK),
        949 => Some(encoding_rs::EUC_KR),
        950 => Some(encoding_rs::BIG5),
        54936 => Some(encoding_rs::GB18030),
        20932 => Some(encoding_rs::EUC_JP),

        28592 => Some(encoding_rs::ISO_8859_2),
        28595 => Some(encoding_rs::ISO_8859_5),
        28597 => Some(encoding_rs::ISO_8859_7),
        28605 => Some(encoding_rs::ISO_8859_15),

        20866 => Some(encoding_rs::KOI8_R),
        21866 => Some(encoding_rs::KOI8_U),
        10000 => Some(encoding_rs::MACINTOSH),

        1200 => Some(encoding_rs::UTF_16LE),
        1201 => Some(encoding_rs::UTF_16BE),
        65001 => Some(encoding_rs::UTF_8),

        _ => None,
    }
}

/// Resolve an encoding from a WHATWG label such as `"utf-8"` or `"latin1"`.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::InvalidConfig(format!("unknown encoding label '{}'", label)))
}

/// Serde adapter storing an encoding as its canonical name.
pub(crate) mod serde_label {
    use encoding_rs::Encoding;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(
        encoding: &&'static Encoding,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(encoding.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<&'static Encoding, D::Error> {
        let label = String::deserialize(deserializer)?;
        super::encoding_for_label(&label).map_err(D::Error::custom)
    }
}
