use crate::core::model::RawChar;
use crate::core::warn::{WarnClass, Warnings};

/// A raw character that survived sanitization, now holding a valid scalar.
#[derive(Debug, Clone)]
pub struct CleanChar {
    pub ch: char,
    pub raw: RawChar,
}

/// Decides accept / repair / drop for each raw code point before any
/// geometry or segmentation work happens.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharSanitizer {
    /// Combine a high surrogate immediately followed by a low surrogate
    /// into one scalar, consuming both input slots.
    pub salvage_surrogates: bool,
}

impl CharSanitizer {
    pub fn new(salvage_surrogates: bool) -> Self {
        Self { salvage_surrogates }
    }

    pub fn sanitize(&self, chars: &[RawChar], warnings: &mut Warnings) -> Vec<CleanChar> {
        let mut out = Vec::with_capacity(chars.len());
        let mut i = 0;
        while i < chars.len() {
            let raw = &chars[i];
            let mut code = raw.code;
            let mut consumed = 1;

            if self.salvage_surrogates && is_high_surrogate(code) {
                if let Some(next) = chars.get(i + 1) {
                    if is_low_surrogate(next.code) {
                        code = combine_surrogates(code, next.code);
                        consumed = 2;
                    }
                }
            }
            i += consumed;

            if matches!(code, 0xFFFD | 0xFFFE | 0xFFFF) {
                warnings.report(WarnClass::UnrepresentableCharacter);
                continue;
            }
            let Some(ch) = char::from_u32(code) else {
                warnings.report(WarnClass::EncodingError);
                continue;
            };
            if !is_xml_safe(ch) {
                warnings.report(WarnClass::XmlIncompatibleCharacter);
                continue;
            }

            // The surviving metadata comes from the first consumed slot.
            out.push(CleanChar {
                ch,
                raw: raw.clone(),
            });
        }
        out
    }
}

fn is_high_surrogate(code: u32) -> bool {
    (0xD800..=0xDBFF).contains(&code)
}

fn is_low_surrogate(code: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&code)
}

fn combine_surrogates(high: u32, low: u32) -> u32 {
    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
}

/// Control characters other than tab/newline/carriage return cannot appear
/// in XML 1.0 output; everything else is carried through.
fn is_xml_safe(ch: char) -> bool {
    !ch.is_control() || matches!(ch, '\t' | '\n' | '\r')
}
