use super::TextExtractor;
use crate::domain::document::{DocumentFormat, ExtractedText, ExtractionError};
use encoding_rs::WINDOWS_1252;

/// Destinations whose content is never document text
const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "object",
    "header",
    "footer",
    "headerl",
    "headerr",
    "footerl",
    "footerr",
    "listtable",
    "listoverridetable",
    "revtbl",
    "rsidtbl",
    "generator",
    "xmlnstbl",
    "themedata",
    "colorschememapping",
    "datastore",
    "latentstyles",
];

#[derive(Clone, Copy)]
struct GroupState {
    skip: bool,
    /// Fallback characters following each `\uN`
    unicode_skip: usize,
}

fn cp1252(byte: u8) -> char {
    let bytes = [byte];
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(&bytes);
    text.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn emit(c: char, state: &GroupState, pending_skip: &mut usize, out: &mut String) {
    if *pending_skip > 0 {
        *pending_skip -= 1;
    } else if !state.skip {
        out.push(c);
    }
}

/// Strip RTF control words and groups, keeping the document text
fn strip(rtf: &[u8]) -> Result<String, String> {
    if !rtf.starts_with(b"{\\rtf") {
        return Err("missing {\\rtf header".to_string());
    }

    let mut out = String::new();
    let mut stack: Vec<GroupState> = Vec::new();
    let mut state = GroupState {
        skip: false,
        unicode_skip: 1,
    };
    // Fallback characters still to drop after a `\uN`
    let mut pending_skip = 0usize;
    let mut i = 0;

    while i < rtf.len() {
        let byte = rtf[i];
        match byte {
            b'{' => {
                stack.push(state);
                i += 1;
            }
            b'}' => {
                state = stack.pop().ok_or("unbalanced closing brace")?;
                i += 1;
            }
            b'\r' | b'\n' => i += 1,
            b'\\' => {
                i += 1;
                let Some(&next) = rtf.get(i) else { break };

                if next.is_ascii_alphabetic() {
                    let start = i;
                    while i < rtf.len() && rtf[i].is_ascii_alphabetic() {
                        i += 1;
                    }
                    let word = std::str::from_utf8(&rtf[start..i]).unwrap_or_default();

                    let param_start = i;
                    if i < rtf.len() && rtf[i] == b'-' {
                        i += 1;
                    }
                    while i < rtf.len() && rtf[i].is_ascii_digit() {
                        i += 1;
                    }
                    let param: Option<i32> = std::str::from_utf8(&rtf[param_start..i])
                        .ok()
                        .and_then(|p| p.parse().ok());

                    // A single space delimits the control word
                    if i < rtf.len() && rtf[i] == b' ' {
                        i += 1;
                    }

                    match word {
                        "par" | "line" | "sect" | "page" => {
                            emit('\n', &state, &mut 0, &mut out);
                        }
                        "tab" => emit('\t', &state, &mut 0, &mut out),
                        "emdash" | "endash" => emit('-', &state, &mut 0, &mut out),
                        "lquote" | "rquote" => emit('\'', &state, &mut 0, &mut out),
                        "ldblquote" | "rdblquote" => emit('"', &state, &mut 0, &mut out),
                        "bullet" => emit('•', &state, &mut 0, &mut out),
                        "uc" => state.unicode_skip = param.unwrap_or(1).max(0) as usize,
                        "u" => {
                            if let Some(code) = param {
                                let code = if code < 0 { code + 65536 } else { code };
                                let c = char::from_u32(code as u32)
                                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                                emit(c, &state, &mut 0, &mut out);
                                pending_skip = state.unicode_skip;
                            }
                        }
                        word if SKIPPED_DESTINATIONS.contains(&word) => state.skip = true,
                        _ => {}
                    }
                    continue;
                }

                i += 1;
                match next {
                    b'*' => state.skip = true,
                    b'\'' => {
                        let hex = rtf.get(i..i + 2).and_then(|h| std::str::from_utf8(h).ok());
                        if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                            emit(cp1252(value), &state, &mut pending_skip, &mut out);
                            i += 2;
                        }
                    }
                    b'\\' | b'{' | b'}' => {
                        emit(next as char, &state, &mut pending_skip, &mut out)
                    }
                    b'~' => emit(' ', &state, &mut pending_skip, &mut out),
                    b'_' => emit('-', &state, &mut pending_skip, &mut out),
                    b'\r' | b'\n' => emit('\n', &state, &mut 0, &mut out),
                    _ => {}
                }
            }
            _ => {
                let c = if byte.is_ascii() {
                    byte as char
                } else {
                    cp1252(byte)
                };
                emit(c, &state, &mut pending_skip, &mut out);
                i += 1;
            }
        }
    }

    Ok(out)
}

pub struct RtfExtractor;

impl TextExtractor for RtfExtractor {
    fn formats(&self) -> &'static [DocumentFormat] {
        &[DocumentFormat::Rtf]
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let text = strip(bytes).map_err(|e| ExtractionError::failed("rtf", e))?;
        ExtractedText::new(text, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_paragraphs() {
        let rtf = br"{\rtf1\ansi\deff0{\fonttbl{\f0 Times New Roman;}}{\colortbl;\red0\green0\blue0;}
\f0\fs24 Hello world.\par
Second {\b bold} line.\par
}";

        let extracted = RtfExtractor.extract(rtf).unwrap();

        assert_eq!(extracted.text, "Hello world.\nSecond bold line.");
    }

    #[test]
    fn test_hex_and_unicode_escapes() {
        let rtf = br"{\rtf1\ansi Ol\'e1, caf\'e9 e \u26085?\u26412?go.}";

        let extracted = RtfExtractor.extract(rtf).unwrap();

        assert_eq!(extracted.text, "Olá, café e 日本go.");
    }

    #[test]
    fn test_ignorable_destinations_are_skipped() {
        let rtf = br"{\rtf1{\*\generator Riched20;}{\info{\title Secret}}Visible\tab text\{braces\}}";

        let extracted = RtfExtractor.extract(rtf).unwrap();

        assert_eq!(extracted.text, "Visible\ttext{braces}");
    }

    #[test]
    fn test_non_rtf_input_fails() {
        assert!(matches!(
            RtfExtractor.extract(b"just text"),
            Err(ExtractionError::Failed { format, .. }) if format == "rtf"
        ));
    }

    #[test]
    fn test_unbalanced_braces_fail() {
        assert!(RtfExtractor.extract(br"{\rtf1 text}}").is_err());
    }
}
