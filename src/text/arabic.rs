//! Contextual shaping of Arabic label text
//!
//! Glyph atlases address characters by code point, so Arabic letters are
//! replaced by their Presentation Forms-B variants (isolated, final, initial
//! or medial) according to their neighbours. Lam followed by alef becomes a
//! single ligature. Text order is left untouched.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Joining {
    /// Joins on both sides
    Dual,
    /// Joins only to the preceding letter
    Right,
    /// Never joins
    NonJoining,
    /// Tatweel: forces its neighbours to join
    Causing,
    /// Diacritics, skipped when looking for neighbours
    Transparent,
}

/// Joining behaviour and isolated presentation form of a base letter
fn letter(c: char) -> Option<(Joining, u32)> {
    use Joining::{Dual, NonJoining, Right};
    let entry = match c {
        '\u{0621}' => (NonJoining, 0xFE80),
        '\u{0622}' => (Right, 0xFE81),
        '\u{0623}' => (Right, 0xFE83),
        '\u{0624}' => (Right, 0xFE85),
        '\u{0625}' => (Right, 0xFE87),
        '\u{0626}' => (Dual, 0xFE89),
        '\u{0627}' => (Right, 0xFE8D),
        '\u{0628}' => (Dual, 0xFE8F),
        '\u{0629}' => (Right, 0xFE93),
        '\u{062A}' => (Dual, 0xFE95),
        '\u{062B}' => (Dual, 0xFE99),
        '\u{062C}' => (Dual, 0xFE9D),
        '\u{062D}' => (Dual, 0xFEA1),
        '\u{062E}' => (Dual, 0xFEA5),
        '\u{062F}' => (Right, 0xFEA9),
        '\u{0630}' => (Right, 0xFEAB),
        '\u{0631}' => (Right, 0xFEAD),
        '\u{0632}' => (Right, 0xFEAF),
        '\u{0633}' => (Dual, 0xFEB1),
        '\u{0634}' => (Dual, 0xFEB5),
        '\u{0635}' => (Dual, 0xFEB9),
        '\u{0636}' => (Dual, 0xFEBD),
        '\u{0637}' => (Dual, 0xFEC1),
        '\u{0638}' => (Dual, 0xFEC5),
        '\u{0639}' => (Dual, 0xFEC9),
        '\u{063A}' => (Dual, 0xFECD),
        '\u{0641}' => (Dual, 0xFED1),
        '\u{0642}' => (Dual, 0xFED5),
        '\u{0643}' => (Dual, 0xFED9),
        '\u{0644}' => (Dual, 0xFEDD),
        '\u{0645}' => (Dual, 0xFEE1),
        '\u{0646}' => (Dual, 0xFEE5),
        '\u{0647}' => (Dual, 0xFEE9),
        '\u{0648}' => (Right, 0xFEED),
        '\u{0649}' => (Right, 0xFEEF),
        '\u{064A}' => (Dual, 0xFEF1),
        _ => return None,
    };
    Some(entry)
}

fn joining(c: char) -> Joining {
    match c {
        '\u{0640}' => Joining::Causing,
        '\u{064B}'..='\u{065F}' | '\u{0670}' => Joining::Transparent,
        _ => letter(c).map(|(j, _)| j).unwrap_or(Joining::NonJoining),
    }
}

fn joins_next(j: Joining) -> bool {
    matches!(j, Joining::Dual | Joining::Causing)
}

fn joins_prev(j: Joining) -> bool {
    matches!(j, Joining::Dual | Joining::Right | Joining::Causing)
}

/// Isolated lam-alef ligature for an alef variant; the final form follows it
fn lam_alef(alef: char) -> Option<u32> {
    match alef {
        '\u{0622}' => Some(0xFEF5),
        '\u{0623}' => Some(0xFEF7),
        '\u{0625}' => Some(0xFEF9),
        '\u{0627}' => Some(0xFEFB),
        _ => None,
    }
}

fn neighbour(chars: &[char], indices: impl Iterator<Item = usize>) -> Joining {
    indices
        .map(|i| joining(chars[i]))
        .find(|j| *j != Joining::Transparent)
        .unwrap_or(Joining::NonJoining)
}

fn push_code(out: &mut String, code: u32) {
    if let Some(c) = char::from_u32(code) {
        out.push(c);
    }
}

/// Whether `text` contains anything this converter would change
pub fn needs_shaping(text: &str) -> bool {
    text.chars().any(|c| letter(c).is_some())
}

/// Replace Arabic letters with their contextual presentation forms
pub fn convert(text: &str) -> String {
    if !needs_shaping(text) {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let Some((kind, isolated)) = letter(c) else {
            out.push(c);
            i += 1;
            continue;
        };

        let connects_prev = joins_next(neighbour(&chars, (0..i).rev()));

        if c == '\u{0644}' {
            if let Some(ligature) = chars.get(i + 1).and_then(|&next| lam_alef(next)) {
                push_code(&mut out, if connects_prev { ligature + 1 } else { ligature });
                i += 2;
                continue;
            }
        }

        let connects_next = joins_prev(neighbour(&chars, i + 1..chars.len()));

        let code = match kind {
            Joining::Dual => match (connects_prev, connects_next) {
                (true, true) => isolated + 3,
                (false, true) => isolated + 2,
                (true, false) => isolated + 1,
                (false, false) => isolated,
            },
            Joining::Right if connects_prev => isolated + 1,
            _ => isolated,
        };
        push_code(&mut out, code);
        i += 1;
    }

    out
}
