//! Expression normalizer.
//!
//! Rewrites localized and typographic notation into the ASCII operator
//! vocabulary the parser accepts. Pure and idempotent: every replacement
//! produces text that no rule matches again.

/// Single-symbol replacements.
const SYMBOLS: &[(char, &str)] = &[
    ('÷', "/"),
    ('×', "*"),
    ('·', "*"),
    ('⋅', "*"),
    ('∗', "*"),
    ('−', "-"),
    ('–', "-"),
    ('√', "sqrt"),
    ('π', "pi"),
    ('∞', "oo"),
    ('≠', "!="),
    ('≤', "<="),
    ('≥', ">="),
    ('≈', "~="),
];

/// Verbal operators, English and French. Matched on whole words, ignoring
/// case; longer phrases are listed before their prefixes.
const PHRASES: &[(&str, &str)] = &[
    ("square root of", "sqrt"),
    ("to the power of", "^"),
    ("multiplied by", "*"),
    ("divided by", "/"),
    ("times", "*"),
    ("over", "/"),
    ("squared", "^2"),
    ("cubed", "^3"),
    ("minus", "-"),
    ("plus", "+"),
    ("racine carrée de", "sqrt"),
    ("racine de", "sqrt"),
    ("multiplié par", "*"),
    ("divisé par", "/"),
    ("puissance", "^"),
    ("au carré", "^2"),
    ("au cube", "^3"),
    ("fois", "*"),
    ("moins", "-"),
    ("sur", "/"),
];

/// Normalize raw answer text.
pub fn normalize(text: &str) -> String {
    let symbols = replace_symbols(text);
    let superscripts = replace_superscripts(&symbols);
    let decimals = replace_decimal_commas(&superscripts);
    let verbal = replace_phrases(&decimals);
    collapse_whitespace(&verbal)
}

fn replace_symbols(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match SYMBOLS.iter().find(|(symbol, _)| *symbol == ch) {
            Some((_, replacement)) => out.push_str(replacement),
            None => out.push(ch),
        }
    }
    out
}

fn superscript_value(ch: char) -> Option<char> {
    match ch {
        '⁰' => Some('0'),
        '¹' => Some('1'),
        '²' => Some('2'),
        '³' => Some('3'),
        '⁴' => Some('4'),
        '⁵' => Some('5'),
        '⁶' => Some('6'),
        '⁷' => Some('7'),
        '⁸' => Some('8'),
        '⁹' => Some('9'),
        '⁻' => Some('-'),
        _ => None,
    }
}

/// `x²` becomes `x^2`, `x⁻¹` becomes `x^(-1)`.
fn replace_superscripts(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        let Some(first) = superscript_value(ch) else {
            out.push(ch);
            continue;
        };
        let mut exponent = String::from(first);
        while let Some(next) = chars.peek().and_then(|c| superscript_value(*c)) {
            exponent.push(next);
            chars.next();
        }
        if exponent.contains('-') {
            out.push_str(&format!("^({exponent})"));
        } else {
            out.push('^');
            out.push_str(&exponent);
        }
    }
    out
}

/// `3,5` becomes `3.5`. Commas not between two digits are left alone.
fn replace_decimal_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &ch)| {
            let between_digits = i > 0
                && chars[i - 1].is_ascii_digit()
                && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit());
            if ch == ',' && between_digits {
                '.'
            } else {
                ch
            }
        })
        .collect()
}

fn replace_phrases(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let at_word_start = i == 0 || !chars[i - 1].is_alphabetic();
        let matched = at_word_start
            .then(|| {
                PHRASES.iter().find_map(|(phrase, replacement)| {
                    phrase_len_at(&chars, i, phrase).map(|len| (len, *replacement))
                })
            })
            .flatten();
        match matched {
            Some((len, replacement)) => {
                out.push(' ');
                out.push_str(replacement);
                out.push(' ');
                i += len;
            }
            None => {
                out.push(chars[i]);
                i += 1;
            }
        }
    }
    out
}

/// Length in chars of `phrase` at `start`, if it matches there as whole words.
fn phrase_len_at(chars: &[char], start: usize, phrase: &str) -> Option<usize> {
    let mut len = 0;
    for expected in phrase.chars() {
        let actual = *chars.get(start + len)?;
        let same = actual == expected || actual.to_lowercase().eq(expected.to_lowercase());
        if !same {
            return None;
        }
        len += 1;
    }
    let at_word_end = !matches!(chars.get(start + len), Some(next) if next.is_alphabetic());
    at_word_end.then_some(len)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
