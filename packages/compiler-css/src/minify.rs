//! CSS minification for exported markup

const ZERO_UNITS: &[&str] = &["px", "em", "rem", "%", "vh", "vw", "pt"];

/// Collapse whitespace, drop units from zero lengths and shorten `#rrggbb`
/// colors whose channels are doubled digits. Quoted strings are kept as is.
pub fn minify_css_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for word in split_words(value) {
        if !out.is_empty() && !out.ends_with(',') {
            out.push(' ');
        }
        out.push_str(&minify_word(word));
    }
    out
}

/// Whitespace-separated words; whitespace inside quotes does not split
fn split_words(value: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;

    for (i, c) in value.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c.is_whitespace() => {
                if let Some(s) = start.take() {
                    words.push(&value[s..i]);
                }
                continue;
            }
            None if c == '"' || c == '\'' => quote = Some(c),
            None => {}
        }
        start.get_or_insert(i);
    }
    if let Some(s) = start {
        words.push(&value[s..]);
    }
    words
}

fn minify_word(word: &str) -> String {
    if let Some(unit) = word.strip_prefix('0') {
        if ZERO_UNITS.contains(&unit) {
            return "0".to_string();
        }
    }
    match word.strip_prefix('#') {
        Some(hex) => format!("#{}", shorten_hex(hex)),
        None => word.to_string(),
    }
}

fn shorten_hex(hex: &str) -> String {
    let bytes = hex.as_bytes();
    let doubled = bytes.len() == 6
        && bytes.iter().all(u8::is_ascii_hexdigit)
        && bytes.chunks(2).all(|pair| pair[0].eq_ignore_ascii_case(&pair[1]));
    if doubled {
        bytes.chunks(2).map(|pair| (pair[0] as char).to_ascii_lowercase()).collect()
    } else {
        hex.to_string()
    }
}

pub fn minify_css_selector(selector: &str) -> String {
    selector
        .trim()
        .replace(" > ", ">")
        .replace(" + ", "+")
        .replace(" ~ ", "~")
}
