use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"'[^']*'|"[^"]*"|\S+"#).expect("token pattern is valid"));

/// Cuts `line` at the first `#` outside quotes. Either quote character
/// toggles quoting.
pub fn strip_comment(line: &str) -> &str {
    let mut in_quote = false;
    for (idx, c) in line.char_indices() {
        match c {
            '\'' | '"' => in_quote = !in_quote,
            '#' if !in_quote => return &line[..idx],
            _ => {}
        }
    }
    line
}

/// Splits on whitespace; a `'...'` or `"..."` run is one token with its
/// quotes removed.
pub fn tokenize(line: &str) -> Vec<String> {
    TOKEN
        .find_iter(line)
        .map(|m| unquote(m.as_str()).to_string())
        .collect()
}

fn unquote(token: &str) -> &str {
    for quote in ['\'', '"'] {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            return &token[1..token.len() - 1];
        }
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(tokenize("  path  Sol\tVega 4.5 "), vec!["path", "Sol", "Vega", "4.5"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn quotes_group_words() {
        assert_eq!(
            tokenize(r#"path 'Proxima Centauri' "Beta Canis Majoris" 10"#),
            vec!["path", "Proxima Centauri", "Beta Canis Majoris", "10"]
        );
        assert_eq!(tokenize("nearest '' 1"), vec!["nearest", "", "1"]);
    }

    #[test]
    fn unterminated_quote_is_a_plain_token() {
        assert_eq!(tokenize("coordinates 'Sol"), vec!["coordinates", "'Sol"]);
    }

    #[test]
    fn comments_are_stripped_outside_quotes() {
        assert_eq!(strip_comment("nearest Sol 4 # closest"), "nearest Sol 4 ");
        assert_eq!(strip_comment("# whole line"), "");
        assert_eq!(strip_comment("coordinates 'Star #9' # note"), "coordinates 'Star #9' ");
        assert_eq!(strip_comment("no comment"), "no comment");
    }
}
