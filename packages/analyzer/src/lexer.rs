//! HTML lexer using logos
//!
//! Markup is lexed in two modes. [`ContentToken`] covers text between tags
//! and recognises the start of tags, comments and declarations. Once a tag
//! name has been read the lexer is morphed into [`TagToken`] mode for the
//! attribute list, and back again at `>` or `/>`.

use logos::Logos;

/// Tokens between tags
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
pub enum ContentToken<'src> {
    /// `<!--`; the body up to `-->` is skipped by the parser
    #[token("<!--")]
    CommentStart,

    /// `<!DOCTYPE ...>` and other declarations
    #[regex(r"<![a-zA-Z][^>]*>")]
    Declaration,

    /// `<?xml ...?>`
    #[regex(r"<\?[^>]*>")]
    ProcessingInstruction,

    #[regex(r"<[a-zA-Z][a-zA-Z0-9:-]*", |lex| &lex.slice()[1..])]
    TagOpen(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9:-]*[ \t\r\n\f]*>", |lex| close_name(lex.slice()))]
    TagClose(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),

    /// A `<` that does not start markup, kept as text
    #[token("<")]
    Stray,
}

fn close_name(slice: &str) -> &str {
    slice[2..slice.len() - 1].trim_end()
}

/// Tokens inside a start tag
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TagToken<'src> {
    #[token(">")]
    End,

    #[token("/>")]
    SelfClose,

    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#, |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    DoubleQuoted(&'src str),

    #[regex(r"'[^']*'", |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    SingleQuoted(&'src str),

    /// Attribute name or unquoted value
    #[regex(r#"[^ \t\r\n\f"'<>=]+"#, |lex| lex.slice())]
    Word(&'src str),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_tokens(source: &str) -> Vec<ContentToken<'_>> {
        ContentToken::lexer(source).filter_map(|t| t.ok()).collect()
    }

    #[test]
    fn test_content_mode() {
        let tokens = content_tokens("<!DOCTYPE html>Hi <b>x</b > a < b");
        assert_eq!(
            tokens,
            vec![
                ContentToken::Declaration,
                ContentToken::Text("Hi "),
                ContentToken::TagOpen("b"),
                ContentToken::Text(">x"),
                ContentToken::TagClose("b"),
                ContentToken::Text(" a "),
                ContentToken::Stray,
                ContentToken::Text(" b"),
            ]
        );
    }

    #[test]
    fn test_tag_mode() {
        let tokens: Vec<_> = TagToken::lexer(r#" class="hero big" data-x='1' hidden src=a.jpg/>"#)
            .filter_map(|t| t.ok())
            .collect();
        assert_eq!(
            tokens,
            vec![
                TagToken::Word("class"),
                TagToken::Eq,
                TagToken::DoubleQuoted("hero big"),
                TagToken::Word("data-x"),
                TagToken::Eq,
                TagToken::SingleQuoted("1"),
                TagToken::Word("hidden"),
                TagToken::Word("src"),
                TagToken::Eq,
                TagToken::Word("a.jpg/"),
                TagToken::End,
            ]
        );
    }

    #[test]
    fn test_self_close_wins_over_word() {
        let tokens: Vec<_> = TagToken::lexer(" />").filter_map(|t| t.ok()).collect();
        assert_eq!(tokens, vec![TagToken::SelfClose]);
    }
}
