use std::fmt;

/// Classification of one logical line by its first token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Config,
    Edit,
    Set,
    Next,
    End,
    /// Anything else (comments, `unset`, `append`, vendor extensions); ignored
    Other,
}

impl Directive {
    pub fn classify(first_token: &str) -> Self {
        match first_token {
            "config" => Directive::Config,
            "edit" => Directive::Edit,
            "set" => Directive::Set,
            "next" => Directive::Next,
            "end" => Directive::End,
            _ => Directive::Other,
        }
    }

    /// Directives that open a context level
    pub fn pushes(&self) -> bool {
        matches!(self, Directive::Config | Directive::Edit)
    }

    /// Directives that close a context level
    pub fn pops(&self) -> bool {
        matches!(self, Directive::Next | Directive::End)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Directive::Config => "config",
            Directive::Edit => "edit",
            Directive::Set => "set",
            Directive::Next => "next",
            Directive::End => "end",
            Directive::Other => "other",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_quote(ch: char) -> bool {
    ch == '"' || ch == '\''
}

/// Split a logical line into tokens.
///
/// A token that starts with a quote runs until the matching closing quote
/// (inclusive); an unclosed quote consumes the rest of the line. Unquoted
/// tokens end at whitespace.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let mut token = String::new();
        if is_quote(ch) {
            let quote = ch;
            token.push(ch);
            chars.next();
            let mut escaped = false;
            for c in chars.by_ref() {
                token.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == quote {
                    break;
                }
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }

    tokens
}

/// Strip one level of surrounding quotes and collapse backslash escapes,
/// yielding the object name the way a POSIX shell would read it.
pub fn unquote(token: &str) -> String {
    let mut chars = token.chars();
    let quote = match chars.next() {
        Some(c) if is_quote(c) => c,
        _ => return token.to_string(),
    };

    let mut out = String::new();
    let mut escaped = false;
    for c in chars {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' && quote == '"' {
            escaped = true;
        } else if c == quote {
            break;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_keeps_quotes() {
        assert_eq!(
            tokenize(r#"    set accprofile "super_admin""#),
            vec!["set", "accprofile", "\"super_admin\""]
        );
    }

    #[test]
    fn test_tokenize_quoted_run_with_spaces() {
        assert_eq!(
            tokenize(r#"set srcaddr "all" "net a""#),
            vec!["set", "srcaddr", "\"all\"", "\"net a\""]
        );
    }

    #[test]
    fn test_tokenize_does_not_collapse_escapes() {
        assert_eq!(
            tokenize(r#"set comments "say \"hi\"""#),
            vec!["set", "comments", r#""say \"hi\"""#]
        );
    }

    #[test]
    fn test_tokenize_unclosed_quote_is_lenient() {
        assert_eq!(tokenize(r#"set x "open"#), vec!["set", "x", "\"open"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_classify() {
        assert_eq!(Directive::classify("config"), Directive::Config);
        assert_eq!(Directive::classify("unset"), Directive::Other);
        assert!(Directive::Edit.pushes());
        assert!(Directive::End.pops());
        assert!(!Directive::Set.pops());
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"port1\""), "port1");
        assert_eq!(unquote("admin"), "admin");
        assert_eq!(unquote(r#""a \"b\"""#), "a \"b\"");
        assert_eq!(unquote("'x y'"), "x y");
    }
}
