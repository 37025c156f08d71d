use logos::Logos;

/// Raw lexical classes for the built-in source scanner.
///
/// No skip patterns: whitespace and comments are tokens, so the emitted
/// slices partition the input and concatenating them reproduces it exactly.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawToken {
    #[regex(r"[ \t]+")]
    Space,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,

    #[regex(r"0[xX][0-9a-fA-F][0-9a-fA-F_]*|[0-9][0-9_]*(\.[0-9][0-9_]*)?([eE][+-]?[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    Str,

    #[regex(r"[-+*/%=<>!&|^~?.,:;@#$]")]
    Operator,

    #[regex(r"[(){}\[\]]")]
    Delimiter,
}

const KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "else", "enum", "false", "fn", "for",
    "if", "impl", "import", "in", "let", "match", "mut", "pub", "return",
    "trait", "true", "while",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.binary_search(&word).is_ok()
}
