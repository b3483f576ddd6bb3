//! 查询字符分类
//!
//! Single-character classification shared by the query parser and the tag
//! input parser. Pure functions, no lookahead.

/// Prefix operators recognised at the start of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `-tag`: the tag must be absent
    Exclude,
    /// `~tag`: the tag joins the OR group
    Optional,
}

impl Operator {
    pub fn as_char(self) -> char {
        match self {
            Operator::Exclude => '-',
            Operator::Optional => '~',
        }
    }
}

/// Class of a character at the start of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Whitespace,
    Operator(Operator),
    TagChar,
    Invalid,
}

/// Space, tab, LF and CR. Other Unicode whitespace is invalid input.
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Printable ASCII (0x21..=0x7E) except `*` and `,`.
///
/// `-` and `~` are tag characters too; they only act as operators in
/// front of a term.
pub fn is_tag_char(c: char) -> bool {
    matches!(c, '\x21'..='\x7e') && c != '*' && c != ','
}

/// Classify a character found where a new term may begin.
pub fn classify(c: char) -> CharClass {
    match c {
        c if is_whitespace(c) => CharClass::Whitespace,
        '-' => CharClass::Operator(Operator::Exclude),
        '~' => CharClass::Operator(Operator::Optional),
        c if is_tag_char(c) => CharClass::TagChar,
        _ => CharClass::Invalid,
    }
}
