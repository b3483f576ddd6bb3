//! 标签搜索查询解析器
//!
//! 支持的语法：
//! - `cat dog` - 必须同时包含（AND）
//! - `~cat ~dog` - 至少包含其一（OR 组）
//! - `cat or dog` - `or` 将下一个词项变为可选项
//! - `-banned` - 必须不包含
//!
//! 单次从左到右扫描，不回溯。标签名原样保留，大小写与去重由编译器处理。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::SearchQuery;
use crate::services::lexer::{self, CharClass, Operator};

/// 保留字：将下一个普通词项变为可选项
const OR_KEYWORD: &str = "or";

/// 查询语法错误
///
/// `position` is the zero-based character index into the query string.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParseError {
    /// 非法字符（非 ASCII、控制字符、`*`、`,`）
    #[error("非法字符 {character:?}（位置 {position}）")]
    InvalidCharacter { character: char, position: usize },

    /// `-` 或 `~` 后没有标签
    #[error("运算符后缺少标签（位置 {position}）")]
    EmptyTag { position: usize },
}

impl ParseError {
    pub fn position(&self) -> usize {
        match self {
            ParseError::InvalidCharacter { position, .. } | ParseError::EmptyTag { position } => {
                *position
            }
        }
    }
}

/// Parse a query string. Shorthand for [`QueryParser::parse`].
pub fn parse(input: &str) -> Result<SearchQuery, ParseError> {
    QueryParser::parse(input)
}

/// 查询解析器
///
/// One instance per call; the scan cursor and the pending `or` flag never
/// outlive it.
pub struct QueryParser {
    chars: Vec<char>,
    pos: usize,
    /// 上一个词项是 `or`
    pending_optional: bool,
    query: SearchQuery,
}

impl QueryParser {
    /// 解析用户输入的搜索查询
    pub fn parse(input: &str) -> Result<SearchQuery, ParseError> {
        let mut parser = Self {
            chars: input.chars().collect(),
            pos: 0,
            pending_optional: false,
            query: SearchQuery::default(),
        };
        parser.run()?;
        Ok(parser.query)
    }

    fn run(&mut self) -> Result<(), ParseError> {
        while let Some(c) = self.peek() {
            match lexer::classify(c) {
                CharClass::Whitespace => self.pos += 1,
                CharClass::Operator(op) => {
                    let op_pos = self.pos;
                    self.pos += 1;
                    let tag = self.parse_tag(op_pos)?;
                    match op {
                        Operator::Exclude => self.query.exclude_tags.push(tag),
                        Operator::Optional => self.query.optional_tags.push(tag),
                    }
                }
                CharClass::TagChar => {
                    let start = self.pos;
                    let tag = self.parse_tag(start)?;
                    self.push_plain(tag);
                }
                CharClass::Invalid => {
                    return Err(ParseError::InvalidCharacter {
                        character: c,
                        position: self.pos,
                    })
                }
            }
        }

        // 末尾的 `or` 没有可作用的词项，直接丢弃
        if self.pending_optional {
            tracing::debug!("查询以 or 结尾，已忽略");
        }
        Ok(())
    }

    /// 普通词项：`or` 只设置标志，其余按标志决定归属
    fn push_plain(&mut self, tag: String) {
        if tag == OR_KEYWORD {
            self.pending_optional = true;
        } else if self.pending_optional {
            self.query.optional_tags.push(tag);
            self.pending_optional = false;
        } else {
            self.query.include_tags.push(tag);
        }
    }

    /// Consume tag characters up to whitespace or end of input.
    ///
    /// `term_start` is reported when the token turns out empty, which only
    /// happens right after an operator.
    fn parse_tag(&mut self, term_start: usize) -> Result<String, ParseError> {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if lexer::is_whitespace(c) {
                break;
            }
            if !lexer::is_tag_char(c) {
                return Err(ParseError::InvalidCharacter {
                    character: c,
                    position: self.pos,
                });
            }
            word.push(c);
            self.pos += 1;
        }

        if word.is_empty() {
            return Err(ParseError::EmptyTag {
                position: term_start,
            });
        }
        Ok(word)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(parse("").unwrap(), SearchQuery::default());
        assert_eq!(parse(" \t\r\n ").unwrap(), SearchQuery::default());
    }

    #[test]
    fn test_include_tags() {
        let query = parse("cat  blue_sky").unwrap();
        assert_eq!(query.include_tags, tags(&["cat", "blue_sky"]));
        assert!(query.optional_tags.is_empty());
        assert!(query.exclude_tags.is_empty());
    }

    #[test]
    fn test_exclude_tag() {
        let query = parse("-banned").unwrap();
        assert_eq!(query.exclude_tags, tags(&["banned"]));
        assert!(query.include_tags.is_empty());
    }

    #[test]
    fn test_optional_prefix() {
        let query = parse("~cat ~dog").unwrap();
        assert_eq!(query.optional_tags, tags(&["cat", "dog"]));
    }

    #[test]
    fn test_or_keyword() {
        let query = parse("cat or dog").unwrap();
        assert_eq!(query.include_tags, tags(&["cat"]));
        assert_eq!(query.optional_tags, tags(&["dog"]));
        assert!(query.exclude_tags.is_empty());
    }

    #[test]
    fn test_or_is_one_shot() {
        let query = parse("or a b").unwrap();
        assert_eq!(query.optional_tags, tags(&["a"]));
        assert_eq!(query.include_tags, tags(&["b"]));
    }

    #[test]
    fn test_or_survives_prefixed_terms() {
        // 带前缀的词项不消耗 or 标志
        let query = parse("a or -b c").unwrap();
        assert_eq!(query.include_tags, tags(&["a"]));
        assert_eq!(query.exclude_tags, tags(&["b"]));
        assert_eq!(query.optional_tags, tags(&["c"]));
    }

    #[test]
    fn test_or_is_case_sensitive() {
        let query = parse("cat OR dog").unwrap();
        assert_eq!(query.include_tags, tags(&["cat", "OR", "dog"]));
        assert!(query.optional_tags.is_empty());
    }

    #[test]
    fn test_trailing_or_is_dropped() {
        let query = parse("cat or").unwrap();
        assert_eq!(query.include_tags, tags(&["cat"]));
        assert!(query.optional_tags.is_empty());
    }

    #[test]
    fn test_prefixed_or_is_literal() {
        let query = parse("-or ~or").unwrap();
        assert_eq!(query.exclude_tags, tags(&["or"]));
        assert_eq!(query.optional_tags, tags(&["or"]));
    }

    #[test]
    fn test_operators_inside_tag() {
        let query = parse("foo-bar a~b --x").unwrap();
        assert_eq!(query.include_tags, tags(&["foo-bar", "a~b"]));
        assert_eq!(query.exclude_tags, tags(&["-x"]));
    }

    #[test]
    fn test_no_normalization() {
        let query = parse("Cat cat CAT").unwrap();
        assert_eq!(query.include_tags, tags(&["Cat", "cat", "CAT"]));
    }

    #[test]
    fn test_invalid_character_mid_tag() {
        assert_eq!(
            parse("foo*bar"),
            Err(ParseError::InvalidCharacter {
                character: '*',
                position: 3
            })
        );
        assert_eq!(
            parse("a,b"),
            Err(ParseError::InvalidCharacter {
                character: ',',
                position: 1
            })
        );
    }

    #[test]
    fn test_invalid_character_at_term_start() {
        assert_eq!(
            parse("cat *"),
            Err(ParseError::InvalidCharacter {
                character: '*',
                position: 4
            })
        );
        assert_eq!(
            parse("-,x"),
            Err(ParseError::InvalidCharacter {
                character: ',',
                position: 1
            })
        );
    }

    #[test]
    fn test_position_counts_characters() {
        // 位置按字符计，而不是字节
        let err = parse("ab é").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidCharacter {
                character: 'é',
                position: 3
            }
        );
        let err = parse("é x").unwrap_err();
        assert_eq!(err.position(), 0);
    }

    #[test]
    fn test_first_error_wins() {
        let err = parse("a* b,").unwrap_err();
        assert_eq!(err.position(), 1);
    }

    #[test]
    fn test_dangling_operator_is_empty_tag() {
        assert_eq!(parse("cat -"), Err(ParseError::EmptyTag { position: 4 }));
        assert_eq!(parse("~"), Err(ParseError::EmptyTag { position: 0 }));
        assert_eq!(parse("- cat"), Err(ParseError::EmptyTag { position: 0 }));
        assert_eq!(parse("a ~\tb"), Err(ParseError::EmptyTag { position: 2 }));
    }

    #[test]
    fn test_error_serialization() {
        let json = serde_json::to_value(ParseError::EmptyTag { position: 2 }).unwrap();
        assert_eq!(json["type"], "empty_tag");
        assert_eq!(json["position"], 2);
    }

    #[test]
    fn test_parser_is_reentrant() {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                std::thread::spawn(move || {
                    let input = format!("t{} or o{} -x{}", i, i, i);
                    parse(&input).unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let query = handle.join().unwrap();
            assert_eq!(query.include_tags, vec![format!("t{}", i)]);
            assert_eq!(query.optional_tags, vec![format!("o{}", i)]);
            assert_eq!(query.exclude_tags, vec![format!("x{}", i)]);
        }
    }

    /// 简单的线性同余生成器，避免测试依赖随机数 crate
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, bound: usize) -> usize {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((self.0 >> 33) as usize) % bound
        }
    }

    fn random_tag(rng: &mut Lcg) -> String {
        let alphabet: Vec<char> = ('\x21'..='\x7e').filter(|c| lexer::is_tag_char(*c)).collect();
        let len = 1 + rng.next(8);
        loop {
            let tag: String = (0..len).map(|_| alphabet[rng.next(alphabet.len())]).collect();
            // 普通词项不能以运算符开头，也不能是保留字
            if !tag.starts_with(['-', '~']) && tag != OR_KEYWORD {
                return tag;
            }
        }
    }

    #[test]
    fn test_round_trip_random_queries() {
        let mut rng = Lcg(0x5eed);
        let separators = [" ", "  ", "\t", "\n", " \r\n "];

        for _ in 0..500 {
            let mut input = String::new();
            let mut expected = Vec::new();
            for _ in 0..rng.next(10) {
                let tag = random_tag(&mut rng);
                let term = match rng.next(4) {
                    0 => format!("-{}", tag),
                    1 => format!("~{}", tag),
                    2 => format!("or {}", tag),
                    _ => tag.clone(),
                };
                expected.push(tag);
                input.push_str(&term);
                input.push_str(separators[rng.next(separators.len())]);
            }

            let query = parse(&input).unwrap_or_else(|e| panic!("{:?} failed: {}", input, e));
            let mut seen: Vec<String> = query
                .include_tags
                .iter()
                .chain(&query.optional_tags)
                .chain(&query.exclude_tags)
                .cloned()
                .collect();
            seen.sort();
            expected.sort();
            assert_eq!(seen, expected, "input {:?}", input);

            let reparsed = parse(&query.to_query_string()).unwrap();
            assert_eq!(reparsed, query, "input {:?}", input);
        }
    }
}
