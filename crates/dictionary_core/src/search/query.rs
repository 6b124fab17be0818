//! Query-string parsing and translation to SQL over an index schema.
//!
//! Supported syntax is a subset of the Lucene query-string language:
//! `term`, `"phrase"`, `field:term`, `field:"phrase"`, `term*`, `*`, `*:*`,
//! `field:*`, `AND`/`&&`, `OR`/`||`, `NOT`/`!`/`-`, `+`, and parentheses.
//!
//! # Invariants
//! - Adjacent clauses without an operator are joined with OR.
//! - AND binds tighter than OR.
//! - User values only ever reach SQL as bound parameters.

use super::document::{FieldKind, IndexSchema};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use thiserror::Error;

static FIELD_CLAUSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_.]*):(.*)$").expect("valid field regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unterminated phrase")]
    UnterminatedPhrase,
    #[error("unbalanced parentheses")]
    UnbalancedParentheses,
    #[error("unexpected `{0}`")]
    UnexpectedToken(String),
    #[error("query ends unexpectedly")]
    UnexpectedEnd,
    #[error("field `{0}` has no value")]
    EmptyValue(String),
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("field `{field}` expects a number, got `{value}`")]
    InvalidNumber { field: String, value: String },
}

/// A single `[field:]value` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub field: Option<String>,
    pub value: String,
    /// Value came from a quoted phrase; wildcards inside are literal.
    pub phrase: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryNode {
    MatchAll,
    Term(Clause),
    And(Vec<QueryNode>),
    Or(Vec<QueryNode>),
    Not(Box<QueryNode>),
}

/// Parameterized SQL boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFilter {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    And,
    Or,
    Not,
    Required,
    LParen,
    RParen,
    Clause(Clause),
}

/// Parses a query string. Returns `Ok(None)` for a blank query.
pub fn parse_query(input: &str) -> Result<Option<QueryNode>, QueryError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let node = parser.parse_or()?;
    match parser.peek() {
        None => Ok(Some(node)),
        Some(Token::RParen) => Err(QueryError::UnbalancedParentheses),
        Some(other) => Err(QueryError::UnexpectedToken(describe(other))),
    }
}

/// Translates a parsed query into a WHERE expression over `schema`'s table.
pub fn compile(node: &QueryNode, schema: &IndexSchema) -> Result<SqlFilter, QueryError> {
    let mut filter = SqlFilter {
        sql: String::new(),
        params: Vec::new(),
    };
    compile_into(node, schema, &mut filter)?;
    Ok(filter)
}

fn compile_into(
    node: &QueryNode,
    schema: &IndexSchema,
    out: &mut SqlFilter,
) -> Result<(), QueryError> {
    match node {
        QueryNode::MatchAll => out.sql.push_str("1 = 1"),
        QueryNode::Term(clause) => compile_clause(clause, schema, out)?,
        QueryNode::And(children) | QueryNode::Or(children) => {
            let joiner = if matches!(node, QueryNode::And(_)) {
                " AND "
            } else {
                " OR "
            };
            out.sql.push('(');
            for (index, child) in children.iter().enumerate() {
                if index > 0 {
                    out.sql.push_str(joiner);
                }
                compile_into(child, schema, out)?;
            }
            out.sql.push(')');
        }
        QueryNode::Not(child) => {
            out.sql.push_str("NOT (");
            compile_into(child, schema, out)?;
            out.sql.push(')');
        }
    }
    Ok(())
}

fn compile_clause(
    clause: &Clause,
    schema: &IndexSchema,
    out: &mut SqlFilter,
) -> Result<(), QueryError> {
    let is_wildcard = !clause.phrase && clause.value == "*";

    let Some(field_name) = clause.field.as_deref() else {
        if is_wildcard {
            out.sql.push_str("1 = 1");
        } else {
            push_fts_match(schema, None, clause, out);
        }
        return Ok(());
    };

    let field = schema
        .field(field_name)
        .ok_or_else(|| QueryError::UnknownField(field_name.to_string()))?;

    if is_wildcard {
        out.sql
            .push_str(&format!("{}.{} IS NOT NULL", schema.table, field.column));
        return Ok(());
    }

    match field.kind {
        FieldKind::Integer => {
            let number = clause
                .value
                .trim()
                .parse::<i64>()
                .map_err(|_| QueryError::InvalidNumber {
                    field: field_name.to_string(),
                    value: clause.value.clone(),
                })?;
            out.sql
                .push_str(&format!("{}.{} = ?", schema.table, field.column));
            out.params.push(Value::Integer(number));
        }
        FieldKind::Text => push_fts_match(schema, Some(field.column), clause, out),
    }
    Ok(())
}

fn push_fts_match(
    schema: &IndexSchema,
    column: Option<&str>,
    clause: &Clause,
    out: &mut SqlFilter,
) {
    let (text, prefix) = if clause.phrase {
        (clause.value.as_str(), false)
    } else {
        match clause.value.strip_suffix('*') {
            Some(stem) => (stem.trim_end_matches('*'), true),
            None => (clause.value.as_str(), false),
        }
    };

    let mut expr = format!("\"{}\"", text.replace('"', "\"\""));
    if prefix {
        expr.push_str(" *");
    }
    if let Some(column) = column {
        expr = format!("{column} : {expr}");
    }

    out.sql.push_str(&format!(
        "{table}.id IN (SELECT rowid FROM {fts} WHERE {fts} MATCH ?)",
        table = schema.table,
        fts = schema.fts_table
    ));
    out.params.push(Value::Text(expr));
}

fn tokenize(input: &str) -> Result<Vec<Token>, QueryError> {
    let chars = input.chars().collect::<Vec<_>>();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '"' => {
                let (value, next) = read_phrase(&chars, i + 1)?;
                tokens.push(Token::Clause(Clause {
                    field: None,
                    value,
                    phrase: true,
                }));
                i = next;
            }
            '-' | '!' | '+' if chars.get(i + 1).is_some_and(|n| !n.is_whitespace()) => {
                tokens.push(if c == '+' { Token::Required } else { Token::Not });
                i += 1;
            }
            _ => {
                let start = i;
                while i < chars.len() && !chars[i].is_whitespace() && !matches!(chars[i], '(' | ')')
                {
                    if chars[i] == ':' && chars.get(i + 1) == Some(&'"') {
                        break;
                    }
                    i += 1;
                }
                let word = chars[start..i].iter().collect::<String>();

                if i < chars.len() && chars[i] == ':' {
                    let (value, next) = read_phrase(&chars, i + 2)?;
                    tokens.push(Token::Clause(Clause {
                        field: Some(word),
                        value,
                        phrase: true,
                    }));
                    i = next;
                    continue;
                }

                tokens.push(word_token(word)?);
            }
        }
    }

    Ok(tokens)
}

/// Reads a quoted phrase starting after its opening quote.
fn read_phrase(chars: &[char], start: usize) -> Result<(String, usize), QueryError> {
    let end = chars[start..]
        .iter()
        .position(|c| *c == '"')
        .map(|offset| start + offset)
        .ok_or(QueryError::UnterminatedPhrase)?;
    let value = chars[start..end].iter().collect::<String>();
    Ok((value, end + 1))
}

fn word_token(word: String) -> Result<Token, QueryError> {
    match word.as_str() {
        "AND" | "&&" => return Ok(Token::And),
        "OR" | "||" => return Ok(Token::Or),
        "NOT" => return Ok(Token::Not),
        "*:*" => {
            return Ok(Token::Clause(Clause {
                field: None,
                value: "*".to_string(),
                phrase: false,
            }))
        }
        _ => {}
    }

    if let Some(captures) = FIELD_CLAUSE_RE.captures(&word) {
        let field = captures[1].to_string();
        let value = captures[2].to_string();
        if value.is_empty() {
            return Err(QueryError::EmptyValue(field));
        }
        return Ok(Token::Clause(Clause {
            field: Some(field),
            value,
            phrase: false,
        }));
    }

    Ok(Token::Clause(Clause {
        field: None,
        value: word,
        phrase: false,
    }))
}

fn describe(token: &Token) -> String {
    match token {
        Token::And => "AND".to_string(),
        Token::Or => "OR".to_string(),
        Token::Not => "NOT".to_string(),
        Token::Required => "+".to_string(),
        Token::LParen => "(".to_string(),
        Token::RParen => ")".to_string(),
        Token::Clause(clause) => clause.value.clone(),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_or(&mut self) -> Result<QueryNode, QueryError> {
        let mut nodes = vec![self.parse_and()?];
        loop {
            match self.peek() {
                None | Some(Token::RParen) => break,
                Some(Token::Or) => {
                    self.pos += 1;
                    nodes.push(self.parse_and()?);
                }
                Some(_) => nodes.push(self.parse_and()?),
            }
        }
        Ok(collapse(nodes, QueryNode::Or))
    }

    fn parse_and(&mut self) -> Result<QueryNode, QueryError> {
        let mut nodes = vec![self.parse_unary()?];
        while matches!(self.peek(), Some(Token::And)) {
            self.pos += 1;
            nodes.push(self.parse_unary()?);
        }
        Ok(collapse(nodes, QueryNode::And))
    }

    fn parse_unary(&mut self) -> Result<QueryNode, QueryError> {
        match self.peek() {
            Some(Token::Not) => {
                self.pos += 1;
                Ok(QueryNode::Not(Box::new(self.parse_unary()?)))
            }
            Some(Token::Required) => {
                self.pos += 1;
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<QueryNode, QueryError> {
        match self.next() {
            Some(Token::LParen) => {
                let node = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(node),
                    _ => Err(QueryError::UnbalancedParentheses),
                }
            }
            Some(Token::Clause(clause)) => {
                if clause.field.is_none() && !clause.phrase && clause.value == "*" {
                    Ok(QueryNode::MatchAll)
                } else {
                    Ok(QueryNode::Term(clause))
                }
            }
            Some(Token::RParen) => Err(QueryError::UnbalancedParentheses),
            Some(other) => Err(QueryError::UnexpectedToken(describe(&other))),
            None => Err(QueryError::UnexpectedEnd),
        }
    }
}

fn collapse(mut nodes: Vec<QueryNode>, combine: fn(Vec<QueryNode>) -> QueryNode) -> QueryNode {
    if nodes.len() == 1 {
        return nodes.remove(0);
    }
    combine(nodes)
}

#[cfg(test)]
mod tests {
    use super::{compile, parse_query, Clause, QueryError, QueryNode};
    use crate::model::Word;
    use crate::search::document::IndexDocument;
    use rusqlite::types::Value;

    fn term(field: Option<&str>, value: &str) -> QueryNode {
        QueryNode::Term(Clause {
            field: field.map(str::to_string),
            value: value.to_string(),
            phrase: false,
        })
    }

    #[test]
    fn blank_query_parses_to_none() {
        assert_eq!(parse_query("   ").unwrap(), None);
    }

    #[test]
    fn adjacent_terms_default_to_or_and_and_binds_tighter() {
        let node = parse_query("cat dog AND en:mouse").unwrap().unwrap();
        assert_eq!(
            node,
            QueryNode::Or(vec![
                term(None, "cat"),
                QueryNode::And(vec![term(None, "dog"), term(Some("en"), "mouse")]),
            ])
        );
    }

    #[test]
    fn negation_groups_and_phrases() {
        let node = parse_query("-(rus:\"добрый день\" || id:4)").unwrap().unwrap();
        assert_eq!(
            node,
            QueryNode::Not(Box::new(QueryNode::Or(vec![
                QueryNode::Term(Clause {
                    field: Some("rus".to_string()),
                    value: "добрый день".to_string(),
                    phrase: true,
                }),
                term(Some("id"), "4"),
            ])))
        );
    }

    #[test]
    fn match_all_forms() {
        assert_eq!(parse_query("*").unwrap(), Some(QueryNode::MatchAll));
        assert_eq!(parse_query("*:*").unwrap(), Some(QueryNode::MatchAll));
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert_eq!(
            parse_query("\"open").unwrap_err(),
            QueryError::UnterminatedPhrase
        );
        assert_eq!(
            parse_query("(cat").unwrap_err(),
            QueryError::UnbalancedParentheses
        );
        assert_eq!(
            parse_query("cat)").unwrap_err(),
            QueryError::UnbalancedParentheses
        );
        assert_eq!(parse_query("cat AND").unwrap_err(), QueryError::UnexpectedEnd);
        assert_eq!(
            parse_query("rus:").unwrap_err(),
            QueryError::EmptyValue("rus".to_string())
        );
    }

    #[test]
    fn compile_numeric_field_binds_integer() {
        let node = parse_query("id:42").unwrap().unwrap();
        let filter = compile(&node, Word::schema()).unwrap();
        assert_eq!(filter.sql, "word_document.id = ?");
        assert_eq!(filter.params, vec![Value::Integer(42)]);
    }

    #[test]
    fn compile_text_field_uses_fts_column_filter_and_prefix() {
        let node = parse_query("en:hel*").unwrap().unwrap();
        let filter = compile(&node, Word::schema()).unwrap();
        assert_eq!(
            filter.sql,
            "word_document.id IN (SELECT rowid FROM word_document_fts WHERE word_document_fts MATCH ?)"
        );
        assert_eq!(filter.params, vec![Value::Text("en : \"hel\" *".to_string())]);
    }

    #[test]
    fn compile_rejects_unknown_field_and_bad_number() {
        let node = parse_query("color:red").unwrap().unwrap();
        assert_eq!(
            compile(&node, Word::schema()).unwrap_err(),
            QueryError::UnknownField("color".to_string())
        );

        let node = parse_query("categoryId:abc").unwrap().unwrap();
        assert!(matches!(
            compile(&node, Word::schema()).unwrap_err(),
            QueryError::InvalidNumber { .. }
        ));
    }

    #[test]
    fn compile_field_wildcard_checks_presence() {
        let node = parse_query("categoryId:*").unwrap().unwrap();
        let filter = compile(&node, Word::schema()).unwrap();
        assert_eq!(filter.sql, "word_document.category_id IS NOT NULL");
        assert!(filter.params.is_empty());
    }
}
