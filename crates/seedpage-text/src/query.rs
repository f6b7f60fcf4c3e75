//! Translation of a text query plus exact filters into a tantivy query.
//!
//! Every token of the text query must prefix-match a token of `name`. An
//! absent or blank query matches everything; a non-blank query that yields no
//! tokens (only punctuation, say) matches nothing.

use std::fmt::Write as _;

use tantivy::query::{AllQuery, BooleanQuery, EmptyQuery, Occur, Query, RegexQuery, TermQuery};
use tantivy::schema::IndexRecordOption;
use tantivy::tokenizer::TokenStream;
use tantivy::{Index, Term};

use seedpage_core::types::FieldFilter;

use crate::tantivy_utils::Fields;

pub fn build_match_query(index: &Index, fields: &Fields, text: Option<&str>, filter: FieldFilter) -> tantivy::Result<Box<dyn Query>> {
	let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
	if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
		let tokens = analyze(index, fields, text)?;
		if tokens.is_empty() { return Ok(Box::new(EmptyQuery)); }
		for token in tokens {
			let prefix = RegexQuery::from_pattern(&prefix_pattern(&token), fields.name)?;
			clauses.push((Occur::Must, Box::new(prefix)));
		}
	}
	if let Some(promoted) = filter.promoted {
		let term = Term::from_field_bool(fields.promoted, promoted);
		clauses.push((Occur::Must, Box::new(TermQuery::new(term, IndexRecordOption::Basic))));
	}
	if clauses.is_empty() { return Ok(Box::new(AllQuery)); }
	Ok(Box::new(BooleanQuery::new(clauses)))
}

pub fn id_query(fields: &Fields, id: u64) -> TermQuery {
	TermQuery::new(Term::from_field_u64(fields.id, id), IndexRecordOption::Basic)
}

/// Tokens of `text` as the index sees them, deduplicated, in input order.
fn analyze(index: &Index, fields: &Fields, text: &str) -> tantivy::Result<Vec<String>> {
	let mut analyzer = index.tokenizer_for_field(fields.name)?;
	let mut stream = analyzer.token_stream(text);
	let mut tokens: Vec<String> = Vec::new();
	while stream.advance() {
		let token = &stream.token().text;
		if !token.is_empty() && !tokens.contains(token) { tokens.push(token.clone()); }
	}
	Ok(tokens)
}

/// `token` as a literal followed by anything. Non-alphanumeric characters are
/// written as hex escapes so no token can inject regex syntax.
fn prefix_pattern(token: &str) -> String {
	let mut pattern = String::with_capacity(token.len() + 2);
	for c in token.chars() {
		if c.is_alphanumeric() { pattern.push(c); } else { let _ = write!(pattern, "\\x{{{:X}}}", c as u32); }
	}
	pattern.push_str(".*");
	pattern
}
