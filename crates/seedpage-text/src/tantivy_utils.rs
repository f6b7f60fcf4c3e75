use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, FAST, INDEXED, STORED};
use tantivy::tokenizer::{AsciiFoldingFilter, LowerCaser, SimpleTokenizer, TextAnalyzer};
use tantivy::Index;

pub const NAME_TOKENIZER: &str = "entity_name";

/// Resolved handles of the entity schema.
#[derive(Debug, Clone, Copy)]
pub struct Fields {
	pub id: Field,
	pub name: Field,
	pub promoted: Field,
}

impl Fields {
	pub fn resolve(schema: &Schema) -> tantivy::Result<Self> {
		Ok(Self { id: schema.get_field("id")?, name: schema.get_field("name")?, promoted: schema.get_field("promoted")? })
	}
}

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	let _id_field = schema_builder.add_u64_field("id", INDEXED | STORED | FAST);
	let name_indexing = TextFieldIndexing::default().set_tokenizer(NAME_TOKENIZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let name_options = TextOptions::default().set_indexing_options(name_indexing).set_stored();
	let _name_field = schema_builder.add_text_field("name", name_options);
	let _promoted_field = schema_builder.add_bool_field("promoted", INDEXED | STORED);
	schema_builder.build()
}

/// Names are matched case- and accent-insensitively, without stop words:
/// "The" is a meaningful token in a name.
pub fn register_tokenizer(index: &Index) {
	let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(AsciiFoldingFilter)
		.build();
	index.tokenizers().register(NAME_TOKENIZER, tokenizer);
}
