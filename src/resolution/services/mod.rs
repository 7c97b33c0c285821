mod finding_converter;
mod finding_deduplicator;
mod finding_sorter;
mod query_builder;

pub use finding_converter::FindingConverter;
pub use finding_deduplicator::dedup_findings;
pub use finding_sorter::sort_findings;
pub use query_builder::{LuceneQueryBuilder, QueryBuilder};
