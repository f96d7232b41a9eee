use aml_store::ChainReader;
use aml_types::{Block, BlockHash, EvaluationRecord};
use serde::Serialize;

use crate::error::QueryError;
use crate::filter::RecordFilter;

/// A matching record together with the block that sealed it.
#[derive(Clone, Debug, Serialize)]
pub struct RecordHit {
    pub block_index: u64,
    pub block_hash: BlockHash,
    pub block_timestamp: u64,
    pub record: EvaluationRecord,
}

/// One page of filtered results. `total` counts every match in the chain,
/// not just the page, so callers can render page controls.
#[derive(Clone, Debug, Serialize)]
pub struct RecordPage {
    pub hits: Vec<RecordHit>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Filtered, paginated read over the whole chain.
///
/// Matches are ordered by block index, then by record position within the
/// block. `page` is zero-based; a page past the end returns an empty page
/// with the correct `total`. Never mutates the store.
pub fn query(
    reader: &dyn ChainReader,
    filter: &RecordFilter,
    page: usize,
    page_size: usize,
) -> Result<RecordPage, QueryError> {
    if page_size == 0 {
        return Err(QueryError::ZeroPageSize);
    }

    let mut hits = Vec::new();
    for block in full_chain(reader)? {
        for record in &block.records {
            if filter.matches(record) {
                hits.push(RecordHit {
                    block_index: block.index,
                    block_hash: block.hash,
                    block_timestamp: block.timestamp,
                    record: record.clone(),
                });
            }
        }
    }

    let total = hits.len();
    let start = page.saturating_mul(page_size);
    Ok(RecordPage {
        hits: hits.into_iter().skip(start).take(page_size).collect(),
        total,
        page,
        page_size,
    })
}

/// Every block of the chain, oldest first.
pub fn export(reader: &dyn ChainReader) -> Result<Vec<Block>, QueryError> {
    full_chain(reader)
}

/// JSON rendering of the full chain, for external audit tooling.
pub fn export_json(reader: &dyn ChainReader) -> Result<String, QueryError> {
    let blocks = full_chain(reader)?;
    serde_json::to_string_pretty(&blocks).map_err(|e| QueryError::Serialization(e.to_string()))
}

fn full_chain(reader: &dyn ChainReader) -> Result<Vec<Block>, QueryError> {
    let len = reader.len()?;
    if len == 0 {
        return Ok(Vec::new());
    }
    Ok(reader.range(0, len - 1)?)
}
