//! Postgres-backed page sources for the Cumulus side.
//!
//! Both cursors page with LIMIT/OFFSET derived from the zero-based page
//! index and order rows to match the merge-join's composite key: granules by
//! `(granule_id, collection name, collection version)`, collections by
//! `(name, version)`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use cirrus_core::{
    construct_collection_id, CirrusError, CirrusResult, CumulusFile, CumulusGranuleRecord, Page,
    PageSource,
};

use crate::exclusion::CollectionConfigRecord;
use crate::params::ReconciliationParams;

const DEFAULT_PAGE_SIZE: usize = 1000;

/// Paginated cursor over Cumulus granules joined with their files.
///
/// Pages are fetched in two steps so a granule's file set is never split
/// across pages: first a page of granule rows, then all files for that page.
#[derive(Debug)]
pub struct PgGranuleSource {
    pool: PgPool,
    collection_ids: Option<Vec<String>>,
    granule_ids: Option<Vec<String>>,
    providers: Option<Vec<String>>,
    created_at_from: Option<DateTime<Utc>>,
    created_at_to: Option<DateTime<Utc>>,
    page_size: usize,
}

impl PgGranuleSource {
    #[must_use]
    pub fn new(pool: PgPool, params: &ReconciliationParams) -> Self {
        Self {
            pool,
            collection_ids: params.collection_ids.clone(),
            granule_ids: params.granule_ids.clone(),
            providers: params.providers.clone(),
            created_at_from: params.start_timestamp,
            created_at_to: params.end_timestamp,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GranuleRow {
    cumulus_id: i64,
    granule_id: String,
    collection_name: String,
    collection_version: String,
    provider: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct FileRow {
    granule_cumulus_id: i64,
    bucket: String,
    key: String,
}

/// Assemble granule records from a page of granule rows and their files,
/// preserving the row order of both queries.
fn assemble_granules(rows: Vec<GranuleRow>, files: Vec<FileRow>) -> Vec<CumulusGranuleRecord> {
    let mut files_by_granule: HashMap<i64, Vec<CumulusFile>> = HashMap::new();
    for file in files {
        files_by_granule
            .entry(file.granule_cumulus_id)
            .or_default()
            .push(CumulusFile {
                bucket: file.bucket,
                key: file.key,
            });
    }

    rows.into_iter()
        .map(|row| CumulusGranuleRecord {
            granule_id: row.granule_id,
            collection_id: construct_collection_id(&row.collection_name, &row.collection_version),
            provider: row.provider,
            created_at: row.created_at,
            updated_at: row.updated_at,
            files: files_by_granule.remove(&row.cumulus_id).unwrap_or_default(),
        })
        .collect()
}

#[async_trait]
impl PageSource for PgGranuleSource {
    type Item = CumulusGranuleRecord;

    async fn fetch_page(&mut self, page_index: usize) -> CirrusResult<Page<CumulusGranuleRecord>> {
        let limit = self.page_size as i64;
        let offset = (page_index * self.page_size) as i64;

        // Tuple ORDER BY, not the `granuleId:collectionId` concatenation the
        // driver compares with. The two diverge when one granule_id is a
        // prefix of another (`g1` vs `g10`); the backup catalog sorts its
        // side the same way, so the cursors stay aligned.
        let rows: Vec<GranuleRow> = sqlx::query_as(
            r"
            SELECT
                g.cumulus_id, g.granule_id,
                c.name AS collection_name, c.version AS collection_version,
                p.name AS provider,
                g.created_at, g.updated_at
            FROM granules g
            JOIN collections c ON c.cumulus_id = g.collection_cumulus_id
            JOIN providers p ON p.cumulus_id = g.provider_cumulus_id
            WHERE ($1::text[] IS NULL OR c.name || '___' || c.version = ANY($1))
              AND ($2::text[] IS NULL OR g.granule_id = ANY($2))
              AND ($3::text[] IS NULL OR p.name = ANY($3))
              AND ($4::timestamptz IS NULL OR g.created_at >= $4)
              AND ($5::timestamptz IS NULL OR g.created_at <= $5)
            ORDER BY g.granule_id, c.name, c.version
            LIMIT $6 OFFSET $7
            ",
        )
        .bind(&self.collection_ids)
        .bind(&self.granule_ids)
        .bind(&self.providers)
        .bind(self.created_at_from)
        .bind(self.created_at_to)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        if rows.is_empty() {
            return Ok(Page::end());
        }

        let granule_cumulus_ids: Vec<i64> = rows.iter().map(|r| r.cumulus_id).collect();
        let files: Vec<FileRow> = sqlx::query_as(
            r"
            SELECT f.granule_cumulus_id, f.bucket, f.key
            FROM files f
            WHERE f.granule_cumulus_id = ANY($1)
            ORDER BY f.granule_cumulus_id, f.key
            ",
        )
        .bind(&granule_cumulus_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        let another_page = rows.len() == self.page_size;
        Ok(Page {
            items: assemble_granules(rows, files),
            another_page,
        })
    }
}

/// Paginated cursor over collection exclusion configuration.
#[derive(Debug)]
pub struct PgCollectionSource {
    pool: PgPool,
    collection_ids: Option<Vec<String>>,
    page_size: usize,
}

impl PgCollectionSource {
    #[must_use]
    pub fn new(pool: PgPool, collection_ids: Option<Vec<String>>) -> Self {
        Self {
            pool,
            collection_ids,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CollectionRow {
    name: String,
    version: String,
    excluded_file_extensions: Option<sqlx::types::Json<Vec<String>>>,
}

#[async_trait]
impl PageSource for PgCollectionSource {
    type Item = CollectionConfigRecord;

    async fn fetch_page(
        &mut self,
        page_index: usize,
    ) -> CirrusResult<Page<CollectionConfigRecord>> {
        let limit = self.page_size as i64;
        let offset = (page_index * self.page_size) as i64;

        let rows: Vec<CollectionRow> = sqlx::query_as(
            r"
            SELECT
                c.name, c.version,
                c.meta #> '{orca,excludedFileExtensions}' AS excluded_file_extensions
            FROM collections c
            WHERE ($1::text[] IS NULL OR c.name || '___' || c.version = ANY($1))
            ORDER BY c.name, c.version
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(&self.collection_ids)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        let another_page = rows.len() == self.page_size;
        Ok(Page {
            items: rows
                .into_iter()
                .map(|row| CollectionConfigRecord {
                    name: row.name,
                    version: row.version,
                    excluded_file_extensions: row.excluded_file_extensions.map(|json| json.0),
                })
                .collect(),
            another_page,
        })
    }
}
