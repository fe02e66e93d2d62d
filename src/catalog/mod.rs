mod records;
mod store;

pub use records::{
    CatalogEntry, CatalogReader, DownloadSummary, FetchRow, IngestSummary, UntaggedDownload,
};
pub use store::Catalog;
