//! Statistics-driven scan engine
//!
//! Plans a scan by evaluating a [`sarg::SearchArgument`] against file, stripe
//! and row-group statistics supplied by a [`StripeSource`], then produces
//! batches of the retained rows behind an absolute row cursor that supports
//! seeking.
//!
//! ```ignore
//! let reader = Reader::open(source)?;
//! let options = RowReaderOptions::new().with_search_argument(sarg);
//! let mut rows = reader.row_reader(&options)?;
//! let mut batch = rows.create_row_batch(1024)?;
//! while rows.produce_batch(&mut batch)? {
//!     println!("{} rows at {}", batch.num_rows(), rows.current_row_number());
//! }
//! ```

pub mod batch;
pub mod cursor;
pub mod error;
pub mod metrics;
pub mod plan;
pub mod reader;
pub mod schema;
pub mod source;
pub mod vector;

pub use batch::RowBatch;
pub use cursor::{ScanCursor, ScanState};
pub use error::{ReaderError, Result};
pub use metrics::ReaderMetrics;
pub use plan::{filter_row_groups, PruningOptions, RowRange, ScanPlan, StripeInfo};
pub use reader::{Reader, RowReader, RowReaderOptions, DEFAULT_BATCH_SIZE};
pub use schema::Schema;
pub use source::StripeSource;
pub use vector::ColumnVector;
