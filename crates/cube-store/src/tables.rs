//! redb table definitions for the durable store.
//!
//! Every bucket shares the `records` table. Keys are `(bucket, key)` tuples,
//! so a range scan over one bucket stops exactly at the bucket boundary even
//! when one bucket name is a prefix of another.

use redb::TableDefinition;

/// Serialized records keyed by `(bucket, logical_key)`.
pub const RECORDS: TableDefinition<(&str, &str), &[u8]> = TableDefinition::new("records");

/// Record kind bound to each bucket, keyed by bucket name.
pub const BUCKETS: TableDefinition<&str, &str> = TableDefinition::new("buckets");

/// Names of every table, for diagnostics.
pub const TABLE_NAMES: [&str; 2] = ["records", "buckets"];
