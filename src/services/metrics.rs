use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Catalog loads by outcome (cache, source, transport_error, content_error)
    pub static ref CATALOG_LOADS: IntCounterVec = register_int_counter_vec!(
        "catalog_loads_total",
        "Catalog load attempts by outcome",
        &["outcome"]
    )
    .unwrap();

    /// Cache lookups by result (hit, absent, corrupt, expired, empty)
    pub static ref CACHE_LOOKUPS: IntCounterVec = register_int_counter_vec!(
        "catalog_cache_lookups_total",
        "Catalog cache lookups by result",
        &["result"]
    )
    .unwrap();

    /// Candidate sources that failed, by source kind
    pub static ref SOURCE_FAILURES: IntCounterVec = register_int_counter_vec!(
        "catalog_source_failures_total",
        "Playlist source fetch failures by source kind",
        &["kind"]
    )
    .unwrap();
}
