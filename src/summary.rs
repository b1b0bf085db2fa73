//! Built-in request-summary table configuration.
//!
//! The deployment this crate ships for routes nginx `request.summary`
//! records into one columnar table. This module holds that table's schema,
//! mapping rules, and partition dimensions as process-wide immutable
//! configuration, plus a constructor wiring them into a [`Pipeline`].
//!
//! # Usage
//!
//! ```ignore
//! use logs2records::{request_summary_pipeline, Predicate};
//!
//! let pipeline = request_summary_pipeline(Predicate::always())?;
//! let output = pipeline.process(&record)?;
//! ```

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::partition::PartitionDimension;
use crate::predicate::Predicate;
use crate::project::MappingRule;
use crate::record::Attribute;
use crate::schema::{Column, ScalarKind, TableSchema};
use crate::Pipeline;

/// `Type` literal selecting records for the request-summary table.
pub const REQUEST_SUMMARY_TYPE: &str = "request.summary";

static REQUEST_SUMMARY_SCHEMA: Lazy<TableSchema> = Lazy::new(|| {
    TableSchema::new(
        vec![
            Column::required("Timestamp", ScalarKind::Int64),
            Column::optional("Type", ScalarKind::Utf8),
            Column::optional("Hostname", ScalarKind::Utf8),
            Column::optional("Logger", ScalarKind::Utf8),
            Column::optional("EnvVersion", ScalarKind::Utf8),
            Column::optional("Severity", ScalarKind::Int64),
            Column::optional("Pid", ScalarKind::Int64),
            Column::optional("fields_agent", ScalarKind::Utf8),
            Column::optional("fields_lang", ScalarKind::Utf8),
            Column::optional("fields_method", ScalarKind::Utf8),
            Column::optional("fields_path", ScalarKind::Utf8),
            Column::optional("fields_rid", ScalarKind::Utf8),
            Column::optional("fields_uid", ScalarKind::Utf8),
            Column::optional("fields_user_agent_browser", ScalarKind::Utf8),
            Column::optional("fields_user_agent_os", ScalarKind::Utf8),
            Column::optional("fields_user_agent_version", ScalarKind::Int64),
            Column::optional("fields_errno", ScalarKind::Int64),
            Column::optional("fields_t", ScalarKind::Int64),
        ],
        "fields",
    )
    .expect("request summary schema is valid")
});

/// Returns the request-summary table schema.
///
/// Columns, in order:
/// - Timestamp: Int64 (required)
/// - Type, Hostname, Logger, EnvVersion: Utf8 (optional)
/// - Severity, Pid: Int64 (optional)
/// - fields_agent, fields_lang, fields_method, fields_path, fields_rid,
///   fields_uid: Utf8 (optional)
/// - fields_user_agent_browser, fields_user_agent_os: Utf8 (optional)
/// - fields_user_agent_version, fields_errno, fields_t: Int64 (optional)
/// - fields: Map<Utf8, Utf8> residual column (trailing)
pub fn request_summary_schema() -> TableSchema {
    REQUEST_SUMMARY_SCHEMA.clone()
}

/// Returns the mapping rules for the request-summary table.
///
/// The seven fixed attributes map to their like-named columns. Dynamic
/// fields `lang`, `method`, `path`, `rid`, and `uid` project verbatim;
/// `errno` and `t` coerce to integers; `agent` feeds the user-agent column
/// family with `fields_agent` as its raw fallback.
pub fn request_summary_rules() -> Vec<MappingRule> {
    vec![
        MappingRule::attribute("Timestamp", Attribute::Timestamp),
        MappingRule::attribute("Type", Attribute::Type),
        MappingRule::attribute("Hostname", Attribute::Hostname),
        MappingRule::attribute("Logger", Attribute::Logger),
        MappingRule::attribute("EnvVersion", Attribute::EnvVersion),
        MappingRule::attribute("Severity", Attribute::Severity),
        MappingRule::attribute("Pid", Attribute::Pid),
        MappingRule::field("fields_lang", "lang"),
        MappingRule::field("fields_method", "method"),
        MappingRule::field("fields_path", "path"),
        MappingRule::field("fields_rid", "rid"),
        MappingRule::field("fields_uid", "uid"),
        MappingRule::field("fields_errno", "errno"),
        MappingRule::field("fields_t", "t"),
        MappingRule::user_agent(
            "agent",
            "fields_user_agent_browser",
            "fields_user_agent_os",
            "fields_user_agent_version",
            "fields_agent",
        ),
    ]
}

/// Returns the four request-summary partition dimensions, in path order:
/// `log` from the `Type` attribute, then `type`, `date`, and `hour` from
/// the dynamic fields `Type`, `Date`, and `Hour`.
pub fn request_summary_dimensions() -> Vec<PartitionDimension> {
    vec![
        PartitionDimension::attribute("log", Attribute::Type),
        PartitionDimension::field("type", "Type"),
        PartitionDimension::field("date", "Date"),
        PartitionDimension::field("hour", "Hour"),
    ]
}

/// Build the request-summary pipeline.
///
/// The host's base predicate is extended by conjunction with
/// `Fields["Type"] == "request.summary"`, so only request-summary records
/// reach projection regardless of what the base accepts.
///
/// # Arguments
///
/// * `base` - Host-supplied base predicate; use [`Predicate::always`] to
///   select on the type literal alone
///
/// # Returns
///
/// A ready [`Pipeline`], or [`crate::Error::Config`] if the built-in
/// configuration fails rule validation.
pub fn request_summary_pipeline(base: Predicate) -> Result<Pipeline> {
    let predicate = base.and(Predicate::field_equals("Type", REQUEST_SUMMARY_TYPE));
    Pipeline::new(
        predicate,
        request_summary_schema(),
        request_summary_rules(),
        request_summary_dimensions(),
    )
}
