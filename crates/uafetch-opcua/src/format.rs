// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Text rendering of read results and browse trees.
//!
//! Read records are `tag,value,timestamp` with no escaping: a value that
//! contains a comma produces a record with more than three fields.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::browse::TreeLine;
use crate::client::{DataValue, Variant};

/// Placeholder for a missing timestamp.
pub const MISSING_TIMESTAMP: &str = "null";

/// Indentation unit per depth level.
pub const INDENT_UNIT: &str = "- ";

/// Renders a timestamp as RFC 3339 UTC with milliseconds.
pub fn format_timestamp(timestamp: Option<&DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => MISSING_TIMESTAMP.to_string(),
    }
}

/// Renders `tag,value,timestamp`.
pub fn format_read(tag: &str, value: &Variant, timestamp: Option<&DateTime<Utc>>) -> String {
    format!("{},{},{}", tag, value, format_timestamp(timestamp))
}

/// Renders a read result using its server timestamp.
pub fn format_data_value(tag: &str, value: &DataValue) -> String {
    format_read(tag, &value.value, value.server_timestamp.as_ref())
}

/// Renders one tree line.
pub fn format_tree_line(line: &TreeLine, indent: bool) -> String {
    if indent {
        format!("{}{}", INDENT_UNIT.repeat(line.depth), line.node)
    } else {
        line.node.to_string()
    }
}

/// Joins tree lines with `\n`, without a trailing separator.
pub fn format_tree(lines: &[TreeLine], indent: bool) -> String {
    lines
        .iter()
        .map(|line| format_tree_line(line, indent))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExpandedNodeId, NodeId};
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 45).unwrap()
            + chrono::Duration::milliseconds(120)
    }

    #[test]
    fn test_format_read() {
        let out = format_read("ns=2;s=Temperature", &Variant::Double(42.5), Some(&ts()));
        assert_eq!(out, "ns=2;s=Temperature,42.5,2024-06-01T12:30:45.120Z");
    }

    #[test]
    fn test_format_read_missing_timestamp() {
        let out = format_read("i=2258", &Variant::Null, None);
        assert_eq!(out, "i=2258,null,null");
    }

    #[test]
    fn test_commas_are_not_escaped() {
        let out = format_read("ns=1;s=Csv", &Variant::from("a,b"), Some(&ts()));
        assert_eq!(out.split(',').count(), 4);
    }

    #[test]
    fn test_format_data_value_uses_server_timestamp() {
        let mut value = DataValue::new(true, ts());
        value.source_timestamp = Some(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            format_data_value("ns=3;i=7", &value),
            "ns=3;i=7,true,2024-06-01T12:30:45.120Z"
        );
    }

    #[test]
    fn test_format_tree() {
        let lines = vec![
            TreeLine {
                depth: 1,
                node: ExpandedNodeId::from(NodeId::objects_folder()),
            },
            TreeLine {
                depth: 2,
                node: ExpandedNodeId::from(NodeId::server()),
            },
        ];

        assert_eq!(format_tree(&lines, false), "i=85\ni=2253");
        assert_eq!(format_tree(&lines, true), "- i=85\n- - i=2253");
        assert_eq!(format_tree(&[], true), "");
    }
}
