//! Conversions from the client model to Bigtable request messages.

use std::collections::HashMap;
use std::ops::Bound;

use dfdl_proto::admin::{gc_rule, ColumnFamily, CreateTableRequest, GcRule, Table};
use dfdl_proto::v2::mutation::{self, SetCell};
use dfdl_proto::v2::{row_range, MutateRowRequest, Mutation, ReadRowsRequest, RowRange, RowSet};

use crate::config::ClientConfig;
use crate::model::{self, client_timestamp_micros, Query, RowMutation, TableSpec};

pub(crate) fn mutate_row_request(config: &ClientConfig, row_mutation: RowMutation) -> MutateRowRequest {
    let now = client_timestamp_micros();
    let mutations = row_mutation
        .cells
        .into_iter()
        .map(|cell| Mutation {
            mutation: Some(mutation::Mutation::SetCell(SetCell {
                family_name: cell.family,
                column_qualifier: cell.qualifier,
                timestamp_micros: cell.timestamp_micros.unwrap_or(now),
                value: cell.value,
            })),
        })
        .collect();

    MutateRowRequest {
        table_name: config.table_name(&row_mutation.table_id),
        row_key: row_mutation.row_key,
        mutations,
        app_profile_id: config.app_profile_id.clone().unwrap_or_default(),
    }
}

pub(crate) fn read_rows_request(config: &ClientConfig, query: Query) -> ReadRowsRequest {
    let rows = if query.is_full_table() {
        None
    } else {
        Some(RowSet {
            row_keys: query.row_keys,
            row_ranges: query.ranges.into_iter().map(to_proto_range).collect(),
        })
    };

    ReadRowsRequest {
        table_name: config.table_name(&query.table_id),
        rows,
        rows_limit: query.limit.map_or(0, |l| l as i64),
        app_profile_id: config.app_profile_id.clone().unwrap_or_default(),
    }
}

fn to_proto_range(range: model::RowRange) -> RowRange {
    let start_key = match range.start {
        Bound::Included(key) => Some(row_range::StartKey::StartKeyClosed(key)),
        Bound::Excluded(key) => Some(row_range::StartKey::StartKeyOpen(key)),
        Bound::Unbounded => None,
    };
    let end_key = match range.end {
        Bound::Included(key) => Some(row_range::EndKey::EndKeyClosed(key)),
        Bound::Excluded(key) => Some(row_range::EndKey::EndKeyOpen(key)),
        Bound::Unbounded => None,
    };
    RowRange { start_key, end_key }
}

pub(crate) fn create_table_request(config: &ClientConfig, spec: TableSpec) -> CreateTableRequest {
    let column_families: HashMap<String, ColumnFamily> = spec
        .families
        .into_iter()
        .map(|family| {
            let gc_rule = family.max_versions.map(|max| GcRule {
                rule: Some(gc_rule::Rule::MaxNumVersions(max as i32)),
            });
            (family.name, ColumnFamily { gc_rule })
        })
        .collect();

    CreateTableRequest {
        parent: config.instance_name(),
        table_id: spec.table_id,
        table: Some(Table {
            column_families,
            ..Default::default()
        }),
    }
}
