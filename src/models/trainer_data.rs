use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text, Timestamp};
use serde_json::{Map, Value};

use crate::domain::category::{Category, ColumnKind, FieldValue};
use crate::domain::trainer_data::TrainerDataRow;
use crate::domain::types::{TrainerId, TypeConstraintError};

/// Raw row of any trainer data table.
///
/// The payload columns of the category are folded into one JSON object so a
/// single record type can serve all nine tables.
#[derive(Debug, Clone, QueryableByName)]
pub struct TrainerDataRecord {
    #[diesel(sql_type = Integer)]
    pub id: i32,
    #[diesel(sql_type = Text)]
    pub trainer_id: String,
    #[diesel(sql_type = Timestamp)]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = Text)]
    pub payload: String,
}

#[derive(Debug, QueryableByName)]
pub struct RowCount {
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}

#[derive(Debug, QueryableByName)]
pub struct InsertedRow {
    #[diesel(sql_type = Integer)]
    pub id: i32,
}

impl TrainerDataRecord {
    /// Decodes the record using the column layout of `category`.
    pub fn into_domain(self, category: Category) -> Result<TrainerDataRow, TypeConstraintError> {
        let payload: Map<String, Value> = serde_json::from_str(&self.payload).map_err(|e| {
            TypeConstraintError::InvalidValue(format!("{} payload: {e}", category.slug()))
        })?;

        let fields: BTreeMap<String, FieldValue> = category
            .spec()
            .columns
            .iter()
            .map(|column| {
                let value = decode_value(column.kind, payload.get(column.name));
                (column.name.to_string(), value)
            })
            .collect();

        Ok(TrainerDataRow {
            id: self.id.try_into()?,
            trainer_id: TrainerId::new(self.trainer_id)?,
            category,
            created_at: self.created_at,
            fields,
        })
    }
}

fn decode_value(kind: ColumnKind, value: Option<&Value>) -> FieldValue {
    match (kind, value) {
        (ColumnKind::Text, Some(Value::String(text))) => FieldValue::Text(text.clone()),
        (ColumnKind::Text, None | Some(Value::Null)) => FieldValue::Text(String::new()),
        (ColumnKind::Text, Some(other)) => FieldValue::Text(other.to_string()),
        (ColumnKind::Tags, Some(Value::String(raw))) => FieldValue::Tags(decode_tags(raw)),
        (ColumnKind::Tags, Some(Value::Array(items))) => FieldValue::Tags(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        (ColumnKind::Tags, _) => FieldValue::Tags(Vec::new()),
    }
}

/// Parses a stored tag list. Legacy scalar text is read as a single tag.
pub fn decode_tags(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_else(|_| vec![raw.to_string()])
}

/// Storage text of a payload value; tag lists become JSON arrays.
pub fn encode_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::Tags(tags) => serde_json::json!(tags).to_string(),
    }
}
