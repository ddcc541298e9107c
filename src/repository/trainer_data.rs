use diesel::prelude::*;
use diesel::sql_types::{Integer, Text, Timestamp};
use diesel::sqlite::Sqlite;

use crate::domain::category::{Category, CategorySpec};
use crate::domain::trainer_data::{NewTrainerDataRow, TrainerDataChanges, TrainerDataRow};
use crate::domain::types::{RowId, TrainerId};
use crate::models::trainer_data::{InsertedRow, RowCount, TrainerDataRecord, encode_value};
use crate::repository::{
    DieselRepository, RepositoryError, RepositoryResult, TrainerDataReader, TrainerDataWriter,
};

// Table and column identifiers below only ever come from the static category
// registry; every user-supplied value is a bound parameter.

fn select_sql(spec: &CategorySpec) -> String {
    let payload = spec
        .columns
        .iter()
        .map(|column| format!("'{0}', {0}", column.name))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT id, trainer_id, created_at, json_object({payload}) AS payload FROM {}",
        spec.table
    )
}

fn is_writable(spec: &CategorySpec, column: &str) -> bool {
    spec.column(column).is_some() || spec.constants.iter().any(|c| c.column == column)
}

impl TrainerDataReader for DieselRepository {
    fn count_rows(&self, trainer_id: &TrainerId, category: Category) -> RepositoryResult<usize> {
        let sql = format!(
            "SELECT COUNT(*) AS count FROM {} WHERE trainer_id = ?",
            category.spec().table
        );

        let count = self.with_conn(|conn| {
            diesel::sql_query(&sql)
                .bind::<Text, _>(trainer_id.as_str())
                .get_result::<RowCount>(conn)
        })?;

        Ok(count.count.max(0) as usize)
    }

    fn list_rows(
        &self,
        trainer_id: &TrainerId,
        category: Category,
    ) -> RepositoryResult<Vec<TrainerDataRow>> {
        let sql = format!(
            "{} WHERE trainer_id = ? ORDER BY created_at DESC, id DESC",
            select_sql(category.spec())
        );

        let records = self.with_conn(|conn| {
            diesel::sql_query(&sql)
                .bind::<Text, _>(trainer_id.as_str())
                .load::<TrainerDataRecord>(conn)
        })?;

        let rows = records
            .into_iter()
            .map(|record| record.into_domain(category))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get_row(&self, category: Category, id: RowId) -> RepositoryResult<Option<TrainerDataRow>> {
        let sql = format!("{} WHERE id = ?", select_sql(category.spec()));

        let record = self.with_conn(|conn| {
            diesel::sql_query(&sql)
                .bind::<Integer, _>(id.get())
                .get_result::<TrainerDataRecord>(conn)
                .optional()
        })?;

        let row = record.map(|r| r.into_domain(category)).transpose()?;
        Ok(row)
    }
}

impl TrainerDataWriter for DieselRepository {
    fn create_row(&self, row: &NewTrainerDataRow) -> RepositoryResult<RowId> {
        let spec = row.category.spec();
        if let Some(field) = row.fields.iter().find(|f| !is_writable(spec, f.column)) {
            return Err(RepositoryError::ValidationError(format!(
                "{} is not a column of {}",
                field.column, spec.table
            )));
        }

        let columns = ["trainer_id", "created_at"]
            .into_iter()
            .chain(row.fields.iter().map(|f| f.column))
            .collect::<Vec<_>>();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
            spec.table,
            columns.join(", "),
            vec!["?"; columns.len()].join(", ")
        );

        let inserted = self.with_conn(|conn| {
            conn.transaction(|conn| {
                let mut query = diesel::sql_query(&sql)
                    .into_boxed::<Sqlite>()
                    .bind::<Text, _>(row.trainer_id.as_str().to_string())
                    .bind::<Timestamp, _>(row.created_at);
                for field in &row.fields {
                    query = query.bind::<Text, _>(encode_value(&field.value));
                }
                query.get_result::<InsertedRow>(conn)
            })
        })?;

        Ok(RowId::new(inserted.id)?)
    }

    fn update_row(&self, changes: &TrainerDataChanges) -> RepositoryResult<usize> {
        let spec = changes.category.spec();
        if changes.fields.is_empty() {
            return Err(RepositoryError::ValidationError(
                "no fields to update".to_string(),
            ));
        }
        if let Some(field) = changes.fields.iter().find(|f| !is_writable(spec, f.column)) {
            return Err(RepositoryError::ValidationError(format!(
                "{} is not a column of {}",
                field.column, spec.table
            )));
        }

        let assignments = changes
            .fields
            .iter()
            .map(|f| format!("{} = ?", f.column))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE {} SET {assignments} WHERE id = ?", spec.table);

        let affected = self.with_conn(|conn| {
            conn.transaction(|conn| {
                let mut query = diesel::sql_query(&sql).into_boxed::<Sqlite>();
                for field in &changes.fields {
                    query = query.bind::<Text, _>(encode_value(&field.value));
                }
                query.bind::<Integer, _>(changes.id.get()).execute(conn)
            })
        })?;

        Ok(affected)
    }

    fn delete_row(&self, category: Category, id: RowId) -> RepositoryResult<usize> {
        let sql = format!("DELETE FROM {} WHERE id = ?", category.spec().table);

        let affected = self.with_conn(|conn| {
            conn.transaction(|conn| {
                diesel::sql_query(&sql)
                    .bind::<Integer, _>(id.get())
                    .execute(conn)
            })
        })?;

        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_folds_payload_columns_into_json() {
        let sql = select_sql(Category::Tone.spec());
        assert_eq!(
            sql,
            "SELECT id, trainer_id, created_at, json_object('trainer_name', trainer_name, \
             'raw_data', raw_data) AS payload FROM data_trainer_tones_raw"
        );
    }

    #[test]
    fn language_constant_is_writable_but_not_listed() {
        let spec = Category::Qna.spec();
        assert!(is_writable(spec, "language"));
        assert!(spec.column("language").is_none());
        assert!(!is_writable(spec, "trainer_id; DROP TABLE x"));
    }
}
