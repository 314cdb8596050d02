// Plan database over SQLite
//
// The original mart kept the 24 month values in two SQL array columns
// (`y0[3] = …`). Here every month is an explicit column and the only
// column names that reach SQL are rendered from a parsed `MonthColumn`;
// all values bind as parameters.

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use planboard_engine::{AccountChoice, GridFilter, MonthColumn, PlanError, PlanRow, PlanStore, RowChange};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS dim_time (
    code_year INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS dim_sce (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS dim_cfo (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    is_root INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS dim_acc (
    id INTEGER PRIMARY KEY,
    description TEXT NOT NULL UNIQUE,
    is_root INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS plan (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    time_year INTEGER NOT NULL,
    sce_id INTEGER NOT NULL REFERENCES dim_sce(id),
    cfo_id INTEGER NOT NULL REFERENCES dim_cfo(id),
    acc_id INTEGER NOT NULL REFERENCES dim_acc(id),
    is_active INTEGER NOT NULL DEFAULT 1,
    y0_m01 REAL, y0_m02 REAL, y0_m03 REAL, y0_m04 REAL,
    y0_m05 REAL, y0_m06 REAL, y0_m07 REAL, y0_m08 REAL,
    y0_m09 REAL, y0_m10 REAL, y0_m11 REAL, y0_m12 REAL,
    y1_m01 REAL, y1_m02 REAL, y1_m03 REAL, y1_m04 REAL,
    y1_m05 REAL, y1_m06 REAL, y1_m07 REAL, y1_m08 REAL,
    y1_m09 REAL, y1_m10 REAL, y1_m11 REAL, y1_m12 REAL,
    UNIQUE (time_year, sce_id, cfo_id, acc_id)
);
"#;

fn db_err(e: rusqlite::Error) -> PlanError {
    PlanError::Storage(e.to_string())
}

pub struct PlanDb {
    conn: Connection,
}

impl PlanDb {
    pub fn open(path: &Path) -> Result<Self, PlanError> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, PlanError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Fiscal years available for selection, ascending.
    pub fn years(&self) -> Result<Vec<i32>, PlanError> {
        let mut stmt = self
            .conn
            .prepare("SELECT code_year FROM dim_time ORDER BY code_year")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(db_err)?
            .collect::<Result<Vec<i32>, _>>()
            .map_err(db_err)?;
        Ok(rows)
    }

    /// Scenarios offered for planning. The reserved `actual` series is
    /// read-only source data and never listed.
    pub fn scenarios(&self) -> Result<Vec<planboard_engine::Scenario>, PlanError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, code FROM dim_sce WHERE code <> 'actual' ORDER BY code")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(planboard_engine::Scenario { id: row.get(0)?, code: row.get(1)? })
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(rows)
    }

    /// Leaf cost centers (roots are aggregation nodes, not plannable).
    pub fn cost_centers(&self) -> Result<Vec<planboard_engine::CostCenter>, PlanError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, code FROM dim_cfo WHERE is_root = 0 ORDER BY id")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(planboard_engine::CostCenter { id: row.get(0)?, code: row.get(1)? })
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(rows)
    }

    fn month_select_list() -> String {
        MonthColumn::all()
            .map(|c| format!("p.{}", c.name()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn set_clause(fields: &[(MonthColumn, Option<f64>)]) -> String {
        fields
            .iter()
            .enumerate()
            .map(|(i, (col, _))| format!("{} = ?{}", col.name(), i + 2))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn bind_values(p_id: i64, fields: &[(MonthColumn, Option<f64>)]) -> Vec<Value> {
        let mut values = Vec::with_capacity(fields.len() + 1);
        values.push(Value::Integer(p_id));
        for (_, v) in fields {
            values.push(match v {
                Some(n) => Value::Real(*n),
                None => Value::Null,
            });
        }
        values
    }
}

impl PlanStore for PlanDb {
    fn fetch_rows(&mut self, filter: &GridFilter) -> Result<Vec<PlanRow>, PlanError> {
        let sql = format!(
            "SELECT p.id, a.description, {} \
             FROM plan p JOIN dim_acc a ON a.id = p.acc_id \
             WHERE p.time_year = ?1 AND p.sce_id = ?2 AND p.cfo_id = ?3 AND p.is_active = 1 \
             ORDER BY p.id",
            Self::month_select_list()
        );
        let mut stmt = self.conn.prepare(&sql).map_err(db_err)?;
        let rows = stmt
            .query_map(
                params![filter.year, filter.scenario.raw(), filter.cfo_id],
                |row| {
                    let mut plan_row = PlanRow::new(row.get::<_, i64>(0)?, row.get::<_, String>(1)?);
                    for (i, col) in MonthColumn::all().enumerate() {
                        plan_row.set(col, row.get::<_, Option<f64>>(2 + i)?);
                    }
                    Ok(plan_row)
                },
            )
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(rows)
    }

    fn update_row(
        &mut self,
        p_id: i64,
        fields: &[(MonthColumn, Option<f64>)],
    ) -> Result<(), PlanError> {
        if fields.is_empty() {
            return Err(PlanError::NoChanges);
        }
        let sql = format!("UPDATE plan SET {} WHERE id = ?1", Self::set_clause(fields));
        let affected = self
            .conn
            .execute(&sql, params_from_iter(Self::bind_values(p_id, fields)))
            .map_err(db_err)?;
        if affected == 0 {
            return Err(PlanError::Storage(format!("no plan row with id {p_id}")));
        }
        Ok(())
    }

    fn update_batch(&mut self, changes: &[RowChange]) -> Result<Vec<i64>, PlanError> {
        if changes.is_empty() {
            return Err(PlanError::NothingToSave);
        }
        // One transaction for the whole batch: an early return drops the
        // uncommitted transaction and SQLite rolls everything back.
        let tx = self.conn.transaction().map_err(db_err)?;
        let mut updated = Vec::new();
        for change in changes {
            if change.fields.is_empty() {
                continue;
            }
            let sql = format!(
                "UPDATE plan SET {} WHERE id = ?1",
                Self::set_clause(&change.fields)
            );
            let affected = tx
                .execute(&sql, params_from_iter(Self::bind_values(change.p_id, &change.fields)))
                .map_err(|e| PlanError::TransactionAborted {
                    p_id: change.p_id,
                    message: e.to_string(),
                })?;
            if affected == 0 {
                return Err(PlanError::TransactionAborted {
                    p_id: change.p_id,
                    message: "no plan row with this id".into(),
                });
            }
            updated.push(change.p_id);
        }
        if updated.is_empty() {
            return Err(PlanError::NothingToSave);
        }
        tx.commit().map_err(db_err)?;
        Ok(updated)
    }

    fn insert_account(&mut self, filter: &GridFilter, acc_id: i64) -> Result<(), PlanError> {
        self.conn
            .execute(
                "INSERT INTO plan (time_year, sce_id, cfo_id, acc_id, is_active) \
                 VALUES (?1, ?2, ?3, ?4, 1)",
                params![filter.year, filter.scenario.raw(), filter.cfo_id, acc_id],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn account_choices(&mut self, filter: &GridFilter) -> Result<Vec<AccountChoice>, PlanError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, description FROM dim_acc \
                 WHERE is_root = 0 AND id NOT IN ( \
                     SELECT acc_id FROM plan \
                     WHERE time_year = ?1 AND sce_id = ?2 AND cfo_id = ?3 \
                 ) ORDER BY id",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(
                params![filter.year, filter.scenario.raw(), filter.cfo_id],
                |row| Ok(AccountChoice { id: row.get(0)?, description: row.get(1)? }),
            )
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_demo;
    use planboard_engine::ScenarioId;

    fn col(name: &str) -> MonthColumn {
        MonthColumn::parse(name).unwrap()
    }

    fn demo_filter() -> GridFilter {
        GridFilter {
            year: 2024,
            scenario: ScenarioId::new(5).unwrap(),
            cfo_id: 2,
        }
    }

    fn demo_db() -> PlanDb {
        let mut db = PlanDb::open_in_memory().unwrap();
        seed_demo(&mut db).unwrap();
        db
    }

    #[test]
    fn fetch_rows_ordered_by_plan_id() {
        let mut db = demo_db();
        let rows = db.fetch_rows(&demo_filter()).unwrap();
        assert!(rows.len() >= 2);
        for pair in rows.windows(2) {
            assert!(pair[0].p_id < pair[1].p_id);
        }
        // Seeded baseline for the end-to-end flow
        assert_eq!(rows[0].acc_desc, "Travel");
        assert_eq!(rows[0].get(col("y0_m03")), Some(100.0));
    }

    #[test]
    fn scenarios_exclude_the_actual_series() {
        let db = demo_db();
        let scenarios = db.scenarios().unwrap();
        assert!(!scenarios.is_empty());
        assert!(scenarios.iter().all(|s| s.code != "actual"));
        assert!(scenarios.iter().any(|s| s.code == "actual-minus-1" && s.id == 5));
    }

    #[test]
    fn cost_centers_exclude_roots() {
        let db = demo_db();
        let cfos = db.cost_centers().unwrap();
        assert!(cfos.iter().all(|c| c.code != "HQ"));
    }

    #[test]
    fn update_row_touches_only_named_columns() {
        let mut db = demo_db();
        let rows = db.fetch_rows(&demo_filter()).unwrap();
        let p_id = rows[0].p_id;
        let before = rows[0].clone();

        db.update_row(p_id, &[(col("y0_m05"), Some(42.0)), (col("y1_m01"), None)])
            .unwrap();

        let after = &db.fetch_rows(&demo_filter()).unwrap()[0];
        assert_eq!(after.get(col("y0_m05")), Some(42.0));
        assert_eq!(after.get(col("y1_m01")), None);
        for c in MonthColumn::all() {
            if c != col("y0_m05") && c != col("y1_m01") {
                assert_eq!(after.get(c), before.get(c), "column {c} must be untouched");
            }
        }
    }

    #[test]
    fn update_row_unknown_id_is_a_storage_error() {
        let mut db = demo_db();
        let err = db.update_row(9999, &[(col("y0_m05"), Some(1.0))]).unwrap_err();
        assert!(matches!(err, PlanError::Storage(_)));
    }

    #[test]
    fn update_batch_is_all_or_nothing() {
        let mut db = demo_db();
        let rows = db.fetch_rows(&demo_filter()).unwrap();
        assert!(rows.len() >= 2);
        let before: Vec<PlanRow> = rows.clone();

        // Row 2 of 3 targets a nonexistent id: whole batch must roll back.
        let changes = vec![
            RowChange { p_id: rows[0].p_id, fields: vec![(col("y0_m05"), Some(1.0))] },
            RowChange { p_id: 9999, fields: vec![(col("y0_m05"), Some(2.0))] },
            RowChange { p_id: rows[1].p_id, fields: vec![(col("y0_m05"), Some(3.0))] },
        ];
        let err = db.update_batch(&changes).unwrap_err();
        assert!(matches!(err, PlanError::TransactionAborted { p_id: 9999, .. }));

        let after = db.fetch_rows(&demo_filter()).unwrap();
        assert_eq!(after, before, "no column may change after a rolled-back batch");
    }

    #[test]
    fn update_batch_success_returns_updated_ids() {
        let mut db = demo_db();
        let rows = db.fetch_rows(&demo_filter()).unwrap();
        let changes = vec![
            RowChange { p_id: rows[0].p_id, fields: vec![(col("y0_m05"), Some(1.0))] },
            RowChange { p_id: rows[1].p_id, fields: vec![(col("y0_m06"), None)] },
        ];
        let updated = db.update_batch(&changes).unwrap();
        assert_eq!(updated, vec![rows[0].p_id, rows[1].p_id]);

        let after = db.fetch_rows(&demo_filter()).unwrap();
        assert_eq!(after[0].get(col("y0_m05")), Some(1.0));
        assert_eq!(after[1].get(col("y0_m06")), None);
    }

    #[test]
    fn account_choices_shrink_after_insert() {
        let mut db = demo_db();
        let filter = demo_filter();
        let before = db.account_choices(&filter).unwrap();
        assert!(!before.is_empty());
        let pick = before[0].clone();

        db.insert_account(&filter, pick.id).unwrap();
        let after = db.account_choices(&filter).unwrap();
        assert_eq!(after.len(), before.len() - 1);
        assert!(after.iter().all(|c| c.id != pick.id));

        // New row appended at the end of the ordered sequence
        let rows = db.fetch_rows(&filter).unwrap();
        assert_eq!(rows.last().unwrap().acc_desc, pick.description);
    }

    #[test]
    fn duplicate_account_insert_is_rejected() {
        let mut db = demo_db();
        let filter = demo_filter();
        let pick = db.account_choices(&filter).unwrap()[0].clone();
        db.insert_account(&filter, pick.id).unwrap();
        let err = db.insert_account(&filter, pick.id).unwrap_err();
        assert!(matches!(err, PlanError::Storage(_)));
    }

    #[test]
    fn file_backed_db_round_trips() {
        use tempfile::NamedTempFile;

        let temp = NamedTempFile::with_suffix(".plan").unwrap();
        {
            let mut db = PlanDb::open(temp.path()).unwrap();
            seed_demo(&mut db).unwrap();
            let rows = db.fetch_rows(&demo_filter()).unwrap();
            db.update_row(rows[0].p_id, &[(col("y1_m02"), Some(9.5))]).unwrap();
        }
        let mut reopened = PlanDb::open(temp.path()).unwrap();
        let rows = reopened.fetch_rows(&demo_filter()).unwrap();
        assert_eq!(rows[0].get(col("y1_m02")), Some(9.5));
    }
}
