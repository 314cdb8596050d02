// Demo fixtures shared by `planctl init` and the store tests.

use planboard_engine::PlanError;

use crate::db::PlanDb;

fn db_err(e: rusqlite::Error) -> PlanError {
    PlanError::Storage(e.to_string())
}

/// Populate a fresh database with a small but realistic dimension set
/// and a plan for (2024, scenario 5 "actual-minus-1", cost center 2).
pub fn seed_demo(db: &mut PlanDb) -> Result<(), PlanError> {
    db.conn()
        .execute_batch(
            r#"
            INSERT INTO dim_time (code_year) VALUES (2024), (2025);

            INSERT INTO dim_sce (id, code) VALUES
                (2,  'forecast-feb'),
                (5,  'actual-minus-1'),
                (10, 'year-end-outlook'),
                (99, 'actual');

            INSERT INTO dim_cfo (id, code, is_root) VALUES
                (1, 'HQ', 1),
                (2, 'rnd', 0),
                (3, 'sales', 0);

            INSERT INTO dim_acc (id, description, is_root) VALUES
                (1,  'All accounts', 1),
                (10, 'Travel', 0),
                (11, 'Payroll', 0),
                (12, 'Office supplies', 0),
                (30, 'Training', 0),
                (31, 'Software licenses', 0);

            INSERT INTO plan (time_year, sce_id, cfo_id, acc_id, y0_m03, y0_m06, y1_m01) VALUES
                (2024, 5, 2, 10, 100.0, 80.0, 120.0);
            INSERT INTO plan (time_year, sce_id, cfo_id, acc_id, y0_m06, y0_m07) VALUES
                (2024, 5, 2, 11, 5000.0, 5000.0);
            INSERT INTO plan (time_year, sce_id, cfo_id, acc_id) VALUES
                (2024, 5, 2, 12);
            INSERT INTO plan (time_year, sce_id, cfo_id, acc_id, y0_m02) VALUES
                (2024, 2, 2, 10, 95.0);
            "#,
        )
        .map_err(db_err)
}
