// End-to-end: session edit flow against a real SQLite store.

use planboard_engine::{GridFilter, MonthColumn, PlanError, PlanSession, PlanStore, ScenarioId};
use planboard_store::seed::seed_demo;
use planboard_store::PlanDb;

fn col(name: &str) -> MonthColumn {
    MonthColumn::parse(name).unwrap()
}

fn demo_session() -> (PlanDb, PlanSession) {
    let mut db = PlanDb::open_in_memory().unwrap();
    seed_demo(&mut db).unwrap();
    let filter = GridFilter {
        year: 2024,
        scenario: ScenarioId::new(2).unwrap(),
        cfo_id: 2,
    };
    let session = PlanSession::load(&mut db, filter).unwrap();
    (db, session)
}

#[test]
fn type_blur_save_row_reload() {
    let mut db = PlanDb::open_in_memory().unwrap();
    seed_demo(&mut db).unwrap();
    // Scenario 5 ("actual-minus-1"): y0_m03 is locked, y0_m06 is open.
    let filter = GridFilter {
        year: 2024,
        scenario: ScenarioId::new(5).unwrap(),
        cfo_id: 2,
    };
    let mut session = PlanSession::load(&mut db, filter).unwrap();
    assert_eq!(session.cell_display(0, col("y0_m03")), "100.00");
    assert!(!session.record_edit(0, col("y0_m03"), "150,5"));

    assert!(session.record_edit(0, col("y0_m06"), "150,5"));
    session.commit_blur(0, col("y0_m06"), "150,5");
    assert!(session.has_row_changes(0));

    session.save_row(&mut db, 0).unwrap();
    assert!(!session.has_any_changes());
    assert_eq!(session.rows()[0].get(col("y0_m06")), Some(150.5));
    assert_eq!(session.cell_display(0, col("y0_m06")), "150.50");
}

#[test]
fn scenario_two_unlocks_march_for_the_spec_flow() {
    let (mut db, mut session) = demo_session();
    // Grid for scenario 2 only has the seeded Travel row
    assert_eq!(session.rows().len(), 1);
    assert!(session.record_edit(0, col("y0_m03"), "150,5"));
    session.commit_blur(0, col("y0_m03"), "150,5");

    session.save_row(&mut db, 0).unwrap();
    assert_eq!(session.rows()[0].get(col("y0_m03")), Some(150.5));
}

#[test]
fn save_all_commits_every_dirty_row_in_one_transaction() {
    let mut db = PlanDb::open_in_memory().unwrap();
    seed_demo(&mut db).unwrap();
    let filter = GridFilter {
        year: 2024,
        scenario: ScenarioId::new(10).unwrap(),
        cfo_id: 2,
    };
    // No plan rows exist for scenario 10 yet; build some via add-account.
    let mut session = PlanSession::load(&mut db, filter).unwrap();
    let choices: Vec<i64> = session.account_choices().iter().map(|c| c.id).collect();
    for acc_id in choices.iter().take(2) {
        session.add_account_row(&mut db, *acc_id).unwrap();
    }
    assert_eq!(session.rows().len(), 2);

    session.record_edit(0, col("y0_m01"), "10");
    session.commit_blur(0, col("y0_m01"), "10");
    session.record_edit(1, col("y1_m12"), "20,25");
    session.commit_blur(1, col("y1_m12"), "20,25");

    let updated = session.save_all(&mut db).unwrap();
    assert_eq!(updated.len(), 2);
    assert_eq!(session.rows()[0].get(col("y0_m01")), Some(10.0));
    assert_eq!(session.rows()[1].get(col("y1_m12")), Some(20.25));
}

#[test]
fn save_all_with_nothing_dirty_is_reported() {
    let (mut db, mut session) = demo_session();
    assert_eq!(session.save_all(&mut db), Err(PlanError::NothingToSave));
}

#[test]
fn add_account_row_lands_at_the_end_and_highlights() {
    let (mut db, mut session) = demo_session();
    let before = session.rows().len();
    let pick = session.account_choices()[0].clone();

    session.add_account_row(&mut db, pick.id).unwrap();
    assert_eq!(session.rows().len(), before + 1);
    assert_eq!(session.rows().last().unwrap().acc_desc, pick.description);
    assert_eq!(session.highlighted_row(), Some(before));
    assert!(session.account_choices().iter().all(|c| c.id != pick.id));
}

#[test]
fn batch_failure_leaves_storage_and_edits_untouched() {
    let mut db = PlanDb::open_in_memory().unwrap();
    seed_demo(&mut db).unwrap();
    let filter = GridFilter {
        year: 2024,
        scenario: ScenarioId::new(5).unwrap(),
        cfo_id: 2,
    };
    let mut session = PlanSession::load(&mut db, filter).unwrap();
    session.record_edit(0, col("y1_m01"), "7");
    session.commit_blur(0, col("y1_m01"), "7");
    let p_id = session.rows()[0].p_id;

    // A batch mixing a good row and a missing id rolls back entirely.
    let baseline = db.fetch_rows(&filter).unwrap();
    let changes = vec![
        planboard_engine::RowChange { p_id, fields: vec![(col("y1_m01"), Some(7.0))] },
        planboard_engine::RowChange { p_id: 999_999, fields: vec![(col("y1_m01"), Some(8.0))] },
    ];
    let err = db.update_batch(&changes).unwrap_err();
    assert!(matches!(err, PlanError::TransactionAborted { p_id: 999_999, .. }));
    assert_eq!(db.fetch_rows(&filter).unwrap(), baseline);

    // The session-side tracker still holds the edit for retry.
    assert!(session.has_row_changes(0));
}
