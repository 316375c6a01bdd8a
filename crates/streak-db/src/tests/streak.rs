use chrono::Utc;

use super::{COUNTER, test_db};

#[test]
fn increments_from_absent_counter() {
    for n in [0, 1, 2, 7] {
        let db = test_db();
        for _ in 0..n {
            db.increment_counter(COUNTER, Utc::now()).unwrap();
        }
        assert_eq!(db.get_counter_value(COUNTER).unwrap(), n);
    }
}

#[test]
fn reset_on_absent_counter_is_noop() {
    let db = test_db();
    assert!(db.reset_counter(COUNTER, Utc::now()).unwrap().is_none());
    assert!(db.get_counter(COUNTER).unwrap().is_none());
    assert_eq!(db.count_history().unwrap(), 0);
}

#[test]
fn reset_archives_exactly_one_record() {
    let db = test_db();
    for _ in 0..4 {
        db.increment_counter(COUNTER, Utc::now()).unwrap();
    }

    let outcome = db.reset_counter(COUNTER, Utc::now()).unwrap().unwrap();
    assert_eq!(outcome.previous, 4);
    assert_eq!(db.get_counter_value(COUNTER).unwrap(), 0);
    assert_eq!(db.count_history().unwrap(), 1);
    assert_eq!(db.get_top_history(10).unwrap()[0].score, 4);
}

#[test]
fn downtime_scenario() {
    let db = test_db();
    for _ in 0..3 {
        db.increment_counter(COUNTER, Utc::now()).unwrap();
    }
    assert_eq!(db.get_counter_value(COUNTER).unwrap(), 3);

    db.reset_counter(COUNTER, Utc::now()).unwrap();
    assert_eq!(db.get_counter_value(COUNTER).unwrap(), 0);
    let history = db.get_top_history(10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].score, 3);

    for _ in 0..5 {
        db.increment_counter(COUNTER, Utc::now()).unwrap();
    }
    assert_eq!(db.get_counter_value(COUNTER).unwrap(), 5);

    let top = db.get_top_history(1).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].score, 3);
}

#[test]
fn counters_are_independent_by_name() {
    let db = test_db();
    db.increment_counter("a", Utc::now()).unwrap();
    db.increment_counter("a", Utc::now()).unwrap();
    db.increment_counter("b", Utc::now()).unwrap();

    db.reset_counter("a", Utc::now()).unwrap();
    assert_eq!(db.get_counter_value("a").unwrap(), 0);
    assert_eq!(db.get_counter_value("b").unwrap(), 1);
}
