//! All-time standings over persisted results

use std::collections::HashSet;

use super::ResultRecord;

/// Top `limit` results by best lap, one per driver name.
///
/// When a driver appears more than once only the earliest record counts.
/// Records without a best lap sort after all timed ones.
pub fn top_results(
    records: impl IntoIterator<Item = ResultRecord>,
    limit: usize,
) -> Vec<ResultRecord> {
    let mut records: Vec<ResultRecord> = records.into_iter().collect();
    records.sort_by_key(|r| r.completed_at);

    let mut seen = HashSet::new();
    let mut unique: Vec<ResultRecord> =
        records.into_iter().filter(|r| seen.insert(r.driver_name.clone())).collect();

    unique.sort_by_key(|r| (r.best_lap.is_none(), r.best_lap));
    unique.truncate(limit);
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_record;
    use chrono::Duration;

    fn at(name: &str, best: Option<u32>, minutes: i64) -> ResultRecord {
        let mut record = sample_record(name, best);
        record.completed_at += Duration::minutes(minutes);
        record
    }

    #[test]
    fn ordered_by_best_lap() {
        let top = top_results(
            vec![at("A", Some(9_000), 0), at("B", None, 1), at("C", Some(8_500), 2)],
            10,
        );
        let names: Vec<&str> = top.iter().map(|r| r.driver_name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn earliest_record_per_driver_wins() {
        let top = top_results(
            vec![at("A", Some(7_000), 5), at("A", Some(9_000), 1), at("B", Some(8_000), 0)],
            10,
        );
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].driver_name, "B");
        assert_eq!(top[1].best_lap, Some(9_000));
    }

    #[test]
    fn truncated_to_limit() {
        let records = (0..20).map(|i| at(&format!("D{}", i), Some(5_000 + i), i as i64));
        let top = top_results(records, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].driver_name, "D0");
        assert!(top_results(Vec::new(), 10).is_empty());
    }
}
