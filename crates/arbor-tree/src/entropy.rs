use std::borrow::Borrow;

use crate::record::{Record, Value};

/// Shannon entropy (base 2) of the target values in `records`.
///
/// Returns `0.0` for an empty slice. Any distinct target value counts as its
/// own class, including a missing one.
#[must_use]
pub fn entropy<R: Borrow<Record>>(records: &[R], target: &str) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total = records.len() as f64;
    let mut entropy = 0.0;
    for (_, count) in tally(records, target) {
        let p = count as f64 / total;
        entropy -= p * p.log2();
    }
    entropy
}

/// Count each distinct target value, in order of first appearance.
pub(crate) fn tally<'a, R: Borrow<Record>>(
    records: &'a [R],
    target: &str,
) -> Vec<(Option<&'a Value>, usize)> {
    let mut counts: Vec<(Option<&'a Value>, usize)> = Vec::new();
    for record in records {
        let value = record.borrow().get(target);
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::{entropy, tally};
    use crate::record::{Record, Value};

    fn labeled(labels: &[bool]) -> Vec<Record> {
        labels.iter().map(|&y| Record::new().with("y", y)).collect()
    }

    #[test]
    fn empty_is_zero() {
        let records: Vec<Record> = vec![];
        assert_eq!(entropy(&records, "y"), 0.0);
    }

    #[test]
    fn pure_is_zero() {
        for n in 1..6 {
            assert_eq!(entropy(&labeled(&vec![true; n]), "y"), 0.0);
            assert_eq!(entropy(&labeled(&vec![false; n]), "y"), 0.0);
        }
    }

    #[test]
    fn balanced_binary_is_one() {
        for half in 1..6 {
            let mut labels = vec![true; half];
            labels.extend(vec![false; half]);
            assert!((entropy(&labeled(&labels), "y") - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn skewed_binary() {
        // p = 1/4, 3/4
        let h = entropy(&labeled(&[true, false, false, false]), "y");
        let expected = -(0.25 * 0.25_f64.log2() + 0.75 * 0.75_f64.log2());
        assert!((h - expected).abs() < 1e-12);
    }

    #[test]
    fn non_boolean_targets_are_counted() {
        let records: Vec<Record> = ["a", "b", "c", "d"]
            .iter()
            .map(|&c| Record::new().with("t", c))
            .collect();
        assert!((entropy(&records, "t") - 2.0).abs() < 1e-12);
    }

    #[test]
    fn accepts_borrowed_slices() {
        let records = labeled(&[true, false]);
        let refs: Vec<&Record> = records.iter().collect();
        assert!((entropy(&refs, "y") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tally_keeps_first_seen_order() {
        let records = labeled(&[false, true, true, false, true]);
        let counts = tally(&records, "y");
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0], (Some(&Value::Bool(false)), 2));
        assert_eq!(counts[1], (Some(&Value::Bool(true)), 3));
    }
}
