use mocap_model::PointTable;

/// Number of missing (or non-finite) samples per column, in column order.
pub fn count_missing(table: &PointTable) -> Vec<(String, usize)> {
    table
        .labels()
        .iter()
        .enumerate()
        .map(|(column, label)| {
            let missing = table
                .column(column)
                .iter()
                .filter(|cell| !cell.is_some_and(|p| p.is_finite()))
                .count();
            (label.clone(), missing)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mocap_model::Vec3;

    #[test]
    fn counts_none_and_nan_samples() {
        let mut table = PointTable::new(vec!["A".to_string(), "B".to_string()]).unwrap();
        table
            .push_frame(0.0, vec![None, Some(Vec3::new(1.0, 1.0, 1.0))])
            .unwrap();
        table
            .push_frame(0.1, vec![Some(Vec3::new(f64::NAN, 0.0, 0.0)), None])
            .unwrap();
        table
            .push_frame(0.2, vec![Some(Vec3::default()), None])
            .unwrap();

        assert_eq!(
            count_missing(&table),
            vec![("A".to_string(), 2), ("B".to_string(), 2)]
        );
    }
}
