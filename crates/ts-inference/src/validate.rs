use ts_core::dataset::{coerce_label, coerce_numeric};
use ts_core::schema::{self, VariableKind};
use ts_core::{CleanDataset, Dataset, Error, Result};

/// Check the upload against the study schema and coerce every required column.
///
/// - Fails with [`Error::MissingColumns`] listing every absent required column.
/// - Numeric columns are coerced leniently; unparsable tokens become missing.
/// - Fails with [`Error::EmptyNumericData`] when no numeric cell survives coercion.
///
/// Extra columns are ignored.
pub fn validate(dataset: &Dataset) -> Result<CleanDataset> {
    let missing: Vec<String> = schema::required_columns()
        .filter(|name| !dataset.has_column(name))
        .map(String::from)
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingColumns { columns: missing });
    }

    let mut clean = CleanDataset::new(dataset.n_rows());
    let mut any_numeric = false;

    for spec in &schema::STUDY_VARIABLES {
        let cells = dataset.column(spec.name).ok_or_else(|| Error::MissingColumns {
            columns: vec![spec.name.to_string()],
        })?;
        match spec.kind {
            VariableKind::Numeric => {
                let values: Vec<Option<f64>> = cells.iter().map(|c| coerce_numeric(c)).collect();
                let coerced = cells
                    .iter()
                    .zip(&values)
                    .filter(|(c, v)| v.is_none() && !c.trim().is_empty())
                    .count();
                if coerced > 0 {
                    log::debug!("{}: {} unparsable cell(s) treated as missing", spec.name, coerced);
                }
                any_numeric |= values.iter().any(Option::is_some);
                clean = clean.with_numeric(spec.name, values)?;
            }
            VariableKind::Categorical => {
                let values = cells.iter().map(|c| coerce_label(c)).collect();
                clean = clean.with_categorical(spec.name, values)?;
            }
        }
    }

    if !any_numeric {
        return Err(Error::EmptyNumericData {
            columns: schema::variables_of_kind(VariableKind::Numeric)
                .map(|v| v.name.to_string())
                .collect(),
        });
    }

    log::info!("validated dataset: {} rows, {} columns", dataset.n_rows(), dataset.headers().len());
    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dataset_with(columns: &[&str], cell: impl Fn(&str) -> String) -> Dataset {
        let cols: Vec<(&str, Vec<String>)> =
            columns.iter().map(|&c| (c, vec![cell(c), cell(c)])).collect();
        Dataset::from_columns(cols).unwrap()
    }

    fn full_numeric_cell(name: &str) -> String {
        match schema::variable(name).map(|v| v.kind) {
            Some(VariableKind::Numeric) => "1.5".to_string(),
            _ => "Control".to_string(),
        }
    }

    #[test]
    fn test_complete_dataset_validates() {
        let names: Vec<&str> = schema::required_columns().collect();
        let ds = dataset_with(&names, full_numeric_cell);
        let clean = validate(&ds).unwrap();
        assert_eq!(clean.n_rows(), 2);
        assert_eq!(clean.numeric("age").unwrap(), &[Some(1.5), Some(1.5)]);
        assert_eq!(clean.categorical("group").unwrap()[0].as_deref(), Some("Control"));
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let mut names: Vec<&str> = schema::required_columns().collect();
        names.push("notes");
        let ds = dataset_with(&names, full_numeric_cell);
        let clean = validate(&ds).unwrap();
        assert!(clean.numeric("notes").is_none());
        assert!(clean.categorical("notes").is_none());
    }

    #[test]
    fn test_all_placeholder_numeric_is_empty_numeric_error() {
        let names: Vec<&str> = schema::required_columns().collect();
        let ds = dataset_with(&names, |name| match schema::variable(name).map(|v| v.kind) {
            Some(VariableKind::Numeric) => "unknown".to_string(),
            _ => "Control".to_string(),
        });
        match validate(&ds) {
            Err(Error::EmptyNumericData { columns }) => assert_eq!(columns.len(), 10),
            other => panic!("expected EmptyNumericData, got {other:?}"),
        }
    }

    #[test]
    fn test_partially_invalid_numeric_is_coerced() {
        let names: Vec<&str> = schema::required_columns().collect();
        let ds = dataset_with(&names, |name| match name {
            "age" => "7,0".to_string(),
            other => full_numeric_cell(other),
        });
        let clean = validate(&ds).unwrap();
        assert_eq!(clean.numeric("age").unwrap(), &[None, None]);
    }

    proptest! {
        #[test]
        fn prop_missing_columns_reported_exactly(mask in 1u32..(1u32 << 17)) {
            let all: Vec<&str> = schema::required_columns().collect();
            let present: Vec<&str> = all
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) == 0)
                .map(|(_, &n)| n)
                .collect();
            let expected: Vec<String> = all
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, &n)| n.to_string())
                .collect();

            let mut cols: Vec<(&str, Vec<String>)> =
                present.iter().map(|&c| (c, vec![full_numeric_cell(c)])).collect();
            cols.push(("extra", vec!["x".to_string()]));
            let ds = Dataset::from_columns(cols).unwrap();

            match validate(&ds) {
                Err(Error::MissingColumns { columns }) => prop_assert_eq!(columns, expected),
                other => prop_assert!(false, "expected MissingColumns, got {:?}", other),
            }
        }
    }
}
