//! Tests for the classification, join and report stages.

use cohort_model::ModelError;
use cohort_model::schema::column;
use cohort_transform::{
    StudyNumberAllocator, TransformError, TypedCells, build_exception_report,
    build_pivot_report, classify_demographics, join_typed_cells, populate_study_data,
};
use polars::prelude::{Column, DataFrame, NamedFrom, Series};

fn demographics() -> DataFrame {
    DataFrame::new(vec![
        Column::new(
            "NRIC".into(),
            vec!["S1234567A", "t7654321b", "G-1111111-x", "S2222222B"],
        ),
        Column::new("Gender".into(), vec!["F", "M", "m", "F"]),
        Column::new("Age".into(), vec![25i64, 93, 27, 5]),
        Column::new(
            "Marital Status".into(),
            vec![Some("Single"), Some("Married"), Some("Single"), None],
        ),
    ])
    .unwrap()
}

fn extra_info() -> DataFrame {
    DataFrame::new(vec![
        Column::new("NRIC".into(), vec!["S1234567A", "T7654321B", "S1234567A"]),
        Column::new("Ethnic Group".into(), vec!["Chinese", "Malay", "Indian"]),
        Column::new("Address 1".into(), vec!["1 Kent Road", "2 Kent Road", "3 Kent Road"]),
        Column::new("Address 2".into(), vec![Some("#01-01"), None, Some("#03-03")]),
        Column::new("Contact Number".into(), vec![91234567i64, 98765432, 90000000]),
    ])
    .unwrap()
}

fn study_data() -> DataFrame {
    DataFrame::new(vec![
        Series::new(
            "Old NRIC".into(),
            vec![Some("s1234567a"), Some("T7654321B"), Some("Z9999999Z"), None],
        )
        .into(),
        Series::new("Visit".into(), vec!["V1", "V1", "V2", "V3"]).into(),
    ])
    .unwrap()
}

fn classified() -> DataFrame {
    let mut df = demographics();
    classify_demographics(&mut df, &mut StudyNumberAllocator::new()).unwrap();
    df
}

#[test]
fn classifies_demographic_rows() {
    let mut df = demographics();
    let summary = classify_demographics(&mut df, &mut StudyNumberAllocator::new()).unwrap();

    assert_eq!(summary.rows, 4);
    assert_eq!(summary.reformatted, 1);

    let new_nric = df.column(column::NEW_NRIC).unwrap().str().unwrap();
    assert_eq!(new_nric.get(0), Some("S1234567A"));
    assert_eq!(new_nric.get(1), Some("T7654321B"));
    assert_eq!(new_nric.get(2), Some("G1111111X"));

    let codes = df.column(column::GENDER_CODE).unwrap().i64().unwrap();
    let codes: Vec<Option<i64>> = codes.into_iter().collect();
    assert_eq!(codes, vec![Some(1), Some(2), Some(2), Some(1)]);

    let groups = df.column(column::AGE_GROUP).unwrap().str().unwrap();
    let groups: Vec<Option<&str>> = groups.into_iter().collect();
    assert_eq!(groups, vec![Some("G3"), Some("G0"), Some("G3"), Some("G1")]);

    let numbers = df.column(column::STUDY_NUMBER).unwrap().str().unwrap();
    let numbers: Vec<Option<&str>> = numbers.into_iter().collect();
    assert_eq!(
        numbers,
        vec![Some("G3 - 1"), Some("G0 - 1"), Some("G3 - 2"), Some("G1 - 1")]
    );
}

#[test]
fn single_subject_scenario() {
    let mut df = DataFrame::new(vec![
        Column::new("NRIC".into(), vec!["S1234567A"]),
        Column::new("Gender".into(), vec!["F"]),
        Column::new("Age".into(), vec![25i64]),
        Column::new("Marital Status".into(), vec!["Single"]),
    ])
    .unwrap();
    classify_demographics(&mut df, &mut StudyNumberAllocator::new()).unwrap();

    let text = |name: &str| {
        df.column(name)
            .unwrap()
            .str()
            .unwrap()
            .get(0)
            .map(str::to_string)
    };
    assert_eq!(text(column::NEW_NRIC).as_deref(), Some("S1234567A"));
    assert_eq!(text(column::AGE_GROUP).as_deref(), Some("G3"));
    assert_eq!(text(column::STUDY_NUMBER).as_deref(), Some("G3 - 1"));
    let code = df.column(column::GENDER_CODE).unwrap().i64().unwrap();
    assert_eq!(code.get(0), Some(1));
}

#[test]
fn allocator_carries_across_calls() {
    let mut allocator = StudyNumberAllocator::new();
    let mut first = demographics();
    classify_demographics(&mut first, &mut allocator).unwrap();
    let mut second = demographics();
    classify_demographics(&mut second, &mut allocator).unwrap();

    let numbers = second.column(column::STUDY_NUMBER).unwrap().str().unwrap();
    assert_eq!(numbers.get(0), Some("G3 - 3"));
}

#[test]
fn malformed_identifier_aborts_classification() {
    let mut df = DataFrame::new(vec![
        Column::new("NRIC".into(), vec!["S1234567A", "1234567"]),
        Column::new("Gender".into(), vec!["F", "M"]),
        Column::new("Age".into(), vec![25i64, 30]),
    ])
    .unwrap();

    let err = classify_demographics(&mut df, &mut StudyNumberAllocator::new()).unwrap_err();

    match err {
        TransformError::Classification {
            row,
            column,
            source,
            ..
        } => {
            assert_eq!(row, 1);
            assert_eq!(column, "NRIC");
            assert_eq!(
                source,
                ModelError::MalformedIdentifier {
                    value: "1234567".to_string()
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(df.column(column::NEW_NRIC).is_err());
}

#[test]
fn unrecognized_gender_aborts_classification() {
    let mut df = DataFrame::new(vec![
        Column::new("NRIC".into(), vec!["S1234567A"]),
        Column::new("Gender".into(), vec!["X"]),
        Column::new("Age".into(), vec![25i64]),
    ])
    .unwrap();

    let err = classify_demographics(&mut df, &mut StudyNumberAllocator::new()).unwrap_err();

    assert!(matches!(
        err,
        TransformError::Classification {
            source: ModelError::UnrecognizedGender { .. },
            ..
        }
    ));
}

#[test]
fn missing_age_is_invalid() {
    let mut df = DataFrame::new(vec![
        Column::new("NRIC".into(), vec!["S1234567A"]),
        Column::new("Gender".into(), vec!["F"]),
        Column::new("Age".into(), vec![None::<i64>]),
    ])
    .unwrap();

    let err = classify_demographics(&mut df, &mut StudyNumberAllocator::new()).unwrap_err();

    assert!(matches!(
        err,
        TransformError::Classification {
            source: ModelError::InvalidAge { .. },
            ..
        }
    ));
}

#[test]
fn missing_demographic_column_is_reported() {
    let mut df = DataFrame::new(vec![Column::new("NRIC".into(), vec!["S1234567A"])]).unwrap();
    let err = classify_demographics(&mut df, &mut StudyNumberAllocator::new()).unwrap_err();
    assert_eq!(err.to_string(), "sheet 'Demographics' has no column 'Gender'");
}

#[test]
fn joins_reference_fields_into_study_data() {
    let demographics = classified();
    let mut study = study_data();

    let summary = populate_study_data(&demographics, &extra_info(), &mut study).unwrap();

    assert_eq!(summary.rows, 4);
    assert_eq!(summary.demographic_matches, 1);
    assert_eq!(summary.extra_info_matches, 2);
    assert_eq!(summary.unmatched, 2);

    let names: Vec<String> = study
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "Old NRIC",
            "Visit",
            "Study Number",
            "New NRIC",
            "Gender",
            "Age",
            "Marital Status",
            "Ethnic Group",
            "Address 1",
            "Address 2",
            "Contact Number",
        ]
    );
    assert_eq!(study.height(), 4);

    // Row 0 matches both sheets; the duplicate Extra information row is ignored.
    let numbers = study.column("Study Number").unwrap().str().unwrap();
    assert_eq!(numbers.get(0), Some("G3 - 1"));
    let gender = study.column("Gender").unwrap().i64().unwrap();
    assert_eq!(gender.get(0), Some(1));
    let age = study.column("Age").unwrap().i64().unwrap();
    assert_eq!(age.get(0), Some(25));
    let ethnic = study.column("Ethnic Group").unwrap().str().unwrap();
    assert_eq!(ethnic.get(0), Some("Chinese"));
    let contact = study.column("Contact Number").unwrap().i64().unwrap();
    assert_eq!(contact.get(0), Some(91234567));

    // Row 1 only matches Extra information: Demographics holds the raw lower-case NRIC.
    assert_eq!(numbers.get(1), None);
    assert_eq!(ethnic.get(1), Some("Malay"));
    let address_2 = study.column("Address 2").unwrap().str().unwrap();
    assert_eq!(address_2.get(1), None);

    // Rows 2 and 3 miss everywhere.
    for row in [2, 3] {
        for name in [
            "Study Number",
            "New NRIC",
            "Gender",
            "Age",
            "Marital Status",
            "Ethnic Group",
            "Address 1",
            "Address 2",
            "Contact Number",
        ] {
            let value = study.column(name).unwrap().get(row).unwrap();
            assert!(value.is_null(), "{name} row {row} should be null");
        }
    }

    let visit = study.column("Visit").unwrap().str().unwrap();
    assert_eq!(visit.get(3), Some("V3"));
}

#[test]
fn reference_sheet_without_key_column_misses_everything() {
    let demographics = classified();
    let extra = DataFrame::new(vec![Column::new("Ethnic Group".into(), vec!["Chinese"])]).unwrap();
    let mut study = study_data();

    let summary = populate_study_data(&demographics, &extra, &mut study).unwrap();

    assert_eq!(summary.extra_info_matches, 0);
    assert_eq!(
        study.column("Ethnic Group").unwrap().null_count(),
        study.height()
    );
    assert_eq!(study.column("Address 1").unwrap().null_count(), study.height());
}

#[test]
fn typed_cells_follow_joined_rows() {
    let demographics = classified();
    let mut extra = extra_info();
    extra
        .with_column(Column::new(
            "Contact Number".into(),
            vec!["91234567", "6512 3456", "90000000"],
        ))
        .unwrap();
    let extra_cells = DataFrame::new(vec![Column::new(
        "Contact Number".into(),
        vec![Some(91_234_567i64), None, Some(90_000_000)],
    )])
    .unwrap();
    let study_cells = DataFrame::new(vec![
        Column::new("Visit".into(), vec![None, Some(2i64), None, None]),
        Column::new("Contact Number".into(), vec![Some(1i64), None, None, None]),
    ])
    .unwrap();
    let mut study = study_data();
    populate_study_data(&demographics, &extra, &mut study).unwrap();

    let typed = join_typed_cells(
        &demographics,
        &extra,
        &study,
        TypedCells {
            demographics: None,
            extra_info: Some(&extra_cells),
            study_data: Some(&study_cells),
        },
    )
    .unwrap();

    assert_eq!(typed.height(), 4);
    assert_eq!(typed.width(), 2);
    let visit = typed.column("Visit").unwrap().i64().unwrap();
    assert_eq!(visit.get(1), Some(2));
    let contact: Vec<Option<i64>> = typed
        .column("Contact Number")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(contact, vec![Some(91_234_567), None, None, None]);
}

#[test]
fn no_typed_cells_yields_an_empty_frame() {
    let demographics = classified();
    let extra = extra_info();
    let mut study = study_data();
    populate_study_data(&demographics, &extra, &mut study).unwrap();

    let typed =
        join_typed_cells(&demographics, &extra, &study, TypedCells::default()).unwrap();

    assert_eq!(typed.width(), 0);
}

#[test]
fn study_data_without_old_nric_is_an_error() {
    let demographics = classified();
    let mut study = DataFrame::new(vec![Column::new("NRIC".into(), vec!["S1234567A"])]).unwrap();
    let err = populate_study_data(&demographics, &extra_info(), &mut study).unwrap_err();
    assert!(matches!(err, TransformError::MissingColumn { .. }));
}

#[test]
fn exception_report_lists_missing_identifiers() {
    let report = build_exception_report(&classified(), &extra_info()).unwrap();

    assert_eq!(
        report.unique,
        vec!["S1234567A", "T7654321B", "G1111111X", "S2222222B"]
    );
    assert_eq!(report.missing, vec!["G-1111111-x", "S2222222B", "t7654321b"]);
    assert!(!report.missing.contains(&"S1234567A".to_string()));

    let frame = report.to_frame().unwrap();
    assert_eq!(frame.height(), 4);
    assert_eq!(frame.column(column::MISSING_NRIC).unwrap().null_count(), 1);
}

#[test]
fn unique_identifiers_are_deduplicated_in_first_seen_order() {
    let mut df = DataFrame::new(vec![
        Column::new("NRIC".into(), vec!["t7654321b", "S1234567A", "T7654321B"]),
        Column::new("Gender".into(), vec!["M", "F", "M"]),
        Column::new("Age".into(), vec![40i64, 41, 40]),
    ])
    .unwrap();
    classify_demographics(&mut df, &mut StudyNumberAllocator::new()).unwrap();

    let report = build_exception_report(&df, &extra_info()).unwrap();

    assert_eq!(report.unique, vec!["T7654321B", "S1234567A"]);
    assert_eq!(report.missing, vec!["t7654321b"]);
}

#[test]
fn pivot_report_stacks_sections() {
    let report = build_pivot_report(&classified()).unwrap();

    insta::assert_snapshot!(report.to_string().trim_end(), @r"
[Age Group]
G3 = 2
G0 = 1
G1 = 1
[Gender]
F = 2
M = 1
m = 1
[Marital Status]
Single = 2
Married = 1
");

    let frame = report.to_frame().unwrap();
    assert_eq!(frame.height(), 3 + 3 + 3 + 2);
    assert_eq!(frame.column(column::PIVOT_COUNT).unwrap().null_count(), 3);
}
