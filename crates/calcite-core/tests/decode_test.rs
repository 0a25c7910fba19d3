use calcite_core::decode::TYPE_CLASSES;
use calcite_core::{
    decode, decode_column_names, decode_column_type_names, decode_row, sql_type, ColumnDescriptor,
    CoreError, RawCell, Value,
};
use chrono::NaiveDate;

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("id", sql_type::INTEGER, "INTEGER").with_nullable(false),
        ColumnDescriptor::new("name", sql_type::VARCHAR, "VARCHAR"),
        ColumnDescriptor::new("price", sql_type::DECIMAL, "DECIMAL"),
        ColumnDescriptor::new("active", sql_type::BOOLEAN, "BOOLEAN"),
        ColumnDescriptor::new("created", sql_type::TIMESTAMP, "TIMESTAMP"),
        ColumnDescriptor::new("payload", sql_type::VARBINARY, "VARBINARY"),
    ]
}

#[test]
fn test_decode_full_row() {
    let created = NaiveDate::from_ymd_opt(2021, 5, 1)
        .unwrap()
        .and_hms_milli_opt(10, 20, 30, 999)
        .unwrap();
    let cells = vec![
        RawCell::Int(1),
        RawCell::from("widget"),
        RawCell::from("123.456"),
        RawCell::Bool(true),
        RawCell::Timestamp(created),
        RawCell::Null,
    ];

    let row = decode_row(&columns(), &cells).unwrap();
    assert_eq!(row.len(), columns().len());
    assert_eq!(
        row,
        vec![
            Value::Int(1),
            Value::Text("widget".into()),
            Value::Float(123.456),
            Value::Bool(true),
            Value::Text("2021-05-01 10:20:30".into()),
            Value::Null,
        ]
    );
}

#[test]
fn test_bad_cell_aborts_row() {
    let cells = vec![
        RawCell::Int(1),
        RawCell::from("widget"),
        RawCell::from("1.0"),
        RawCell::Bool(false),
        RawCell::from("not a timestamp"),
        RawCell::Bytes(vec![1, 2]),
    ];
    match decode_row(&columns(), &cells) {
        Err(CoreError::Decode { code, message, .. }) => {
            assert_eq!(code, sql_type::TIMESTAMP);
            assert!(message.contains("created"), "{message}");
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn test_cell_count_mismatch() {
    let err = decode_row(&columns(), &[RawCell::Int(1)]).unwrap_err();
    assert!(matches!(err, CoreError::Decode { .. }));
}

#[test]
fn test_decode_is_deterministic() {
    let samples = [
        RawCell::Int(3),
        RawCell::from("0"),
        RawCell::Float(2.5),
        RawCell::Bool(true),
    ];
    for (code, _) in TYPE_CLASSES {
        for raw in &samples {
            let first = decode(*code, "T", raw);
            let second = decode(*code, "T", raw);
            assert_eq!(first, second, "code {code} raw {raw:?}");
        }
    }
}

#[test]
fn test_column_metadata() {
    let cols = columns();
    assert_eq!(
        decode_column_names(&cols),
        vec!["id", "name", "price", "active", "created", "payload"]
    );
    assert_eq!(decode_column_type_names(&cols)[2], "DECIMAL");
    assert!(decode_column_names(&[]).is_empty());
}
