use apache_avro::Codec;
use avro2parquet_core::*;

mod test_helpers;
use test_helpers::*;

// =============================================================================
// Round-trip Tests
// =============================================================================

#[test]
fn test_id_name_snappy_roundtrip() {
    let fx = fixture(USER_SCHEMA, vec![user_record(1, "a"), user_record(2, "b")]);

    let summary =
        convert_with_codec(&fx.schema, &fx.input, &fx.output, CompressionCodec::Snappy).unwrap();
    assert_eq!(summary.records, 2);
    assert_eq!(summary.codec, CompressionCodec::Snappy);

    let rows = read_parquet(&fx.output);
    assert_eq!(
        rows,
        vec![
            vec![Value::Int32(1), Value::from("a")],
            vec![Value::Int32(2), Value::from("b")],
        ]
    );
}

#[test]
fn test_default_codec_is_snappy() {
    let fx = fixture(USER_SCHEMA, generate_users(3));

    let summary = convert(&fx.schema, &fx.input, &fx.output).unwrap();
    assert_eq!(summary.codec, CompressionCodec::Snappy);

    let file = std::fs::File::open(&fx.output).unwrap();
    let metadata = Reader::new(file).metadata().unwrap();
    for column in metadata.row_group(0).columns() {
        assert_eq!(column.compression(), parquet::basic::Compression::SNAPPY);
    }
}

#[test]
fn test_order_preserved_across_batches() {
    let fx = fixture(USER_SCHEMA, generate_users(2_500));

    let mut converter = Converter::new(ConvertOptions {
        writer: WriterConfig {
            batch_size: Some(100),
            ..WriterConfig::default()
        },
        ..ConvertOptions::default()
    });
    let summary = converter.run(&fx.job()).unwrap();
    assert_eq!(summary.records, 2_500);

    assert_eq!(read_parquet(&fx.output), expected_users(2_500));
}

#[test]
fn test_snappy_compressed_avro_input() {
    let fx = fixture_with_codec(USER_SCHEMA, generate_users(10), Codec::Snappy);

    convert(&fx.schema, &fx.input, &fx.output).unwrap();
    assert_eq!(read_parquet(&fx.output), expected_users(10));
}

#[test]
fn test_zero_records() {
    let fx = fixture(USER_SCHEMA, vec![]);

    let summary = convert(&fx.schema, &fx.input, &fx.output).unwrap();
    assert_eq!(summary.records, 0);

    assert!(is_valid_parquet(&fx.output));
    let file = std::fs::File::open(&fx.output).unwrap();
    let reader = Reader::new(file);
    assert_eq!(reader.num_rows().unwrap(), 0);

    let metadata = reader.metadata().unwrap();
    let columns: Vec<_> = metadata
        .file_metadata()
        .schema_descr()
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(columns, vec!["id", "name"]);
}

#[test]
fn test_footer_carries_avro_schema() {
    let fx = fixture(USER_SCHEMA, generate_users(1));

    convert(&fx.schema, &fx.input, &fx.output).unwrap();
    assert_eq!(
        footer_value(&fx.output, "parquet.avro.schema").as_deref(),
        Some(USER_SCHEMA)
    );
    assert_eq!(
        footer_value(&fx.output, "writer.model.name").as_deref(),
        Some("avro")
    );
}

// =============================================================================
// Output File Lifecycle Tests
// =============================================================================

#[test]
fn test_rerun_is_idempotent() {
    let fx = fixture(USER_SCHEMA, generate_users(20));

    let first = convert(&fx.schema, &fx.input, &fx.output).unwrap();
    assert!(!first.replaced_existing);
    let first_rows = read_parquet(&fx.output);

    let second = convert(&fx.schema, &fx.input, &fx.output).unwrap();
    assert!(second.replaced_existing);
    let second_rows = read_parquet(&fx.output);

    // Replaced, not appended
    assert_eq!(second_rows.len(), 20);
    assert_eq!(first_rows, second_rows);
}

#[test]
fn test_existing_unrelated_file_is_replaced() {
    let fx = fixture(USER_SCHEMA, generate_users(2));
    std::fs::write(&fx.output, b"not parquet at all").unwrap();

    let summary = convert(&fx.schema, &fx.input, &fx.output).unwrap();
    assert!(summary.replaced_existing);
    assert_eq!(read_parquet(&fx.output), expected_users(2));
}

#[test]
fn test_no_overwrite_keeps_existing_file() {
    let fx = fixture(USER_SCHEMA, generate_users(2));
    std::fs::write(&fx.output, b"keep me").unwrap();

    let mut converter = Converter::new(ConvertOptions {
        overwrite_existing: false,
        ..ConvertOptions::default()
    });
    let err = converter.run(&fx.job()).unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::Write));
    assert_eq!(converter.state(), ConversionState::Failed(ErrorKind::Write));
    assert_eq!(std::fs::read(&fx.output).unwrap(), b"keep me");
}

#[test]
fn test_output_in_missing_directory() {
    let fx = fixture(USER_SCHEMA, generate_users(2));
    let job = ConversionJob::new(&fx.schema, &fx.input, fx.path("nope/out.parquet"));

    let err = Converter::default().run(&job).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Write));
}

#[test]
fn test_states_after_success() {
    let fx = fixture(USER_SCHEMA, generate_users(1));

    let mut converter = Converter::default();
    assert_eq!(converter.state(), ConversionState::Idle);
    converter.run(&fx.job()).unwrap();
    assert_eq!(converter.state(), ConversionState::Closed);
}

#[test]
fn test_resolved_paths_drive_conversion() {
    let fx = fixture(USER_SCHEMA, generate_users(4));

    let schema = fx.path("records");
    let input = fx.path("records");
    let paths = resolve_paths(
        Some(schema.to_str().unwrap()),
        Some(input.to_str().unwrap()),
        None,
    )
    .unwrap();
    assert_eq!(paths.schema, fx.schema);
    assert_eq!(paths.input, fx.input);
    assert_eq!(paths.output, fx.output);

    let summary = Converter::default()
        .run(&ConversionJob::from(paths))
        .unwrap();
    assert_eq!(summary.records, 4);
    assert_eq!(summary.output, fx.output);
}
