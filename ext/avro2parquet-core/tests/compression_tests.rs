use avro2parquet_core::*;
use parquet::basic::Compression;

mod test_helpers;
use test_helpers::*;

#[test]
fn test_every_supported_codec_roundtrips() {
    for codec in CompressionCodec::ALL {
        if !codec.is_supported() {
            continue;
        }

        let fx = fixture(USER_SCHEMA, generate_users(200));
        let summary = convert_with_codec(&fx.schema, &fx.input, &fx.output, codec)
            .unwrap_or_else(|e| panic!("{} failed: {}", codec, e));
        assert_eq!(summary.codec, codec);

        assert!(is_valid_parquet(&fx.output), "{} output unreadable", codec);
        assert_eq!(read_parquet(&fx.output), expected_users(200));

        let file = std::fs::File::open(&fx.output).unwrap();
        let metadata = Reader::new(file).metadata().unwrap();
        let expected = codec.to_parquet().unwrap();
        for column in metadata.row_group(0).columns() {
            // Levels are not stored in the footer, compare the codec family only
            assert_eq!(
                std::mem::discriminant(&column.compression()),
                std::mem::discriminant(&expected),
                "{}",
                codec
            );
        }
    }
}

#[test]
fn test_unsupported_codec_leaves_existing_output() {
    let fx = fixture(USER_SCHEMA, generate_users(5));
    std::fs::write(&fx.output, b"previous output").unwrap();

    let mut converter = Converter::default();
    let err = converter
        .run(&fx.job().with_codec(CompressionCodec::Lzo))
        .unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::UnsupportedCodec));
    assert_eq!(
        converter.state(),
        ConversionState::Failed(ErrorKind::UnsupportedCodec)
    );
    // Rejected before the output deletion step
    assert_eq!(std::fs::read(&fx.output).unwrap(), b"previous output");
}

#[test]
fn test_unsupported_codec_creates_nothing() {
    let fx = fixture(USER_SCHEMA, generate_users(5));

    let err = convert_with_codec(&fx.schema, &fx.input, &fx.output, CompressionCodec::Lzo)
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::UnsupportedCodec));
    assert!(!fx.output.exists());
}

#[test]
fn test_codec_names_from_text() {
    let codec: CompressionCodec = "gzip".parse().unwrap();
    assert_eq!(codec.to_parquet().unwrap(), Compression::GZIP(Default::default()));

    let err = "lzma".parse::<CompressionCodec>().unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::UnsupportedCodec));
}
