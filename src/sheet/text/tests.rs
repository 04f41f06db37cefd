//! Tests for the delimited text reader

use std::io::{Cursor, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;

use super::*;
use crate::common::{Error, Result};
use crate::sheet::{CellValue, DeclaredType, RecordCursor, RecordExt, TabularSource};

type Reader = DelimitedReader<Cursor<Vec<u8>>>;

fn reader(input: &str, config: TextConfig) -> Reader {
    DelimitedReader::from_bytes(input, config).unwrap()
}

fn no_headers() -> TextConfig {
    TextConfig::default().with_headers(false)
}

fn rows(reader: &mut Reader) -> Vec<Vec<Option<String>>> {
    reader.records().collect::<Result<Vec<_>>>().unwrap()
}

fn row(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some(v.to_string())).collect()
}

#[test]
fn test_csv_with_headers() {
    let mut reader = reader("name,age,city\nJohn,25,New York\nJane,30,London", TextConfig::default());

    assert_eq!(reader.headers().unwrap(), &["name", "age", "city"]);
    assert_eq!(reader.field_count().unwrap(), 3);
    assert_eq!(reader.total_record_count().unwrap(), 2);

    assert!(reader.advance().unwrap());
    assert_eq!(reader.current_record_index(), Some(0));
    assert_eq!(reader.field(0).unwrap(), Some("John"));
    assert_eq!(reader.field_by_name("CITY").unwrap(), Some("New York"));

    assert!(reader.advance().unwrap());
    assert_eq!(reader.record().unwrap(), row(&["Jane", "30", "London"]));

    assert!(!reader.advance().unwrap());
    assert_eq!(reader.current_record_index(), None);
    assert!(reader.end_of_stream());
}

#[test]
fn test_tsv_parsing() {
    let mut reader = reader("name\tage\nJohn\t25\n", TextConfig::tsv());
    assert!(reader.advance().unwrap());
    assert_eq!(reader.field(1).unwrap(), Some("25"));
}

#[test]
fn test_escaped_quote() {
    let mut reader = reader("\"a\"\"b\"", no_headers());
    assert_eq!(rows(&mut reader), vec![row(&["a\"b"])]);
}

#[test]
fn test_delimiter_inside_quotes() {
    let mut reader = reader("\"a,b\",c", no_headers());
    assert_eq!(rows(&mut reader), vec![row(&["a,b", "c"])]);
}

#[test]
fn test_multiline_quoted_field() {
    let input = "h1,h2\n\"x\ny\",z\n";

    let mut reader = reader(input, TextConfig::default());
    assert_eq!(reader.total_record_count().unwrap(), 1);
    assert_eq!(rows(&mut reader), vec![row(&["x\ny", "z"])]);

    let config = TextConfig::default()
        .with_multiline(false)
        .with_missing_field_action(MissingFieldAction::ReplaceByNull);
    let mut reader = self::reader(input, config);
    assert_eq!(reader.total_record_count().unwrap(), 2);

    assert!(reader.advance().unwrap());
    assert_eq!(reader.field(0).unwrap(), Some("x"));
    assert_eq!(reader.field(1).unwrap(), None);
    assert!(reader.missing_field_flag());

    assert!(reader.advance().unwrap());
    assert!(!reader.missing_field_flag());
    assert_eq!(reader.record().unwrap(), row(&["y\"", "z"]));
}

#[test]
fn test_duplicate_headers_rejected() {
    let result = DelimitedReader::from_bytes("name,NAME\n1,2\n", TextConfig::default());
    assert!(matches!(
        result,
        Err(Error::DuplicateHeader {
            first: 0,
            second: 1,
            ..
        })
    ));
}

#[test]
fn test_blank_header_cells_get_synthetic_names() {
    let config = TextConfig::default().with_default_header_name("F");
    let mut reader = reader("id,,note\n1,2,3\n", config);
    assert_eq!(reader.headers().unwrap(), &["id", "F1", "note"]);
    assert_eq!(reader.column_name(1).unwrap(), "F1");
}

#[test]
fn test_missing_field_replaced_by_empty() {
    let config = no_headers().with_missing_field_action(MissingFieldAction::ReplaceByEmpty);
    let mut reader = reader("a,b\na\n", config);

    assert!(reader.advance().unwrap());
    assert_eq!(reader.record().unwrap(), row(&["a", "b"]));
    assert!(!reader.missing_field_flag());

    assert!(reader.advance().unwrap());
    assert_eq!(reader.record().unwrap(), row(&["a", ""]));
    assert!(reader.missing_field_flag());
}

#[test]
fn test_missing_field_raises_error() {
    let mut reader = reader("a,b\na\n", no_headers());

    assert!(reader.advance().unwrap());
    assert!(reader.advance().unwrap());
    assert_eq!(reader.field(0).unwrap(), Some("a"));
    match reader.field(1) {
        Err(Error::MissingField(info)) => {
            assert_eq!(info.record_index, 1);
            assert_eq!(info.field_index, 1);
            assert_eq!(info.raw_data, "a,b\na\n");
            assert_eq!(info.position, 6);
        },
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(reader.missing_field_flag());
}

#[test]
fn test_missing_field_resolved_by_handler() {
    let mut reader = DelimitedReader::with_parse_error_handler(
        Cursor::new(b"a,b\n1\n".to_vec()),
        TextConfig::default(),
        |event: &mut ParseErrorEvent| {
            assert_eq!(event.kind(), ParseErrorKind::MissingField);
            event.action = ParseErrorAction::AdvanceToNextLine;
        },
    )
    .unwrap();

    assert!(reader.advance().unwrap());
    assert_eq!(reader.field(1).unwrap(), None);
    assert!(reader.missing_field_flag());
    assert!(!reader.parse_error_flag());
}

#[test]
fn test_trailing_empty_field_is_not_missing() {
    let mut reader = reader("a,b\n1,\n", TextConfig::default());
    assert!(reader.advance().unwrap());
    assert_eq!(reader.field(1).unwrap(), Some(""));
    assert!(!reader.missing_field_flag());
}

#[test]
fn test_surplus_fields_discarded() {
    let mut reader = reader("a,b\n1,2,3\n4,5\n", TextConfig::default());
    assert_eq!(reader.total_record_count().unwrap(), 2);
    assert_eq!(rows(&mut reader), vec![row(&["1", "2"]), row(&["4", "5"])]);
}

#[test]
fn test_precount_rewinds() {
    let mut reader = reader("h1,h2\n1,2\n3,4\n", TextConfig::default());
    assert_eq!(reader.total_record_count().unwrap(), 2);
    assert_eq!(reader.current_record_index(), None);

    assert!(reader.advance().unwrap());
    assert_eq!(reader.current_record_index(), Some(0));
    assert_eq!(reader.field(0).unwrap(), Some("1"));
}

#[test]
fn test_deferred_count() {
    let config = TextConfig::default().with_precount(PrecountMode::Deferred);
    let mut reader = reader("h\n1\n2\n", config);
    assert!(matches!(reader.total_record_count(), Err(Error::CountUnavailable)));

    assert!(reader.advance().unwrap());
    assert_eq!(reader.count_records().unwrap(), 2);
    assert_eq!(reader.total_record_count().unwrap(), 2);

    // Counting rewinds the cursor.
    assert_eq!(reader.current_record_index(), None);
    assert!(reader.advance().unwrap());
    assert_eq!(reader.field(0).unwrap(), Some("1"));
}

#[test]
fn test_comment_and_blank_lines_skipped() {
    let mut reader = reader("a,b\n#skip\n\nc,d\n", no_headers());
    assert_eq!(reader.total_record_count().unwrap(), 2);
    assert_eq!(rows(&mut reader), vec![row(&["a", "b"]), row(&["c", "d"])]);
}

#[test]
fn test_blank_lines_kept_when_not_skipping() {
    let config = no_headers()
        .with_skip_empty_lines(false)
        .with_missing_field_action(MissingFieldAction::ReplaceByNull);
    let mut reader = reader("a,b\n\nc,d\n", config);
    assert_eq!(reader.total_record_count().unwrap(), 3);
    let records = rows(&mut reader);
    assert_eq!(records[1], vec![Some(String::new()), None]);
}

#[test]
fn test_trailing_blank_line_without_terminator() {
    let config = no_headers().with_skip_empty_lines(false);
    for input in ["a\n   ", "a\n   \n"] {
        let mut reader = reader(input, config.clone());
        assert_eq!(reader.total_record_count().unwrap(), 2, "{input:?}");
        assert_eq!(rows(&mut reader), vec![row(&["a"]), row(&[""])]);
    }

    let mut reader = reader("a\n   ", TextConfig::default().with_headers(false));
    assert_eq!(reader.total_record_count().unwrap(), 1);
}

#[test]
fn test_line_endings() {
    let mut reader = reader("a,b\r\nc,d\re,f", no_headers());
    assert_eq!(
        rows(&mut reader),
        vec![row(&["a", "b"]), row(&["c", "d"]), row(&["e", "f"])]
    );
}

#[test]
fn test_unterminated_quote_throws() {
    let input = "a,b\n1,\"open\n2,3\n";
    let config = no_headers().with_parse_error_action(ParseErrorAction::ThrowException);

    // The precount scans every field, so an eager reader fails up front.
    assert!(matches!(
        DelimitedReader::from_bytes(input, config.clone()),
        Err(Error::MalformedField(_))
    ));

    let mut reader = reader(input, config.with_precount(PrecountMode::Deferred));
    assert!(reader.advance().unwrap());
    assert!(reader.advance().unwrap());
    assert_eq!(reader.field(0).unwrap(), Some("1"));
    match reader.field(1) {
        Err(Error::MalformedField(info)) => {
            assert_eq!(info.record_index, 1);
            assert_eq!(info.field_index, 1);
            assert_eq!(info.raw_data, input);
            assert_eq!(info.position, input.len());
        },
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(reader.parse_error_flag());
}

#[test]
fn test_unterminated_quote_advances() {
    let config = no_headers().with_parse_error_action(ParseErrorAction::AdvanceToNextLine);
    let mut reader = reader("a,b\n1,\"open\n2,3\n", config);
    assert_eq!(reader.total_record_count().unwrap(), 2);

    assert!(reader.advance().unwrap());
    assert!(reader.advance().unwrap());
    assert_eq!(reader.field(0).unwrap(), Some("1"));
    assert_eq!(reader.field(1).unwrap(), None);
    assert!(reader.parse_error_flag());

    let mut copy = vec![Some("stale".to_string()); 3];
    reader.copy_record_to(&mut copy).unwrap();
    assert_eq!(copy, vec![None, None, Some("stale".to_string())]);

    assert!(!reader.advance().unwrap());
}

#[test]
fn test_garbage_after_quote_skips_line() {
    let config = no_headers().with_parse_error_action(ParseErrorAction::AdvanceToNextLine);
    let mut reader = reader("x,y\n\"a\"b,c\nd,e\n", config);
    let records = rows(&mut reader);
    assert_eq!(records, vec![row(&["x", "y"]), vec![None, None], row(&["d", "e"])]);
}

#[test]
fn test_malformed_header_line_skipped() {
    let config = TextConfig::default().with_parse_error_action(ParseErrorAction::AdvanceToNextLine);
    let mut reader = reader("\"bad\"x,y\nh1,h2\n1,2\n", config);
    assert_eq!(reader.headers().unwrap(), &["h1", "h2"]);
    assert_eq!(reader.total_record_count().unwrap(), 1);
}

#[test]
fn test_whitespace_after_closing_quote_accepted() {
    let mut reader = reader("h1,h2\n\"a\" ,b\n\"c\"\t\n", TextConfig::default());
    assert_eq!(reader.total_record_count().unwrap(), 2);

    assert!(reader.advance().unwrap());
    assert_eq!(reader.record().unwrap(), row(&["a", "b"]));
    assert!(!reader.parse_error_flag());

    let config = TextConfig::default()
        .with_trimming(ValueTrimming::NONE)
        .with_missing_field_action(MissingFieldAction::ReplaceByEmpty);
    let mut reader = self::reader("h1,h2\n\" a \"  ,b\n", config);
    assert!(reader.advance().unwrap());
    assert_eq!(reader.field(0).unwrap(), Some(" a "));
    assert_eq!(reader.field(1).unwrap(), Some("b"));
}

#[test]
fn test_raw_buffer_holds_current_window() {
    let input = "x,y\n1,2\n";
    let mut reader = reader(input, TextConfig::default());
    assert!(reader.advance().unwrap());
    assert_eq!(reader.raw_buffer(), input);

    let mut reader = self::reader(input, TextConfig::default().with_buffer_size(4));
    assert!(reader.advance().unwrap());
    assert_eq!(reader.field(1).unwrap(), Some("2"));
    assert_eq!(reader.raw_buffer(), "1,2\n");
}

#[test]
fn test_rewind_returns_to_stream_origin() {
    let mut stream = Cursor::new(b"preamble\nid,name\n1,bolt\n".to_vec());
    stream.set_position(9);
    let mut reader = DelimitedReader::new(stream, TextConfig::default()).unwrap();
    assert_eq!(reader.total_record_count().unwrap(), 1);

    assert!(reader.advance().unwrap());
    assert!(!reader.advance().unwrap());
    reader.rewind().unwrap();
    assert_eq!(reader.headers().unwrap(), &["id", "name"]);
    assert!(reader.advance().unwrap());
    assert_eq!(reader.field(1).unwrap(), Some("bolt"));
}

#[test]
fn test_handler_called_per_occurrence() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let mut reader = DelimitedReader::with_parse_error_handler(
        Cursor::new(b"a\n\"x\"y\nb\n".to_vec()),
        no_headers(),
        move |event: &mut ParseErrorEvent| {
            seen.fetch_add(1, Ordering::SeqCst);
            assert_eq!(event.kind(), ParseErrorKind::MalformedField);
            event.action = ParseErrorAction::AdvanceToNextLine;
        },
    )
    .unwrap();
    // Once during the precount.
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert_eq!(rows(&mut reader), vec![row(&["a"]), vec![None], row(&["b"])]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_handler_raising_again_is_invalid() {
    let result = DelimitedReader::with_parse_error_handler(
        Cursor::new(b"a\n\"x\"y\n".to_vec()),
        no_headers(),
        |event: &mut ParseErrorEvent| event.action = ParseErrorAction::RaiseEvent,
    );
    assert!(matches!(result, Err(Error::InvalidRecoveryAction(_))));
}

#[test]
fn test_handler_set_after_construction() {
    let config = no_headers().with_precount(PrecountMode::Deferred);
    let mut reader = reader("\"x\"y\nb\n", config);
    reader.set_parse_error_handler(|event: &mut ParseErrorEvent| {
        event.action = ParseErrorAction::AdvanceToNextLine;
    });
    assert_eq!(rows(&mut reader), vec![row(&["b"])]);

    reader.clear_parse_error_handler();
    reader.rewind().unwrap();
    assert!(matches!(reader.advance(), Err(Error::MalformedField(_))));
}

#[test]
fn test_iterator_invalidation() {
    let mut reader = reader("h\n1\n2\n3\n", TextConfig::default());

    let mut cursor = RecordCursor::new(&reader);
    assert!(cursor.move_next(&mut reader).unwrap());
    assert_eq!(cursor.current(), Some(&row(&["1"])[..]));

    reader.advance().unwrap();
    assert!(matches!(
        cursor.move_next(&mut reader),
        Err(Error::EnumerationInvalidated)
    ));
}

#[test]
fn test_cursors_share_position() {
    let mut reader = reader("h\n1\n2\n", TextConfig::default());
    let mut first = RecordCursor::new(&reader);
    let mut second = RecordCursor::new(&reader);

    assert!(first.move_next(&mut reader).unwrap());
    assert!(matches!(
        second.move_next(&mut reader),
        Err(Error::EnumerationInvalidated)
    ));

    assert!(first.move_next(&mut reader).unwrap());
    assert_eq!(first.current(), Some(&row(&["2"])[..]));
    assert!(!first.move_next(&mut reader).unwrap());
    assert_eq!(first.current(), None);

    first.reset(&mut reader).unwrap();
    assert!(first.move_next(&mut reader).unwrap());
    assert_eq!(first.current(), Some(&row(&["1"])[..]));
}

#[test]
fn test_access_errors() {
    let mut reader = reader("a,b\n1,2\n", TextConfig::default());
    assert!(matches!(reader.field(0), Err(Error::NoCurrentRecord)));

    assert!(reader.advance().unwrap());
    assert!(matches!(
        reader.field(2),
        Err(Error::FieldIndexOutOfRange { index: 2, count: 2 })
    ));
    assert!(matches!(reader.field_index("c"), Err(Error::HeaderNotFound(name)) if name == "c"));

    let mut copy = vec![None; 1];
    assert!(matches!(
        reader.copy_record_to(&mut copy),
        Err(Error::BufferTooSmall { needed: 2, available: 1 })
    ));

    assert!(!reader.advance().unwrap());
    assert!(matches!(reader.field(0), Err(Error::NoCurrentRecord)));

    let mut reader = self::reader("a,b\n", no_headers());
    assert!(matches!(reader.headers(), Err(Error::NoHeaders)));
    assert!(matches!(reader.field_index("a"), Err(Error::NoHeaders)));
    assert_eq!(reader.column_name(1).unwrap(), "Column1");
}

#[test]
fn test_lazy_fields_out_of_order() {
    let mut reader = reader("h1,h2,h3\nx,\"y\",z\n", TextConfig::default());
    assert!(reader.advance().unwrap());
    assert_eq!(reader.field(2).unwrap(), Some("z"));
    assert_eq!(reader.field(0).unwrap(), Some("x"));
    assert_eq!(reader.field(1).unwrap(), Some("y"));
}

#[test]
fn test_seek_forward_only() {
    let mut reader = reader("r0\nr1\nr2\nr3\n", no_headers());

    assert_eq!(reader.field_at(2, 0).unwrap(), Some("r2"));
    assert_eq!(reader.current_record_index(), Some(2));
    assert!(matches!(
        reader.field_at(1, 0),
        Err(Error::CannotSeekBackward { current: 2, target: 1 })
    ));
    assert!(!reader.move_to(1).unwrap());
    assert!(reader.move_to(3).unwrap());
    assert!(matches!(reader.field_at(10, 0), Err(Error::RecordNotFound(10))));
}

#[test]
fn test_seek_by_name() {
    let mut reader = reader("id,name\n1,bolt\n2,nut\n", TextConfig::default());
    assert_eq!(reader.field_at_named(1, "Name").unwrap(), Some("nut"));
}

#[test]
fn test_typed_getters() {
    let input = "n,f,b,c,d,e\n42, 2.5 ,1,xyz,2024-03-01,\n-7,1e3,false,caf\u{e9},2024-03-01T10:20:30,\u{20ac}\n";
    let mut reader = reader(input, TextConfig::default());

    assert!(reader.advance().unwrap());
    assert_eq!(reader.get_i32(0).unwrap(), 42);
    assert_eq!(reader.get_i64(0).unwrap(), 42);
    assert_eq!(reader.get_u8(0).unwrap(), 42);
    assert_eq!(reader.get_f64(1).unwrap(), 2.5);
    assert!(reader.get_bool(2).unwrap());
    assert_eq!(reader.get_char(3).unwrap(), 'x');
    assert_eq!(reader.get_str(3).unwrap(), "xyz");
    assert!(reader.is_null(5).unwrap());
    assert!(!reader.is_null(0).unwrap());
    assert_eq!(reader.get_value(5).unwrap(), CellValue::Empty);
    assert_eq!(reader.infer_value(0).unwrap(), CellValue::Int(42));
    assert!(matches!(
        reader.get_i32(3),
        Err(Error::Conversion { field: 3, target: "i32", .. })
    ));
    assert!(matches!(reader.get_char(5), Err(Error::Conversion { .. })));

    let mut chars = ['\0'; 5];
    assert_eq!(reader.read_chars(3, 1, &mut chars).unwrap(), 2);
    assert_eq!(&chars[..2], &['y', 'z']);
    assert_eq!(reader.field_len(3).unwrap(), 3);

    let mut values = vec![CellValue::Empty; 8];
    assert_eq!(reader.get_values(&mut values).unwrap(), 6);
    assert_eq!(values[0], CellValue::String("42".to_string()));

    assert!(reader.advance().unwrap());
    assert_eq!(reader.get_i16(0).unwrap(), -7);
    assert!(reader.get_u8(0).is_err());
    assert_eq!(reader.get_f32(1).unwrap(), 1000.0);
    assert!(!reader.get_bool(2).unwrap());

    let mut bytes = [0u8; 8];
    assert_eq!(reader.read_bytes(3, 0, &mut bytes).unwrap(), 4);
    assert_eq!(&bytes[..4], b"caf\xe9");
    assert!(matches!(
        reader.read_bytes(5, 0, &mut bytes),
        Err(Error::Conversion { target: "byte", .. })
    ));
}

#[cfg(feature = "datetime")]
#[test]
fn test_datetime_getter() {
    use chrono::NaiveDate;

    let input = "d\n2024-03-01\n2024-03-01T10:20:30\n2024-03-01T10:20:30+02:00\nlater\n";
    let mut reader = reader(input, TextConfig::default());
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

    assert!(reader.advance().unwrap());
    assert_eq!(reader.get_datetime(0).unwrap(), date.and_hms_opt(0, 0, 0).unwrap());
    assert!(reader.advance().unwrap());
    assert_eq!(reader.get_datetime(0).unwrap(), date.and_hms_opt(10, 20, 30).unwrap());
    assert!(reader.advance().unwrap());
    assert_eq!(reader.get_datetime(0).unwrap(), date.and_hms_opt(8, 20, 30).unwrap());
    assert!(reader.advance().unwrap());
    assert!(matches!(reader.get_datetime(0), Err(Error::Conversion { .. })));
}

#[cfg(feature = "guid")]
#[test]
fn test_guid_getter() {
    let input = "id\n67e55044-10b1-426f-9247-bb680e5fe0c8\n{67E55044-10B1-426F-9247-BB680E5FE0C8}\nnot-a-guid\n";
    let mut reader = reader(input, TextConfig::default());
    let expected = uuid::Uuid::from_u128(0x67e55044_10b1_426f_9247_bb680e5fe0c8);

    assert!(reader.advance().unwrap());
    assert_eq!(reader.get_guid(0).unwrap(), expected);
    assert!(reader.advance().unwrap());
    assert_eq!(reader.get_guid(0).unwrap(), expected);
    assert!(reader.advance().unwrap());
    assert!(matches!(
        reader.get_guid(0),
        Err(Error::Conversion { target: "guid", .. })
    ));
}

#[test]
fn test_copy_record_at_offset() {
    let mut reader = reader("a,b\n1,2\n", TextConfig::default());
    assert!(reader.advance().unwrap());

    let mut dest = vec![Some("keep".to_string()); 4];
    reader.copy_record_to_at(&mut dest, 1).unwrap();
    assert_eq!(
        dest,
        vec![
            Some("keep".to_string()),
            Some("1".to_string()),
            Some("2".to_string()),
            Some("keep".to_string()),
        ]
    );

    assert!(matches!(
        reader.copy_record_to_at(&mut dest, 3),
        Err(Error::BufferTooSmall { needed: 5, available: 4 })
    ));
}

#[test]
fn test_schema() {
    let mut reader = reader("id,name\n1,bolt\n", TextConfig::default());
    let schema = reader.schema().unwrap();
    assert_eq!(schema.len(), 2);
    assert_eq!(schema[1].name, "name");
    assert_eq!(schema[1].ordinal, 1);
    assert_eq!(schema[1].data_type, DeclaredType::Text);
    assert_eq!(reader.column_type(0).unwrap(), DeclaredType::Text);
    assert!(reader.column_type(2).is_err());

    let mut reader = self::reader("1,bolt\n", no_headers());
    let names: Vec<String> = reader.schema().unwrap().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Column0", "Column1"]);
}

#[test]
fn test_disposal() {
    let mut reader = reader("a,b\n1,2\n", TextConfig::default());
    assert!(reader.advance().unwrap());
    reader.close();

    assert!(reader.is_disposed());
    assert!(matches!(reader.advance(), Err(Error::Disposed)));
    assert!(matches!(reader.field(0), Err(Error::Disposed)));
    assert!(matches!(reader.headers(), Err(Error::Disposed)));
    assert!(matches!(reader.total_record_count(), Err(Error::Disposed)));
    assert!(matches!(reader.rewind(), Err(Error::Disposed)));

    // Closing again is harmless.
    reader.close();
    assert!(reader.is_disposed());
}

#[test]
fn test_empty_input() {
    let mut reader = reader("", TextConfig::default());
    assert_eq!(reader.total_record_count().unwrap(), 0);
    assert!(reader.headers().unwrap().is_empty());
    assert!(!reader.advance().unwrap());

    let mut reader = self::reader("# only a comment\n\n", no_headers());
    assert_eq!(reader.total_record_count().unwrap(), 0);
    assert_eq!(reader.field_count().unwrap(), 0);
    assert!(!reader.advance().unwrap());
}

#[test]
fn test_legacy_encoding() {
    let config = no_headers().with_encoding(encoding_rs::WINDOWS_1252);
    let mut reader = DelimitedReader::from_bytes(b"caf\xe9,x\n".to_vec(), config).unwrap();
    assert!(reader.advance().unwrap());
    assert_eq!(reader.field(0).unwrap(), Some("caf\u{e9}"));
}

#[test]
fn test_results_independent_of_buffer_size() {
    let input = "h1,h2,h3\n\"a\"\"b\",\"multi\r\nline\", c \n#note\n\n\"x,y\",,z\r\nshort\n";
    let config = TextConfig::default().with_missing_field_action(MissingFieldAction::ReplaceByNull);
    let expected = rows(&mut reader(input, config.clone()));
    assert_eq!(expected.len(), 3);
    assert_eq!(expected[0], row(&["a\"b", "multi\r\nline", "c"]));
    assert_eq!(expected[2], vec![Some("short".to_string()), None, None]);

    for size in 1..16 {
        let mut reader = reader(input, config.clone().with_buffer_size(size));
        assert_eq!(rows(&mut reader), expected, "buffer size {}", size);
    }
}

#[test]
fn test_open_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"sku,qty\nA-1,4\nB-2,10\n").unwrap();
    file.flush().unwrap();

    let mut reader = DelimitedReader::open(file.path()).unwrap();
    assert_eq!(reader.total_record_count().unwrap(), 2);
    assert!(reader.advance().unwrap());
    assert_eq!(reader.field_by_name("qty").unwrap(), Some("4"));

    let config = TextConfig::default().with_headers(false);
    let mut reader = DelimitedReader::from_path_with_config(file.path(), config).unwrap();
    assert_eq!(reader.total_record_count().unwrap(), 3);
}

#[test]
fn test_open_missing_file() {
    assert!(matches!(
        DelimitedReader::open("/nonexistent/input.csv"),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_invalid_config_rejected() {
    let result = DelimitedReader::from_bytes("a", TextConfig::default().with_buffer_size(0));
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn test_memory_snapshot() {
    let mut reader = reader("id,name\n1,bolt\n2,nut\n", TextConfig::default());
    let mut table = crate::sheet::MemoryTable::load(&mut reader).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.headers().unwrap(), &["id", "name"]);
    assert!(table.advance().unwrap());
    assert_eq!(table.field_by_name("name").unwrap(), Some("bolt"));
}

fn table_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    (1usize..5).prop_flat_map(|columns| {
        prop::collection::vec(prop::collection::vec("[a-z0-9]{1,6}", columns), 1..10)
    })
}

proptest! {
    /// Reading field by field yields the same values as splitting each line
    /// on the delimiter.
    #[test]
    fn split_equivalence(table in table_strategy(), buffer_size in 1usize..16, tab in any::<bool>()) {
        let delimiter = if tab { '\t' } else { ',' };
        let separator = delimiter.to_string();
        let input: String = table
            .iter()
            .map(|fields| fields.join(separator.as_str()) + "\n")
            .collect();
        let config = no_headers().with_delimiter(delimiter).with_buffer_size(buffer_size);
        let mut reader = DelimitedReader::from_bytes(input.as_str(), config).unwrap();

        prop_assert_eq!(reader.total_record_count().unwrap(), table.len() as u64);
        for line in input.lines() {
            prop_assert!(reader.advance().unwrap());
            let expected: Vec<Option<String>> =
                line.split(delimiter).map(|f| Some(f.to_string())).collect();
            prop_assert_eq!(reader.record().unwrap(), expected);
        }
        prop_assert!(!reader.advance().unwrap());
    }
}
