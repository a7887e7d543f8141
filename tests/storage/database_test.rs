use lontar::{
    storage::{
        database::DatabaseReader,
        header::{FileHeader, TextEncoding},
    },
    types::{RowId, error::DatabaseError, row::Row, value::Value},
    utils::{
        log::{DecodeLog, LogLevel},
        mock::{DatabaseBuilder, TempDatabase},
    },
};

fn numbered_rows(first: RowId, count: usize) -> Vec<(RowId, Vec<Value>)> {
    (0..count as RowId)
        .map(|i| (first + i, vec![Value::Integer(first + i)]))
        .collect()
}

fn rows_of(reader: &DatabaseReader, root: u32, log: &DecodeLog) -> Vec<Row> {
    reader
        .collect_leaf_pages(root, log)
        .iter()
        .flat_map(|page| page.cells().iter().filter_map(Row::from_cell))
        .collect()
}

#[test]
fn test_header_too_short() {
    let err = DatabaseReader::open(vec![0u8; 99]).err().unwrap();
    assert!(matches!(
        err,
        DatabaseError::HeaderTooShort {
            expected: 100,
            actual: 99
        }
    ));
}

#[test]
fn test_header_fields() {
    let image = DatabaseBuilder::new(4096).build();
    assert_eq!(&image[16..18], &[0x10, 0x00]);

    let header = FileHeader::from_bytes(&image).unwrap();
    assert!(header.has_valid_magic());
    assert!(header.has_valid_page_size());
    assert_eq!(header.page_size(), 4096);
    assert_eq!(header.encoding(), TextEncoding::Utf8);
    assert_eq!(header.database_size_pages, 1);
    assert_eq!(FileHeader::from_bytes(&header.to_bytes()).unwrap(), header);
}

#[test]
fn test_page_size_one_means_65536() {
    let image = DatabaseBuilder::new(65536).build();
    assert_eq!(&image[16..18], &[0x00, 0x01]);
    let reader = DatabaseReader::open(image).unwrap();
    assert_eq!(reader.page_size(), 65536);
}

#[test]
fn test_text_encoding_is_reported() {
    let image = DatabaseBuilder::new(1024)
        .with_header(|h| h.text_encoding = 2)
        .build();
    let reader = DatabaseReader::open(image).unwrap();
    assert_eq!(reader.header().encoding(), TextEncoding::Utf16Le);
    assert_eq!(TextEncoding::from_u32(9), TextEncoding::Unknown(9));
}

#[test]
fn test_page_byte_range() {
    let image = DatabaseBuilder::new(1024)
        .leaf_page(3, numbered_rows(1, 2))
        .build();
    let reader = DatabaseReader::open(image).unwrap();

    assert_eq!(reader.file_length(), 3072);
    assert_eq!(reader.page_count(), 3);
    assert_eq!(reader.page_byte_range(1), (100, 1024));
    assert_eq!(reader.page_byte_range(2), (1024, 2048));
    assert_eq!(reader.page_byte_range(3), (2048, 3072));
    let (start, end) = reader.page_byte_range(4);
    assert!(start >= reader.file_length());
    assert_eq!(start, end);
}

#[test]
fn test_partial_last_page_is_clamped() {
    let mut image = DatabaseBuilder::new(1024)
        .leaf_page(2, numbered_rows(1, 1))
        .build();
    image.truncate(1500);
    let reader = DatabaseReader::open(image).unwrap();

    assert_eq!(reader.page_count(), 2);
    assert_eq!(reader.page_byte_range(2), (1024, 1500));
}

#[test]
fn test_invalid_page_numbers() {
    let image = DatabaseBuilder::new(1024).build();
    let reader = DatabaseReader::open(image).unwrap();
    let log = DecodeLog::new();

    for page_number in [0, 2, 100] {
        let err = reader.read_page(page_number, &log).unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::InvalidPageNumber { page_number: n, file_length: 1024 } if n == page_number
        ));
    }
    assert_eq!(log.count(LogLevel::Error), 3);
}

#[test]
fn test_single_page_apple_row() {
    let image = DatabaseBuilder::new(4096)
        .leaf_page(
            1,
            vec![(1, vec![Value::Text("apple".to_string()), Value::Integer(5)])],
        )
        .build();
    assert_eq!(&image[16..18], &[0x10, 0x00]);

    let reader = DatabaseReader::open(image).unwrap();
    let log = DecodeLog::new();
    let pages = reader.collect_leaf_pages(1, &log);
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].header.cell_count, 1);

    let rows = rows_of(&reader, 1, &log);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].row_id, 1);
    assert_eq!(
        rows[0].values,
        vec![Value::Text("apple".to_string()), Value::Integer(5)]
    );
}

#[test]
fn test_interior_page_rows_in_child_order() {
    let image = DatabaseBuilder::new(1024)
        .interior_page(2, vec![(3, 3)], 4)
        .leaf_page(3, numbered_rows(1, 3))
        .leaf_page(4, numbered_rows(4, 4))
        .build();
    let reader = DatabaseReader::open(image).unwrap();
    let log = DecodeLog::new();

    let pages = reader.collect_leaf_pages(2, &log);
    let page_numbers: Vec<u32> = pages.iter().map(|p| p.page_number).collect();
    assert_eq!(page_numbers, vec![3, 4]);

    let row_ids: Vec<RowId> = rows_of(&reader, 2, &log).iter().map(|r| r.row_id).collect();
    assert_eq!(row_ids, vec![1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn test_two_level_tree() {
    let image = DatabaseBuilder::new(1024)
        .interior_page(2, vec![(3, 4)], 4)
        .interior_page(3, vec![(5, 2)], 6)
        .interior_page(4, vec![(7, 6)], 8)
        .leaf_page(5, numbered_rows(1, 2))
        .leaf_page(6, numbered_rows(3, 2))
        .leaf_page(7, numbered_rows(5, 2))
        .leaf_page(8, numbered_rows(7, 2))
        .build();
    let reader = DatabaseReader::open(image).unwrap();

    let row_ids: Vec<RowId> = rows_of(&reader, 2, &DecodeLog::new())
        .iter()
        .map(|r| r.row_id)
        .collect();
    assert_eq!(row_ids, (1..=8).collect::<Vec<_>>());
}

#[test]
fn test_missing_child_contributes_nothing() {
    let image = DatabaseBuilder::new(1024)
        .interior_page(2, vec![(3, 2), (40, 5)], 4)
        .leaf_page(3, numbered_rows(1, 2))
        .leaf_page(4, numbered_rows(6, 1))
        .build();
    let reader = DatabaseReader::open(image).unwrap();
    let log = DecodeLog::new();

    let row_ids: Vec<RowId> = rows_of(&reader, 2, &log).iter().map(|r| r.row_id).collect();
    assert_eq!(row_ids, vec![1, 2, 6]);
    assert!(log.count(LogLevel::Warn) >= 1);
}

#[test]
fn test_index_child_contributes_nothing() {
    let mut index_page = vec![0u8; 1024];
    index_page[0] = 10;
    let image = DatabaseBuilder::new(1024)
        .interior_page(2, vec![(3, 2)], 4)
        .raw_page(3, index_page)
        .leaf_page(4, numbered_rows(3, 2))
        .build();
    let reader = DatabaseReader::open(image).unwrap();

    let pages = reader.collect_leaf_pages(2, &DecodeLog::new());
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].page_number, 4);
}

#[test]
fn test_cyclic_tree_terminates() {
    let image = DatabaseBuilder::new(1024)
        .interior_page(2, vec![(3, 2)], 2)
        .leaf_page(3, numbered_rows(1, 2))
        .build();
    let reader = DatabaseReader::open(image).unwrap();
    let log = DecodeLog::new();

    let pages = reader.collect_leaf_pages(2, &log);
    assert_eq!(pages.len(), 1);
    assert!(
        log.lines()
            .iter()
            .any(|line| line.contains("Page 2 reached twice"))
    );
}

#[test]
fn test_from_path() {
    let image = DatabaseBuilder::new(512)
        .leaf_page(2, numbered_rows(1, 3))
        .build();
    let temp_db = TempDatabase::new(&image).unwrap();

    let reader = DatabaseReader::from_path(temp_db.path()).unwrap();
    assert_eq!(reader.bytes(), image.as_slice());
    assert_eq!(rows_of(&reader, 2, &DecodeLog::new()).len(), 3);
}

#[test]
fn test_from_missing_path_is_io_error() {
    let err = DatabaseReader::from_path("/nonexistent/lontar/missing.db")
        .err()
        .unwrap();
    assert!(matches!(err, DatabaseError::Io(_)));
}
