use super::*;

#[test]
fn bytes_source_is_used_verbatim() {
    let bytes = Arc::new(vec![1u8, 2, 3]);
    let font = resolve_font(&FontSource::Bytes(Arc::clone(&bytes))).unwrap();
    assert!(Arc::ptr_eq(&font.bytes, &bytes));
    assert_eq!(font.index, 0);
}

#[test]
fn empty_bytes_are_rejected() {
    let err = resolve_font(&FontSource::Bytes(Arc::new(Vec::new()))).unwrap_err();
    assert!(matches!(err, OvermarkError::Validation(_)));
}

#[test]
fn empty_directory_is_a_precondition_failure() {
    let dir = std::env::temp_dir().join(format!("overmark_no_fonts_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("readme.txt"), b"not a font").unwrap();

    let err = resolve_font(&FontSource::Dir(dir.clone())).unwrap_err();
    assert!(matches!(err, OvermarkError::Precondition(_)));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn missing_directory_is_a_precondition_failure() {
    let err = resolve_font(&FontSource::Dir(PathBuf::from(
        "/nonexistent/overmark/fonts",
    )))
    .unwrap_err();
    assert!(matches!(err, OvermarkError::Precondition(_)));
}
