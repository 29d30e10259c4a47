use super::*;

#[test]
fn replaces_markers_in_order_of_reference() {
    let out = substitute("$1 pats $0", &["alice", "bob"], 0).unwrap();
    assert_eq!(out, "bob pats alice");
}

#[test]
fn multi_digit_and_literal_dollar() {
    let texts: Vec<String> = (0..12).map(|i| format!("t{i}")).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    assert_eq!(substitute("[$11]", &refs, 0).unwrap(), "[t11]");
    assert_eq!(substitute("cost $$5", &refs, 0).unwrap(), "cost $5");
    assert_eq!(substitute("a $ b$", &refs, 0).unwrap(), "a $ b$");
}

#[test]
fn missing_text_input_is_position_mismatch() {
    let err = substitute("hi $2", &["x"], 7).unwrap_err();
    assert!(matches!(
        err,
        MemeError::UnmatchedPositionType {
            position: 7,
            kind: ValueKind::Text
        }
    ));
}

#[test]
fn non_ascii_content_passes_through() {
    assert_eq!(substitute("héllo $0 ✓", &["wörld"], 0).unwrap(), "héllo wörld ✓");
}
