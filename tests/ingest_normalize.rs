// tests/ingest_normalize.rs
use signal_radar::ingest::normalize_text;

#[test]
fn empty_is_ok() {
    assert_eq!(normalize_text(""), "");
}

#[test]
fn strips_html_and_unescapes() {
    let s = "<p>Derin&nbsp;<b>devlet</b> &ldquo;yine&rdquo;</p>";
    assert_eq!(normalize_text(s), r#"Derin devlet "yine""#);
}

#[test]
fn tags_do_not_glue_words_together() {
    assert_eq!(normalize_text("new<br>world<br/>order"), "new world order");
}

#[test]
fn folds_whitespace_and_nbsp() {
    let s = "A\u{00A0}\n\tB   C";
    assert_eq!(normalize_text(s), "A B C");
}

#[test]
fn keeps_turkish_letters_and_trailing_punctuation() {
    assert_eq!(normalize_text("  Şehitler ölmez!  "), "Şehitler ölmez!");
}

#[test]
fn length_cap_applies() {
    let s = "ğ".repeat(3_000);
    assert_eq!(normalize_text(&s).chars().count(), 2_000);
}
