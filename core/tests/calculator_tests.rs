use tfidf_core::TfIdfCalculator;

fn seeded() -> TfIdfCalculator {
    let calc = TfIdfCalculator::new();
    calc.add_document("this is a test document");
    calc.add_document("this document is another test");
    calc
}

fn assert_finite(value: f64) {
    assert!(!value.is_nan(), "score is NaN");
    assert!(value.is_finite(), "score is not finite: {value}");
}

#[test]
fn known_text_scores_positive() {
    let score = seeded().calculate_document_tf_idf(Some("this is a test")).unwrap();
    assert_finite(score);
    assert!(score > 0.0);
}

#[test]
fn known_text_score_value() {
    // this, is, test appear in both documents (idf 1); a appears in one.
    let expected = 3.0 + (1.5f64.ln() + 1.0);
    let score = seeded().score("this is a test");
    assert!((score - expected).abs() < 1e-12);
}

#[test]
fn single_word_document() {
    let score = seeded().score("test");
    assert_finite(score);
    assert_eq!(score, 1.0);
}

#[test]
fn empty_document_scores_zero() {
    assert_eq!(seeded().calculate_document_tf_idf(Some("")).unwrap(), 0.0);
}

#[test]
fn special_characters_score_zero() {
    assert_eq!(seeded().score("### $$$ %%%"), 0.0);
}

#[test]
fn whitespace_only_scores_zero() {
    assert_eq!(seeded().score("     "), 0.0);
}

#[test]
fn out_of_vocabulary_word() {
    let score = seeded().score("xyz");
    assert_finite(score);
    assert!(score > 0.0);
    assert!((score - (3.0f64.ln() + 1.0)).abs() < 1e-12);
}

#[test]
fn absent_document_is_invalid_argument() {
    let err = seeded().calculate_document_tf_idf(None).unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(err.to_string(), "invalid argument: document text must be provided");
}

#[test]
fn mixed_case_matches_lowercase() {
    let calc = seeded();
    assert_eq!(calc.score("Test DOCUMENT tEsT"), calc.score("test document test"));
}

#[test]
fn repeated_common_words() {
    let score = seeded().score("this this this document document");
    assert_finite(score);
    assert_eq!(score, 5.0);
}

#[test]
fn very_long_document() {
    let mut doc = String::new();
    for i in 0..1000 {
        doc.push_str(&format!("test document word {i} "));
    }
    let score = seeded().score(&doc);
    assert_finite(score);
    assert!(score > 0.0);
}

#[test]
fn numbers_punctuation_and_unicode() {
    let calc = seeded();
    for text in ["test 123 document 456", "a", "test مستند 文档", "test, document. another! test?", "test    document     test"] {
        assert_finite(calc.score(text));
    }
    assert_eq!(calc.score("test, document. another! test?"), calc.score("test document another test"));
    assert_eq!(calc.score("test    document     test"), calc.score("test document test"));
}

#[test]
fn empty_corpus_scores_finite() {
    let calc = TfIdfCalculator::new();
    assert_eq!(calc.score("anything at all"), 3.0);
    assert_eq!(calc.score(""), 0.0);
}

#[test]
fn adding_is_not_idempotent() {
    let calc = seeded();
    let before = calc.frequency_of("test");
    calc.add_document("another test");
    calc.add_document("another test");
    assert_eq!(calc.document_count(), 4);
    assert_eq!(calc.frequency_of("test"), before + 2);
    assert_eq!(calc.frequency_of("another"), 3);
}

#[test]
fn scoring_does_not_change_the_corpus() {
    let calc = seeded();
    let stats = calc.stats();
    let first = calc.score("this is a novel sentence");
    for _ in 0..10 {
        assert_eq!(calc.score("this is a novel sentence"), first);
    }
    assert_eq!(calc.stats(), stats);
    assert_eq!(calc.frequency_of("novel"), 0);
}

#[test]
fn novel_text_scores_higher_than_familiar() {
    let calc = seeded();
    assert!(calc.score("quantum widget") > calc.score("this test"));
}

#[test]
fn breakdown_reports_counts() {
    let b = seeded().score_breakdown("Test DOCUMENT tEsT xyz");
    assert_eq!(b.term_count, 4);
    assert_eq!(b.distinct_terms, 3);
    assert_eq!(b.document_count, 2);
}

#[test]
fn non_ascii_case_variants_score_equally() {
    let calc = TfIdfCalculator::new();
    calc.add_document("σοφοσ straße");
    calc.add_document("İstanbul");
    // One of two documents contains the term.
    assert!((calc.score("ΣΟΦΟΣ") - (1.5f64.ln() + 1.0)).abs() < 1e-12);
    assert_eq!(calc.score("ΣΟΦΟΣ"), calc.score("σοφος"));
    assert_eq!(calc.score("STRASSE"), calc.score("straße"));
    assert_eq!(calc.score("i\u{307}stanbul"), calc.score("İSTANBUL"));
}
