use tweetsearch_core::tokenizer::tokenize;
use tweetsearch_core::Query;

#[test]
fn it_lowercases_and_splits_on_whitespace() {
    let words = tokenize("Running  Runners\nRUN! café's");
    assert_eq!(words, vec!["running", "runners", "run!", "café's"]);
}

#[test]
fn it_keeps_short_and_common_words() {
    // no stopword list and no stemming
    let words = tokenize("The cat and a dog");
    assert_eq!(words, vec!["the", "cat", "and", "a", "dog"]);
}

#[test]
fn query_parse_uses_the_tokenizer() {
    let q = Query::parse("Climate  CHANGE climate");
    assert_eq!(q.terms(), tokenize("climate change climate").as_slice());
    assert_eq!(q.term_counts(), vec![("climate", 2), ("change", 1)]);
}
