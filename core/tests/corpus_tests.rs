use std::fs;
use tempfile::tempdir;
use tweetsearch_core::{build_index, load_corpus, CorpusError};

const ARRAY: &str = r#"[
  {"doc_id": "doc_1", "tweet": ["cat", "sat"], "date": "2024-10-01", "url": "https://x.com/1", "hashtags": ["pets"]},
  {"doc_id": "doc_2", "tweet": ["dog", "ran"]}
]"#;

#[test]
fn loads_json_array_with_defaults() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("tweets.json");
    fs::write(&file, ARRAY).unwrap();

    let docs = load_corpus(&file).unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id, "doc_1");
    assert_eq!(docs[0].terms, vec!["cat", "sat"]);
    assert_eq!(docs[0].meta.url, "https://x.com/1");
    assert_eq!(docs[0].meta.hashtags, vec!["pets"]);
    assert_eq!(docs[1].meta.date, "");
    assert!(docs[1].meta.hashtags.is_empty());
}

#[test]
fn loads_jsonl_skipping_blank_lines_and_numeric_ids() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("tweets.jsonl");
    fs::write(&file, "{\"doc_id\": 7, \"tweet\": [\"a\"]}\n\n{\"doc_id\": \"8\", \"tweet\": []}\n").unwrap();

    let docs = load_corpus(&file).unwrap();
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["7", "8"]);
    assert!(docs[1].terms.is_empty());
}

#[test]
fn walks_directories_in_path_order() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("b.jsonl"), "{\"doc_id\": \"b\", \"tweet\": [\"x\"]}\n").unwrap();
    fs::write(dir.path().join("a.json"), "{\"doc_id\": \"a\", \"tweet\": [\"x\"]}").unwrap();
    fs::write(dir.path().join("nested/c.json"), "[{\"doc_id\": \"c\", \"tweet\": [\"y\"]}]").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let docs = load_corpus(dir.path()).unwrap();
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    let index = build_index(docs).unwrap();
    assert_eq!(index.document_frequency("x"), 2);
}

#[test]
fn missing_terms_fail_the_load() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("bad.json");
    fs::write(&file, r#"[{"doc_id": "1", "tweet": ["a"]}, {"doc_id": "2"}]"#).unwrap();

    match load_corpus(&file) {
        Err(CorpusError::MissingField { entry, field, .. }) => {
            assert_eq!(entry, 2);
            assert_eq!(field, "tweet");
        }
        other => panic!("expected missing field, got {other:?}"),
    }
}

#[test]
fn missing_id_reports_jsonl_line() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("bad.jsonl");
    fs::write(&file, "{\"doc_id\": \"1\", \"tweet\": []}\n{\"tweet\": [\"a\"]}\n").unwrap();

    let err = load_corpus(&file).unwrap_err();
    assert!(matches!(err, CorpusError::MissingField { entry: 2, field: "doc_id", .. }));
    assert!(err.to_string().contains("doc_id"));
}

#[test]
fn invalid_json_and_missing_paths_are_errors() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("broken.json");
    fs::write(&file, "[{").unwrap();
    assert!(matches!(load_corpus(&file), Err(CorpusError::Json { .. })));

    let scalar = dir.path().join("scalar.json");
    fs::write(&scalar, "42").unwrap();
    assert!(matches!(load_corpus(&scalar), Err(CorpusError::UnexpectedShape { .. })));

    assert!(matches!(load_corpus(dir.path().join("nope.json")), Err(CorpusError::NotFound(_))));
}
