/// Lower-case `text` and split it on whitespace.
///
/// Corpus terms arrive already tokenized, so queries get the same light
/// treatment and nothing more: no stemming, no stopword removal.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}
