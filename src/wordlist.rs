/*!
# Word-List Cache

Process-wide store of resolved word lists, keyed by the `source=`
specification of the words segments that use them. A list is resolved once,
on first touch, and shared by every segment naming the same source:

* `{w1,w2,...}` - inline comma-separated list, no embedded whitespace
* an existing file - tokenized with C/C++-style comment handling (`#`, `//`
  and `/* */`), quoted phrases kept as single entries
* anything else - a synthesized list of `LIST_SIZE` random lowercase words

Words are stored as raw byte sequences so generation never re-encodes them;
non-ASCII file content passes through untouched.
*/

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use logos::Logos;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::warn;

/// Every synthesized list holds this many words.
pub const LIST_SIZE: usize = 1000;

/// Average length of a synthesized word; actual lengths span `1..=2*WORD_SIZE-1`.
pub const WORD_SIZE: i64 = 7;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// A resolved, immutable word list.
pub type WordList = Vec<Vec<u8>>;

static WORD_LISTS: Lazy<Mutex<HashMap<String, Arc<WordList>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Token classes for word files. The lexer skips whitespace and all three
/// comment styles; quoted phrases survive as single words.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(source = [u8])]
enum WordToken {
    #[regex(r"[\x00-\x20]+", logos::skip)]
    Whitespace,
    #[regex(r"#[^\n]*", logos::skip)]
    HashComment,
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,
    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/", logos::skip)]
    BlockComment,
    #[token("/", logos::skip)]
    StraySlash,
    #[token("\"", logos::skip)]
    StrayDoubleQuote,
    #[token("'", logos::skip)]
    StraySingleQuote,
    #[regex(r#""[^"\n]*""#)]
    DoubleQuoted,
    #[regex(r"'[^'\n]*'")]
    SingleQuoted,
    #[regex(r#"[^\x00-\x20#/'"]+"#)]
    Word,
}

/// Resolves `source` through the cache, populating it on first touch.
///
/// The caller's generator drives word synthesis, so a synthesized list is
/// reproducible for a given segment name. The cache lock is held across
/// population; concurrent first touches of the same source serialize.
pub fn resolve(source: &str, rng: &mut StdRng) -> Arc<WordList> {
    let mut cache = WORD_LISTS.lock().expect("word-list cache poisoned");
    if let Some(list) = cache.get(source) {
        return Arc::clone(list);
    }
    let mut list = build_list(source, rng);
    if list.is_empty() {
        warn!("word list {:?} resolved empty, synthesizing instead", source);
        list = synthesize(rng);
    }
    let list = Arc::new(list);
    cache.insert(source.to_string(), Arc::clone(&list));
    list
}

fn build_list(source: &str, rng: &mut StdRng) -> WordList {
    if source.starts_with('{') {
        return parse_inline(source);
    }
    let path = Path::new(source);
    if path.is_file() {
        match std::fs::read(path) {
            Ok(bytes) => return tokenize(&bytes),
            Err(err) => {
                warn!("cannot read word file {}: {}, generating random words", source, err);
            }
        }
    }
    synthesize(rng)
}

/// Parses an inline `{w1,w2,...}` list.
fn parse_inline(source: &str) -> WordList {
    let body = &source[1..];
    let body = match body.strip_suffix('}') {
        Some(inner) => inner,
        None => {
            warn!("illegal word list syntax: source={}", source);
            body
        }
    };
    if body.is_empty() {
        return Vec::new();
    }
    body.split(',').map(|w| w.as_bytes().to_vec()).collect()
}

/// Tokenizes raw word-file bytes into a list.
fn tokenize(bytes: &[u8]) -> WordList {
    let mut list = Vec::with_capacity(bytes.len() / WORD_SIZE as usize);
    let mut lexer = WordToken::lexer(bytes);
    while let Some(result) = lexer.next() {
        match result {
            Ok(WordToken::Word) => list.push(lexer.slice().to_vec()),
            Ok(WordToken::DoubleQuoted) | Ok(WordToken::SingleQuoted) => {
                let slice = lexer.slice();
                list.push(slice[1..slice.len() - 1].to_vec());
            }
            _ => {}
        }
    }
    list
}

/// Synthesizes `LIST_SIZE` random lowercase words with lengths in
/// `1..=2*WORD_SIZE-1` (average `WORD_SIZE`).
fn synthesize(rng: &mut StdRng) -> WordList {
    let mut list = Vec::with_capacity(LIST_SIZE);
    for _ in 0..LIST_SIZE {
        let len = 1 + rng.gen_range(0..WORD_SIZE) + rng.gen_range(0..WORD_SIZE);
        let word: Vec<u8> = (0..len)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
            .collect();
        list.push(word);
    }
    list
}
