//! WordPiece tokenization over a local vocabulary file
//!
//! Minimal BERT-style tokenizer: basic whitespace/punctuation splitting
//! followed by greedy longest-match subword lookup. Only what the bundled
//! classifier needs; vocabularies come from the model directory.

use crate::error::{AppError, Result};
use std::collections::HashMap;
use std::path::Path;

const CLS_TOKEN: &str = "[CLS]";
const SEP_TOKEN: &str = "[SEP]";
const UNK_TOKEN: &str = "[UNK]";

/// Longest word (in chars) attempted before falling back to [UNK]
const MAX_WORD_CHARS: usize = 100;

/// Maximum encoded sequence length, special tokens included
const MAX_SEQ_LEN: usize = 512;

#[derive(Debug)]
pub struct WordPieceTokenizer {
    vocab: HashMap<String, i64>,
    lowercase: bool,
    cls_id: i64,
    sep_id: i64,
    unk_id: i64,
}

impl WordPieceTokenizer {
    /// Load `vocab.txt` (one token per line, line number = id) and the
    /// optional `tokenizer_config.json` casing flag.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let vocab_path = model_dir.join("vocab.txt");
        let content = std::fs::read_to_string(&vocab_path).map_err(|e| {
            AppError::ClassifierLoad(format!("cannot read {:?}: {}", vocab_path, e))
        })?;

        let tokens: Vec<String> = content.lines().map(|l| l.trim_end().to_string()).collect();

        let lowercase = read_lowercase_flag(model_dir);

        Self::from_vocab(tokens, lowercase)
    }

    pub fn from_vocab(tokens: Vec<String>, lowercase: bool) -> Result<Self> {
        let mut vocab = HashMap::with_capacity(tokens.len());
        for (id, token) in tokens.into_iter().enumerate() {
            vocab.insert(token, id as i64);
        }

        let special = |name: &str| -> Result<i64> {
            vocab.get(name).copied().ok_or_else(|| {
                AppError::ClassifierLoad(format!("vocabulary is missing the {} token", name))
            })
        };

        let cls_id = special(CLS_TOKEN)?;
        let sep_id = special(SEP_TOKEN)?;
        let unk_id = special(UNK_TOKEN)?;

        Ok(Self {
            vocab,
            lowercase,
            cls_id,
            sep_id,
            unk_id,
        })
    }

    /// Encode text as `[CLS] pieces... [SEP]`, truncated to the model's
    /// maximum length. Returns (input ids, attention mask).
    pub fn encode(&self, text: &str) -> (Vec<i64>, Vec<i64>) {
        let mut ids = Vec::with_capacity(64);
        ids.push(self.cls_id);

        'words: for word in self.basic_tokenize(text) {
            for id in self.wordpiece(&word) {
                if ids.len() == MAX_SEQ_LEN - 1 {
                    break 'words;
                }
                ids.push(id);
            }
        }

        ids.push(self.sep_id);

        let mask = vec![1i64; ids.len()];
        (ids, mask)
    }

    /// Split on whitespace, then peel punctuation off into its own tokens
    fn basic_tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let mut words = Vec::new();
        for chunk in text.split_whitespace() {
            let mut current = String::new();
            for ch in chunk.chars() {
                if ch.is_ascii_punctuation() {
                    if !current.is_empty() {
                        words.push(std::mem::take(&mut current));
                    }
                    words.push(ch.to_string());
                } else {
                    current.push(ch);
                }
            }
            if !current.is_empty() {
                words.push(current);
            }
        }
        words
    }

    /// Greedy longest-match subword split; unknown words collapse to [UNK]
    fn wordpiece(&self, word: &str) -> Vec<i64> {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() > MAX_WORD_CHARS {
            return vec![self.unk_id];
        }

        let mut pieces = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let mut end = chars.len();
            let mut matched = None;

            while start < end {
                let mut candidate: String = chars[start..end].iter().collect();
                if start > 0 {
                    candidate = format!("##{}", candidate);
                }
                if let Some(&id) = self.vocab.get(&candidate) {
                    matched = Some(id);
                    break;
                }
                end -= 1;
            }

            match matched {
                Some(id) => {
                    pieces.push(id);
                    start = end;
                }
                None => return vec![self.unk_id],
            }
        }

        pieces
    }
}

fn read_lowercase_flag(model_dir: &Path) -> bool {
    let path = model_dir.join("tokenizer_config.json");
    let Ok(content) = std::fs::read_to_string(path) else {
        return false;
    };
    serde_json::from_str::<serde_json::Value>(&content)
        .ok()
        .and_then(|v| v.get("do_lower_case").and_then(|f| f.as_bool()))
        .unwrap_or(false)
}
