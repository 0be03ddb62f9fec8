//! Thinking/answer extraction for replies that use
//! `<thinking>…</thinking>` and `<answer>…</answer>` delimiters.

use std::ops::Range;

const THINKING_OPEN: &str = "<thinking>";
const THINKING_CLOSE: &str = "</thinking>";
const ANSWER_OPEN: &str = "<answer>";
const ANSWER_CLOSE: &str = "</answer>";

/// User-facing answer plus optional reasoning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub answer: String,
    pub thinking: Option<String>,
}

impl Extracted {
    fn passthrough(raw: &str) -> Self {
        Self {
            answer: raw.to_string(),
            thinking: None,
        }
    }
}

/// A delimited block: `outer` covers the tags, `inner` only the content.
struct Block {
    outer: Range<usize>,
    inner: Range<usize>,
}

/// First `open` and first `close` in `raw`.
///
/// `None` when either tag is missing or the close tag comes before the end
/// of the open tag. Each pair is resolved on its own.
fn find_block(raw: &str, open: &str, close: &str) -> Option<Block> {
    let start = raw.find(open)?;
    let close_start = raw.find(close)?;
    let inner_start = start + open.len();
    if close_start < inner_start {
        return None;
    }
    Some(Block {
        outer: start..close_start + close.len(),
        inner: inner_start..close_start,
    })
}

/// Split raw model output into answer and thinking.
///
/// Malformed delimiters never fail the turn: a pair that is missing or out
/// of order is treated as absent, and with no usable pair the raw text comes
/// back unchanged.
pub fn extract(raw: &str) -> Extracted {
    let thinking_block = find_block(raw, THINKING_OPEN, THINKING_CLOSE);
    let answer_block = find_block(raw, ANSWER_OPEN, ANSWER_CLOSE);

    let thinking = thinking_block
        .as_ref()
        .map(|b| raw[b.inner.clone()].trim().to_string());

    let answer = match (&answer_block, &thinking_block) {
        (Some(answer), _) => raw[answer.inner.clone()].trim().to_string(),
        (None, Some(thinking)) => {
            let mut remainder = String::with_capacity(raw.len());
            remainder.push_str(&raw[..thinking.outer.start]);
            remainder.push_str(&raw[thinking.outer.end..]);
            remainder.trim().to_string()
        }
        (None, None) => return Extracted::passthrough(raw),
    };

    Extracted { answer, thinking }
}
