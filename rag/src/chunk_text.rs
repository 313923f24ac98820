use std::collections::VecDeque;

use crate::config::Config;

const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits text into overlapping chunks of at most `chunk_size` characters,
/// preferring paragraph, then line, then word boundaries.
pub fn chunk_text(text: &str, cfg: &Config) -> Vec<String> {
    let size = cfg.chunk_size;
    let mut overlap = cfg.chunk_overlap;

    if size == 0 {
        let trimmed = text.trim();
        return if trimmed.is_empty() { vec![] } else { vec![trimmed.to_string()] };
    }
    if overlap >= size {
        overlap = size / 4;
    }

    split_recursive(text, &SEPARATORS, size, overlap)
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_recursive(text: &str, separators: &[&str], size: usize, overlap: usize) -> Vec<String> {
    let idx = separators
        .iter()
        .position(|s| s.is_empty() || text.contains(s))
        .unwrap_or(separators.len() - 1);
    let sep = separators[idx];
    let rest = &separators[idx + 1..];

    let pieces: Vec<String> = if sep.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        text.split(sep).map(str::to_string).collect()
    };

    let mut out = Vec::new();
    let mut fitting: Vec<String> = Vec::new();
    for piece in pieces {
        if char_len(&piece) < size {
            fitting.push(piece);
            continue;
        }
        if !fitting.is_empty() {
            out.extend(merge_pieces(&fitting, sep, size, overlap));
            fitting.clear();
        }
        if rest.is_empty() {
            out.push(piece);
        } else {
            out.extend(split_recursive(&piece, rest, size, overlap));
        }
    }
    if !fitting.is_empty() {
        out.extend(merge_pieces(&fitting, sep, size, overlap));
    }
    out
}

fn merge_pieces(pieces: &[String], sep: &str, size: usize, overlap: usize) -> Vec<String> {
    let sep_len = char_len(sep);
    let mut chunks = Vec::new();
    let mut current: VecDeque<&str> = VecDeque::new();
    let mut total = 0usize;

    for piece in pieces {
        let len = char_len(piece);
        let joiner = if current.is_empty() { 0 } else { sep_len };
        if total + len + joiner > size && !current.is_empty() {
            push_joined(&mut chunks, &current, sep);
            // Keep a tail of the previous chunk, at most `overlap` long.
            while total > overlap
                || (total > 0 && total + len + if current.is_empty() { 0 } else { sep_len } > size)
            {
                let Some(first) = current.front() else { break };
                let removed = char_len(first) + if current.len() > 1 { sep_len } else { 0 };
                current.pop_front();
                total = total.saturating_sub(removed);
            }
        }
        current.push_back(piece);
        total += len + if current.len() > 1 { sep_len } else { 0 };
    }
    push_joined(&mut chunks, &current, sep);
    chunks
}

fn push_joined(chunks: &mut Vec<String>, current: &VecDeque<&str>, sep: &str) {
    let joined = current.iter().copied().collect::<Vec<_>>().join(sep);
    if !joined.trim().is_empty() {
        chunks.push(joined);
    }
}
