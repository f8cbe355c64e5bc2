//! 文本相似度：词集合 Jaccard + 字符序列匹配率

use std::collections::HashSet;

/// 小写 + 合并空白
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn word_set(text: &str) -> HashSet<String> {
    normalize_text(text)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// 与词序无关的 Jaccard 相似度
pub fn word_set_similarity(a: &str, b: &str) -> f32 {
    let words_a = word_set(a);
    let words_b = word_set(b);
    if words_a.is_empty() && words_b.is_empty() {
        return 1.0;
    }
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }
    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f32 / union as f32
}

/// Ratcliff/Obershelp 匹配率：2 * 匹配字符数 / 总字符数
pub fn sequence_similarity(a: &str, b: &str) -> f32 {
    let a: Vec<char> = normalize_text(a).chars().collect();
    let b: Vec<char> = normalize_text(b).chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f32 / total as f32
}

/// 取两者较大值
pub fn text_similarity(a: &str, b: &str) -> f32 {
    word_set_similarity(a, b).max(sequence_similarity(a, b))
}

/// 递归找最长公共子串，累加左右两侧的匹配数
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    total
}

/// 返回 (a 起点, b 起点, 长度)；等长时取 a 中最早的
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut best = (alo, blo, 0);
    let mut prev = vec![0usize; width + 1];
    let mut cur = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo;
            cur[col + 1] = if a[i] == b[j] { prev[col] + 1 } else { 0 };
            let k = cur[col + 1];
            if k > best.2 {
                best = (i + 1 - k, j + 1 - k, k);
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Call  THE\nPlumber "), "call the plumber");
    }

    #[test]
    fn test_word_set_similarity() {
        assert!(approx(word_set_similarity("buy milk", "Milk buy"), 1.0));
        assert!(approx(word_set_similarity("buy milk", "buy bread"), 1.0 / 3.0));
        assert!(approx(word_set_similarity("", ""), 1.0));
        assert!(approx(word_set_similarity("a", ""), 0.0));
    }

    #[test]
    fn test_sequence_similarity_matches_difflib() {
        // difflib.SequenceMatcher(None, "abcd", "bcde").ratio() == 0.75
        assert!(approx(sequence_similarity("abcd", "bcde"), 0.75));
        // "dentist appoint" vs "dentist appointment": 2*15/34
        assert!(approx(
            sequence_similarity("Dentist appoint", "Dentist appointment"),
            30.0 / 34.0
        ));
        assert!(approx(sequence_similarity("", ""), 1.0));
        assert!(approx(sequence_similarity("abc", "xyz"), 0.0));
    }

    #[test]
    fn test_text_similarity_takes_max() {
        let a = "water the plants";
        let b = "plants the water";
        assert!(approx(text_similarity(a, b), 1.0));
        assert!(text_similarity("Dentist appoint", "Dentist appointment") >= 0.85);
    }
}
