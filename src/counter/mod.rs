//! 出現回数の集計モジュール
//!
//! - tags: 整理済みツリーの注釈タグ（`[UCE]` など）をファイルごとに数える
//! - strings: 接頭辞で選んだファイル群の任意文字列の出現頻度

pub mod strings;
pub mod tags;

pub use strings::{count_strings, CountStringsOptions};
pub use tags::{count_tags, validate_tags, CountTagsOptions, TagRecord};

/// 重ならない出現回数（大文字小文字を区別）
///
/// 空文字列は0回とする。
pub fn count_occurrences(text: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    text.matches(needle).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_occurrences_non_overlapping() {
        assert_eq!(count_occurrences("aaaa", "aa"), 2);
        assert_eq!(count_occurrences("[UCE] x [UCE] [uce]", "[UCE]"), 2);
        assert_eq!(count_occurrences("abc", ""), 0);
    }
}
