//! 内容指纹
//!
//! 原文记录和缓存标识都使用 blake3 十六进制摘要

/// 计算一组片段的内容指纹
///
/// 每个片段带长度前缀写入摘要，`(1, "0a")` 与 `(10, "a")` 不会相同。
pub fn uid<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        let bytes = part.as_ref().as_bytes();
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    hasher.finalize().to_hex().to_string()
}

/// 生成外部缓存使用的文档标识
///
/// 同一文档在不同引擎、目标语言或合并长度下拥有不同的缓存。
pub fn cache_id(input_path: &str, engine_name: &str, target_lang: &str, merge_length: usize) -> String {
    uid([
        input_path,
        engine_name,
        target_lang,
        merge_length.to_string().as_str(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_is_stable() {
        assert_eq!(uid(["0", "Hello"]), uid(["0", "Hello"]));
        assert_eq!(uid(["0", "Hello"]).len(), 64);
    }

    #[test]
    fn test_uid_differs_by_index() {
        assert_ne!(uid(["0", "Hello"]), uid(["1", "Hello"]));
        assert_ne!(uid(["0", "Hello"]), uid(["0", "Hello!"]));
        assert_ne!(uid(["1", "0Hello"]), uid(["10", "Hello"]));
    }

    #[test]
    fn test_cache_id_depends_on_merge_length() {
        let plain = cache_id("/books/a.epub", "Google", "zh", 0);
        let merged = cache_id("/books/a.epub", "Google", "zh", 1800);
        assert_ne!(plain, merged);
    }
}
