// ==========================================
// GEEstor 维护计划 - 文本匹配规范化
// ==========================================
// 频次标签、设备名称、列名均按"忽略大小写 + 忽略重音"比较
// ==========================================

/// 规范化文本用于子串匹配：去首尾空白、转小写、去除西语重音符号
///
/// 例: "Frigorífico Quirófano" → "frigorifico quirofano"
pub fn fold_for_match(value: &str) -> String {
    value
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(strip_accent)
        .collect()
}

/// 判断已规范化的文本是否包含任一关键字（关键字同样会被规范化）
pub fn contains_any(folded: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .map(|k| fold_for_match(k))
        .any(|k| !k.is_empty() && folded.contains(&k))
}

/// 判断已规范化的文本是否含有以 `prefix` 开头的单词（按非字母数字分词）
///
/// 例: "anual" 命中 "Anuales"、"anualmente"，不命中 "bianual"
pub fn contains_word_prefix(folded: &str, prefix: &str) -> bool {
    let prefix = fold_for_match(prefix);
    !prefix.is_empty()
        && folded
            .split(|c: char| !c.is_alphanumeric())
            .any(|token| token.starts_with(&prefix))
}

fn strip_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}
