/// Input parsing utility functions / 输入解析工具函数

/// Parse the leading integer of a form value / 解析表单值开头的整数
/// 1. Leading whitespace is skipped / 跳过开头空白
/// 2. An optional sign is accepted / 允许正负号
/// 3. Anything after the digits is ignored ("12abc" -> 12) / 忽略数字后的内容
///
/// Returns None when no digit follows. Values beyond i64 saturate.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits_len == 0 {
        return None;
    }

    let digits = &rest[..digits_len];
    let value = match digits.parse::<i64>() {
        Ok(v) => v,
        Err(_) => i64::MAX,
    };
    Some(if negative { value.saturating_neg() } else { value })
}

/// Parse a keyword that is an integer and nothing else / 判断关键词是否为纯整数
pub fn parse_identifier(keyword: &str) -> Option<i64> {
    keyword.trim().parse::<i64>().ok()
}

/// Escape LIKE wildcards, pair with `ESCAPE '\'` / 转义 LIKE 通配符
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Minimal HTML escaping for text and attribute values / HTML 转义
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
