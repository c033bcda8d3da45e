// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 版本字符串中的一段：连续的数字或连续的非数字
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fragment<'a> {
    Numeric(&'a str),
    Text(&'a str),
}

impl<'a> Fragment<'a> {
    fn as_str(&self) -> &'a str {
        match self {
            Fragment::Numeric(s) | Fragment::Text(s) => s,
        }
    }
}

/// 把版本字符串拆分为交替的数字段与非数字段
fn split_fragments(version: &str) -> Vec<Fragment<'_>> {
    let mut fragments = Vec::new();
    let mut start = 0;
    let mut numeric = None;

    for (i, c) in version.char_indices() {
        let is_digit = c.is_ascii_digit();
        match numeric {
            Some(prev) if prev != is_digit => {
                fragments.push(make_fragment(&version[start..i], prev));
                start = i;
            }
            _ => {}
        }
        numeric = Some(is_digit);
    }

    if let Some(prev) = numeric {
        fragments.push(make_fragment(&version[start..], prev));
    }

    fragments
}

fn make_fragment(s: &str, numeric: bool) -> Fragment<'_> {
    if numeric {
        Fragment::Numeric(s)
    } else {
        Fragment::Text(s)
    }
}

/// 十进制数字串加上一个小整数，结果不保留前导零
fn add_decimal(digits: &str, amount: u8) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(digits.len() + 1);
    let mut carry = amount as u32;

    for b in digits.bytes().rev() {
        let sum = (b - b'0') as u32 + carry;
        out.push(b'0' + (sum % 10) as u8);
        carry = sum / 10;
    }
    while carry > 0 {
        out.push(b'0' + (carry % 10) as u8);
        carry /= 10;
    }

    while out.len() > 1 && out.last() == Some(&b'0') {
        out.pop();
    }
    out.reverse();

    String::from_utf8(out).unwrap_or_default()
}

/// 根据当前版本猜测可能的下一个版本
///
/// 每个数字段各产生一个候选：该段之前的内容原样保留，该段加一
/// （序号等于 `special_index` 的数字段加二，用于奇偶版本号约定），
/// 之后的内容原样保留。候选按数字段出现的顺序返回。
///
/// # 参数
///
/// * `version` - 当前版本字符串
/// * `special_index` - 需要加二的数字段序号（只计数字段）
///
/// # 示例
///
/// `guess_versions("1.2.3", None)` 返回 `["2.2.3", "1.3.3", "1.2.4"]`
pub fn guess_versions(version: &str, special_index: Option<usize>) -> Vec<String> {
    let fragments = split_fragments(version);
    let mut guesses = Vec::new();
    let mut numeric_index = 0;

    for (i, fragment) in fragments.iter().enumerate() {
        let Fragment::Numeric(digits) = fragment else {
            continue;
        };

        let amount = if special_index == Some(numeric_index) { 2 } else { 1 };

        let mut guess = String::with_capacity(version.len() + 1);
        for before in &fragments[..i] {
            guess.push_str(before.as_str());
        }
        guess.push_str(&add_decimal(digits, amount));
        for after in &fragments[i + 1..] {
            guess.push_str(after.as_str());
        }

        guesses.push(guess);
        numeric_index += 1;
    }

    guesses
}

#[cfg(test)]
#[path = "version_guesser_test.rs"]
mod tests;
