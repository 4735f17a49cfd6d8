//! 화면 표시용 수치 포맷팅.

use crate::types::Market;

/// 정수부에 천 단위 구분자를 넣습니다.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn format_grouped(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (formatted, None),
    };

    let mut out = String::new();
    if value < 0.0 && formatted_is_nonzero(&int_part, frac_part.as_deref()) {
        out.push('-');
    }
    out.push_str(&group_thousands(&int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(&frac);
    }
    out
}

fn formatted_is_nonzero(int_part: &str, frac_part: Option<&str>) -> bool {
    int_part.chars().chain(frac_part.unwrap_or("").chars()).any(|c| c != '0')
}

/// 소수점 이하 최대 3자리를 표시하고 뒤쪽 0은 지웁니다 (`71,500.5`).
fn format_krw(value: f64) -> String {
    let grouped = format_grouped(value, 3);
    grouped
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// 시장 통화로 가격을 표시합니다.
///
/// 원화는 소수점 이하 최대 3자리, 달러는 소수점 2자리입니다.
pub fn format_price(price: f64, market: Market) -> String {
    match market.currency() {
        "KRW" => format!("₩{}", format_krw(price)),
        _ => format!("${}", format_grouped(price, 2)),
    }
}

/// 변동률을 부호와 함께 표시합니다 (`+2.15%`, `-1.20%`).
pub fn format_change(change: f64) -> String {
    let sign = if change > 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, change)
}

/// 거래량/시가총액을 약식으로 표시합니다 (`1.50B`, `2.30M`, `4.00K`).
pub fn format_volume(volume: f64) -> String {
    if volume >= 1_000_000_000.0 {
        format!("{:.2}B", volume / 1_000_000_000.0)
    } else if volume >= 1_000_000.0 {
        format!("{:.2}M", volume / 1_000_000.0)
    } else if volume >= 1_000.0 {
        format!("{:.2}K", volume / 1_000.0)
    } else {
        volume.to_string()
    }
}
