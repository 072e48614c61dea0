//! Price and message validation for incoming superchat commands.

use unicode_segmentation::UnicodeSegmentation;

use crate::tier::max_message_len;

pub const MIN_PRICE: u32 = 100;
pub const MAX_PRICE: u32 = 50000;

/// Check a price/message pair against the tier rules.
///
/// Returns `None` when the pair is acceptable, or a user-facing rejection
/// message (sent back as an ephemeral reply) when it is not. Message length
/// is counted in grapheme clusters, the way a user perceives characters.
pub fn validate(price: u32, message: Option<&str>) -> Option<String> {
    if !(MIN_PRICE..=MAX_PRICE).contains(&price) {
        return Some("金額は100〜50,000の間で指定してください".to_string());
    }

    if let Some(message) = message {
        let limit = max_message_len(price);
        let length = message.graphemes(true).count();
        if length > limit {
            if limit == 0 {
                return Some(
                    "200円未満のスーパーチャットにはコメントを付けられません".to_string(),
                );
            }
            return Some(format!("コメントは{limit}文字以内で入力してください"));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_below_minimum_is_rejected() {
        let rejection = validate(99, None).unwrap();
        assert!(rejection.contains("100"));
        assert!(rejection.contains("50,000"));
    }

    #[test]
    fn price_above_maximum_is_rejected() {
        let rejection = validate(50001, None).unwrap();
        assert!(rejection.contains("100"));
        assert!(rejection.contains("50,000"));
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(validate(100, None).is_none());
        assert!(validate(50000, None).is_none());
    }

    #[test]
    fn message_below_two_hundred_yen_is_rejected() {
        let rejection = validate(150, Some("hi")).unwrap();
        assert!(rejection.contains("200円未満"));
    }

    #[test]
    fn message_at_the_limit_is_accepted() {
        let message = "あ".repeat(200);
        assert!(validate(1000, Some(&message)).is_none());
    }

    #[test]
    fn message_over_the_limit_is_rejected() {
        let message = "あ".repeat(201);
        let rejection = validate(1000, Some(&message)).unwrap();
        assert!(rejection.contains("200文字"));
    }

    #[test]
    fn length_counts_graphemes_not_code_units() {
        // 50 family emoji: 7 code points each, but one perceived character.
        let message = "👨\u{200d}👩\u{200d}👧\u{200d}👦".repeat(50);
        assert!(validate(200, Some(&message)).is_none());

        let message = "👨\u{200d}👩\u{200d}👧\u{200d}👦".repeat(51);
        assert!(validate(200, Some(&message)).is_some());
    }

    #[test]
    fn absent_message_skips_the_length_rule() {
        assert!(validate(150, None).is_none());
    }

    #[test]
    fn empty_message_is_allowed_even_when_limit_is_zero() {
        assert!(validate(150, Some("")).is_none());
    }
}
