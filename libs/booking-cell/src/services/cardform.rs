//! Stateful input formatters for the add-card form. Each edit takes the
//! previous field text and the raw input, and returns the canonical text
//! with the cursor pinned to the end.

const PAN_DIGITS: usize = 16;
const EXPIRY_DIGITS: usize = 6;
const CVV_DIGITS: usize = 3;

/// Canonical field text after an edit, cursor always at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedInput {
    pub text: String,
    pub cursor: usize,
}

impl FormattedInput {
    fn of(text: String) -> Self {
        let cursor = text.chars().count();
        Self { text, cursor }
    }
}

fn digits_of(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Card number edits: strip non-digits, group in fours. An edit that would
/// exceed 16 digits is rejected and the field keeps its previous text.
pub fn reformat_card_number(previous: &str, input: &str) -> FormattedInput {
    let digits = digits_of(input);
    if digits.len() > PAN_DIGITS {
        return FormattedInput::of(previous.to_string());
    }

    let mut formatted = String::with_capacity(PAN_DIGITS + 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && index % 4 == 0 {
            formatted.push(' ');
        }
        formatted.push(digit);
    }
    FormattedInput::of(formatted)
}

/// Expiry edits, MM/DD/YY. The month is clamped to 12 and the day to 31 as
/// soon as enough digits exist to judge them; the slash after a complete
/// month or day is inserted automatically, and a first digit greater than 1
/// is read as a single-digit month and zero-padded. More than six digits
/// rejects the edit.
pub fn reformat_expiry(previous: &str, input: &str) -> FormattedInput {
    let digits = digits_of(input);
    if digits.len() > EXPIRY_DIGITS {
        return FormattedInput::of(previous.to_string());
    }

    let formatted = match digits.len() {
        0 => String::new(),
        1 => {
            if digits.parse::<u32>().unwrap_or(0) > 1 {
                format!("0{}/", digits)
            } else {
                digits
            }
        }
        2 => {
            let month = digits.parse::<u32>().unwrap_or(0);
            if month > 12 {
                "12/".to_string()
            } else {
                format!("{}/", digits)
            }
        }
        3 => {
            let month = clamp_month(&digits[0..2]);
            format!("{}/{}", month, &digits[2..])
        }
        4 => {
            let month = clamp_month(&digits[0..2]);
            let day = clamp_day(&digits[2..4]);
            format!("{}/{}/", month, day)
        }
        _ => {
            let month = clamp_month(&digits[0..2]);
            let day = clamp_day(&digits[2..4]);
            format!("{}/{}/{}", month, day, &digits[4..])
        }
    };
    FormattedInput::of(formatted)
}

fn clamp_month(two_digits: &str) -> String {
    if two_digits.parse::<u32>().unwrap_or(0) > 12 {
        "12".to_string()
    } else {
        two_digits.to_string()
    }
}

fn clamp_day(two_digits: &str) -> String {
    if two_digits.parse::<u32>().unwrap_or(0) > 31 {
        "31".to_string()
    } else {
        two_digits.to_string()
    }
}

/// CVV edits accept only digit strings up to three characters.
pub fn reformat_cvv(previous: &str, input: &str) -> String {
    if input.len() <= CVV_DIGITS && input.chars().all(|c| c.is_ascii_digit()) {
        input.to_string()
    } else {
        previous.to_string()
    }
}

/// PAN for the card preview: grouped digits padded with bullets out to the
/// full 19-character mask.
pub fn mask_card_number(input: &str) -> String {
    let grouped = reformat_card_number("", input).text;
    let mut masked = grouped;
    while masked.chars().count() < 19 {
        masked.push('•');
    }
    masked
}

/// Last four digits for saved-card rows; short inputs fall back to "0000".
pub fn last_four(input: &str) -> String {
    let digits = digits_of(input);
    if digits.len() >= 4 {
        digits[digits.len() - 4..].to_string()
    } else {
        "0000".to_string()
    }
}

/// The add-card form with its validity gate.
#[derive(Debug, Clone, Default)]
pub struct CardForm {
    pub holder_name: String,
    pub number: String,
    pub expiry: String,
    pub cvv: String,
}

impl CardForm {
    /// Valid iff the holder name has at least 3 characters, the PAN is
    /// exactly 16 digits, the expiry is fully formed (MM/DD/YY, 8 chars)
    /// and the CVV is 3 digits.
    pub fn is_valid(&self) -> bool {
        let pan = digits_of(&self.number);
        self.holder_name.chars().count() >= 3
            && pan.len() == PAN_DIGITS
            && self.number.chars().all(|c| c.is_ascii_digit() || c == ' ')
            && self.expiry.chars().count() == 8
            && self.cvv.len() == CVV_DIGITS
            && self.cvv.chars().all(|c| c.is_ascii_digit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_number_groups_in_fours() {
        let formatted = reformat_card_number("", "4111111111111111");
        assert_eq!(formatted.text, "4111 1111 1111 1111");
        assert_eq!(formatted.cursor, 19);
    }

    #[test]
    fn card_number_strips_non_digits() {
        let formatted = reformat_card_number("", "4111-1111 2222x3333");
        assert_eq!(formatted.text, "4111 1111 2222 3333");
    }

    #[test]
    fn card_number_edit_beyond_sixteen_digits_is_rejected() {
        let formatted = reformat_card_number("4111 1111 1111 1111", "41111111111111112");
        assert_eq!(formatted.text, "4111 1111 1111 1111");
        assert_eq!(formatted.cursor, 19);
    }

    #[test]
    fn expiry_single_high_digit_becomes_padded_month() {
        assert_eq!(reformat_expiry("", "2").text, "02/");
        assert_eq!(reformat_expiry("", "9").text, "09/");
        // 0 and 1 could still begin a two-digit month.
        assert_eq!(reformat_expiry("", "1").text, "1");
        assert_eq!(reformat_expiry("", "0").text, "0");
    }

    #[test]
    fn expiry_month_clamps_to_twelve() {
        assert_eq!(reformat_expiry("", "13").text, "12/");
        assert_eq!(reformat_expiry("", "12").text, "12/");
        assert_eq!(reformat_expiry("", "09").text, "09/");
    }

    #[test]
    fn expiry_day_clamps_to_thirty_one() {
        assert_eq!(reformat_expiry("", "1231").text, "12/31/");
        assert_eq!(reformat_expiry("", "1235").text, "12/31/");
        assert_eq!(reformat_expiry("", "0107").text, "01/07/");
    }

    #[test]
    fn expiry_three_digits_keeps_partial_day() {
        assert_eq!(reformat_expiry("", "123").text, "12/3");
        assert_eq!(reformat_expiry("", "133").text, "12/3");
    }

    #[test]
    fn expiry_full_six_digits() {
        assert_eq!(reformat_expiry("", "123456").text, "12/34/56");
        let formatted = reformat_expiry("", "090726");
        assert_eq!(formatted.text, "09/07/26");
        assert_eq!(formatted.cursor, 8);
    }

    #[test]
    fn expiry_edit_beyond_six_digits_is_rejected() {
        assert_eq!(reformat_expiry("12/34/56", "1234567").text, "12/34/56");
    }

    #[test]
    fn cvv_accepts_up_to_three_digits() {
        assert_eq!(reformat_cvv("", "6"), "6");
        assert_eq!(reformat_cvv("69", "699"), "699");
        assert_eq!(reformat_cvv("699", "6999"), "699");
        assert_eq!(reformat_cvv("69", "6a"), "69");
    }

    #[test]
    fn mask_pads_with_bullets() {
        assert_eq!(mask_card_number(""), "•••••••••••••••••••");
        assert_eq!(mask_card_number("41111111"), "4111 1111••••••••••");
        assert_eq!(mask_card_number("4111111111111111"), "4111 1111 1111 1111");
    }

    #[test]
    fn last_four_falls_back_when_short() {
        assert_eq!(last_four("4111 1111 1111 1111"), "1111");
        assert_eq!(last_four("123"), "0000");
    }

    #[test]
    fn card_form_holder_name_boundary() {
        let mut form = CardForm {
            holder_name: "An".to_string(),
            number: "4111 1111 1111 1111".to_string(),
            expiry: "09/07/26".to_string(),
            cvv: "699".to_string(),
        };
        assert!(!form.is_valid());

        form.holder_name = "And".to_string();
        assert!(form.is_valid());
    }

    #[test]
    fn card_form_requires_full_pan_and_expiry() {
        let form = CardForm {
            holder_name: "Andrew Ainsley".to_string(),
            number: "4111 1111 1111".to_string(),
            expiry: "09/07/26".to_string(),
            cvv: "699".to_string(),
        };
        assert!(!form.is_valid());

        let form = CardForm {
            holder_name: "Andrew Ainsley".to_string(),
            number: "4111 1111 1111 1111".to_string(),
            expiry: "09/07".to_string(),
            cvv: "699".to_string(),
        };
        assert!(!form.is_valid());
    }
}
