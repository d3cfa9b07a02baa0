//! Digit-by-digit entry for the email verification code.

/// Number of digits in a one-time code
pub const OTP_LENGTH: usize = 6;

/// Six single-digit boxes with a focus cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpInput {
    digits: [Option<char>; OTP_LENGTH],
    focus: usize,
}

impl OtpInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn digit(&self, index: usize) -> Option<char> {
        self.digits.get(index).copied().flatten()
    }

    /// Enter a character into the focused box. Non-digits are rejected.
    ///
    /// Focus advances to the next box after a digit, staying on the last.
    pub fn input(&mut self, c: char) -> bool {
        if !c.is_ascii_digit() {
            return false;
        }
        self.digits[self.focus] = Some(c);
        if self.focus + 1 < OTP_LENGTH {
            self.focus += 1;
        }
        true
    }

    /// Clear the focused box; on an empty box, move back one instead.
    pub fn backspace(&mut self) {
        if self.digits[self.focus].is_some() {
            self.digits[self.focus] = None;
        } else if self.focus > 0 {
            self.focus -= 1;
        }
    }

    pub fn left(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    pub fn right(&mut self) {
        if self.focus + 1 < OTP_LENGTH {
            self.focus += 1;
        }
    }

    /// Fill boxes from pasted text, ignoring anything that is not a digit.
    pub fn paste(&mut self, text: &str) {
        for c in text.chars().filter(char::is_ascii_digit) {
            let was_last = self.focus + 1 == OTP_LENGTH && self.digits[self.focus].is_some();
            if was_last {
                break;
            }
            self.input(c);
        }
    }

    pub fn is_complete(&self) -> bool {
        self.digits.iter().all(Option::is_some)
    }

    /// The full code, once every box holds a digit.
    pub fn code(&self) -> Option<String> {
        if self.is_complete() {
            Some(self.digits.iter().flatten().collect())
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_advance_focus() {
        let mut otp = OtpInput::new();
        assert!(otp.input('4'));
        assert_eq!(otp.focus(), 1);
        assert_eq!(otp.digit(0), Some('4'));
    }

    #[test]
    fn test_non_digits_rejected() {
        let mut otp = OtpInput::new();
        assert!(!otp.input('a'));
        assert!(!otp.input(' '));
        assert!(!otp.input('٣'));
        assert_eq!(otp.focus(), 0);
        assert_eq!(otp.digit(0), None);
    }

    #[test]
    fn test_code_requires_all_six() {
        let mut otp = OtpInput::new();
        for c in "12345".chars() {
            otp.input(c);
        }
        assert!(otp.code().is_none());
        otp.input('6');
        assert_eq!(otp.code().as_deref(), Some("123456"));
        // Focus stays on the last box
        assert_eq!(otp.focus(), 5);
    }

    #[test]
    fn test_backspace_on_empty_moves_back() {
        let mut otp = OtpInput::new();
        otp.input('1');
        otp.input('2');
        // Focus is on box 2, which is empty
        otp.backspace();
        assert_eq!(otp.focus(), 1);
        assert_eq!(otp.digit(1), Some('2'));
        // Box 1 holds a digit: cleared in place
        otp.backspace();
        assert_eq!(otp.focus(), 1);
        assert_eq!(otp.digit(1), None);
        otp.backspace();
        assert_eq!(otp.focus(), 0);
        otp.backspace();
        otp.backspace();
        assert_eq!(otp.focus(), 0);
        assert_eq!(otp.digit(0), None);
    }

    #[test]
    fn test_arrows_clamp() {
        let mut otp = OtpInput::new();
        otp.left();
        assert_eq!(otp.focus(), 0);
        for _ in 0..10 {
            otp.right();
        }
        assert_eq!(otp.focus(), 5);
    }

    #[test]
    fn test_paste_fills_boxes() {
        let mut otp = OtpInput::new();
        otp.paste("98-76 54 extra 3");
        assert_eq!(otp.code().as_deref(), Some("987654"));
        otp.clear();
        assert_eq!(otp, OtpInput::new());
    }
}
