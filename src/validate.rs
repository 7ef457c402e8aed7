//! Entry form validation.
//!
//! Each field starts `Untouched` and becomes `Touched` the first time focus
//! leaves it or the form is submitted. Rules run on every input change, but a
//! field only shows its message once touched (or when display is forced).

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    EmptyName,

    #[error("Enter a real date as YYYY-MM-DD or D/M/YYYY")]
    InvalidDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Touch {
    #[default]
    Untouched,
    Touched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    Name,
    Date,
}

/// One form field: raw value, touched state, rule result and what is displayed
#[derive(Debug, Clone, Default)]
pub struct Field {
    value: String,
    touch: Touch,
    error: Option<ValidationError>,
    /// Message currently displayed under the field
    message: Option<String>,
    /// Whether the field is currently drawn as invalid
    invalid: bool,
}

impl Field {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn touch(&self) -> Touch {
        self.touch
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    fn refresh_display(&mut self) {
        self.message = self.error.map(|e| e.to_string());
        self.invalid = self.error.is_some();
    }
}

/// Result of validating the whole form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub normalized_name: String,
    pub normalized_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    pub name: Field,
    pub date: Field,
}

impl Default for TaskForm {
    fn default() -> Self {
        let mut form = Self {
            name: Field::default(),
            date: Field::default(),
        };
        // 空表单的规则结果也要先算出来
        form.name.error = check_name(&form.name.value).err();
        form.date.error = check_date(&form.date.value).err();
        form
    }
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    fn field_mut(&mut self, id: FieldId) -> &mut Field {
        match id {
            FieldId::Name => &mut self.name,
            FieldId::Date => &mut self.date,
        }
    }

    /// Value changed: re-run the rule, update the display if already touched
    pub fn input(&mut self, id: FieldId, value: &str) {
        let field = self.field_mut(id);
        field.value = value.to_string();
        field.error = match id {
            FieldId::Name => check_name(value).err(),
            FieldId::Date => check_date(value).err(),
        };
        if field.touch == Touch::Touched {
            field.refresh_display();
        }
    }

    /// Focus left the field
    pub fn blur(&mut self, id: FieldId) {
        let field = self.field_mut(id);
        field.touch = Touch::Touched;
        field.refresh_display();
    }

    /// Validate the form, updating displayed messages of touched fields when
    /// `show_messages` is set
    pub fn validate(&mut self, show_messages: bool) -> Validation {
        self.validate_with(show_messages, false)
    }

    /// Submit attempt: every field becomes touched and shows its message
    pub fn submit(&mut self) -> Validation {
        self.name.touch = Touch::Touched;
        self.date.touch = Touch::Touched;
        self.validate_with(true, true)
    }

    fn validate_with(&mut self, show_messages: bool, force: bool) -> Validation {
        let name = check_name(&self.name.value);
        let date = check_date(&self.date.value);
        self.name.error = name.as_ref().err().copied();
        self.date.error = date.as_ref().err().copied();

        if show_messages {
            for field in [&mut self.name, &mut self.date] {
                if force || field.touch == Touch::Touched {
                    field.refresh_display();
                }
            }
        }

        Validation {
            valid: name.is_ok() && date.is_ok(),
            normalized_name: name.unwrap_or_default(),
            normalized_date: date.unwrap_or(None),
        }
    }

    /// Back to an empty, untouched form
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Trimmed name, or an error when nothing is left
pub fn check_name(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyName)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Empty means "no date"; anything else must normalize to a real date
pub fn check_date(value: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_date(trimmed).map(Some).ok_or(ValidationError::InvalidDate)
}

/// Parse `YYYY-MM-DD`, or `D/M/YYYY`, `D-M-YYYY`, `D.M.YYYY`.
///
/// The numbers must name a real calendar day: `31/02/2024` matches the
/// pattern but is rejected.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    parse_canonical(value).or_else(|| parse_day_first(value))
}

fn parse_canonical(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }

    let year = digits(&value[0..4], 4, 4)?;
    let month = digits(&value[5..7], 2, 2)?;
    let day = digits(&value[8..10], 2, 2)?;

    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn parse_day_first(value: &str) -> Option<NaiveDate> {
    ['/', '-', '.'].into_iter().find_map(|sep| {
        let parts: Vec<&str> = value.split(sep).collect();
        if parts.len() != 3 {
            return None;
        }

        let day = digits(parts[0], 1, 2)?;
        let month = digits(parts[1], 1, 2)?;
        let year = digits(parts[2], 4, 4)?;

        NaiveDate::from_ymd_opt(year as i32, month, day)
    })
}

/// ASCII digits only, with a length in `min..=max`
fn digits(part: &str, min: usize, max: usize) -> Option<u32> {
    if part.len() < min || part.len() > max || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Canonical `YYYY-MM-DD` form
pub fn canonical(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_canonical() {
        assert_eq!(parse_date("2024-03-01"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date("2024-02-29"), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_date("2023-02-29"), None);
        assert_eq!(parse_date("2024-3-1"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn test_parse_day_first_separators() {
        assert_eq!(parse_date("1/3/2024"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date("01-03-2024"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date("1.03.2024"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date("15/11/1999"), Some(ymd(1999, 11, 15)));
    }

    #[test]
    fn test_rejects_impossible_days() {
        assert_eq!(parse_date("31/02/2024"), None);
        assert_eq!(parse_date("30.02.2024"), None);
        assert_eq!(parse_date("31-04-2023"), None);
        assert_eq!(parse_date("0/1/2024"), None);
        assert_eq!(check_date("31/02/2024"), Err(ValidationError::InvalidDate));
    }

    #[test]
    fn test_rejects_bad_patterns() {
        for bad in ["1/3/24", "1/3-2024", "001/3/2024", "a/b/cdef", "1//2024", "2024/03/01", "tomorrow", "1/3/2024/5"] {
            assert_eq!(parse_date(bad), None, "accepted {bad}");
        }
    }

    #[test]
    fn test_day_month_year_round_trip() {
        let mut date = ymd(2023, 1, 1);
        let end = ymd(2025, 1, 1);
        while date < end {
            let formatted = format!("{}/{}/{}", date.day(), date.month(), date.year());
            let normalized = check_date(&formatted).unwrap().map(canonical);
            assert_eq!(normalized, Some(canonical(date)), "{formatted}");
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_empty_date_is_allowed() {
        assert_eq!(check_date(""), Ok(None));
        assert_eq!(check_date("   "), Ok(None));
    }

    #[test]
    fn test_name_rule() {
        assert_eq!(check_name("  Buy milk  "), Ok("Buy milk".to_string()));
        assert_eq!(check_name(" \t "), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_messages_hidden_until_touched() {
        let mut form = TaskForm::new();
        form.input(FieldId::Date, "31/02/2024");

        let result = form.validate(true);
        assert!(!result.valid);
        assert_eq!(form.date.touch(), Touch::Untouched);
        assert!(form.date.message().is_none());
        assert!(!form.date.is_invalid());

        form.blur(FieldId::Date);
        assert_eq!(form.date.touch(), Touch::Touched);
        assert!(form.date.message().is_some());
        assert!(form.date.is_invalid());

        // 已触碰的字段在输入时立即刷新
        form.input(FieldId::Date, "29/02/2024");
        assert!(form.date.message().is_none());
        assert!(!form.date.is_invalid());
    }

    #[test]
    fn test_validate_without_show_keeps_display() {
        let mut form = TaskForm::new();
        form.blur(FieldId::Name);
        assert!(form.name.is_invalid());

        form.input(FieldId::Name, "x");
        form.name = Field { invalid: true, ..form.name.clone() };
        let result = form.validate(false);
        assert!(result.valid);
        assert!(form.name.is_invalid());

        form.validate(true);
        assert!(!form.name.is_invalid());
    }

    #[test]
    fn test_submit_forces_messages() {
        let mut form = TaskForm::new();
        let result = form.submit();

        assert!(!result.valid);
        assert_eq!(form.name.touch(), Touch::Touched);
        assert_eq!(form.name.message(), Some("Name is required"));
        // 空日期是合法的
        assert!(form.date.message().is_none());
    }

    #[test]
    fn test_submit_normalizes() {
        let mut form = TaskForm::new();
        form.input(FieldId::Name, "  Buy milk ");
        form.input(FieldId::Date, "1/3/2024");

        let result = form.submit();
        assert_eq!(
            result,
            Validation {
                valid: true,
                normalized_name: "Buy milk".to_string(),
                normalized_date: Some(ymd(2024, 3, 1)),
            }
        );
    }

    #[test]
    fn test_reset_clears_touch() {
        let mut form = TaskForm::new();
        form.input(FieldId::Name, "x");
        form.submit();
        form.reset();

        assert_eq!(form.name.value(), "");
        assert_eq!(form.name.touch(), Touch::Untouched);
        assert!(form.name.message().is_none());
    }
}
