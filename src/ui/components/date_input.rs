use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

impl DatePart {
    fn width(self) -> usize {
        match self {
            DatePart::Year => 4,
            DatePart::Month | DatePart::Day => 2,
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            DatePart::Year => "[YYYY]",
            DatePart::Month => "[MM]",
            DatePart::Day => "[DD]",
        }
    }
}

/// Inline editor for a YYYY-MM-DD value: digits accumulate into the active
/// part and commit once it is full; arrow keys switch parts. An input that
/// doesn't form a real calendar date is discarded.
pub struct DateInputState {
    pub date: NaiveDate,
    pub editing: bool,
    part: DatePart,
    buffer: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            part: DatePart::Year,
            buffer: String::new(),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        self.part = DatePart::Year;
        self.buffer.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }
        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.buffer.push(c);
                if self.buffer.len() >= self.part.width() {
                    self.commit_buffer();
                }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Right => self.switch_part(true),
            KeyCode::Left => self.switch_part(false),
            _ => {}
        }
    }

    fn switch_part(&mut self, forward: bool) {
        self.part = match (self.part, forward) {
            (DatePart::Year, true) | (DatePart::Day, false) => DatePart::Month,
            (DatePart::Month, true) | (DatePart::Year, false) => DatePart::Day,
            (DatePart::Day, true) | (DatePart::Month, false) => DatePart::Year,
        };
        self.buffer.clear();
    }

    fn commit_buffer(&mut self) {
        let updated = self
            .buffer
            .parse::<u32>()
            .ok()
            .and_then(|value| match self.part {
                DatePart::Year if (1900..=2100).contains(&value) => {
                    self.date.with_year(value as i32)
                }
                DatePart::Month => self.date.with_month(value),
                DatePart::Day => self.date.with_day(value),
                _ => None,
            });
        if let Some(date) = updated {
            self.date = date;
        }
        self.buffer.clear();
    }

    /// The field text shown while this input owns the cursor; the active
    /// part is replaced by the pending digits or a placeholder.
    pub fn display_string(&self) -> String {
        if !self.editing {
            return self.date.format("%Y-%m-%d").to_string();
        }
        let active = if self.buffer.is_empty() {
            self.part.placeholder().to_string()
        } else {
            format!("[{}]", self.buffer)
        };
        let year = format!("{:04}", self.date.year());
        let month = format!("{:02}", self.date.month());
        let day = format!("{:02}", self.date.day());
        match self.part {
            DatePart::Year => format!("{active}-{month}-{day}"),
            DatePart::Month => format!("{year}-{active}-{day}"),
            DatePart::Day => format!("{year}-{month}-{active}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> DateInputState {
        let mut s = DateInputState::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        s.toggle_editing();
        s
    }

    fn type_digits(s: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            s.handle_input(KeyCode::Char(c));
        }
    }

    #[test]
    fn full_year_commits() {
        let mut s = state();
        type_digits(&mut s, "2025");
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    }

    #[test]
    fn impossible_day_is_discarded() {
        let mut s = state();
        s.handle_input(KeyCode::Left); // Year -> Day
        type_digits(&mut s, "32");
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn month_edit_after_switch() {
        let mut s = state();
        s.handle_input(KeyCode::Right);
        type_digits(&mut s, "12");
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2024, 12, 15).unwrap());
    }

    #[test]
    fn display_marks_active_part() {
        let mut s = state();
        assert_eq!(s.display_string(), "[YYYY]-03-15");
        s.handle_input(KeyCode::Char('2'));
        assert_eq!(s.display_string(), "[2]-03-15");
        s.editing = false;
        assert_eq!(s.display_string(), "2024-03-15");
    }
}
