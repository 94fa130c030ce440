//! Prompt templates, compiled from `templates/` at build time.

use askama::Template;
use chrono::NaiveDate;

use crate::error::Result;

/// Prompt asking the model to write SQL for a question.
#[derive(Template)]
#[template(path = "sql_gen.txt")]
pub struct SqlGenPrompt<'a> {
    /// Rendered like "January 2, 2006".
    pub date: String,
    pub command: &'a str,
}

impl<'a> SqlGenPrompt<'a> {
    pub fn new(today: NaiveDate, command: &'a str) -> Self {
        Self {
            date: format_prompt_date(today),
            command,
        }
    }

    pub fn render_prompt(&self) -> Result<String> {
        Ok(self.render()?)
    }
}

/// Prompt asking the model to pick a chart for a rendered data table.
#[derive(Template)]
#[template(path = "chart_select.txt")]
pub struct ChartSelectPrompt<'a> {
    pub title: &'a str,
    pub data: &'a str,
}

impl<'a> ChartSelectPrompt<'a> {
    pub fn new(title: &'a str, data: &'a str) -> Self {
        Self { title, data }
    }

    pub fn render_prompt(&self) -> Result<String> {
        Ok(self.render()?)
    }
}

/// Long-form date without zero padding, e.g. "March 7, 2023".
pub fn format_prompt_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn prompt_date_format() {
        assert_eq!(format_prompt_date(date(2006, 1, 2)), "January 2, 2006");
        assert_eq!(format_prompt_date(date(2023, 11, 30)), "November 30, 2023");
    }

    #[test]
    fn sql_gen_includes_date_and_question() {
        let prompt = SqlGenPrompt::new(date(2023, 3, 7), "What did we spend on libraries?")
            .render_prompt()
            .unwrap();
        assert!(prompt.contains("Today's date is March 7, 2023."));
        assert!(prompt.contains("Question: What did we spend on libraries?"));
        assert!(prompt.contains("\"MissingData\""));
    }

    #[test]
    fn question_text_is_not_escaped() {
        let prompt = SqlGenPrompt::new(date(2023, 3, 7), "Fire & Rescue <vs> \"Police\"")
            .render_prompt()
            .unwrap();
        assert!(prompt.contains("Fire & Rescue <vs> \"Police\""));
    }

    #[test]
    fn chart_select_includes_table() {
        let table = "+--------+--------+\n| program | total |\n+--------+--------+";
        let prompt = ChartSelectPrompt::new("Spending by program", table)
            .render_prompt()
            .unwrap();
        assert!(prompt.contains("Question: Spending by program"));
        assert!(prompt.contains(table));
        assert!(prompt.contains("\"ValueIsCurrency\""));
    }
}
