//! Kernel plan reports for the `fir_plan` tool.

mod csv;
mod json;
mod text;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

use crate::arch::KernelPlan;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

pub trait Formatter: Send {
    fn format(&self, plan: &KernelPlan) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ElementType, FilterConfig};

    fn plans() -> Vec<KernelPlan> {
        FilterConfig::builder(ElementType::Int16, ElementType::Int32)
            .fir_len(27)
            .decimate(3)
            .window_size(192)
            .cascade_len(2)
            .build()
            .unwrap()
            .plans()
            .unwrap()
    }

    #[test]
    fn test_csv_rows_match_header() {
        let formatter = create_formatter(OutputFormat::Csv, false);
        let columns = formatter.header().unwrap().split(',').count();
        for plan in plans() {
            assert_eq!(formatter.format(&plan).split(',').count(), columns);
        }
    }

    #[test]
    fn test_json_is_parseable() {
        let formatter = create_formatter(OutputFormat::Json, false);
        let line = formatter.format(&plans()[1]);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["position"], 1);
        assert_eq!(value["role"], "last");
        assert_eq!(value["holds_centre"], true);
    }

    #[test]
    fn test_text_names_role_and_architecture() {
        let line = create_formatter(OutputFormat::Text, false).format(&plans()[0]);
        assert!(line.starts_with("Kernel  0"), "{}", line);
        assert!(line.contains("first"));
    }
}
