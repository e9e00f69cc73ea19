use super::Formatter;
use crate::arch::KernelPlan;

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, plan: &KernelPlan) -> String {
        serde_json::to_string(plan).unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
    }
}
