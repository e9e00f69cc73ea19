use super::Formatter;
use crate::arch::KernelPlan;

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, plan: &KernelPlan) -> String {
        format!(
            "{},{:?},{:?},{},{},{},{},{},{},{},{},{},{}",
            plan.position,
            plan.role,
            plan.architecture,
            plan.lanes,
            plan.columns,
            plan.range.offset,
            plan.range.len,
            plan.holds_centre,
            plan.ops,
            plan.skew,
            plan.margin,
            plan.vectors,
            plan.repeat
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("position,role,architecture,lanes,columns,offset,len,holds_centre,ops,skew,margin,vectors,repeat")
    }
}
