use super::Formatter;
use crate::arch::KernelPlan;
use crate::cascade::CascadeRole;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

fn role_name(role: CascadeRole) -> &'static str {
    match role {
        CascadeRole::Standalone => "standalone",
        CascadeRole::First => "first",
        CascadeRole::Middle => "middle",
        CascadeRole::Last => "last",
    }
}

impl Formatter for TextFormatter {
    fn format(&self, plan: &KernelPlan) -> String {
        let centre = if plan.holds_centre { " +centre" } else { "" };
        if self.verbose {
            format!(
                "Kernel {:>2} {:<10} {} [taps {:>4}..{:<4}{}, {} lanes x {} columns, {} ops, skew {}, margin {}, {} vectors, repeat {}]",
                plan.position,
                role_name(plan.role),
                plan.architecture,
                plan.range.offset,
                plan.range.end(),
                centre,
                plan.lanes,
                plan.columns,
                plan.ops,
                plan.skew,
                plan.margin,
                plan.vectors,
                plan.repeat
            )
        } else {
            format!(
                "Kernel {:>2} {:<10} {} taps {}..{}{}",
                plan.position,
                role_name(plan.role),
                plan.architecture,
                plan.range.offset,
                plan.range.end(),
                centre
            )
        }
    }
}
