//! Formatting for the [Stack] type.

use super::{Stack, StackRef};
use crate::{
    constants::{COLORS, EMPTY_CIRCLE, FILLED_CIRCLE, VERTICAL_BOX},
    errors::StResult,
};
use nu_ansi_term::{Color, Style};
use std::fmt::{Display, Write};

impl Stack {
    /// Returns a [DisplayRef] for every diff, in stack order.
    ///
    /// ## Takes
    /// - `checked_out` - The name of the branch that is currently checked out.
    ///                   If [None], no diff is highlighted.
    pub fn display_refs(&self, checked_out: Option<&str>) -> StResult<Vec<DisplayRef>> {
        Ok(self
            .ordered()?
            .into_iter()
            .enumerate()
            .map(|(i, stack_ref)| DisplayRef {
                line: render_line(i, stack_ref, checked_out),
                branch_name: stack_ref.branch.clone(),
            })
            .collect())
    }

    /// Writes a pretty-printed representation of the stack to the passed [Write]r, head first.
    ///
    /// ## Takes
    /// - `w` - The writer to write the stack to.
    /// - `checked_out` - The name of the branch that is currently checked out.
    pub fn write_stack<W: Write>(&self, w: &mut W, checked_out: Option<&str>) -> StResult<()> {
        writeln!(w, "{}", Style::new().bold().paint(&self.title))?;

        let lines = self.display_refs(checked_out)?;
        let mut lines = lines.iter().enumerate().peekable();
        while let Some((i, display_ref)) = lines.next() {
            writeln!(w, "{}", display_ref)?;
            if lines.peek().is_some() {
                writeln!(w, "{}", color(i).paint(VERTICAL_BOX.to_string()))?;
            }
        }

        Ok(())
    }
}

fn color(index: usize) -> Color {
    COLORS[index % COLORS.len()]
}

fn render_line(index: usize, stack_ref: &StackRef, checked_out: Option<&str>) -> String {
    let circle = (Some(stack_ref.branch.as_str()) == checked_out)
        .then_some(FILLED_CIRCLE)
        .unwrap_or(EMPTY_CIRCLE);
    let merge_request = stack_ref
        .has_merge_request()
        .then(|| format!(" ({})", Color::Cyan.italic().paint(&stack_ref.mr_url)))
        .unwrap_or_default();

    format!(
        "{} {}{}",
        color(index).paint(format!("{} {}", circle, stack_ref.branch)),
        stack_ref.description,
        merge_request
    )
}

/// A pair of a log-line and a branch name.
#[derive(Debug)]
pub(crate) struct DisplayRef {
    /// The log-line to display.
    pub(crate) line: String,
    /// The branch name corresponding to the log-line.
    pub(crate) branch_name: String,
}

impl Display for DisplayRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.line)
    }
}
