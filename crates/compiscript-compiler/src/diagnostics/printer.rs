//! Builder-pattern printer for rendering diagnostics.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

use super::Diagnostics;

/// Renders diagnostics either as plain summary lines or, when source text is
/// provided, as annotated snippets.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        if self.diagnostics.is_empty() {
            return Ok(());
        }

        let Some(source) = self.source else {
            return write!(w, "{}", self.diagnostics.summary());
        };

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            let title = format!("{}: {}", diag.code, diag.message);

            let report: Vec<Group> = match diag.pos {
                Some(pos) => {
                    let range = clamp_range(
                        pos.span.start as usize,
                        pos.span.end as usize,
                        source.len(),
                    );
                    let mut snippet = Snippet::source(source).line_start(1).annotation(
                        AnnotationKind::Primary.span(range).label(&diag.message),
                    );
                    if let Some(p) = self.path {
                        snippet = snippet.path(p);
                    }
                    vec![Level::ERROR.primary_title(&title).element(snippet)]
                }
                None => vec![Group::with_title(Level::ERROR.primary_title(&title))],
            };

            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{}", renderer.render(&report))?;
        }

        Ok(())
    }
}

impl Diagnostics {
    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}

fn clamp_range(start: usize, end: usize, limit: usize) -> std::ops::Range<usize> {
    let start = start.min(limit);
    if start == end {
        return start..(start + 1).min(limit);
    }
    start..end.min(limit)
}
