//! Text report generator.
//!
//! Renders the template for the result's kind: `hist`, `fs`, `single` or
//! `multi`, each in a detailed or summary style.

use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator, TemplateStyle};
use crate::diff::{DiffResult, DirDiff, HistDiff, MultiVersionPackageDiff, PackageDiff};
use crate::model::PackageInfo;
use std::fmt::Write as _;

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Text reporter for terminal output
pub struct TextReporter {
    /// Use colored output
    colored: bool,
}

impl TextReporter {
    /// Create a new text reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    /// One titled section: every item, or `None` when empty.
    fn section<I, S>(
        &self,
        out: &mut String,
        style: TemplateStyle,
        title: &str,
        color: &str,
        items: I,
    ) -> Result<(), ReportError>
    where
        I: ExactSizeIterator<Item = S>,
        S: AsRef<str>,
    {
        let count = items.len();
        match style {
            TemplateStyle::Summary => {
                writeln!(out, "{} {}", self.color(&count.to_string(), color), title)?;
            }
            TemplateStyle::Detailed => {
                writeln!(out, "{}", self.color(&format!("{title}:"), "bold"))?;
                if count == 0 {
                    writeln!(out, "{}", self.color("None", "dim"))?;
                }
                for item in items {
                    writeln!(out, "{}", item.as_ref())?;
                }
                out.push('\n');
            }
        }
        Ok(())
    }

    fn header(
        &self,
        out: &mut String,
        what: &str,
        image1: &str,
        image2: &str,
    ) -> Result<(), ReportError> {
        writeln!(out, "{}", self.color(&format!("-----{what}-----"), "cyan"))?;
        writeln!(out, "{} {image1}", self.color("Image 1:", "dim"))?;
        writeln!(out, "{} {image2}", self.color("Image 2:", "dim"))?;
        out.push('\n');
        Ok(())
    }

    fn render_hist(&self, diff: &HistDiff, style: TemplateStyle) -> Result<String, ReportError> {
        let mut out = String::new();
        self.header(&mut out, "HistoryDiffer", &diff.image1, &diff.image2)?;
        self.section(
            &mut out,
            style,
            &format!("Docker history lines found only in {}", diff.image1),
            "red",
            diff.dels.iter(),
        )?;
        self.section(
            &mut out,
            style,
            &format!("Docker history lines found only in {}", diff.image2),
            "green",
            diff.adds.iter(),
        )?;
        Ok(out)
    }

    fn render_fs(&self, diff: &DirDiff, style: TemplateStyle) -> Result<String, ReportError> {
        let mut out = String::new();
        self.header(&mut out, "FileDiffer", &diff.image1, &diff.image2)?;
        self.section(
            &mut out,
            style,
            &format!("These entries have been added to {}", diff.image2),
            "green",
            diff.adds.iter(),
        )?;
        self.section(
            &mut out,
            style,
            &format!("These entries have been deleted from {}", diff.image1),
            "red",
            diff.dels.iter(),
        )?;
        self.section(
            &mut out,
            style,
            &format!(
                "These entries have been changed between {} and {}",
                diff.image1, diff.image2
            ),
            "yellow",
            diff.mods.iter(),
        )?;
        if !diff.failures.is_empty() {
            self.section(
                &mut out,
                style,
                "These entries could not be compared",
                "red",
                diff.failures
                    .iter()
                    .map(|f| format!("{}: {}", f.entry, f.message)),
            )?;
        }
        Ok(out)
    }

    fn render_single(&self, diff: &PackageDiff, style: TemplateStyle) -> Result<String, ReportError> {
        let mut out = String::new();
        self.header(&mut out, "PackageDiffer", &diff.image1, &diff.image2)?;
        self.section(
            &mut out,
            style,
            &format!("Packages found only in {}", diff.image1),
            "red",
            diff.only_in1
                .iter()
                .map(|(name, info)| format!("{name}  {}", describe(info))),
        )?;
        self.section(
            &mut out,
            style,
            &format!("Packages found only in {}", diff.image2),
            "green",
            diff.only_in2
                .iter()
                .map(|(name, info)| format!("{name}  {}", describe(info))),
        )?;
        self.section(
            &mut out,
            style,
            "Version differences",
            "yellow",
            diff.changed.iter().map(|c| {
                format!("{}  {} => {}", c.name, describe(&c.info1), describe(&c.info2))
            }),
        )?;
        Ok(out)
    }

    fn render_multi(
        &self,
        diff: &MultiVersionPackageDiff,
        style: TemplateStyle,
    ) -> Result<String, ReportError> {
        let mut out = String::new();
        self.header(&mut out, "PackageDiffer", &diff.image1, &diff.image2)?;
        self.section(
            &mut out,
            style,
            &format!("Packages found only in {}", diff.image1),
            "red",
            diff.only_in1.iter().map(|(name, locations)| {
                format!("{name}  {}", describe_all(locations.values()))
            }),
        )?;
        self.section(
            &mut out,
            style,
            &format!("Packages found only in {}", diff.image2),
            "green",
            diff.only_in2.iter().map(|(name, locations)| {
                format!("{name}  {}", describe_all(locations.values()))
            }),
        )?;
        self.section(
            &mut out,
            style,
            "Version differences",
            "yellow",
            diff.changed.iter().map(|c| {
                format!(
                    "{}  {} => {}",
                    c.name,
                    describe_all(c.residue1.iter()),
                    describe_all(c.residue2.iter())
                )
            }),
        )?;
        Ok(out)
    }
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for TextReporter {
    fn generate(&self, result: &DiffResult, config: &ReportConfig) -> Result<String, ReportError> {
        let style = config.templates.style_for(result.template_kind());
        let report = match result {
            DiffResult::History(diff) => self.render_hist(diff, style)?,
            DiffResult::Directory(diff) => self.render_fs(diff, style)?,
            DiffResult::Packages(diff) => self.render_single(diff, style)?,
            DiffResult::MultiVersionPackages(diff) => self.render_multi(diff, style)?,
        };
        Ok(report)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Text
    }
}

fn describe(info: &PackageInfo) -> String {
    match &info.layer {
        Some(layer) => format!("({}, {}) [{layer}]", info.version, info.size),
        None => format!("({}, {})", info.version, info.size),
    }
}

fn describe_all<'a>(infos: impl Iterator<Item = &'a PackageInfo>) -> String {
    let parts: Vec<String> = infos.map(describe).collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}
