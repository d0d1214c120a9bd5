//! Flattening of nested report trees into [`FlatRecord`]s.
//!
//! The walk is a pre-order traversal. Each section derives a fresh
//! [`AncestryContext`] from the one it was handed, so sibling sections always
//! start from their parent's context and nothing leaks between them.

use crate::schema::{Column, DataRow, FlatRecord, ReportHeader, ReportKind, ReportTree, Row, SectionRow};
use log::{debug, warn};

const INDEX_SUFFIX_MARKER: &str = " at index ";

/// A value column retained for extraction, with its position in the row cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassColumn {
    pub index: usize,
    pub label: String,
}

/// Maps report columns to class labels.
///
/// The first column holds account names and is skipped. Titles lose their
/// spaces and hyphens; empty titles become `Column_<i>`. A "Total" column is
/// dropped once two or more class columns precede it, since a grand total only
/// means something in a report without class breakdown.
pub fn class_columns(columns: &[Column]) -> Vec<ClassColumn> {
    let mut classes: Vec<ClassColumn> = Vec::new();

    for (index, column) in columns.iter().enumerate().skip(1) {
        let label = if column.title.is_empty() {
            format!("Column_{}", index)
        } else {
            column.title.replace([' ', '-'], "")
        };

        if classes.len() > 1 && label.eq_ignore_ascii_case("total") {
            continue;
        }

        classes.push(ClassColumn { index, label });
    }

    classes
}

pub fn class_labels(columns: &[Column]) -> Vec<String> {
    class_columns(columns).into_iter().map(|c| c.label).collect()
}

/// Removes the `" at index <n>"` marker some tree walkers append to ids.
pub fn strip_index_suffix(id: &str) -> String {
    match id.find(INDEX_SUFFIX_MARKER) {
        Some(pos) => id[..pos].trim().to_string(),
        None => id.trim().to_string(),
    }
}

/// Where in the tree the walk currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AncestryContext {
    pub category: String,
    pub category_id: String,
    pub section_type: String,
    pub grandparent: String,
    pub grandparent_id: String,
    pub parent: String,
    pub parent_id: String,
    /// Group tag of the nearest enclosing section.
    pub group: String,
}

impl AncestryContext {
    /// Context for the children of `section`.
    pub fn enter_section(&self, section: &SectionRow, kind: ReportKind) -> Self {
        let name = section.display_name().to_string();
        let id = section.header_id().map(strip_index_suffix).unwrap_or_default();
        let group = section.group.clone().unwrap_or_else(|| self.group.clone());

        if self.category.is_empty() {
            return AncestryContext {
                category: name,
                category_id: id,
                group,
                ..Default::default()
            };
        }

        if self.parent.is_empty() {
            let (grandparent, grandparent_id) = match kind {
                ReportKind::BalanceSheet => (String::new(), String::new()),
                ReportKind::ProfitAndLoss => (self.category.clone(), self.category_id.clone()),
            };

            return AncestryContext {
                category: self.category.clone(),
                category_id: self.category_id.clone(),
                section_type: name.clone(),
                grandparent,
                grandparent_id,
                parent: name,
                parent_id: id,
                group,
            };
        }

        let (grandparent, grandparent_id) = match kind {
            ReportKind::BalanceSheet => (self.parent.clone(), self.parent_id.clone()),
            ReportKind::ProfitAndLoss => (self.category.clone(), self.category_id.clone()),
        };

        AncestryContext {
            category: self.category.clone(),
            category_id: self.category_id.clone(),
            section_type: self.section_type.clone(),
            grandparent,
            grandparent_id,
            parent: name,
            parent_id: id,
            group,
        }
    }

    /// Colon-joined path from the category down to `account`, skipping empty
    /// levels and labels already present earlier in the path.
    pub fn full_account_name(&self, account: &str) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(5);

        for part in [
            self.category.as_str(),
            self.section_type.as_str(),
            self.grandparent.as_str(),
            self.parent.as_str(),
            account,
        ] {
            if !part.is_empty() && !parts.contains(&part) {
                parts.push(part);
            }
        }

        parts.join(":")
    }
}

pub struct ReportFlattener {
    kind: ReportKind,
}

impl ReportFlattener {
    pub fn new(kind: ReportKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    /// Log prefix for one report response: kind and header period.
    pub fn log_context(&self, header: &ReportHeader) -> String {
        format!(
            "{} {}..{}",
            self.kind, header.start_period, header.end_period
        )
    }

    pub fn flatten(&self, tree: &ReportTree) -> Vec<FlatRecord> {
        let log_context = self.log_context(&tree.header);

        if tree.is_empty() {
            warn!("[{}] No rows found in report response", log_context);
            return Vec::new();
        }

        let classes = class_columns(&tree.columns.column);
        if classes.is_empty() {
            warn!(
                "[{}] Report has no value columns; nothing to extract",
                log_context
            );
            return Vec::new();
        }
        debug!(
            "[{}] {} ({} basis), class columns: {:?}",
            log_context,
            tree.header.report_name.as_deref().unwrap_or("unnamed report"),
            tree.header.report_basis.as_deref().unwrap_or("unknown"),
            classes.iter().map(|c| c.label.as_str()).collect::<Vec<_>>()
        );

        let mut pass = FlattenPass {
            kind: self.kind,
            log_context: &log_context,
            header: &tree.header,
            classes: &classes,
            records: Vec::new(),
        };
        pass.walk(&tree.rows.row, &AncestryContext::default());

        debug!(
            "[{}] Flattened into {} records",
            log_context,
            pass.records.len()
        );
        pass.records
    }
}

pub fn flatten_report(tree: &ReportTree, kind: ReportKind) -> Vec<FlatRecord> {
    ReportFlattener::new(kind).flatten(tree)
}

struct FlattenPass<'a> {
    kind: ReportKind,
    log_context: &'a str,
    header: &'a ReportHeader,
    classes: &'a [ClassColumn],
    records: Vec<FlatRecord>,
}

impl FlattenPass<'_> {
    fn walk(&mut self, rows: &[Row], context: &AncestryContext) {
        for row in rows {
            match row {
                Row::Data(data) => self.emit(data, context),
                Row::Section(section) => {
                    let child_context = context.enter_section(section, self.kind);
                    self.walk(&section.children, &child_context);
                }
                Row::Unknown => {}
            }
        }
    }

    fn emit(&mut self, row: &DataRow, context: &AncestryContext) {
        if row.cells.len() < 2 {
            debug!(
                "[{}] Skipping data row without value cells",
                self.log_context
            );
            return;
        }

        let account = row.cells[0].value.clone();
        let account_id = row.cells[0]
            .id
            .as_deref()
            .map(strip_index_suffix)
            .unwrap_or_default();
        let classification = row.group.clone().unwrap_or_else(|| context.group.clone());
        let full_account_name = context.full_account_name(&account);

        for class in self.classes {
            let total_money = row
                .cells
                .get(class.index)
                .map(|cell| cell.value.clone())
                .unwrap_or_default();

            self.records.push(FlatRecord {
                account: account.clone(),
                account_id: account_id.clone(),
                start_period: self.header.start_period.clone(),
                end_period: self.header.end_period.clone(),
                currency: self.header.currency.clone(),
                parent_name: context.parent.clone(),
                parent_id: context.parent_id.clone(),
                grandparent_name: context.grandparent.clone(),
                grandparent_id: context.grandparent_id.clone(),
                category_name: context.category.clone(),
                category_id: context.category_id.clone(),
                classification: classification.clone(),
                section_type: context.section_type.clone(),
                fully_qualified_name: String::new(),
                account_type: String::new(),
                full_account_name: full_account_name.clone(),
                class: class.label.clone(),
                total_money,
            });
        }
    }
}
