//! The compiled automata-network description.

use std::fmt;

use crate::automata::{TemplateKind, INFINITE_TIME};
use crate::delay::DelayTable;
use crate::error::StructuralError;
use crate::model::ReactionId;

/// One process instantiation in the system section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInstance {
    /// Process name, unique in the network.
    pub name: String,
    /// Instantiated template.
    pub template: TemplateKind,
    /// Actual arguments, in parameter order.
    pub arguments: Vec<String>,
}

impl fmt::Display for ProcessInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}({});", self.name, self.template, self.arguments.join(", "))
    }
}

/// A reaction's delay table as emitted in the global declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConstant {
    /// The reaction the table belongs to.
    pub reaction: ReactionId,
    /// Constant name, `<process>_t`.
    pub name: String,
    /// Table contents.
    pub table: DelayTable,
}

impl TableConstant {
    /// The constant declaration, e.g. `const int A_deg_t[MAX_LEVELS+1] = {5, 3, 0};`.
    #[must_use]
    pub fn declaration(&self) -> String {
        let dims = if self.table.is_matrix() {
            "[MAX_LEVELS+1][MAX_LEVELS+1]"
        } else {
            "[MAX_LEVELS+1]"
        };
        format!(
            "const int {}{dims} = {};",
            self.name,
            self.table.to_literal(INFINITE_TIME)
        )
    }
}

/// Parses one emitted `const int NAME[..] = {..};` declaration.
///
/// `sentinel` is the numeric value of `INFINITE_TIME`, accepted in place of
/// the constant name.
///
/// # Errors
///
/// Returns `StructuralError::MalformedTableLiteral` if the text is not a
/// table constant.
pub fn parse_delay_constant(text: &str, sentinel: i64) -> Result<(String, DelayTable), StructuralError> {
    let malformed = |reason: &str| StructuralError::MalformedTableLiteral {
        reason: reason.to_string(),
    };

    let body = text
        .trim()
        .strip_prefix("const int")
        .ok_or_else(|| malformed("missing 'const int'"))?;
    let (head, literal) = body.split_once('=').ok_or_else(|| malformed("missing '='"))?;
    let name = head
        .trim()
        .split('[')
        .next()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| malformed("missing constant name"))?;
    let literal = literal.trim().trim_end_matches(';');

    let table = DelayTable::parse_literal(literal, INFINITE_TIME, sentinel)?;
    Ok((name.to_string(), table))
}

/// Textual automata network plus the structured pieces it was rendered
/// from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomataNetworkDescription {
    pub(crate) text: String,
    pub(crate) declarations: String,
    pub(crate) system: String,
    pub(crate) instances: Vec<ProcessInstance>,
    pub(crate) tables: Vec<TableConstant>,
    pub(crate) infinite_time: i64,
}

impl AutomataNetworkDescription {
    /// The complete document.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Global declarations, unescaped.
    #[must_use]
    pub fn declarations(&self) -> &str {
        &self.declarations
    }

    /// Instance assignments and the `system` line, unescaped.
    #[must_use]
    pub fn system(&self) -> &str {
        &self.system
    }

    /// The `system ...;` line.
    #[must_use]
    pub fn system_line(&self) -> Option<&str> {
        self.system.lines().find(|l| l.starts_with("system "))
    }

    /// Instances in system-line order: substrates, reactions, coordinator.
    #[must_use]
    pub fn instances(&self) -> &[ProcessInstance] {
        &self.instances
    }

    /// Looks up an instance by process name.
    #[must_use]
    pub fn instance(&self, name: &str) -> Option<&ProcessInstance> {
        self.instances.iter().find(|i| i.name == name)
    }

    /// Table constants in reaction order.
    #[must_use]
    pub fn tables(&self) -> &[TableConstant] {
        &self.tables
    }

    /// The table constant emitted for a reaction.
    #[must_use]
    pub fn table_for(&self, reaction: &str) -> Option<&TableConstant> {
        self.tables.iter().find(|t| t.reaction.as_str() == reaction)
    }

    /// Value of the `INFINITE_TIME` constant.
    #[must_use]
    pub const fn infinite_time(&self) -> i64 {
        self.infinite_time
    }

    /// Re-parses every table constant found in the emitted declarations.
    ///
    /// # Errors
    ///
    /// Returns `StructuralError::MalformedTableLiteral` if an emitted table
    /// does not parse.
    pub fn parse_delay_constants(&self) -> Result<Vec<(String, DelayTable)>, StructuralError> {
        self.declarations
            .split(';')
            .map(str::trim)
            .filter(|stmt| stmt.starts_with("const int") && stmt.contains('{'))
            .map(|stmt| parse_delay_constant(stmt, self.infinite_time))
            .collect()
    }

    /// Stable blake3 fingerprint of the document, hex encoded.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        blake3::hash(self.text.as_bytes()).to_hex().to_string()
    }
}

impl fmt::Display for AutomataNetworkDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
