//! Related-table embedding
//!
//! A [`JoinSpec`] asks the backend to embed related rows into each primary
//! row. The backend's select syntax is `alias:table!foreign_key(columns)`;
//! the foreign key disambiguates when more than one relationship exists
//! between the two tables. The alias (or the table name when no alias is
//! given) becomes the key under which the related data appears in each row.

use serde::{Deserialize, Serialize};
use vt_core::{VtError, VtResult};

/// One related table to embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinDescriptor {
    /// The related table
    pub table: String,

    /// Columns to embed, `*` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<String>,

    /// Foreign-key column disambiguating the relationship
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,

    /// Key under which the embedded rows appear; defaults to the table name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl JoinDescriptor {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: None,
            foreign_key: None,
            alias: None,
        }
    }

    /// Restrict the embedded columns (builder pattern)
    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    /// Traverse a specific foreign key (builder pattern)
    pub fn via(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = Some(foreign_key.into());
        self
    }

    /// Embed under a different key (builder pattern)
    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The key this relation appears under in result rows.
    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    /// Render the backend embed expression for this join.
    pub fn embed_expr(&self) -> String {
        let columns = self.columns.as_deref().unwrap_or("*");
        match &self.foreign_key {
            Some(fk) => format!("{}:{}!{}({})", self.key(), self.table, fk, columns),
            None => format!("{}({})", self.key(), columns),
        }
    }

    /// Parse an embed expression back into a descriptor. Accepts the same
    /// shapes `embed_expr` renders: `alias:table!fk(cols)`, `table!fk(cols)`,
    /// `alias:table(cols)`, `table(cols)`.
    pub fn parse_embed(expr: &str) -> Option<Self> {
        let expr = expr.trim();
        let open = expr.find('(')?;
        if !expr.ends_with(')') {
            return None;
        }

        let head = &expr[..open];
        let columns = &expr[open + 1..expr.len() - 1];
        let (alias, rest) = match head.split_once(':') {
            Some((alias, rest)) => (Some(alias), rest),
            None => (None, head),
        };
        let (table, foreign_key) = match rest.split_once('!') {
            Some((table, fk)) => (table, Some(fk)),
            None => (rest, None),
        };
        if table.is_empty() {
            return None;
        }

        Some(Self {
            table: table.to_string(),
            columns: Some(columns)
                .filter(|c| !c.is_empty() && *c != "*")
                .map(str::to_string),
            foreign_key: foreign_key.map(str::to_string),
            alias: alias.filter(|a| !a.is_empty()).map(str::to_string),
        })
    }

    pub fn validate(&self) -> VtResult<()> {
        if self.table.is_empty() {
            return Err(VtError::InvalidJoin(
                "join descriptor has an empty table name".to_string(),
            ));
        }
        Ok(())
    }
}

/// Column selection plus the set of related tables to embed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSpec {
    /// Primary-table columns to select, `*` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<String>,

    /// Related tables to embed
    #[serde(default)]
    pub joins: Vec<JoinDescriptor>,
}

impl JoinSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select specific primary-table columns (builder pattern)
    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    /// Add a related table (builder pattern)
    pub fn join(mut self, descriptor: JoinDescriptor) -> Self {
        self.joins.push(descriptor);
        self
    }

    /// Whether result rows will carry embedded relations.
    pub fn has_embeds(&self) -> bool {
        !self.joins.is_empty() || self.columns.as_deref().is_some_and(|c| c.contains('('))
    }

    /// Compose the full select expression: primary columns first, then one
    /// embed expression per join.
    pub fn select_expr(&self) -> String {
        let base = self.columns.as_deref().unwrap_or("*");
        if self.joins.is_empty() {
            return base.to_string();
        }

        let embeds: Vec<String> = self.joins.iter().map(JoinDescriptor::embed_expr).collect();
        format!("{},{}", base, embeds.join(","))
    }

    /// Lift embed expressions written inline in the columns string into
    /// proper join descriptors; plain columns stay in `columns`. Specs
    /// without inline embeds come back unchanged. Fails on an embed
    /// expression that does not parse.
    pub fn normalized(&self) -> VtResult<JoinSpec> {
        let Some(columns) = self.columns.as_deref().filter(|c| c.contains('(')) else {
            return Ok(self.clone());
        };

        let mut plain = Vec::new();
        let mut joins = self.joins.clone();
        for part in split_select_list(columns) {
            if part.contains('(') {
                let descriptor = JoinDescriptor::parse_embed(&part).ok_or_else(|| {
                    VtError::InvalidJoin(format!("unparsable embed expression `{}`", part))
                })?;
                joins.push(descriptor);
            } else {
                plain.push(part);
            }
        }

        Ok(JoinSpec {
            columns: if plain.is_empty() {
                None
            } else {
                Some(plain.join(","))
            },
            joins,
        })
    }

    pub fn validate(&self) -> VtResult<()> {
        for descriptor in &self.joins {
            descriptor.validate()?;
        }
        Ok(())
    }
}

/// Split a select list on top-level commas, leaving embed column lists
/// intact.
fn split_select_list(columns: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for ch in columns.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                if !current.trim().is_empty() {
                    parts.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}
