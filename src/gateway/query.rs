//! Table-scoped read descriptions.
//!
//! A [`Select`] is a backend-neutral description of one read: which table, which related rows
//! to embed, which equality and text predicates apply, the ordering and the row cap. Each
//! [`Gateway`](crate::gateway::Gateway) implementation translates it into its own wire form.

use serde_json::Value;

/// Join-expansion of a related table into each returned row.
#[derive(Debug, Clone, PartialEq)]
pub enum Embed {
    /// To-one relation: `row[foreign_key]` references `table.id`; the related row (or null)
    /// is embedded under `alias`.
    One {
        alias: &'static str,
        table: &'static str,
        foreign_key: &'static str,
    },
    /// To-many relation: rows of `table` whose `back_reference` equals this row's id are
    /// embedded as an array under `alias`, each expanded with `nested`.
    Many {
        alias: &'static str,
        table: &'static str,
        back_reference: &'static str,
        nested: Vec<Embed>,
    },
}

impl Embed {
    pub fn one(alias: &'static str, table: &'static str, foreign_key: &'static str) -> Self {
        Embed::One {
            alias,
            table,
            foreign_key,
        }
    }

    pub fn many(
        alias: &'static str,
        table: &'static str,
        back_reference: &'static str,
        nested: Vec<Embed>,
    ) -> Self {
        Embed::Many {
            alias,
            table,
            back_reference,
            nested,
        }
    }

    pub fn alias(&self) -> &'static str {
        match self {
            Embed::One { alias, .. } | Embed::Many { alias, .. } => alias,
        }
    }
}

/// Equality predicate on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Case-insensitive substring match of `term` against any of `columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearch {
    pub columns: Vec<&'static str>,
    pub term: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub descending: bool,
}

/// One table-scoped read.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: &'static str,
    pub embeds: Vec<Embed>,
    pub filters: Vec<Filter>,
    pub text: Option<TextSearch>,
    pub order: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Select {
    pub fn from(table: &'static str) -> Self {
        Self {
            table,
            embeds: Vec::new(),
            filters: Vec::new(),
            text: None,
            order: None,
            limit: None,
        }
    }

    pub fn embed_all(mut self, embeds: Vec<Embed>) -> Self {
        self.embeds.extend(embeds);
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn search(mut self, columns: Vec<&'static str>, term: impl Into<String>) -> Self {
        self.text = Some(TextSearch {
            columns,
            term: term.into(),
        });
        self
    }

    pub fn order_by(mut self, column: &'static str, descending: bool) -> Self {
        self.order = Some(OrderBy { column, descending });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
