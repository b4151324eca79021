//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, UserId, database_id::CategoryId};

/// The icon used when a category is created without choosing one.
pub const DEFAULT_ICON: &str = "fa-solid fa-tag";
/// The color used when a category is created without choosing one.
pub const DEFAULT_COLOR: &str = "#007bff";

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty
    /// invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the ledger a category can be used on.
///
/// A [CategoryKind::Both] category can label income and expense transactions
/// alike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Labels income transactions.
    Income,
    /// Labels expense transactions.
    Expense,
    /// Labels both income and expense transactions.
    Both,
}

impl CategoryKind {
    /// The kind as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
            CategoryKind::Both => "both",
        }
    }

    /// Parse the kind from its database representation.
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "income" => Some(CategoryKind::Income),
            "expense" => Some(CategoryKind::Expense),
            "both" => Some(CategoryKind::Both),
            _ => None,
        }
    }
}

impl Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A category for labelling transactions (e.g., 'Food', 'Salary').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub kind: CategoryKind,
    /// A Font Awesome icon class, e.g. "fa-solid fa-utensils".
    pub icon: String,
    /// A CSS hex color, e.g. "#007bff".
    pub color: String,
}

/// The data for creating a new category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: CategoryName,
    pub kind: CategoryKind,
    pub icon: String,
    pub color: String,
    pub user_id: UserId,
}

/// Form data for category creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub name: String,
    pub kind: CategoryKind,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
}
