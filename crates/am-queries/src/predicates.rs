//! Predicate catalog
//!
//! Every filter kind the listings support, each able to render itself as a
//! parameterized SQL fragment. Placeholders are handed out by a `ParamBinder`
//! owned by the caller, so ordinals follow emission order exactly.

use am_core::{AssetStatus, AssetType, EmployeeStatus};
use uuid::Uuid;

use crate::composer::ListingMode;

/// A value bound to a positional placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    TextArray(Vec<String>),
    Int(i32),
    BigInt(i64),
    Uuid(Uuid),
}

/// Hands out `$n` placeholders in strictly increasing order
#[derive(Debug, Default)]
pub struct ParamBinder {
    params: Vec<SqlParam>,
}

impl ParamBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `param` and return the placeholder that refers to it
    pub fn bind(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn into_params(self) -> Vec<SqlParam> {
        self.params
    }
}

/// How a clause joins everything emitted before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    /// First emitted clause
    None,
    And,
    Or,
}

impl Connective {
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Connective::None => None,
            Connective::And => Some("AND"),
            Connective::Or => Some("OR"),
        }
    }
}

/// Boolean group a predicate belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    /// Mutually exclusive status alternatives, joined by OR
    Status,
    /// Independent constraints, joined by AND
    Constraint,
}

/// A status value as stored in either the assets or the employees table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusValue {
    Asset(AssetStatus),
    Employee(EmployeeStatus),
}

impl StatusValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusValue::Asset(status) => status.as_str(),
            StatusValue::Employee(status) => status.as_str(),
        }
    }
}

/// Logical column a predicate targets; `ListingMode::column` resolves it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Status,
    AssetType,
    Name,
    WarrantyExpiry,
    Id,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Status(StatusValue),
    /// Asset type is a member of the set; never constructed with an empty set
    TypeIn(Vec<AssetType>),
    /// Case-insensitive substring match
    NameContains(String),
    /// Warranty expires in `[now(), now() + N months)`
    WarrantyWithin(u32),
    /// Warranty expired before `now()`
    Expired,
    IdEquals(Uuid),
}

impl Predicate {
    pub fn group(&self) -> Group {
        match self {
            Predicate::Status(_) => Group::Status,
            _ => Group::Constraint,
        }
    }

    pub fn field(&self) -> Field {
        match self {
            Predicate::Status(_) => Field::Status,
            Predicate::TypeIn(_) => Field::AssetType,
            Predicate::NameContains(_) => Field::Name,
            Predicate::WarrantyWithin(_) | Predicate::Expired => Field::WarrantyExpiry,
            Predicate::IdEquals(_) => Field::Id,
        }
    }

    /// Render as a SQL boolean expression, binding parameters in textual order
    pub fn render(&self, mode: ListingMode, binder: &mut ParamBinder) -> String {
        let column = mode.column(self.field());
        match self {
            Predicate::Status(status) => {
                let ph = binder.bind(SqlParam::Text(status.as_str().to_string()));
                format!("{column} = {ph}")
            }
            Predicate::TypeIn(types) => {
                let values = types.iter().map(|t| t.as_str().to_string()).collect();
                let ph = binder.bind(SqlParam::TextArray(values));
                format!("{column} = ANY({ph})")
            }
            Predicate::NameContains(text) => {
                let ph = binder.bind(SqlParam::Text(escape_like(text)));
                format!("{column} ILIKE '%' || {ph} || '%'")
            }
            Predicate::WarrantyWithin(months) => {
                let months = i32::try_from(*months).unwrap_or(i32::MAX);
                let ph = binder.bind(SqlParam::Int(months));
                format!("({column} >= now() AND {column} < now() + make_interval(months => {ph}))")
            }
            Predicate::Expired => format!("{column} < now()"),
            Predicate::IdEquals(id) => {
                let ph = binder.bind(SqlParam::Uuid(*id));
                format!("{column} = {ph}")
            }
        }
    }
}

/// Escape LIKE wildcards so the search text matches literally
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
