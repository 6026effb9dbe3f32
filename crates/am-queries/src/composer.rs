//! Query composer
//!
//! Turns a `FilterSpec` into one SQL statement plus its ordered parameters.
//! Composition happens in two steps: `plan` selects the predicates as a tagged
//! clause list, then a single render pass threads one `ParamBinder` through
//! them. The statement carries `count(*) OVER ()` computed in an inner scope so
//! every returned row also reports the total number of matches.

use am_core::{AssetStatus, EmployeeStatus};
use tracing::debug;

use crate::filters::FilterSpec;
use crate::predicates::{Connective, Field, Group, ParamBinder, Predicate, SqlParam, StatusValue};

/// Which listing a query is composed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingMode {
    /// Asset listing without status flags: live (non-archived) assets only
    AssetDefault,
    /// Asset listing with at least one status flag
    AssetFiltered,
    Employee,
}

impl ListingMode {
    /// Pick the asset mode implied by the status flags
    pub fn for_assets(spec: &FilterSpec) -> Self {
        if spec.has_asset_status_flag() {
            ListingMode::AssetFiltered
        } else {
            ListingMode::AssetDefault
        }
    }

    pub fn is_asset(&self) -> bool {
        matches!(self, ListingMode::AssetDefault | ListingMode::AssetFiltered)
    }

    /// Qualified column for a logical field
    pub fn column(&self, field: Field) -> &'static str {
        match (self, field) {
            (ListingMode::Employee, Field::Status) => "e.status",
            (_, Field::Status) => "a.status",
            (_, Field::AssetType) => "a.asset_type",
            (ListingMode::Employee, Field::Name) => "e.name",
            (_, Field::Name) => "a.brand",
            (_, Field::WarrantyExpiry) => "a.warranty_expiry_date",
            (ListingMode::Employee, Field::Id) => "e.id",
            (_, Field::Id) => "a.id",
        }
    }

    /// Status flags consulted by this mode, in priority order
    pub fn status_flags(&self) -> &'static [StatusFlag] {
        match self {
            ListingMode::AssetDefault => &[],
            ListingMode::AssetFiltered => &ASSET_STATUS_ORDER,
            ListingMode::Employee => &EMPLOYEE_STATUS_ORDER,
        }
    }

    /// Status applied when no flag is set
    pub fn implied_status(&self) -> Option<StatusValue> {
        match self {
            ListingMode::Employee => Some(StatusValue::Employee(EmployeeStatus::Active)),
            _ => None,
        }
    }

    /// Fixed condition ANDed in front of every predicate
    fn base_scope(&self) -> Option<&'static str> {
        match self {
            ListingMode::AssetDefault => Some("a.archived_at IS NULL"),
            _ => None,
        }
    }
}

/// A status flag of the filter specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFlag {
    Available,
    Assigned,
    Deleted,
    NotAnEmployee,
}

pub const ASSET_STATUS_ORDER: [StatusFlag; 3] =
    [StatusFlag::Available, StatusFlag::Assigned, StatusFlag::Deleted];

pub const EMPLOYEE_STATUS_ORDER: [StatusFlag; 2] = [StatusFlag::Deleted, StatusFlag::NotAnEmployee];

impl StatusFlag {
    pub fn is_set(&self, spec: &FilterSpec) -> bool {
        match self {
            StatusFlag::Available => spec.available,
            StatusFlag::Assigned => spec.assigned,
            StatusFlag::Deleted => spec.deleted,
            StatusFlag::NotAnEmployee => spec.not_an_employee,
        }
    }

    /// Stored status the flag selects in the given mode
    pub fn status(&self, mode: ListingMode) -> StatusValue {
        match (self, mode) {
            (StatusFlag::Available, _) => StatusValue::Asset(AssetStatus::Available),
            (StatusFlag::Assigned, _) => StatusValue::Asset(AssetStatus::Assigned),
            (StatusFlag::Deleted, ListingMode::Employee) => {
                StatusValue::Employee(EmployeeStatus::Deleted)
            }
            (StatusFlag::Deleted, _) => StatusValue::Asset(AssetStatus::Deleted),
            (StatusFlag::NotAnEmployee, _) => StatusValue::Employee(EmployeeStatus::NotAnEmployee),
        }
    }
}

/// Warranty branch selected by `(warranty_months, is_expired)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryBranch {
    Unconstrained,
    ExpiringWithin(u32),
    Expired,
}

impl ExpiryBranch {
    pub fn select(warranty_months: u32, is_expired: bool) -> Self {
        match (warranty_months, is_expired) {
            (0, false) => ExpiryBranch::Unconstrained,
            (0, true) => ExpiryBranch::Expired,
            (months, _) => ExpiryBranch::ExpiringWithin(months),
        }
    }

    pub fn predicate(&self) -> Option<Predicate> {
        match self {
            ExpiryBranch::Unconstrained => None,
            ExpiryBranch::ExpiringWithin(months) => Some(Predicate::WarrantyWithin(*months)),
            ExpiryBranch::Expired => Some(Predicate::Expired),
        }
    }
}

/// One planned predicate with its connective
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub connective: Connective,
    pub predicate: Predicate,
}

impl Clause {
    pub fn group(&self) -> Group {
        self.predicate.group()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

/// A rendered statement ready for execution
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedQuery {
    pub mode: Option<ListingMode>,
    pub sql: String,
    pub params: Vec<SqlParam>,
    pub clauses: Vec<Clause>,
    pub window: Option<PageWindow>,
}

/// Stateless composer, one per request
#[derive(Debug, Clone, Copy)]
pub struct QueryComposer {
    mode: ListingMode,
}

impl QueryComposer {
    pub fn new(mode: ListingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ListingMode {
        self.mode
    }

    /// Select the applicable predicates: the status OR-group first, then the
    /// AND-group in the order type set, name, warranty or expiry, exact id.
    pub fn plan(&self, spec: &FilterSpec) -> Vec<Clause> {
        let mut statuses: Vec<StatusValue> = self
            .mode
            .status_flags()
            .iter()
            .filter(|flag| flag.is_set(spec))
            .map(|flag| flag.status(self.mode))
            .collect();
        if statuses.is_empty() {
            statuses.extend(self.mode.implied_status());
        }

        let mut clauses: Vec<Clause> = statuses
            .into_iter()
            .enumerate()
            .map(|(i, status)| Clause {
                connective: if i == 0 { Connective::None } else { Connective::Or },
                predicate: Predicate::Status(status),
            })
            .collect();

        for predicate in self.constraints(spec) {
            let connective = if clauses.is_empty() {
                Connective::None
            } else {
                Connective::And
            };
            clauses.push(Clause {
                connective,
                predicate,
            });
        }

        clauses
    }

    fn constraints(&self, spec: &FilterSpec) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if !spec.asset_types.is_empty() {
            predicates.push(Predicate::TypeIn(spec.asset_types.iter().copied().collect()));
        }
        if let Some(name) = &spec.searched_name {
            predicates.push(Predicate::NameContains(name.clone()));
        }
        if self.mode.is_asset() {
            predicates.extend(ExpiryBranch::select(spec.warranty_months, spec.is_expired).predicate());
        }
        if self.mode == ListingMode::Employee {
            predicates.extend(spec.employee_id.map(Predicate::IdEquals));
        }
        predicates
    }

    /// Compose the full statement for `spec`
    pub fn compose(&self, spec: &FilterSpec) -> ComposedQuery {
        let clauses = self.plan(spec);
        let mut binder = ParamBinder::new();

        let predicates = render_clauses(self.mode, &clauses, &mut binder);
        let where_clause = where_clause(self.mode.base_scope(), &predicates);

        let window = spec.pagination.then(|| PageWindow {
            limit: spec.limit,
            offset: spec.offset(),
        });
        let page_clause = match window {
            Some(window) => {
                let limit = binder.bind(SqlParam::BigInt(window.limit));
                let offset = binder.bind(SqlParam::BigInt(window.offset));
                format!("LIMIT {limit} OFFSET {offset}")
            }
            None => String::new(),
        };

        let sql = match self.mode {
            ListingMode::AssetDefault | ListingMode::AssetFiltered => {
                asset_listing_sql(&where_clause, &page_clause)
            }
            ListingMode::Employee => employee_listing_sql(&where_clause, &page_clause),
        };
        let params = binder.into_params();

        debug!(
            mode = ?self.mode,
            clauses = clauses.len(),
            params = params.len(),
            paginated = window.is_some(),
            "composed listing query"
        );

        ComposedQuery {
            mode: Some(self.mode),
            sql,
            params,
            clauses,
            window,
        }
    }
}

/// Render the planned clauses; a multi-clause status group is parenthesized
/// so it acts as a single operand of the AND chain.
fn render_clauses(mode: ListingMode, clauses: &[Clause], binder: &mut ParamBinder) -> String {
    let status_len = clauses
        .iter()
        .take_while(|c| c.group() == Group::Status)
        .count();
    let wrap_status = status_len > 1;

    let mut sql = String::new();
    for (i, clause) in clauses.iter().enumerate() {
        if let Some(keyword) = clause.connective.keyword() {
            sql.push(' ');
            sql.push_str(keyword);
            sql.push(' ');
        }
        if wrap_status && i == 0 {
            sql.push('(');
        }
        sql.push_str(&clause.predicate.render(mode, binder));
        if wrap_status && i + 1 == status_len {
            sql.push(')');
        }
    }
    sql
}

fn where_clause(scope: Option<&str>, predicates: &str) -> String {
    match (scope, predicates.is_empty()) {
        (None, true) => String::new(),
        (Some(scope), true) => format!("WHERE {scope}"),
        (None, false) => format!("WHERE {predicates}"),
        (Some(scope), false) => format!("WHERE {scope} AND {predicates}"),
    }
}

fn asset_listing_sql(where_clause: &str, page_clause: &str) -> String {
    format!(
        r#"
        WITH asset_rows AS (
            SELECT DISTINCT ON (a.id)
                a.id,
                a.brand,
                a.model,
                a.serial_no,
                a.asset_type,
                a.purchased_date,
                a.warranty_start_date,
                a.warranty_expiry_date,
                a.status,
                CASE WHEN a.status = 'assigned' THEN e.id END AS assigned_to_id,
                CASE WHEN a.status IN ('assigned', 'deleted') THEN e.name END AS assigned_to
            FROM assets a
            LEFT JOIN employee_asset_relation ear ON ear.asset_id = a.id
            LEFT JOIN employees e ON e.id = ear.employee_id
            {where_clause}
            ORDER BY a.id, ear.retrieved_date DESC NULLS FIRST
        ),
        counted AS (
            SELECT count(*) OVER () AS total_count, asset_rows.*
            FROM asset_rows
        )
        SELECT
            total_count, id, brand, model, serial_no, asset_type, purchased_date,
            warranty_start_date, warranty_expiry_date, status, assigned_to_id, assigned_to
        FROM counted
        ORDER BY id
        {page_clause}
        "#
    )
}

fn employee_listing_sql(where_clause: &str, page_clause: &str) -> String {
    format!(
        r#"
        WITH employee_rows AS (
            SELECT
                e.id,
                e.name,
                e.email,
                e.phone_no,
                e.status,
                e.employee_type,
                e.archived_at,
                e.archive_reason,
                e.deleted_by,
                count(ear.id) FILTER (WHERE ear.retrieved_date IS NULL) AS asset_quantity
            FROM employees e
            LEFT JOIN employee_asset_relation ear ON ear.employee_id = e.id
            LEFT JOIN assets a ON a.id = ear.asset_id
            {where_clause}
            GROUP BY e.id
        ),
        counted AS (
            SELECT count(*) OVER () AS total_count, employee_rows.*
            FROM employee_rows
        )
        SELECT
            total_count, id, name, email, phone_no, status, employee_type,
            archived_at, archive_reason, deleted_by, asset_quantity
        FROM counted
        ORDER BY id
        {page_clause}
        "#
    )
}
