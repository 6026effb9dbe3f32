//! Listing executor against an in-memory store that evaluates the composed
//! clause list and page window the way the SQL does.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Months, Utc};
use uuid::Uuid;

use am_core::AssetType;
use am_db::listing::{AssetQuantitySummary, AssetRow, EmployeeRow, ListingExecutor, ListingStore};
use am_db::repository::RepositoryResult;
use am_queries::{ComposedQuery, Group, ListingMode, Predicate};

struct MemoryStore {
    assets: Vec<AssetRow>,
    employees: Vec<EmployeeRow>,
}

trait Listed: Clone {
    fn id(&self) -> Uuid;
    fn set_total(&mut self, total: i64);
    fn matches(&self, predicate: &Predicate, now: DateTime<Utc>) -> bool;
    /// Fixed scope of the default asset listing
    fn in_scope(&self, mode: ListingMode) -> bool;
}

impl Listed for AssetRow {
    fn id(&self) -> Uuid {
        self.id
    }

    fn set_total(&mut self, total: i64) {
        self.total_count = total;
    }

    fn matches(&self, predicate: &Predicate, now: DateTime<Utc>) -> bool {
        match predicate {
            Predicate::Status(status) => self.status == status.as_str(),
            Predicate::TypeIn(types) => types.iter().any(|t| t.as_str() == self.asset_type),
            Predicate::NameContains(text) => {
                self.brand.to_lowercase().contains(&text.to_lowercase())
            }
            Predicate::WarrantyWithin(months) => {
                let end = now + Months::new(*months);
                self.warranty_expiry_date >= now && self.warranty_expiry_date < end
            }
            Predicate::Expired => self.warranty_expiry_date < now,
            Predicate::IdEquals(id) => self.id == *id,
        }
    }

    // fixtures archive exactly the deleted assets
    fn in_scope(&self, mode: ListingMode) -> bool {
        mode != ListingMode::AssetDefault || self.status != "deleted"
    }
}

impl Listed for EmployeeRow {
    fn id(&self) -> Uuid {
        self.id
    }

    fn set_total(&mut self, total: i64) {
        self.total_count = total;
    }

    fn matches(&self, predicate: &Predicate, _now: DateTime<Utc>) -> bool {
        match predicate {
            Predicate::Status(status) => self.status == status.as_str(),
            Predicate::NameContains(text) => {
                self.name.to_lowercase().contains(&text.to_lowercase())
            }
            Predicate::IdEquals(id) => self.id == *id,
            other => panic!("unexpected employee predicate {other:?}"),
        }
    }

    fn in_scope(&self, _mode: ListingMode) -> bool {
        true
    }
}

fn evaluate<T: Listed>(query: &ComposedQuery, rows: &[T]) -> Vec<T> {
    let now = Utc::now();
    let mode = query.mode.expect("listing queries carry a mode");

    let mut matched: Vec<T> = rows
        .iter()
        .filter(|row| row.in_scope(mode))
        .filter(|row| {
            let statuses: Vec<_> = query
                .clauses
                .iter()
                .filter(|c| c.group() == Group::Status)
                .collect();
            let status_ok =
                statuses.is_empty() || statuses.iter().any(|c| row.matches(&c.predicate, now));
            let constraints_ok = query
                .clauses
                .iter()
                .filter(|c| c.group() == Group::Constraint)
                .all(|c| row.matches(&c.predicate, now));
            status_ok && constraints_ok
        })
        .cloned()
        .collect();

    matched.sort_by_key(|row| row.id());
    let total = matched.len() as i64;
    for row in &mut matched {
        row.set_total(total);
    }

    match query.window {
        Some(window) => matched
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .collect(),
        None => matched,
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn fetch_assets(&self, query: &ComposedQuery) -> RepositoryResult<Vec<AssetRow>> {
        Ok(evaluate(query, &self.assets))
    }

    async fn fetch_employees(&self, query: &ComposedQuery) -> RepositoryResult<Vec<EmployeeRow>> {
        Ok(evaluate(query, &self.employees))
    }

    async fn fetch_quantities(
        &self,
        _query: &ComposedQuery,
    ) -> RepositoryResult<AssetQuantitySummary> {
        Ok(AssetQuantitySummary::default())
    }
}

fn asset(asset_type: AssetType, brand: &str, status: &str, expires_in_days: i64) -> AssetRow {
    let now = Utc::now();
    AssetRow {
        total_count: 0,
        id: Uuid::new_v4(),
        brand: brand.to_string(),
        model: "M1".to_string(),
        serial_no: Uuid::new_v4().to_string(),
        asset_type: asset_type.as_str().to_string(),
        purchased_date: now - Duration::days(400),
        warranty_start_date: now - Duration::days(400),
        warranty_expiry_date: now + Duration::days(expires_in_days),
        status: status.to_string(),
        assigned_to_id: None,
        assigned_to: None,
    }
}

fn employee(name: &str, status: &str) -> EmployeeRow {
    EmployeeRow {
        total_count: 0,
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone_no: "9876543210".to_string(),
        status: status.to_string(),
        employee_type: "full_time".to_string(),
        archived_at: None,
        archive_reason: None,
        deleted_by: None,
        asset_quantity: 0,
    }
}

/// 25 available laptops, 5 assigned mice, 2 deleted hard disks
fn inventory() -> MemoryStore {
    let mut assets = Vec::new();
    for i in 0..25 {
        let brand = if i % 5 == 0 { "Lenovo" } else { "Dell" };
        assets.push(asset(AssetType::Laptop, brand, "available", 700));
    }
    for _ in 0..5 {
        assets.push(asset(AssetType::Mouse, "Logitech", "assigned", 30));
    }
    for _ in 0..2 {
        assets.push(asset(AssetType::HardDisk, "Seagate", "deleted", -10));
    }

    MemoryStore {
        assets,
        employees: vec![
            employee("Asha", "active"),
            employee("Ravi", "active"),
            employee("Meera", "deleted"),
            employee("Kabir", "not_an_employee"),
        ],
    }
}

fn spec(pairs: &[(&str, &str)]) -> am_queries::FilterSpec {
    let mut params = am_queries::FilterParams::default();
    for (key, value) in pairs {
        let value = Some(value.to_string());
        match *key {
            "name" => params.name = value,
            "limit" => params.limit = value,
            "page" => params.page = value,
            "pagination" => params.pagination = value,
            "available" => params.available = value,
            "assigned" => params.assigned = value,
            "deleted" => params.deleted = value,
            "notAnEmployee" => params.not_an_employee = value,
            "assetType" => params.asset_type = value,
            "warranty" => params.warranty = value,
            other => panic!("unknown parameter {other}"),
        }
    }
    am_queries::FilterSpec::try_from(params).unwrap()
}

#[tokio::test]
async fn count_and_rows_stay_coherent_across_pages() {
    let executor = ListingExecutor::new(inventory());

    let first = executor
        .list_asset_page(&spec(&[("assetType", "laptop"), ("limit", "10"), ("page", "0")]))
        .await
        .unwrap();
    assert_eq!(first.rows.len(), 10);
    assert_eq!(first.total_count, 25);

    let last = executor
        .list_asset_page(&spec(&[("assetType", "laptop"), ("limit", "10"), ("page", "2")]))
        .await
        .unwrap();
    assert_eq!(last.rows.len(), 5);
    assert_eq!(last.total_count, 25);

    let first_ids: Vec<_> = first.rows.iter().map(|r| r.id).collect();
    assert!(last.rows.iter().all(|r| !first_ids.contains(&r.id)));
}

#[tokio::test]
async fn page_past_the_end_is_empty() {
    let executor = ListingExecutor::new(inventory());
    let page = executor
        .list_asset_page(&spec(&[("assetType", "laptop"), ("page", "3")]))
        .await
        .unwrap();
    assert!(page.rows.is_empty());
    assert_eq!(page.total_count, 0);
}

#[tokio::test]
async fn no_matches_is_an_empty_page_not_an_error() {
    let executor = ListingExecutor::new(inventory());
    let page = executor
        .list_asset_page(&spec(&[("name", "apple")]))
        .await
        .unwrap();
    assert!(page.rows.is_empty());
    assert_eq!(page.total_count, 0);

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json, serde_json::json!({"rows": [], "totalCount": 0}));
}

#[tokio::test]
async fn unpaginated_listing_returns_everything_with_total() {
    let executor = ListingExecutor::new(inventory());
    let page = executor
        .list_asset_page(&spec(&[("pagination", "false")]))
        .await
        .unwrap();
    // default listing excludes archived assets
    assert_eq!(page.rows.len(), 30);
    assert_eq!(page.total_count, 30);
}

#[tokio::test]
async fn empty_type_set_matches_all_types() {
    let executor = ListingExecutor::new(inventory());
    let page = executor
        .list_assets_filtered(&spec(&[("available", "true"), ("assigned", "true")]))
        .await
        .unwrap();
    assert_eq!(page.total_count, 30);
    let types: std::collections::BTreeSet<_> =
        page.rows.iter().map(|r| r.asset_type.clone()).collect();
    assert!(types.contains("laptop"));
}

#[tokio::test]
async fn status_flags_combine_with_or_and_constraints_with_and() {
    let executor = ListingExecutor::new(inventory());

    let page = executor
        .list_asset_page(&spec(&[
            ("assigned", "true"),
            ("deleted", "true"),
            ("pagination", "false"),
        ]))
        .await
        .unwrap();
    assert_eq!(page.total_count, 7);

    let page = executor
        .list_asset_page(&spec(&[
            ("assigned", "true"),
            ("deleted", "true"),
            ("assetType", "hard disk"),
        ]))
        .await
        .unwrap();
    assert_eq!(page.total_count, 2);
    assert!(page.rows.iter().all(|r| r.status == "deleted"));
}

#[tokio::test]
async fn name_search_is_case_insensitive_substring() {
    let executor = ListingExecutor::new(inventory());
    let page = executor
        .list_asset_page(&spec(&[("name", "NOV"), ("pagination", "false")]))
        .await
        .unwrap();
    assert_eq!(page.total_count, 5);
    assert!(page.rows.iter().all(|r| r.brand == "Lenovo"));
}

#[tokio::test]
async fn warranty_window_and_expiry_select_disjoint_sets() {
    let executor = ListingExecutor::new(inventory());

    let expiring = executor
        .list_asset_page(&spec(&[("warranty", "3"), ("pagination", "false")]))
        .await
        .unwrap();
    assert_eq!(expiring.total_count, 5);
    assert!(expiring.rows.iter().all(|r| r.asset_type == "mouse"));

    let expired = executor
        .list_asset_page(&spec(&[
            ("warranty", "0"),
            ("deleted", "true"),
            ("pagination", "false"),
        ]))
        .await
        .unwrap();
    assert_eq!(expired.total_count, 2);
    assert!(expired.rows.iter().all(|r| r.asset_type == "hard disk"));
}

#[tokio::test]
async fn employees_default_to_active() {
    let executor = ListingExecutor::new(inventory());
    let page = executor.list_employees(&spec(&[])).await.unwrap();
    assert_eq!(page.total_count, 2);
    assert!(page.rows.iter().all(|r| r.status == "active"));
}

#[tokio::test]
async fn employees_deleted_or_not_an_employee() {
    let executor = ListingExecutor::new(inventory());
    let page = executor
        .list_employees(&spec(&[("deleted", "true"), ("notAnEmployee", "true")]))
        .await
        .unwrap();
    let mut names: Vec<_> = page.rows.iter().map(|r| r.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Kabir", "Meera"]);
    assert_eq!(page.total_count, 2);
}

#[tokio::test]
async fn employee_exact_id() {
    let store = inventory();
    let target = store.employees[1].id;
    let executor = ListingExecutor::new(store);

    let page = executor
        .list_employees(&spec(&[]).with_employee_id(target))
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.rows[0].name, "Ravi");
}
