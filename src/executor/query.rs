//! Analytical queries for Tabstore
//!
//! Every query is a read-only function over tables fetched from the store
//! by name. Numeric cells go through [`super::numeric`]: sums are lenient,
//! averages and rankings are strict.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use super::numeric::{parse_or_default, parse_or_exclude};
use crate::error::{Error, Result};
use crate::storage::{Record, Store, Table};

/// Group key used for absent or empty values, and for unmatched joins
pub const UNKNOWN: &str = "unknown";

/// A numeric expression evaluated per record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Measure {
    /// A single field
    Field(String),
    /// The product of two fields
    Product(String, String),
}

impl Measure {
    pub fn field(name: impl Into<String>) -> Self {
        Measure::Field(name.into())
    }

    pub fn product(left: impl Into<String>, right: impl Into<String>) -> Self {
        Measure::Product(left.into(), right.into())
    }

    /// Evaluate with unparsable fields counted as zero
    fn evaluate_lenient(&self, record: &Record) -> f64 {
        match self {
            Measure::Field(name) => parse_or_default(record.get(name)),
            Measure::Product(left, right) => {
                parse_or_default(record.get(left)) * parse_or_default(record.get(right))
            }
        }
    }
}

/// Row count of one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub key: String,
    pub count: usize,
}

/// Summed group enriched with a name from a dimension table
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    pub key: String,
    pub name: String,
    pub total: f64,
}

/// A record selected by [`top_ranked`] with its parsed values
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow<'a> {
    pub record: &'a Record,
    pub rank_value: f64,
    pub other_value: f64,
}

/// Parameters of a grouped top-N query joined to a dimension table
#[derive(Debug, Clone, Copy)]
pub struct TopGroups<'q> {
    /// Fact table holding the foreign key and the summed field
    pub fact: &'q str,
    pub foreign_key: &'q str,
    pub value_field: &'q str,
    pub limit: usize,
    /// Dimension table providing display names
    pub dimension: &'q str,
    pub id_field: &'q str,
    pub name_field: &'q str,
}

/// Parameters of an anti-join between a dimension and a fact table
#[derive(Debug, Clone, Copy)]
pub struct AntiJoin<'q> {
    pub dimension: &'q str,
    pub id_field: &'q str,
    pub fact: &'q str,
    pub foreign_key: &'q str,
}

fn require_field(table: &Table, field: &str) -> Result<()> {
    if table.header().contains(field) {
        Ok(())
    } else {
        Err(Error::UnknownField {
            field: field.to_string(),
            table: table.name().to_string(),
        })
    }
}

fn group_key(record: &Record, field: &str) -> String {
    match record.get(field) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Sum `measure` over the records whose `field` equals `value`.
///
/// Unparsable numbers count as zero; the row still contributes.
pub fn filtered_sum(
    store: &Store,
    table: &str,
    field: &str,
    value: &str,
    measure: &Measure,
) -> Result<f64> {
    let table = store.table(table)?;
    Ok(table
        .all()
        .filter(|r| r.get(field) == Some(value))
        .map(|r| measure.evaluate_lenient(r))
        .sum())
}

/// Average `field` over the records where it parses.
///
/// Unparsable rows are left out of both the sum and the count. Returns
/// `None` when no row parses.
pub fn average(store: &Store, table: &str, field: &str) -> Result<Option<f64>> {
    let table = store.table(table)?;
    let (sum, count) = table
        .all()
        .filter_map(|r| parse_or_exclude(r.get(field)))
        .fold((0.0, 0usize), |(sum, count), n| (sum + n, count + 1));

    if count == 0 {
        return Ok(None);
    }
    Ok(Some(sum / count as f64))
}

/// Count records per distinct value of `field`, in first-seen order
pub fn group_count(store: &Store, table: &str, field: &str) -> Result<Vec<GroupCount>> {
    let table = store.table(table)?;
    let mut groups: IndexMap<String, usize> = IndexMap::new();
    for record in table.all() {
        *groups.entry(group_key(record, field)).or_default() += 1;
    }

    Ok(groups
        .into_iter()
        .map(|(key, count)| GroupCount { key, count })
        .collect())
}

/// Sum a fact field per foreign key, keep the `limit` largest groups and
/// attach the matching dimension name.
///
/// Equal totals keep their first-seen order. A key with no dimension
/// record is named [`UNKNOWN`]. Fact rows with an absent or empty foreign
/// key are summed into a separate [`UNKNOWN`] group that is never looked
/// up in the dimension.
pub fn top_groups(store: &Store, query: &TopGroups<'_>) -> Result<Vec<GroupTotal>> {
    let fact = store.table(query.fact)?;
    let dimension = store.table(query.dimension)?;
    require_field(fact, query.foreign_key)?;
    require_field(dimension, query.id_field)?;

    let mut totals: IndexMap<Option<&str>, f64> = IndexMap::new();
    for record in fact.all() {
        let key = record.get(query.foreign_key).filter(|k| !k.is_empty());
        *totals.entry(key).or_default() += parse_or_default(record.get(query.value_field));
    }

    let mut ranked: Vec<(Option<&str>, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(query.limit);

    // First record wins when identifiers repeat
    let mut names: HashMap<&str, &str> = HashMap::new();
    for record in dimension.all() {
        if let Some(id) = record.get(query.id_field) {
            names
                .entry(id)
                .or_insert_with(|| record.get(query.name_field).unwrap_or(UNKNOWN));
        }
    }

    Ok(ranked
        .into_iter()
        .map(|(key, total)| match key {
            Some(key) => GroupTotal {
                key: key.to_string(),
                name: names.get(key).copied().unwrap_or(UNKNOWN).to_string(),
                total,
            },
            None => GroupTotal {
                key: UNKNOWN.to_string(),
                name: UNKNOWN.to_string(),
                total,
            },
        })
        .collect())
}

/// Keep the records where both fields parse, ordered by `rank_field`
/// descending, and return the first `limit`.
pub fn top_ranked<'s>(
    store: &'s Store,
    table: &str,
    rank_field: &str,
    other_field: &str,
    limit: usize,
) -> Result<Vec<RankedRow<'s>>> {
    let table = store.table(table)?;
    let mut rows: Vec<RankedRow<'s>> = table
        .all()
        .filter_map(|record| {
            let rank_value = parse_or_exclude(record.get(rank_field))?;
            let other_value = parse_or_exclude(record.get(other_field))?;
            Some(RankedRow {
                record,
                rank_value,
                other_value,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.rank_value.total_cmp(&a.rank_value));
    rows.truncate(limit);
    Ok(rows)
}

/// Dimension records whose identifier never appears as a foreign key in
/// the fact table, in dimension order. Empty foreign keys reference
/// nothing.
pub fn anti_join<'s>(store: &'s Store, query: &AntiJoin<'_>) -> Result<Vec<&'s Record>> {
    let dimension = store.table(query.dimension)?;
    let fact = store.table(query.fact)?;
    require_field(dimension, query.id_field)?;
    require_field(fact, query.foreign_key)?;

    let referenced: HashSet<&str> = fact
        .all()
        .filter_map(|r| r.get(query.foreign_key))
        .filter(|k| !k.is_empty())
        .collect();

    Ok(dimension
        .all()
        .filter(|r| {
            r.get(query.id_field)
                .map_or(true, |id| !referenced.contains(id))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TableBuilder;

    fn create_test_store() -> Store {
        let products = TableBuilder::new("products")
            .fields(["ID", "Name", "Category", "Qty", "Price"])
            .row(["1", "Racer", "RC 12+", "3", "4"])
            .row(["2", "Jet", "RC 12+", "x", "5"])
            .row(["3", "Doll", "Dolls", "2", "7"])
            .row(["4", "Blocks", "", "1", "abc"])
            .into_source();
        let stores = TableBuilder::new("stores")
            .fields(["ID", "Title"])
            .row(["A", "Central"])
            .row(["B", "Harbor"])
            .row(["C", "Outlet"])
            .into_source();
        let sales = TableBuilder::new("sales")
            .fields(["ID", "StoreID", "Amount"])
            .row(["1", "A", "10"])
            .row(["2", "A", "5"])
            .row(["3", "B", "7"])
            .row(["4", "Z", "1"])
            .into_source();
        Store::load(vec![products, stores, sales]).unwrap()
    }

    #[test]
    fn test_filtered_sum_is_lenient() {
        let store = create_test_store();
        let total = filtered_sum(
            &store,
            "products",
            "Category",
            "RC 12+",
            &Measure::product("Qty", "Price"),
        )
        .unwrap();
        assert_eq!(total, 12.0);
    }

    #[test]
    fn test_filtered_sum_no_match() {
        let store = create_test_store();
        let total =
            filtered_sum(&store, "products", "Category", "Games", &Measure::field("Qty")).unwrap();
        assert_eq!(total, 0.0);
    }

    #[test]
    fn test_average_excludes_unparsable() {
        let store = create_test_store();
        let avg = average(&store, "products", "Price").unwrap().unwrap();
        assert!((avg - 16.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_without_numbers() {
        let store = create_test_store();
        assert_eq!(average(&store, "stores", "Title").unwrap(), None);
    }

    #[test]
    fn test_group_count_first_seen_order() {
        let store = create_test_store();
        let groups = group_count(&store, "products", "Category").unwrap();

        let pairs: Vec<(&str, usize)> = groups.iter().map(|g| (g.key.as_str(), g.count)).collect();
        assert_eq!(pairs, vec![("RC 12+", 2), ("Dolls", 1), (UNKNOWN, 1)]);
    }

    #[test]
    fn test_group_count_absent_field() {
        let store = create_test_store();
        let groups = group_count(&store, "stores", "District").unwrap();
        assert_eq!(
            groups,
            vec![GroupCount {
                key: UNKNOWN.to_string(),
                count: 3
            }]
        );
    }

    #[test]
    fn test_top_groups_with_names() {
        let store = create_test_store();
        let query = TopGroups {
            fact: "sales",
            foreign_key: "StoreID",
            value_field: "Amount",
            limit: 3,
            dimension: "stores",
            id_field: "ID",
            name_field: "Title",
        };

        let result = top_groups(&store, &query).unwrap();
        assert_eq!(
            result,
            vec![
                GroupTotal {
                    key: "A".to_string(),
                    name: "Central".to_string(),
                    total: 15.0
                },
                GroupTotal {
                    key: "B".to_string(),
                    name: "Harbor".to_string(),
                    total: 7.0
                },
                GroupTotal {
                    key: "Z".to_string(),
                    name: UNKNOWN.to_string(),
                    total: 1.0
                },
            ]
        );
    }

    #[test]
    fn test_top_groups_stable_ties() {
        let sales = TableBuilder::new("sales")
            .fields(["StoreID", "Amount"])
            .row(["B", "5"])
            .row(["A", "5"])
            .into_source();
        let stores = TableBuilder::new("stores").fields(["ID", "Title"]).into_source();
        let store = Store::load(vec![sales, stores]).unwrap();

        let query = TopGroups {
            fact: "sales",
            foreign_key: "StoreID",
            value_field: "Amount",
            limit: 1,
            dimension: "stores",
            id_field: "ID",
            name_field: "Title",
        };
        let result = top_groups(&store, &query).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].key, "B");
    }

    #[test]
    fn test_top_groups_missing_dimension() {
        let store = create_test_store();
        let query = TopGroups {
            fact: "sales",
            foreign_key: "StoreID",
            value_field: "Amount",
            limit: 1,
            dimension: "regions",
            id_field: "ID",
            name_field: "Title",
        };
        assert!(matches!(
            top_groups(&store, &query),
            Err(Error::MissingTable(t)) if t == "regions"
        ));
    }

    #[test]
    fn test_top_groups_blank_key_not_joined() {
        let sales = TableBuilder::new("sales")
            .fields(["StoreID", "Amount"])
            .row(["", "9"])
            .row(["A", "1"])
            .into_source();
        let stores = TableBuilder::new("stores")
            .fields(["ID", "Title"])
            .row(["unknown", "Real store"])
            .row(["", "Blank store"])
            .into_source();
        let store = Store::load(vec![sales, stores]).unwrap();

        let query = TopGroups {
            fact: "sales",
            foreign_key: "StoreID",
            value_field: "Amount",
            limit: 5,
            dimension: "stores",
            id_field: "ID",
            name_field: "Title",
        };
        let result = top_groups(&store, &query).unwrap();
        assert_eq!(
            result,
            vec![
                GroupTotal {
                    key: UNKNOWN.to_string(),
                    name: UNKNOWN.to_string(),
                    total: 9.0
                },
                GroupTotal {
                    key: "A".to_string(),
                    name: UNKNOWN.to_string(),
                    total: 1.0
                },
            ]
        );
    }

    #[test]
    fn test_filtered_sum_product_of_two_fields() {
        let store = create_test_store();
        let measure = Measure::product("Qty", "Missing");
        let total = filtered_sum(&store, "products", "Category", "RC 12+", &measure).unwrap();
        assert_eq!(total, 0.0);
        assert_eq!(measure, Measure::Product("Qty".to_string(), "Missing".to_string()));
    }

    #[test]
    fn test_top_ranked_requires_both_fields() {
        let store = create_test_store();
        let rows = top_ranked(&store, "products", "Price", "Qty", 5).unwrap();

        let ids: Vec<&str> = rows.iter().filter_map(|r| r.record.get("ID")).collect();
        assert_eq!(ids, vec!["3", "1"]);
        assert_eq!(rows[0].rank_value, 7.0);
        assert_eq!(rows[0].other_value, 2.0);
    }

    #[test]
    fn test_top_ranked_limit() {
        let store = create_test_store();
        let rows = top_ranked(&store, "products", "Price", "Qty", 1).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.get("Name"), Some("Doll"));
    }

    #[test]
    fn test_anti_join() {
        let store = create_test_store();
        let query = AntiJoin {
            dimension: "stores",
            id_field: "ID",
            fact: "sales",
            foreign_key: "StoreID",
        };

        let orphans = anti_join(&store, &query).unwrap();
        let ids: Vec<&str> = orphans.iter().filter_map(|r| r.get("ID")).collect();
        assert_eq!(ids, vec!["C"]);
    }

    #[test]
    fn test_anti_join_unknown_key_field() {
        let store = create_test_store();
        let query = AntiJoin {
            dimension: "stores",
            id_field: "ID",
            fact: "sales",
            foreign_key: "ShopID",
        };
        assert!(matches!(anti_join(&store, &query), Err(Error::UnknownField { .. })));
    }

    #[test]
    fn test_anti_join_ignores_blank_keys() {
        let sales = TableBuilder::new("sales")
            .fields(["StoreID", "Amount"])
            .row(["", "9"])
            .into_source();
        let stores = TableBuilder::new("stores")
            .fields(["ID", "Title"])
            .row(["", "Blank store"])
            .into_source();
        let store = Store::load(vec![sales, stores]).unwrap();

        let query = AntiJoin {
            dimension: "stores",
            id_field: "ID",
            fact: "sales",
            foreign_key: "StoreID",
        };
        let orphans = anti_join(&store, &query).unwrap();
        assert_eq!(orphans.len(), 1);
    }
}
