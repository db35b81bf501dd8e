//! Translation of [`FilterCriteria`] into the catalog's query parameters.
//!
//! The canonical form has a fixed key order and omits anything unset, so
//! equivalent criteria always produce byte-identical queries.

use tracing::trace;

use crate::models::{BeerId, BrewDate, FilterCriteria};

pub const KEY_PAGE: &str = "page";
pub const KEY_PER_PAGE: &str = "per_page";
pub const KEY_BEER_NAME: &str = "beer_name";
pub const KEY_IDS: &str = "ids";
pub const KEY_BREWED_BEFORE: &str = "brewed_before";
pub const KEY_BREWED_AFTER: &str = "brewed_after";
pub const KEY_ABV_GT: &str = "abv_gt";
pub const KEY_ABV_LT: &str = "abv_lt";
pub const KEY_IBU_GT: &str = "ibu_gt";
pub const KEY_IBU_LT: &str = "ibu_lt";
pub const KEY_EBC_GT: &str = "ebc_gt";
pub const KEY_EBC_LT: &str = "ebc_lt";
pub const KEY_FOOD: &str = "food";

/// Separator for the `ids` parameter.
pub const ID_DELIMITER: &str = ",";

/// Separator the catalog tokenizes multi-word text terms on.
pub const TERM_JOINER: &str = "_";

/// Ordered key/value pairs sent to `GET /beers`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalQuery {
    pairs: Vec<(String, String)>,
}

impl CanonicalQuery {
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// URL-encoded `key=value&...` form, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// Reads a query string back into pairs, dropping empty values.
    pub fn parse(query: &str) -> Self {
        let pairs = url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    fn push(&mut self, key: &str, value: Option<String>) {
        if let Some(value) = value {
            self.pairs.push((key.to_string(), value));
        }
    }
}

/// Builds the canonical query for `criteria`.
pub fn build(criteria: &FilterCriteria) -> CanonicalQuery {
    let mut query = CanonicalQuery::default();
    query.push(KEY_PAGE, positive(criteria.page));
    query.push(KEY_PER_PAGE, positive(criteria.per_page));
    query.push(KEY_BEER_NAME, term(criteria.name.as_deref()));
    query.push(KEY_IDS, id_list(criteria.ids.as_deref()));
    query.push(KEY_BREWED_BEFORE, criteria.brewed_before.map(|d| d.to_string()));
    query.push(KEY_BREWED_AFTER, criteria.brewed_after.map(|d| d.to_string()));
    query.push(KEY_ABV_GT, number(criteria.abv_gt));
    query.push(KEY_ABV_LT, number(criteria.abv_lt));
    query.push(KEY_IBU_GT, number(criteria.ibu_gt));
    query.push(KEY_IBU_LT, number(criteria.ibu_lt));
    query.push(KEY_EBC_GT, number(criteria.ebc_gt));
    query.push(KEY_EBC_LT, number(criteria.ebc_lt));
    query.push(KEY_FOOD, term(criteria.food.as_deref()));
    trace!(query = %query.to_query_string(), "Built catalog query");
    query
}

/// Collapses whitespace runs into the catalog's join character.
pub fn normalize_term(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(TERM_JOINER)
}

fn term(raw: Option<&str>) -> Option<String> {
    raw.map(normalize_term).filter(|t| !t.is_empty())
}

fn positive(value: Option<u32>) -> Option<String> {
    value.filter(|v| *v > 0).map(|v| v.to_string())
}

fn number(value: Option<f64>) -> Option<String> {
    value.filter(|v| v.is_finite()).map(|v| v.to_string())
}

fn id_list(ids: Option<&[BeerId]>) -> Option<String> {
    let mut ids = ids?.to_vec();
    if ids.is_empty() {
        return None;
    }
    ids.sort();
    ids.dedup();
    Some(
        ids.iter()
            .map(BeerId::to_string)
            .collect::<Vec<_>>()
            .join(ID_DELIMITER),
    )
}

impl FilterCriteria {
    /// Recovers criteria from a canonical query.
    ///
    /// Values that do not parse are dropped. Text terms come back in their
    /// normalized, underscore-joined form.
    pub fn from_query(query: &CanonicalQuery) -> Self {
        let text = |key: &str| query.get(key).map(str::to_string);
        let num = |key: &str| query.get(key).and_then(|v| v.parse::<f64>().ok());
        let count = |key: &str| query.get(key).and_then(|v| v.parse::<u32>().ok());
        let date = |key: &str| query.get(key).and_then(|v| v.parse::<BrewDate>().ok());

        let ids = query.get(KEY_IDS).map(|raw| {
            raw.split(ID_DELIMITER)
                .filter_map(|id| id.parse::<BeerId>().ok())
                .collect::<Vec<_>>()
        });

        Self {
            name: text(KEY_BEER_NAME),
            brewed_after: date(KEY_BREWED_AFTER),
            brewed_before: date(KEY_BREWED_BEFORE),
            abv_gt: num(KEY_ABV_GT),
            abv_lt: num(KEY_ABV_LT),
            ibu_gt: num(KEY_IBU_GT),
            ibu_lt: num(KEY_IBU_LT),
            ebc_gt: num(KEY_EBC_GT),
            ebc_lt: num(KEY_EBC_LT),
            food: text(KEY_FOOD),
            ids: ids.filter(|ids| !ids.is_empty()),
            page: count(KEY_PAGE),
            per_page: count(KEY_PER_PAGE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_criteria() -> FilterCriteria {
        FilterCriteria {
            name: Some("  punk   ipa ".to_string()),
            brewed_after: Some(BrewDate::start_of_year(2010).unwrap()),
            brewed_before: Some(BrewDate::end_of_year(2015).unwrap()),
            abv_gt: Some(4.5),
            abv_lt: Some(8.0),
            ibu_gt: Some(20.0),
            ibu_lt: Some(60.0),
            ebc_gt: Some(0.0),
            ebc_lt: Some(30.0),
            food: Some("spicy food".to_string()),
            ids: Some(vec![BeerId(9), BeerId(2), BeerId(9)]),
            page: Some(2),
            per_page: Some(20),
        }
    }

    #[test]
    fn test_empty_criteria_builds_empty_query() {
        let query = build(&FilterCriteria::default());
        assert!(query.is_empty());
        assert_eq!(query.to_query_string(), "");
    }

    #[test]
    fn test_every_present_field_appears_once_in_fixed_order() {
        let query = build(&full_criteria());
        let keys: Vec<&str> = query.pairs().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                KEY_PAGE,
                KEY_PER_PAGE,
                KEY_BEER_NAME,
                KEY_IDS,
                KEY_BREWED_BEFORE,
                KEY_BREWED_AFTER,
                KEY_ABV_GT,
                KEY_ABV_LT,
                KEY_IBU_GT,
                KEY_IBU_LT,
                KEY_EBC_GT,
                KEY_EBC_LT,
                KEY_FOOD,
            ]
        );
        assert_eq!(query.get(KEY_BEER_NAME), Some("punk_ipa"));
        assert_eq!(query.get(KEY_FOOD), Some("spicy_food"));
        assert_eq!(query.get(KEY_IDS), Some("2,9"));
        assert_eq!(query.get(KEY_BREWED_AFTER), Some("01/2010"));
        assert_eq!(query.get(KEY_BREWED_BEFORE), Some("12/2015"));
        assert_eq!(query.get(KEY_ABV_GT), Some("4.5"));
        assert_eq!(query.get(KEY_ABV_LT), Some("8"));
        assert_eq!(query.get(KEY_EBC_GT), Some("0"));
    }

    #[test]
    fn test_blank_and_placeholder_values_are_omitted() {
        let criteria = FilterCriteria {
            name: Some("   ".to_string()),
            food: Some(String::new()),
            ids: Some(Vec::new()),
            page: Some(0),
            per_page: Some(0),
            abv_gt: Some(f64::NAN),
            ..FilterCriteria::default()
        };
        assert!(build(&criteria).is_empty());
    }

    #[test]
    fn test_equivalent_criteria_build_identical_queries() {
        let a = FilterCriteria::new().with_ids([BeerId(5), BeerId(1), BeerId(3)]);
        let b = FilterCriteria::new().with_ids([BeerId(3), BeerId(5), BeerId(1), BeerId(1)]);
        assert_eq!(build(&a), build(&b));
        assert_eq!(build(&a).to_query_string(), "ids=1%2C3%2C5");
    }

    #[test]
    fn test_round_trip_recovers_present_fields() {
        let criteria = full_criteria();
        let query_string = build(&criteria).to_query_string();
        let recovered = FilterCriteria::from_query(&CanonicalQuery::parse(&query_string));

        let expected = FilterCriteria {
            name: Some("punk_ipa".to_string()),
            food: Some("spicy_food".to_string()),
            ids: Some(vec![BeerId(2), BeerId(9)]),
            ..criteria
        };
        assert_eq!(recovered, expected);
        assert_eq!(build(&recovered), build(&expected));
    }

    #[test]
    fn test_round_trip_of_partial_criteria() {
        let criteria = FilterCriteria::new()
            .with_abv(Some(5.0), None)
            .with_page(1, 20);
        let recovered = FilterCriteria::from_query(&CanonicalQuery::parse(
            &build(&criteria).to_query_string(),
        ));
        assert_eq!(recovered, criteria);
    }

    #[test]
    fn test_parse_ignores_leading_question_mark_and_empty_values() {
        let query = CanonicalQuery::parse("?page=1&beer_name=&food=cheese");
        assert_eq!(query.len(), 2);
        assert_eq!(query.get(KEY_PAGE), Some("1"));
        assert_eq!(query.get(KEY_FOOD), Some("cheese"));
    }
}
