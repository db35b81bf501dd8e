use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;
use crate::models::BeerId;

/// A month/year bound on when a beer was first brewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BrewDate {
    year: u16,
    month: u8,
}

impl BrewDate {
    pub fn new(month: u8, year: u16) -> Result<Self, FilterError> {
        if !(1..=12).contains(&month) {
            return Err(FilterError::InvalidMonth(month));
        }
        if year > 9999 {
            return Err(FilterError::InvalidYear(year.to_string()));
        }
        Ok(Self { year, month })
    }

    /// January of `year`; the inclusive lower bound for a year filter.
    pub fn start_of_year(year: u16) -> Result<Self, FilterError> {
        Self::new(1, year)
    }

    /// December of `year`; the inclusive upper bound for a year filter.
    pub fn end_of_year(year: u16) -> Result<Self, FilterError> {
        Self::new(12, year)
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn year(&self) -> u16 {
        self.year
    }
}

impl fmt::Display for BrewDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

impl FromStr for BrewDate {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (month, year) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| FilterError::InvalidDate(s.to_string()))?;
        let month: u8 = month
            .parse()
            .map_err(|_| FilterError::InvalidDate(s.to_string()))?;
        let year = parse_year(year)?;
        Self::new(month, year)
    }
}

fn parse_year(raw: &str) -> Result<u16, FilterError> {
    if raw.len() != 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FilterError::InvalidYear(raw.to_string()));
    }
    raw.parse()
        .map_err(|_| FilterError::InvalidYear(raw.to_string()))
}

/// User supplied filters for a catalog listing.
///
/// Every field is optional; `None` means "do not constrain". Text fields are
/// kept as typed and normalized only when the remote query is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub name: Option<String>,
    pub brewed_after: Option<BrewDate>,
    pub brewed_before: Option<BrewDate>,
    pub abv_gt: Option<f64>,
    pub abv_lt: Option<f64>,
    pub ibu_gt: Option<f64>,
    pub ibu_lt: Option<f64>,
    pub ebc_gt: Option<f64>,
    pub ebc_lt: Option<f64>,
    pub food: Option<String>,
    /// Explicit id override; only the favorites view sets this.
    pub ids: Option<Vec<BeerId>>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_food(mut self, food: impl Into<String>) -> Self {
        self.food = Some(food.into());
        self
    }

    pub fn with_abv(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.abv_gt = min;
        self.abv_lt = max;
        self
    }

    pub fn with_ibu(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.ibu_gt = min;
        self.ibu_lt = max;
        self
    }

    pub fn with_ebc(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.ebc_gt = min;
        self.ebc_lt = max;
        self
    }

    pub fn with_ids(mut self, ids: impl IntoIterator<Item = BeerId>) -> Self {
        self.ids = Some(ids.into_iter().collect());
        self
    }

    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.page = Some(page);
        self.per_page = Some(per_page);
        self
    }

    /// Sets the lower date bound from a year field.
    ///
    /// An empty input clears the bound. Anything but four ASCII digits
    /// leaves it unset, matching a form field that is still being typed.
    pub fn set_brewed_after_year(&mut self, input: &str) {
        self.brewed_after = year_bound(input, BrewDate::start_of_year);
    }

    /// Sets the upper date bound from a year field, see
    /// [`set_brewed_after_year`](Self::set_brewed_after_year).
    pub fn set_brewed_before_year(&mut self, input: &str) {
        self.brewed_before = year_bound(input, BrewDate::end_of_year);
    }

    /// Copy of these filters without pagination, for comparing two
    /// requests that differ only by page.
    pub fn without_paging(&self) -> Self {
        Self {
            page: None,
            per_page: None,
            ..self.clone()
        }
    }
}

fn year_bound(
    input: &str,
    bound: fn(u16) -> Result<BrewDate, FilterError>,
) -> Option<BrewDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    parse_year(input).and_then(bound).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brew_date_renders_month_year() {
        let date = BrewDate::new(3, 2011).unwrap();
        assert_eq!(date.to_string(), "03/2011");
        assert_eq!("03/2011".parse::<BrewDate>().unwrap(), date);
    }

    #[test]
    fn test_brew_date_rejects_bad_month() {
        assert!(matches!(BrewDate::new(0, 2011), Err(FilterError::InvalidMonth(0))));
        assert!(matches!(BrewDate::new(13, 2011), Err(FilterError::InvalidMonth(13))));
        assert!("13/2011".parse::<BrewDate>().is_err());
        assert!("2011".parse::<BrewDate>().is_err());
        assert!("01/11".parse::<BrewDate>().is_err());
    }

    #[test]
    fn test_year_inputs_expand_to_inclusive_bounds() {
        let mut criteria = FilterCriteria::new();
        criteria.set_brewed_after_year("2010");
        criteria.set_brewed_before_year("2015");
        assert_eq!(criteria.brewed_after.unwrap().to_string(), "01/2010");
        assert_eq!(criteria.brewed_before.unwrap().to_string(), "12/2015");

        criteria.set_brewed_after_year("201");
        assert!(criteria.brewed_after.is_none());

        criteria.set_brewed_before_year("");
        assert!(criteria.brewed_before.is_none());
    }

    #[test]
    fn test_without_paging() {
        let criteria = FilterCriteria::new().with_name("punk").with_page(3, 20);
        let bare = criteria.without_paging();
        assert_eq!(bare.name.as_deref(), Some("punk"));
        assert!(bare.page.is_none());
        assert!(bare.per_page.is_none());
    }
}
