use std::collections::HashMap;

use serde::Serialize;

/// Default nameplate ratings in watts, in menu order.
pub const BUILTIN_RATINGS: &[(&str, u32)] = &[
    ("Air Conditioner", 2000),
    ("Refrigerator", 150),
    ("Washing Machine", 500),
    ("Microwave", 1200),
    ("TV", 100),
    ("Laptop", 50),
    ("Fan", 75),
    ("Light", 10),
    ("Mobile", 5),
    ("Air Purifier", 60),
    ("Air Fryer", 1500),
    ("Oven", 1800),
    ("Kettle", 1200),
    ("Ironbox", 1000),
    ("Heater", 1500),
];

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplianceRating {
    /// Appliance type name as shown in selection menus.
    pub name: String,
    /// Nameplate power draw in watts.
    pub watts: u32,
}

/// Immutable lookup table from appliance name to nameplate wattage.
///
/// Built once at startup and shared read-only afterwards. Names that are not
/// in the table resolve to 0 W, so unknown appliances carry no weight in an
/// allocation.
///
/// # Examples
///
/// ```
/// use smart_power::appliances::ApplianceCatalog;
///
/// let catalog = ApplianceCatalog::builtin();
/// assert_eq!(catalog.wattage("Fan"), 75);
/// assert_eq!(catalog.wattage("Toaster"), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ApplianceCatalog {
    ratings: Vec<ApplianceRating>,
    index: HashMap<String, usize>,
}

impl ApplianceCatalog {
    /// Returns the catalog of the 15 builtin household appliances.
    pub fn builtin() -> Self {
        Self::from_ratings(
            BUILTIN_RATINGS
                .iter()
                .map(|&(name, watts)| (name.to_string(), watts)),
        )
    }

    /// Builds a catalog from `(name, watts)` pairs.
    ///
    /// Listing order follows first appearance. A repeated name keeps its
    /// original position but takes the later wattage.
    pub fn from_ratings<I, S>(ratings: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut catalog = Self {
            ratings: Vec::new(),
            index: HashMap::new(),
        };
        for (name, watts) in ratings {
            catalog.insert(name.into(), watts);
        }
        catalog
    }

    fn insert(&mut self, name: String, watts: u32) {
        if let Some(&i) = self.index.get(&name) {
            self.ratings[i].watts = watts;
        } else {
            self.index.insert(name.clone(), self.ratings.len());
            self.ratings.push(ApplianceRating { name, watts });
        }
    }

    /// Returns the nameplate wattage for `name`, or 0 if it is not listed.
    pub fn wattage(&self, name: &str) -> u32 {
        self.index.get(name).map_or(0, |&i| self.ratings[i].watts)
    }

    /// Returns `true` if `name` has an entry.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterates over entries in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &ApplianceRating> {
        self.ratings.iter()
    }

    /// Iterates over appliance names in listing order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ratings.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

impl Default for ApplianceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_fifteen_entries() {
        let catalog = ApplianceCatalog::builtin();
        assert_eq!(catalog.len(), 15);
        assert_eq!(catalog.names().next(), Some("Air Conditioner"));
        assert_eq!(catalog.names().last(), Some("Heater"));
    }

    #[test]
    fn builtin_wattages() {
        let catalog = ApplianceCatalog::builtin();
        assert_eq!(catalog.wattage("Refrigerator"), 150);
        assert_eq!(catalog.wattage("Oven"), 1800);
        assert_eq!(catalog.wattage("Mobile"), 5);
    }

    #[test]
    fn unknown_name_is_zero_watts() {
        let catalog = ApplianceCatalog::builtin();
        assert_eq!(catalog.wattage("UnknownGadget"), 0);
        assert!(!catalog.contains("UnknownGadget"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let catalog = ApplianceCatalog::builtin();
        assert_eq!(catalog.wattage("fan"), 0);
    }

    #[test]
    fn repeated_name_overrides_in_place() {
        let catalog = ApplianceCatalog::from_ratings([("Fan", 75), ("TV", 100), ("Fan", 60)]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.wattage("Fan"), 60);
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, vec!["Fan", "TV"]);
    }

    #[test]
    fn empty_catalog() {
        let catalog = ApplianceCatalog::from_ratings(Vec::<(String, u32)>::new());
        assert!(catalog.is_empty());
        assert_eq!(catalog.wattage("Fan"), 0);
    }
}
