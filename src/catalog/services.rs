use rand::{seq::SliceRandom, Rng};

use super::dto::Facets;
use super::repo::Supplement;

/// Price slider maximum; a ceiling at or above it does not count as a filter.
pub const PRICE_CEILING: f64 = 3000.0;
pub const TOP_RATED: usize = 20;
pub const RECOMMENDED: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub text: String,
    pub max_price: f64,
    pub categories: Vec<String>,
    pub brands: Vec<String>,
    pub min_rating: f64,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            text: String::new(),
            max_price: PRICE_CEILING,
            categories: Vec::new(),
            brands: Vec::new(),
            min_rating: 0.0,
        }
    }
}

impl SearchFilter {
    pub fn is_active(&self) -> bool {
        !self.text.is_empty()
            || self.max_price < PRICE_CEILING
            || !self.categories.is_empty()
            || !self.brands.is_empty()
            || self.min_rating > 0.0
    }

    pub fn matches(&self, s: &Supplement) -> bool {
        let needle = self.text.to_lowercase();
        let text_ok = needle.is_empty()
            || s.name.to_lowercase().contains(&needle)
            || s.brand.to_lowercase().contains(&needle);

        text_ok
            && s.price <= self.max_price
            && (self.categories.is_empty() || self.categories.contains(&s.category))
            && (self.brands.is_empty() || self.brands.contains(&s.brand))
            && s.rating >= self.min_rating
    }
}

/// Highest rated first; ties keep catalog order.
pub fn top_rated(mut catalog: Vec<Supplement>, n: usize) -> Vec<Supplement> {
    catalog.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    catalog.truncate(n);
    catalog
}

/// All matches for an active filter, otherwise the top rated products.
pub fn search(catalog: Vec<Supplement>, filter: &SearchFilter) -> Vec<Supplement> {
    if filter.is_active() {
        catalog.into_iter().filter(|s| filter.matches(s)).collect()
    } else {
        top_rated(catalog, TOP_RATED)
    }
}

pub fn facets(catalog: &[Supplement]) -> Facets {
    let mut out = Facets::default();
    for s in catalog {
        if !out.categories.contains(&s.category) {
            out.categories.push(s.category.clone());
        }
        if !out.brands.contains(&s.brand) {
            out.brands.push(s.brand.clone());
        }
    }
    out
}

pub fn recommend<R: Rng + ?Sized>(catalog: Vec<Supplement>, rng: &mut R) -> Vec<Supplement> {
    let mut top = top_rated(catalog, TOP_RATED);
    top.shuffle(rng);
    top.truncate(RECOMMENDED);
    top
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    pub(crate) fn supplement(id: i64, name: &str, brand: &str, price: f64, category: &str, rating: f64) -> Supplement {
        Supplement {
            id,
            name: name.into(),
            brand: brand.into(),
            price,
            category: category.into(),
            description: String::new(),
            ingredients: String::new(),
            package_size: "1000 g".into(),
            dosage: "30 g".into(),
            rating,
            image: None,
        }
    }

    fn catalog() -> Vec<Supplement> {
        vec![
            supplement(1, "Creatine Monohydrate", "Acme", 499.0, "performance", 4.8),
            supplement(2, "Whey Isolate", "Acme", 1290.0, "protein", 4.5),
            supplement(3, "Magnesium Bisglycinate", "Vita", 349.0, "minerals", 4.1),
            supplement(4, "Omega 3", "Nordic", 690.0, "fatty acids", 3.9),
            supplement(5, "Vegan Protein", "Greenly", 990.0, "protein", 4.2),
        ]
    }

    #[test]
    fn default_filter_is_inactive_and_returns_top_rated() {
        let f = SearchFilter::default();
        assert!(!f.is_active());
        let ids: Vec<i64> = search(catalog(), &f).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 5, 3, 4]);
    }

    #[test]
    fn text_matches_name_or_brand_case_insensitively() {
        let f = SearchFilter {
            text: "PROTEIN".into(),
            ..Default::default()
        };
        let ids: Vec<i64> = search(catalog(), &f).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![5]);

        let f = SearchFilter {
            text: "acme".into(),
            ..Default::default()
        };
        assert_eq!(search(catalog(), &f).len(), 2);
    }

    #[test]
    fn all_criteria_must_hold() {
        let f = SearchFilter {
            max_price: 1000.0,
            categories: vec!["protein".into(), "minerals".into()],
            min_rating: 4.15,
            ..Default::default()
        };
        assert!(f.is_active());
        let ids: Vec<i64> = search(catalog(), &f).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![5]);

        let f = SearchFilter {
            brands: vec!["Vita".into()],
            ..Default::default()
        };
        let ids: Vec<i64> = search(catalog(), &f).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn price_ceiling_is_inclusive() {
        let f = SearchFilter {
            max_price: 499.0,
            ..Default::default()
        };
        let ids: Vec<i64> = search(catalog(), &f).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn facets_keep_first_seen_order() {
        let f = facets(&catalog());
        assert_eq!(f.brands, vec!["Acme", "Vita", "Nordic", "Greenly"]);
        assert_eq!(
            f.categories,
            vec!["performance", "protein", "minerals", "fatty acids"]
        );
    }

    #[test]
    fn top_rated_caps_the_list() {
        let many: Vec<Supplement> = (0..30)
            .map(|i| supplement(i, "x", "y", 1.0, "z", i as f64 / 10.0))
            .collect();
        let top = top_rated(many, TOP_RATED);
        assert_eq!(top.len(), TOP_RATED);
        assert_eq!(top[0].id, 29);
        assert_eq!(top[19].id, 10);
    }

    #[test]
    fn recommend_picks_three_distinct_from_top() {
        let many: Vec<Supplement> = (0..30)
            .map(|i| supplement(i, "x", "y", 1.0, "z", i as f64 / 10.0))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);
        let picks = recommend(many, &mut rng);
        assert_eq!(picks.len(), RECOMMENDED);
        assert!(picks.iter().all(|s| s.id >= 10));
        assert_ne!(picks[0].id, picks[1].id);
        assert_ne!(picks[1].id, picks[2].id);
        assert_ne!(picks[0].id, picks[2].id);

        let few = recommend(catalog()[..2].to_vec(), &mut rng);
        assert_eq!(few.len(), 2);
    }
}
