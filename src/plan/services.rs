use lazy_static::lazy_static;
use regex::Regex;

use super::dto::{DoseCountdown, PlanSummary};
use crate::catalog::repo::Supplement;
use crate::error::{AppError, AppResult};

const DAYS_PER_MONTH: f64 = 30.0;

/// First run of digits in free text such as "1000 g" or "2 caps".
pub fn leading_number(text: &str) -> Option<u64> {
    lazy_static! {
        static ref DIGITS_RE: Regex = Regex::new(r"\d+").unwrap();
    }
    DIGITS_RE
        .find(text)
        .and_then(|m| m.as_str().parse::<u64>().ok())
}

fn dose_size(dosage: &str) -> u64 {
    leading_number(dosage).filter(|n| *n > 0).unwrap_or(1)
}

/// Products without a readable package size cost nothing.
pub fn monthly_expense(plan: &[Supplement]) -> f64 {
    plan.iter()
        .filter_map(|s| {
            let package = leading_number(&s.package_size).filter(|n| *n > 0)?;
            let days_per_package = package as f64 / dose_size(&s.dosage) as f64;
            Some(s.price / days_per_package * DAYS_PER_MONTH)
        })
        .sum()
}

pub fn unique_ingredients(plan: &[Supplement]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for s in plan {
        for ingredient in s.ingredients.split(',').map(str::trim) {
            if !ingredient.is_empty() && !out.iter().any(|i| i == ingredient) {
                out.push(ingredient.to_string());
            }
        }
    }
    out
}

pub fn summarize(plan: &[Supplement]) -> PlanSummary {
    PlanSummary {
        products: plan.len(),
        monthly_expense: (monthly_expense(plan) * 100.0).round() / 100.0,
        ingredients: unique_ingredients(plan),
    }
}

/// Doses left in one package given how many were already marked taken.
pub fn dose_countdown(supplement: &Supplement, dosage: &str, taken: u64) -> DoseCountdown {
    let package = leading_number(&supplement.package_size).unwrap_or(0);
    let total = package / dose_size(dosage);
    DoseCountdown {
        supplement_id: supplement.id,
        dosage: dosage.to_string(),
        total,
        remaining: total.saturating_sub(taken),
        daily_cost: (total > 0).then(|| supplement.price / total as f64),
    }
}

/// Only catalog products can be planned.
pub fn require_in_catalog(found: Option<Supplement>, id: i64) -> AppResult<Supplement> {
    found.ok_or_else(|| AppError::NotFound(format!("supplement {} not found", id)))
}

pub fn require_in_plan(found: Option<Supplement>, id: i64) -> AppResult<Supplement> {
    found.ok_or_else(|| not_in_plan(id))
}

/// `inserted` is false when the row already existed.
pub fn check_added(inserted: bool) -> AppResult<()> {
    if inserted {
        Ok(())
    } else {
        Err(AppError::Conflict("this product is already in your plan".into()))
    }
}

pub fn check_removed(rows: u64, id: i64) -> AppResult<()> {
    if rows == 0 {
        Err(not_in_plan(id))
    } else {
        Ok(())
    }
}

fn not_in_plan(id: i64) -> AppError {
    AppError::NotFound(format!("supplement {} is not in your plan", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::services::tests::supplement;
    use axum::http::StatusCode;

    fn product(price: f64, package: &str, dosage: &str, ingredients: &str) -> Supplement {
        let mut s = supplement(1, "Whey", "Acme", price, "protein", 4.0);
        s.package_size = package.into();
        s.dosage = dosage.into();
        s.ingredients = ingredients.into();
        s
    }

    #[test]
    fn leading_number_reads_first_digits() {
        assert_eq!(leading_number("1000 g"), Some(1000));
        assert_eq!(leading_number("pack of 120 caps, 2 per day"), Some(120));
        assert_eq!(leading_number("one scoop"), None);
    }

    #[test]
    fn monthly_expense_from_package_and_dosage() {
        // 1000 g at 25 g/day = 40 days; 800 / 40 * 30 = 600
        let whey = product(800.0, "1000 g", "25 g", "");
        // 60 caps, dosage unreadable -> 1/day; 300 / 60 * 30 = 150
        let zinc = product(300.0, "60 caps", "one cap", "");
        assert!((monthly_expense(&[whey.clone(), zinc]) - 750.0).abs() < 1e-9);

        let unknown = product(500.0, "big tub", "10 g", "");
        assert!((monthly_expense(&[whey, unknown]) - 600.0).abs() < 1e-9);
        assert_eq!(monthly_expense(&[]), 0.0);
    }

    #[test]
    fn ingredients_are_deduplicated_in_order() {
        let a = product(1.0, "1", "1", "Whey protein, Lecithin, Sucralose");
        let b = product(1.0, "1", "1", "Sucralose,Creatine , ");
        assert_eq!(
            unique_ingredients(&[a, b]),
            vec!["Whey protein", "Lecithin", "Sucralose", "Creatine"]
        );
    }

    #[test]
    fn countdown_subtracts_taken_doses() {
        let whey = product(1120.0, "1000 g", "30 g", "");
        let c = dose_countdown(&whey, "30 g", 0);
        assert_eq!(c.total, 33);
        assert_eq!(c.remaining, 33);

        let c = dose_countdown(&whey, "20 g", 12);
        assert_eq!(c.total, 50);
        assert_eq!(c.remaining, 38);
        assert!((c.daily_cost.unwrap() - 22.4).abs() < 1e-9);

        assert_eq!(dose_countdown(&whey, "30 g", 99).remaining, 0);
    }

    #[test]
    fn countdown_without_package_size_has_no_cost() {
        let odd = product(100.0, "n/a", "1", "");
        let c = dose_countdown(&odd, "1", 0);
        assert_eq!(c.total, 0);
        assert!(c.daily_cost.is_none());
    }

    #[test]
    fn adding_unknown_product_is_not_found() {
        let err = require_in_catalog(None, 42).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "supplement 42 not found");

        let whey = product(1.0, "1", "1", "");
        assert_eq!(require_in_catalog(Some(whey), 1).unwrap().id, 1);
    }

    #[test]
    fn adding_twice_is_a_conflict() {
        assert!(check_added(true).is_ok());
        assert_eq!(check_added(false).unwrap_err().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn removing_missing_product_is_not_found() {
        assert!(check_removed(1, 7).is_ok());
        let err = check_removed(0, 7).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "supplement 7 is not in your plan");
    }

    #[test]
    fn doses_for_unplanned_product_are_not_found() {
        assert_eq!(
            require_in_plan(None, 3).unwrap_err().status(),
            StatusCode::NOT_FOUND
        );
    }
}
