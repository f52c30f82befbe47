//! The breakdown of a period's expenses by category.

use crate::dashboard::{
    comparison::round2,
    models::{CategoryAggregation, CategoryExpense, ExpensesByCategory},
};

/// Orders the expense categories largest first and works out each one's share.
///
/// Categories without expenses in the period are not part of `aggregations` and are
/// left out. Categories with equal totals keep their input order.
///
/// # Arguments
/// * `aggregations` - The total spent in each category
/// * `total_expenses` - The total spent in the period
pub(super) fn format_expenses_by_category(
    mut aggregations: Vec<CategoryAggregation>,
    total_expenses: f64,
) -> ExpensesByCategory {
    aggregations.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));

    let categories = aggregations
        .into_iter()
        .map(|aggregation| CategoryExpense {
            percentage: if total_expenses > 0.0 {
                round2(aggregation.total_amount / total_expenses * 100.0)
            } else {
                0.0
            },
            category_id: aggregation.category_id,
            category_name: aggregation.category_name,
            category_color: aggregation.category_color,
            amount: aggregation.total_amount,
        })
        .collect();

    ExpensesByCategory {
        categories,
        total_expenses,
    }
}

#[cfg(test)]
mod category_breakdown_tests {
    use crate::dashboard::models::CategoryAggregation;

    use super::format_expenses_by_category;

    fn aggregation(category_id: i64, name: &str, total_amount: f64) -> CategoryAggregation {
        CategoryAggregation {
            category_id,
            category_name: name.to_owned(),
            category_color: "#EF4444".to_owned(),
            total_amount,
        }
    }

    #[test]
    fn sorts_largest_first_with_percentages() {
        let got = format_expenses_by_category(
            vec![
                aggregation(1, "Food", 25.0),
                aggregation(2, "Housing", 50.0),
                aggregation(3, "Transport", 25.0),
            ],
            100.0,
        );

        let names: Vec<&str> = got
            .categories
            .iter()
            .map(|category| category.category_name.as_str())
            .collect();
        assert_eq!(names, ["Housing", "Food", "Transport"]);
        let percentages: Vec<f64> = got
            .categories
            .iter()
            .map(|category| category.percentage)
            .collect();
        assert_eq!(percentages, [50.0, 25.0, 25.0]);
        assert_eq!(got.total_expenses, 100.0);
    }

    #[test]
    fn percentages_are_zero_without_expenses() {
        let got = format_expenses_by_category(vec![aggregation(1, "Food", 0.0)], 0.0);

        assert_eq!(got.categories[0].percentage, 0.0);
    }

    #[test]
    fn percentages_are_rounded_and_sum_to_at_most_100() {
        let got = format_expenses_by_category(
            vec![
                aggregation(1, "Food", 1.0),
                aggregation(2, "Housing", 1.0),
                aggregation(3, "Transport", 1.0),
            ],
            3.0,
        );

        assert!(got.categories.iter().all(|category| category.percentage == 33.33));
        let sum: f64 = got.categories.iter().map(|category| category.percentage).sum();
        assert!(sum <= 100.0);
    }

    #[test]
    fn empty_input_gives_no_categories() {
        let got = format_expenses_by_category(Vec::new(), 0.0);

        assert!(got.categories.is_empty());
    }
}
