use rust_decimal::Decimal;

/// Upper bounds (inclusive, as hundredths of the savings ratio) of each
/// grade. Nothing saves more than all of its reference demand.
const GRADE_BOUNDS: &[(i64, &str)] = &[
    (-35, "G"),
    (-10, "F"),
    (20, "E"),
    (40, "D"),
    (55, "C"),
    (70, "B"),
    (85, "A"),
    (100, "A+"),
];

/// Energy-efficiency letter for a savings percentage (e.g. `45` for 45 %).
/// `None` above 100 %.
pub fn energy_grade(savings_percent: Decimal) -> Option<&'static str> {
    let ratio = savings_percent / Decimal::ONE_HUNDRED;
    GRADE_BOUNDS
        .iter()
        .find(|(bound, _)| ratio <= Decimal::new(*bound, 2))
        .map(|(_, grade)| *grade)
}
