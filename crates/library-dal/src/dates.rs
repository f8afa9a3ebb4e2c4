use time::Date;

fn ordinal_suffix(day: u8) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Long human form, e.g. `March 22nd, 1950`
pub fn format_date(date: Date) -> String {
    let day = date.day();
    format!(
        "{} {}{}, {}",
        date.month(),
        day,
        ordinal_suffix(day),
        date.year()
    )
}
