/// All persisted money is integer cents; exact percentage arithmetic happens
/// in the splitter and fee calculator, display formatting here.
pub type Cents = i64;

/// Format integer cents as a dollar string ("1234" -> "$12.34")
pub fn format_cents(amount_cents: Cents) -> String {
    let sign = if amount_cents < 0 { "-" } else { "" };
    let abs = amount_cents.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}
