//! Currency and balance-summary formatting.

/// Fixed two-decimal currency rendering with a constant symbol prefix.
///
/// No thousands separators, no locale switching. Negative amounts keep the
/// sign after the symbol (`₹-50.00`), matching how they appear in the
/// remaining-balance line.
pub fn format_currency(symbol: &str, amount: f64) -> String {
    format!("{symbol}{amount:.2}")
}

/// Warning/alert prefix shared by every budget-aware reply.
///
/// Returns the empty string when neither condition fires. The low-balance
/// threshold is 20% of the available money; with `available == 0` that
/// condition degenerates to `remaining < 0`, already covered by the overspend
/// branch, so a never-set budget with zero expenses alerts on nothing.
pub fn budget_alert(symbol: &str, available: f64, remaining: f64) -> String {
    if remaining < 0.0 {
        return format!(
            "⚠️ WARNING: You're overspending!\n\
             You've exceeded your budget by {}\n\n",
            format_currency(symbol, remaining.abs())
        );
    }
    if remaining < available * 0.2 {
        return format!(
            "⚠️ ALERT: You're close to your budget limit!\n\
             Only {} remaining\n\n",
            format_currency(symbol, remaining)
        );
    }
    String::new()
}

/// Full balance block: alert prefix (if any) plus the three-line summary.
///
/// Used by `/total`, `/money` and `/balance`. Mutation confirmations reuse
/// [`budget_alert`] but append only a single remaining-balance line.
pub fn balance_message(symbol: &str, available: f64, total: f64, remaining: f64) -> String {
    let mut message = budget_alert(symbol, available, remaining);

    message.push_str(&format!(
        "💰 Balance Summary:\n\n\
         Available Money: {}\n\
         Total Expenses: {}\n\
         Remaining Balance: {}",
        format_currency(symbol, available),
        format_currency(symbol, total),
        format_currency(symbol, remaining),
    ));

    message
}
