//! Human-readable evaluation summary.

use sificc_eval::EvalReport;

const UNDEFINED: &str = "undefined";

/// Render the text report printed by `cceval run`.
pub fn render_text(report: &EvalReport) -> String {
    let s = &report.stats;
    let mut out = String::new();

    let line = |out: &mut String, text: String| {
        out.push_str(&text);
        out.push('\n');
    };

    line(&mut out, format!("Processed events: {:>10}", thousands(s.processed)));
    line(&mut out, format!("Valid events:     {:>10}", thousands(s.valid)));
    line(&mut out, format!("Compton events:   {:>10}", thousands(s.compton)));
    line(&mut out, format!("Recon. Comptons:  {:>10}", thousands(s.recon_total)));
    line(&mut out, format!("Frame:            {}", report.meta.frame));
    out.push('\n');
    line(&mut out, format!("Matches:  {:>9}", thousands(s.matches)));
    line(&mut out, format!("  Efficiency: {:>5}", ratio(s.efficiency)));
    line(&mut out, format!("  Purity:     {:>5}", ratio(s.purity)));
    line(&mut out, format!("  Euc mean:  {}", millimeters(s.euclidean_mean)));
    line(&mut out, format!("  Euc std:   {}", millimeters(s.euclidean_std)));
    out.push('\n');
    out.push_str("Mismatches breakdown\n");
    for (criterion, count) in s.mismatches.iter() {
        let label = format!("{:<8}:", criterion.as_str());
        line(&mut out, format!("  {label}{:>8}", thousands(*count)));
    }

    out
}

fn ratio(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.3}"),
        None => UNDEFINED.to_string(),
    }
}

fn millimeters(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:6.2} mm"),
        None => UNDEFINED.to_string(),
    }
}

/// `1234567` → `1,234,567`.
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
