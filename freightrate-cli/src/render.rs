//! Plain-text output for quotes and carrier listings.

use std::io::{self, Write};

use freightrate_core::{CarrierMeta, RateResponse};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Write a quote outcome as a plain-text table.
pub(crate) fn write_rates<W: Write>(out: &mut W, response: &RateResponse) -> io::Result<()> {
    if !response.success {
        writeln!(out, "No rates: {}", response.message)?;
        return Ok(());
    }
    if !response.message.is_empty() {
        writeln!(out, "Carrier notes: {}", response.message)?;
    }

    writeln!(
        out,
        "{:<28} {:<8} {:>12} {:<4} {}",
        "SERVICE", "CODE", "PRICE", "CUR", "DELIVERY"
    )?;
    for rate in &response.rates {
        writeln!(
            out,
            "{:<28} {:<8} {:>12} {:<4} {}",
            rate.service_name,
            rate.service_code,
            rate.total_price.round_dp(2),
            rate.currency,
            rate.delivery_range.latest.format(DATE_FORMAT),
        )?;
    }
    Ok(())
}

/// Write one line per registered carrier.
pub(crate) fn write_carriers<W: Write>(out: &mut W, carriers: &[CarrierMeta]) -> io::Result<()> {
    for carrier in carriers {
        writeln!(
            out,
            "{:<16} {:<20} max {} lbs, requires {}",
            carrier.id,
            carrier.name,
            carrier.max_weight_lbs,
            carrier.required_options.join(", "),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use freightrate_core::{DeliveryRange, Location, RateEstimate};
    use rust_decimal::Decimal;

    use super::*;

    fn rate(code: &str, cents: i64) -> RateEstimate {
        RateEstimate {
            origin: Location::new("US"),
            destination: Location::new("US"),
            carrier: "R+L Freight".to_owned(),
            service_name: format!("{code} Service"),
            service_code: code.to_owned(),
            total_price: Decimal::new(cents, 2),
            currency: "USD".to_owned(),
            packages: Vec::new(),
            delivery_range: DeliveryRange::on(
                NaiveDate::from_ymd_opt(2026, 3, 5).expect("valid date"),
            ),
        }
    }

    fn render(response: &RateResponse) -> String {
        let mut out = Vec::new();
        write_rates(&mut out, response).expect("writing to a Vec succeeds");
        String::from_utf8(out).expect("valid UTF-8")
    }

    #[test]
    fn test_should_render_rate_table() {
        let response = RateResponse::new(
            true,
            String::new(),
            vec![rate("STD", 123_456), rate("GSDS", 148_012)],
            String::new(),
        );

        let text = render(&response);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines.first().is_some_and(|line| line.starts_with("SERVICE")));
        assert!(lines.get(1).is_some_and(|line| line.contains("STD") && line.contains("1234.56")));
        assert!(lines.get(2).is_some_and(|line| line.contains("2026-03-05")));
    }

    #[test]
    fn test_should_render_failure_message() {
        let response = RateResponse::new(false, String::new(), Vec::new(), String::new());

        let text = render(&response);

        assert!(text.starts_with("No rates: No shipping rates could be found"));
    }
}
