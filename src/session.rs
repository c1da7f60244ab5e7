//! The interactive conversion loop.
//!
//! Reads amount, base currency, and target currency line by line,
//! validating each field independently. An invalid field re-prompts for
//! that field only; earlier fields are kept. The literal `end` in the
//! amount position (or end of input) terminates the session.

use anyhow::Result;
use chrono::NaiveDate;
use std::io::{BufRead, Write};
use tracing::{debug, info};

use crate::journal::{ConversionJournal, ConversionRecord};
use crate::rates::{RateError, RateProvider, RateSet};
use crate::validate::{validate_amount, validate_currency_code};

const INVALID_AMOUNT_MSG: &str = "Please enter a valid amount";
const INVALID_CURRENCY_MSG: &str = "Please enter a valid currency code";
const INVALID_TARGET_MSG: &str = "Invalid target currency for the given date";

pub struct ConversionSession<'a, P: RateProvider> {
    date: NaiveDate,
    provider: &'a P,
    journal: &'a ConversionJournal,
}

/// Formats an amount the way it is echoed to the user: whole values keep
/// a trailing `.0`, everything else prints its shortest form.
fn display_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn next_line<R: BufRead>(lines: &mut std::io::Lines<R>) -> Result<Option<String>> {
    lines.next().transpose().map_err(Into::into)
}

impl<'a, P: RateProvider> ConversionSession<'a, P> {
    pub fn new(date: NaiveDate, provider: &'a P, journal: &'a ConversionJournal) -> Self {
        ConversionSession {
            date,
            provider,
            journal,
        }
    }

    /// Drives the read-validate-convert loop until `end` or end of input.
    ///
    /// Unknown-currency lookup errors re-prompt the offending field;
    /// transport-level failures abort the session.
    pub async fn run<R: BufRead, W: Write>(&self, input: R, out: &mut W) -> Result<()> {
        let mut lines = input.lines();
        let mut amount: Option<f64> = None;
        let mut base_currency: Option<String> = None;
        let mut rates: Option<RateSet> = None;
        let mut target_currency: Option<String> = None;

        info!(date = %self.date, "Conversion session started");

        loop {
            if amount.is_none() {
                let Some(line) = next_line(&mut lines)? else { break };
                if line.trim().eq_ignore_ascii_case("end") {
                    debug!("Session ended by user");
                    break;
                }
                amount = validate_amount(&line);
                if amount.is_none() {
                    writeln!(out, "{INVALID_AMOUNT_MSG}")?;
                    continue;
                }
            }

            if base_currency.is_none() {
                let Some(line) = next_line(&mut lines)? else { break };
                let Some(code) = validate_currency_code(&line) else {
                    writeln!(out, "{INVALID_CURRENCY_MSG}")?;
                    continue;
                };
                match self.provider.fetch_rates(self.date, &code).await {
                    Ok(fetched) => {
                        rates = Some(fetched);
                        base_currency = Some(code);
                    }
                    Err(RateError::UnknownCurrency { .. }) => {
                        writeln!(out, "{INVALID_CURRENCY_MSG}")?;
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            let mut rate: Option<f64> = None;
            if target_currency.is_none() {
                let Some(line) = next_line(&mut lines)? else { break };
                let Some(code) = validate_currency_code(&line) else {
                    writeln!(out, "{INVALID_CURRENCY_MSG}")?;
                    continue;
                };
                let rate_set = rates.as_ref().expect("rates are fetched with the base currency");
                match rate_set.get(&code) {
                    Some(found) => {
                        rate = Some(*found);
                        target_currency = Some(code);
                    }
                    None => {
                        writeln!(out, "{INVALID_CURRENCY_MSG}")?;
                        continue;
                    }
                }
            }

            let amt = amount.take().unwrap_or_default();
            let base = base_currency.take().unwrap_or_default();
            let target = target_currency.take().unwrap_or_default();
            rates = None;
            let rate = rate.unwrap_or_default();

            if rate > 0.0 && rate.is_finite() {
                // Truncate toward zero on the scaled value, not round.
                let converted = (amt * rate * 100.0).trunc() / 100.0;
                writeln!(
                    out,
                    "{} {} is {} {}",
                    display_amount(amt),
                    base,
                    display_amount(converted),
                    target
                )?;
                self.journal.append(&ConversionRecord {
                    date: self.date,
                    amount: amt,
                    base_currency: base,
                    target_currency: target,
                    converted_amount: converted,
                })?;
            } else {
                writeln!(out, "{INVALID_TARGET_MSG}")?;
            }
        }

        Ok(())
    }
}
