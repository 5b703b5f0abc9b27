//! Verify command: audits revealed shuffles.
//!
//! Accepts either a single verification bundle (JSON, as written by `deal`)
//! or a hand log (JSONL of hand records, as written by the table manager).
//! For a hand log every finished hand is checked:
//!
//! - the revealed bundle recomputes to its own hash
//! - that hash is the commitment published when the hand started
//! - the order is a full deck and the dealt cards are its top
//! - the board shown in the record was dealt from that order

use crate::error::{BatchValidationError, CliError};
use fairdeal_engine::deck::VerificationBundle;
use fairdeal_engine::logger::HandRecord;
use std::fs;
use std::io::Write;
use std::path::Path;

type VerifyError = BatchValidationError<usize>;

pub fn handle_verify_command(
    input: &Path,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let text = fs::read_to_string(input)?;
    if let Ok(bundle) = serde_json::from_str::<VerificationBundle>(&text) {
        return verify_bundle(&bundle, out, err);
    }
    verify_hand_log(&text, out, err)
}

fn verify_bundle(
    bundle: &VerificationBundle,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    match bundle.ensure_untampered() {
        Ok(()) => {
            writeln!(out, "OK: commitment {} matches seed and order", bundle.hash)?;
            Ok(())
        }
        Err(e) => {
            writeln!(err, "FAILED: {}", e)?;
            Err(CliError::Verification(e.to_string()))
        }
    }
}

fn verify_hand_log(text: &str, out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let mut errors: Vec<VerifyError> = Vec::new();
    let mut hands = 0usize;
    let mut unfinished = 0usize;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let record: HandRecord = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                errors.push(VerifyError {
                    item_context: line_no,
                    message: format!("Invalid record: {}", e),
                });
                continue;
            }
        };
        hands += 1;
        let Some(result) = &record.result else {
            unfinished += 1;
            continue;
        };
        if let Err(message) = check_record(&record, &result.verification) {
            errors.push(VerifyError {
                item_context: line_no,
                message: format!("{}: {}", record.hand_id, message),
            });
        }
    }

    if hands == 0 && errors.is_empty() {
        writeln!(err, "FAILED: no verification bundle or hand records found")?;
        return Err(CliError::InvalidInput("empty input".to_string()));
    }
    if unfinished > 0 {
        crate::ui::display_warning(
            err,
            &format!("{} unfinished hand(s) had nothing to verify", unfinished),
        )?;
    }
    if !errors.is_empty() {
        for e in &errors {
            writeln!(err, "FAILED line {}", e)?;
        }
        return Err(CliError::Verification(format!(
            "{} of {} hand(s) failed",
            errors.len(),
            hands
        )));
    }
    writeln!(out, "OK: {} hand(s) verified", hands - unfinished)?;
    Ok(())
}

fn check_record(record: &HandRecord, bundle: &VerificationBundle) -> Result<(), String> {
    bundle.ensure_untampered().map_err(|e| e.to_string())?;
    if bundle.hash != record.commitment {
        return Err(format!(
            "revealed hash {} differs from published commitment {}",
            bundle.hash, record.commitment
        ));
    }
    if record.board.iter().any(|c| !bundle.dealt.contains(c)) {
        return Err("board contains a card that was not dealt".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairdeal_engine::deck::Deck;

    fn bundle() -> VerificationBundle {
        let mut deck = Deck::new();
        deck.shuffle();
        deck.deal(9).unwrap();
        deck.verification_bundle().unwrap()
    }

    #[test]
    fn genuine_bundle_passes() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        verify_bundle(&bundle(), &mut out, &mut err).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("OK"));
    }

    #[test]
    fn swapped_cards_fail() {
        let mut b = bundle();
        b.order.swap(0, 1);
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = verify_bundle(&b, &mut out, &mut err);
        assert!(matches!(result, Err(CliError::Verification(_))));
        assert!(String::from_utf8(err).unwrap().contains("FAILED"));
    }
}
