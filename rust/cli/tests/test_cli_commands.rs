//! Exit codes and output of each subcommand through `fairdeal_cli::run`.

fn run(args: &[&str]) -> (i32, String, String) {
    let mut argv = vec!["fairdeal"];
    argv.extend_from_slice(args);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = fairdeal_cli::run(argv, &mut out, &mut err);
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[test]
fn help_goes_to_stdout_with_zero() {
    let (code, out, _) = run(&["--help"]);
    assert_eq!(code, 0);
    for cmd in ["eval", "deal", "verify", "cfg"] {
        assert!(out.contains(cmd), "help should list {}: {}", cmd, out);
    }
}

#[test]
fn unknown_command_lists_commands_on_stderr() {
    let (code, out, err) = run(&["shuffle"]);
    assert_eq!(code, 2);
    assert!(out.is_empty());
    assert!(err.contains("Commands:"));
    assert!(err.contains("verify"));
}

#[test]
fn eval_prints_category_and_best_five() {
    let (code, out, _) = run(&["eval", "Ah", "Kh", "Qh", "Jh", "Th", "2c", "3d"]);
    assert_eq!(code, 0);
    assert!(out.contains("Category: Royal Flush"), "{}", out);
    assert!(out.contains("Best five:"));
}

#[test]
fn eval_needs_five_to_seven_cards() {
    let (code, _, _) = run(&["eval", "Ah", "Kh", "Qh", "Jh"]);
    assert_eq!(code, 2);
    let (code, _, _) = run(&["eval", "Ah", "Kh", "Qh", "Jh", "Th", "9h", "8h", "7h"]);
    assert_eq!(code, 2);
}

#[test]
fn eval_rejects_unparseable_card() {
    let (code, _, err) = run(&["eval", "Ah", "Kh", "Qh", "Jh", "1x"]);
    assert_eq!(code, 2);
    assert!(err.contains("Error:"), "{}", err);
}

#[test]
fn deal_prints_commitment_and_bundle() {
    let (code, out, _) = run(&["deal", "--players", "4", "--seed", "42"]);
    assert_eq!(code, 0);
    assert!(out.starts_with("Commitment: "));
    assert!(out.contains("Hole P4:"));
    let json_start = out.find('{').expect("bundle json");
    let bundle: serde_json::Value = serde_json::from_str(&out[json_start..]).unwrap();
    assert_eq!(bundle["order"].as_array().unwrap().len(), 52);
    assert_eq!(bundle["dealt"].as_array().unwrap().len(), 13);
}

#[test]
fn deal_rejects_out_of_range_player_counts() {
    assert_eq!(run(&["deal", "--players", "1"]).0, 2);
    assert_eq!(run(&["deal", "--players", "23"]).0, 2);
}

#[test]
fn verify_missing_file_is_an_error() {
    let (code, _, err) = run(&["verify", "--input", "/nonexistent/bundle.json"]);
    assert_eq!(code, 2);
    assert!(err.contains("I/O error"), "{}", err);
}
