use restock_core::{Debounce, QuirkProfile, QuirkRule, QuirkTable, Target};

#[test]
fn unknown_site_gets_default_profile() {
    let table = QuirkTable::builtin();
    assert_eq!(
        table.resolve("https://shop.example/ps5"),
        QuirkProfile::default()
    );
}

#[test]
fn builtin_table_covers_known_retailers() {
    let table = QuirkTable::builtin();

    let microsoft = table.resolve("https://www.Microsoft.com/en-gb/store/xbox");
    assert!(microsoft.wait_for_network_idle);
    assert_eq!(
        microsoft.debounce,
        Some(Debounce {
            source: "microsoft".to_string(),
            threshold: 4,
        })
    );

    let xbox = table.resolve("https://www.xbox.com/en-GB/consoles");
    assert!(xbox.wait_for_network_idle);
    assert_eq!(xbox.debounce, None);
}

#[test]
fn matching_rules_are_merged_and_first_debounce_wins() {
    let table = QuirkTable::new(vec![
        QuirkRule::new("shop.example").debounce(2, "first"),
        QuirkRule::new("example").wait_for_network_idle().debounce(9, "second"),
    ]);

    let profile = table.resolve("https://shop.example/item");

    assert!(profile.wait_for_network_idle);
    assert_eq!(
        profile.debounce,
        Some(Debounce {
            source: "first".to_string(),
            threshold: 2,
        })
    );
}

#[test]
fn source_defaults_to_pattern_and_zero_threshold_disables_debounce() {
    let mut rule = QuirkRule::new("flaky.example");
    rule.debounce_threshold = 3;
    let table = QuirkTable::new(vec![rule, QuirkRule::new("calm.example")]);

    assert_eq!(
        table.resolve("https://flaky.example/").debounce,
        Some(Debounce {
            source: "flaky.example".to_string(),
            threshold: 3,
        })
    );
    assert_eq!(table.resolve("https://calm.example/").debounce, None);
}

#[test]
fn profiles_resolve_once_per_target() {
    let table = QuirkTable::builtin();
    let monitored = table.apply(vec![
        Target::new("https://www.xbox.com/consoles", "Out of stock"),
        Target::new("https://shop.example/ps5", "Sold out"),
    ]);

    assert_eq!(monitored.len(), 2);
    assert!(monitored[0].profile.wait_for_network_idle);
    assert!(!monitored[1].profile.wait_for_network_idle);
    assert_eq!(monitored[1].url(), "https://shop.example/ps5");
}
